//! Changes to the signed-in user's own account.

use super::EndpointError;
use crate::{
    validation::{self, FormError},
    Gateway, RequestOptions,
};
use reqwest::Method;
use serde_derive::Serialize;

const ME: &str = "/auth/me/";

/// Which backend message to show for a failed password change, in order of
/// preference.
pub const PASSWORD_CHANGE_ERROR_FIELDS: [&str; 4] =
    ["current_password", "password_confirm", "password", "detail"];
/// Which backend message to show for a failed email change, in order of
/// preference.
pub const EMAIL_CHANGE_ERROR_FIELDS: [&str; 3] =
    ["new_email", "password", "error"];

/// The body of `PUT /auth/me/`.
#[derive(Clone, Serialize)]
pub struct PasswordChange {
    current_password: String,
    password: String,
    password_confirm: String,
}

impl PasswordChange {
    /// Check the form before anything is sent: the new password must be
    /// confirmed, long enough, and the current password supplied.
    pub fn new(
        current_password: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<Self, FormError> {
        validation::check_new_password(password, password_confirm)?;

        if current_password.is_empty() {
            return Err(FormError::MissingCurrentPassword);
        }

        Ok(PasswordChange {
            current_password: current_password.to_string(),
            password: password.to_string(),
            password_confirm: password_confirm.to_string(),
        })
    }
}

pub async fn change_password(
    gateway: &Gateway,
    change: &PasswordChange,
) -> Result<(), EndpointError> {
    log::debug!("Changing the password");

    let options = RequestOptions::json(Method::PUT, change)?;
    super::check(gateway.send(ME, options).await?)?;
    log::info!("Password changed");

    Ok(())
}

/// The body of `POST /auth/email-change/request/`.
#[derive(Clone, Serialize)]
pub struct EmailChangeRequest {
    new_email: String,
    password: String,
}

impl EmailChangeRequest {
    pub fn new(new_email: &str, password: &str) -> Result<Self, FormError> {
        let new_email = new_email.trim();

        if !new_email.contains('@') {
            return Err(FormError::InvalidEmail(new_email.to_string()));
        }

        if password.is_empty() {
            return Err(FormError::MissingPassword);
        }

        Ok(EmailChangeRequest {
            new_email: new_email.to_string(),
            password: password.to_string(),
        })
    }
}

/// Ask for the account's email to be changed. The backend emails a
/// confirmation link to the new address and returns a message saying so.
pub async fn request_email_change(
    gateway: &Gateway,
    request: &EmailChangeRequest,
) -> Result<Option<String>, EndpointError> {
    log::debug!("Requesting an email change to {}", request.new_email);

    let options = RequestOptions::json(Method::POST, request)?;
    let response = super::check(
        gateway
            .send("/auth/email-change/request/", options)
            .await?,
    )?;

    Ok(response
        .json::<super::MessageBody>()
        .ok()
        .and_then(|body| body.message))
}

/// Record whether the user has been through the onboarding tour, then
/// refresh the session's copy of the profile.
pub async fn set_onboarding_seen(
    gateway: &Gateway,
    seen: bool,
) -> Result<(), EndpointError> {
    let body = OnboardingFlag {
        has_seen_onboarding: seen,
    };

    let options = RequestOptions::json(Method::PATCH, &body)?;
    super::check(gateway.send(ME, options).await?)?;

    gateway.session().refresh_user().await;
    Ok(())
}

#[derive(Serialize)]
struct OnboardingFlag {
    has_seen_onboarding: bool,
}
