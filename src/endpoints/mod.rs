//! The backend's endpoints.
//!
//! Identity-free calls (login, registration, account recovery) take an
//! [`ApiClient`]. Everything else goes through the [`Gateway`] so the
//! bearer token is attached and a `401` ends the session.

mod account;
mod budget;
mod expenses;
mod fixed_expenses;
mod history;
mod login;
mod me;
mod recovery;
mod register;

pub use account::{
    change_password, request_email_change, set_onboarding_seen,
    EmailChangeRequest, PasswordChange, EMAIL_CHANGE_ERROR_FIELDS,
    PASSWORD_CHANGE_ERROR_FIELDS,
};
pub use budget::{get_budget, update_budget};
pub use expenses::{add_expense, delete_expense, get_expenses};
pub use fixed_expenses::{
    add_fixed_expense, delete_fixed_expense, get_fixed_expenses,
};
pub use history::{download_history_pdf, get_history, pdf_file_name};
pub use login::{login, LoginError, DEFAULT_LOGIN_FAILURE};
pub use me::{current_user, ProfileError};
pub use recovery::{
    confirm_email_change, confirm_password_reset, request_password_reset,
    verify_password_reset, PasswordReset,
};
pub use register::{register, RegisterError, Registration};

use crate::{
    ApiClient, Gateway, GatewayError, HttpResponse, RequestOptions,
    TransportError, ValidationErrors,
};
use reqwest::{header::InvalidHeaderValue, StatusCode};
use serde::de::DeserializeOwned;
use serde_derive::Deserialize;

/// Typical endpoint errors.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    /// The backend answered `401` and the session has been torn down.
    #[error("The session has expired")]
    SessionExpired,
    /// The request never got a response.
    #[error("Unable to reach the server")]
    Network(#[from] TransportError),
    #[error("The access token can't be sent in a header")]
    InvalidToken(#[source] InvalidHeaderValue),
    /// The backend rejected the request's contents.
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("The server rejected the request ({}): {}", status, message)]
    Rejected { status: StatusCode, message: String },
    #[error("Unable to encode or decode the JSON payload")]
    Json(#[from] serde_json::Error),
}

impl From<GatewayError> for EndpointError {
    fn from(err: GatewayError) -> EndpointError {
        match err {
            GatewayError::SessionExpired => EndpointError::SessionExpired,
            GatewayError::Network(e) => EndpointError::Network(e),
            GatewayError::InvalidToken(e) => EndpointError::InvalidToken(e),
        }
    }
}

/// Turn any non-`2xx` response into an [`EndpointError`].
///
/// A `400` carrying a JSON object is a validation failure. Anything else
/// is summarised with the backend's `detail` or `error` message.
pub(crate) fn check(
    response: HttpResponse,
) -> Result<HttpResponse, EndpointError> {
    if response.is_success() {
        return Ok(response);
    }

    let status = response.status;
    let errors = ValidationErrors::from_body(&response.body);
    log::warn!("Request failed with {}: {}", status, errors);

    if status == StatusCode::BAD_REQUEST && !errors.is_empty() {
        return Err(EndpointError::Validation(errors));
    }

    let message = errors
        .first_of(&["detail", "error"])
        .or_else(|| status.canonical_reason())
        .unwrap_or("Unknown error")
        .to_string();

    Err(EndpointError::Rejected { status, message })
}

/// Send an authorized request and decode its JSON body.
async fn fetch<T>(
    gateway: &Gateway,
    endpoint: &str,
    options: RequestOptions,
) -> Result<T, EndpointError>
where
    T: DeserializeOwned,
{
    let response = check(gateway.send(endpoint, options).await?)?;
    log::trace!("Response: {}", response.text());

    response.json().map_err(EndpointError::from)
}

/// Send an anonymous request and return the backend's `message`, if any.
async fn send_public(
    client: &ApiClient,
    endpoint: &str,
    options: RequestOptions,
) -> Result<Option<String>, EndpointError> {
    let response = check(client.send(endpoint, options).await?)?;

    Ok(response
        .json::<MessageBody>()
        .ok()
        .and_then(|body| body.message))
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}
