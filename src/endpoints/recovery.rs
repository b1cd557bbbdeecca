//! Account recovery. None of these need (or send) a token.

use super::EndpointError;
use crate::{
    validation::{self, FormError},
    ApiClient, RequestOptions,
};
use reqwest::{Method, StatusCode};
use serde_derive::{Deserialize, Serialize};
use std::borrow::Cow;

/// Shown when a reset link is refused without an explanation.
const INVALID_RESET_LINK: &str = "The link is invalid or has expired";

/// Email a password reset link to `email`.
pub async fn request_password_reset(
    client: &ApiClient,
    email: &str,
) -> Result<Option<String>, EndpointError> {
    #[derive(Serialize)]
    struct Data<'a> {
        email: &'a str,
    }

    log::debug!("Requesting a password reset for {}", email);
    let options = RequestOptions::json(Method::POST, &Data { email })?;

    super::send_public(client, "/auth/password-reset/request/", options).await
}

/// Check that a reset link's token is still usable before asking for a new
/// password.
pub async fn verify_password_reset(
    client: &ApiClient,
    token: &str,
) -> Result<(), EndpointError> {
    let endpoint = format!("/auth/password-reset/verify/{}/", encode(token));
    let response = client.send(&endpoint, RequestOptions::get()).await?;

    let verdict: Verdict = response.json().unwrap_or_default();

    if response.is_success() && verdict.valid {
        return Ok(());
    }

    let status = if response.is_success() {
        StatusCode::BAD_REQUEST
    } else {
        response.status
    };
    let message = verdict
        .error
        .unwrap_or_else(|| INVALID_RESET_LINK.to_string());
    log::warn!("The reset token was refused: {}", message);

    Err(EndpointError::Rejected { status, message })
}

/// The body of `POST /auth/password-reset/confirm/`.
#[derive(Clone, Serialize)]
pub struct PasswordReset {
    token: String,
    password: String,
    password_confirm: String,
}

impl PasswordReset {
    pub fn new(
        token: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<Self, FormError> {
        validation::check_new_password(password, password_confirm)?;

        Ok(PasswordReset {
            token: token.to_string(),
            password: password.to_string(),
            password_confirm: password_confirm.to_string(),
        })
    }
}

/// Set a new password using a reset link's token.
pub async fn confirm_password_reset(
    client: &ApiClient,
    reset: &PasswordReset,
) -> Result<Option<String>, EndpointError> {
    let options = RequestOptions::json(Method::POST, reset)?;

    super::send_public(client, "/auth/password-reset/confirm/", options).await
}

/// Finish an email change using the token from the confirmation link.
pub async fn confirm_email_change(
    client: &ApiClient,
    token: &str,
) -> Result<Option<String>, EndpointError> {
    #[derive(Serialize)]
    struct Data<'a> {
        token: &'a str,
    }

    let options = RequestOptions::json(Method::POST, &Data { token })?;

    super::send_public(client, "/auth/email-change/confirm/", options).await
}

#[derive(Debug, Default, Deserialize)]
struct Verdict {
    #[serde(default)]
    valid: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Percent-encode a single path segment.
fn encode(segment: &str) -> Cow<'_, str> { urlencoding::encode(segment) }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, FakeTransport};
    use reqwest::header::AUTHORIZATION;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn reset_requests_are_anonymous() {
        let transport = FakeTransport::new();
        transport.on(
            Method::POST,
            "/auth/password-reset/request/",
            200,
            json!({ "message": "If the account exists, an email is on its way" }),
        );
        let client = testing::client(&transport);

        let got = request_password_reset(&client, "ana@example.com")
            .await
            .unwrap();

        assert_eq!(
            got.as_deref(),
            Some("If the account exists, an email is on its way")
        );
        let sent = transport.requests().pop().unwrap();
        assert!(sent.headers.get(AUTHORIZATION).is_none());
        let body: Value = serde_json::from_slice(&sent.body.unwrap()).unwrap();
        assert_eq!(body, json!({ "email": "ana@example.com" }));
    }

    #[tokio::test]
    async fn a_valid_reset_token() {
        let transport = FakeTransport::new();
        transport.on(
            Method::GET,
            "/auth/password-reset/verify/abc-123/",
            200,
            json!({ "valid": true }),
        );
        let client = testing::client(&transport);

        verify_password_reset(&client, "abc-123").await.unwrap();
    }

    #[tokio::test]
    async fn an_expired_reset_token() {
        let transport = FakeTransport::new();
        transport.on(
            Method::GET,
            "/auth/password-reset/verify/abc-123/",
            400,
            json!({ "valid": false, "error": "This link has expired" }),
        );
        let client = testing::client(&transport);

        let got = verify_password_reset(&client, "abc-123").await.unwrap_err();

        match got {
            EndpointError::Rejected { message, .. } => {
                assert_eq!(message, "This link has expired")
            },
            other => panic!("Unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn an_unexplained_refusal_gets_a_default_message() {
        let transport = FakeTransport::new();
        transport.on(
            Method::GET,
            "/auth/password-reset/verify/abc-123/",
            200,
            json!({ "valid": false }),
        );
        let client = testing::client(&transport);

        let got = verify_password_reset(&client, "abc-123").await.unwrap_err();

        assert_eq!(
            got.to_string(),
            format!(
                "The server rejected the request (400 Bad Request): {}",
                INVALID_RESET_LINK
            )
        );
    }

    #[tokio::test]
    async fn confirm_a_reset() {
        let transport = FakeTransport::new();
        transport.on(
            Method::POST,
            "/auth/password-reset/confirm/",
            200,
            json!({ "message": "Password updated" }),
        );
        let client = testing::client(&transport);
        let reset = PasswordReset::new("abc-123", "new password", "new password")
            .unwrap();

        let got = confirm_password_reset(&client, &reset).await.unwrap();

        assert_eq!(got.as_deref(), Some("Password updated"));
        let sent = transport.requests().pop().unwrap();
        let body: Value = serde_json::from_slice(&sent.body.unwrap()).unwrap();
        assert_eq!(body["password_confirm"], "new password");
    }

    #[tokio::test]
    async fn a_refused_email_confirmation() {
        let transport = FakeTransport::new();
        transport.on(
            Method::POST,
            "/auth/email-change/confirm/",
            400,
            json!({ "error": "Invalid token" }),
        );
        let client = testing::client(&transport);

        let got = confirm_email_change(&client, "nope").await.unwrap_err();

        assert_eq!(got.to_string(), "Invalid token");
    }

    #[test]
    fn tokens_are_escaped_in_paths() {
        assert_eq!(encode("a/b c"), "a%2Fb%20c");
        assert_eq!(encode("a+b"), "a%2Bb");
        assert_eq!(encode("MQ-abc_123.x~"), "MQ-abc_123.x~");
    }

    #[tokio::test]
    async fn a_token_with_spaces_stays_one_path_segment() {
        let transport = FakeTransport::new();
        transport.on(
            Method::GET,
            "/auth/password-reset/verify/a%2Fb%20c/",
            200,
            json!({ "valid": true }),
        );
        let client = testing::client(&transport);

        verify_password_reset(&client, "a/b c").await.unwrap();

        let sent = transport.requests().pop().unwrap();
        assert_eq!(sent.url.path(), "/api/auth/password-reset/verify/a%2Fb%20c/");
    }
}
