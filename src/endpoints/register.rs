use crate::{ApiClient, RequestOptions, TransportError, ValidationErrors};
use reqwest::Method;
use serde_derive::Serialize;
use serde_json::Value;

/// The body of `POST /auth/register/`.
#[derive(Clone, Serialize)]
pub struct Registration<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub password_confirm: &'a str,
}

/// Create a new account.
///
/// Registering doesn't log the user in. The backend's response is returned
/// untouched.
pub async fn register(
    client: &ApiClient,
    registration: &Registration<'_>,
) -> Result<Value, RegisterError> {
    log::debug!("Registering {}", registration.username);

    let options = RequestOptions::json(Method::POST, registration)?;
    let response = client.send("/auth/register/", options).await?;

    if !response.is_success() {
        let errors = ValidationErrors::from_body(&response.body);
        log::warn!("Registration failed with {}: {}", response.status, errors);
        return Err(RegisterError::Validation(errors));
    }

    if response.body.is_empty() {
        return Ok(Value::Null);
    }

    response.json().map_err(RegisterError::from)
}

/// Possible errors that may be returned by [`register()`].
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("Unable to send the registration request")]
    Network(#[from] TransportError),
    /// The backend rejected one or more fields. Every message is kept so
    /// it can be shown next to its field.
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("Unable to parse the registration response")]
    ResponseParse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, FakeTransport};
    use serde_json::json;

    fn ana() -> Registration<'static> {
        Registration {
            username: "ana",
            email: "ana@example.com",
            password: "hunter22",
            password_confirm: "hunter22",
        }
    }

    #[tokio::test]
    async fn field_errors_are_kept_whole() {
        let transport = FakeTransport::new();
        transport.on(
            Method::POST,
            "/auth/register/",
            400,
            json!({
                "username": ["A user with that username already exists."],
                "password": ["This password is too common.", "Too short."],
            }),
        );
        let client = testing::client(&transport);

        let got = register(&client, &ana()).await.unwrap_err();

        let errors = match got {
            RegisterError::Validation(errors) => errors,
            other => panic!("Unexpected error: {:?}", other),
        };
        assert_eq!(
            errors.field("username"),
            Some("A user with that username already exists.")
        );
        assert_eq!(
            errors.messages("password"),
            vec!["This password is too common.", "Too short."]
        );
    }

    #[tokio::test]
    async fn the_confirmation_is_sent_in_snake_case() {
        let transport = FakeTransport::new();
        transport.on(
            Method::POST,
            "/auth/register/",
            201,
            json!({ "username": "ana", "email": "ana@example.com" }),
        );
        let client = testing::client(&transport);

        let got = register(&client, &ana()).await.unwrap();

        assert_eq!(got["username"], "ana");
        let sent: Value =
            serde_json::from_slice(transport.requests()[0].body.as_ref().unwrap())
                .unwrap();
        assert_eq!(sent["password_confirm"], "hunter22");
    }
}
