use crate::{ApiClient, HttpResponse, RequestOptions, TokenPair, TransportError};
use reqwest::Method;
use serde_derive::{Deserialize, Serialize};

/// Shown when the backend rejects a login without saying why.
pub const DEFAULT_LOGIN_FAILURE: &str = "Unable to log in";

/// Exchange a username and password for a [`TokenPair`].
///
/// This only talks to the backend. Use
/// [`SessionManager::login()`](crate::SessionManager::login) to actually
/// start a session.
pub async fn login(
    client: &ApiClient,
    username: &str,
    password: &str,
) -> Result<TokenPair, LoginError> {
    let data = Credentials { username, password };

    log::debug!("Sending a login request for {}", username);
    let options = RequestOptions::json(Method::POST, &data)?;
    let response = client.send("/auth/login/", options).await?;

    if !response.is_success() {
        return Err(interpret_rejection(&response));
    }

    response.json().map_err(LoginError::from)
}

fn interpret_rejection(response: &HttpResponse) -> LoginError {
    let message = response
        .json::<ErrorMessage>()
        .ok()
        .and_then(|msg| msg.detail)
        .unwrap_or_else(|| DEFAULT_LOGIN_FAILURE.to_string());

    log::error!("Login failed with {}: {}", response.status, message);

    LoginError::Rejected { message }
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct ErrorMessage {
    #[serde(default)]
    detail: Option<String>,
}

/// Possible errors that may be returned by [`login()`].
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// The request never got a response.
    #[error("Unable to send the login request")]
    Network(#[from] TransportError),
    /// The backend refused the credentials. The message is meant to be
    /// shown to the user as-is.
    #[error("{}", message)]
    Rejected { message: String },
    /// Unable to parse the login response.
    #[error("Unable to parse the login response")]
    ResponseParse(#[from] serde_json::Error),
    /// The tokens were issued but couldn't be saved.
    #[error("Unable to save the session")]
    Storage(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, FakeTransport};
    use serde_json::json;

    #[tokio::test]
    async fn happy_login() {
        let transport = FakeTransport::new();
        transport.on(
            Method::POST,
            "/auth/login/",
            200,
            json!({ "access": "ACCESS", "refresh": "REFRESH" }),
        );
        let client = testing::client(&transport);

        let got = login(&client, "ana", "hunter22").await.unwrap();

        assert_eq!(
            got,
            TokenPair {
                access: String::from("ACCESS"),
                refresh: Some(String::from("REFRESH")),
            }
        );
        let sent: serde_json::Value =
            serde_json::from_slice(transport.requests()[0].body.as_ref().unwrap())
                .unwrap();
        assert_eq!(sent, json!({ "username": "ana", "password": "hunter22" }));
    }

    #[tokio::test]
    async fn the_backend_message_is_kept() {
        let transport = FakeTransport::new();
        transport.on(
            Method::POST,
            "/auth/login/",
            401,
            json!({ "detail": "No active account found with the given credentials" }),
        );
        let client = testing::client(&transport);

        let got = login(&client, "ana", "wrong").await.unwrap_err();

        assert_eq!(
            got.to_string(),
            "No active account found with the given credentials"
        );
    }

    #[tokio::test]
    async fn fall_back_to_a_generic_message() {
        let transport = FakeTransport::new();
        transport.on(Method::POST, "/auth/login/", 500, json!(null));
        let client = testing::client(&transport);

        let got = login(&client, "ana", "wrong").await.unwrap_err();

        match got {
            LoginError::Rejected { message } => {
                assert_eq!(message, DEFAULT_LOGIN_FAILURE)
            },
            other => panic!("Unexpected error: {:?}", other),
        }
    }
}
