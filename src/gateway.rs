use crate::{
    ApiClient, HttpResponse, RequestOptions, SessionManager, TransportError,
};
use reqwest::{header::InvalidHeaderValue, StatusCode};

/// The one way to make a request on the user's behalf.
///
/// The gateway wraps a plain [`ApiClient`], attaching the session's bearer
/// token on the way out. On the way back a `401` ends the session before
/// the caller ever sees the response. Every other status is handed back
/// untouched, so callers must check [`HttpResponse::is_success()`]
/// themselves.
///
/// Any `401` counts, even one caused by a misconfigured endpoint rather
/// than a bad token.
#[derive(Debug, Clone)]
pub struct Gateway {
    session: SessionManager,
}

impl Gateway {
    pub fn new(session: SessionManager) -> Self { Gateway { session } }

    pub fn session(&self) -> &SessionManager { &self.session }

    pub fn client(&self) -> &ApiClient { self.session.client() }

    /// Send a single request to `endpoint` (e.g. `/finance/budget/`).
    pub async fn send(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse, GatewayError> {
        let options = match self.session.token() {
            Some(token) => options.bearer(&token)?,
            None => options,
        };

        let response = self.client().send(endpoint, options).await?;

        if response.status == StatusCode::UNAUTHORIZED {
            log::warn!("{} was rejected with a 401, logging out", endpoint);
            self.session.logout();
            return Err(GatewayError::SessionExpired);
        }

        Ok(response)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The backend said `401` and the session is gone. Whatever the request
    /// was meant to do, its result can't be relied on.
    #[error("The session has expired")]
    SessionExpired,
    #[error("Unable to reach the server")]
    Network(#[from] TransportError),
    #[error("The access token can't be sent in a header")]
    InvalidToken(#[from] InvalidHeaderValue),
}
