use crate::{ApiClient, RequestOptions, TransportError, UserProfile};
use reqwest::{header::InvalidHeaderValue, StatusCode};

/// Fetch the profile belonging to `token`.
///
/// This deliberately bypasses the [`Gateway`](crate::Gateway): the session
/// manager decides for itself what a rejected token means.
pub async fn current_user(
    client: &ApiClient,
    token: &str,
) -> Result<UserProfile, ProfileError> {
    let options = RequestOptions::get().bearer(token)?;
    let response = client.send("/auth/me/", options).await?;

    if !response.is_success() {
        return Err(ProfileError::Rejected {
            status: response.status,
        });
    }

    log::trace!("Profile: {}", response.text());

    response.json().map_err(ProfileError::from)
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Unable to send the request")]
    Network(#[from] TransportError),
    #[error("The access token can't be sent in a header")]
    InvalidToken(#[from] InvalidHeaderValue),
    /// The backend wouldn't hand over the profile, usually because the
    /// token has expired.
    #[error("The profile request was rejected with {}", status)]
    Rejected { status: StatusCode },
    #[error("Unable to parse the profile")]
    ResponseParse(#[from] serde_json::Error),
}
