use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};
use std::fmt::{self, Debug, Formatter};

/// The signed-in user, as returned by `GET /auth/me/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    /// Has the user already been walked through the app?
    #[serde(default)]
    pub has_seen_onboarding: bool,
}

/// The credentials handed out by a successful login.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

impl Debug for TokenPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &self.refresh.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    #[test]
    fn parse_a_profile() {
        let src = json!({
            "id": 7,
            "username": "ana",
            "email": "ana@example.com",
            "date_joined": "2024-03-01T12:30:00.123456Z",
            "last_login": null,
            "has_seen_onboarding": true,
        });
        let should_be = UserProfile {
            username: String::from("ana"),
            email: String::from("ana@example.com"),
            date_joined: Some(
                Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
                    + Duration::microseconds(123_456),
            ),
            last_login: None,
            has_seen_onboarding: true,
        };

        let got: UserProfile = serde_json::from_value(src).unwrap();

        assert_eq!(got, should_be);
    }

    #[test]
    fn onboarding_defaults_to_unseen() {
        let got: UserProfile =
            serde_json::from_value(json!({ "username": "ana" })).unwrap();

        assert!(!got.has_seen_onboarding);
        assert_eq!(got.email, "");
    }

    #[test]
    fn tokens_are_never_printed() {
        let tokens = TokenPair {
            access: String::from("SECRET-ACCESS"),
            refresh: Some(String::from("SECRET-REFRESH")),
        };

        let printed = format!("{:?}", tokens);

        assert!(!printed.contains("SECRET"));
    }
}
