use serde_json::{Map, Value};
use std::fmt::{self, Display, Formatter};

/// Keys the backend uses for messages which don't belong to one field.
const GENERAL_KEYS: [&str; 3] = ["detail", "error", "non_field_errors"];

/// Field-level errors reported by the backend, e.g.
/// `{"password": ["This password is too common."]}`.
///
/// The payload is kept exactly as it was received so a form can match each
/// message to its own field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors(Map<String, Value>);

impl ValidationErrors {
    /// Interpret an error body. Anything which isn't a JSON object is
    /// treated as a general message.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => ValidationErrors(fields),
            Ok(Value::Null) => ValidationErrors::default(),
            Ok(other) => ValidationErrors::general(other),
            Err(_) => {
                let text = String::from_utf8_lossy(body).trim().to_string();

                if text.is_empty() {
                    ValidationErrors::default()
                } else {
                    ValidationErrors::general(Value::String(text))
                }
            },
        }
    }

    fn general(message: Value) -> Self {
        let mut fields = Map::new();
        fields.insert(String::from("detail"), message);
        ValidationErrors(fields)
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Every message attached to `field`.
    pub fn messages(&self, field: &str) -> Vec<&str> {
        self.0.get(field).map(messages).unwrap_or_default()
    }

    /// The first message attached to `field`.
    pub fn field(&self, field: &str) -> Option<&str> {
        self.messages(field).into_iter().next()
    }

    /// The first message from the first of `fields` which has one.
    pub fn first_of(&self, fields: &[&str]) -> Option<&str> {
        fields.iter().find_map(|field| self.field(field))
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    pub fn as_json(&self) -> &Map<String, Value> { &self.0 }
}

fn messages(value: &Value) -> Vec<&str> {
    match value {
        Value::String(message) => vec![message.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("The request was rejected");
        }

        for (i, (field, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }

            let joined = messages(value).join(" ");
            let joined = if joined.is_empty() {
                value.to_string()
            } else {
                joined
            };

            if GENERAL_KEYS.contains(&field.as_str()) {
                f.write_str(&joined)?;
            } else {
                write!(f, "{}: {}", field, joined)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Problems with user input, caught before anything is sent.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("The passwords don't match")]
    PasswordMismatch,
    #[error("The password must be at least {} characters", min)]
    PasswordTooShort { min: usize },
    #[error("The current password is required")]
    MissingCurrentPassword,
    #[error("The password is required")]
    MissingPassword,
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),
    #[error("The amount must be greater than zero")]
    NonPositiveAmount,
    #[error("The number of people must be greater than zero")]
    NonPositiveHeadcount,
    #[error("{0} is too large")]
    TooLarge(String),
}

pub(crate) const MIN_PASSWORD_LEN: usize = 8;

/// The checks every "new password" form applies.
pub(crate) fn check_new_password(
    password: &str,
    confirmation: &str,
) -> Result<(), FormError> {
    if password != confirmation {
        return Err(FormError::PasswordMismatch);
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FormError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}
