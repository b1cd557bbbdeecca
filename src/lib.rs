//! An async client for the Hormigapp API, a tracker for small discretionary
//! ("ant") expenses.
//!
//! Everything that needs an identity goes through a [`Gateway`], which
//! borrows the bearer token from a [`SessionManager`] and tears the session
//! down as soon as the backend answers `401 Unauthorized`.

#![forbid(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

mod config;
pub mod endpoints;
mod finance;
pub mod format;
mod gateway;
mod guard;
mod profile;
mod session;
mod split;
mod storage;
#[cfg(test)]
mod testing;
mod transport;
mod validation;

pub use config::{Config, ConfigError, DEFAULT_BASE_URL};
pub use finance::{
    Budget, BudgetUpdate, Category, Expense, FixedExpense, HistoryPeriod,
    NewExpense, NewFixedExpense, UnknownCategory,
};
pub use gateway::{Gateway, GatewayError};
pub use guard::{guard, Guard, Route};
pub use profile::{TokenPair, UserProfile};
pub use session::{Session, SessionManager, SessionState};
pub use split::SharedExpense;
pub use storage::{
    FileStorage, MemoryStorage, SessionStorage, REFRESH_TOKEN_KEY,
    SESSION_START_KEY, TOKEN_KEY,
};
pub use transport::{
    ApiClient, HttpRequest, HttpResponse, ReqwestTransport, RequestOptions,
    Transport, TransportError,
};
pub use validation::{FormError, ValidationErrors};

/// The default user agent to use when communicating with the backend.
pub const DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION"));
