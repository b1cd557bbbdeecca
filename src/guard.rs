//! Deciding what to show for a route based on the session.

use crate::Session;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Route {
    /// Only makes sense for a logged in user (budget, history, ...).
    Private,
    /// Only makes sense for an anonymous user (the login screen).
    Public,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Guard {
    /// We don't know who the user is yet. Show something neutral instead of
    /// redirecting prematurely.
    Loading,
    Render,
    RedirectToLogin,
    RedirectHome,
}

pub fn guard(session: &Session, route: Route) -> Guard {
    if session.loading {
        return Guard::Loading;
    }

    match (route, session.is_authenticated()) {
        (Route::Private, true) | (Route::Public, false) => Guard::Render,
        (Route::Private, false) => Guard::RedirectToLogin,
        (Route::Public, true) => Guard::RedirectHome,
    }
}
