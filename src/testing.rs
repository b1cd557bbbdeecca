//! Test doubles for the transport seam.

use crate::{
    ApiClient, Gateway, HttpRequest, HttpResponse, MemoryStorage, SessionManager,
    Transport, TransportError,
};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tokio::sync::Notify;

pub(crate) const BASE_URL: &str = "http://backend.test/api";

#[derive(Debug, Clone)]
enum Reply {
    Respond(StatusCode, Vec<u8>),
    Unreachable,
}

/// Answers requests from a table of canned replies and remembers
/// everything it was sent. Unknown routes get a `404`.
#[derive(Debug, Default)]
pub(crate) struct FakeTransport {
    replies: Mutex<HashMap<(Method, String), Reply>>,
    gates: Mutex<HashMap<(Method, String), Arc<Notify>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Arc<FakeTransport> { Arc::new(FakeTransport::default()) }

    /// Reply to `method endpoint` with `status` and a JSON body. A `null`
    /// body is sent as an empty body.
    pub(crate) fn on(&self, method: Method, endpoint: &str, status: u16, body: Value) {
        let body = match body {
            Value::Null => Vec::new(),
            other => serde_json::to_vec(&other).unwrap(),
        };
        self.on_raw(method, endpoint, status, body);
    }

    pub(crate) fn on_raw(
        &self,
        method: Method,
        endpoint: &str,
        status: u16,
        body: Vec<u8>,
    ) {
        let status = StatusCode::from_u16(status).unwrap();
        self.replies
            .lock()
            .unwrap()
            .insert((method, path(endpoint)), Reply::Respond(status, body));
    }

    /// Pretend the server can't be reached for this route.
    pub(crate) fn unreachable(&self, method: Method, endpoint: &str) {
        self.replies
            .lock()
            .unwrap()
            .insert((method, path(endpoint)), Reply::Unreachable);
    }

    /// Hold every reply to `method endpoint` until the returned gate is
    /// notified. The request itself is recorded straight away.
    pub(crate) fn hold(&self, method: Method, endpoint: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert((method, path(endpoint)), gate.clone());
        gate
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn path(endpoint: &str) -> String { format!("/api{}", endpoint) }

#[async_trait]
impl Transport for FakeTransport {
    async fn send(
        &self,
        request: HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        let key = (request.method.clone(), request.url.path().to_string());
        self.requests.lock().unwrap().push(request);

        let gate = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let reply = self.replies.lock().unwrap().get(&key).cloned();

        match reply {
            Some(Reply::Respond(status, body)) => {
                Ok(HttpResponse::new(status, body))
            },
            Some(Reply::Unreachable) => {
                Err(TransportError::Connection(String::from("connection refused")))
            },
            None => Ok(HttpResponse::new(StatusCode::NOT_FOUND, Vec::new())),
        }
    }
}

pub(crate) fn client(transport: &Arc<FakeTransport>) -> ApiClient {
    ApiClient::new(transport.clone(), BASE_URL.parse().unwrap())
}

pub(crate) fn session(
    transport: &Arc<FakeTransport>,
    storage: Arc<MemoryStorage>,
) -> SessionManager {
    SessionManager::new(client(transport), storage)
}

pub(crate) fn profile(username: &str) -> Value {
    json!({
        "username": username,
        "email": format!("{}@example.com", username),
        "date_joined": "2024-03-01T12:30:00Z",
        "last_login": "2024-05-02T08:15:00Z",
        "has_seen_onboarding": false,
    })
}

/// Make `/auth/login/` hand out `ACCESS`/`REFRESH` and `/auth/me/` return
/// a profile for `username`.
pub(crate) fn accept_login(transport: &FakeTransport, username: &str) {
    transport.on(
        Method::POST,
        "/auth/login/",
        200,
        json!({ "access": "ACCESS", "refresh": "REFRESH" }),
    );
    transport.on(Method::GET, "/auth/me/", 200, profile(username));
}

/// Keep yielding to the other branches of a `join!` until `done()`.
pub(crate) async fn wait_until<F>(mut done: F)
where
    F: FnMut() -> bool,
{
    while !done() {
        tokio::task::yield_now().await;
    }
}

/// A gateway whose session has already logged in as `ana`.
pub(crate) async fn gateway(transport: &Arc<FakeTransport>) -> Gateway {
    accept_login(transport, "ana");
    let session = session(transport, Arc::new(MemoryStorage::new()));
    session.login("ana", "hunter22").await.unwrap();

    Gateway::new(session)
}
