//! Plain HTTP plumbing. Nothing in here knows about tokens or sessions.

use crate::{Config, DEFAULT_USER_AGENT};
use async_trait::async_trait;
use reqwest::{
    header::{
        HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue,
        AUTHORIZATION, CONTENT_TYPE,
    },
    Client, Method, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};
use url::Url;

/// Something which can perform a single HTTP request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: HttpRequest,
    ) -> Result<HttpResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// A fully buffered response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: Vec<u8>) -> Self {
        HttpResponse {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }

    /// Did the server answer with a `2xx` status?
    pub fn is_success(&self) -> bool { self.status.is_success() }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The method, headers and body of a request, minus its destination.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        RequestOptions {
            method,
            ..Default::default()
        }
    }

    pub fn get() -> Self { RequestOptions::new(Method::GET) }

    pub fn delete() -> Self { RequestOptions::new(Method::DELETE) }

    /// A request carrying `body` encoded as JSON.
    pub fn json<T>(method: Method, body: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(body)?;

        Ok(RequestOptions {
            method,
            headers: HeaderMap::new(),
            body: Some(body),
        })
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Present `token` as a bearer credential, replacing any
    /// `Authorization` header that was already set.
    pub fn bearer(self, token: &str) -> Result<Self, InvalidHeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
        value.set_sensitive(true);

        Ok(self.header(AUTHORIZATION, value))
    }

    /// The JSON content type, overridden by whatever the caller supplied.
    fn merged_headers(headers: HeaderMap) -> HeaderMap {
        let mut merged = HeaderMap::new();
        merged.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        merged.extend(headers);
        merged
    }
}

/// A [`Transport`] bound to the backend's base URL.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base_url: Url,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, base_url: Url) -> Self {
        ApiClient {
            transport,
            base_url,
        }
    }

    /// Talk to the backend named in `config` over a real HTTP connection.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let transport = ReqwestTransport::with_user_agent(DEFAULT_USER_AGENT)?;

        Ok(ApiClient::new(Arc::new(transport), config.base_url.clone()))
    }

    pub fn base_url(&self) -> &Url { &self.base_url }

    /// Resolve an endpoint such as `/finance/budget/` against the base URL.
    ///
    /// The endpoint is appended verbatim, so a base URL with a path prefix
    /// (e.g. `https://example.com/api`) keeps it.
    pub fn url(&self, endpoint: &str) -> Result<Url, TransportError> {
        let raw = format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            endpoint
        );

        Url::parse(&raw).map_err(|e| TransportError::BadUrl(raw, e))
    }

    /// Send a single request. No retries, no timeout.
    pub async fn send(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse, TransportError> {
        let RequestOptions {
            method,
            headers,
            body,
        } = options;

        let request = HttpRequest {
            method,
            url: self.url(endpoint)?,
            headers: RequestOptions::merged_headers(headers),
            body,
        };

        self.transport.send(request).await
    }
}

impl Debug for ApiClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

/// The production [`Transport`], backed by [`reqwest`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self { ReqwestTransport { client } }

    pub fn with_user_agent(user_agent: &str) -> Result<Self, reqwest::Error> {
        Client::builder()
            .user_agent(user_agent)
            .build()
            .map(ReqwestTransport::new)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        log::debug!("Sending a {} request to {}", method, url);
        let mut builder = self.client.request(method, url).headers(headers);

        if let Some(body) = body {
            log::trace!("Payload: {} bytes", body.len());
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(TransportError::classify)?;
        let status = response.status();
        let headers = response.headers().clone();

        log::debug!("Received {}", status);
        log::trace!("Headers: {:#?}", headers);

        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// The request never produced a response.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP client encountered an error.
    #[error("Unable to send the request")]
    HttpClient(#[from] reqwest::Error),
    /// We couldn't connect to the server at all.
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("\"{0}\" is not a valid URL")]
    BadUrl(String, #[source] url::ParseError),
}

impl TransportError {
    fn classify(err: reqwest::Error) -> TransportError {
        if err.is_connect() || err.is_timeout() {
            TransportError::Connection(err.to_string())
        } else {
            TransportError::HttpClient(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTransport;
    use serde_json::json;

    #[test]
    fn endpoints_keep_the_base_path() {
        let transport = FakeTransport::new();
        let client = crate::testing::client(&transport);

        let got = client.url("/finance/budget/").unwrap();

        assert_eq!(got.as_str(), "http://backend.test/api/finance/budget/");
    }

    #[test]
    fn trailing_slashes_on_the_base_are_ignored() {
        let client = ApiClient::new(
            FakeTransport::new(),
            "https://example.com/api/".parse().unwrap(),
        );

        let got = client.url("/auth/me/").unwrap();

        assert_eq!(got.as_str(), "https://example.com/api/auth/me/");
    }

    #[test]
    fn caller_headers_override_the_content_type() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let merged = RequestOptions::merged_headers(headers);

        assert_eq!(merged.get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(merged[CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn bearer_replaces_an_existing_authorization_header() {
        let options = RequestOptions::get()
            .header(AUTHORIZATION, HeaderValue::from_static("Basic abc"))
            .bearer("TOKEN")
            .unwrap();

        assert_eq!(options.headers[AUTHORIZATION], "Bearer TOKEN");
        assert!(options.headers[AUTHORIZATION].is_sensitive());
    }

    #[tokio::test]
    async fn every_request_is_sent_as_json() {
        let transport = FakeTransport::new();
        transport.on(Method::POST, "/auth/login/", 200, json!({}));
        let client = crate::testing::client(&transport);
        let options =
            RequestOptions::json(Method::POST, &json!({ "a": 1 })).unwrap();

        let response = client.send("/auth/login/", options).await.unwrap();

        assert!(response.is_success());
        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].headers[CONTENT_TYPE], "application/json");
        assert_eq!(sent[0].body.as_deref(), Some(&b"{\"a\":1}"[..]));
    }
}
