//! HTTP transport seam.
//!
//! The client builds fully signed [`HttpRequest`]s; a [`Transport`] only moves
//! bytes. Swapping the transport is how tests observe requests without a server.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::{Error, Result};

/// A request ready to send. `body` is the exact string that was signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    /// Path plus query string, relative to the host.
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_headers<K: ToString>(mut self, headers: impl IntoIterator<Item = (K, String)>) -> Self {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.to_string(), v)));
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }
}

/// A successful response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    /// 2xx body that is not JSON.
    Raw(String),
}

impl ResponseBody {
    /// Decode into an endpoint's schema. A raw body or a schema mismatch is an upstream error.
    #[allow(clippy::result_large_err)]
    pub fn decode<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            ResponseBody::Json(value) => {
                let text = value.to_string();
                serde_json::from_value(value).map_err(|e| {
                    warn!(error = %e, "Response does not match expected schema");
                    Error::upstream(None, text)
                })
            }
            ResponseBody::Raw(text) => Err(Error::upstream(None, text)),
        }
    }

    pub fn into_value(self) -> serde_json::Value {
        match self {
            ResponseBody::Json(value) => value,
            ResponseBody::Raw(text) => serde_json::Value::String(text),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request. Non-2xx statuses are `Error::Upstream`.
    async fn send(&self, request: HttpRequest) -> Result<ResponseBody>;
}

/// [`Transport`] over a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base_url: String,
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    #[allow(clippy::result_large_err)]
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("polymarket-clob-rs"));
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self {
            base_url: config.base_url().to_string(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<ResponseBody> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http_client.request(request.method.clone(), &url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, method = %request.method, path = %request.path, "HTTP request failed");
            e
        })?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                method = %request.method,
                path = %request.path,
                "Non-success response"
            );
            return Err(Error::upstream(Some(status.as_u16()), text));
        }

        debug!(status = status.as_u16(), method = %request.method, path = %request.path, "Response received");
        Ok(parse_body(text))
    }
}

/// JSON when it parses, raw text otherwise.
pub(crate) fn parse_body(text: String) -> ResponseBody {
    match serde_json::from_str(&text) {
        Ok(value) => ResponseBody::Json(value),
        Err(_) => ResponseBody::Raw(text),
    }
}
