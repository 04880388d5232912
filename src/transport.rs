use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{ClientConfig, TOKEN_HEADER};
use crate::error::{ChromaError, Result};
use crate::params::PathParams;

/// Minimal HTTP abstraction the clients are written against.
///
/// Implementations send one request to `path` (relative to their base
/// address) and return the decoded JSON body, or `Value::Null` for an empty
/// body. Non-2xx responses must surface as [`ChromaError::Transport`].
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value>;

    /// Short mode string for logging.
    fn mode(&self) -> &'static str {
        "custom"
    }
}

/// Default [`Transport`] backed by `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: reqwest::Url,
}

impl HttpTransport {
    /// Build a transport from configuration: base address plus the optional
    /// auth token header.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(token)
                .map_err(|e| ChromaError::Config(format!("invalid auth token: {e}")))?;
            headers.insert(TOKEN_HEADER, value);
        }
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ChromaError::Config(format!("failed to build http client: {e}")))?;
        Self::with_client(client, &config.uri)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, base_uri: &str) -> Result<Self> {
        // Url::join drops the last segment unless the base ends with '/'.
        let normalized = if base_uri.ends_with('/') {
            base_uri.to_string()
        } else {
            format!("{base_uri}/")
        };
        let base = reqwest::Url::parse(&normalized)
            .map_err(|e| ChromaError::Config(format!("invalid base uri {base_uri:?}: {e}")))?;
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &reqwest::Url {
        &self.base
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ChromaError::Config(format!("invalid request path {path:?}: {e}")))?;
        debug!(%method, %url, "chroma request");

        let mut request = self.client.request(method.clone(), url);
        if let Some(body) = body.as_ref() {
            request = request.json(body);
        }
        let response = request.send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            warn!(%method, path, status = status.as_u16(), "chroma request failed");
            return Err(ChromaError::Transport {
                status: status.as_u16(),
                body: text,
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| {
            ChromaError::Protocol(format!("undecodable response body from {path}: {e}"))
        })
    }

    fn mode(&self) -> &'static str {
        "http"
    }
}

/// Typed request helpers layered over a shared [`Transport`].
#[derive(Clone)]
pub(crate) struct Requester {
    transport: Arc<dyn Transport>,
}

impl Requester {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, template: &str, params: &PathParams) -> Result<T> {
        let value = self.send(Method::GET, template, params, None).await?;
        decode(template, value)
    }

    pub(crate) async fn post<B, T>(&self, template: &str, body: &B, params: &PathParams) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let value = self.send(Method::POST, template, params, Some(body)).await?;
        decode(template, value)
    }

    pub(crate) async fn post_unit<B>(&self, template: &str, body: &B, params: &PathParams) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.send(Method::POST, template, params, Some(body)).await?;
        Ok(())
    }

    pub(crate) async fn put<B>(&self, template: &str, body: &B, params: &PathParams) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.send(Method::PUT, template, params, Some(body)).await?;
        Ok(())
    }

    pub(crate) async fn delete(&self, template: &str, params: &PathParams) -> Result<()> {
        self.send(Method::DELETE, template, params, None).await?;
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        template: &str,
        params: &PathParams,
        body: Option<Value>,
    ) -> Result<Value> {
        let path = params.apply(template)?;
        self.transport.execute(method, &path, body).await
    }
}

fn decode<T: DeserializeOwned>(template: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        ChromaError::Protocol(format!("unexpected response shape for {template}: {e}"))
    })
}
