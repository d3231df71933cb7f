//! JSON-RPC over HTTP, the way the Deluge web UI speaks it.
//!
//! Every call is a `POST` to `<base url>/json` carrying the method name, its
//! positional parameters and a request id. The reply carries either a
//! `result` or an `error` object. Authentication happens through a session
//! cookie that the web UI hands out on `auth.login`, which the HTTP client
//! keeps for the following calls.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),
    #[error("invalid JSON-RPC reply")]
    Decode(#[from] serde_json::Error),
    #[error("{method} failed with code {code}: {message}")]
    Remote {
        method: String,
        code: i64,
        message: String,
    },
    #[error("{0} returned an unexpected result: {1}")]
    UnexpectedResult(String, Value),
    #[error("deadline reached before calling {0}")]
    Timeout(String),
    #[error("{0} cannot be used as a base URL")]
    InvalidUrl(Url),
}

/// A way of calling remote methods
#[async_trait]
pub trait Transport: Send + Sync {
    /// Calls `method` with the positional `params`, giving up at `deadline`
    async fn call(&self, method: &str, params: Value, deadline: Instant)
        -> Result<Value, RpcError>;
}

#[derive(Serialize, Debug)]
struct Request<'a> {
    method: &'a str,
    params: Value,
    id: u64,
}

#[derive(Deserialize, Debug)]
struct Response {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<Fault>,
}

#[derive(Deserialize, Debug)]
struct Fault {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: i64,
}

/// [`Transport`] that talks to the Deluge web UI over HTTP
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
    next_id: AtomicU64,
}

impl HttpTransport {
    /// Builds a transport for the web UI reachable at `base`
    pub fn new(base: &Url) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Self::with_client(client, base)
    }

    /// Builds a transport on top of an already configured HTTP client
    pub fn with_client(client: reqwest::Client, base: &Url) -> Result<Self, RpcError> {
        let mut endpoint = base.clone();
        endpoint
            .path_segments_mut()
            .map_err(|()| RpcError::InvalidUrl(base.clone()))?
            .pop_if_empty()
            .push("json");
        Ok(Self {
            client,
            endpoint,
            next_id: AtomicU64::new(1),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(
        &self,
        method: &str,
        params: Value,
        deadline: Instant,
    ) -> Result<Value, RpcError> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(RpcError::Timeout(method.to_owned()));
        }

        let request = Request {
            method,
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };
        let body = serde_json::to_string(&request)?;
        debug!(url = %self.endpoint, %body, "Sending HTTP request to Deluge.");

        let response = self
            .client
            .post(self.endpoint.clone())
            .timeout(remaining)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        let status = response.status();
        let body = response.error_for_status()?.text().await?;
        debug!(%status, %body, "Received response from Deluge.");

        let response: Response = serde_json::from_str(&body)?;
        match response.error {
            Some(fault) => Err(RpcError::Remote {
                method: method.to_owned(),
                code: fault.code,
                message: fault.message,
            }),
            None => Ok(response.result),
        }
    }
}
