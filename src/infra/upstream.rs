//! reqwest-backed [`UpstreamClient`] bound to one remote collection.

use std::time::Instant;

use async_trait::async_trait;
use metrics::histogram;
use reqwest::{Client, Method, Url};
use serde_json::Value;
use tracing::debug;

use crate::application::repos::{UpstreamClient, UpstreamError};
use crate::config::UpstreamSettings;

use super::error::InfraError;

const METRIC_UPSTREAM_LATENCY: &str = "postgate_upstream_request_ms";

pub fn user_agent() -> &'static str {
    concat!("postgate/", env!("CARGO_PKG_VERSION"))
}

/// Build the shared HTTP client carrying the configured request timeout.
pub fn build_client(settings: &UpstreamSettings) -> Result<Client, InfraError> {
    Client::builder()
        .user_agent(user_agent())
        .timeout(settings.request_timeout)
        .build()
        .map_err(|err| InfraError::http_client(err.to_string()))
}

#[derive(Clone, Debug)]
pub struct HttpUpstream {
    client: Client,
    collection: Url,
    name: &'static str,
}

impl HttpUpstream {
    /// Bind to `<base>/<collection>`; any path already on `base` is kept as a prefix.
    pub fn new(client: Client, base: &Url, collection: &'static str) -> Result<Self, InfraError> {
        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| {
                InfraError::configuration(format!("upstream url `{base}` cannot be a base"))
            })?
            .pop_if_empty()
            .push(collection);

        Ok(Self {
            client,
            collection: url,
            name: collection,
        })
    }

    pub fn collection_url(&self) -> &Url {
        &self.collection
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Url {
        let mut url = self.collection.clone();
        if !path.is_empty() {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.push(path);
            }
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, UpstreamError> {
        let url = self.url(path, query);
        debug!(method = %method, url = %url, "upstream request");

        let mut request = self.client.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let start = Instant::now();
        let result = Self::execute(request).await;
        histogram!(
            METRIC_UPSTREAM_LATENCY,
            "collection" => self.name,
            "method" => method.to_string()
        )
        .record(start.elapsed().as_secs_f64() * 1_000.0);

        result
    }

    async fn execute(request: reqwest::RequestBuilder) -> Result<Value, UpstreamError> {
        let response = request.send().await.map_err(classify)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(classify)?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes).trim().to_string();
            let message = if text.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string()
            } else {
                text
            };
            return Err(UpstreamError::status(status.as_u16(), message));
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(|err| UpstreamError::Decode(err.to_string()))
    }
}

fn classify(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::transport(err)
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstream {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, UpstreamError> {
        self.send(Method::GET, path, query, None).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, UpstreamError> {
        self.send(Method::POST, path, &[], Some(body)).await
    }

    async fn patch(&self, path: &str, body: &Value) -> Result<Value, UpstreamError> {
        self.send(Method::PATCH, path, &[], Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<Value, UpstreamError> {
        self.send(Method::DELETE, path, &[], None).await
    }
}
