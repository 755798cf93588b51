//! Adapter traits describing the upstream REST API and the shared entity cache.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

const HTTP_NOT_FOUND: u16 = 404;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream responded with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("upstream transport failure: {0}")]
    Transport(String),
    #[error("upstream request timed out")]
    Timeout,
    #[error("malformed upstream payload: {0}")]
    Decode(String),
    #[error("request payload could not be encoded: {0}")]
    Encode(String),
}

impl UpstreamError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    /// HTTP status reported by the upstream, absent for transport-level failures.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.http_status() == Some(HTTP_NOT_FOUND)
    }
}

/// Decode an upstream payload, classifying shape mismatches as upstream failures.
pub fn decode_payload<T: DeserializeOwned>(payload: Value) -> Result<T, UpstreamError> {
    serde_json::from_value(payload).map_err(|err| UpstreamError::Decode(err.to_string()))
}

pub fn encode_payload<T: Serialize>(body: &T) -> Result<Value, UpstreamError> {
    serde_json::to_value(body).map_err(|err| UpstreamError::Encode(err.to_string()))
}

/// Operations against one remote collection endpoint.
///
/// `path` is relative to the collection: `""` addresses the collection itself and
/// `"42"` addresses the member with id 42.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, UpstreamError>;

    async fn post(&self, path: &str, body: &Value) -> Result<Value, UpstreamError>;

    async fn patch(&self, path: &str, body: &Value) -> Result<Value, UpstreamError>;

    async fn delete(&self, path: &str) -> Result<Value, UpstreamError>;
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend failure: {0}")]
    Backend(String),
    #[error("cache operation timed out")]
    Timeout,
    #[error("cached value could not be converted: {0}")]
    Codec(String),
}

impl CacheError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Async key-value store with per-entry TTL.
#[async_trait]
pub trait EntityCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
