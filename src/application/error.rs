use std::error::Error as StdError;

use axum::{http::StatusCode, response::Response};
use thiserror::Error;

use crate::{application::repos::UpstreamError, config::LoadError, infra::error::InfraError};

/// Diagnostic payload attached to failed responses for the logging middleware.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// The error taxonomy exposed by the post and user services.
///
/// The `Display` output is the caller-facing message; the originating upstream failure is
/// only reachable through [`StdError::source`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    NotFound {
        message: String,
        #[source]
        source: UpstreamError,
    },
    #[error("{message}")]
    Upstream {
        message: String,
        #[source]
        source: UpstreamError,
    },
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>, source: UpstreamError) -> Self {
        Self::NotFound {
            message: message.into(),
            source,
        }
    }

    pub fn upstream(message: impl Into<String>, source: UpstreamError) -> Self {
        Self::Upstream {
            message: message.into(),
            source,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ServiceError::NotFound { message, .. } | ServiceError::Upstream { message, .. } => {
                message
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }
}

/// Translate a failure on a by-id call: upstream 404 becomes `NotFound`, everything else
/// becomes `Upstream` with the operation message.
pub(crate) fn translate_by_id(
    source: UpstreamError,
    not_found: impl FnOnce() -> String,
    fallback: impl FnOnce() -> String,
) -> ServiceError {
    if source.is_not_found() {
        ServiceError::not_found(not_found(), source)
    } else {
        ServiceError::upstream(fallback(), source)
    }
}

/// Translate a failure on a collection call, where no single id can be missing.
pub(crate) fn translate_collection(source: UpstreamError, message: &str) -> ServiceError {
    ServiceError::upstream(message, source)
}

/// Errors that abort the process during bootstrap.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
