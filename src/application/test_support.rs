//! In-process fakes for service tests.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use serde_json::Value;

use super::repos::{CacheError, EntityCache, UpstreamClient, UpstreamError};

#[derive(Debug, Clone, PartialEq)]
pub enum CacheCall {
    Get(String),
    Set(String, Duration),
    Delete(String),
}

/// Map-backed cache that records every call and can be told to fail or hang.
#[derive(Default)]
pub struct RecordingCache {
    entries: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<CacheCall>>,
    pub fail_get: AtomicBool,
    pub fail_set: AtomicBool,
    pub fail_delete: AtomicBool,
    pub hang: AtomicBool,
}

impl RecordingCache {
    pub fn seed(&self, key: &str, value: Value) {
        self.entries
            .lock()
            .expect("entries lock")
            .insert(key.to_string(), value);
    }

    pub fn entry(&self, key: &str) -> Option<Value> {
        self.entries.lock().expect("entries lock").get(key).cloned()
    }

    pub fn calls(&self) -> Vec<CacheCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                CacheCall::Delete(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn sets(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                CacheCall::Set(key, _) => Some(key),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: CacheCall) {
        self.calls.lock().expect("calls lock").push(call);
    }

    async fn maybe_hang(&self) {
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl EntityCache for RecordingCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        self.record(CacheCall::Get(key.to_string()));
        self.maybe_hang().await;
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(CacheError::backend("get rejected"));
        }
        Ok(self.entry(key))
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError> {
        self.record(CacheCall::Set(key.to_string(), ttl));
        self.maybe_hang().await;
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(CacheError::backend("set rejected"));
        }
        self.seed(key, value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.record(CacheCall::Delete(key.to_string()));
        self.maybe_hang().await;
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(CacheError::backend("delete rejected"));
        }
        self.entries.lock().expect("entries lock").remove(key);
        Ok(())
    }
}

/// Canned upstream outcome; converted into a fresh [`UpstreamError`] per call.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
    Transport,
    Timeout,
}

impl Reply {
    fn into_result(self) -> Result<Value, UpstreamError> {
        match self {
            Reply::Json(value) => Ok(value),
            Reply::Status(status) => Err(UpstreamError::status(status, "scripted failure")),
            Reply::Transport => Err(UpstreamError::transport("connection refused")),
            Reply::Timeout => Err(UpstreamError::Timeout),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamCall {
    pub method: &'static str,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Upstream that answers from a `(method, path)` script and records every request.
#[derive(Default)]
pub struct ScriptedUpstream {
    replies: Mutex<HashMap<(&'static str, String), Reply>>,
    calls: Mutex<Vec<UpstreamCall>>,
}

impl ScriptedUpstream {
    pub fn reply(&self, method: &'static str, path: &str, reply: Reply) {
        self.replies
            .lock()
            .expect("replies lock")
            .insert((method, path.to_string()), reply);
    }

    pub fn calls(&self) -> Vec<UpstreamCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn answer(
        &self,
        method: &'static str,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, UpstreamError> {
        self.calls.lock().expect("calls lock").push(UpstreamCall {
            method,
            path: path.to_string(),
            query: query
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
            body: body.cloned(),
        });
        self.replies
            .lock()
            .expect("replies lock")
            .get(&(method, path.to_string()))
            .cloned()
            .unwrap_or(Reply::Status(404))
            .into_result()
    }
}

#[async_trait]
impl UpstreamClient for ScriptedUpstream {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, UpstreamError> {
        self.answer("GET", path, query, None)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, UpstreamError> {
        self.answer("POST", path, &[], Some(body))
    }

    async fn patch(&self, path: &str, body: &Value) -> Result<Value, UpstreamError> {
        self.answer("PATCH", path, &[], Some(body))
    }

    async fn delete(&self, path: &str) -> Result<Value, UpstreamError> {
        self.answer("DELETE", path, &[], None)
    }
}
