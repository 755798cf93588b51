//! Cache-aside access shared by the post and user services.
//!
//! The cache only ever saves latency. Every failure here (backend error, timeout, an
//! entry that no longer decodes) is logged and absorbed, so callers see a miss on reads and
//! nothing at all on writes.

use std::{future::Future, sync::Arc, time::Duration};

use metrics::counter;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::cache::{CacheKey, ENTRY_TTL};

use super::repos::{CacheError, EntityCache};

const METRIC_CACHE_HIT: &str = "postgate_cache_hit_total";
const METRIC_CACHE_MISS: &str = "postgate_cache_miss_total";
const METRIC_CACHE_ERROR: &str = "postgate_cache_error_total";

#[derive(Clone)]
pub struct CacheAside {
    backend: Arc<dyn EntityCache>,
    timeout: Duration,
}

impl CacheAside {
    pub fn new(backend: Arc<dyn EntityCache>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    /// Read `key`, treating any failure as a miss.
    pub async fn lookup<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let name = key.to_string();
        let entity = key.entity();

        let outcome = self
            .bounded(self.backend.get(&name))
            .await
            .and_then(|value| {
                value
                    .map(serde_json::from_value::<T>)
                    .transpose()
                    .map_err(|err| CacheError::Codec(err.to_string()))
            });

        match outcome {
            Ok(Some(value)) => {
                counter!(METRIC_CACHE_HIT, "entity" => entity).increment(1);
                debug!(cache_key = %name, "cache hit");
                Some(value)
            }
            Ok(None) => {
                counter!(METRIC_CACHE_MISS, "entity" => entity).increment(1);
                None
            }
            Err(err) => {
                counter!(METRIC_CACHE_ERROR, "entity" => entity, "op" => "get").increment(1);
                counter!(METRIC_CACHE_MISS, "entity" => entity).increment(1);
                warn!(cache_key = %name, error = %err, "cache read failed; treating as miss");
                None
            }
        }
    }

    /// Write `value` under `key` with the fixed entry lifetime.
    pub async fn store<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let name = key.to_string();
        let result = match serde_json::to_value(value) {
            Ok(encoded) => self.bounded(self.backend.set(&name, encoded, ENTRY_TTL)).await,
            Err(err) => Err(CacheError::Codec(err.to_string())),
        };

        if let Err(err) = result {
            counter!(METRIC_CACHE_ERROR, "entity" => key.entity(), "op" => "set").increment(1);
            warn!(cache_key = %name, error = %err, "failed to cache data");
        }
    }

    /// Delete `key`. A failed delete is left to expire on its own.
    pub async fn invalidate(&self, key: &CacheKey) {
        let name = key.to_string();
        match self.bounded(self.backend.delete(&name)).await {
            Ok(()) => debug!(cache_key = %name, "cache entry invalidated"),
            Err(err) => {
                counter!(METRIC_CACHE_ERROR, "entity" => key.entity(), "op" => "delete")
                    .increment(1);
                warn!(cache_key = %name, error = %err, "failed to invalidate cache entry");
            }
        }
    }

    async fn bounded<T>(
        &self,
        operation: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        tokio::time::timeout(self.timeout, operation)
            .await
            .unwrap_or(Err(CacheError::Timeout))
    }
}
