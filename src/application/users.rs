//! Cache-aside user lookup.

use std::sync::Arc;

use tracing::{debug, error};

use crate::cache::CacheKey;
use crate::domain::entities::User;

use super::cache_aside::CacheAside;
use super::error::{ServiceError, translate_by_id};
use super::repos::{UpstreamClient, UpstreamError, decode_payload};

#[derive(Clone)]
pub struct UserService {
    upstream: Arc<dyn UpstreamClient>,
    cache: CacheAside,
}

impl UserService {
    pub fn new(upstream: Arc<dyn UpstreamClient>, cache: CacheAside) -> Self {
        Self { upstream, cache }
    }

    pub async fn find_one(&self, id: i64) -> Result<User, ServiceError> {
        let key = CacheKey::User(id);

        if let Some(user) = self.cache.lookup::<User>(&key).await {
            debug!(user_id = id, "using cached user");
            return Ok(user);
        }

        debug!(user_id = id, "fetching user");
        let user = self.fetch(id).await.map_err(|err| {
            if !err.is_not_found() {
                error!(user_id = id, error = %err, "error fetching user");
            }
            translate_by_id(
                err,
                || format!("User with id {id} not found"),
                || "An error occurred while fetching the user".to_string(),
            )
        })?;

        self.cache.store(&key, &user).await;
        Ok(user)
    }

    async fn fetch(&self, id: i64) -> Result<User, UpstreamError> {
        let payload = self.upstream.get(&id.to_string(), &[]).await?;
        decode_payload(payload)
    }
}
