//! Post operations against the upstream API, with a cached post+user aggregate on reads.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::cache::CacheKey;
use crate::domain::entities::{Post, PostRecord, PostWithUser};
use crate::domain::posts::{NewPost, PageQuery, PostPatch};

use super::cache_aside::CacheAside;
use super::error::{ServiceError, translate_by_id, translate_collection};
use super::repos::{UpstreamClient, UpstreamError, decode_payload, encode_payload};
use super::users::UserService;

const CREATE_FAILED: &str = "Failed to create post";
const LIST_FAILED: &str = "Failed to fetch posts";
const SEARCH_FAILED: &str = "Failed to search posts";

#[derive(Clone)]
pub struct PostService {
    upstream: Arc<dyn UpstreamClient>,
    cache: CacheAside,
    users: UserService,
}

impl PostService {
    pub fn new(upstream: Arc<dyn UpstreamClient>, cache: CacheAside, users: UserService) -> Self {
        Self {
            upstream,
            cache,
            users,
        }
    }

    pub async fn create(&self, input: &NewPost) -> Result<Post, ServiceError> {
        let created = self
            .send_create(input)
            .await
            .map_err(|err| translate_collection(err, CREATE_FAILED))?;

        info!(post_id = created.id(), user_id = created.owner_id(), "post created");
        Ok(created)
    }

    pub async fn list(&self, page: PageQuery) -> Result<Vec<Post>, ServiceError> {
        let query = [
            ("_page", page.page.to_string()),
            ("_limit", page.limit.to_string()),
        ];
        self.fetch_many(&query)
            .await
            .map_err(|err| translate_collection(err, LIST_FAILED))
    }

    pub async fn search(&self, term: &str) -> Result<Vec<Post>, ServiceError> {
        let query = [("q", term.to_string())];
        self.fetch_many(&query)
            .await
            .map_err(|err| translate_collection(err, SEARCH_FAILED))
    }

    /// Fetch a post together with its owner, serving the composite from cache when present.
    ///
    /// Failures resolving the owner surface unchanged: an owner id the upstream cannot
    /// resolve is reported as the user's `NotFound`.
    pub async fn find_one(&self, id: i64) -> Result<PostWithUser, ServiceError> {
        let key = CacheKey::PostWithUser(id);

        if let Some(post) = self.cache.lookup::<PostWithUser>(&key).await {
            debug!(post_id = id, "using cached post");
            return Ok(post);
        }

        debug!(post_id = id, "fetching post");
        let post = self.fetch_record(id).await.map_err(|err| {
            if !err.is_not_found() {
                error!(post_id = id, error = %err, "error fetching post");
            }
            translate_by_id(
                err,
                || post_not_found(id),
                || format!("An error occurred while fetching the post with id {id}"),
            )
        })?;

        let user = self.users.find_one(post.user_id).await?;
        let composite = post.with_user(user);

        self.cache.store(&key, &composite).await;
        Ok(composite)
    }

    /// Apply a partial update upstream.
    ///
    /// The composite is invalidated once the upstream accepts the patch, even when the
    /// reply body then fails to decode.
    pub async fn update(&self, id: i64, patch: &PostPatch) -> Result<Post, ServiceError> {
        let failed = |err: UpstreamError| {
            translate_by_id(
                err,
                || post_not_found(id),
                || format!("Failed to update post with id {id}"),
            )
        };

        let payload = self.send_patch(id, patch).await.map_err(failed)?;
        self.cache.invalidate(&CacheKey::PostWithUser(id)).await;

        let updated: Post = decode_payload(payload).map_err(failed)?;
        info!(post_id = id, "post updated");
        Ok(updated)
    }

    pub async fn remove(&self, id: i64) -> Result<(), ServiceError> {
        self.upstream
            .delete(&id.to_string())
            .await
            .map_err(|err| {
                translate_by_id(
                    err,
                    || post_not_found(id),
                    || format!("Failed to delete post with id {id}"),
                )
            })?;

        self.cache.invalidate(&CacheKey::PostWithUser(id)).await;
        info!(post_id = id, "post deleted");
        Ok(())
    }

    async fn send_create(&self, input: &NewPost) -> Result<Post, UpstreamError> {
        let body = encode_payload(input)?;
        let payload = self.upstream.post("", &body).await?;
        decode_payload(payload)
    }

    async fn send_patch(&self, id: i64, patch: &PostPatch) -> Result<Value, UpstreamError> {
        let body = encode_payload(patch)?;
        self.upstream.patch(&id.to_string(), &body).await
    }

    async fn fetch_record(&self, id: i64) -> Result<PostRecord, UpstreamError> {
        let payload = self.upstream.get(&id.to_string(), &[]).await?;
        decode_payload(payload)
    }

    async fn fetch_many(&self, query: &[(&str, String)]) -> Result<Vec<Post>, UpstreamError> {
        let payload = self.upstream.get("", query).await?;
        decode_payload(payload)
    }
}

fn post_not_found(id: i64) -> String {
    format!("Post with id {id} not found")
}
