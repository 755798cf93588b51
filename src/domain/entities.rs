//! Domain entities mirrored from the upstream API.
//!
//! Nothing here is persisted locally. Posts and users are projections of upstream state
//! that may be cached as JSON by the application layer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub suite: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zipcode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    pub lat: String,
    pub lng: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub catch_phrase: String,
    #[serde(default)]
    pub bs: String,
}

/// A post as it stands alone upstream, owned by `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub user_id: i64,
}

impl PostRecord {
    /// Replace the owner reference with the resolved owner.
    pub fn with_user(self, user: User) -> PostWithUser {
        let PostRecord {
            id,
            title,
            body,
            user_id: _,
        } = self;
        PostWithUser {
            id,
            title,
            body,
            user,
        }
    }
}

/// A post merged with its owning user. This is the only post shape that gets cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostWithUser {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub user: User,
}

/// Either shape of a post returned by the upstream API.
///
/// A payload carrying `user` decodes as [`Post::Enriched`]; otherwise `userId` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Post {
    Enriched(PostWithUser),
    Bare(PostRecord),
}

impl Post {
    pub fn id(&self) -> i64 {
        match self {
            Post::Enriched(post) => post.id,
            Post::Bare(post) => post.id,
        }
    }

    pub fn owner_id(&self) -> i64 {
        match self {
            Post::Enriched(post) => post.user.id,
            Post::Bare(post) => post.user_id,
        }
    }
}
