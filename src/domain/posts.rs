//! Post inputs accepted from callers before they are forwarded upstream.

use serde::{Deserialize, Serialize};

use super::error::DomainError;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub user_id: i64,
    pub title: String,
    pub body: String,
}

impl NewPost {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_user_id(self.user_id)
    }
}

/// Partial update; absent fields are left untouched upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl PostPatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        match self.user_id {
            Some(user_id) => validate_user_id(user_id),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.page == 0 {
            return Err(DomainError::validation("page must be at least 1"));
        }
        if self.limit == 0 {
            return Err(DomainError::validation("limit must be at least 1"));
        }
        Ok(())
    }
}

fn validate_user_id(user_id: i64) -> Result<(), DomainError> {
    if user_id < 1 {
        return Err(DomainError::validation("userId must be at least 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn page_query_defaults_to_first_page_of_ten() {
        let query: PageQuery = serde_json::from_value(json!({})).expect("decode query");
        assert_eq!(query, PageQuery::new(1, 10));
        assert!(query.validate().is_ok());
    }

    #[test]
    fn zero_page_or_limit_is_rejected() {
        assert!(PageQuery::new(0, 10).validate().is_err());
        assert!(PageQuery::new(1, 0).validate().is_err());
    }

    #[test]
    fn new_post_requires_positive_owner() {
        let post = NewPost {
            user_id: 0,
            title: "t".to_string(),
            body: "b".to_string(),
        };
        let err = post.validate().expect_err("owner id 0 is invalid");
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let patch = PostPatch {
            title: Some("T2".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).expect("serialize patch"),
            json!({"title": "T2"})
        );
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn patch_with_invalid_owner_is_rejected() {
        let patch = PostPatch {
            user_id: Some(-4),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }
}
