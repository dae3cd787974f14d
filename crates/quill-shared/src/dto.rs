//! Data Transfer Objects - request types for the API.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/posts` and `PUT /api/posts/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "is_published")]
    pub published: bool,
}

/// Body of `PATCH /api/posts/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostPatchPayload {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(alias = "is_published")]
    pub published: Option<bool>,
}

/// Query string of `GET /api/posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPostsQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub author: Option<String>,
    pub tag: Option<String>,
    #[serde(default)]
    pub published_only: bool,
}
