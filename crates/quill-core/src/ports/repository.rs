use async_trait::async_trait;

use crate::domain::{Post, PostFields, PostFilter};
use crate::error::RepoError;

/// Post store - owns the post records and the slug index.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Store a new post, assigning its id and timestamps.
    /// Fails with `DuplicateSlug` if the slug is taken.
    async fn insert(&self, fields: PostFields) -> Result<Post, RepoError>;

    /// Find a post by its id.
    async fn get(&self, id: i64) -> Result<Post, RepoError>;

    /// Find a post by its slug.
    async fn get_by_slug(&self, slug: &str) -> Result<Post, RepoError>;

    /// Replace the mutable fields of a post and bump `updated_at`.
    /// Fails with `DuplicateSlug` if the slug belongs to another post.
    async fn update(&self, id: i64, fields: PostFields) -> Result<Post, RepoError>;

    /// Permanently remove a post.
    async fn delete(&self, id: i64) -> Result<(), RepoError>;

    /// One page of matching posts in ascending id order, plus the total
    /// number of matches.
    async fn list(
        &self,
        filter: &PostFilter,
        skip: u64,
        limit: u64,
    ) -> Result<(Vec<Post>, u64), RepoError>;

    /// Every matching post in ascending id order.
    async fn find_all(&self, filter: &PostFilter) -> Result<Vec<Post>, RepoError>;

    /// Atomically add one to the view counter and return the new count.
    async fn increment_views(&self, id: i64) -> Result<i64, RepoError>;

    /// Backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;
}
