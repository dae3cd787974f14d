//! Post service - validation and business rules for blog posts.

use std::sync::Arc;

use crate::domain::{Page, Post, PostDraft, PostFilter, PostPatch};
use crate::error::{DomainError, RepoError};
use crate::ports::PostRepository;

/// Characters kept when an excerpt is derived from content.
pub const DEFAULT_EXCERPT_LEN: usize = 200;
/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: i64 = 10;
/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Create/read/update/delete and listing of posts.
///
/// The service never touches records directly; every change goes through
/// the [`PostRepository`].
#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostRepository>,
    excerpt_len: usize,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self {
            repo,
            excerpt_len: DEFAULT_EXCERPT_LEN,
        }
    }

    pub fn with_excerpt_len(mut self, excerpt_len: usize) -> Self {
        self.excerpt_len = excerpt_len;
        self
    }

    pub fn backend(&self) -> &'static str {
        self.repo.backend()
    }

    pub async fn create_post(&self, draft: PostDraft) -> Result<Post, DomainError> {
        let fields = draft.into_fields(self.excerpt_len)?;
        let post = self.repo.insert(fields).await?;
        tracing::info!(post_id = post.id, slug = %post.slug, "Post created");
        Ok(post)
    }

    /// Fetch a post and count the read.
    pub async fn get_post(&self, id: i64) -> Result<Post, DomainError> {
        let post = self.repo.get(id).await.map_err(|e| not_found(e, id))?;
        Ok(self.record_view(post).await)
    }

    /// Fetch a post by slug and count the read.
    pub async fn get_post_by_slug(&self, slug: &str) -> Result<Post, DomainError> {
        let post = self
            .repo
            .get_by_slug(slug)
            .await
            .map_err(|e| not_found(e, slug))?;
        Ok(self.record_view(post).await)
    }

    pub async fn list_posts(
        &self,
        skip: i64,
        limit: i64,
        filter: PostFilter,
    ) -> Result<Page<Post>, DomainError> {
        if skip < 0 {
            return Err(DomainError::Validation(
                "skip must not be negative".to_string(),
            ));
        }
        if limit <= 0 || limit > MAX_PAGE_SIZE {
            return Err(DomainError::Validation(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        let (items, total) = self.repo.list(&filter, skip as u64, limit as u64).await?;
        tracing::debug!(skip, limit, total, returned = items.len(), "Listed posts");
        Ok(Page { total, items })
    }

    /// Replace every field of a post.
    pub async fn update_post(&self, id: i64, draft: PostDraft) -> Result<Post, DomainError> {
        // Existence is checked first so an unknown id is a 404 even when the
        // payload is also invalid.
        self.repo.get(id).await.map_err(|e| not_found(e, id))?;
        self.replace(id, draft).await
    }

    /// Change only the fields present in the patch.
    pub async fn patch_post(&self, id: i64, patch: PostPatch) -> Result<Post, DomainError> {
        let existing = self.repo.get(id).await.map_err(|e| not_found(e, id))?;
        self.replace(id, patch.merge_into(&existing)).await
    }

    pub async fn set_published(&self, id: i64, published: bool) -> Result<Post, DomainError> {
        self.patch_post(id, PostPatch::published(published)).await
    }

    pub async fn delete_post(&self, id: i64) -> Result<(), DomainError> {
        self.repo.delete(id).await.map_err(|e| not_found(e, id))?;
        tracing::info!(post_id = id, "Post deleted");
        Ok(())
    }

    pub async fn list_by_tag(&self, tag: &str) -> Result<Vec<Post>, DomainError> {
        Ok(self.repo.find_all(&PostFilter::by_tag(tag)).await?)
    }

    pub async fn list_by_author(&self, author: &str) -> Result<Vec<Post>, DomainError> {
        Ok(self.repo.find_all(&PostFilter::by_author(author)).await?)
    }

    async fn replace(&self, id: i64, draft: PostDraft) -> Result<Post, DomainError> {
        let fields = draft.into_fields(self.excerpt_len)?;
        let post = self
            .repo
            .update(id, fields)
            .await
            .map_err(|e| not_found(e, id))?;
        tracing::info!(post_id = id, slug = %post.slug, "Post updated");
        Ok(post)
    }

    async fn record_view(&self, mut post: Post) -> Post {
        match self.repo.increment_views(post.id).await {
            Ok(views) => post.views = views,
            Err(e) => {
                tracing::warn!(post_id = post.id, error = %e, "Failed to record post view");
            }
        }
        post
    }
}

fn not_found(err: RepoError, key: impl ToString) -> DomainError {
    match err {
        RepoError::NotFound => DomainError::post_not_found(key),
        other => other.into(),
    }
}
