//! In-memory post store - used when no database is configured.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use quill_core::domain::{Post, PostFields, PostFilter};
use quill_core::error::RepoError;
use quill_core::ports::PostRepository;

#[derive(Default)]
struct Inner {
    /// Keyed by id; iteration order is creation order.
    posts: BTreeMap<i64, Post>,
    /// Secondary index: slug -> id.
    slugs: HashMap<String, i64>,
    last_id: i64,
}

impl Inner {
    fn slug_owner(&self, slug: &str) -> Option<i64> {
        self.slugs.get(slug).copied()
    }
}

/// In-memory post store behind an async RwLock.
///
/// Every mutation holds the write lock for its whole check-then-write, so
/// slug uniqueness holds under concurrent requests.
/// Note: Data is lost on process restart.
pub struct InMemoryPostStore {
    inner: RwLock<Inner>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl Default for InMemoryPostStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostStore {
    async fn insert(&self, fields: PostFields) -> Result<Post, RepoError> {
        let mut inner = self.inner.write().await;

        if inner.slug_owner(&fields.slug).is_some() {
            return Err(RepoError::DuplicateSlug(fields.slug));
        }

        inner.last_id += 1;
        let post = Post::new(inner.last_id, fields);
        inner.slugs.insert(post.slug.clone(), post.id);
        inner.posts.insert(post.id, post.clone());

        tracing::debug!(post_id = post.id, "Inserted post into memory store");
        Ok(post)
    }

    async fn get(&self, id: i64) -> Result<Post, RepoError> {
        let inner = self.inner.read().await;
        inner.posts.get(&id).cloned().ok_or(RepoError::NotFound)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Post, RepoError> {
        let inner = self.inner.read().await;
        inner
            .slug_owner(slug)
            .and_then(|id| inner.posts.get(&id))
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn update(&self, id: i64, fields: PostFields) -> Result<Post, RepoError> {
        let mut inner = self.inner.write().await;

        if !inner.posts.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        if let Some(owner) = inner.slug_owner(&fields.slug) {
            if owner != id {
                return Err(RepoError::DuplicateSlug(fields.slug));
            }
        }

        let new_slug = fields.slug.clone();
        let Some(post) = inner.posts.get_mut(&id) else {
            return Err(RepoError::NotFound);
        };
        let old_slug = post.slug.clone();
        post.apply(fields);
        let updated = post.clone();

        if old_slug != new_slug {
            inner.slugs.remove(&old_slug);
            inner.slugs.insert(new_slug, id);
        }

        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut inner = self.inner.write().await;
        let post = inner.posts.remove(&id).ok_or(RepoError::NotFound)?;
        inner.slugs.remove(&post.slug);
        Ok(())
    }

    async fn list(
        &self,
        filter: &PostFilter,
        skip: u64,
        limit: u64,
    ) -> Result<(Vec<Post>, u64), RepoError> {
        let inner = self.inner.read().await;
        let matching: Vec<&Post> = inner.posts.values().filter(|p| filter.matches(p)).collect();
        let total = matching.len() as u64;

        let items = matching
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok((items, total))
    }

    async fn find_all(&self, filter: &PostFilter) -> Result<Vec<Post>, RepoError> {
        let inner = self.inner.read().await;
        Ok(inner
            .posts
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn increment_views(&self, id: i64) -> Result<i64, RepoError> {
        let mut inner = self.inner.write().await;
        let post = inner.posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.views += 1;
        Ok(post.views)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use quill_core::domain::PostDraft;

    fn fields(slug: &str) -> PostFields {
        PostDraft {
            title: format!("Post {slug}"),
            slug: slug.to_string(),
            content: format!("content of {slug}"),
            author: "X".to_string(),
            ..PostDraft::default()
        }
        .into_fields(200)
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = InMemoryPostStore::new();
        let a = store.insert(fields("a")).await.unwrap();
        let b = store.insert(fields("b")).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(a.views, 0);
        assert_eq!(a.created_at, a.updated_at);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_slug() {
        let store = InMemoryPostStore::new();
        store.insert(fields("a")).await.unwrap();

        let err = store.insert(fields("a")).await.unwrap_err();
        assert!(matches!(err, RepoError::DuplicateSlug(slug) if slug == "a"));
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = InMemoryPostStore::new();
        store.insert(fields("a")).await.unwrap();
        store.delete(1).await.unwrap();

        let b = store.insert(fields("b")).await.unwrap();
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn test_update_moves_slug_index() {
        let store = InMemoryPostStore::new();
        store.insert(fields("a")).await.unwrap();

        let updated = store.update(1, fields("renamed")).await.unwrap();
        assert_eq!(updated.slug, "renamed");

        assert!(matches!(
            store.get_by_slug("a").await,
            Err(RepoError::NotFound)
        ));
        assert_eq!(store.get_by_slug("renamed").await.unwrap().id, 1);

        // The old slug is free again.
        store.insert(fields("a")).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_keeping_own_slug_succeeds() {
        let store = InMemoryPostStore::new();
        store.insert(fields("a")).await.unwrap();

        let mut same = fields("a");
        same.title = "New title".to_string();
        let updated = store.update(1, same).await.unwrap();
        assert_eq!(updated.title, "New title");
    }

    #[tokio::test]
    async fn test_update_rejects_slug_of_other_post() {
        let store = InMemoryPostStore::new();
        store.insert(fields("a")).await.unwrap();
        store.insert(fields("b")).await.unwrap();

        let err = store.update(2, fields("a")).await.unwrap_err();
        assert!(matches!(err, RepoError::DuplicateSlug(_)));
        assert_eq!(store.get(2).await.unwrap().slug, "b");
    }

    #[tokio::test]
    async fn test_missing_post_is_not_found() {
        let store = InMemoryPostStore::new();

        assert!(matches!(store.get(9).await, Err(RepoError::NotFound)));
        assert!(matches!(
            store.update(9, fields("a")).await,
            Err(RepoError::NotFound)
        ));
        assert!(matches!(store.delete(9).await, Err(RepoError::NotFound)));
        assert!(matches!(
            store.increment_views(9).await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_pages_in_creation_order() {
        let store = InMemoryPostStore::new();
        for i in 0..7 {
            store.insert(fields(&format!("p{i}"))).await.unwrap();
        }

        let (items, total) = store.list(&PostFilter::default(), 5, 5).await.unwrap();
        assert_eq!(total, 7);
        let ids: Vec<i64> = items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![6, 7]);

        let (items, total) = store.list(&PostFilter::default(), 10, 5).await.unwrap();
        assert_eq!(total, 7);
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_increment_views() {
        let store = InMemoryPostStore::new();
        store.insert(fields("a")).await.unwrap();

        assert_eq!(store.increment_views(1).await.unwrap(), 1);
        assert_eq!(store.increment_views(1).await.unwrap(), 2);
        assert_eq!(store.get(1).await.unwrap().views, 2);
    }

    const RACERS: usize = 16;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_of_one_slug_admit_exactly_one() {
        let store = Arc::new(InMemoryPostStore::new());

        let handles: Vec<_> = (0..RACERS)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.insert(fields("contested")).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(err) => assert!(matches!(err, RepoError::DuplicateSlug(_))),
            }
        }

        assert_eq!(created, 1);
        let (_, total) = store.list(&PostFilter::default(), 0, 100).await.unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_to_one_slug_admit_exactly_one() {
        let store = Arc::new(InMemoryPostStore::new());
        for i in 0..RACERS {
            store.insert(fields(&format!("p{i}"))).await.unwrap();
        }

        let handles: Vec<_> = (1..=RACERS as i64)
            .map(|id| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.update(id, fields("contested")).await })
            })
            .collect();

        let mut renamed = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => renamed += 1,
                Err(err) => assert!(matches!(err, RepoError::DuplicateSlug(_))),
            }
        }

        assert_eq!(renamed, 1);
        let owners = store
            .find_all(&PostFilter::default())
            .await
            .unwrap()
            .into_iter()
            .filter(|p| p.slug == "contested")
            .count();
        assert_eq!(owners, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_view_counts_are_distinct() {
        let store = Arc::new(InMemoryPostStore::new());
        store.insert(fields("a")).await.unwrap();

        let handles: Vec<_> = (0..RACERS)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.increment_views(1).await })
            })
            .collect();

        let mut counts = Vec::with_capacity(RACERS);
        for handle in handles {
            counts.push(handle.await.unwrap().unwrap());
        }
        counts.sort_unstable();

        assert_eq!(counts, (1..=RACERS as i64).collect::<Vec<_>>());
        assert_eq!(store.get(1).await.unwrap().views, RACERS as i64);
    }
}
