//! Post service behaviour against the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use quill_core::domain::{PostDraft, PostFilter, PostPatch};
use quill_core::{DomainError, PostService};
use quill_infra::InMemoryPostStore;

fn service() -> PostService {
    PostService::new(Arc::new(InMemoryPostStore::new()))
}

fn draft(slug: &str, title: &str, content: &str) -> PostDraft {
    PostDraft {
        title: title.to_string(),
        slug: slug.to_string(),
        content: content.to_string(),
        author: "X".to_string(),
        ..PostDraft::default()
    }
}

#[tokio::test]
async fn get_returns_identical_fields_and_counts_views() {
    let svc = service();
    let mut d = draft("a", "A", "hello world");
    d.tags = vec!["intro".to_string()];
    let created = svc.create_post(d).await.unwrap();
    assert_eq!(created.views, 0);

    let first = svc.get_post(created.id).await.unwrap();
    let second = svc.get_post(created.id).await.unwrap();

    assert_eq!(first.views, 1);
    assert_eq!(second.views, 2);
    assert_eq!(second.title, created.title);
    assert_eq!(second.slug, created.slug);
    assert_eq!(second.content, created.content);
    assert_eq!(second.excerpt, created.excerpt);
    assert_eq!(second.tags, created.tags);
    assert_eq!(second.created_at, created.created_at);
    assert_eq!(second.updated_at, created.updated_at);
}

#[tokio::test]
async fn get_by_slug_also_counts_views() {
    let svc = service();
    svc.create_post(draft("my-post", "Mine", "body")).await.unwrap();

    let post = svc.get_post_by_slug("my-post").await.unwrap();
    assert_eq!(post.views, 1);
    assert!(matches!(
        svc.get_post_by_slug("other").await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn duplicate_slug_on_create_fails() {
    let svc = service();
    svc.create_post(draft("same", "First", "one")).await.unwrap();

    let err = svc
        .create_post(draft("same", "Second", "two"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::DuplicateSlug(_)));
}

#[tokio::test]
async fn invalid_draft_fails_validation() {
    let svc = service();
    let err = svc.create_post(draft("a", "", "body")).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn list_pages_with_total() {
    let svc = service();
    for i in 0..15 {
        svc.create_post(draft(&format!("post-{i}"), &format!("Post {i}"), "body"))
            .await
            .unwrap();
    }

    let page = svc.list_posts(0, 5, PostFilter::default()).await.unwrap();
    assert_eq!(page.total, 15);
    assert_eq!(page.items.len(), 5);
    let ids: Vec<i64> = page.items.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);

    let last = svc.list_posts(10, 10, PostFilter::default()).await.unwrap();
    assert_eq!(last.total, 15);
    assert_eq!(last.items.len(), 5);
}

#[tokio::test]
async fn list_rejects_bad_paging() {
    let svc = service();
    for (skip, limit) in [(-1, 10), (0, 0), (0, -3), (0, 101)] {
        assert!(
            matches!(
                svc.list_posts(skip, limit, PostFilter::default()).await,
                Err(DomainError::Validation(_))
            ),
            "skip={skip} limit={limit} should be rejected"
        );
    }
}

#[tokio::test]
async fn search_is_case_insensitive() {
    let svc = service();
    svc.create_post(draft("a", "Python tips", "short")).await.unwrap();
    svc.create_post(draft("b", "Misc", "all about PyThOn")).await.unwrap();
    svc.create_post(draft("c", "Rust", "borrowing")).await.unwrap();

    let page = svc
        .list_posts(0, 10, PostFilter::search("python"))
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    for post in &page.items {
        let haystack = format!("{} {}", post.title, post.content).to_lowercase();
        assert!(haystack.contains("python"));
    }
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let svc = service();
    let post = svc.create_post(draft("a", "A", "x")).await.unwrap();

    svc.delete_post(post.id).await.unwrap();

    assert!(matches!(
        svc.get_post(post.id).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        svc.delete_post(post.id).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn update_slug_collision_and_success() {
    let svc = service();
    let a = svc.create_post(draft("a", "A", "x")).await.unwrap();
    svc.create_post(draft("b", "B", "y")).await.unwrap();

    let err = svc
        .update_post(a.id, draft("b", "A", "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::DuplicateSlug(_)));

    tokio::time::sleep(Duration::from_millis(5)).await;
    let updated = svc.update_post(a.id, draft("a-2", "A", "x")).await.unwrap();
    assert_eq!(updated.slug, "a-2");
    assert!(updated.updated_at > a.updated_at);
    assert_eq!(updated.created_at, a.created_at);
}

#[tokio::test]
async fn update_unknown_post_is_not_found() {
    let svc = service();
    let err = svc
        .update_post(99, draft("a", "A", "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn update_is_full_replace() {
    let svc = service();
    let mut d = draft("a", "A", "x");
    d.tags = vec!["old".to_string()];
    d.excerpt = Some("custom".to_string());
    let post = svc.create_post(d).await.unwrap();

    let updated = svc
        .update_post(post.id, draft("a", "A", "new body"))
        .await
        .unwrap();
    assert!(updated.tags.is_empty());
    assert_eq!(updated.excerpt, "new body");
}

#[tokio::test]
async fn patch_changes_only_given_fields() {
    let svc = service();
    let mut d = draft("a", "A", "x");
    d.tags = vec!["keep".to_string()];
    let post = svc.create_post(d).await.unwrap();

    let patched = svc
        .patch_post(
            post.id,
            PostPatch {
                title: Some("New".to_string()),
                ..PostPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(patched.title, "New");
    assert_eq!(patched.slug, "a");
    assert!(patched.has_tag("keep"));
}

#[tokio::test]
async fn publish_and_unpublish() {
    let svc = service();
    let post = svc.create_post(draft("a", "A", "x")).await.unwrap();
    assert!(!post.published);

    assert!(svc.set_published(post.id, true).await.unwrap().published);
    assert!(!svc.set_published(post.id, false).await.unwrap().published);

    let published_only = PostFilter {
        published_only: true,
        ..PostFilter::default()
    };
    let page = svc.list_posts(0, 10, published_only).await.unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn list_by_tag_and_author() {
    let svc = service();
    let mut one = draft("one", "One", "x");
    one.tags = vec!["rust".to_string()];
    one.author = "Alice".to_string();
    let mut two = draft("two", "Two", "y");
    two.tags = vec!["rust".to_string(), "web".to_string()];
    let three = draft("three", "Three", "z");
    for d in [one, two, three] {
        svc.create_post(d).await.unwrap();
    }

    let rust = svc.list_by_tag("rust").await.unwrap();
    let slugs: Vec<&str> = rust.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["one", "two"]);

    let alice = svc.list_by_author("Alice").await.unwrap();
    assert_eq!(alice.len(), 1);
    assert_eq!(alice[0].slug, "one");

    assert!(svc.list_by_tag("go").await.unwrap().is_empty());
}

#[tokio::test]
async fn tag_and_author_lookups_ignore_case() {
    let svc = service();
    let mut d = draft("one", "One", "x");
    d.tags = vec!["Rust".to_string()];
    d.author = "Alice".to_string();
    svc.create_post(d).await.unwrap();

    assert_eq!(svc.list_by_tag("rust").await.unwrap().len(), 1);
    assert_eq!(svc.list_by_tag("RUST").await.unwrap().len(), 1);
    assert_eq!(svc.list_by_author("alice").await.unwrap().len(), 1);

    let filter = PostFilter {
        author: Some("ALICE".to_string()),
        tag: Some("rust".to_string()),
        ..PostFilter::default()
    };
    assert_eq!(svc.list_posts(0, 10, filter).await.unwrap().total, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reads_each_see_their_own_view() {
    let svc = service();
    let id = svc.create_post(draft("hot", "Hot", "body")).await.unwrap().id;

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let svc = svc.clone();
            tokio::spawn(async move { svc.get_post(id).await })
        })
        .collect();

    let mut views = Vec::new();
    for handle in handles {
        views.push(handle.await.unwrap().unwrap().views);
    }
    views.sort_unstable();

    assert_eq!(views, (1..=32).collect::<Vec<i64>>());
    assert_eq!(svc.get_post(id).await.unwrap().views, 33);
}

#[tokio::test]
async fn excerpt_is_derived_when_missing() {
    let svc = service().with_excerpt_len(5);
    let post = svc
        .create_post(draft("a", "A", "hello world"))
        .await
        .unwrap();
    assert_eq!(post.excerpt, "hello...");
}
