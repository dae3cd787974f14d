//! Blog post handlers.

use actix_web::{HttpResponse, web};

use quill_core::domain::{PostDraft, PostFilter, PostPatch};
use quill_core::services::DEFAULT_PAGE_SIZE;
use quill_shared::PagedResponse;
use quill_shared::dto::{ListPostsQuery, PostPatchPayload, PostPayload};

use crate::middleware::error::AppResult;
use crate::state::AppState;

fn draft_from(payload: PostPayload) -> PostDraft {
    PostDraft {
        title: payload.title,
        slug: payload.slug,
        content: payload.content,
        excerpt: payload.excerpt,
        author: payload.author,
        tags: payload.tags,
        published: payload.published,
    }
}

fn patch_from(payload: PostPatchPayload) -> PostPatch {
    PostPatch {
        title: payload.title,
        slug: payload.slug,
        content: payload.content,
        excerpt: payload.excerpt,
        author: payload.author,
        tags: payload.tags,
        published: payload.published,
    }
}

/// GET /api/posts?skip&limit&search&author&tag&published_only
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let filter = PostFilter {
        author: query.author,
        tag: query.tag,
        published_only: query.published_only,
        ..PostFilter::default()
    }
    .with_search(query.search);

    let page = state
        .posts
        .list_posts(
            query.skip.unwrap_or(0),
            query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            filter,
        )
        .await?;

    Ok(HttpResponse::Ok().json(PagedResponse::new(page.total, page.items)))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post = state.posts.get_post(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// GET /api/posts/slug/{slug}
pub async fn get_post_by_slug(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = state.posts.get_post_by_slug(&path).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    body: web::Json<PostPayload>,
) -> AppResult<HttpResponse> {
    let post = state.posts.create_post(draft_from(body.into_inner())).await?;
    Ok(HttpResponse::Created().json(post))
}

/// PUT /api/posts/{id} - full replace
pub async fn update_post(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<PostPayload>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .update_post(path.into_inner(), draft_from(body.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// PATCH /api/posts/{id} - partial update
pub async fn patch_post(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<PostPatchPayload>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .patch_post(path.into_inner(), patch_from(body.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// POST /api/posts/{id}/publish
pub async fn publish_post(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post = state.posts.set_published(path.into_inner(), true).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// POST /api/posts/{id}/unpublish
pub async fn unpublish_post(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post = state.posts.set_published(path.into_inner(), false).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.posts.delete_post(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/posts/tags/{tag}
pub async fn list_by_tag(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.list_by_tag(&path).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/author/{name}
pub async fn list_by_author(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.list_by_author(&path).await?;
    Ok(HttpResponse::Ok().json(posts))
}
