//! HTTP handlers and route configuration.

mod health;
mod posts;

use actix_web::{HttpResponse, error::InternalError, web};
use quill_shared::ErrorResponse;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api/posts")
                .route("", web::get().to(posts::list_posts))
                .route("", web::post().to(posts::create_post))
                // Fixed prefixes before `/{id}/...` so they are never taken for ids.
                .route("/tags/{tag}", web::get().to(posts::list_by_tag))
                .route("/author/{name}", web::get().to(posts::list_by_author))
                .route("/slug/{slug}", web::get().to(posts::get_post_by_slug))
                .route("/{id}", web::get().to(posts::get_post))
                .route("/{id}", web::put().to(posts::update_post))
                .route("/{id}", web::patch().to(posts::patch_post))
                .route("/{id}", web::delete().to(posts::delete_post))
                .route("/{id}/publish", web::post().to(posts::publish_post))
                .route("/{id}/unpublish", web::post().to(posts::unpublish_post)),
        );
}

/// Malformed JSON bodies become RFC 7807 400 responses.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let body = ErrorResponse::bad_request(err.to_string());
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

/// Unparseable query strings become RFC 7807 400 responses.
fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let body = ErrorResponse::bad_request(err.to_string());
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}
