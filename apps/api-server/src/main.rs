//! # Quill API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use api_server::observability::RequestIdMiddleware;
use api_server::telemetry::{TelemetryConfig, init_telemetry};
use api_server::{AppConfig, AppState, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Quill API Server on {}:{}",
        config.host,
        config.port
    );

    let state = web::Data::new(AppState::new(&config).await);
    let cors_origins = config.cors_origins.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&cors_origins))
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .app_data(state.clone())
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

fn cors(origins: &[String]) -> Cors {
    let mut cors = Cors::default();
    for origin in origins {
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else {
            cors = cors.allowed_origin(origin);
        }
    }
    cors.allow_any_method().allow_any_header().max_age(3600)
}
