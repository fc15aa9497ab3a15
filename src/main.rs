mod api_docs;
mod config;
mod controllers;
mod models;
mod routes;
mod services;
mod shared_state;

use std::net::SocketAddr;
use std::time::Duration;

use axum::{response::Html, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_scalar::Scalar;

use crate::api_docs::ApiDoc;
use crate::config::Config;
use crate::routes::coach_routes::coach_routes;
use crate::services::coach_service::{AiConfig, CoachService};
use crate::services::weather_service::WeatherClient;
use crate::shared_state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    // 1. Load configuration
    let config = match Config::load("config.json") {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("failed to load config.json: {e}");
            return;
        }
    };

    // 2. Construct the injected clients
    let weather = match WeatherClient::new(
        &config.weather.base_url,
        Duration::from_secs(config.weather.timeout_s),
    ) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("failed to build weather client: {e}");
            return;
        }
    };

    let coach = CoachService::new(config.resolved_api_key().map(|api_key| AiConfig { api_key }));
    if coach.is_ai_configured() {
        tracing::info!("chat completion API configured — live coach responses enabled");
    } else {
        tracing::info!("no API key configured — coach will use canned responses");
    }

    // 3. Shared state and router
    let state = AppState::new(weather, coach, config.context.clone());
    let app = Router::new()
        .nest("/api", coach_routes(state))
        .route(
            "/scalar",
            get(|| async { Html(Scalar::new(ApiDoc::openapi()).to_html()) }),
        )
        .fallback_service(ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // 4. Serve
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Smart coach API listening on http://{addr}");
    tracing::info!("Scalar UI: http://{addr}/scalar");

    axum_server::bind(addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}
