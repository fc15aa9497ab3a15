use axum::{
    routing::{get, post},
    Router,
};

use crate::controllers::chat_controller::{get_context, post_chat, update_context};
use crate::controllers::weather_controller::{get_solar_advice, get_weather};
use crate::shared_state::AppState;

/// Build the `/api/*` sub-router.
pub fn coach_routes(state: AppState) -> Router {
    Router::new()
        .route("/weather", get(get_weather))
        .route("/weather/advice", post(get_solar_advice))
        .route("/chat", post(post_chat))
        .route("/context", get(get_context).post(update_context))
        .with_state(state)
}
