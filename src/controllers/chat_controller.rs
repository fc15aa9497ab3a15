use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::coach::{ChatMessage, ContextPatch};
use crate::models::weather::WeatherReport;
use crate::shared_state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

/// POST /api/chat
/// One coach turn: the reply text plus suggestion chips and extracted
/// actions.
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Coach reply", body = crate::models::coach::CoachReply),
        (status = 400, description = "Empty message")
    )
)]
pub async fn post_chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    if request.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Message is required" })),
        )
            .into_response();
    }

    let context = state.context();
    let now = Local::now().fixed_offset();

    // Weather problems degrade to an honest note in the prompt; the coach
    // never receives fabricated conditions.
    let weather_summary = match state
        .weather
        .fetch_report(
            context.location.lat,
            context.location.lng,
            &context.location.address,
            now,
        )
        .await
    {
        Ok(report) => summarize_weather(&report),
        Err(e) => {
            tracing::warn!("weather context unavailable for chat: {e}");
            "Weather data unavailable right now.".to_string()
        }
    };

    let reply = state
        .coach
        .respond(&request.message, &request.history, &context, &weather_summary, now)
        .await;
    Json(reply).into_response()
}

/// Condense a weather report into the two prompt lines the model sees.
fn summarize_weather(report: &WeatherReport) -> String {
    let current = &report.current;
    let temperature = current
        .temperature
        .map(|t| format!("{t}°C"))
        .unwrap_or_else(|| "n/a".to_string());
    let condition = current
        .condition
        .map(|c| format!("{c:?}"))
        .unwrap_or_else(|| "Clear".to_string());
    let clouds = current
        .cloud_cover
        .map(|c| format!("{c}% clouds"))
        .unwrap_or_else(|| "cloud cover unknown".to_string());
    let window = report
        .solar_optimization
        .best_charging_window
        .as_ref()
        .map(|w| format!("{} - {}", w.start.format("%H:%M"), w.end.format("%H:%M")))
        .unwrap_or_else(|| "No optimal solar window found".to_string());

    format!("Weather: {temperature}, {condition} ({clouds})\nSolar window: {window}")
}

/// GET /api/context
/// The charging context the coach currently reasons over.
#[utoipa::path(
    get,
    path = "/api/context",
    responses(
        (status = 200, description = "Current charging context", body = crate::models::coach::ChargingContext)
    )
)]
pub async fn get_context(State(state): State<AppState>) -> Response {
    Json(state.context()).into_response()
}

/// POST /api/context
/// Partially update the charging context; absent fields are left unchanged.
#[utoipa::path(
    post,
    path = "/api/context",
    request_body = ContextPatch,
    responses(
        (status = 200, description = "Updated charging context", body = crate::models::coach::ChargingContext)
    )
)]
pub async fn update_context(
    State(state): State<AppState>,
    Json(patch): Json<ContextPatch>,
) -> Response {
    Json(state.apply_patch(patch)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::weather::{
        Condition, HourlySample, Location, SolarOptimization, SolarPotential, SolarWindow,
    };
    use chrono::{FixedOffset, TimeZone};

    fn report(window: Option<SolarWindow>) -> WeatherReport {
        let ts = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 6, 21, 12, 0, 0)
            .unwrap();
        WeatherReport {
            current: HourlySample {
                timestamp: ts,
                temperature: Some(21.0),
                cloud_cover: Some(30.0),
                solar: Some(0.4),
                sunshine: Some(45.0),
                condition: Some(Condition::Dry),
                precipitation: Some(0.0),
            },
            forecast: Vec::new(),
            location: Location {
                lat: 48.7758,
                lng: 9.1829,
                address: "Stuttgart, Germany".to_string(),
            },
            solar_optimization: SolarOptimization {
                best_charging_window: window,
                today_solar_potential: SolarPotential::High,
                recommended_charging_times: Vec::new(),
            },
        }
    }

    #[test]
    fn summary_includes_window_and_conditions() {
        let ts = |h: u32| {
            FixedOffset::east_opt(2 * 3600)
                .unwrap()
                .with_ymd_and_hms(2025, 6, 21, h, 0, 0)
                .unwrap()
        };
        let summary = summarize_weather(&report(Some(SolarWindow {
            start: ts(10),
            end: ts(13),
            avg_solar: 0.5,
            avg_sunshine: 50.0,
        })));

        assert!(summary.contains("21°C, Dry (30% clouds)"));
        assert!(summary.contains("Solar window: 10:00 - 13:00"));
    }

    #[test]
    fn summary_without_window_says_so() {
        let summary = summarize_weather(&report(None));
        assert!(summary.contains("No optimal solar window found"));
    }
}
