use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::weather::{SolarPotential, SolarWindow, WeatherReport};
use crate::services::advice;
use crate::services::weather_service::WeatherError;
use crate::shared_state::AppState;

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdviceRequest {
    pub lat: f64,
    pub lng: f64,
    pub address: Option<String>,
    /// Current state of charge, percent. Defaults to 70.
    pub battery_level: Option<u8>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdviceResponse {
    pub weather: WeatherReport,
    pub solar_advice: String,
    pub is_good_for_solar: bool,
    pub recommendations: Recommendations,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub charge_now: bool,
    pub best_window: Option<SolarWindow>,
    pub solar_potential: SolarPotential,
    pub recommended_times: Vec<String>,
}

/// GET /api/weather
/// Current conditions, 24h forecast, and the solar charging optimization for
/// a location.
#[utoipa::path(
    get,
    path = "/api/weather",
    params(
        ("lat" = f64, Query, description = "Latitude"),
        ("lng" = f64, Query, description = "Longitude"),
        ("address" = Option<String>, Query, description = "Display name for the location")
    ),
    responses(
        (status = 200, description = "Weather report with solar optimization", body = WeatherReport),
        (status = 400, description = "Missing coordinates"),
        (status = 502, description = "Weather upstream unavailable")
    )
)]
pub async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Response {
    let (Some(lat), Some(lng)) = (query.lat, query.lng) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Latitude and longitude are required" })),
        )
            .into_response();
    };

    let now = Local::now().fixed_offset();
    let address = query.address.as_deref().unwrap_or("");
    match state.weather.fetch_report(lat, lng, address, now).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => weather_error_response(e),
    }
}

/// POST /api/weather/advice
/// Weather report plus formatted solar charging advice and the
/// charge-right-now recommendation.
#[utoipa::path(
    post,
    path = "/api/weather/advice",
    request_body = AdviceRequest,
    responses(
        (status = 200, description = "Solar charging advice", body = AdviceResponse),
        (status = 502, description = "Weather upstream unavailable")
    )
)]
pub async fn get_solar_advice(
    State(state): State<AppState>,
    Json(request): Json<AdviceRequest>,
) -> Response {
    let now = Local::now().fixed_offset();
    let address = request.address.as_deref().unwrap_or("");
    let report = match state
        .weather
        .fetch_report(request.lat, request.lng, address, now)
        .await
    {
        Ok(report) => report,
        Err(e) => return weather_error_response(e),
    };

    let battery_level = request.battery_level.unwrap_or(70);
    let solar_advice =
        advice::solar_charging_advice(&report.solar_optimization, &report.current, battery_level);
    let is_good_for_solar = advice::good_for_solar_now(&report.current, now);

    let recommendations = Recommendations {
        charge_now: is_good_for_solar,
        best_window: report.solar_optimization.best_charging_window.clone(),
        solar_potential: report.solar_optimization.today_solar_potential,
        recommended_times: report.solar_optimization.recommended_charging_times.clone(),
    };

    (
        StatusCode::OK,
        Json(AdviceResponse {
            weather: report,
            solar_advice,
            is_good_for_solar,
            recommendations,
        }),
    )
        .into_response()
}

fn weather_error_response(error: WeatherError) -> Response {
    tracing::error!("weather fetch failed: {error}");
    (
        StatusCode::BAD_GATEWAY,
        Json(serde_json::json!({ "error": "Failed to fetch weather data" })),
    )
        .into_response()
}
