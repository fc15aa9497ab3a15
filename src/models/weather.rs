use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ─── Domain types ────────────────────────────────────────────────────────────

/// Bright Sky condition code. Anything the upstream sends outside this set is
/// treated as unknown (`None` on the sample).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Dry,
    Fog,
    Rain,
    Sleet,
    Snow,
    Hail,
    Thunderstorm,
}

impl Condition {
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "dry" => Some(Self::Dry),
            "fog" => Some(Self::Fog),
            "rain" => Some(Self::Rain),
            "sleet" => Some(Self::Sleet),
            "snow" => Some(Self::Snow),
            "hail" => Some(Self::Hail),
            "thunderstorm" => Some(Self::Thunderstorm),
            _ => None,
        }
    }
}

/// One normalized hourly observation/forecast point.
///
/// Absent numeric fields stay `None` here — "no data" and "zero" are distinct
/// for display purposes. Pessimistic defaulting (cloud → 100, solar/sunshine
/// → 0) happens only at scoring time, so missing data never over-states solar
/// potential.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HourlySample {
    pub timestamp: DateTime<FixedOffset>,
    pub temperature: Option<f64>,
    /// Cloud cover in percent [0, 100].
    pub cloud_cover: Option<f64>,
    /// Solar irradiation for the hour, kWh/m².
    pub solar: Option<f64>,
    /// Sunshine duration for the hour, minutes.
    pub sunshine: Option<f64>,
    pub condition: Option<Condition>,
    pub precipitation: Option<f64>,
}

/// Coarse classification of how favorable a calendar day is for PV charging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SolarPotential {
    High,
    Medium,
    Low,
}

/// A selected 4-consecutive-hour charging span. `end` is the timestamp of the
/// fourth sample in the span — the span is defined by sample count, not by
/// `start + 4h`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SolarWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub avg_solar: f64,
    pub avg_sunshine: f64,
}

/// Output of the solar window optimizer.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SolarOptimization {
    pub best_charging_window: Option<SolarWindow>,
    pub today_solar_potential: SolarPotential,
    /// Up to 6 individually-good hours, chronological, formatted `HH:MM`.
    pub recommended_charging_times: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

/// Full weather payload returned by `GET /api/weather`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub current: HourlySample,
    pub forecast: Vec<HourlySample>,
    pub location: Location,
    pub solar_optimization: SolarOptimization,
}

// ─── Bright Sky wire types ───────────────────────────────────────────────────
// https://api.brightsky.dev — `/current_weather` wraps a single record, the
// hourly endpoint wraps an array. Current-weather fields carry a `_60` suffix
// (value over the last 60 minutes).

#[derive(Debug, Deserialize)]
pub struct CurrentWeatherResponse {
    pub weather: RawCurrentWeather,
}

#[derive(Debug, Deserialize)]
pub struct RawCurrentWeather {
    pub timestamp: DateTime<FixedOffset>,
    pub temperature: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub solar_60: Option<f64>,
    pub sunshine_60: Option<f64>,
    pub condition: Option<String>,
    pub precipitation_60: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub weather: Vec<RawHourlyWeather>,
}

#[derive(Debug, Deserialize)]
pub struct RawHourlyWeather {
    pub timestamp: DateTime<FixedOffset>,
    pub temperature: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub solar: Option<f64>,
    pub sunshine: Option<f64>,
    pub condition: Option<String>,
    pub precipitation: Option<f64>,
}
