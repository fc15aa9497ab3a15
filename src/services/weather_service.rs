/// Bright Sky weather client and forecast normalizer.
///
/// The client is a caller-constructed value (base URL + timeout) injected
/// into the app state — one instance per configuration, no process-wide
/// singletons. A report is built from two upstream fetches (current
/// observation + hourly forecast) issued concurrently; if either leg fails
/// the whole call fails, so the optimizer never runs over a half-populated
/// horizon.
use std::time::Duration;

use chrono::{DateTime, Days, FixedOffset};
use thiserror::Error;

use crate::models::weather::{
    Condition, CurrentWeatherResponse, ForecastResponse, HourlySample, Location,
    RawCurrentWeather, RawHourlyWeather, WeatherReport,
};
use crate::services::solar_optimizer;

/// Forecast horizon handed to the optimizer, hours.
const FORECAST_HOURS: usize = 24;

pub const DEFAULT_BASE_URL: &str = "https://api.brightsky.dev";

#[derive(Debug, Error)]
pub enum WeatherError {
    /// Upstream answered with a non-success status.
    #[error("weather upstream returned HTTP {status}")]
    Status { status: u16 },
    /// Network failure, timeout, or malformed payload.
    #[error("weather request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
}

impl WeatherClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch, normalize, and optimize weather data for a location.
    pub async fn fetch_report(
        &self,
        lat: f64,
        lng: f64,
        address: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<WeatherReport, WeatherError> {
        let date = now.date_naive();
        let last_date = date + Days::new(1);

        let current_url = format!(
            "{}/current_weather?lat={lat}&lon={lng}&units=dwd",
            self.base_url
        );
        let forecast_url = format!(
            "{}/weather?lat={lat}&lon={lng}&date={date}&last_date={last_date}&units=dwd",
            self.base_url
        );

        let (current, forecast) = tokio::join!(
            self.get_json::<CurrentWeatherResponse>(&current_url),
            self.get_json::<ForecastResponse>(&forecast_url),
        );

        let current = normalize_current(current?.weather);
        let forecast = normalize_forecast(forecast?.weather);
        let solar_optimization = solar_optimizer::optimize(&forecast, now);

        Ok(WeatherReport {
            current,
            forecast,
            location: Location {
                lat,
                lng,
                address: address.to_string(),
            },
            solar_optimization,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, WeatherError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response.json::<T>().await?)
    }
}

// ─── Normalization ───────────────────────────────────────────────────────────
// Missing source fields stay `None` here; pessimistic defaulting happens only
// at scoring time, so "no data" and "zero" remain distinguishable for display.

pub fn normalize_current(raw: RawCurrentWeather) -> HourlySample {
    HourlySample {
        timestamp: raw.timestamp,
        temperature: raw.temperature,
        cloud_cover: raw.cloud_cover,
        solar: raw.solar_60,
        sunshine: raw.sunshine_60,
        condition: raw.condition.as_deref().and_then(Condition::parse),
        precipitation: raw.precipitation_60,
    }
}

pub fn normalize_forecast(raw: Vec<RawHourlyWeather>) -> Vec<HourlySample> {
    raw.into_iter()
        .take(FORECAST_HOURS)
        .map(|hour| HourlySample {
            timestamp: hour.timestamp,
            temperature: hour.temperature,
            cloud_cover: hour.cloud_cover,
            solar: hour.solar,
            sunshine: hour.sunshine,
            condition: hour.condition.as_deref().and_then(Condition::parse),
            precipitation: hour.precipitation,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 6, 21, 9, 0, 0)
            .unwrap()
    }

    #[test]
    fn normalization_preserves_absence() {
        let raw: RawHourlyWeather = serde_json::from_value(json!({
            "timestamp": "2025-06-21T12:00:00+02:00",
            "temperature": null,
            "cloud_cover": null,
            "solar": null,
            "sunshine": null,
            "condition": null,
            "precipitation": null
        }))
        .unwrap();

        let samples = normalize_forecast(vec![raw]);
        let sample = &samples[0];
        assert!(sample.temperature.is_none());
        assert!(sample.cloud_cover.is_none());
        assert!(sample.solar.is_none());
        assert!(sample.sunshine.is_none());
        assert!(sample.condition.is_none());
        assert!(sample.precipitation.is_none());
    }

    #[test]
    fn unknown_condition_maps_to_none() {
        let raw: RawCurrentWeather = serde_json::from_value(json!({
            "timestamp": "2025-06-21T12:00:00+02:00",
            "temperature": 21.5,
            "cloud_cover": 25.0,
            "solar_60": 0.6,
            "sunshine_60": 55.0,
            "condition": "partly-cloudy",
            "precipitation_60": 0.0
        }))
        .unwrap();

        let sample = normalize_current(raw);
        assert!(sample.condition.is_none());
        assert_eq!(sample.solar, Some(0.6));
        assert_eq!(sample.sunshine, Some(55.0));
    }

    #[test]
    fn known_conditions_pass_through() {
        for (code, expected) in [
            ("dry", Condition::Dry),
            ("fog", Condition::Fog),
            ("rain", Condition::Rain),
            ("sleet", Condition::Sleet),
            ("snow", Condition::Snow),
            ("hail", Condition::Hail),
            ("thunderstorm", Condition::Thunderstorm),
        ] {
            assert_eq!(Condition::parse(code), Some(expected));
        }
    }

    #[test]
    fn forecast_is_truncated_to_24_hours() {
        let hours: Vec<RawHourlyWeather> = (0..30)
            .map(|i| {
                serde_json::from_value(json!({
                    "timestamp": format!("2025-06-21T{:02}:00:00+02:00", i % 24),
                    "temperature": 20.0,
                    "cloud_cover": 10.0,
                    "solar": 0.5,
                    "sunshine": 50.0,
                    "condition": "dry",
                    "precipitation": 0.0
                }))
                .unwrap()
            })
            .collect();

        assert_eq!(normalize_forecast(hours).len(), 24);
    }

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn upstream_failure_propagates_with_status() {
        let base = spawn(Router::new().fallback(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .await;
        let client = WeatherClient::new(&base, Duration::from_secs(2)).unwrap();

        let err = client
            .fetch_report(48.7758, 9.1829, "Stuttgart", now())
            .await
            .expect_err("a failing upstream must fail the whole call");
        assert!(matches!(err, WeatherError::Status { status: 500 }));
    }

    #[tokio::test]
    async fn report_is_assembled_from_both_fetches() {
        let current = json!({
            "weather": {
                "timestamp": "2025-06-21T09:00:00+02:00",
                "temperature": 22.0,
                "cloud_cover": 20.0,
                "solar_60": 0.5,
                "sunshine_60": 50.0,
                "condition": "dry",
                "precipitation_60": 0.0
            }
        });
        let forecast_hours: Vec<serde_json::Value> = (6..21)
            .map(|h| {
                json!({
                    "timestamp": format!("2025-06-21T{h:02}:00:00+02:00"),
                    "temperature": 22.0,
                    "cloud_cover": 15.0,
                    "solar": 0.6,
                    "sunshine": 55.0,
                    "condition": "dry",
                    "precipitation": 0.0
                })
            })
            .collect();
        let forecast = json!({ "weather": forecast_hours });

        let router = Router::new()
            .route(
                "/current_weather",
                get({
                    let current = current.clone();
                    move || async move { Json(current) }
                }),
            )
            .route(
                "/weather",
                get({
                    let forecast = forecast.clone();
                    move || async move { Json(forecast) }
                }),
            );
        let base = spawn(router).await;
        let client = WeatherClient::new(&base, Duration::from_secs(2)).unwrap();

        let report = client
            .fetch_report(48.7758, 9.1829, "Stuttgart", now())
            .await
            .expect("both fetches succeed");

        assert_eq!(report.current.condition, Some(Condition::Dry));
        assert_eq!(report.forecast.len(), 15);
        assert_eq!(report.location.address, "Stuttgart");
        // Sunny horizon: the optimizer finds a window and good hours.
        assert!(report.solar_optimization.best_charging_window.is_some());
        assert_eq!(report.solar_optimization.recommended_charging_times.len(), 6);
    }
}
