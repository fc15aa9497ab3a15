use serde::Deserialize;

use crate::models::coach::{ChargingContext, EnergyPrices, TimePreference, UserPreferences};
use crate::models::weather::Location;
use crate::services::weather_service::DEFAULT_BASE_URL;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    /// Vehicle context the coach starts with; updatable at runtime via the
    /// context endpoint.
    #[serde(default = "default_context")]
    pub context: ChargingContext,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Per-fetch timeout, seconds.
    #[serde(default = "default_weather_timeout_s")]
    pub timeout_s: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            timeout_s: default_weather_timeout_s(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
}

fn default_weather_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_weather_timeout_s() -> u64 {
    10
}

// Stuttgart EQS 450+ demo context.
fn default_context() -> ChargingContext {
    ChargingContext {
        vehicle_model: "EQS 450+".to_string(),
        battery_level: 74,
        range: 504,
        location: Location {
            lat: 48.7758,
            lng: 9.1829,
            address: "Stuttgart, Germany".to_string(),
        },
        energy_prices: EnergyPrices {
            current: 0.32,
            off_peak: 0.18,
            peak: 0.35,
            currency: "EUR".to_string(),
        },
        user_preferences: UserPreferences {
            eco_mode: true,
            cost_optimization: true,
            time_preference: TimePreference::Flexible,
        },
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// The OpenAI key, `OPENAI_API_KEY` taking precedence over the config
    /// file. Keys are stripped of stray whitespace/newlines; an empty result
    /// counts as "not configured".
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var("OPENAI_API_KEY")
            .ok()
            .or_else(|| self.openai.api_key.clone())
            .map(|key| key.split_whitespace().collect::<String>())
            .filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let config: Config = serde_json::from_str(r#"{ "server": { "port": 3000 } }"#).unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.weather.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.weather.timeout_s, 10);
        assert!(config.openai.api_key.is_none());
        assert_eq!(config.context.vehicle_model, "EQS 450+");
        assert_eq!(config.context.location.address, "Stuttgart, Germany");
    }

    #[test]
    fn full_config_overrides_defaults() {
        let config: Config = serde_json::from_str(
            r#"{
                "server": { "port": 8080 },
                "weather": { "base_url": "http://localhost:9000/", "timeout_s": 3 },
                "openai": { "api_key": "sk-test" },
                "context": {
                    "vehicleModel": "EQE 350",
                    "batteryLevel": 55,
                    "range": 420,
                    "location": { "lat": 52.52, "lng": 13.405, "address": "Berlin, Germany" },
                    "energyPrices": { "current": 0.30, "offPeak": 0.20, "peak": 0.36, "currency": "EUR" },
                    "userPreferences": { "ecoMode": false, "costOptimization": true, "timePreference": "urgent" }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.weather.timeout_s, 3);
        assert_eq!(config.context.vehicle_model, "EQE 350");
        assert_eq!(config.context.user_preferences.time_preference, TimePreference::Urgent);
    }
}
