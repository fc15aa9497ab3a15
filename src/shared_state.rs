use std::sync::{Arc, RwLock};

use crate::models::coach::{ChargingContext, ContextPatch};
use crate::services::coach_service::CoachService;
use crate::services::weather_service::WeatherClient;

/// Application state handed to every handler. The clients are immutable
/// values constructed once from config; only the charging context is mutable
/// (updated via `POST /api/context`).
#[derive(Clone)]
pub struct AppState {
    pub weather: WeatherClient,
    pub coach: CoachService,
    context: Arc<RwLock<ChargingContext>>,
}

impl AppState {
    pub fn new(weather: WeatherClient, coach: CoachService, context: ChargingContext) -> Self {
        Self {
            weather,
            coach,
            context: Arc::new(RwLock::new(context)),
        }
    }

    /// Snapshot of the current charging context.
    pub fn context(&self) -> ChargingContext {
        self.context
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Apply a partial update and return the resulting context.
    pub fn apply_patch(&self, patch: ContextPatch) -> ChargingContext {
        let mut context = self
            .context
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(v) = patch.vehicle_model {
            context.vehicle_model = v;
        }
        if let Some(v) = patch.battery_level {
            context.battery_level = v;
        }
        if let Some(v) = patch.range {
            context.range = v;
        }
        if let Some(v) = patch.location {
            context.location = v;
        }
        if let Some(v) = patch.energy_prices {
            context.energy_prices = v;
        }
        if let Some(v) = patch.user_preferences {
            context.user_preferences = v;
        }

        context.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::coach::{EnergyPrices, TimePreference, UserPreferences};
    use crate::models::weather::Location;
    use std::time::Duration;

    fn state() -> AppState {
        let weather =
            WeatherClient::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        let context = ChargingContext {
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
        };
        AppState::new(weather, CoachService::new(None), context)
    }

    #[test]
    fn patch_updates_only_the_given_fields() {
        let state = state();
        let updated = state.apply_patch(ContextPatch {
            battery_level: Some(22),
            ..Default::default()
        });

        assert_eq!(updated.battery_level, 22);
        assert_eq!(updated.vehicle_model, "EQS 450+");
        assert_eq!(state.context().battery_level, 22);
    }
}
