/// Advice formatter — turns an optimizer result plus the current observation
/// into display-ready guidance text, and judges whether right now is a good
/// moment to charge on solar. Pure functions, no state, no retries.
use chrono::{DateTime, FixedOffset, Timelike};

use crate::models::weather::{Condition, HourlySample, SolarOptimization, SolarPotential};

// Hours during which "charge right now" can ever be recommended.
const CHARGE_NOW_FIRST_HOUR: u32 = 8;
const CHARGE_NOW_LAST_HOUR: u32 = 18;
// Instantaneous condition cutoffs for the right-now predicate.
const CHARGE_NOW_SOLAR_CUTOFF: f64 = 0.15;
const CHARGE_NOW_CLOUD_CUTOFF: f64 = 70.0;
// Battery preconditioning is advised below this temperature.
const COLD_WEATHER_CUTOFF_C: f64 = 5.0;

/// Render charging advice for the given optimization result.
///
/// `_battery_level` is part of the caller contract (the advice route threads
/// the vehicle's state of charge through); the reference templates do not
/// interpolate it.
pub fn solar_charging_advice(
    optimization: &SolarOptimization,
    current: &HourlySample,
    _battery_level: u8,
) -> String {
    let Some(window) = &optimization.best_charging_window else {
        return "⛅ Solar conditions are not optimal today. I recommend charging during \
                off-peak hours (23:00-07:00) for better rates."
            .to_string();
    };

    let start = window.start.format("%H:%M");
    let end = window.end.format("%H:%M");
    let irradiation_w_m2 = (window.avg_solar * 1000.0).round() as i64;

    let mut advice = format!("☀️ **Optimal Solar Charging Window**: {start} - {end}\n\n");

    match optimization.today_solar_potential {
        SolarPotential::High => {
            advice.push_str(&format!(
                "🌞 **Excellent solar conditions!** Clear skies with {irradiation_w_m2}W/m² \
                 solar irradiation.\n💡 You could save up to 70% on charging costs using \
                 solar energy during this window."
            ));
        }
        SolarPotential::Medium => {
            advice.push_str(&format!(
                "🌤️ **Good solar potential** with some clouds. Solar irradiation: \
                 {irradiation_w_m2}W/m².\n💡 Consider hybrid charging: solar during peak \
                 hours, grid during off-peak."
            ));
        }
        SolarPotential::Low => {
            advice.push_str(&format!(
                "☁️ **Limited solar potential** due to cloud cover. Solar irradiation: \
                 {irradiation_w_m2}W/m².\n💡 Fallback to off-peak grid charging recommended."
            ));
        }
    }

    // At most one caveat; rain takes precedence over cold.
    if current.condition == Some(Condition::Rain) {
        advice.push_str("\n\n🌧️ Currently raining - indoor charging recommended.");
    } else if let Some(temp) = current.temperature {
        if temp < COLD_WEATHER_CUTOFF_C {
            advice.push_str(&format!(
                "\n\n❄️ Cold weather detected ({temp}°C) - battery preconditioning advised."
            ));
        }
    }

    advice
}

/// True iff present conditions favor immediate solar charging: daytime hour,
/// measurable irradiance, limited cloud cover, and no rain or snow. All four
/// checks must pass.
pub fn good_for_solar_now(current: &HourlySample, now: DateTime<FixedOffset>) -> bool {
    let hour = now.hour();
    if !(CHARGE_NOW_FIRST_HOUR..=CHARGE_NOW_LAST_HOUR).contains(&hour) {
        return false;
    }

    let has_irradiation = current.solar.unwrap_or(0.0) > CHARGE_NOW_SOLAR_CUTOFF;
    let low_cloud = current.cloud_cover.unwrap_or(100.0) < CHARGE_NOW_CLOUD_CUTOFF;
    let no_precipitation = current.condition != Some(Condition::Rain)
        && current.condition != Some(Condition::Snow);

    has_irradiation && low_cloud && no_precipitation
}
