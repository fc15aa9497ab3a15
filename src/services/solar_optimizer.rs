/// Solar charging window optimizer.
///
/// Scans normalized hourly samples restricted to daylight hours over a
/// two-calendar-day horizon, scores every 4-hour contiguous span, and picks
/// the best one; classifies today's aggregate solar potential; derives a
/// short list of individually-good hours.
///
/// Pure and synchronous — each invocation owns its inputs and output, safe to
/// call from any number of concurrent requests.
use chrono::{DateTime, Days, FixedOffset, Timelike};

use crate::models::weather::{HourlySample, SolarOptimization, SolarPotential, SolarWindow};

// Daylight hours considered for charging, inclusive on both ends.
pub const DAYLIGHT_FIRST_HOUR: u32 = 6;
pub const DAYLIGHT_LAST_HOUR: u32 = 20;
/// A charging window is exactly this many consecutive hourly samples.
pub const WINDOW_SAMPLES: usize = 4;
/// Cap on the recommended-hours list.
pub const MAX_RECOMMENDED_TIMES: usize = 6;

// Empirical scoring coefficients and cutoffs, kept bit-for-bit compatible
// with the reference behavior. Tunable, not physically derived.
const SOLAR_WEIGHT: f64 = 1.5;
const SUNSHINE_WEIGHT: f64 = 0.5;
const CLOUD_PENALTY: f64 = 0.3;

const HIGH_SOLAR_CUTOFF: f64 = 0.3;
const HIGH_CLOUD_CUTOFF: f64 = 50.0;
const MEDIUM_SOLAR_CUTOFF: f64 = 0.15;
const MEDIUM_CLOUD_CUTOFF: f64 = 75.0;

const RECOMMENDED_SOLAR_CUTOFF: f64 = 0.2;
const RECOMMENDED_CLOUD_CUTOFF: f64 = 60.0;

// Absent numeric fields default to the value least favorable to solar
// charging, so missing data never over-states potential.
fn solar_kwh(s: &HourlySample) -> f64 {
    s.solar.unwrap_or(0.0)
}

fn sunshine_min(s: &HourlySample) -> f64 {
    s.sunshine.unwrap_or(0.0)
}

fn cloud_pct(s: &HourlySample) -> f64 {
    s.cloud_cover.unwrap_or(100.0)
}

fn window_score(avg_solar: f64, avg_sunshine: f64, avg_cloud: f64) -> f64 {
    SOLAR_WEIGHT * avg_solar + SUNSHINE_WEIGHT * (avg_sunshine / 60.0)
        - CLOUD_PENALTY * (avg_cloud / 100.0)
}

/// Run the optimizer over a normalized forecast.
///
/// `now` is the caller's clock; it anchors the "today or tomorrow" horizon
/// and the today-only classification. Sample hours are read in the sample's
/// own embedded offset (the station-local time delivered by the upstream).
pub fn optimize(forecast: &[HourlySample], now: DateTime<FixedOffset>) -> SolarOptimization {
    let today = now.date_naive();
    let horizon_end = today + Days::new(1);

    let daylight: Vec<&HourlySample> = forecast
        .iter()
        .filter(|s| {
            let hour = s.timestamp.hour();
            (DAYLIGHT_FIRST_HOUR..=DAYLIGHT_LAST_HOUR).contains(&hour)
                && s.timestamp.date_naive() <= horizon_end
        })
        .collect();

    // No daylight data is a normal outcome, not an error.
    if daylight.is_empty() {
        return SolarOptimization {
            best_charging_window: None,
            today_solar_potential: SolarPotential::Low,
            recommended_charging_times: Vec::new(),
        };
    }

    // Best 4-hour window: strictly-greater replaces the incumbent, so exact
    // ties keep the earliest span. A window must score above zero to be
    // reported at all.
    let mut best_window = None;
    let mut best_score = 0.0_f64;
    for span in daylight.windows(WINDOW_SAMPLES) {
        let n = WINDOW_SAMPLES as f64;
        let avg_solar = span.iter().map(|s| solar_kwh(s)).sum::<f64>() / n;
        let avg_sunshine = span.iter().map(|s| sunshine_min(s)).sum::<f64>() / n;
        let avg_cloud = span.iter().map(|s| cloud_pct(s)).sum::<f64>() / n;

        let score = window_score(avg_solar, avg_sunshine, avg_cloud);
        if score > best_score {
            best_score = score;
            best_window = Some(SolarWindow {
                start: span[0].timestamp,
                end: span[WINDOW_SAMPLES - 1].timestamp,
                avg_solar,
                avg_sunshine,
            });
        }
    }

    // Today's aggregate potential, over today's daylight samples only.
    let today_samples: Vec<&&HourlySample> = daylight
        .iter()
        .filter(|s| s.timestamp.date_naive() == today)
        .collect();
    let divisor = today_samples.len().max(1) as f64;
    let avg_today_solar = today_samples.iter().map(|s| solar_kwh(s)).sum::<f64>() / divisor;
    let avg_today_cloud = today_samples.iter().map(|s| cloud_pct(s)).sum::<f64>() / divisor;

    let today_solar_potential = if avg_today_solar > HIGH_SOLAR_CUTOFF
        && avg_today_cloud < HIGH_CLOUD_CUTOFF
    {
        SolarPotential::High
    } else if avg_today_solar > MEDIUM_SOLAR_CUTOFF && avg_today_cloud < MEDIUM_CLOUD_CUTOFF {
        SolarPotential::Medium
    } else {
        SolarPotential::Low
    };

    // Individually-good hours across the whole horizon, earliest first.
    let recommended_charging_times: Vec<String> = daylight
        .iter()
        .filter(|s| {
            solar_kwh(s) > RECOMMENDED_SOLAR_CUTOFF && cloud_pct(s) < RECOMMENDED_CLOUD_CUTOFF
        })
        .take(MAX_RECOMMENDED_TIMES)
        .map(|s| s.timestamp.format("%H:%M").to_string())
        .collect();

    SolarOptimization {
        best_charging_window: best_window,
        today_solar_potential,
        recommended_charging_times,
    }
}
