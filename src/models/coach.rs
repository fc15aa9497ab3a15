use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::weather::Location;

// ─── Vehicle / charging context ──────────────────────────────────────────────

/// Everything the coach knows about the vehicle and its owner. Serialized
/// verbatim into the model prompt and exposed via `GET /api/context`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChargingContext {
    pub vehicle_model: String,
    /// State of charge, percent [0, 100].
    pub battery_level: u8,
    /// Remaining range, km.
    pub range: u32,
    pub location: Location,
    pub energy_prices: EnergyPrices,
    pub user_preferences: UserPreferences,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnergyPrices {
    /// Current tariff, per kWh.
    pub current: f64,
    pub off_peak: f64,
    pub peak: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub eco_mode: bool,
    pub cost_optimization: bool,
    pub time_preference: TimePreference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimePreference {
    Flexible,
    Urgent,
}

/// Partial update for `POST /api/context` — absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContextPatch {
    pub vehicle_model: Option<String>,
    pub battery_level: Option<u8>,
    pub range: Option<u32>,
    pub location: Option<Location>,
    pub energy_prices: Option<EnergyPrices>,
    pub user_preferences: Option<UserPreferences>,
}

// ─── Chat types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Navigation,
    Scheduling,
    Reservation,
    Notification,
}

/// An actionable item attached to a coach reply — the UI decides how to
/// render it (deep link, scheduling sheet, ...).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CoachAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub data: serde_json::Value,
}

/// One assistant turn: the reply text plus up to 3 suggestion chips and any
/// extracted actions.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CoachReply {
    /// Unique id for this exchange, for client-side chat history keys.
    pub id: String,
    pub message: String,
    pub suggestions: Vec<String>,
    pub actions: Vec<CoachAction>,
}
