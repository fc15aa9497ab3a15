use utoipa::OpenApi;

use crate::controllers::{chat_controller, weather_controller};
use crate::models::{coach, weather};

#[derive(OpenApi)]
#[openapi(
    paths(
        weather_controller::get_weather,
        weather_controller::get_solar_advice,
        chat_controller::post_chat,
        chat_controller::get_context,
        chat_controller::update_context
    ),
    components(
        schemas(
            weather::HourlySample,
            weather::Condition,
            weather::SolarWindow,
            weather::SolarPotential,
            weather::SolarOptimization,
            weather::WeatherReport,
            weather::Location,
            weather_controller::AdviceRequest,
            weather_controller::AdviceResponse,
            weather_controller::Recommendations,
            chat_controller::ChatRequest,
            coach::ChatMessage,
            coach::Role,
            coach::CoachReply,
            coach::CoachAction,
            coach::ActionKind,
            coach::ChargingContext,
            coach::EnergyPrices,
            coach::UserPreferences,
            coach::TimePreference,
            coach::ContextPatch
        )
    ),
    tags(
        (name = "smart-charge-coach", description = "EV Smart Charging Coach API")
    )
)]
pub struct ApiDoc;
