pub mod advice;
pub mod coach_service;
pub mod solar_optimizer;
pub mod weather_service;
