pub mod chat_controller;
pub mod weather_controller;
