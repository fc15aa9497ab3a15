pub mod coach_routes;
