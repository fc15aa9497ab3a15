pub mod coach;
pub mod weather;
