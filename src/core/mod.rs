pub mod errors;
pub mod gym_manager;
pub mod services;
pub mod time;
pub mod utils;
