pub mod cli;
pub mod configuration;
pub mod console;
pub mod models;
pub mod services;
pub mod telemetry;
