pub mod api;
pub mod app_state;
pub mod config;
pub mod export;
pub mod extractor;
pub mod fetcher;
pub mod health;
pub mod runner;
pub mod store;
pub mod telemetry;
