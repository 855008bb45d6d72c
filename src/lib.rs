pub mod app;
pub mod auction;
pub mod auth;
pub mod bidding;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod money;
pub mod store;
pub mod telemetry;
pub mod views;
