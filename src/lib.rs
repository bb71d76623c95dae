pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod listings;
pub mod memory;
pub mod state;
