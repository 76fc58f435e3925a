pub mod api;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod notify;
pub mod services;
pub mod state;
pub mod streak;
