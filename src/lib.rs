//! Visitreg Visitor Register
//!
//! A REST JSON server for front-desk visitor registration: check visitors in,
//! check them out manually or by presenting their RFID card / QR pass, and
//! purge old records.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
