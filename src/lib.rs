//! Hotcue Server Library
//!
//! This module exports the core types and functions for testing and reuse.

pub mod auth;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod keys;
pub mod models;
pub mod routes;
pub mod security;
pub mod title;

pub use config::Config;
pub use db::{open_store, Db};
pub use error::{AppError, Result};
pub use routes::create_app;

use std::sync::Arc;

use title::TitleResolver;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub titles: Arc<dyn TitleResolver>,
    pub config: Config,
}

impl AppState {
    /// Create a new AppState with the given store, title resolver and configuration
    pub fn new(db: Db, titles: Arc<dyn TitleResolver>, config: Config) -> Self {
        Self { db, titles, config }
    }
}
