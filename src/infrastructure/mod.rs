//! Infrastructure layer - Framework implementations
//!
//! This layer contains:
//! - Database connection and migrations (db)
//! - Global catalog seeding (seed)
//! - Configuration loading (config)
//! - Object storage backends (storage)
//! - Identity extraction (auth)
//! - Repository implementations (repositories)
//! - Application state (state)
//! - HTTP server setup (server)

pub mod auth;
pub mod config;
pub mod db;
pub mod repositories;
pub mod seed;
pub mod server;
pub mod state;
pub mod storage;

pub use repositories::*;
pub use state::AppState;
