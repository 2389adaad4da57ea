//! Conference Service
//!
//! Backend for the Parley video-conferencing app: room CRUD, join tokens,
//! and the recording lifecycle (egress coordination, playback streaming,
//! share links). Real-time media transport is delegated to the egress
//! platform; this service owns the durable recording ledger.

pub mod config;
pub mod db;
pub mod egress;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};
