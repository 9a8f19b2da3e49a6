//! Temp Chat Backend Library
//!
//! This library exposes modules for testing and external use.
//! The main binary is in `src/main.rs`.

pub mod api;
pub mod config;
pub mod error;
pub mod executor;
pub mod services;
/// Shared handler state
pub mod state;
pub mod status;
pub mod store;
