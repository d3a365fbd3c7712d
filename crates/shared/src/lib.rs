//! Shared types, errors, and configuration for Finch.
//!
//! This crate provides common types used across all other crates:
//! - Currency and percentage types with decimal precision
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Engine configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::EngineConfig;
pub use error::{AppError, AppResult};
