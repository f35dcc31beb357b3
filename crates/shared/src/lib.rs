//! Shared types, errors, and configuration for Tesoro.
//!
//! This crate provides common types used across all other crates:
//! - Decimal amount helpers with the settlement tolerance
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
