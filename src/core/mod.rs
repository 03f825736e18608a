//! Shared configuration and error types

pub mod config;
pub mod error;

pub use config::TelemetryConfig;
pub use error::{PersistenceError, Result, TelemetryError};
