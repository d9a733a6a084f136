//! EVlink Common Library
//!
//! Shared types and utilities for the EVlink Modbus poller:
//!
//! - [`reading`] - Host-facing measurement snapshot (`Reading`, `ReadingValue`)
//! - [`codec`] - Word-swapped register decoding (float32, uint64)
//! - [`tables`] - Static status code tables (fault, OCPP, stop cause, EV state)
//! - [`config`] - Logging configuration and JSON5 loading
//! - [`error`] - Error types

pub mod codec;
pub mod config;
pub mod error;
pub mod reading;
pub mod tables;

// Re-export commonly used types at the crate root
pub use config::{LogFormat, LoggingConfig, load_config, parse_config};
pub use error::{Error, ReadError, Result};
pub use reading::{Reading, ReadingValue, current_timestamp_millis};
pub use tables::{EV_STATE_MAP, FAULT_MAP, LAST_STOP_CAUSE_MAP, LookupTable, OCPP_STATUS_MAP};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
