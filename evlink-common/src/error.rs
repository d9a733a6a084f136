use thiserror::Error;

/// Setup-time error. Surfaced to the caller before the poll loop starts;
/// never produced once polling is underway.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// Failure of a single register read. Recorded on the affected measurement
/// point and never propagated past it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// Socket-level failure (refused, timeout, reset). The connection is
    /// unusable until re-established.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The device answered with a Modbus exception (e.g. illegal address).
    /// The connection itself is still usable.
    #[error("Modbus exception: {0}")]
    Protocol(String),
}

/// Result type alias using the setup-time Error.
pub type Result<T> = std::result::Result<T, Error>;
