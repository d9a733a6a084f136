//! Modbus-TCP transport for a single wallbox.

use evlink_common::error::{Error, ReadError, Result};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio_modbus::client::{Context, Reader};
use tokio_modbus::prelude::*;
use tracing::{debug, warn};

use crate::config::DeviceConfig;

/// Source of holding-register reads.
///
/// Measurement points and the scheduler only depend on this seam, so they
/// can be exercised against an in-memory source in tests.
pub trait RegisterSource {
    /// Read `count` holding registers starting at `address`.
    ///
    /// The returned future must be `Send`: the scheduler runs inside a
    /// spawned task.
    fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> impl Future<Output = std::result::Result<Vec<u16>, ReadError>> + Send;
}

/// One Modbus-TCP connection to the wallbox.
///
/// The connection is established once at startup and held open across
/// polls. A transport-level failure marks it dead; the next read attempt
/// re-establishes the session, bounded by the configured timeout.
pub struct ModbusTransport {
    host: String,
    port: u16,
    slave: Slave,
    timeout: Duration,
    ctx: Option<Context>,
}

impl ModbusTransport {
    /// Create an unconnected transport from device configuration.
    pub fn new(config: &DeviceConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            slave: Slave(config.unit_id),
            timeout: Duration::from_millis(config.timeout_ms),
            ctx: None,
        }
    }

    /// Establish the TCP session. Failure here is surfaced to the setup
    /// caller; it never reaches the poll loop.
    pub async fn connect(&mut self) -> Result<()> {
        let addr = self.endpoint().map_err(Error::Connection)?;
        let ctx = Self::open(addr, self.slave, self.timeout)
            .await
            .map_err(Error::Connection)?;
        self.ctx = Some(ctx);
        debug!(host = %self.host, port = self.port, "Connected to Modbus device");
        Ok(())
    }

    /// Whether a session is currently held open.
    pub fn is_connected(&self) -> bool {
        self.ctx.is_some()
    }

    /// Close the TCP session, if one is open.
    pub async fn disconnect(&mut self) {
        if let Some(mut ctx) = self.ctx.take() {
            if let Err(e) = ctx.disconnect().await {
                warn!("Error closing Modbus connection: {}", e);
            }
        }
    }

    fn endpoint(&self) -> std::result::Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("Invalid address: {}", e))
    }

    // Associated fn on purpose: holding `&self` across the connect await
    // would make the read future non-Send (the boxed client context is
    // Send but not Sync), and the scheduler future has to be spawnable.
    async fn open(
        addr: SocketAddr,
        slave: Slave,
        timeout: Duration,
    ) -> std::result::Result<Context, String> {
        let ctx = tokio::time::timeout(timeout, tcp::connect_slave(addr, slave))
            .await
            .map_err(|_| "Connection timeout".to_string())?
            .map_err(|e| e.to_string())?;

        Ok(ctx)
    }
}

impl RegisterSource for ModbusTransport {
    async fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> std::result::Result<Vec<u16>, ReadError> {
        if self.ctx.is_none() {
            debug!(host = %self.host, "Reconnecting to Modbus device");
            let addr = self.endpoint().map_err(ReadError::Transport)?;
            let ctx = Self::open(addr, self.slave, self.timeout)
                .await
                .map_err(ReadError::Transport)?;
            self.ctx = Some(ctx);
        }

        let Some(ctx) = self.ctx.as_mut() else {
            return Err(ReadError::Transport("Not connected".to_string()));
        };

        match tokio::time::timeout(self.timeout, ctx.read_holding_registers(address, count)).await {
            // Timeout or socket failure: the session is presumed dead.
            Err(_) => {
                self.ctx = None;
                Err(ReadError::Transport("Read timed out".to_string()))
            }
            Ok(Err(e)) => {
                self.ctx = None;
                Err(ReadError::Transport(e.to_string()))
            }
            // Modbus exception response: only this read failed.
            Ok(Ok(Err(exception))) => Err(ReadError::Protocol(format!("{:?}", exception))),
            Ok(Ok(Ok(words))) => Ok(words),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(host: &str) -> DeviceConfig {
        DeviceConfig {
            name: "test".to_string(),
            host: host.to_string(),
            port: 502,
            unit_id: 1,
            poll_interval_secs: 30,
            timeout_ms: 100,
        }
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_address() {
        let mut transport = ModbusTransport::new(&device("not an address"));
        let result = transport.connect().await;
        assert!(matches!(result, Err(Error::Connection(_))));
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_read_without_session_reports_transport_error() {
        let mut transport = ModbusTransport::new(&device("not an address"));
        let result = transport.read_holding_registers(3059, 2).await;
        assert!(matches!(result, Err(ReadError::Transport(_))));
    }
}
