//! Modbus-TCP poller for the Schneider EVlink Pro AC wallbox.
//!
//! Polls a fixed register map on a 30-second schedule, decodes the
//! word-swapped register payloads into typed physical measurements and
//! status labels, and exposes them as a snapshot of [`evlink_common::Reading`]
//! values for a consuming host.
//!
//! # Components
//!
//! - [`config`] - JSON5 device configuration
//! - [`transport`] - the shared Modbus-TCP connection
//! - [`point`] - measurement points (register, decode rule, last value/error)
//! - [`device`] - the EVlink Pro AC register map
//! - [`poller`] - the tick scheduler with per-point failure isolation

pub mod config;
pub mod device;
pub mod point;
pub mod poller;
pub mod transport;
