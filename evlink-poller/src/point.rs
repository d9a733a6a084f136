//! Measurement points: one polled quantity each.
//!
//! A point binds a register address, a decode rule and a unit to its
//! last-known value and last error. Refreshing a point never propagates
//! an error; a failed read keeps the previous good value ("stale but not
//! absent") and records the failure next to it.

use evlink_common::codec::{decode_float32, decode_uint16, decode_uint64, round_to};
use evlink_common::error::{Error, ReadError, Result};
use evlink_common::tables::LookupTable;
use evlink_common::{Reading, ReadingValue};
use tracing::{debug, warn};

use crate::transport::RegisterSource;

/// Maximum register count of one Modbus-TCP read (frame limit).
pub const MAX_READ_COUNT: u16 = 125;

/// How raw register words become a typed value.
#[derive(Clone, Copy)]
pub enum DecodeRule {
    /// Single register, raw unsigned value.
    Uint16,
    /// Two registers, IEEE-754 float, little-endian word order.
    Float32Swapped,
    /// Four registers, unsigned integer, little-endian word order.
    Uint64Swapped,
    /// Single register resolved through a status table.
    Coded(&'static LookupTable),
}

impl DecodeRule {
    /// Number of 16-bit registers this rule consumes.
    pub fn register_count(&self) -> u16 {
        match self {
            DecodeRule::Uint16 | DecodeRule::Coded(_) => 1,
            DecodeRule::Float32Swapped => 2,
            DecodeRule::Uint64Swapped => 4,
        }
    }
}

impl std::fmt::Debug for DecodeRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeRule::Uint16 => write!(f, "Uint16"),
            DecodeRule::Float32Swapped => write!(f, "Float32Swapped"),
            DecodeRule::Uint64Swapped => write!(f, "Uint64Swapped"),
            DecodeRule::Coded(table) => write!(f, "Coded({})", table.name()),
        }
    }
}

/// One polled quantity: register location, decode rule, unit, and the
/// mutable last-known state.
#[derive(Debug)]
pub struct MeasurementPoint {
    id: String,
    name: String,
    address: u16,
    count: u16,
    rule: DecodeRule,
    unit: Option<String>,
    scale: f64,
    decimals: Option<u32>,
    last_value: Option<ReadingValue>,
    last_error: Option<ReadError>,
}

impl MeasurementPoint {
    /// Create a measurement point.
    ///
    /// The register count is validated here, before any network call:
    /// it must fit in one Modbus-TCP read and match the decode rule's
    /// register footprint.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        address: u16,
        count: u16,
        rule: DecodeRule,
    ) -> Result<Self> {
        let id = id.into();

        if count == 0 || count > MAX_READ_COUNT {
            return Err(Error::Config(format!(
                "Point '{}': register count {} out of range 1-{}",
                id, count, MAX_READ_COUNT
            )));
        }

        if count != rule.register_count() {
            return Err(Error::Config(format!(
                "Point '{}': register count {} does not match decode rule {:?} ({} registers)",
                id,
                count,
                rule,
                rule.register_count()
            )));
        }

        Ok(Self {
            id,
            name: name.into(),
            address,
            count,
            rule,
            unit: None,
            scale: 1.0,
            decimals: None,
            last_value: None,
            last_error: None,
        })
    }

    /// Attach a unit of measurement.
    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    /// Apply a linear scale factor after decoding (e.g. kW to W).
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Round scaled values to a fixed number of decimal places.
    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = Some(decimals);
        self
    }

    /// Stable point identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable point name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register start address.
    pub fn address(&self) -> u16 {
        self.address
    }

    /// Number of registers read per refresh.
    pub fn count(&self) -> u16 {
        self.count
    }

    /// Most recently decoded value, if any read ever succeeded.
    pub fn last_value(&self) -> Option<&ReadingValue> {
        self.last_value.as_ref()
    }

    /// Most recent read failure, if the last refresh failed.
    pub fn last_error(&self) -> Option<&ReadError> {
        self.last_error.as_ref()
    }

    /// Refresh this point from the register source.
    ///
    /// Exactly one of "new value" or "new error" is set per attempt. On
    /// failure the previous good value is retained and the error recorded;
    /// errors never propagate past this method, so the scheduler can
    /// always continue with the next point.
    pub async fn refresh<S: RegisterSource>(&mut self, source: &mut S) {
        match source.read_holding_registers(self.address, self.count).await {
            Ok(words) => match self.decode(&words) {
                Ok(value) => {
                    debug!(point = %self.id, value = ?value, "Point refreshed");
                    self.last_value = Some(value);
                    self.last_error = None;
                }
                Err(e) => {
                    warn!(point = %self.id, address = self.address, "Decode failed: {}", e);
                    self.last_error = Some(e);
                }
            },
            Err(e) => {
                warn!(point = %self.id, address = self.address, "Read failed: {}", e);
                self.last_error = Some(e);
            }
        }
    }

    /// Export the current state as a host-facing reading.
    ///
    /// Returns `None` until the first successful refresh.
    pub fn reading(&self, device: &str) -> Option<Reading> {
        self.last_value.as_ref().map(|value| {
            Reading::new(
                device,
                self.id.as_str(),
                self.name.as_str(),
                value.clone(),
                self.unit.as_deref(),
            )
        })
    }

    /// Run raw words through the decode rule, then scaling and rounding.
    fn decode(&self, words: &[u16]) -> std::result::Result<ReadingValue, ReadError> {
        if words.len() != self.count as usize {
            return Err(ReadError::Protocol(format!(
                "Expected {} registers, device returned {}",
                self.count,
                words.len()
            )));
        }

        let value = match self.rule {
            DecodeRule::Uint16 => ReadingValue::Integer(decode_uint16([words[0]]) as u64),
            DecodeRule::Float32Swapped => {
                let raw = decode_float32([words[0], words[1]]) as f64;
                ReadingValue::Float(self.finish(raw))
            }
            DecodeRule::Uint64Swapped => {
                let raw = decode_uint64([words[0], words[1], words[2], words[3]]) as f64;
                ReadingValue::Float(self.finish(raw))
            }
            DecodeRule::Coded(table) => ReadingValue::Text(table.resolve(words[0])),
        };

        Ok(value)
    }

    fn finish(&self, raw: f64) -> f64 {
        let scaled = raw * self.scale;
        match self.decimals {
            Some(decimals) => round_to(scaled, decimals),
            None => scaled,
        }
    }
}
