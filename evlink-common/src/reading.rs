use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A single decoded measurement exported to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    /// Unix epoch milliseconds when the value was decoded.
    pub timestamp: i64,

    /// Device name from configuration (e.g., "wallbox").
    pub device: String,

    /// Stable point identifier (e.g., "evlink_power").
    pub point_id: String,

    /// Human-readable point name (e.g., "Ladeleistung").
    pub name: String,

    /// The decoded, scaled and rounded value.
    pub value: ReadingValue,

    /// Unit of measurement, if the quantity has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Reading {
    /// Create a new reading with the current timestamp.
    pub fn new(
        device: impl Into<String>,
        point_id: impl Into<String>,
        name: impl Into<String>,
        value: ReadingValue,
        unit: Option<&str>,
    ) -> Self {
        Self {
            timestamp: current_timestamp_millis(),
            device: device.into(),
            point_id: point_id.into(),
            name: name.into(),
            value,
            unit: unit.map(str::to_string),
        }
    }
}

/// Typed measurement value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ReadingValue {
    /// Raw counter quantity (charging time in seconds).
    Integer(u64),

    /// Physical quantity (power, energy, current, voltage).
    Float(f64),

    /// Resolved status label.
    Text(String),
}

impl From<f64> for ReadingValue {
    fn from(v: f64) -> Self {
        ReadingValue::Float(v)
    }
}

impl From<u64> for ReadingValue {
    fn from(v: u64) -> Self {
        ReadingValue::Integer(v)
    }
}

impl From<String> for ReadingValue {
    fn from(v: String) -> Self {
        ReadingValue::Text(v)
    }
}

impl From<&str> for ReadingValue {
    fn from(v: &str) -> Self {
        ReadingValue::Text(v.to_string())
    }
}

/// Get the current timestamp in milliseconds since Unix epoch.
///
/// Returns 0 if system time is before Unix epoch (should never happen in practice).
pub fn current_timestamp_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_creation() {
        let reading = Reading::new(
            "wallbox",
            "evlink_power",
            "Ladeleistung",
            ReadingValue::Float(10000.0),
            Some("W"),
        );

        assert_eq!(reading.device, "wallbox");
        assert_eq!(reading.point_id, "evlink_power");
        assert_eq!(reading.value, ReadingValue::Float(10000.0));
        assert_eq!(reading.unit.as_deref(), Some("W"));
        assert!(reading.timestamp > 0);
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(ReadingValue::from(3.5), ReadingValue::Float(3.5));
        assert_eq!(ReadingValue::from(42u64), ReadingValue::Integer(42));
        assert_eq!(
            ReadingValue::from("Kein Fehler"),
            ReadingValue::Text("Kein Fehler".to_string())
        );
    }

    #[test]
    fn test_value_serializes_untagged() {
        let json = serde_json::to_string(&ReadingValue::Float(230.1)).unwrap();
        assert_eq!(json, "230.1");

        let json = serde_json::to_string(&ReadingValue::Text("Verfügbar".into())).unwrap();
        assert_eq!(json, "\"Verfügbar\"");
    }

    #[test]
    fn test_reading_skips_missing_unit() {
        let reading = Reading::new(
            "wallbox",
            "evlink_fault",
            "Fehlerstatus",
            ReadingValue::Text("Kein Fehler".into()),
            None,
        );

        let json = serde_json::to_string(&reading).unwrap();
        assert!(!json.contains("unit"));
    }
}
