//! The fixed register map of the Schneider EVlink Pro AC.

use evlink_common::error::Result;
use evlink_common::tables::{EV_STATE_MAP, FAULT_MAP, LAST_STOP_CAUSE_MAP, OCPP_STATUS_MAP};

use crate::point::{DecodeRule, MeasurementPoint};

/// Build the measurement points for one EVlink Pro AC wallbox.
///
/// Power is reported by the device in kW and rescaled to W; total energy
/// in milli-units and rescaled to kWh. Physical quantities are rounded to
/// two decimals, voltages to one.
pub fn evlink_points() -> Result<Vec<MeasurementPoint>> {
    Ok(vec![
        MeasurementPoint::new(
            "evlink_power",
            "Ladeleistung",
            3059,
            2,
            DecodeRule::Float32Swapped,
        )?
        .with_unit("W")
        .with_scale(1000.0)
        .with_decimals(2),
        MeasurementPoint::new(
            "evlink_energy_total",
            "Energie total",
            3203,
            4,
            DecodeRule::Uint64Swapped,
        )?
        .with_unit("kWh")
        .with_scale(0.001)
        .with_decimals(2),
        MeasurementPoint::new(
            "evlink_fault",
            "Fehlerstatus",
            3041,
            1,
            DecodeRule::Coded(&FAULT_MAP),
        )?,
        MeasurementPoint::new(
            "evlink_current_l1",
            "Strom L1",
            2999,
            2,
            DecodeRule::Float32Swapped,
        )?
        .with_unit("A")
        .with_decimals(2),
        MeasurementPoint::new(
            "evlink_current_l2",
            "Strom L2",
            3001,
            2,
            DecodeRule::Float32Swapped,
        )?
        .with_unit("A")
        .with_decimals(2),
        MeasurementPoint::new(
            "evlink_current_l3",
            "Strom L3",
            3003,
            2,
            DecodeRule::Float32Swapped,
        )?
        .with_unit("A")
        .with_decimals(2),
        MeasurementPoint::new(
            "evlink_current_sum",
            "Gesamtstrom",
            3005,
            2,
            DecodeRule::Float32Swapped,
        )?
        .with_unit("A")
        .with_decimals(2),
        MeasurementPoint::new(
            "evlink_voltage_l1",
            "Spannung L1",
            3027,
            2,
            DecodeRule::Float32Swapped,
        )?
        .with_unit("V")
        .with_decimals(1),
        MeasurementPoint::new(
            "evlink_voltage_l2",
            "Spannung L2",
            3029,
            2,
            DecodeRule::Float32Swapped,
        )?
        .with_unit("V")
        .with_decimals(1),
        MeasurementPoint::new(
            "evlink_voltage_l3",
            "Spannung L3",
            3031,
            2,
            DecodeRule::Float32Swapped,
        )?
        .with_unit("V")
        .with_decimals(1),
        MeasurementPoint::new(
            "evlink_ocpp_status",
            "OCPP Status",
            150,
            1,
            DecodeRule::Coded(&OCPP_STATUS_MAP),
        )?,
        MeasurementPoint::new(
            "evlink_charging_time",
            "Charging Time",
            4007,
            1,
            DecodeRule::Uint16,
        )?
        .with_unit("s"),
        MeasurementPoint::new(
            "evlink_session_charging_time",
            "Session Charging Time",
            4009,
            1,
            DecodeRule::Uint16,
        )?
        .with_unit("s"),
        MeasurementPoint::new(
            "evlink_last_stop_cause",
            "Last Stop Cause",
            4011,
            1,
            DecodeRule::Coded(&LAST_STOP_CAUSE_MAP),
        )?,
        MeasurementPoint::new(
            "schneider_reg_ev_state",
            "Fahrzeugstatus",
            1,
            1,
            DecodeRule::Coded(&EV_STATE_MAP),
        )?,
    ])
}
