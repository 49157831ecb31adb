//! # Driver station diagnostics
//!
//! During autonomous the driver station game message selects a diagnostic behaviour:
//!
//! - `pressure`: start the compressor,
//! - `diagnostics`: gather a [`DiagnosticsReport`] for telemetry and save it to the session,
//! - `fourbar`: run the four-bar arm hold test.
//!
//! Any other message is ignored.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use comms_if::ds::DsMessage;
use log::{info, trace, warn};
use serde::Serialize;

use crate::{
    hal::{HalError, PowerMonitor, SensorBus},
    sensors::SensorSnapshot,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Session-relative path diagnostics reports are saved under.
pub const REPORT_PATH: &str = "diagnostics/report.json";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Health of the robot at a point in time. Values which could not be read are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticsReport {
    pub timestamp: DateTime<Utc>,

    /// Units: volts
    pub battery_voltage: Option<f64>,

    /// Units: degrees celsius
    pub pdp_temperature_c: Option<f64>,

    pub browned_out: Option<bool>,

    /// Units: ticks/second
    pub drive_left_rate: Option<f64>,
    /// Units: ticks/second
    pub drive_right_rate: Option<f64>,

    /// Units: ticks
    pub lift_position: i64,
}

/// Tracks the game message between cycles.
#[derive(Debug, Default)]
pub struct DiagHandler {
    last_message: Option<DsMessage>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DiagHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the current game message.
    ///
    /// Returns the recognised message, if any, and whether it differs from the previous cycle's.
    pub fn update(&mut self, game_message: Option<String>) -> (Option<DsMessage>, bool) {
        let message = match game_message {
            Some(s) => match s.parse::<DsMessage>() {
                Ok(m) => Some(m),
                Err(e) => {
                    trace!("Ignoring game message: {}", e);
                    None
                }
            },
            None => None,
        };

        let changed = message != self.last_message;
        if changed {
            if let Some(m) = message {
                info!("Diagnostic message {:?} received", m);
            }
        }
        self.last_message = message;

        (message, changed)
    }

    /// Forget the previous message, for instance on a mode change.
    pub fn clear(&mut self) {
        self.last_message = None;
    }
}

impl DiagnosticsReport {
    /// Gather a report from the power monitor and drive encoders.
    pub fn gather(
        power: &dyn PowerMonitor,
        sensors: &SensorBus,
        snapshot: &SensorSnapshot,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            battery_voltage: optional("battery voltage", power.battery_voltage()),
            pdp_temperature_c: optional("PDP temperature", power.temperature_c()),
            browned_out: optional("brown-out flag", power.is_browned_out()),
            drive_left_rate: optional(
                "left drive rate",
                sensors.drive_left_counter.velocity(),
            ),
            drive_right_rate: optional(
                "right drive rate",
                sensors.drive_right_counter.velocity(),
            ),
            lift_position: snapshot.lift_position,
        }
    }

    /// Save the report into the session directory.
    pub fn save(&self) {
        util::session::save_with_timestamp(REPORT_PATH, self.clone());
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn optional<T>(name: &str, value: Result<T, HalError>) -> Option<T> {
    match value {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Could not read {} for diagnostics: {}", name, e);
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hal::sim::SimRobot;

    #[test]
    fn test_update() {
        let mut diag = DiagHandler::new();

        assert_eq!(diag.update(None), (None, false));
        assert_eq!(
            diag.update(Some("pressure".into())),
            (Some(DsMessage::Pressure), true)
        );
        assert_eq!(diag.update(Some("pressure ".into())), (None, true));
        assert_eq!(diag.update(Some("go fast".into())), (None, true));

        diag.update(Some("fourbar".into()));
        diag.clear();
        assert_eq!(
            diag.update(Some("fourbar".into())),
            (Some(DsMessage::Fourbar), true)
        );
    }

    #[test]
    fn test_gather() {
        let sim = SimRobot::new();
        let hw = sim.hardware();
        sim.state_mut().browned_out = true;

        let snapshot = SensorSnapshot {
            lift_position: 42,
            ..Default::default()
        };
        let report = DiagnosticsReport::gather(hw.power.as_ref(), &hw.sensors, &snapshot);

        assert_eq!(report.battery_voltage, Some(12.6));
        assert_eq!(report.browned_out, Some(true));
        assert_eq!(report.drive_left_rate, Some(0.0));
        assert_eq!(report.lift_position, 42);
    }
}
