//! # Sensor snapshot
//!
//! Reads every sensor on the [`SensorBus`] once per cycle into an immutable [`SensorSnapshot`].
//!
//! A failed read never aborts the cycle. The failing value is replaced by a safe default: digital
//! sensors read as not triggered (`false`), position counters keep their last good value and
//! analog inputs read 0 V.
//!
//! The max hall sensor's polarity comes from [`Params`], and the snapshot always reports
//! `max_limit_reached` as `true` at the top of the lift travel.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::warn;
use serde::{Deserialize, Serialize};

use crate::hal::{HalError, SensorBus, SensorId};

pub use params::Params;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Values of every sensor for one cycle.
///
/// The min and arm limit fields hold the raw sensor states. Both sensors are active low, so `false`
/// is reported while the mechanism sits at its home position. `max_limit_reached` is normalised
/// for the max hall sensor's polarity and is `true` at the top of the lift travel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub min_limit_reached: bool,
    pub max_limit_reached: bool,
    pub arm_limit_reached: bool,

    /// Units: encoder ticks
    pub lift_position: i64,
    /// Units: encoder ticks
    pub arm_position: i64,
    /// Units: encoder ticks
    pub drive_left_position: i64,
    /// Units: encoder ticks
    pub drive_right_position: i64,

    /// Robot body and cargo intake range sensor voltages.
    ///
    /// Units: volts
    pub range_voltage: [f64; 2],
}

/// Acquires sensor snapshots, remembering the last good counter values.
#[derive(Debug, Default)]
pub struct SensorReader {
    params: Params,
    last_good: CounterValues,
}

/// Report on the sensor acquisition of one cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusReport {
    /// Sensors that could not be read this cycle.
    pub unavailable: Vec<SensorId>,
}

#[derive(Debug, Default, Clone, Copy)]
struct CounterValues {
    lift: i64,
    arm: i64,
    drive_left: i64,
    drive_right: i64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur while reading a sensor.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("Sensor {0:?} is unavailable: {1}")]
    SensorUnavailable(SensorId, HalError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SensorReader {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    /// Read every sensor on the bus.
    pub fn acquire(&mut self, bus: &SensorBus) -> (SensorSnapshot, StatusReport) {
        let mut report = StatusReport::default();

        let snapshot = SensorSnapshot {
            min_limit_reached: recover(
                read(SensorId::MinHall, bus.min_hall.get()), false, &mut report
            ),
            max_limit_reached: recover(
                read(SensorId::MaxHall, bus.max_hall.get())
                    .map(|raw| raw != self.params.max_hall_active_low),
                false,
                &mut report
            ),
            arm_limit_reached: recover(
                read(SensorId::ArmLimit, bus.arm_limit.get()), false, &mut report
            ),
            lift_position: recover(
                read(SensorId::LiftCounter, bus.lift_counter.get()),
                self.last_good.lift,
                &mut report
            ),
            arm_position: recover(
                read(SensorId::ArmCounter, bus.arm_counter.get()),
                self.last_good.arm,
                &mut report
            ),
            drive_left_position: recover(
                read(SensorId::DriveLeftCounter, bus.drive_left_counter.get()),
                self.last_good.drive_left,
                &mut report
            ),
            drive_right_position: recover(
                read(SensorId::DriveRightCounter, bus.drive_right_counter.get()),
                self.last_good.drive_right,
                &mut report
            ),
            range_voltage: [
                recover(read(SensorId::RobotRange, bus.robot_range.voltage()), 0.0, &mut report),
                recover(read(SensorId::CargoRange, bus.cargo_range.voltage()), 0.0, &mut report),
            ],
        };

        self.last_good = CounterValues {
            lift: snapshot.lift_position,
            arm: snapshot.arm_position,
            drive_left: snapshot.drive_left_position,
            drive_right: snapshot.drive_right_position,
        };

        (snapshot, report)
    }

    /// Record that a counter has been zeroed, so a failed read on the next cycle falls back to
    /// zero rather than the pre-reset count.
    pub fn counter_reset(&mut self, id: SensorId) {
        match id {
            SensorId::LiftCounter => self.last_good.lift = 0,
            SensorId::ArmCounter => self.last_good.arm = 0,
            SensorId::DriveLeftCounter => self.last_good.drive_left = 0,
            SensorId::DriveRightCounter => self.last_good.drive_right = 0,
            _ => (),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn read<T>(id: SensorId, result: Result<T, HalError>) -> Result<T, SensorError> {
    result.map_err(|e| SensorError::SensorUnavailable(id, e))
}

/// Substitute the fallback value for a failed read, recording the failure.
fn recover<T>(result: Result<T, SensorError>, fallback: T, report: &mut StatusReport) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            warn!("{}, using fallback value", e);
            let SensorError::SensorUnavailable(id, _) = e;
            report.unavailable.push(id);
            fallback
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
