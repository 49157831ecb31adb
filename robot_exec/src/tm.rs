//! # Telemetry
//!
//! Every cycle the robot builds a [`TmPacket`] describing what it saw and what it commanded, and
//! hands it to a [`TmPublisher`]. Publishers decide where the packet goes: the log, a CSV archive,
//! or a dashboard link provided by the platform.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    ds::RobotMode,
    eqpt::{
        act::ActuatorCommand,
        pneumatics::{GearState, PneumaticsRequest},
    },
};
use log::{debug, info};
use serde::Serialize;
use util::{
    archive::{ArchiveError, Archived, Archiver},
    maths::in_band,
    session::Session,
};

use crate::{
    diag::DiagnosticsReport, hal::SensorId, lift_arm_ctrl::LiftMode, sensors::SensorSnapshot,
    toggle::ToggleState,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Robot range voltage band in which the robot is lined up with the player station.
///
/// Units: volts
pub const PLAYER_STATION_RANGE_V: (f64, f64) = (0.142, 0.146);

/// Cargo range voltage band in which a hatch panel is within reach.
///
/// Units: volts
pub const HATCH_RANGE_V: (f64, f64) = (0.70, 1.56);

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A sink for telemetry packets.
pub trait TmPublisher {
    /// Publish one cycle's packet. Must not block.
    fn publish(&mut self, packet: &TmPacket) -> Result<(), TmError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Telemetry for one control cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TmPacket {
    pub cycle: u64,

    /// Units: seconds since the start of the session
    pub time_s: f64,

    pub mode: RobotMode,
    pub sensors: SensorSnapshot,
    pub unavailable_sensors: Vec<SensorId>,
    pub toggles: Vec<ToggleState>,
    pub lift_mode: LiftMode,
    pub command: ActuatorCommand,
    pub gear: GearState,
    pub pneumatics_request: PneumaticsRequest,
    pub compressor_enabled: Option<bool>,
    pub max_limit_interlock: bool,
    pub invalid_preset_selection: bool,
    pub player_station_in_range: bool,
    pub hatch_in_range: bool,
    pub diagnostics: Option<DiagnosticsReport>,
}

/// Writes a summary of the telemetry to the log.
pub struct LogPublisher {
    /// Log a summary once every this many cycles, every other packet is only logged at trace.
    summary_period_cycles: u64,
}

/// Writes every packet as a row of `arch/tm.csv` in the session.
#[derive(Default)]
pub struct ArchivePublisher {
    arch: Archiver,
    record: Option<ArchRecord>,
}

/// Publishes to several publishers.
#[derive(Default)]
pub struct MultiPublisher {
    publishers: Vec<Box<dyn TmPublisher>>,
}

/// Flat archive row.
#[derive(Debug, Clone, Serialize)]
struct ArchRecord {
    cycle: u64,
    time_s: f64,
    mode: RobotMode,
    min_limit_reached: bool,
    max_limit_reached: bool,
    arm_limit_reached: bool,
    lift_position: i64,
    arm_position: i64,
    drive_left_position: i64,
    drive_right_position: i64,
    robot_range_v: f64,
    cargo_range_v: f64,
    num_unavailable_sensors: usize,
    lift_presets_on: String,
    lift_mode: String,
    lift_power: f64,
    arm_power: f64,
    drive_forward: f64,
    drive_rotation: f64,
    gear: GearState,
    pneumatics_request: PneumaticsRequest,
    max_limit_interlock: bool,
    player_station_in_range: bool,
    hatch_in_range: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur while publishing telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TmError {
    #[error("Could not archive telemetry: {0}")]
    ArchiveError(#[from] ArchiveError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TmPacket {
    /// Range flags from the range sensor voltages, `(player_station, hatch)`.
    pub fn range_flags(sensors: &SensorSnapshot) -> (bool, bool) {
        let [robot_v, cargo_v] = sensors.range_voltage;
        (
            in_band(robot_v, PLAYER_STATION_RANGE_V.0, PLAYER_STATION_RANGE_V.1),
            in_band(cargo_v, HATCH_RANGE_V.0, HATCH_RANGE_V.1),
        )
    }
}

impl LogPublisher {
    pub fn new(summary_period_cycles: u64) -> Self {
        Self {
            summary_period_cycles: summary_period_cycles.max(1),
        }
    }
}

impl TmPublisher for LogPublisher {
    fn publish(&mut self, packet: &TmPacket) -> Result<(), TmError> {
        log::trace!("TM: {:?}", packet);

        if packet.cycle % self.summary_period_cycles == 0 {
            info!(
                "{} | lift {} ({:?}, {:+.2}) | arm {} ({:+.2}) | drive ({:+.2}, {:+.2}) {:?}",
                packet.mode,
                packet.sensors.lift_position,
                packet.lift_mode,
                packet.command.lift_power,
                packet.sensors.arm_position,
                packet.command.arm_power,
                packet.command.drive_forward,
                packet.command.drive_rotation,
                packet.gear
            );
        }

        if let Some(ref d) = packet.diagnostics {
            debug!("Diagnostics: {:?}", d);
        }

        Ok(())
    }
}

impl ArchivePublisher {
    pub fn new(session: &Session) -> Result<Self, TmError> {
        Ok(Self {
            arch: Archiver::from_path(session, "tm.csv")?,
            record: None,
        })
    }
}

impl TmPublisher for ArchivePublisher {
    fn publish(&mut self, packet: &TmPacket) -> Result<(), TmError> {
        self.record = Some(ArchRecord::from(packet));
        self.write()?;
        Ok(())
    }
}

impl Archived for ArchivePublisher {
    fn write(&mut self) -> Result<(), ArchiveError> {
        match self.record.take() {
            Some(r) => self.arch.serialise(r),
            None => Ok(()),
        }
    }
}

impl MultiPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<P: TmPublisher + 'static>(&mut self, publisher: P) {
        self.publishers.push(Box::new(publisher));
    }
}

impl TmPublisher for MultiPublisher {
    /// Publish to every publisher, returning the first error after all have been tried.
    fn publish(&mut self, packet: &TmPacket) -> Result<(), TmError> {
        let mut result = Ok(());
        for p in self.publishers.iter_mut() {
            if let Err(e) = p.publish(packet) {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }
}

impl From<&TmPacket> for ArchRecord {
    fn from(p: &TmPacket) -> Self {
        let lift_presets_on = p
            .toggles
            .iter()
            .filter(|t| t.is_on)
            .map(|t| format!("{:?}", t.id))
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            cycle: p.cycle,
            time_s: p.time_s,
            mode: p.mode,
            min_limit_reached: p.sensors.min_limit_reached,
            max_limit_reached: p.sensors.max_limit_reached,
            arm_limit_reached: p.sensors.arm_limit_reached,
            lift_position: p.sensors.lift_position,
            arm_position: p.sensors.arm_position,
            drive_left_position: p.sensors.drive_left_position,
            drive_right_position: p.sensors.drive_right_position,
            robot_range_v: p.sensors.range_voltage[0],
            cargo_range_v: p.sensors.range_voltage[1],
            num_unavailable_sensors: p.unavailable_sensors.len(),
            lift_presets_on,
            lift_mode: format!("{:?}", p.lift_mode),
            lift_power: p.command.lift_power,
            arm_power: p.command.arm_power,
            drive_forward: p.command.drive_forward,
            drive_rotation: p.command.drive_rotation,
            gear: p.gear,
            pneumatics_request: p.pneumatics_request,
            max_limit_interlock: p.max_limit_interlock,
            player_station_in_range: p.player_station_in_range,
            hatch_in_range: p.hatch_in_range,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_range_flags() {
        let mut sensors = SensorSnapshot::default();
        assert_eq!(TmPacket::range_flags(&sensors), (false, false));

        sensors.range_voltage = [0.144, 0.70];
        assert_eq!(TmPacket::range_flags(&sensors), (true, true));

        sensors.range_voltage = [0.147, 1.57];
        assert_eq!(TmPacket::range_flags(&sensors), (false, false));
    }

    #[test]
    fn test_archive_without_session() {
        let mut publisher = ArchivePublisher::default();
        let packet = TmPacket {
            cycle: 3,
            time_s: 0.06,
            mode: RobotMode::Teleop,
            sensors: SensorSnapshot::default(),
            unavailable_sensors: vec![SensorId::MaxHall],
            toggles: Vec::new(),
            lift_mode: LiftMode::Manual,
            command: ActuatorCommand::default(),
            gear: GearState::Unknown,
            pneumatics_request: PneumaticsRequest::None,
            compressor_enabled: None,
            max_limit_interlock: false,
            invalid_preset_selection: false,
            player_station_in_range: false,
            hatch_in_range: false,
            diagnostics: None,
        };

        let record = ArchRecord::from(&packet);
        assert_eq!(record.num_unavailable_sensors, 1);
        assert_eq!(record.lift_mode, "Manual");

        assert!(publisher.publish(&packet).is_ok());
        assert!(publisher.record.is_none());

        let mut multi = MultiPublisher::new();
        multi.add(LogPublisher::new(1));
        multi.add(publisher);
        assert!(multi.publish(&packet).is_ok());
    }
}
