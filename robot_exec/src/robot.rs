//! # Robot
//!
//! Owns every control module and runs one control cycle against a [`Hardware`] bundle.
//!
//! Each cycle runs, in order:
//!
//! 1. Sensor and operator input acquisition
//! 2. Toggle update
//! 3. Diagnostic message handling (autonomous only)
//! 4. Lift/arm arbitration and drive scaling
//! 5. Actuator outputs
//! 6. Counter re-homing
//! 7. Pneumatics request
//! 8. Telemetry

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    ds::{DsMessage, RobotMode},
    eqpt::{act::ActuatorCommand, pneumatics::PneumaticsRequest},
};
use log::{info, warn};

use crate::{
    data_store::DataStore,
    diag::{DiagHandler, DiagnosticsReport},
    drive_ctrl::{self, DriveCtrl, DriveCtrlError},
    hal::{Hardware, PositionCounter, SensorId},
    lift_arm_ctrl::{self, LiftArmCtrl, LiftArmCtrlError},
    operator_if::{self, OperatorIf},
    pneumatics_ctrl,
    sensors::{self, SensorReader},
    tm::{TmPacket, TmPublisher},
    toggle::{ToggleId, ToggleTracker},
};
use util::{module::State, params::LoadError};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of every module owned by the robot.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotParams {
    /// Units: seconds
    pub cycle_period_s: f64,

    pub sensors: sensors::Params,
    pub lift_arm_ctrl: lift_arm_ctrl::Params,
    pub drive_ctrl: drive_ctrl::Params,
    pub operator_if: operator_if::Params,
}

/// The robot's control core.
pub struct Robot {
    pub ds: DataStore,

    cycle_frequency_hz: f64,

    sensor_reader: SensorReader,
    operator_if: OperatorIf,
    toggles: ToggleTracker,
    lift_arm_ctrl: LiftArmCtrl,
    drive_ctrl: DriveCtrl,
    diag: DiagHandler,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur while building the robot.
#[derive(Debug, thiserror::Error)]
pub enum RobotInitError {
    #[error("Failed to initialise LiftArmCtrl: {0}")]
    LiftArmCtrl(#[from] LiftArmCtrlError),

    #[error("Failed to initialise DriveCtrl: {0}")]
    DriveCtrl(#[from] DriveCtrlError),

    #[error("There are {presets} lift presets but {bindings} preset buttons are bound")]
    PresetBindingMismatch { presets: usize, bindings: usize },

    #[error("Cycle period must be positive, got {0} s")]
    InvalidCyclePeriod(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RobotParams {
    /// Load all module parameter files.
    pub fn load(cycle_period_s: f64) -> Result<Self, LoadError> {
        Ok(Self {
            cycle_period_s,
            sensors: util::params::load("sensors.toml")?,
            lift_arm_ctrl: util::params::load("lift_arm_ctrl.toml")?,
            drive_ctrl: util::params::load("drive_ctrl.toml")?,
            operator_if: util::params::load("operator_if.toml")?,
        })
    }
}

impl Default for RobotParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.02,
            sensors: sensors::Params::default(),
            lift_arm_ctrl: lift_arm_ctrl::Params::default(),
            drive_ctrl: drive_ctrl::Params::default(),
            operator_if: operator_if::Params::default(),
        }
    }
}

impl Robot {
    /// Initialise every module. The robot starts disabled.
    pub fn new(params: RobotParams) -> Result<Self, RobotInitError> {
        if !(params.cycle_period_s > 0.0) {
            return Err(RobotInitError::InvalidCyclePeriod(params.cycle_period_s));
        }

        let presets = params.lift_arm_ctrl.presets.len();
        let bindings = params.operator_if.lift_presets.len();
        if presets != bindings {
            return Err(RobotInitError::PresetBindingMismatch { presets, bindings });
        }

        let toggles = ToggleTracker::new(
            (0..presets)
                .map(ToggleId::LiftPreset)
                .chain((0..params.operator_if.arm_presets.len()).map(ToggleId::ArmPreset)),
        );

        let mut lift_arm_ctrl = LiftArmCtrl::default();
        lift_arm_ctrl.init(params.lift_arm_ctrl)?;
        info!("LiftArmCtrl init complete");

        let mut drive_ctrl = DriveCtrl::default();
        drive_ctrl.init(params.drive_ctrl)?;
        info!("DriveCtrl init complete");

        Ok(Self {
            ds: DataStore::default(),
            cycle_frequency_hz: 1.0 / params.cycle_period_s,
            sensor_reader: SensorReader::new(params.sensors),
            operator_if: OperatorIf::new(params.operator_if),
            toggles,
            lift_arm_ctrl,
            drive_ctrl,
            diag: DiagHandler::new(),
        })
    }

    pub fn mode(&self) -> RobotMode {
        self.ds.mode
    }

    pub fn toggles(&self) -> &ToggleTracker {
        &self.toggles
    }

    /// Switch the robot into a new mode, performing the mode's entry actions.
    ///
    /// Entering autonomous or teleop zeros the drive and lift counters. Autonomous also zeros the
    /// arm counter, teleop starts the compressor. Switching to the current mode does nothing.
    pub fn set_mode(&mut self, mode: RobotMode, hw: &mut Hardware) {
        if mode == self.ds.mode {
            return;
        }

        info!("Robot mode changed: {} -> {}", self.ds.mode, mode);
        self.ds.mode = mode;
        self.diag.clear();

        match mode {
            RobotMode::Disabled => self.write_outputs(hw, &ActuatorCommand::default()),
            RobotMode::Autonomous => {
                self.reset_counter(hw, SensorId::DriveLeftCounter);
                self.reset_counter(hw, SensorId::DriveRightCounter);
                self.reset_counter(hw, SensorId::LiftCounter);
                self.reset_counter(hw, SensorId::ArmCounter);
            }
            RobotMode::Teleop => {
                self.reset_counter(hw, SensorId::DriveLeftCounter);
                self.reset_counter(hw, SensorId::DriveRightCounter);
                self.reset_counter(hw, SensorId::LiftCounter);
                if let Err(e) = pneumatics_ctrl::apply_request(
                    hw.pneumatics.as_mut(),
                    PneumaticsRequest::CompressorStart,
                ) {
                    warn!("Could not start the compressor: {}", e);
                }
            }
        }
    }

    /// Run one control cycle, returning the command sent to the actuators.
    pub fn tick(&mut self, hw: &mut Hardware, publisher: &mut dyn TmPublisher) -> ActuatorCommand {
        self.ds.cycle_start(self.cycle_frequency_hz);

        // ---- DATA INPUT ----

        let (sensors, sensors_rpt) = self.sensor_reader.acquire(&hw.sensors);
        self.ds.sensors = sensors;
        self.ds.sensors_status_rpt = sensors_rpt;
        self.ds.gear = pneumatics_ctrl::gear_state(hw.pneumatics.as_ref());

        if self.ds.mode != RobotMode::Disabled {
            self.ds.operator_inputs = self.operator_if.acquire(&hw.consoles);
            self.process_cycle(hw);
        }

        // ---- OUTPUTS ----

        if !self.ds.command.is_valid() {
            warn!("Invalid actuator command {:?}, sending zero", self.ds.command);
            self.ds.command = ActuatorCommand::default();
        }
        let command = self.ds.command;
        self.write_outputs(hw, &command);

        if self.ds.mode != RobotMode::Disabled {
            self.post_output(hw);
        }

        self.ds.compressor_enabled = hw.pneumatics.compressor_enabled().ok();

        // ---- TELEMETRY ----

        let packet = self.tm_packet();
        if let Err(e) = publisher.publish(&packet) {
            warn!("Could not publish telemetry: {}", e);
        }

        self.ds.cycle_end();

        command
    }

    /// Toggles, diagnostics and control processing for an enabled cycle.
    fn process_cycle(&mut self, hw: &mut Hardware) {
        let inputs = &self.ds.operator_inputs;

        // ---- TOGGLES ----

        self.toggles.update_all(
            inputs
                .lift_presets
                .iter()
                .enumerate()
                .map(|(i, p)| (ToggleId::LiftPreset(i), *p))
                .chain(
                    inputs
                        .arm_presets
                        .iter()
                        .enumerate()
                        .map(|(i, p)| (ToggleId::ArmPreset(i), *p)),
                ),
        );

        // ---- DIAGNOSTICS ----

        let mut diag_changed = false;
        if self.ds.mode == RobotMode::Autonomous {
            let (message, changed) = self.diag.update(hw.driver_station.game_message());
            self.ds.diag_message = message;
            diag_changed = changed;
        }

        if self.ds.diag_message == Some(DsMessage::Diagnostics) {
            let report = DiagnosticsReport::gather(hw.power.as_ref(), &hw.sensors, &self.ds.sensors);
            if diag_changed {
                report.save();
            }
            self.ds.diagnostics = Some(report);
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        // LiftArmCtrl processing
        match self.lift_arm_ctrl.compute_lift_and_arm_command(
            &self.ds.sensors,
            &mut self.toggles,
            inputs,
            self.ds.diag_message == Some(DsMessage::Fourbar),
        ) {
            Ok((o, r)) => {
                self.ds.lift_arm_ctrl_output = o;
                self.ds.lift_arm_ctrl_status_rpt = r;
            }
            Err(e) => warn!("Error during LiftArmCtrl processing: {}", e),
        }

        // DriveCtrl processing
        match self.drive_ctrl.compute_drive_command(
            inputs.drive.forward_axis,
            inputs.drive.rotation_axis,
            self.ds.gear,
        ) {
            Ok((o, r)) => {
                self.ds.drive_ctrl_output = o;
                self.ds.drive_ctrl_status_rpt = r;
            }
            Err(e) => warn!("Error during DriveCtrl processing: {}", e),
        }

        self.ds.command = ActuatorCommand {
            lift_power: self.ds.lift_arm_ctrl_output.lift_power,
            arm_power: self.ds.lift_arm_ctrl_output.arm_power,
            drive_forward: self.ds.drive_ctrl_output.forward,
            drive_rotation: self.ds.drive_ctrl_output.rotation,
        };
    }

    /// Re-homing and pneumatics, run once the actuator outputs have been written.
    fn post_output(&mut self, hw: &mut Hardware) {
        // ---- RE-HOMING ----

        if self.ds.lift_arm_ctrl_output.rehome_lift {
            self.reset_counter(hw, SensorId::LiftCounter);
        }
        if self.ds.lift_arm_ctrl_output.rehome_arm {
            self.reset_counter(hw, SensorId::ArmCounter);
        }

        // ---- PNEUMATICS ----

        let mut request = pneumatics_ctrl::select_request(&self.ds.operator_inputs.pneumatics);
        if request == PneumaticsRequest::None && self.ds.diag_message == Some(DsMessage::Pressure)
        {
            request = PneumaticsRequest::CompressorStart;
        }
        self.ds.pneumatics_request = request;

        if let Err(e) = pneumatics_ctrl::apply_request(hw.pneumatics.as_mut(), request) {
            warn!("Could not apply pneumatics request {:?}: {}", request, e);
        }
    }

    /// Send a command to the lift, arm and drive. Failures are logged and the cycle carries on.
    fn write_outputs(&mut self, hw: &mut Hardware, command: &ActuatorCommand) {
        let results = [
            ("lift", hw.actuators.lift.set(command.lift_power)),
            ("arm", hw.actuators.arm.set(command.arm_power)),
            (
                "drive",
                hw.actuators
                    .drive
                    .arcade_drive(command.drive_forward, command.drive_rotation),
            ),
        ];

        let mut failed = false;
        for (name, result) in results.iter() {
            if let Err(e) = result {
                warn!("Could not write the {} output: {}", name, e);
                failed = true;
            }
        }

        if failed {
            self.ds.num_consec_output_errors += 1;
        } else {
            self.ds.num_consec_output_errors = 0;
        }
    }

    /// Zero a position counter.
    fn reset_counter(&mut self, hw: &mut Hardware, id: SensorId) {
        let counter: &mut dyn PositionCounter = match id {
            SensorId::LiftCounter => hw.sensors.lift_counter.as_mut(),
            SensorId::ArmCounter => hw.sensors.arm_counter.as_mut(),
            SensorId::DriveLeftCounter => hw.sensors.drive_left_counter.as_mut(),
            SensorId::DriveRightCounter => hw.sensors.drive_right_counter.as_mut(),
            _ => return,
        };

        match counter.reset() {
            Ok(()) => self.sensor_reader.counter_reset(id),
            Err(e) => warn!("Could not reset {:?}: {}", id, e),
        }
    }

    fn tm_packet(&self) -> TmPacket {
        let (player_station_in_range, hatch_in_range) = TmPacket::range_flags(&self.ds.sensors);

        TmPacket {
            cycle: self.ds.num_cycles,
            time_s: self.ds.sim_time_s,
            mode: self.ds.mode,
            sensors: self.ds.sensors,
            unavailable_sensors: self.ds.sensors_status_rpt.unavailable.clone(),
            toggles: self.toggles.states(),
            lift_mode: self.ds.lift_arm_ctrl_output.lift_mode,
            command: self.ds.command,
            gear: self.ds.gear,
            pneumatics_request: self.ds.pneumatics_request,
            compressor_enabled: self.ds.compressor_enabled,
            max_limit_interlock: self.ds.lift_arm_ctrl_status_rpt.max_limit_interlock,
            invalid_preset_selection: self.ds.lift_arm_ctrl_status_rpt.invalid_preset_selection,
            player_station_in_range,
            hatch_in_range,
            diagnostics: self.ds.diagnostics.clone(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{hal::sim::SimRobot, lift_arm_ctrl::LiftMode};
    use comms_if::{eqpt::pneumatics::GearState, op::JoystickId};

    /// Keeps every published packet.
    #[derive(Default)]
    struct Recorder {
        packets: Vec<TmPacket>,
    }

    impl TmPublisher for Recorder {
        fn publish(&mut self, packet: &TmPacket) -> Result<(), crate::tm::TmError> {
            self.packets.push(packet.clone());
            Ok(())
        }
    }

    fn setup(mode: RobotMode) -> (SimRobot, Hardware, Robot) {
        let sim = SimRobot::new();
        let mut hw = sim.hardware();
        let mut robot = Robot::new(RobotParams::default()).unwrap();
        robot.set_mode(mode, &mut hw);
        (sim, hw, robot)
    }

    #[test]
    fn test_manual_lift_rehomes_counter() {
        let (sim, mut hw, mut robot) = setup(RobotMode::Teleop);
        let mut tm = Recorder::default();

        {
            let mut s = sim.state_mut();
            s.lift_height = 1.0;
            s.axes.insert((JoystickId::Xbox, 3), 0.5);
        }
        assert_eq!(sim.state().lift_count(), 1);

        let cmd = robot.tick(&mut hw, &mut tm);

        assert!((cmd.lift_power - 0.325).abs() < 1e-9);
        assert!((sim.state().lift_power - 0.325).abs() < 1e-9);
        assert_eq!(sim.state().lift_count(), 0);

        // Re-homing again while still home leaves the counter at zero
        let resets = sim.state().counter_resets[&SensorId::LiftCounter];
        robot.tick(&mut hw, &mut tm);
        assert_eq!(sim.state().lift_count(), 0);
        assert_eq!(
            sim.state().counter_resets[&SensorId::LiftCounter],
            resets + 1
        );
        assert_eq!(tm.packets.len(), 2);
    }

    #[test]
    fn test_preset_from_button() {
        let (sim, mut hw, mut robot) = setup(RobotMode::Teleop);
        let mut tm = Recorder::default();

        {
            let mut s = sim.state_mut();
            s.set_lift_count(100);
            s.buttons.insert((JoystickId::Xbox, 8), true);
        }

        let cmd = robot.tick(&mut hw, &mut tm);
        assert_eq!(cmd.lift_power, 0.3);
        assert!(robot.toggles().is_on(ToggleId::LiftPreset(0)));

        {
            let mut s = sim.state_mut();
            s.buttons.insert((JoystickId::Xbox, 8), false);
            s.set_lift_count(130);
        }

        let cmd = robot.tick(&mut hw, &mut tm);
        assert_eq!(cmd.lift_power, 0.05);
        assert!(!robot.toggles().is_on(ToggleId::LiftPreset(0)));

        let last = tm.packets.last().unwrap();
        assert_eq!(last.lift_mode, LiftMode::PresetReached(0));
    }

    #[test]
    fn test_disabled() {
        let (sim, mut hw, mut robot) = setup(RobotMode::Disabled);
        let mut tm = Recorder::default();

        {
            let mut s = sim.state_mut();
            s.buttons.insert((JoystickId::Xbox, 8), true);
            s.axes.insert((JoystickId::Joystick, 1), -1.0);
            s.drive_forward = 0.5;
        }

        let cmd = robot.tick(&mut hw, &mut tm);

        assert_eq!(cmd, ActuatorCommand::default());
        assert_eq!(sim.state().drive_forward, 0.0);
        assert!(!robot.toggles().is_on(ToggleId::LiftPreset(0)));
        assert!(!sim.state().compressor_enabled);
    }

    #[test]
    fn test_mode_entry() {
        let sim = SimRobot::new();
        let mut hw = sim.hardware();
        let mut robot = Robot::new(RobotParams::default()).unwrap();

        {
            let mut s = sim.state_mut();
            s.set_lift_count(200);
            s.arm_angle = 30.0;
            s.drive_left = 1000.0;
        }

        robot.set_mode(RobotMode::Autonomous, &mut hw);
        assert_eq!(robot.mode(), RobotMode::Autonomous);
        assert_eq!(sim.state().lift_count(), 0);
        assert_eq!(sim.state().arm_count(), 0);
        assert!(!sim.state().compressor_enabled);

        sim.state_mut().arm_angle = 60.0;
        robot.set_mode(RobotMode::Teleop, &mut hw);
        assert_eq!(sim.state().arm_count(), 30);
        assert!(sim.state().compressor_enabled);
    }

    #[test]
    fn test_gear_shift_scales_drive() {
        let (sim, mut hw, mut robot) = setup(RobotMode::Teleop);
        let mut tm = Recorder::default();

        {
            let mut s = sim.state_mut();
            s.buttons.insert((JoystickId::Joystick, 2), true);
            s.axes.insert((JoystickId::Joystick, 1), -1.0);
        }

        // Shift request is applied at the end of the first cycle
        let cmd = robot.tick(&mut hw, &mut tm);
        assert_eq!(cmd.drive_forward, 1.0);

        let cmd = robot.tick(&mut hw, &mut tm);
        assert!((cmd.drive_forward - 0.85).abs() < 1e-9);
        assert_eq!(tm.packets[1].gear, GearState::Low);
        assert_eq!(tm.packets[1].pneumatics_request, PneumaticsRequest::ShiftLow);
    }

    #[test]
    fn test_diagnostic_messages() {
        let (sim, mut hw, mut robot) = setup(RobotMode::Autonomous);
        let mut tm = Recorder::default();

        {
            let mut s = sim.state_mut();
            s.arm_angle = 50.0;
            s.axes.insert((JoystickId::Xbox, 1), 1.0);
            s.game_message = Some("fourbar".into());
        }
        let cmd = robot.tick(&mut hw, &mut tm);
        assert_eq!(cmd.arm_power, 0.25);

        sim.state_mut().game_message = Some("pressure".into());
        let cmd = robot.tick(&mut hw, &mut tm);
        assert_eq!(cmd.arm_power, -0.25);
        assert!(sim.state().compressor_enabled);

        sim.state_mut().game_message = Some("diagnostics".into());
        robot.tick(&mut hw, &mut tm);
        let diag = tm.packets[2].diagnostics.as_ref().unwrap();
        assert_eq!(diag.battery_voltage, Some(12.6));

        // Ignored outside of autonomous
        robot.set_mode(RobotMode::Teleop, &mut hw);
        robot.tick(&mut hw, &mut tm);
        assert!(tm.packets[3].diagnostics.is_none());
    }

    #[test]
    fn test_output_failure() {
        let (sim, mut hw, mut robot) = setup(RobotMode::Teleop);
        let mut tm = Recorder::default();

        sim.state_mut().outputs_failed = true;
        robot.tick(&mut hw, &mut tm);
        assert_eq!(robot.ds.num_consec_output_errors, 1);
        assert_eq!(tm.packets.len(), 1);

        sim.state_mut().outputs_failed = false;
        robot.tick(&mut hw, &mut tm);
        assert_eq!(robot.ds.num_consec_output_errors, 0);
    }

    #[test]
    fn test_binding_mismatch() {
        let mut params = RobotParams::default();
        params.operator_if.lift_presets.pop();

        assert!(matches!(
            Robot::new(params),
            Err(RobotInitError::PresetBindingMismatch {
                presets: 2,
                bindings: 1
            })
        ));
    }
}
