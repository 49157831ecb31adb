//! # Simulated robot
//!
//! A hardware-free stand-in for the robot, used when running the executable off-robot and as the
//! fake in tests. All handles created by [`SimRobot::hardware`] share one [`SimState`], so a test
//! can poke the state directly and observe what the control core commanded.
//!
//! The min hall sensor and arm limit switch are active low, matching the real robot: they read
//! `false` while the mechanism is at its home position. The max hall sensor reads `true` at the top
//! of the lift travel unless [`SimState::max_hall_active_low`] is set.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::cell::{Ref, RefCell, RefMut};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use comms_if::{
    ds::RobotMode,
    eqpt::pneumatics::{SolenoidId, SolenoidValue},
    op::JoystickId,
};
use log::trace;
use serde::Deserialize;

use super::*;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Lift speed at full power.
///
/// Units: ticks/second
const LIFT_RATE_TICKS_S: f64 = 400.0;

/// Power needed to hold the lift against gravity.
const LIFT_GRAVITY_POWER: f64 = 0.04;

/// Top of the lift travel.
///
/// Units: ticks
const LIFT_MAX_HEIGHT_TICKS: f64 = 450.0;

/// Arm speed at full power.
///
/// Units: ticks/second
const ARM_RATE_TICKS_S: f64 = 300.0;

/// End of the arm travel.
///
/// Units: ticks
const ARM_MAX_ANGLE_TICKS: f64 = 200.0;

/// Drive encoder speed at full power.
///
/// Units: ticks/second
const DRIVE_RATE_TICKS_S: f64 = 8192.0;

/// Distance from home within which the home sensors trigger.
///
/// Units: ticks
const HOME_BAND_TICKS: f64 = 2.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A simulated robot.
#[derive(Clone, Default)]
pub struct SimRobot {
    state: Rc<RefCell<SimState>>,
}

/// Complete state of the simulated robot.
#[derive(Debug, Clone)]
pub struct SimState {
    /// Lift height above its home position.
    ///
    /// Units: ticks
    pub lift_height: f64,
    lift_offset: f64,

    /// Arm angle away from its hard stop.
    ///
    /// Units: ticks
    pub arm_angle: f64,
    arm_offset: f64,

    pub drive_left: f64,
    drive_left_offset: f64,
    pub drive_left_rate: f64,
    pub drive_right: f64,
    drive_right_offset: f64,
    pub drive_right_rate: f64,

    /// Last demands written by the control core.
    pub lift_power: f64,
    pub arm_power: f64,
    pub drive_forward: f64,
    pub drive_rotation: f64,

    pub buttons: HashMap<(JoystickId, u8), bool>,
    pub axes: HashMap<(JoystickId, u8), f64>,

    pub compressor_enabled: bool,
    pub solenoids: HashMap<SolenoidId, SolenoidValue>,

    pub game_message: Option<String>,

    pub robot_range_v: f64,
    pub cargo_range_v: f64,

    pub battery_voltage: f64,
    pub temperature_c: f64,
    pub browned_out: bool,

    /// Invert the max hall sensor so that it reads `false` at the top.
    pub max_hall_active_low: bool,

    /// Sensors whose reads currently fail.
    pub failed_sensors: HashSet<SensorId>,

    /// When set, motor writes fail.
    pub outputs_failed: bool,

    /// Number of counter resets performed, per counter.
    pub counter_resets: HashMap<SensorId, u64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// An event applied to the simulated robot, usually read from an input script.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub enum SimEvent {
    /// Press or release a console button.
    Button {
        stick: JoystickId,
        index: u8,
        pressed: bool,
    },

    /// Move a console axis.
    Axis {
        stick: JoystickId,
        index: u8,
        value: f64,
    },

    /// Set (or clear) the driver station game message.
    GameMessage(Option<String>),

    /// Switch the robot mode.
    Mode(RobotMode),

    /// Make a sensor fail or recover.
    SensorFault { sensor: SensorId, failed: bool },

    /// Place the lift at a height.
    LiftHeight(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimState {
    fn default() -> Self {
        let mut solenoids = HashMap::new();
        solenoids.insert(SolenoidId::Shifter, SolenoidValue::Off);
        solenoids.insert(SolenoidId::Claw, SolenoidValue::Off);
        solenoids.insert(SolenoidId::Ejector, SolenoidValue::Off);

        Self {
            lift_height: 0.0,
            lift_offset: 0.0,
            arm_angle: 0.0,
            arm_offset: 0.0,
            drive_left: 0.0,
            drive_left_offset: 0.0,
            drive_left_rate: 0.0,
            drive_right: 0.0,
            drive_right_offset: 0.0,
            drive_right_rate: 0.0,
            lift_power: 0.0,
            arm_power: 0.0,
            drive_forward: 0.0,
            drive_rotation: 0.0,
            buttons: HashMap::new(),
            axes: HashMap::new(),
            compressor_enabled: false,
            solenoids,
            game_message: None,
            robot_range_v: 0.5,
            cargo_range_v: 0.2,
            battery_voltage: 12.6,
            temperature_c: 28.0,
            browned_out: false,
            max_hall_active_low: false,
            failed_sensors: HashSet::new(),
            outputs_failed: false,
            counter_resets: HashMap::new(),
        }
    }
}

impl SimState {
    /// Raw reading of the lift counter.
    pub fn lift_count(&self) -> i64 {
        (self.lift_height - self.lift_offset).round() as i64
    }

    /// Raw reading of the arm counter.
    pub fn arm_count(&self) -> i64 {
        (self.arm_angle - self.arm_offset).round() as i64
    }

    /// Move the lift so that its counter reads `count`, without changing the counter offset.
    pub fn set_lift_count(&mut self, count: i64) {
        self.lift_height = count as f64 + self.lift_offset;
    }

    fn check(&self, id: SensorId) -> Result<(), HalError> {
        if self.failed_sensors.contains(&id) {
            Err(HalError::Unavailable)
        } else {
            Ok(())
        }
    }

    fn digital(&self, id: SensorId) -> Result<bool, HalError> {
        self.check(id)?;
        Ok(match id {
            SensorId::MinHall => self.lift_height > HOME_BAND_TICKS,
            SensorId::MaxHall => {
                (self.lift_height >= LIFT_MAX_HEIGHT_TICKS - HOME_BAND_TICKS)
                    != self.max_hall_active_low
            }
            SensorId::ArmLimit => self.arm_angle > HOME_BAND_TICKS,
            _ => false,
        })
    }

    fn count(&self, id: SensorId) -> Result<i64, HalError> {
        self.check(id)?;
        Ok(match id {
            SensorId::LiftCounter => self.lift_count(),
            SensorId::ArmCounter => self.arm_count(),
            SensorId::DriveLeftCounter => (self.drive_left - self.drive_left_offset).round() as i64,
            SensorId::DriveRightCounter => {
                (self.drive_right - self.drive_right_offset).round() as i64
            }
            _ => 0,
        })
    }

    fn velocity(&self, id: SensorId) -> Result<f64, HalError> {
        self.check(id)?;
        Ok(match id {
            SensorId::LiftCounter => self.lift_power * LIFT_RATE_TICKS_S,
            SensorId::ArmCounter => self.arm_power * ARM_RATE_TICKS_S,
            SensorId::DriveLeftCounter => self.drive_left_rate,
            SensorId::DriveRightCounter => self.drive_right_rate,
            _ => 0.0,
        })
    }

    fn reset(&mut self, id: SensorId) -> Result<(), HalError> {
        self.check(id)?;
        match id {
            SensorId::LiftCounter => self.lift_offset = self.lift_height,
            SensorId::ArmCounter => self.arm_offset = self.arm_angle,
            SensorId::DriveLeftCounter => self.drive_left_offset = self.drive_left,
            SensorId::DriveRightCounter => self.drive_right_offset = self.drive_right,
            _ => (),
        }
        *self.counter_resets.entry(id).or_insert(0) += 1;
        Ok(())
    }

    fn analog(&self, id: SensorId) -> Result<f64, HalError> {
        self.check(id)?;
        Ok(match id {
            SensorId::RobotRange => self.robot_range_v,
            SensorId::CargoRange => self.cargo_range_v,
            _ => 0.0,
        })
    }
}

impl SimRobot {
    /// Create a new simulated robot with everything at home.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the hardware bundle for this robot. Every handle shares this robot's state.
    pub fn hardware(&self) -> Hardware {
        let digital = |id| -> Box<dyn DigitalInput> {
            Box::new(SimSensor { state: self.state.clone(), id })
        };
        let counter = |id| -> Box<dyn PositionCounter> {
            Box::new(SimSensor { state: self.state.clone(), id })
        };
        let analog = |id| -> Box<dyn AnalogInput> {
            Box::new(SimSensor { state: self.state.clone(), id })
        };
        let stick = |id| -> Box<dyn Joystick> {
            Box::new(SimJoystick { state: self.state.clone(), id })
        };
        let motor = |id| -> Box<dyn MotorOutput> {
            Box::new(SimMotor { state: self.state.clone(), id })
        };

        Hardware {
            sensors: SensorBus {
                min_hall: digital(SensorId::MinHall),
                max_hall: digital(SensorId::MaxHall),
                arm_limit: digital(SensorId::ArmLimit),
                lift_counter: counter(SensorId::LiftCounter),
                arm_counter: counter(SensorId::ArmCounter),
                drive_left_counter: counter(SensorId::DriveLeftCounter),
                drive_right_counter: counter(SensorId::DriveRightCounter),
                robot_range: analog(SensorId::RobotRange),
                cargo_range: analog(SensorId::CargoRange),
            },
            consoles: Consoles {
                joystick: stick(JoystickId::Joystick),
                xbox: stick(JoystickId::Xbox),
                button_box: stick(JoystickId::ButtonBox),
            },
            actuators: Actuators {
                lift: motor(MotorId::Lift),
                arm: motor(MotorId::Arm),
                drive: Box::new(SimDrive { state: self.state.clone() }),
            },
            pneumatics: Box::new(SimPneumatics { state: self.state.clone() }),
            driver_station: Box::new(SimDriverStation { state: self.state.clone() }),
            power: Box::new(SimPower { state: self.state.clone() }),
        }
    }

    /// Borrow the simulation state.
    pub fn state(&self) -> Ref<SimState> {
        self.state.borrow()
    }

    /// Mutably borrow the simulation state.
    pub fn state_mut(&self) -> RefMut<SimState> {
        self.state.borrow_mut()
    }

    /// Apply an event to the simulation.
    ///
    /// Mode changes are not part of the robot's state so are handed back to the caller.
    pub fn apply_event(&self, event: SimEvent) -> Option<RobotMode> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;

        match event {
            SimEvent::Button { stick, index, pressed } => {
                state.buttons.insert((stick, index), pressed);
            }
            SimEvent::Axis { stick, index, value } => {
                state.axes.insert((stick, index), value);
            }
            SimEvent::GameMessage(msg) => state.game_message = msg,
            SimEvent::Mode(mode) => return Some(mode),
            SimEvent::SensorFault { sensor, failed } => {
                if failed {
                    state.failed_sensors.insert(sensor);
                } else {
                    state.failed_sensors.remove(&sensor);
                }
            }
            SimEvent::LiftHeight(h) => state.lift_height = h.max(0.0).min(LIFT_MAX_HEIGHT_TICKS),
        }

        None
    }

    /// Advance the plant model by `dt_s` seconds using the last demands written to it.
    pub fn step(&self, dt_s: f64) {
        let mut guard = self.state.borrow_mut();
        let s = &mut *guard;

        // Gravity pulls the lift down unless it is at the bottom
        let lift_rate = if s.lift_height > 0.0 || s.lift_power > LIFT_GRAVITY_POWER {
            (s.lift_power - LIFT_GRAVITY_POWER) * LIFT_RATE_TICKS_S
        } else {
            0.0
        };
        s.lift_height = (s.lift_height + lift_rate * dt_s).max(0.0).min(LIFT_MAX_HEIGHT_TICKS);

        s.arm_angle = (s.arm_angle + s.arm_power * ARM_RATE_TICKS_S * dt_s)
            .max(0.0)
            .min(ARM_MAX_ANGLE_TICKS);

        s.drive_left_rate = (s.drive_forward + s.drive_rotation) * DRIVE_RATE_TICKS_S;
        s.drive_right_rate = (s.drive_forward - s.drive_rotation) * DRIVE_RATE_TICKS_S;
        s.drive_left += s.drive_left_rate * dt_s;
        s.drive_right += s.drive_right_rate * dt_s;

        trace!(
            "Sim step: lift {:.1} ticks, arm {:.1} ticks, drive ({:.0}, {:.0})",
            s.lift_height,
            s.arm_angle,
            s.drive_left,
            s.drive_right
        );
    }
}

// ------------------------------------------------------------------------------------------------
// HANDLES
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum MotorId {
    Lift,
    Arm,
}

struct SimSensor {
    state: Rc<RefCell<SimState>>,
    id: SensorId,
}

struct SimJoystick {
    state: Rc<RefCell<SimState>>,
    id: JoystickId,
}

struct SimMotor {
    state: Rc<RefCell<SimState>>,
    id: MotorId,
}

struct SimDrive {
    state: Rc<RefCell<SimState>>,
}

struct SimPneumatics {
    state: Rc<RefCell<SimState>>,
}

struct SimDriverStation {
    state: Rc<RefCell<SimState>>,
}

struct SimPower {
    state: Rc<RefCell<SimState>>,
}

impl DigitalInput for SimSensor {
    fn get(&self) -> Result<bool, HalError> {
        self.state.borrow().digital(self.id)
    }
}

impl PositionCounter for SimSensor {
    fn get(&self) -> Result<i64, HalError> {
        self.state.borrow().count(self.id)
    }

    fn velocity(&self) -> Result<f64, HalError> {
        self.state.borrow().velocity(self.id)
    }

    fn reset(&mut self) -> Result<(), HalError> {
        self.state.borrow_mut().reset(self.id)
    }
}

impl AnalogInput for SimSensor {
    fn voltage(&self) -> Result<f64, HalError> {
        self.state.borrow().analog(self.id)
    }
}

impl Joystick for SimJoystick {
    fn raw_button(&self, index: u8) -> Result<bool, HalError> {
        Ok(*self.state.borrow().buttons.get(&(self.id, index)).unwrap_or(&false))
    }

    fn raw_axis(&self, index: u8) -> Result<f64, HalError> {
        Ok(*self.state.borrow().axes.get(&(self.id, index)).unwrap_or(&0.0))
    }
}

fn check_demand(state: &SimState, demand: f64) -> Result<(), HalError> {
    if state.outputs_failed {
        return Err(HalError::Disconnected);
    }
    if !(demand.abs() <= 1.0) {
        return Err(HalError::InvalidDemand(demand));
    }
    Ok(())
}

impl MotorOutput for SimMotor {
    fn set(&mut self, power: f64) -> Result<(), HalError> {
        let mut s = self.state.borrow_mut();
        check_demand(&s, power)?;
        match self.id {
            MotorId::Lift => s.lift_power = power,
            MotorId::Arm => s.arm_power = power,
        }
        Ok(())
    }
}

impl DriveOutput for SimDrive {
    fn arcade_drive(&mut self, forward: f64, rotation: f64) -> Result<(), HalError> {
        let mut s = self.state.borrow_mut();
        check_demand(&s, forward)?;
        check_demand(&s, rotation)?;
        s.drive_forward = forward;
        s.drive_rotation = rotation;
        Ok(())
    }
}

impl Pneumatics for SimPneumatics {
    fn set_compressor(&mut self, enabled: bool) -> Result<(), HalError> {
        self.state.borrow_mut().compressor_enabled = enabled;
        Ok(())
    }

    fn compressor_enabled(&self) -> Result<bool, HalError> {
        Ok(self.state.borrow().compressor_enabled)
    }

    fn set_solenoid(&mut self, id: SolenoidId, value: SolenoidValue) -> Result<(), HalError> {
        self.state.borrow_mut().solenoids.insert(id, value);
        Ok(())
    }

    fn solenoid(&self, id: SolenoidId) -> Result<SolenoidValue, HalError> {
        Ok(*self.state.borrow().solenoids.get(&id).unwrap_or(&SolenoidValue::Off))
    }
}

impl DriverStation for SimDriverStation {
    fn game_message(&self) -> Option<String> {
        self.state.borrow().game_message.clone()
    }
}

impl PowerMonitor for SimPower {
    fn battery_voltage(&self) -> Result<f64, HalError> {
        Ok(self.state.borrow().battery_voltage)
    }

    fn temperature_c(&self) -> Result<f64, HalError> {
        Ok(self.state.borrow().temperature_c)
    }

    fn is_browned_out(&self) -> Result<bool, HalError> {
        Ok(self.state.borrow().browned_out)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_home_sensors_active_low() {
        let sim = SimRobot::new();
        let hw = sim.hardware();

        // At home the sensors read false
        assert_eq!(hw.sensors.min_hall.get(), Ok(false));
        assert_eq!(hw.sensors.arm_limit.get(), Ok(false));
        assert_eq!(hw.sensors.max_hall.get(), Ok(false));

        sim.state_mut().lift_height = 100.0;
        assert_eq!(hw.sensors.min_hall.get(), Ok(true));

        sim.state_mut().lift_height = LIFT_MAX_HEIGHT_TICKS;
        assert_eq!(hw.sensors.max_hall.get(), Ok(true));
    }

    #[test]
    fn test_counter_reset_and_faults() {
        let sim = SimRobot::new();
        let mut hw = sim.hardware();

        sim.state_mut().lift_height = 42.0;
        assert_eq!(hw.sensors.lift_counter.get(), Ok(42));

        hw.sensors.lift_counter.reset().unwrap();
        assert_eq!(hw.sensors.lift_counter.get(), Ok(0));
        assert_eq!(sim.state().counter_resets[&SensorId::LiftCounter], 1);

        sim.apply_event(SimEvent::SensorFault { sensor: SensorId::LiftCounter, failed: true });
        assert_eq!(hw.sensors.lift_counter.get(), Err(HalError::Unavailable));
    }

    #[test]
    fn test_motor_rejects_out_of_range() {
        let sim = SimRobot::new();
        let mut hw = sim.hardware();

        assert_eq!(hw.actuators.lift.set(1.5), Err(HalError::InvalidDemand(1.5)));
        assert!(hw.actuators.lift.set(std::f64::NAN).is_err());
        hw.actuators.lift.set(0.5).unwrap();
        assert_eq!(sim.state().lift_power, 0.5);
    }

    #[test]
    fn test_lift_rises_under_power() {
        let sim = SimRobot::new();
        let mut hw = sim.hardware();

        hw.actuators.lift.set(0.5).unwrap();
        for _ in 0..10 {
            sim.step(0.02);
        }

        assert!(sim.state().lift_height > 0.0);
        assert!(hw.sensors.lift_counter.get().unwrap() > 0);
    }

    #[test]
    fn test_events() {
        let sim = SimRobot::new();
        let hw = sim.hardware();

        let ev: SimEvent = serde_json::from_str(
            r#"{"Button": {"stick": "Xbox", "index": 8, "pressed": true}}"#
        ).unwrap();
        assert_eq!(sim.apply_event(ev), None);
        assert_eq!(hw.consoles.get(JoystickId::Xbox).raw_button(8), Ok(true));
        assert_eq!(hw.consoles.get(JoystickId::Joystick).raw_button(8), Ok(false));

        let ev: SimEvent = serde_json::from_str(r#"{"Mode": "Teleop"}"#).unwrap();
        assert_eq!(sim.apply_event(ev), Some(RobotMode::Teleop));
    }

    #[test]
    fn test_demo_script() {
        let si: util::script_interpreter::ScriptInterpreter<SimEvent> =
            util::script_interpreter::ScriptInterpreter::from_script_str(include_str!(
                "../../../scripts/preset_demo.txt"
            ))
            .unwrap();

        assert_eq!(si.get_num_events(), 15);
        assert_eq!(si.get_duration(), 10.0);
    }
}
