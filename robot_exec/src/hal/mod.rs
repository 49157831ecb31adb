//! # Hardware abstraction
//!
//! The control core never constructs devices itself. Everything it reads from or writes to is an
//! already-open handle implementing one of the traits in this module, collected into a
//! [`Hardware`] bundle which is passed into every tick.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Simulated robot implementing every hardware trait.
pub mod sim;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::pneumatics::{SolenoidId, SolenoidValue},
    op::JoystickId,
};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A digital sensor such as a hall effect sensor or limit switch.
pub trait DigitalInput {
    /// Read the raw state of the input.
    fn get(&self) -> Result<bool, HalError>;
}

/// A signed position counter, such as a quadrature encoder.
pub trait PositionCounter {
    /// Read the current count in encoder ticks.
    fn get(&self) -> Result<i64, HalError>;

    /// Read the current count rate in ticks per second.
    fn velocity(&self) -> Result<f64, HalError>;

    /// Zero the counter.
    fn reset(&mut self) -> Result<(), HalError>;
}

/// An analog input, for instance an ultrasonic range sensor.
pub trait AnalogInput {
    /// Read the input's voltage.
    ///
    /// Units: volts
    fn voltage(&self) -> Result<f64, HalError>;
}

/// An operator console (joystick, gamepad or button box).
pub trait Joystick {
    /// Read the raw state of a button.
    fn raw_button(&self, index: u8) -> Result<bool, HalError>;

    /// Read the raw value of an axis, in the range [-1, 1].
    fn raw_axis(&self, index: u8) -> Result<f64, HalError>;
}

/// A (group of) motor controller(s) driven by a single normalised power.
pub trait MotorOutput {
    /// Set the output power, which must be in the range [-1, 1].
    fn set(&mut self, power: f64) -> Result<(), HalError>;
}

/// A differential drivetrain driven in arcade style.
pub trait DriveOutput {
    /// Drive with the given forward and rotation demands, both in [-1, 1].
    fn arcade_drive(&mut self, forward: f64, rotation: f64) -> Result<(), HalError>;
}

/// The pneumatics system: compressor and double solenoids.
pub trait Pneumatics {
    /// Start or stop the compressor.
    fn set_compressor(&mut self, enabled: bool) -> Result<(), HalError>;

    /// Returns true if the compressor is enabled.
    fn compressor_enabled(&self) -> Result<bool, HalError>;

    /// Drive a solenoid to the given position.
    fn set_solenoid(&mut self, id: SolenoidId, value: SolenoidValue) -> Result<(), HalError>;

    /// Read the current position of a solenoid.
    fn solenoid(&self, id: SolenoidId) -> Result<SolenoidValue, HalError>;
}

/// The driver station link.
pub trait DriverStation {
    /// The free-text game specific message, if any has been set.
    fn game_message(&self) -> Option<String>;
}

/// Power distribution monitoring.
pub trait PowerMonitor {
    /// Battery voltage in volts.
    fn battery_voltage(&self) -> Result<f64, HalError>;

    /// Power distribution panel temperature in degrees celsius.
    fn temperature_c(&self) -> Result<f64, HalError>;

    /// Returns true if the controller has browned out.
    fn is_browned_out(&self) -> Result<bool, HalError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// All sensors read by the sensor snapshot.
pub struct SensorBus {
    /// Hall sensor at the bottom of the lift travel.
    pub min_hall: Box<dyn DigitalInput>,

    /// Hall sensor at the top of the lift travel.
    pub max_hall: Box<dyn DigitalInput>,

    /// Limit switch at the four-bar hard stop.
    pub arm_limit: Box<dyn DigitalInput>,

    pub lift_counter: Box<dyn PositionCounter>,
    pub arm_counter: Box<dyn PositionCounter>,
    pub drive_left_counter: Box<dyn PositionCounter>,
    pub drive_right_counter: Box<dyn PositionCounter>,

    /// Ultrasonic range sensor on the robot body.
    pub robot_range: Box<dyn AnalogInput>,

    /// Ultrasonic range sensor on the cargo intake.
    pub cargo_range: Box<dyn AnalogInput>,
}

/// The three operator consoles.
pub struct Consoles {
    pub joystick: Box<dyn Joystick>,
    pub xbox: Box<dyn Joystick>,
    pub button_box: Box<dyn Joystick>,
}

/// The powered actuators.
pub struct Actuators {
    pub lift: Box<dyn MotorOutput>,
    pub arm: Box<dyn MotorOutput>,
    pub drive: Box<dyn DriveOutput>,
}

/// Every collaborator handle the control core needs.
pub struct Hardware {
    pub sensors: SensorBus,
    pub consoles: Consoles,
    pub actuators: Actuators,
    pub pneumatics: Box<dyn Pneumatics>,
    pub driver_station: Box<dyn DriverStation>,
    pub power: Box<dyn PowerMonitor>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors reported by hardware handles.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum HalError {
    #[error("The device did not respond")]
    Unavailable,

    #[error("The device is disconnected")]
    Disconnected,

    #[error("Demand {0} is outside of the range [-1, 1]")]
    InvalidDemand(f64),
}

/// Identifies each sensor on the [`SensorBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorId {
    MinHall,
    MaxHall,
    ArmLimit,
    LiftCounter,
    ArmCounter,
    DriveLeftCounter,
    DriveRightCounter,
    RobotRange,
    CargoRange,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Consoles {
    /// Get the console with the given ID.
    pub fn get(&self, id: JoystickId) -> &dyn Joystick {
        match id {
            JoystickId::Joystick => self.joystick.as_ref(),
            JoystickId::Xbox => self.xbox.as_ref(),
            JoystickId::ButtonBox => self.button_box.as_ref(),
        }
    }
}
