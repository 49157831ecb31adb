//! # Robot library.
//!
//! The control core of the robot: everything run by `robot_exec` each control cycle, available to
//! other crates, tests and benchmarks.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Data store - per-cycle state shared between the modules
pub mod data_store;

/// Diagnostics - driver station diagnostic messages and reports
pub mod diag;

/// Drive control module - scales the driver's stick into a drive command
pub mod drive_ctrl;

/// Hardware abstraction - traits implemented by the robot's devices
pub mod hal;

/// Lift and arm control module - arbitrates between presets and manual control
pub mod lift_arm_ctrl;

/// Operator interface - reads the operator consoles through a binding table
pub mod operator_if;

/// Executable parameters
pub mod params;

/// Pneumatics control - compressor and solenoid requests
pub mod pneumatics_ctrl;

/// The robot - runs one control cycle
pub mod robot;

/// Sensor snapshot - reads every sensor once per cycle
pub mod sensors;

/// Telemetry - per-cycle packets and their publishers
pub mod tm;

/// Toggle tracker - latched button states
pub mod toggle;
