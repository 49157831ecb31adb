//! # Communications interface crate.
//!
//! Provides the interface types shared between the control core and the
//! collaborators around it (motor outputs, pneumatics, the driver station and
//! the operator consoles).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Driver station messages and robot modes
pub mod ds;

/// Command and state definitions for equipment (motors, pneumatics)
pub mod eqpt;

/// Operator console identifiers and bindings
pub mod op;
