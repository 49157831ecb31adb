//! # Lift and arm control module
//!
//! Arbitrates, every cycle, which behaviour drives the lift and the four-bar arm:
//!
//! 1. Re-homing: while the min hall sensor or the arm limit switch reports the home condition the
//!    matching position counter is re-zeroed. Re-homing never affects power.
//! 2. Preset seek: if a lift preset toggle is on the lift is driven towards that preset's band.
//! 3. Manual: otherwise the lift follows the operator's hold button and up/down axes.
//!
//! The arm is always under manual control, except when the `fourbar` diagnostic is running.
//!
//! While the max hall sensor is triggered no upward power above the hold power is allowed, and
//! any active preset is aborted.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
mod preset;
mod state;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

pub use params::*;
pub use preset::*;
pub use state::*;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible errors that can occur during LiftArmCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum LiftArmCtrlError {
    #[error("Invalid LiftArmCtrl parameter: {0}")]
    InvalidParams(String),

    #[error("More than one lift preset is selected: {0:?}")]
    InvalidPresetSelection(Vec<usize>),

    #[error("Lift preset {0} is selected but the preset table has only {1} entries")]
    UnknownPreset(usize, usize),
}
