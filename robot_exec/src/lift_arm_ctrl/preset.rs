//! Lift preset seeking

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A fixed lift position the operator can request with a single button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,

    /// Position at or above which the preset is reached.
    ///
    /// Units: encoder ticks
    pub band: i64,

    /// Power used while moving towards the band.
    pub coarse_power: f64,

    /// Power used once the band is reached.
    pub hold_power: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Result of one preset seek step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SeekOutput {
    /// Still below the band, carry on at the given power.
    Seeking(f64),

    /// Band reached, hold at the given power. The preset should be cleared.
    Reached(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SeekOutput {
    pub fn power(&self) -> f64 {
        match self {
            SeekOutput::Seeking(p) | SeekOutput::Reached(p) => *p,
        }
    }

    pub fn is_reached(&self) -> bool {
        matches!(self, SeekOutput::Reached(_))
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Compute the lift power for a preset given the current lift position.
pub fn seek_preset(position: i64, preset: &Preset) -> SeekOutput {
    if position < preset.band {
        SeekOutput::Seeking(preset.coarse_power)
    } else {
        SeekOutput::Reached(preset.hold_power)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_seek_preset() {
        let preset = Preset {
            name: "hatch_1".into(),
            band: 125,
            coarse_power: 0.3,
            hold_power: 0.05,
        };

        assert_eq!(seek_preset(0, &preset), SeekOutput::Seeking(0.3));
        assert_eq!(seek_preset(124, &preset), SeekOutput::Seeking(0.3));
        assert_eq!(seek_preset(125, &preset), SeekOutput::Reached(0.05));
        assert_eq!(seek_preset(400, &preset).power(), 0.05);
        assert!(seek_preset(130, &preset).is_reached());
    }
}
