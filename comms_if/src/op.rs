//! # Operator Console Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Binds a logical operator input to a physical button or axis.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
pub struct InputBinding {
    /// The console the input is on.
    pub stick: JoystickId,

    /// The raw button or axis index on that console.
    pub index: u8,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The operator consoles plugged into the driver station.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum JoystickId {
    /// Driver's flight stick (port 1).
    Joystick,

    /// Operator's gamepad (port 2).
    Xbox,

    /// Operator's button box (port 3).
    ButtonBox,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl InputBinding {
    pub const fn new(stick: JoystickId, index: u8) -> Self {
        Self { stick, index }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_binding_from_json() {
        let b: InputBinding =
            serde_json::from_str(r#"{"stick": "ButtonBox", "index": 9}"#).unwrap();
        assert_eq!(b, InputBinding::new(JoystickId::ButtonBox, 9));

        assert!(serde_json::from_str::<InputBinding>(r#"{"stick": "Wheel", "index": 1}"#).is_err());
    }
}
