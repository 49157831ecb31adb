//! # Pneumatics Equipment Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The double solenoids fitted to the robot.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum SolenoidId {
    /// Drivetrain gear shifter.
    Shifter,

    /// Hatch panel claw.
    Claw,

    /// Hatch panel ejector pins.
    Ejector,
}

/// The position of a double solenoid.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
pub enum SolenoidValue {
    Off,
    Forward,
    Reverse,
}

/// Drivetrain gear, as set by the shifter solenoid.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
pub enum GearState {
    High,
    Low,
    /// The shifter has not been driven to either side yet.
    Unknown,
}

/// A request to the pneumatics system. At most one request is made per cycle.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
pub enum PneumaticsRequest {
    None,
    CompressorStop,
    CompressorStart,
    ShiftHigh,
    ShiftLow,
    ClawOpen,
    ClawClose,
    Eject,
    Retract,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl Default for SolenoidValue {
    fn default() -> Self {
        SolenoidValue::Off
    }
}

impl Default for GearState {
    fn default() -> Self {
        GearState::Unknown
    }
}

impl Default for PneumaticsRequest {
    fn default() -> Self {
        PneumaticsRequest::None
    }
}

impl From<SolenoidValue> for GearState {
    fn from(value: SolenoidValue) -> Self {
        match value {
            SolenoidValue::Forward => GearState::High,
            SolenoidValue::Reverse => GearState::Low,
            SolenoidValue::Off => GearState::Unknown,
        }
    }
}

impl PneumaticsRequest {
    /// The compressor demand carried by this request, `Some(true)` to run the compressor.
    pub fn compressor_demand(&self) -> Option<bool> {
        match self {
            PneumaticsRequest::CompressorStop => Some(false),
            PneumaticsRequest::CompressorStart => Some(true),
            _ => None,
        }
    }

    /// The solenoid demand carried by this request.
    pub fn solenoid_demand(&self) -> Option<(SolenoidId, SolenoidValue)> {
        match self {
            PneumaticsRequest::ShiftHigh => Some((SolenoidId::Shifter, SolenoidValue::Forward)),
            PneumaticsRequest::ShiftLow => Some((SolenoidId::Shifter, SolenoidValue::Reverse)),
            PneumaticsRequest::ClawOpen => Some((SolenoidId::Claw, SolenoidValue::Forward)),
            PneumaticsRequest::ClawClose => Some((SolenoidId::Claw, SolenoidValue::Reverse)),
            PneumaticsRequest::Eject => Some((SolenoidId::Ejector, SolenoidValue::Forward)),
            PneumaticsRequest::Retract => Some((SolenoidId::Ejector, SolenoidValue::Reverse)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_gear_from_shifter() {
        assert_eq!(GearState::from(SolenoidValue::Forward), GearState::High);
        assert_eq!(GearState::from(SolenoidValue::Reverse), GearState::Low);
        assert_eq!(GearState::from(SolenoidValue::Off), GearState::Unknown);
    }

    #[test]
    fn test_request_demands() {
        assert_eq!(PneumaticsRequest::CompressorStop.compressor_demand(), Some(false));
        assert_eq!(PneumaticsRequest::CompressorStop.solenoid_demand(), None);
        assert_eq!(
            PneumaticsRequest::ShiftLow.solenoid_demand(),
            Some((SolenoidId::Shifter, SolenoidValue::Reverse))
        );
        assert_eq!(PneumaticsRequest::None.compressor_demand(), None);
        assert_eq!(PneumaticsRequest::None.solenoid_demand(), None);
    }
}
