//! # Driver Station Interface
//!
//! Robot modes selected by the driver station and the free-text game message used to invoke
//! diagnostic behaviours during autonomous.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Operating mode of the robot, selected by the driver station.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
pub enum RobotMode {
    /// All outputs are held at zero.
    Disabled,
    Autonomous,
    Teleop,
}

/// A recognised driver station diagnostic message.
///
/// Parsed from the exact message text, so padded or differently cased text is not recognised.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
pub enum DsMessage {
    /// Start the compressor.
    Pressure,

    /// Dump diagnostics telemetry.
    Diagnostics,

    /// Four-bar hold test.
    Fourbar,
}

/// Possible parsing errors.
#[derive(Debug, Error, PartialEq)]
pub enum DsParseError {
    #[error("{0:?} is not a recognised driver station message")]
    UnknownMessage(String),

    #[error("{0:?} is not a recognised robot mode")]
    UnknownMode(String),
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl Default for RobotMode {
    fn default() -> Self {
        RobotMode::Disabled
    }
}

impl FromStr for DsMessage {
    type Err = DsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pressure" => Ok(DsMessage::Pressure),
            "diagnostics" => Ok(DsMessage::Diagnostics),
            "fourbar" => Ok(DsMessage::Fourbar),
            other => Err(DsParseError::UnknownMessage(other.to_string())),
        }
    }
}

impl FromStr for RobotMode {
    type Err = DsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disabled" => Ok(RobotMode::Disabled),
            "auto" | "autonomous" => Ok(RobotMode::Autonomous),
            "teleop" => Ok(RobotMode::Teleop),
            _ => Err(DsParseError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for RobotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RobotMode::Disabled => "disabled",
            RobotMode::Autonomous => "autonomous",
            RobotMode::Teleop => "teleop",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_message() {
        assert_eq!("pressure".parse::<DsMessage>(), Ok(DsMessage::Pressure));
        assert_eq!("diagnostics".parse::<DsMessage>(), Ok(DsMessage::Diagnostics));
        assert_eq!("fourbar".parse::<DsMessage>(), Ok(DsMessage::Fourbar));

        // Only the exact text is recognised
        assert!(" fourbar ".parse::<DsMessage>().is_err());
        assert!("pressure\n".parse::<DsMessage>().is_err());
        assert_eq!(
            "Fourbar".parse::<DsMessage>(),
            Err(DsParseError::UnknownMessage("Fourbar".to_string()))
        );
        assert!("".parse::<DsMessage>().is_err());
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("Teleop".parse::<RobotMode>(), Ok(RobotMode::Teleop));
        assert_eq!("auto".parse::<RobotMode>(), Ok(RobotMode::Autonomous));
        assert!("test".parse::<RobotMode>().is_err());
    }
}
