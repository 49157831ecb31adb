//! # Robot Executable Parameters
//!
//! This module provide parameters for the robot executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::ds::RobotMode;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotExecParams {
    /// Target period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Write every telemetry packet to the session archive.
    pub archive_tm: bool,

    /// Period between telemetry summaries in the log.
    ///
    /// Units: seconds
    pub tm_log_period_s: f64,

    /// Mode the robot starts in, unless overridden on the command line.
    pub starting_mode: RobotMode,

    /// Number of consecutive cycle overruns after which the executable stops.
    pub max_consec_cycle_overruns: u64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_params_file() {
        let params: RobotExecParams =
            util::params::parse(include_str!("../../params/robot_exec.toml")).unwrap();

        assert_eq!(params.cycle_period_s, 0.02);
        assert_eq!(params.starting_mode, RobotMode::Disabled);
    }
}
