//! # Data Store

use comms_if::{
    ds::{DsMessage, RobotMode},
    eqpt::{
        act::ActuatorCommand,
        pneumatics::{GearState, PneumaticsRequest},
    },
};

use crate::{
    diag::DiagnosticsReport,
    drive_ctrl, lift_arm_ctrl,
    operator_if::OperatorInputs,
    sensors::{self, SensorSnapshot},
};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Everything the robot knows about the current cycle.
#[derive(Debug, Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u64,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time
    pub sim_time_s: f64,

    pub mode: RobotMode,

    // Inputs
    pub sensors: SensorSnapshot,
    pub sensors_status_rpt: sensors::StatusReport,
    pub operator_inputs: OperatorInputs,
    pub gear: GearState,
    pub diag_message: Option<DsMessage>,

    // LiftArmCtrl
    pub lift_arm_ctrl_output: lift_arm_ctrl::OutputData,
    pub lift_arm_ctrl_status_rpt: lift_arm_ctrl::StatusReport,

    // DriveCtrl
    pub drive_ctrl_output: drive_ctrl::OutputData,
    pub drive_ctrl_status_rpt: drive_ctrl::StatusReport,

    // Outputs
    pub command: ActuatorCommand,
    pub pneumatics_request: PneumaticsRequest,
    pub compressor_enabled: Option<bool>,
    pub diagnostics: Option<DiagnosticsReport>,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of consecutive cycles in which an actuator output could not be written
    pub num_consec_output_errors: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        let cycles_per_s = (cycle_frequency_hz.round() as u64).max(1);
        self.is_1_hz_cycle = self.num_cycles % cycles_per_s == 0;

        self.diag_message = None;
        self.lift_arm_ctrl_output = lift_arm_ctrl::OutputData::default();
        self.lift_arm_ctrl_status_rpt = lift_arm_ctrl::StatusReport::default();
        self.drive_ctrl_output = drive_ctrl::OutputData::default();
        self.drive_ctrl_status_rpt = drive_ctrl::StatusReport::default();
        self.command = ActuatorCommand::default();
        self.pneumatics_request = PneumaticsRequest::None;
        self.diagnostics = None;

        self.sim_time_s = util::session::get_elapsed_seconds();
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }
}
