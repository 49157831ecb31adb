//! Implementations for the DriveCtrl state structure

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::pneumatics::GearState;
use log::{info, trace};
use serde::Serialize;

use super::{DriveCtrlError, Params};
use util::{maths::clamp_norm, module::State};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Drive control module state
#[derive(Debug, Default)]
pub struct DriveCtrl {
    pub(crate) params: Params,
}

/// Input data to DriveCtrl.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputData {
    /// Raw forward stick axis, negative when pushed forward.
    pub forward_axis: f64,

    pub rotation_axis: f64,

    pub gear: GearState,
}

/// Arcade drive command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OutputData {
    pub forward: f64,
    pub rotation: f64,
}

/// Status report for DriveCtrl processing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusReport {
    /// The command had to be clamped to [-1, 1].
    pub saturated: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl State for DriveCtrl {
    type InitData = Params;
    type InitError = DriveCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = DriveCtrlError;

    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        init_data.validate()?;
        info!("DriveCtrl initialised: {:?}", init_data);
        self.params = init_data;

        Ok(())
    }

    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let forward = -input_data.forward_axis * self.params.divisor(input_data.gear);
        let rotation = input_data.rotation_axis * self.params.rotation_gain;

        let output = OutputData {
            forward: clamp_norm(forward),
            rotation: clamp_norm(rotation),
        };
        let report = StatusReport {
            saturated: output.forward != forward || output.rotation != rotation,
        };

        trace!("DriveCtrl output: {:?}", output);

        Ok((output, report))
    }
}

impl DriveCtrl {
    /// Compute the arcade drive command for one cycle.
    pub fn compute_drive_command(
        &mut self,
        forward_axis: f64,
        rotation_axis: f64,
        gear: GearState,
    ) -> Result<(OutputData, StatusReport), DriveCtrlError> {
        self.proc(&InputData {
            forward_axis,
            rotation_axis,
            gear,
        })
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn ctrl() -> DriveCtrl {
        let mut ctrl = DriveCtrl::default();
        ctrl.init(Params::default()).unwrap();
        ctrl
    }

    #[test]
    fn test_gear_scaling() {
        let mut ctrl = ctrl();

        let (out, report) = ctrl
            .compute_drive_command(-1.0, 0.0, GearState::Low)
            .unwrap();
        assert!((out.forward - 0.85).abs() < 1e-9);
        assert!(!report.saturated);

        let (out, _) = ctrl
            .compute_drive_command(-1.0, 0.0, GearState::High)
            .unwrap();
        assert_eq!(out.forward, 1.0);

        let (out, _) = ctrl
            .compute_drive_command(0.5, 1.0, GearState::Unknown)
            .unwrap();
        assert_eq!(out.forward, -0.5);
        assert_eq!(out.rotation, 0.75);
    }

    #[test]
    fn test_low_never_exceeds_high() {
        let mut ctrl = ctrl();

        for i in -10..=10 {
            let axis = f64::from(i) / 10.0;
            let (low, _) = ctrl.compute_drive_command(axis, 0.0, GearState::Low).unwrap();
            let (high, _) = ctrl.compute_drive_command(axis, 0.0, GearState::High).unwrap();
            assert!(low.forward.abs() <= high.forward.abs());
        }
    }

    #[test]
    fn test_clamped() {
        let mut ctrl = ctrl();

        let (out, report) = ctrl
            .compute_drive_command(-3.0, std::f64::NAN, GearState::High)
            .unwrap();
        assert_eq!(out.forward, 1.0);
        assert_eq!(out.rotation, 0.0);
        assert!(report.saturated);
    }
}
