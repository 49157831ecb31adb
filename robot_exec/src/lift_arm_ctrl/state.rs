//! Implementations for the LiftArmCtrl state structure

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use serde::Serialize;

// Internal
use super::{seek_preset, LiftArmCtrlError, Params};
use crate::{
    operator_if::{ArmInputs, LiftInputs, OperatorInputs},
    sensors::SensorSnapshot,
    toggle::{ToggleId, ToggleTracker},
};
use util::{maths::clamp_norm, module::State};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Lift and arm control module state
#[derive(Debug, Default)]
pub struct LiftArmCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,
}

/// Input data to LiftArmCtrl.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    pub sensors: SensorSnapshot,

    /// Indexes of the lift presets whose toggles are on, in ascending order.
    pub lift_presets_on: Vec<usize>,

    pub lift: LiftInputs,
    pub arm: ArmInputs,

    /// True while the `fourbar` diagnostic is running.
    pub fourbar: bool,
}

/// Output of LiftArmCtrl.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutputData {
    pub lift_power: f64,
    pub arm_power: f64,

    /// The behaviour which produced the lift power.
    pub lift_mode: LiftMode,

    /// The lift counter must be re-zeroed.
    pub rehome_lift: bool,

    /// The arm counter must be re-zeroed.
    pub rehome_arm: bool,

    /// Lift presets whose toggles must be cleared.
    pub clear_presets: Vec<usize>,
}

/// Status report for LiftArmCtrl processing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusReport {
    /// More than one lift preset was on.
    pub invalid_preset_selection: bool,

    /// The max hall sensor limited the lift power or aborted a preset.
    pub max_limit_interlock: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Behaviour driving the lift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LiftMode {
    Manual,

    /// Moving towards the band of the given preset.
    PresetSeek(usize),

    /// Holding at the band of the given preset.
    PresetReached(usize),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for LiftMode {
    fn default() -> Self {
        LiftMode::Manual
    }
}

impl State for LiftArmCtrl {
    type InitData = Params;
    type InitError = LiftArmCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = LiftArmCtrlError;

    /// Initialise the LiftArmCtrl module.
    ///
    /// Expected init data is the already loaded parameters.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        init_data.validate()?;

        info!(
            "LiftArmCtrl initialised with {} lift presets",
            init_data.presets.len()
        );
        self.params = init_data;
        self.report = StatusReport::default();

        Ok(())
    }

    /// Perform cyclic processing of LiftArmCtrl.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        let mut output = OutputData {
            rehome_lift: !input_data.sensors.min_limit_reached,
            rehome_arm: !input_data.sensors.arm_limit_reached,
            ..Default::default()
        };

        // Select the active preset, if any
        let active = self.select_preset(&input_data.lift_presets_on, &mut output.clear_presets)?;

        // Lift power from either the active preset or the manual inputs
        let mut lift_power = match active {
            Some(i) => {
                let seek = seek_preset(input_data.sensors.lift_position, &self.params.presets[i]);
                if seek.is_reached() {
                    debug!("Lift preset {} reached", self.params.presets[i].name);
                    output.clear_presets.push(i);
                    output.lift_mode = LiftMode::PresetReached(i);
                } else {
                    output.lift_mode = LiftMode::PresetSeek(i);
                }
                seek.power()
            }
            None => self.manual_lift_power(&input_data.lift),
        };

        // Max limit interlock
        if input_data.sensors.max_limit_reached {
            if lift_power > self.params.lift_hold_power {
                lift_power = self.params.lift_hold_power;
                self.report.max_limit_interlock = true;
            }

            if let Some(i) = active {
                if !output.clear_presets.contains(&i) {
                    warn!(
                        "Lift max limit reached, aborting preset {}",
                        self.params.presets[i].name
                    );
                    output.clear_presets.push(i);
                }
                self.report.max_limit_interlock = true;
            }
        }

        let arm_power = if input_data.fourbar {
            if input_data.sensors.arm_limit_reached {
                self.params.fourbar_power
            } else {
                0.0
            }
        } else {
            self.manual_arm_power(&input_data.arm)
        };

        output.lift_power = clamp_norm(lift_power);
        output.arm_power = clamp_norm(arm_power);

        Ok((output, self.report))
    }
}

impl LiftArmCtrl {
    /// Run one cycle of arbitration directly against the toggle tracker.
    ///
    /// Any presets which have been reached or aborted are cleared in `toggles`. The counter
    /// re-homing requests are returned in the output for the caller to act on.
    pub fn compute_lift_and_arm_command(
        &mut self,
        sensors: &SensorSnapshot,
        toggles: &mut ToggleTracker,
        inputs: &OperatorInputs,
        fourbar: bool,
    ) -> Result<(OutputData, StatusReport), LiftArmCtrlError> {
        let input_data = InputData {
            sensors: *sensors,
            lift_presets_on: toggles.lift_presets_on(),
            lift: inputs.lift,
            arm: inputs.arm,
            fourbar,
        };

        let (output, report) = self.proc(&input_data)?;

        for i in output.clear_presets.iter() {
            toggles.reset(ToggleId::LiftPreset(*i));
        }

        Ok((output, report))
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Pick the preset which drives the lift.
    ///
    /// If more than one is on the lowest index wins and the others are marked for clearing.
    fn select_preset(
        &mut self,
        presets_on: &[usize],
        clear: &mut Vec<usize>,
    ) -> Result<Option<usize>, LiftArmCtrlError> {
        let num_presets = self.params.presets.len();
        if let Some(&i) = presets_on.iter().find(|&&i| i >= num_presets) {
            return Err(LiftArmCtrlError::UnknownPreset(i, num_presets));
        }

        let mut sorted = presets_on.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        if sorted.len() > 1 {
            warn!(
                "{}, keeping {}",
                LiftArmCtrlError::InvalidPresetSelection(sorted.clone()),
                self.params.presets[sorted[0]].name
            );
            self.report.invalid_preset_selection = true;
            clear.extend_from_slice(&sorted[1..]);
        }

        Ok(sorted.first().copied())
    }

    fn manual_lift_power(&self, lift: &LiftInputs) -> f64 {
        if lift.hold {
            self.params.lift_hold_power
        } else if lift.up_axis != 0.0 {
            lift.up_axis * self.params.lift_up_gain
        } else if lift.down_axis != 0.0 {
            -lift.down_axis * self.params.lift_down_gain
        } else {
            0.0
        }
    }

    fn manual_arm_power(&self, arm: &ArmInputs) -> f64 {
        if arm.hold {
            self.params.arm_hold_power
        } else {
            -arm.axis * self.params.arm_gain
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const P1: ToggleId = ToggleId::LiftPreset(0);
    const P2: ToggleId = ToggleId::LiftPreset(1);

    fn ctrl() -> LiftArmCtrl {
        let mut ctrl = LiftArmCtrl::default();
        ctrl.init(Params::default()).unwrap();
        ctrl
    }

    /// Sensors with both mechanisms away from home.
    fn sensors(lift_position: i64) -> SensorSnapshot {
        SensorSnapshot {
            min_limit_reached: true,
            arm_limit_reached: true,
            lift_position,
            ..Default::default()
        }
    }

    fn toggles_with(on: &[ToggleId]) -> ToggleTracker {
        let mut toggles = ToggleTracker::new(vec![P1, P2]);
        for id in on {
            toggles.update(*id, true);
        }
        toggles
    }

    #[test]
    fn test_manual_up_while_homed() {
        let mut ctrl = ctrl();
        let mut toggles = toggles_with(&[]);
        let mut inputs = OperatorInputs::default();
        inputs.lift.up_axis = 0.5;

        let snapshot = SensorSnapshot {
            min_limit_reached: false,
            arm_limit_reached: true,
            ..Default::default()
        };

        let (out, _) = ctrl
            .compute_lift_and_arm_command(&snapshot, &mut toggles, &inputs, false)
            .unwrap();

        assert!((out.lift_power - 0.325).abs() < 1e-9);
        assert_eq!(out.lift_mode, LiftMode::Manual);
        assert!(out.rehome_lift);
        assert!(!out.rehome_arm);
    }

    #[test]
    fn test_manual_priority() {
        let mut ctrl = ctrl();
        let mut input = InputData {
            sensors: sensors(50),
            ..Default::default()
        };

        assert_eq!(ctrl.proc(&input).unwrap().0.lift_power, 0.0);

        input.lift.down_axis = 0.4;
        assert!((ctrl.proc(&input).unwrap().0.lift_power + 0.1).abs() < 1e-9);

        input.lift.up_axis = 0.2;
        assert!((ctrl.proc(&input).unwrap().0.lift_power - 0.13).abs() < 1e-9);

        input.lift.hold = true;
        assert_eq!(ctrl.proc(&input).unwrap().0.lift_power, 0.05);
    }

    #[test]
    fn test_preset_seek() {
        let mut ctrl = ctrl();
        let mut toggles = toggles_with(&[P1]);
        let mut inputs = OperatorInputs::default();

        // Manual input is ignored while seeking
        inputs.lift.up_axis = 1.0;

        let (out, _) = ctrl
            .compute_lift_and_arm_command(&sensors(100), &mut toggles, &inputs, false)
            .unwrap();
        assert_eq!(out.lift_power, 0.3);
        assert_eq!(out.lift_mode, LiftMode::PresetSeek(0));
        assert!(toggles.is_on(P1));

        let (out, _) = ctrl
            .compute_lift_and_arm_command(&sensors(130), &mut toggles, &inputs, false)
            .unwrap();
        assert_eq!(out.lift_power, 0.05);
        assert_eq!(out.lift_mode, LiftMode::PresetReached(0));
        assert!(!toggles.is_on(P1));

        // Back to manual
        let (out, _) = ctrl
            .compute_lift_and_arm_command(&sensors(130), &mut toggles, &inputs, false)
            .unwrap();
        assert_eq!(out.lift_mode, LiftMode::Manual);
        assert_eq!(out.lift_power, 0.65);
    }

    #[test]
    fn test_invalid_preset_selection() {
        let mut ctrl = ctrl();
        let mut toggles = toggles_with(&[P2, P1]);

        let (out, report) = ctrl
            .compute_lift_and_arm_command(
                &sensors(200),
                &mut toggles,
                &OperatorInputs::default(),
                false,
            )
            .unwrap();

        // Preset 1 wins and is already above its band, so both are cleared
        assert!(report.invalid_preset_selection);
        assert_eq!(out.lift_mode, LiftMode::PresetReached(0));
        assert_eq!(out.lift_power, 0.05);
        assert!(toggles.lift_presets_on().is_empty());

        // Below the first band the winner carries on seeking
        let mut toggles = toggles_with(&[P1, P2]);
        let (out, _) = ctrl
            .compute_lift_and_arm_command(
                &sensors(10),
                &mut toggles,
                &OperatorInputs::default(),
                false,
            )
            .unwrap();
        assert_eq!(out.lift_power, 0.3);
        assert_eq!(toggles.lift_presets_on(), vec![0]);
    }

    #[test]
    fn test_unknown_preset() {
        let mut ctrl = ctrl();
        let input = InputData {
            sensors: sensors(0),
            lift_presets_on: vec![5],
            ..Default::default()
        };

        assert!(matches!(
            ctrl.proc(&input),
            Err(LiftArmCtrlError::UnknownPreset(5, 2))
        ));
    }

    #[test]
    fn test_failed_min_hall_mid_seek() {
        let mut ctrl = ctrl();
        let mut toggles = toggles_with(&[P2]);

        // A failed min hall read arrives as not triggered at height
        let mut snapshot = sensors(300);
        snapshot.min_limit_reached = false;

        let (out, report) = ctrl
            .compute_lift_and_arm_command(
                &snapshot,
                &mut toggles,
                &OperatorInputs::default(),
                false,
            )
            .unwrap();
        assert!(out.rehome_lift);
        assert_eq!(out.lift_power, 0.5);
        assert_eq!(out.lift_mode, LiftMode::PresetSeek(1));
        assert!(!report.max_limit_interlock);
        assert!(toggles.is_on(P2));

        // With the counter zeroed the preset keeps seeking a full band from zero
        snapshot.lift_position = 0;
        let (out, _) = ctrl
            .compute_lift_and_arm_command(
                &snapshot,
                &mut toggles,
                &OperatorInputs::default(),
                false,
            )
            .unwrap();
        assert_eq!(out.lift_power, 0.5);
        assert!(toggles.is_on(P2));

        // Until the max limit interlock stops it
        snapshot.max_limit_reached = true;
        let (out, report) = ctrl
            .compute_lift_and_arm_command(
                &snapshot,
                &mut toggles,
                &OperatorInputs::default(),
                false,
            )
            .unwrap();
        assert_eq!(out.lift_power, 0.05);
        assert!(report.max_limit_interlock);
        assert!(!toggles.is_on(P2));
    }

    #[test]
    fn test_max_limit_interlock() {
        let mut ctrl = ctrl();
        let mut snapshot = sensors(440);
        snapshot.max_limit_reached = true;

        let mut inputs = OperatorInputs::default();
        inputs.lift.up_axis = 1.0;
        let mut toggles = toggles_with(&[]);

        let (out, report) = ctrl
            .compute_lift_and_arm_command(&snapshot, &mut toggles, &inputs, false)
            .unwrap();
        assert_eq!(out.lift_power, 0.05);
        assert!(report.max_limit_interlock);

        // Down is still allowed
        inputs.lift.up_axis = 0.0;
        inputs.lift.down_axis = 1.0;
        let (out, report) = ctrl
            .compute_lift_and_arm_command(&snapshot, &mut toggles, &inputs, false)
            .unwrap();
        assert_eq!(out.lift_power, -0.25);
        assert!(!report.max_limit_interlock);

        // Active presets are aborted
        let mut params = Params::default();
        params.presets[1].band = 1000;
        ctrl.init(params).unwrap();
        let mut toggles = toggles_with(&[P2]);
        let (out, report) = ctrl
            .compute_lift_and_arm_command(
                &snapshot,
                &mut toggles,
                &OperatorInputs::default(),
                false,
            )
            .unwrap();
        assert_eq!(out.lift_power, 0.05);
        assert_eq!(out.clear_presets, vec![1]);
        assert!(report.max_limit_interlock);
        assert!(!toggles.is_on(P2));
    }

    #[test]
    fn test_arm() {
        let mut ctrl = ctrl();
        let mut input = InputData {
            sensors: sensors(0),
            lift_presets_on: vec![0],
            ..Default::default()
        };

        input.arm.axis = 0.9;
        assert!((ctrl.proc(&input).unwrap().0.arm_power + 0.225).abs() < 1e-9);

        input.arm.hold = true;
        assert_eq!(ctrl.proc(&input).unwrap().0.arm_power, 0.10);

        // Fourbar overrides the operator
        input.fourbar = true;
        assert_eq!(ctrl.proc(&input).unwrap().0.arm_power, 0.25);
        input.sensors.arm_limit_reached = false;
        let (out, _) = ctrl.proc(&input).unwrap();
        assert_eq!(out.arm_power, 0.0);
        assert!(out.rehome_arm);
    }
}
