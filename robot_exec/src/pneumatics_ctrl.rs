//! # Pneumatics control
//!
//! Turns the operator's pneumatics buttons into at most one request per cycle and applies it to
//! the pneumatics system.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::pneumatics::{GearState, PneumaticsRequest, SolenoidId};
use log::{info, warn};

use crate::{
    hal::{HalError, Pneumatics},
    operator_if::PneumaticsInputs,
};

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Select the request for this cycle. The first pressed button in the order below wins.
pub fn select_request(inputs: &PneumaticsInputs) -> PneumaticsRequest {
    let order = [
        (inputs.compressor_stop, PneumaticsRequest::CompressorStop),
        (inputs.compressor_start, PneumaticsRequest::CompressorStart),
        (inputs.shift_high, PneumaticsRequest::ShiftHigh),
        (inputs.shift_low, PneumaticsRequest::ShiftLow),
        (inputs.claw_open, PneumaticsRequest::ClawOpen),
        (inputs.claw_close, PneumaticsRequest::ClawClose),
        (inputs.eject, PneumaticsRequest::Eject),
        (inputs.retract, PneumaticsRequest::Retract),
    ];

    order
        .iter()
        .find(|(pressed, _)| *pressed)
        .map(|(_, req)| *req)
        .unwrap_or(PneumaticsRequest::None)
}

/// Apply a request to the pneumatics system.
pub fn apply_request(
    pneumatics: &mut dyn Pneumatics,
    request: PneumaticsRequest,
) -> Result<(), HalError> {
    if let Some(enabled) = request.compressor_demand() {
        if pneumatics.compressor_enabled()? != enabled {
            info!("Compressor {}", if enabled { "started" } else { "stopped" });
        }
        pneumatics.set_compressor(enabled)?;
    }

    if let Some((id, value)) = request.solenoid_demand() {
        pneumatics.set_solenoid(id, value)?;
    }

    Ok(())
}

/// Current gear as given by the shifter solenoid, `Unknown` if it cannot be read.
pub fn gear_state(pneumatics: &dyn Pneumatics) -> GearState {
    match pneumatics.solenoid(SolenoidId::Shifter) {
        Ok(v) => GearState::from(v),
        Err(e) => {
            warn!("Could not read the shifter position: {}", e);
            GearState::Unknown
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::hal::sim::SimRobot;
    use comms_if::eqpt::pneumatics::SolenoidValue;

    #[test]
    fn test_select_request() {
        let mut inputs = PneumaticsInputs::default();
        assert_eq!(select_request(&inputs), PneumaticsRequest::None);

        inputs.retract = true;
        assert_eq!(select_request(&inputs), PneumaticsRequest::Retract);

        inputs.claw_close = true;
        assert_eq!(select_request(&inputs), PneumaticsRequest::ClawClose);

        inputs.shift_low = true;
        inputs.shift_high = true;
        assert_eq!(select_request(&inputs), PneumaticsRequest::ShiftHigh);

        inputs.compressor_start = true;
        inputs.compressor_stop = true;
        assert_eq!(select_request(&inputs), PneumaticsRequest::CompressorStop);
    }

    #[test]
    fn test_apply_request() {
        let sim = SimRobot::new();
        let mut hw = sim.hardware();

        assert_eq!(gear_state(hw.pneumatics.as_ref()), GearState::Unknown);

        apply_request(hw.pneumatics.as_mut(), PneumaticsRequest::ShiftLow).unwrap();
        assert_eq!(gear_state(hw.pneumatics.as_ref()), GearState::Low);

        apply_request(hw.pneumatics.as_mut(), PneumaticsRequest::CompressorStart).unwrap();
        assert!(hw.pneumatics.compressor_enabled().unwrap());

        apply_request(hw.pneumatics.as_mut(), PneumaticsRequest::Eject).unwrap();
        assert_eq!(
            hw.pneumatics.solenoid(SolenoidId::Ejector).unwrap(),
            SolenoidValue::Forward
        );

        apply_request(hw.pneumatics.as_mut(), PneumaticsRequest::None).unwrap();
        assert!(hw.pneumatics.compressor_enabled().unwrap());
    }
}
