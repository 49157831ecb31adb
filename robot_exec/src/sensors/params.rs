//! Parameters structure for the sensor snapshot

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Sensor wiring parameters.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Params {
    /// Set if the max hall sensor reads `false` at the top of the lift travel.
    ///
    /// The snapshot's `max_limit_reached` is normalised with this so that it is always `true` at
    /// the top.
    #[serde(default)]
    pub max_hall_active_low: bool,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_params_file() {
        let params: Params =
            util::params::parse(include_str!("../../../params/sensors.toml")).unwrap();

        assert_eq!(params, Params::default());

        let params: Params = util::params::parse("").unwrap();
        assert!(!params.max_hall_active_low);
    }
}
