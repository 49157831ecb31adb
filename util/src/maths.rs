//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp a value into the closed range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T 
where
    T: Float
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

/// Clamp a value into the normalised demand range `[-1, 1]`.
///
/// NaN is mapped to zero so a bad input can never become a demand.
pub fn clamp_norm<T>(value: T) -> T
where
    T: Float
{
    if value.is_nan() {
        return T::zero()
    }

    clamp(value, -T::one(), T::one())
}

/// Returns true if the value lies within the closed band `[low, high]`.
pub fn in_band<T>(value: T, low: T, high: T) -> bool
where
    T: Float
{
    low <= value && value <= high
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp_norm(1.3f64), 1.0);
        assert_eq!(clamp_norm(-7f64), -1.0);
        assert_eq!(clamp_norm(0.25f64), 0.25);
        assert_eq!(clamp_norm(f64::NAN), 0.0);
        assert_eq!(clamp(5f64, 0f64, 2f64), 2.0);
    }

    #[test]
    fn test_in_band() {
        assert!(in_band(0.144f64, 0.142, 0.146));
        assert!(in_band(0.142f64, 0.142, 0.146));
        assert!(in_band(1.56f64, 0.70, 1.56));
        assert_eq!(in_band(0.147f64, 0.142, 0.146), false);
        assert_eq!(in_band(0.69f64, 0.70, 1.56), false);
    }
}
