//! Setpoint advice from the outside temperature.

/// Outside temperature (°C) from which the setpoint is managed.
pub const HOT_DAY_THRESHOLD_C: f64 = 30.0;

/// Largest accepted gap between outside temperature and setpoint.
pub const MAX_INDOOR_GAP_C: f64 = 10.0;

/// New setpoint for the unit, or `None` to leave it alone.
///
/// On hot days the setpoint is raised to `outside - 10 °C` when it sits
/// below that. It is never lowered.
pub fn advise(outside: f64, setpoint: f64) -> Option<f64> {
    if outside < HOT_DAY_THRESHOLD_C {
        return None;
    }

    let max_acceptable = outside - MAX_INDOOR_GAP_C;
    (setpoint < max_acceptable).then_some(max_acceptable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raises_on_hot_day() {
        assert_eq!(advise(32.0, 18.0), Some(22.0));
        assert_eq!(advise(30.0, 19.9), Some(20.0));
    }

    #[test]
    fn test_keeps_setpoint_at_or_above_limit() {
        assert_eq!(advise(32.0, 23.0), None);
        assert_eq!(advise(32.0, 22.0), None);
    }

    #[test]
    fn test_ignores_mild_weather() {
        assert_eq!(advise(29.9, 5.0), None);
        for outside in [-10.0, 0.0, 15.5, 29.99] {
            for setpoint in [0.0, 16.0, 25.0, 40.0] {
                assert_eq!(advise(outside, setpoint), None);
            }
        }
    }

    #[test]
    fn test_never_lowers() {
        for outside in [30.0, 35.0, 42.0] {
            if let Some(target) = advise(outside, 16.0) {
                assert!(target > 16.0);
            }
            assert_eq!(advise(outside, 40.0), None);
        }
    }
}
