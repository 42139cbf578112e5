use chrono::NaiveTime;

/// Payable hours for one time log.
///
/// Both wall-clock times must be present; a lone clock event contributes
/// nothing to aggregation. A negative span means the shift ran past midnight
/// and wraps by 24h — one overnight shift, never a multi-day span. The lunch
/// deduction comes off before the double-day factor, and the result never
/// goes negative.
pub fn payable_hours(
    time_in: Option<NaiveTime>,
    time_out: Option<NaiveTime>,
    deduction_hours: f64,
    is_double_day: bool,
) -> f64 {
    let (Some(time_in), Some(time_out)) = (time_in, time_out) else {
        return 0.0;
    };

    let mut span = (time_out - time_in).num_seconds() as f64 / 3600.0;
    if span < 0.0 {
        span += 24.0;
    }

    let worked = (span - deduction_hours).max(0.0);

    // Double-day doubles payable hours outright; it is independent of the
    // overtime multiplier and the two must never be conflated.
    if is_double_day { worked * 2.0 } else { worked }
}

/// Two-decimal rounding, applied only at the persistence boundary. In-memory
/// aggregation keeps full precision so rounding error does not compound
/// across many logs.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn t(h: u32, m: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, m, 0)
    }

    #[test]
    fn plain_day_shift() {
        assert_eq!(payable_hours(t(8, 0), t(17, 0), 0.0, false), 9.0);
    }

    #[test]
    fn missing_either_time_yields_zero() {
        assert_eq!(payable_hours(None, t(17, 0), 0.0, false), 0.0);
        assert_eq!(payable_hours(t(8, 0), None, 0.0, false), 0.0);
        assert_eq!(payable_hours(None, None, 0.0, true), 0.0);
    }

    #[test]
    fn overnight_shift_wraps_24h() {
        // 22:00 -> 06:00 is a single 8h overnight shift
        assert_eq!(payable_hours(t(22, 0), t(6, 0), 0.0, false), 8.0);
    }

    #[test]
    fn deduction_is_subtracted_before_doubling() {
        assert_eq!(payable_hours(t(8, 0), t(17, 0), 1.0, false), 8.0);
        assert_eq!(payable_hours(t(8, 0), t(17, 0), 1.0, true), 16.0);
    }

    #[test]
    fn deduction_larger_than_span_floors_at_zero() {
        assert_eq!(payable_hours(t(9, 0), t(11, 0), 5.0, false), 0.0);
        assert_eq!(payable_hours(t(9, 0), t(11, 0), 5.0, true), 0.0);
    }

    #[test]
    fn double_day_doubles_exactly() {
        assert_eq!(payable_hours(t(7, 30), t(12, 0), 0.0, true), 9.0);
    }

    #[test]
    fn zero_span_is_zero_not_a_full_day() {
        assert_eq!(payable_hours(t(8, 0), t(8, 0), 0.0, false), 0.0);
    }

    #[test]
    fn fractional_minutes_survive_until_rounding() {
        let hours = payable_hours(t(8, 10), t(16, 30), 0.0, false);
        assert!((hours - 8.333333333333334).abs() < 1e-9);
        assert_eq!(round2(hours), 8.33);
    }
}
