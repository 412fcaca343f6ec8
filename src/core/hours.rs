use crate::domain::model::DecimalPolicy;
use crate::utils::validation::MAX_DECIMAL_PLACES;
use chrono::{NaiveTime, Timelike};

/// Hours worked between two rounded clock times.
///
/// - no clock-out: 0 hours
/// - clock-out without clock-in: `None`
/// - clock-out hour strictly below clock-in hour: the shift crossed midnight
///
/// Only hour and minute are read. The midnight test compares hours alone, so
/// 08:45 → 08:15 yields -0.5 rather than a rollover; payroll totals depend
/// on this rule.
pub fn worked_hours(
    clock_in: Option<NaiveTime>,
    clock_out: Option<NaiveTime>,
    policy: DecimalPolicy,
) -> Option<f64> {
    let Some(clock_out) = clock_out else {
        return Some(0.0);
    };
    let clock_in = clock_in?;

    let in_hour = i64::from(clock_in.hour());
    let out_hour = i64::from(clock_out.hour());
    let hour_span = if crosses_midnight(clock_in, clock_out) {
        out_hour + 24 - in_hour
    } else {
        out_hour - in_hour
    };
    let minute_span = i64::from(clock_out.minute()) - i64::from(clock_in.minute());

    let hours = hour_span as f64 + minute_span as f64 / 60.0;
    Some(apply_decimal_policy(hours, policy))
}

pub fn crosses_midnight(clock_in: NaiveTime, clock_out: NaiveTime) -> bool {
    clock_out.hour() < clock_in.hour()
}

/// Half-away-from-zero at exact midpoints (8.25 → 8.3 at one place).
///
/// More places than an `f64` can hold leave the value unchanged.
pub fn apply_decimal_policy(hours: f64, policy: DecimalPolicy) -> f64 {
    match policy {
        DecimalPolicy::All => hours,
        DecimalPolicy::Places(places) if places > MAX_DECIMAL_PLACES => hours,
        DecimalPolicy::Places(places) => {
            let factor = 10f64.powi(places as i32);
            (hours * factor).round() / factor
        }
    }
}
