use crate::utils::error::{EtlError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// A clock value as it arrives from the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    Full(NaiveDateTime),
    TimeOfDay(NaiveTime),
}

impl Timestamp {
    /// Bare times are pinned to 1970-01-01; callers only read the time of day.
    pub fn anchor(self) -> NaiveDateTime {
        match self {
            Timestamp::Full(dt) => dt,
            Timestamp::TimeOfDay(t) => NaiveDateTime::new(NaiveDate::default(), t),
        }
    }
}

/// Rounds to the nearest multiple of `interval_minutes` within the hour.
///
/// A remainder of exactly half the interval rounds up. Rounding up past
/// minute 59 carries into the hour (and the date past 23:59). Seconds and
/// sub-seconds are always dropped.
pub fn round_to_nearest(dt: NaiveDateTime, interval_minutes: u32) -> Result<NaiveDateTime> {
    if interval_minutes == 0 {
        return Err(EtlError::InvalidConfigValueError {
            field: "interval_minutes".to_string(),
            value: "0".to_string(),
            reason: "Rounding interval must be positive".to_string(),
        });
    }

    let minute = dt.minute();
    let remainder = minute % interval_minutes;
    let rounded_minutes = if remainder * 2 < interval_minutes {
        minute - remainder
    } else {
        minute + (interval_minutes - remainder)
    };

    let overflow = || EtlError::RoundingOverflow {
        value: dt.to_string(),
    };
    let hour_start = dt.date().and_hms_opt(dt.hour(), 0, 0).ok_or_else(overflow)?;
    hour_start
        .checked_add_signed(Duration::minutes(i64::from(rounded_minutes)))
        .ok_or_else(overflow)
}

/// Null in, null out.
pub fn round_timestamp(
    value: Option<Timestamp>,
    interval_minutes: u32,
) -> Result<Option<NaiveDateTime>> {
    value
        .map(|ts| round_to_nearest(ts.anchor(), interval_minutes))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn rounded_hm(h: u32, m: u32, interval: u32) -> (u32, u32) {
        let r = round_to_nearest(at(h, m), interval).unwrap();
        (r.hour(), r.minute())
    }

    #[test]
    fn test_rounds_down_below_half_interval() {
        assert_eq!(rounded_hm(10, 7, 15), (10, 0));
        assert_eq!(rounded_hm(10, 22, 15), (10, 15));
    }

    #[test]
    fn test_rounds_up_at_or_above_half_interval() {
        assert_eq!(rounded_hm(10, 8, 15), (10, 15));
        assert_eq!(rounded_hm(10, 45, 30), (11, 0));
    }

    #[test]
    fn test_odd_interval_uses_fractional_half() {
        // half of 7 is 3.5
        assert_eq!(rounded_hm(9, 3, 7), (9, 0));
        assert_eq!(rounded_hm(9, 4, 7), (9, 7));
    }

    #[test]
    fn test_carries_into_next_hour_and_day() {
        assert_eq!(rounded_hm(10, 53, 15), (11, 0));

        let rolled = round_to_nearest(at(23, 55), 15).unwrap();
        assert_eq!(rolled, NaiveDate::from_ymd_opt(2024, 5, 11).unwrap().and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn test_seconds_and_subseconds_are_dropped() {
        let dt = NaiveDate::from_ymd_opt(2024, 5, 10)
            .unwrap()
            .and_hms_milli_opt(8, 1, 59, 750)
            .unwrap();
        let rounded = round_to_nearest(dt, 15).unwrap();
        assert_eq!(rounded, at(8, 0));
        assert_eq!(rounded.second(), 0);
        assert_eq!(rounded.nanosecond(), 0);
    }

    #[test]
    fn test_rounding_is_idempotent_for_divisors_of_sixty() {
        for interval in [1, 2, 3, 4, 5, 6, 10, 12, 15, 20, 30, 60] {
            for minute in 0..60 {
                let once = round_to_nearest(at(13, minute), interval).unwrap();
                let twice = round_to_nearest(once, interval).unwrap();
                assert_eq!(once, twice, "interval {} minute {}", interval, minute);
                assert!(once.minute() < 60);
                assert_eq!(once.minute() % interval, 0);
            }
        }
    }

    #[test]
    fn test_never_produces_invalid_times() {
        for interval in 1..=90 {
            for minute in 0..60 {
                let rounded = round_to_nearest(at(23, minute), interval).unwrap();
                assert!(rounded.minute() < 60);
                assert!(rounded.hour() < 24);
                assert!(rounded >= at(23, 0));
            }
        }
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        assert!(round_to_nearest(at(8, 0), 0).is_err());
    }

    #[test]
    fn test_bare_time_is_anchored() {
        let round = |h, m, s| {
            let time = NaiveTime::from_hms_opt(h, m, s).unwrap();
            round_timestamp(Some(Timestamp::TimeOfDay(time)), 15)
                .unwrap()
                .unwrap()
        };

        // 52 % 15 = 7, below half the interval
        assert_eq!(round(6, 52, 10).time(), NaiveTime::from_hms_opt(6, 45, 0).unwrap());
        let up = round(6, 53, 10);
        assert_eq!(up.time(), NaiveTime::from_hms_opt(7, 0, 0).unwrap());
        assert_eq!(up.date(), NaiveDate::default());
    }

    #[test]
    fn test_null_passes_through() {
        assert_eq!(round_timestamp(None, 15).unwrap(), None);
    }
}
