use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MS_PER_MINUTE: i64 = 60 * 1000;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Elapsed {
    pub days: u64,
    pub hours: u32,
    pub minutes: u32,
}

impl Elapsed {
    pub fn as_millis(&self) -> i64 {
        self.days as i64 * MS_PER_DAY
            + i64::from(self.hours) * MS_PER_HOUR
            + i64::from(self.minutes) * MS_PER_MINUTE
    }
}

/// Splits the time between `target` and `now` into days, hours within the day
/// and minutes within the hour. A target in the future yields all zeros.
pub fn elapsed_since(target: DateTime<Utc>, now: DateTime<Utc>) -> Elapsed {
    let diff = (now.timestamp_millis() - target.timestamp_millis()).max(0);

    let days = diff.div_euclid(MS_PER_DAY);
    let hours = diff.rem_euclid(MS_PER_DAY).div_euclid(MS_PER_HOUR);
    let minutes = diff.rem_euclid(MS_PER_HOUR).div_euclid(MS_PER_MINUTE);

    Elapsed {
        days: days as u64,
        hours: hours as u32,
        minutes: minutes as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn one_day_one_hour_thirty_minutes() {
        let elapsed = elapsed_since(at(2024, 1, 1, 0, 0, 0), at(2024, 1, 2, 1, 30, 0));
        assert_eq!(
            elapsed,
            Elapsed {
                days: 1,
                hours: 1,
                minutes: 30
            }
        );
    }

    #[test]
    fn partial_minutes_are_truncated() {
        let target = at(2024, 3, 10, 8, 0, 0);
        let now = target + Duration::hours(23) + Duration::minutes(59) + Duration::seconds(59);
        let elapsed = elapsed_since(target, now);
        assert_eq!(elapsed.days, 0);
        assert_eq!(elapsed.hours, 23);
        assert_eq!(elapsed.minutes, 59);
    }

    #[test]
    fn future_or_equal_target_is_zero() {
        let now = at(2024, 5, 1, 12, 0, 0);
        assert_eq!(elapsed_since(now, now), Elapsed::default());
        assert_eq!(
            elapsed_since(now + Duration::days(3), now),
            Elapsed::default()
        );
    }

    #[test]
    fn components_stay_in_range_and_never_overshoot() {
        let target = at(2020, 2, 28, 23, 17, 41);
        for step in [0i64, 59_999, 60_000, 3_599_999, 86_399_999, 86_400_000, 9_876_543_210] {
            let now = target + Duration::milliseconds(step);
            let elapsed = elapsed_since(target, now);
            assert!(elapsed.hours < 24);
            assert!(elapsed.minutes < 60);
            assert!(elapsed.as_millis() <= step);
            assert!(step - elapsed.as_millis() < MS_PER_MINUTE);
        }
    }
}
