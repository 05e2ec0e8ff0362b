use chrono::{DateTime, Utc};

/// Time source injected into every service. Each operation reads `now`
/// exactly once so its boundary comparisons cannot straddle an hour edge.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock; every read returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Floors a timestamp to the top of its hour. Slot granularity is whole
/// hours; reservation dates and future/past cutoffs all pass through here.
pub fn hour_floor(t: DateTime<Utc>) -> DateTime<Utc> {
    let secs = t.timestamp();
    let floored = secs - secs.rem_euclid(3600);
    // Flooring a representable timestamp keeps it representable.
    DateTime::<Utc>::from_timestamp(floored, 0).expect("floored timestamp in range")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn hour_floor_truncates_minutes_and_seconds() {
        let t = Utc.with_ymd_and_hms(2023, 4, 18, 9, 47, 31).unwrap();
        let floored = hour_floor(t);
        assert_eq!(floored, Utc.with_ymd_and_hms(2023, 4, 18, 9, 0, 0).unwrap());
    }

    #[test]
    fn hour_floor_is_identity_on_whole_hours() {
        let t = Utc.with_ymd_and_hms(2023, 4, 18, 9, 0, 0).unwrap();
        assert_eq!(hour_floor(t), t);
    }

    #[test]
    fn hour_floor_drops_subsecond_precision() {
        let t = Utc
            .with_ymd_and_hms(2023, 4, 18, 9, 0, 0)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(250))
            .unwrap();
        assert_eq!(
            hour_floor(t),
            Utc.with_ymd_and_hms(2023, 4, 18, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn fixed_clock_returns_configured_instant() {
        let t = Utc.with_ymd_and_hms(2023, 4, 18, 9, 30, 0).unwrap();
        let clock = FixedClock(t);
        assert_eq!(clock.now(), t);
        assert_eq!(clock.now(), t);
    }
}
