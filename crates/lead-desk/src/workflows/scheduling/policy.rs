use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

/// Tunable scheduling constants. Workday hours are UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulingPolicy {
    pub buffer_before_minutes: u32,
    pub buffer_after_minutes: u32,
    pub horizon_days: u32,
    pub workday_start_hour: u32,
    pub workday_end_hour: u32,
    pub slot_step_minutes: u32,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            buffer_before_minutes: 15,
            buffer_after_minutes: 15,
            horizon_days: 14,
            workday_start_hour: 8,
            workday_end_hour: 17,
            slot_step_minutes: 15,
        }
    }
}

impl SchedulingPolicy {
    pub fn buffer_before(&self) -> Duration {
        minutes(self.buffer_before_minutes)
    }

    pub fn buffer_after(&self) -> Duration {
        minutes(self.buffer_after_minutes)
    }

    pub fn horizon(&self) -> Duration {
        Duration::days(i64::from(self.horizon_days))
    }

    /// Bookable window for a calendar day, or `None` when the configured hours do not form
    /// a valid time.
    pub fn workday_window(&self, day: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = day.and_hms_opt(self.workday_start_hour, 0, 0)?;
        let end = if self.workday_end_hour >= 24 {
            day.succ_opt()?.and_hms_opt(0, 0, 0)?
        } else {
            day.and_hms_opt(self.workday_end_hour, 0, 0)?
        };
        Some((Utc.from_utc_datetime(&start), Utc.from_utc_datetime(&end)))
    }

    /// Round forward to the next slot boundary; on-boundary instants are unchanged.
    pub fn round_up(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        let step = i64::from(self.slot_step_minutes.max(1)) * 60;
        let remainder = instant.timestamp().rem_euclid(step);
        let nanos = i64::from(instant.timestamp_subsec_nanos());
        if remainder == 0 && nanos == 0 {
            return instant;
        }
        instant - Duration::seconds(remainder) - Duration::nanoseconds(nanos)
            + Duration::seconds(step)
    }
}

pub(crate) fn minutes(value: u32) -> Duration {
    Duration::minutes(i64::from(value))
}
