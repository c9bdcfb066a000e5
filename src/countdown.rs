//! # Countdown
//! `T-`/`T+` labels for launches with an exact window start.
//!
//! Approximate (date-only) launches never get a countdown; the wall shows
//! [`NO_PRECISE_TIME`] instead.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::launch::LaunchEvent;

pub const NO_PRECISE_TIME: &str = "No precise time yet.";

/// Signed distance between now and a target instant, split into display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub past: bool,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    pub fn until(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let diff_ms = target.timestamp_millis() - now.timestamp_millis();
        let total = diff_ms.abs() / 1000;
        Self {
            past: diff_ms < 0,
            days: total / 86_400,
            hours: (total % 86_400) / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }

    /// `T- 1d 02:03:04`, or `T- 02:03:04` under a day; `T+` once past.
    pub fn label(&self) -> String {
        let sign = if self.past { "T+" } else { "T-" };
        if self.days > 0 {
            format!(
                "{sign} {}d {:02}:{:02}:{:02}",
                self.days, self.hours, self.minutes, self.seconds
            )
        } else {
            format!("{sign} {:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
        }
    }
}

/// Countdown for an event, only when its time is exact.
pub fn countdown_for(ev: &LaunchEvent, now: DateTime<Utc>) -> Option<Countdown> {
    ev.iso_timestamp.map(|at| Countdown::until(at, now))
}

/// Delay until the next whole wall-clock second, so ticks land on second boundaries.
pub fn next_tick_delay(now: DateTime<Utc>) -> Duration {
    let into_second = now.timestamp_subsec_millis().min(999) as u64;
    Duration::from_millis(1000 - into_second)
}
