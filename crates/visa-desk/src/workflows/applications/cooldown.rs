use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Hours a rejected track stays locked before the client may resubmit.
pub const REJECTION_COOLDOWN_HOURS: i64 = 24;

pub fn rejection_cooldown() -> Duration {
    Duration::hours(REJECTION_COOLDOWN_HOURS)
}

/// Remaining lock on a rejected track, truncated to whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRemaining {
    pub can_resubmit: bool,
    pub hours_left: i64,
    pub minutes_left: i64,
}

impl TimeRemaining {
    pub const fn elapsed() -> Self {
        Self {
            can_resubmit: true,
            hours_left: 0,
            minutes_left: 0,
        }
    }
}

/// Computes how long a rejection keeps the track locked at `now`.
///
/// The boundary is inclusive: once exactly [`REJECTION_COOLDOWN_HOURS`] have
/// passed the client may resubmit. A missing `rejected_at` never blocks.
pub fn time_remaining(rejected_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> TimeRemaining {
    let Some(rejected_at) = rejected_at else {
        return TimeRemaining::elapsed();
    };

    let remaining = rejection_cooldown() - (now - rejected_at);
    if remaining <= Duration::zero() {
        return TimeRemaining::elapsed();
    }

    let hours_left = remaining.num_hours();
    let minutes_left = (remaining - Duration::hours(hours_left)).num_minutes();

    TimeRemaining {
        can_resubmit: false,
        hours_left,
        minutes_left,
    }
}
