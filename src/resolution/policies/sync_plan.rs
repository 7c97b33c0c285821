use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;

/// Age after which a delta update is no longer trusted.
pub const DELTA_SYNC_THRESHOLD_HOURS: i64 = 25;

pub fn default_delta_threshold() -> Duration {
    Duration::hours(DELTA_SYNC_THRESHOLD_HOURS)
}

/// How a collection is brought up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    Full,
    Delta,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Full => f.write_str("full"),
            SyncMode::Delta => f.write_str("delta"),
        }
    }
}

/// SyncPlan - chosen mode for one collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPlan {
    pub mode: SyncMode,
    /// Lower bound for a delta fetch. Always `None` for a full fetch.
    pub since: Option<DateTime<Utc>>,
}

impl SyncPlan {
    /// Delta only if not forced, previously synced, and that sync is
    /// younger than `threshold`. Everything else is a full fetch.
    pub fn decide(
        force_full: bool,
        last_sync: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        threshold: Duration,
    ) -> Self {
        match last_sync {
            Some(last) if !force_full && now - last < threshold => SyncPlan {
                mode: SyncMode::Delta,
                since: Some(last),
            },
            _ => SyncPlan::full(),
        }
    }

    pub fn full() -> Self {
        SyncPlan {
            mode: SyncMode::Full,
            since: None,
        }
    }
}
