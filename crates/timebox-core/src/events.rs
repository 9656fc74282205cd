use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{CompletionEvent, Mode};

/// Every state change of the timer produces an Event.
/// Hosts print or render them; only `TimerCompleted` has downstream effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: Mode,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Switching away from a running interval cancels it; `aborted` records that.
    ModeSwitched {
        from: Mode,
        to: Mode,
        aborted: bool,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    WorkDurationChanged {
        work_secs: u64,
        /// Whether the displayed countdown was re-resolved immediately.
        applied_now: bool,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        #[serde(flatten)]
        completion: CompletionEvent,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: Mode,
        remaining_secs: u64,
        total_secs: u64,
        running: bool,
        activity_label: String,
        at: DateTime<Utc>,
    },
}

/// Convert engine milliseconds into a UTC timestamp.
pub(crate) fn timestamp(ms: u64) -> DateTime<Utc> {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}
