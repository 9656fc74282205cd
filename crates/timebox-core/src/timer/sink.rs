use serde::{Deserialize, Serialize};

use super::mode::Mode;

/// Emitted once when a running interval reaches zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub mode: Mode,
    /// Full length of the interval that just finished.
    pub elapsed_secs: u64,
    /// Only set for work intervals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_label: Option<String>,
    /// Only set for work intervals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Receiver for completion events.
///
/// Called synchronously from inside `tick()`/`resume()`. The engine owns
/// its sink and only lends it the event, so a sink cannot re-enter the
/// engine mid-transition.
pub trait CompletionSink {
    fn on_completion(&mut self, event: &CompletionEvent);
}

impl<F> CompletionSink for F
where
    F: FnMut(&CompletionEvent),
{
    fn on_completion(&mut self, event: &CompletionEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl CompletionSink for NoopSink {
    fn on_completion(&mut self, _event: &CompletionEvent) {}
}

/// Collects events in memory.
#[derive(Debug, Clone, Default)]
pub struct VecSink {
    pub events: Vec<CompletionEvent>,
}

impl CompletionSink for VecSink {
    fn on_completion(&mut self, event: &CompletionEvent) {
        self.events.push(event.clone());
    }
}
