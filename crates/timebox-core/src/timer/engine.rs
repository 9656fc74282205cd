//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()`
//! periodically and `resume()` once after the host was suspended.
//!
//! ## State Transitions
//!
//! ```text
//! Paused -> Running -> (Paused | completed -> Paused with a fresh interval)
//! ```
//!
//! Remaining time is always recomputed from `now - start`, never decremented
//! per tick, so throttled or suspended hosts cannot make the countdown drift.
//!
//! ## Usage
//!
//! ```
//! use timebox_core::timer::{DurationPolicy, ManualClock, TimerEngine, VecSink};
//!
//! let clock = ManualClock::new(0);
//! let mut engine = TimerEngine::new(DurationPolicy::default(), clock.clone(), VecSink::default());
//! engine.start();
//! clock.advance_secs(10);
//! engine.tick();
//! assert_eq!(engine.remaining_secs(), 1490);
//! ```

use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::mode::Mode;
use super::policy::{DurationPolicy, WorkDuration};
use super::sink::{CompletionEvent, CompletionSink};
use crate::events::{timestamp, Event};

/// Renderable view of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub mode: Mode,
    pub remaining_secs: u64,
    pub total_secs: u64,
    pub running: bool,
    pub activity_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Core timer engine.
///
/// Operates on wall-clock deltas -- no internal thread. Not persisted:
/// a new host process starts from a fresh engine.
#[derive(Debug)]
pub struct TimerEngine<C, S> {
    policy: DurationPolicy,
    clock: C,
    sink: S,
    mode: Mode,
    activity_label: String,
    note: Option<String>,
    /// Last computed time left. Authoritative for display only.
    remaining_secs: u64,
    /// Length of the interval being counted down, fixed at `start()`.
    total_secs: u64,
    /// Set iff running.
    start_epoch_ms: Option<u64>,
}

impl<C: Clock, S: CompletionSink> TimerEngine<C, S> {
    /// Create a paused engine in `Work` mode with the full work duration loaded.
    pub fn new(policy: DurationPolicy, clock: C, sink: S) -> Self {
        let remaining_secs = policy.duration_for(Mode::Work);
        Self {
            policy,
            clock,
            sink,
            mode: Mode::Work,
            activity_label: String::new(),
            note: None,
            remaining_secs,
            total_secs: remaining_secs,
            start_epoch_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn is_running(&self) -> bool {
        self.start_epoch_ms.is_some()
    }

    pub fn activity_label(&self) -> &str {
        &self.activity_label
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn policy(&self) -> &DurationPolicy {
        &self.policy
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs,
            running: self.is_running(),
            activity_label: self.activity_label.clone(),
            note: self.note.clone(),
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot_event(&self) -> Event {
        Event::StateSnapshot {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs,
            running: self.is_running(),
            activity_label: self.activity_label.clone(),
            at: self.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start counting down from the current remaining time.
    ///
    /// A paused interval continues where it left off. No-op while running.
    pub fn start(&mut self) -> Option<Event> {
        if self.is_running() {
            return None;
        }
        let now = self.clock.now_ms();
        self.start_epoch_ms = Some(now);
        self.total_secs = self.remaining_secs;
        tracing::debug!(mode = %self.mode, total_secs = self.total_secs, "timer started");
        Some(Event::TimerStarted {
            mode: self.mode,
            total_secs: self.total_secs,
            at: timestamp(now),
        })
    }

    /// Stop counting, keeping the last computed remaining time. No-op unless running.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.is_running() {
            return None;
        }
        self.stop();
        tracing::debug!(mode = %self.mode, remaining_secs = self.remaining_secs, "timer paused");
        Some(Event::TimerPaused {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: self.now(),
        })
    }

    /// Stop and reload the full duration of the current mode. Never completes.
    pub fn reset(&mut self) -> Option<Event> {
        self.stop();
        self.reload();
        tracing::debug!(mode = %self.mode, "timer reset");
        Some(Event::TimerReset {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: self.now(),
        })
    }

    /// Change mode. A running interval is abandoned without completion.
    pub fn switch_mode(&mut self, mode: Mode) -> Option<Event> {
        let from = self.mode;
        let aborted = self.is_running();
        self.stop();
        self.mode = mode;
        self.reload();
        tracing::debug!(%from, to = %mode, aborted, "mode switched");
        Some(Event::ModeSwitched {
            from,
            to: mode,
            aborted,
            remaining_secs: self.remaining_secs,
            at: self.now(),
        })
    }

    /// Label attached to work completions. Has no effect on timing.
    pub fn set_activity_label(&mut self, label: impl Into<String>) {
        self.activity_label = label.into();
    }

    /// Free-form annotation attached to the next work completion.
    pub fn set_note(&mut self, note: Option<String>) {
        self.note = note.filter(|n| !n.trim().is_empty());
    }

    /// Change the work duration.
    ///
    /// While paused in `Work` the countdown is re-resolved immediately. A
    /// running interval keeps its length; the new value applies from the
    /// next reset or completion.
    pub fn set_work_duration(&mut self, work: WorkDuration) -> Option<Event> {
        self.policy.set_work(work);
        let applied_now = self.mode == Mode::Work && !self.is_running();
        if applied_now {
            self.reload();
        }
        tracing::debug!(work_secs = work.secs(), applied_now, "work duration changed");
        Some(Event::WorkDurationChanged {
            work_secs: u64::from(work.secs()),
            applied_now,
            at: self.now(),
        })
    }

    /// Recompute remaining time. Returns `TimerCompleted` when the interval ended.
    pub fn tick(&mut self) -> Option<Event> {
        self.catch_up()
    }

    /// Same computation as [`tick`](Self::tick), for the first call after the
    /// host was suspended for an arbitrary amount of time.
    pub fn resume(&mut self) -> Option<Event> {
        let event = self.catch_up();
        if self.is_running() {
            tracing::debug!(remaining_secs = self.remaining_secs, "resumed after suspension");
        }
        event
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn catch_up(&mut self) -> Option<Event> {
        let started = self.start_epoch_ms?;
        let now = self.clock.now_ms();
        let elapsed_secs = now.saturating_sub(started) / 1000;
        if elapsed_secs >= self.total_secs {
            return Some(self.complete(now));
        }
        // A clock stepping backwards must not give time back.
        self.remaining_secs = (self.total_secs - elapsed_secs).min(self.remaining_secs);
        None
    }

    fn complete(&mut self, now: u64) -> Event {
        self.remaining_secs = 0;
        let is_work = self.mode == Mode::Work;
        let completion = CompletionEvent {
            mode: self.mode,
            elapsed_secs: self.total_secs,
            activity_label: is_work.then(|| self.activity_label.clone()),
            note: if is_work { self.note.clone() } else { None },
        };
        tracing::info!(
            mode = %completion.mode,
            elapsed_secs = completion.elapsed_secs,
            activity = completion.activity_label.as_deref().unwrap_or(""),
            "interval completed"
        );
        self.sink.on_completion(&completion);
        self.stop();
        self.reload();
        Event::TimerCompleted {
            completion,
            at: timestamp(now),
        }
    }

    fn stop(&mut self) {
        self.start_epoch_ms = None;
    }

    fn reload(&mut self) {
        self.remaining_secs = self.policy.duration_for(self.mode);
        self.total_secs = self.remaining_secs;
    }

    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        timestamp(self.clock.now_ms())
    }
}

/// Render seconds as `MM:SS`. Minutes are not wrapped into hours.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{ManualClock, VecSink};

    const T0: u64 = 1_700_000_000_000;

    fn engine() -> (TimerEngine<ManualClock, VecSink>, ManualClock) {
        let clock = ManualClock::new(T0);
        let engine = TimerEngine::new(DurationPolicy::default(), clock.clone(), VecSink::default());
        (engine, clock)
    }

    #[test]
    fn starts_paused_in_work_mode() {
        let (engine, _) = engine();
        assert_eq!(engine.mode(), Mode::Work);
        assert!(!engine.is_running());
        assert_eq!(engine.remaining_secs(), 1500);
    }

    #[test]
    fn start_is_idempotent() {
        let (mut engine, clock) = engine();
        assert!(engine.start().is_some());
        clock.advance_secs(3);
        assert!(engine.start().is_none());
        engine.tick();
        // Still measured from the first start.
        assert_eq!(engine.remaining_secs(), 1497);
    }

    #[test]
    fn pause_and_restart_continues_countdown() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance_secs(10);
        engine.tick();
        assert_eq!(engine.remaining_secs(), 1490);

        assert!(engine.pause().is_some());
        clock.advance_secs(600);
        engine.tick();
        assert_eq!(engine.remaining_secs(), 1490);

        engine.start();
        assert_eq!(engine.total_secs(), 1490);
        clock.advance_secs(5);
        engine.tick();
        assert_eq!(engine.remaining_secs(), 1485);
    }

    #[test]
    fn pause_when_paused_is_noop() {
        let (mut engine, _) = engine();
        assert!(engine.pause().is_none());
    }

    #[test]
    fn sub_second_progress_is_floored() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance(std::time::Duration::from_millis(999));
        engine.tick();
        assert_eq!(engine.remaining_secs(), 1500);
        clock.advance(std::time::Duration::from_millis(1));
        engine.tick();
        assert_eq!(engine.remaining_secs(), 1499);
    }

    #[test]
    fn completion_emits_once_and_reloads() {
        let (mut engine, clock) = engine();
        engine.set_activity_label("Reading");
        engine.start();
        clock.advance_secs(1500);
        let event = engine.tick();
        assert!(matches!(event, Some(Event::TimerCompleted { .. })));
        assert!(!engine.is_running());
        assert_eq!(engine.remaining_secs(), 1500);

        clock.advance_secs(60);
        assert!(engine.tick().is_none());
        assert!(engine.resume().is_none());

        let events = &engine.sink().events;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].elapsed_secs, 1500);
        assert_eq!(events[0].activity_label.as_deref(), Some("Reading"));
    }

    #[test]
    fn break_completion_has_no_label_or_note() {
        let (mut engine, clock) = engine();
        engine.set_activity_label("Reading");
        engine.set_note(Some("chapter 3".into()));
        engine.switch_mode(Mode::ShortBreak);
        engine.start();
        clock.advance_secs(300);
        engine.tick();
        let events = &engine.sink().events;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].mode, Mode::ShortBreak);
        assert_eq!(events[0].activity_label, None);
        assert_eq!(events[0].note, None);
        assert_eq!(engine.remaining_secs(), 300);
    }

    #[test]
    fn resume_after_long_suspension_completes_once() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance_secs(9000);
        let event = engine.resume();
        match event {
            Some(Event::TimerCompleted { completion, .. }) => {
                assert_eq!(completion.elapsed_secs, 1500);
            }
            other => panic!("Expected TimerCompleted, got {other:?}"),
        }
        assert_eq!(engine.sink().events.len(), 1);
    }

    #[test]
    fn switch_mode_aborts_without_completion() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance_secs(100);
        engine.tick();
        match engine.switch_mode(Mode::ShortBreak) {
            Some(Event::ModeSwitched { aborted, to, .. }) => {
                assert!(aborted);
                assert_eq!(to, Mode::ShortBreak);
            }
            other => panic!("Expected ModeSwitched, got {other:?}"),
        }
        assert!(!engine.is_running());
        assert_eq!(engine.remaining_secs(), 300);
        assert!(engine.sink().events.is_empty());
    }

    #[test]
    fn reset_reloads_without_completion() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance_secs(1499);
        engine.tick();
        assert_eq!(engine.remaining_secs(), 1);
        engine.reset();
        assert!(!engine.is_running());
        assert_eq!(engine.remaining_secs(), 1500);
        assert!(engine.sink().events.is_empty());
    }

    #[test]
    fn work_duration_applies_immediately_when_paused_in_work() {
        let (mut engine, _) = engine();
        engine.set_work_duration(WorkDuration::from_minutes(45).unwrap());
        assert_eq!(engine.remaining_secs(), 2700);
        engine.set_work_duration(WorkDuration::from_secs(1500).unwrap());
        assert_eq!(engine.remaining_secs(), 1500);
    }

    #[test]
    fn work_duration_deferred_while_running() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance_secs(10);
        engine.set_work_duration(WorkDuration::from_minutes(60).unwrap());
        assert_eq!(engine.total_secs(), 1500);
        engine.tick();
        assert_eq!(engine.remaining_secs(), 1490);

        clock.advance_secs(1490);
        engine.tick();
        assert_eq!(engine.sink().events[0].elapsed_secs, 1500);
        assert_eq!(engine.remaining_secs(), 3600);
    }

    #[test]
    fn work_duration_in_break_mode_waits_for_switch() {
        let (mut engine, _) = engine();
        engine.switch_mode(Mode::LongBreak);
        engine.set_work_duration(WorkDuration::from_minutes(15).unwrap());
        assert_eq!(engine.remaining_secs(), 900);
        engine.switch_mode(Mode::Work);
        assert_eq!(engine.remaining_secs(), 900);
    }

    #[test]
    fn backwards_clock_never_adds_time() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance_secs(30);
        engine.tick();
        assert_eq!(engine.remaining_secs(), 1470);
        clock.set_ms(T0 + 5_000);
        engine.tick();
        assert_eq!(engine.remaining_secs(), 1470);
        clock.set_ms(T0 - 60_000);
        engine.tick();
        assert_eq!(engine.remaining_secs(), 1470);
    }

    #[test]
    fn blank_note_is_cleared() {
        let (mut engine, _) = engine();
        engine.set_note(Some("  ".into()));
        assert_eq!(engine.note(), None);
        engine.set_note(Some("draft".into()));
        assert_eq!(engine.note(), Some("draft"));
    }

    #[test]
    fn snapshot_reflects_state() {
        let (mut engine, _) = engine();
        engine.set_activity_label("Study");
        engine.start();
        let snap = engine.snapshot();
        assert_eq!(snap.mode, Mode::Work);
        assert!(snap.running);
        assert_eq!(snap.activity_label, "Study");
        match engine.snapshot_event() {
            Event::StateSnapshot { remaining_secs, running, .. } => {
                assert_eq!(remaining_secs, 1500);
                assert!(running);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }

    #[test]
    fn format_clock_pads() {
        assert_eq!(format_clock(1500), "25:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(3600 * 2), "120:00");
    }
}
