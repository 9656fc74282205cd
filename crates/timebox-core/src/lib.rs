//! # Timebox Core Library
//!
//! This library provides the core logic for Timebox, a personal time-boxing
//! timer that alternates focus intervals with breaks and records each
//! finished focus interval as a session against an activity label.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine that requires the caller
//!   to periodically invoke `tick()`, and `resume()` after a suspension
//! - **Duration Policy**: Maps each mode to its configured length
//! - **Sessions**: A completion sink that forwards finished work intervals
//!   to storage without ever retrying or touching timer state
//! - **Storage**: SQLite-based activity/session storage and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`DurationPolicy`]: Mode-to-duration resolution
//! - [`SessionRecorder`]: Persists work completions
//! - [`Database`]: Activity and session persistence
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod session;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::Event;
pub use session::{NewSession, SessionRecorder, SessionStore};
pub use storage::{Activity, ActivityTotal, Config, Database, SessionRecord};
pub use timer::{
    Clock, CompletionEvent, CompletionSink, DurationPolicy, ManualClock, Mode, SystemClock,
    TimerEngine, TimerSnapshot, WorkDuration,
};
