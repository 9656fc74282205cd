mod clock;
mod engine;
mod mode;
mod policy;
mod sink;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{format_clock, TimerEngine, TimerSnapshot};
pub use mode::Mode;
pub use policy::{
    DurationPolicy, WorkDuration, DEFAULT_LONG_BREAK_MIN, DEFAULT_SHORT_BREAK_MIN,
    DEFAULT_WORK_MIN,
};
pub use sink::{CompletionEvent, CompletionSink, NoopSink, VecSink};
