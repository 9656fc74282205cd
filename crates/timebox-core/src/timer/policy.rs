//! Mode-to-duration resolution.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::mode::Mode;
use crate::error::ValidationError;

pub const DEFAULT_WORK_MIN: u32 = 25;
pub const DEFAULT_SHORT_BREAK_MIN: u32 = 5;
pub const DEFAULT_LONG_BREAK_MIN: u32 = 15;

/// Length of a work interval in seconds. Always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct WorkDuration(NonZeroU32);

impl WorkDuration {
    /// Preset choices offered to the user, in minutes.
    pub const PRESETS_MIN: [u32; 4] = [15, 25, 45, 60];

    pub fn from_secs(secs: u32) -> Result<Self, ValidationError> {
        NonZeroU32::new(secs)
            .map(Self)
            .ok_or_else(|| ValidationError::invalid("work_duration", "must be greater than zero"))
    }

    pub fn from_minutes(minutes: u32) -> Result<Self, ValidationError> {
        let secs = minutes
            .checked_mul(60)
            .ok_or_else(|| ValidationError::invalid("work_duration", "too large"))?;
        Self::from_secs(secs)
    }

    pub fn secs(&self) -> u32 {
        self.0.get()
    }

    /// Whether this is one of [`WorkDuration::PRESETS_MIN`] rather than a custom value.
    pub fn is_preset(&self) -> bool {
        self.secs() % 60 == 0 && Self::PRESETS_MIN.contains(&(self.secs() / 60))
    }
}

impl Default for WorkDuration {
    fn default() -> Self {
        const DEFAULT_SECS: NonZeroU32 = match NonZeroU32::new(DEFAULT_WORK_MIN * 60) {
            Some(secs) => secs,
            None => panic!("default work duration is zero"),
        };
        Self(DEFAULT_SECS)
    }
}

impl TryFrom<u32> for WorkDuration {
    type Error = ValidationError;

    fn try_from(secs: u32) -> Result<Self, Self::Error> {
        Self::from_secs(secs)
    }
}

impl From<WorkDuration> for u32 {
    fn from(d: WorkDuration) -> u32 {
        d.secs()
    }
}

/// Resolves each [`Mode`] to its configured duration in seconds.
///
/// Break lengths are fixed for the lifetime of the policy; only the work
/// duration can change at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationPolicy {
    work: WorkDuration,
    short_break_secs: u32,
    long_break_secs: u32,
}

impl DurationPolicy {
    pub fn new(work: WorkDuration, short_break: NonZeroU32, long_break: NonZeroU32) -> Self {
        Self {
            work,
            short_break_secs: short_break.get(),
            long_break_secs: long_break.get(),
        }
    }

    pub fn duration_for(&self, mode: Mode) -> u64 {
        match mode {
            Mode::Work => u64::from(self.work.secs()),
            Mode::ShortBreak => u64::from(self.short_break_secs),
            Mode::LongBreak => u64::from(self.long_break_secs),
        }
    }

    pub fn work(&self) -> WorkDuration {
        self.work
    }

    pub fn set_work(&mut self, work: WorkDuration) {
        self.work = work;
    }
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self {
            work: WorkDuration::default(),
            short_break_secs: DEFAULT_SHORT_BREAK_MIN * 60,
            long_break_secs: DEFAULT_LONG_BREAK_MIN * 60,
        }
    }
}
