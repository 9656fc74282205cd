use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Which kind of interval the timer is counting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    #[default]
    Work,
    ShortBreak,
    LongBreak,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Work, Mode::ShortBreak, Mode::LongBreak];

    /// Stable identifier (`work`, `shortBreak`, `longBreak`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Work => "work",
            Mode::ShortBreak => "shortBreak",
            Mode::LongBreak => "longBreak",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Work => "Work",
            Mode::ShortBreak => "Short break",
            Mode::LongBreak => "Long break",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "work" => Ok(Mode::Work),
            "shortBreak" | "short" | "break" => Ok(Mode::ShortBreak),
            "longBreak" | "long" => Ok(Mode::LongBreak),
            other => Err(ValidationError::invalid(
                "mode",
                format!("unknown mode '{other}' (expected work, shortBreak or longBreak)"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_identifiers_and_aliases() {
        assert_eq!("work".parse::<Mode>().unwrap(), Mode::Work);
        assert_eq!("shortBreak".parse::<Mode>().unwrap(), Mode::ShortBreak);
        assert_eq!("short".parse::<Mode>().unwrap(), Mode::ShortBreak);
        assert_eq!("long".parse::<Mode>().unwrap(), Mode::LongBreak);
        assert_eq!("break".parse::<Mode>().unwrap(), Mode::ShortBreak);
        assert!("nap".parse::<Mode>().is_err());
        assert!("focus".parse::<Mode>().is_err());
    }

    #[test]
    fn serde_uses_camel_case_identifiers() {
        assert_eq!(serde_json::to_string(&Mode::ShortBreak).unwrap(), "\"shortBreak\"");
        let m: Mode = serde_json::from_str("\"longBreak\"").unwrap();
        assert_eq!(m, Mode::LongBreak);
    }

    #[test]
    fn display_roundtrips_through_from_str() {
        for mode in Mode::ALL {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
    }
}
