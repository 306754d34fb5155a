//! Relay power state and its accepted spellings.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Power state of a relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    /// Normalize a JSON payload.
    ///
    /// Accepts booleans, the numbers `1`/`0`, and the strings `1`, `0`,
    /// `true`, `false`, `on`, `off` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPayload`] for anything else.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ValidationError> {
        match value {
            serde_json::Value::Bool(true) => Ok(Self::On),
            serde_json::Value::Bool(false) => Ok(Self::Off),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(1) => Ok(Self::On),
                Some(0) => Ok(Self::Off),
                _ => Err(ValidationError::InvalidPayload),
            },
            serde_json::Value::String(s) => s.parse(),
            _ => Err(ValidationError::InvalidPayload),
        }
    }

    /// Payload sent on the command topic.
    #[must_use]
    pub fn as_payload(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

impl FromStr for PowerState {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "1" || s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("on") {
            Ok(Self::On)
        } else if s == "0" || s.eq_ignore_ascii_case("false") || s.eq_ignore_ascii_case("off") {
            Ok(Self::Off)
        } else {
            Err(ValidationError::InvalidPayload)
        }
    }
}

impl From<bool> for PowerState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

impl std::fmt::Display for PowerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
        }
    }
}
