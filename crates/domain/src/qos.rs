//! MQTT quality-of-service level with permissive parsing.

use serde::{Deserialize, Serialize};

/// Delivery guarantee requested for a command publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", from = "u8")]
pub enum Qos {
    AtMostOnce,
    AtLeastOnce,
    #[default]
    ExactlyOnce,
}

impl Qos {
    /// Read a qos from an inbound message field.
    ///
    /// Missing, non-numeric, negative or out-of-range values all fall back to
    /// [`Qos::ExactlyOnce`]. Strings are read up to their first non-digit,
    /// so `"1.5"` and `"1abc"` are level 1, and fractional numbers are
    /// truncated.
    #[must_use]
    pub fn from_json(value: Option<&serde_json::Value>) -> Self {
        let level = match value {
            Some(serde_json::Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(truncate)),
            Some(serde_json::Value::String(s)) => leading_integer(s),
            _ => None,
        };
        level.map_or_else(Self::default, Self::from_level)
    }

    /// Map a numeric level, coercing anything outside `0..=2` to `2`.
    #[must_use]
    pub fn from_level(level: i64) -> Self {
        match level {
            0 => Self::AtMostOnce,
            1 => Self::AtLeastOnce,
            _ => Self::ExactlyOnce,
        }
    }

    #[must_use]
    pub fn level(self) -> u8 {
        match self {
            Self::AtMostOnce => 0,
            Self::AtLeastOnce => 1,
            Self::ExactlyOnce => 2,
        }
    }
}

fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let digits_start = usize::from(s.starts_with(['-', '+']));
    let end = s[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(s.len(), |i| i + digits_start);
    s[..end].parse().ok()
}

#[allow(clippy::cast_possible_truncation)]
fn truncate(f: f64) -> i64 {
    f.trunc() as i64
}

impl From<Qos> for u8 {
    fn from(qos: Qos) -> Self {
        qos.level()
    }
}

impl From<u8> for Qos {
    fn from(level: u8) -> Self {
        Self::from_level(i64::from(level))
    }
}

impl std::fmt::Display for Qos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.level())
    }
}
