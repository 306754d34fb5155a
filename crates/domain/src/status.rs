//! Display status — the short indicator shown for the last invocation.

use serde::{Deserialize, Serialize};

use crate::command::{NodeConfig, RelayCommand};
use crate::error::ToxotesError;
use crate::power::PowerState;
use crate::thing::Thing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Green,
    Red,
    Grey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusShape {
    Dot,
    Ring,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayStatus {
    pub color: StatusColor,
    pub shape: StatusShape,
    pub text: String,
}

impl DisplayStatus {
    /// Neutral status shown before the first invocation.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            color: StatusColor::Grey,
            shape: StatusShape::Ring,
            text: "waiting for command".to_string(),
        }
    }

    /// Red ring carrying the error message.
    #[must_use]
    pub fn error(err: &ToxotesError) -> Self {
        Self {
            color: StatusColor::Red,
            shape: StatusShape::Ring,
            text: format!("Error: {}", err.status_message()),
        }
    }

    /// Whether this status marks a failed invocation.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.shape == StatusShape::Ring && self.color == StatusColor::Red
    }
}

/// Summarize a completed invocation.
///
/// Without a fixed node name the text names the last thing processed, so a
/// command addressed by unique id shows which device it hit. When some
/// things of a group were held back by a manual window, the text says how
/// many.
#[must_use]
pub fn summarize(
    command: &RelayCommand,
    things: &[Thing],
    held: usize,
    node: &NodeConfig,
) -> DisplayStatus {
    let mut text = command.payload.to_string();
    if node.fixed_name().is_none()
        && let Some(last) = things.last()
    {
        text = format!("{text} ({})", last.friendly_name);
    }
    if held > 0 {
        text = format!("{text}, {held}/{} held manually", things.len());
    }

    let color = match command.payload {
        PowerState::On => StatusColor::Green,
        PowerState::Off => StatusColor::Red,
    };

    DisplayStatus {
        color,
        shape: StatusShape::Dot,
        text,
    }
}
