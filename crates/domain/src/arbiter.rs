//! Manual-override arbitration.
//!
//! Manual commands always reach the hardware and open a window during which
//! automatic commands are recorded but not sent. Expiry is lazy: nothing
//! fires when a window ends, the next automatic command just sees a
//! timestamp in the past.

use chrono::Duration;

use crate::command::RelayCommand;
use crate::power::PowerState;
use crate::thing::Thing;
use crate::time::Timestamp;

/// Per-thing outcome of arbitration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Skip the hardware publish for this thing.
    pub suppress: bool,
    /// New end of the manual window, set for manual commands only.
    pub manual_expiry: Option<Timestamp>,
    /// Value to record as the automatic command so that automatic control
    /// has a target to resume once the manual window lapses.
    pub seed_automatic_command: Option<PowerState>,
}

/// Decide how `command` applies to `thing` at `now`.
#[must_use]
pub fn decide(now: Timestamp, thing: &Thing, command: &RelayCommand) -> Decision {
    if command.manual {
        let window = Duration::minutes(i64::from(thing.manual_control_for));
        return Decision {
            suppress: false,
            manual_expiry: Some(now + window),
            seed_automatic_command: thing
                .automatic_command
                .is_none()
                .then_some(thing.current_value)
                .flatten(),
        };
    }

    Decision {
        suppress: thing.is_under_manual_control(now),
        manual_expiry: None,
        seed_automatic_command: None,
    }
}
