//! State reconciliation — turns a command and its resolved things into a
//! batch of row updates and a list of hardware publishes.

use serde::{Deserialize, Serialize};

use crate::arbiter::decide;
use crate::command::RelayCommand;
use crate::power::PowerState;
use crate::qos::Qos;
use crate::thing::Thing;
use crate::time::Timestamp;

/// Builds command topics from a thing's host id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TopicConvention {
    /// Leading namespace, `cmnd` by default.
    pub prefix: String,
    /// Trailing command name, `POWER` by default.
    pub suffix: String,
}

impl Default for TopicConvention {
    fn default() -> Self {
        Self {
            prefix: "cmnd".to_string(),
            suffix: "POWER".to_string(),
        }
    }
}

impl TopicConvention {
    /// `<prefix>/<host_id>/<suffix>`
    #[must_use]
    pub fn command_topic(&self, host_id: &str) -> String {
        format!("{}/{host_id}/{}", self.prefix, self.suffix)
    }
}

/// Field set written for one thing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThingChange {
    /// Manual command: open the window and keep a resume target.
    Manual {
        under_manual_control: Timestamp,
        automatic_command: Option<PowerState>,
    },
    /// Automatic command: record what automation wants, and mark automatic
    /// control as visible.
    Automatic {
        automatic_command: PowerState,
        automatic_retain: bool,
        automatic_qos: Qos,
    },
}

impl ThingChange {
    /// Apply this field set to an in-memory thing.
    pub fn apply_to(&self, thing: &mut Thing) {
        match *self {
            Self::Manual {
                under_manual_control,
                automatic_command,
            } => {
                thing.under_manual_control = Some(under_manual_control);
                thing.automatic_command = automatic_command;
            }
            Self::Automatic {
                automatic_command,
                automatic_retain,
                automatic_qos,
            } => {
                thing.automatic_command = Some(automatic_command);
                thing.automatic_retain = automatic_retain;
                thing.automatic_qos = automatic_qos;
                thing.show_automatic_control = true;
            }
        }
    }
}

/// One row update in a persistence batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThingUpdate {
    pub unique_id: String,
    pub change: ThingChange,
}

/// One hardware command to hand to the broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishAction {
    pub unique_id: String,
    pub topic: String,
    pub payload: PowerState,
    pub qos: Qos,
    pub retain: bool,
}

/// Everything one invocation must write and send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Exactly one entry per resolved thing, in resolution order.
    pub updates: Vec<ThingUpdate>,
    pub publishes: Vec<PublishAction>,
    /// Unique ids whose publish was held back by an open manual window.
    pub held: Vec<String>,
}

/// Reconcile `command` against every thing it resolved to.
#[must_use]
pub fn reconcile(
    now: Timestamp,
    command: &RelayCommand,
    things: &[Thing],
    topics: &TopicConvention,
) -> Reconciliation {
    let mut out = Reconciliation::default();

    for thing in things {
        let decision = decide(now, thing, command);

        let change = match decision.manual_expiry {
            Some(until) if command.manual => ThingChange::Manual {
                under_manual_control: until,
                automatic_command: decision
                    .seed_automatic_command
                    .or(thing.automatic_command),
            },
            _ => ThingChange::Automatic {
                automatic_command: command.payload,
                automatic_retain: command.retain,
                automatic_qos: command.qos,
            },
        };
        out.updates.push(ThingUpdate {
            unique_id: thing.unique_id.clone(),
            change,
        });

        if decision.suppress {
            out.held.push(thing.unique_id.clone());
            continue;
        }
        out.publishes.push(PublishAction {
            unique_id: thing.unique_id.clone(),
            topic: topics.command_topic(&thing.host_id),
            payload: command.payload,
            qos: command.qos,
            retain: command.retain,
        });
    }

    out
}
