//! Relay commands and their normalization from inbound messages.
//!
//! An inbound [`RawCommand`] carries loosely typed optional fields. It is
//! normalized exactly once, together with the static [`NodeConfig`], into a
//! [`RelayCommand`] whose fields all have defined values.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::power::PowerState;
use crate::qos::Qos;

/// How a command addresses its target things.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum Selector {
    /// Exactly one thing, by its stable identifier.
    ByUniqueId(String),
    /// Every thing sharing a friendly name.
    ByFriendlyName(String),
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByUniqueId(id) => write!(f, "unique_id={id}"),
            Self::ByFriendlyName(name) => write!(f, "friendly_name={name}"),
        }
    }
}

/// Inbound message as received, before any defaulting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCommand {
    pub payload: Option<serde_json::Value>,
    pub unique_id: Option<serde_json::Value>,
    pub friendly_name: Option<serde_json::Value>,
    pub qos: Option<serde_json::Value>,
    pub retain: Option<serde_json::Value>,
    pub manual: Option<serde_json::Value>,
}

/// Static per-node settings that take precedence over message fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Replaces any friendly name carried by the message.
    pub friendly_name: Option<String>,
    /// Forces the retain flag when set.
    pub retain: Option<bool>,
    /// Forces the manual flag when set.
    pub override_as_manual: Option<bool>,
}

impl NodeConfig {
    /// The configured friendly name, ignoring blank values.
    #[must_use]
    pub fn fixed_name(&self) -> Option<&str> {
        non_blank(self.friendly_name.as_deref())
    }
}

/// A validated command with every field resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayCommand {
    pub selector: Selector,
    pub payload: PowerState,
    pub qos: Qos,
    pub retain: bool,
    pub manual: bool,
}

impl RelayCommand {
    /// Normalize an inbound message against the node configuration.
    ///
    /// A message `unique_id` wins over any friendly name. Otherwise the node's
    /// friendly name, then the message's, selects the target group.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPayload`] when the payload is missing
    /// or not an accepted spelling, and [`ValidationError::MissingTarget`] when
    /// no selector can be resolved.
    pub fn normalize(raw: &RawCommand, node: &NodeConfig) -> Result<Self, ValidationError> {
        let payload = raw
            .payload
            .as_ref()
            .ok_or(ValidationError::InvalidPayload)
            .and_then(PowerState::from_json)?;

        let selector = if let Some(id) = target_text(raw.unique_id.as_ref()) {
            Selector::ByUniqueId(id)
        } else if let Some(name) = node
            .fixed_name()
            .map(str::to_string)
            .or_else(|| target_text(raw.friendly_name.as_ref()))
        {
            Selector::ByFriendlyName(name)
        } else {
            return Err(ValidationError::MissingTarget);
        };

        Ok(Self {
            selector,
            payload,
            qos: Qos::from_json(raw.qos.as_ref()),
            retain: node
                .retain
                .unwrap_or_else(|| coerce_flag(raw.retain.as_ref())),
            manual: node
                .override_as_manual
                .unwrap_or_else(|| coerce_flag(raw.manual.as_ref())),
        })
    }
}

/// Boolean-or-string-boolean coercion; anything unrecognised is `false`.
fn coerce_flag(value: Option<&serde_json::Value>) -> bool {
    match value {
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("true") || s == "1",
        Some(serde_json::Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    }
}

/// Strings and numbers address things; blanks and other shapes do not.
fn target_text(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) => non_blank(Some(s)).map(str::to_string),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
