//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`ToxotesError`]
//! at the port boundary via `From`.

use crate::command::Selector;

/// Boxed source error carried across port boundaries.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error for a relay command invocation.
#[derive(Debug, thiserror::Error)]
pub enum ToxotesError {
    /// The inbound command was malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The selector matched no thing.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Querying or writing thing rows failed.
    #[error("persistence error")]
    Persistence(#[source] BoxedError),

    /// Handing a command to the broker failed.
    #[error("publish error")]
    Publish(#[source] BoxedError),
}

impl ToxotesError {
    /// Short operator-facing message, used for the error status line.
    #[must_use]
    pub fn status_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::NotFound(err) => err.to_string(),
            Self::Persistence(err) => format!("database: {err}"),
            Self::Publish(err) => format!("mqtt: {err}"),
        }
    }
}

/// Reasons a command or a thing record fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The payload is not one of `1`, `0`, `true`, `false`, `on`, `off`.
    #[error("invalid payload, use 1, 0, on, off")]
    InvalidPayload,

    /// Neither a unique id nor a friendly name was supplied.
    #[error("missing target, set unique_id or friendly_name")]
    MissingTarget,

    /// A thing record has no unique id.
    #[error("unique id must not be empty")]
    EmptyUniqueId,

    /// A thing record has no host id, so no command topic can be built.
    #[error("host id must not be empty")]
    EmptyHostId,

    /// A thing record has a manual window that would not end in the future.
    #[error("manual control window must be at least one minute")]
    InvalidManualWindow,
}

/// No thing matched the command's selector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", describe(.selector))]
pub struct NotFoundError {
    pub selector: Selector,
}

fn describe(selector: &Selector) -> String {
    match selector {
        Selector::ByUniqueId(id) => format!("Unique ID {id} not found"),
        Selector::ByFriendlyName(name) => format!("Thing {name} not found"),
    }
}
