//! Thing — a persisted relay-controlled device.
//!
//! Several things may share one `friendly_name`; commands addressed by name
//! fan out to all of them.

use serde::{Deserialize, Serialize};

use crate::error::{ToxotesError, ValidationError};
use crate::power::PowerState;
use crate::qos::Qos;
use crate::time::Timestamp;

/// Default manual window for newly built things, in minutes.
pub const DEFAULT_MANUAL_CONTROL_FOR: u32 = 10;

/// One physical relay and its control bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thing {
    pub unique_id: String,
    pub friendly_name: String,
    /// Transport address used to build the command topic.
    pub host_id: String,
    /// End of the active manual window, if one was ever set.
    pub under_manual_control: Option<Timestamp>,
    /// Manual window length in minutes.
    pub manual_control_for: u32,
    pub current_value: Option<PowerState>,
    pub automatic_command: Option<PowerState>,
    pub automatic_retain: bool,
    pub automatic_qos: Qos,
    pub show_automatic_control: bool,
}

impl Thing {
    /// Create a builder for constructing a [`Thing`].
    #[must_use]
    pub fn builder() -> ThingBuilder {
        ThingBuilder::default()
    }

    /// Whether a manual window is still open at `now`.
    ///
    /// A window that has already passed counts as closed; nothing clears the
    /// stored timestamp, it is simply observed as stale.
    #[must_use]
    pub fn is_under_manual_control(&self, now: Timestamp) -> bool {
        self.under_manual_control.is_some_and(|until| until > now)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ToxotesError::Validation`] when `unique_id` or `host_id` is
    /// empty, or when `manual_control_for` is zero.
    pub fn validate(&self) -> Result<(), ToxotesError> {
        if self.unique_id.is_empty() {
            return Err(ValidationError::EmptyUniqueId.into());
        }
        if self.host_id.is_empty() {
            return Err(ValidationError::EmptyHostId.into());
        }
        if self.manual_control_for == 0 {
            return Err(ValidationError::InvalidManualWindow.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Thing`].
#[derive(Debug, Default)]
pub struct ThingBuilder {
    unique_id: Option<String>,
    friendly_name: Option<String>,
    host_id: Option<String>,
    under_manual_control: Option<Timestamp>,
    manual_control_for: Option<u32>,
    current_value: Option<PowerState>,
    automatic_command: Option<PowerState>,
    automatic_retain: bool,
    automatic_qos: Qos,
    show_automatic_control: bool,
}

impl ThingBuilder {
    #[must_use]
    pub fn unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    #[must_use]
    pub fn friendly_name(mut self, friendly_name: impl Into<String>) -> Self {
        self.friendly_name = Some(friendly_name.into());
        self
    }

    #[must_use]
    pub fn host_id(mut self, host_id: impl Into<String>) -> Self {
        self.host_id = Some(host_id.into());
        self
    }

    #[must_use]
    pub fn under_manual_control(mut self, until: Timestamp) -> Self {
        self.under_manual_control = Some(until);
        self
    }

    #[must_use]
    pub fn manual_control_for(mut self, minutes: u32) -> Self {
        self.manual_control_for = Some(minutes);
        self
    }

    #[must_use]
    pub fn current_value(mut self, value: PowerState) -> Self {
        self.current_value = Some(value);
        self
    }

    #[must_use]
    pub fn automatic_command(mut self, value: PowerState) -> Self {
        self.automatic_command = Some(value);
        self
    }

    #[must_use]
    pub fn automatic_retain(mut self, retain: bool) -> Self {
        self.automatic_retain = retain;
        self
    }

    #[must_use]
    pub fn automatic_qos(mut self, qos: Qos) -> Self {
        self.automatic_qos = qos;
        self
    }

    #[must_use]
    pub fn show_automatic_control(mut self, show: bool) -> Self {
        self.show_automatic_control = show;
        self
    }

    /// Consume the builder, validate, and return a [`Thing`].
    ///
    /// The host id defaults to the unique id when not given.
    ///
    /// # Errors
    ///
    /// Returns [`ToxotesError::Validation`] if the result breaks an invariant.
    pub fn build(self) -> Result<Thing, ToxotesError> {
        let unique_id = self.unique_id.unwrap_or_default();
        let thing = Thing {
            host_id: self.host_id.unwrap_or_else(|| unique_id.clone()),
            friendly_name: self.friendly_name.unwrap_or_default(),
            unique_id,
            under_manual_control: self.under_manual_control,
            manual_control_for: self
                .manual_control_for
                .unwrap_or(DEFAULT_MANUAL_CONTROL_FOR),
            current_value: self.current_value,
            automatic_command: self.automatic_command,
            automatic_retain: self.automatic_retain,
            automatic_qos: self.automatic_qos,
            show_automatic_control: self.show_automatic_control,
        };
        thing.validate()?;
        Ok(thing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn at() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn should_build_thing_with_defaults() {
        let thing = Thing::builder()
            .unique_id("relay_ABCDEF")
            .friendly_name("Porch")
            .build()
            .unwrap();
        assert_eq!(thing.host_id, "relay_ABCDEF");
        assert_eq!(thing.manual_control_for, DEFAULT_MANUAL_CONTROL_FOR);
        assert_eq!(thing.automatic_qos, Qos::ExactlyOnce);
        assert!(thing.automatic_command.is_none());
    }

    #[test]
    fn should_reject_missing_unique_id() {
        let result = Thing::builder().host_id("tasmota_1").build();
        assert!(matches!(
            result,
            Err(ToxotesError::Validation(ValidationError::EmptyUniqueId))
        ));
    }

    #[test]
    fn should_reject_zero_minute_manual_window() {
        let result = Thing::builder()
            .unique_id("relay_1")
            .manual_control_for(0)
            .build();
        assert!(matches!(
            result,
            Err(ToxotesError::Validation(ValidationError::InvalidManualWindow))
        ));
    }

    #[test]
    fn should_report_manual_control_only_while_window_is_open() {
        let open = Thing::builder()
            .unique_id("relay_1")
            .under_manual_control(at() + Duration::minutes(5))
            .build()
            .unwrap();
        let lapsed = Thing::builder()
            .unique_id("relay_2")
            .under_manual_control(at() - Duration::minutes(5))
            .build()
            .unwrap();
        let never = Thing::builder().unique_id("relay_3").build().unwrap();

        assert!(open.is_under_manual_control(at()));
        assert!(!lapsed.is_under_manual_control(at()));
        assert!(!never.is_under_manual_control(at()));
    }

    #[test]
    fn should_treat_window_ending_exactly_now_as_closed() {
        let thing = Thing::builder()
            .unique_id("relay_1")
            .under_manual_control(at())
            .build()
            .unwrap();
        assert!(!thing.is_under_manual_control(at()));
    }
}
