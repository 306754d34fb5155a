//! # toxotes-domain
//!
//! Pure domain model for the toxotes relay controller.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps, power states, qos
//! - Define **Things** (persisted relays, possibly sharing a friendly name)
//! - Normalize inbound messages into **Relay commands**
//! - **Arbitrate** automatic against manual control
//! - **Reconcile** a command into row updates and hardware publishes
//! - Summarize an invocation as a **display status**
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod arbiter;
pub mod command;
pub mod power;
pub mod qos;
pub mod reconcile;
pub mod status;
pub mod thing;
