//! # toxotes-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ThingRepository` — resolve things and commit update batches
//!   - `CommandPublisher` — hand relay commands to the broker
//!   - `StatusReporter` — show the outcome of the last invocation
//! - Define the **driving/inbound** use-case: `RelayService`
//! - Provide **in-process infrastructure** (status board) that doesn't need IO
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `toxotes-domain` only (plus `tokio::sync` and `futures`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
pub mod status_board;
