//! # toxotes-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Accept relay commands as JSON (`POST /api/relay`)
//! - Expose the stored things (`GET /api/things`)
//! - Expose the latest display status, once (`GET /api/status`) or as a
//!   Server-Sent Events stream (`GET /api/status/stream`)
//! - Map application results and errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `toxotes-app` (for port traits and services) and `toxotes-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
