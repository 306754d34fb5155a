//! # toxotes-adapter-mqtt
//!
//! MQTT adapter — hands relay commands to the broker.
//!
//! ## Responsibilities
//! - Connect to an MQTT broker and keep the connection alive
//! - Implement `CommandPublisher` from `toxotes-app::ports`
//! - Map domain QoS levels onto the client's
//!
//! ## Dependency rule
//! Same as other adapters: depends on `toxotes-app` and `toxotes-domain`.

pub mod config;
pub mod error;
pub mod publisher;

pub use config::MqttConfig;
pub use publisher::MqttCommandPublisher;
