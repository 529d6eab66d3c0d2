//! MQTT broker profiles and their encrypted credentials.

pub mod service;

pub use service::BrokerService;
