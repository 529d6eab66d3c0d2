//! Devices and the controls rendered on them.

pub mod control;
pub mod service;

pub use control::DeviceControlService;
pub use service::DeviceService;
