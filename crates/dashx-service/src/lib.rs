//! # dashx-service
//!
//! Business logic service layer for DashboardX. Each service orchestrates
//! repositories, the token service, mail delivery and the event registry
//! to implement one area of the API.
//!
//! Services follow constructor injection: repositories arrive as
//! `Arc<dyn Trait>` so tests can swap in the in-memory implementations.

pub mod broker;
pub mod device;
pub mod mail;
pub mod seed;
pub mod user;

pub use broker::BrokerService;
pub use device::{DeviceControlService, DeviceService};
pub use mail::{
    HttpMailAdapter, LogMailAdapter, MailAdapter, MailMessage, MailService, SmtpMailAdapter,
};
pub use seed::{SeedReport, seed_demo_data};
pub use user::{NewUser, UserService};
