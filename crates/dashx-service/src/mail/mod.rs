//! Transactional mail: message rendering and delivery adapters.

pub mod adapter;
pub mod service;

pub use adapter::{HttpMailAdapter, LogMailAdapter, MailAdapter, MailMessage, SmtpMailAdapter};
pub use service::MailService;
