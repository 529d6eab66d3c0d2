//! # dashx-realtime
//!
//! In-process fan-out of change notifications to every open event stream
//! of a user.
//!
//! - [`EventRegistry`]: user → open channels, with subscribe, targeted or
//!   broadcast publish and unsubscribe-with-cleanup
//! - [`Subscription`]: the receiving end of one channel; unsubscribes on drop
//! - [`stream::subscription_stream`]: adapts a subscription into a stream
//!   that ends on a logout signal

pub mod publish;
pub mod registry;
pub mod stream;

pub use registry::{EventRegistry, Subscription};
