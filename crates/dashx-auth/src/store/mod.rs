//! Key-value records owned by the auth layer.

pub mod pre_user;
pub mod token;
pub mod user_action;

pub use pre_user::PreUserStore;
pub use token::TokenStore;
pub use user_action::{UserAction, UserActionStore};
