//! Integration tests driving the full router against in-memory stores.

mod helpers;

mod auth_test;
mod events_test;
mod resources_test;
