//! In-process key-value store.

mod store;

pub use store::MemoryCacheProvider;
