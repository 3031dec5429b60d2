#![warn(missing_docs)]
//! In-memory [`CacheStore`](outpost_store::CacheStore) built on Moka.
//!
//! Every generation is its own bounded `moka` cache; the store keeps the set
//! of generations and the order in which they were created.

mod builder;
mod store;
pub mod metrics;

pub use builder::{ByteCapacity, EntryCapacity, MokaStoreBuilder, NoCapacity};
pub use moka::policy::EvictionPolicy;
pub use store::{MokaGeneration, MokaStore};
