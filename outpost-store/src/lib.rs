// #![warn(missing_docs)]
//! Traits and errors for versioned cache store interaction.
//!
//! If you want to keep generations somewhere other than memory, you are in
//! the right place: implement [`CacheStore`] and [`CacheGeneration`] and the
//! policy, the lifecycle and [`PopulateExt::populate`] work on top of it.
mod error;
mod populate;
mod store;

pub use error::{PopulationError, StoreError};
pub use populate::PopulateExt;
pub use store::{CacheGeneration, CacheStore, StoreResult};

/// Status of deleting result.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Record successfully deleted.
    Deleted(u32),
    /// Record already missing.
    Missing,
}
