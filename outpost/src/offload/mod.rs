//! Offload manager for background task execution.
//!
//! Background work of the interception policy runs here: writing a copy of a
//! network response after it was returned to the page, and the network half
//! of Stale-While-Revalidate, which keeps running after the cached entry was
//! served.
//!
//! # Example
//!
//! ```ignore
//! use outpost::offload::{OffloadManager, OffloadConfig};
//!
//! let manager = OffloadManager::new(OffloadConfig::default());
//!
//! manager.spawn("store", async {
//!     // Cache write here
//! });
//! ```

mod manager;
mod policy;

pub use manager::{OffloadHandle, OffloadKey, OffloadManager};
pub use policy::{OffloadConfig, OffloadConfigBuilder, TimeoutPolicy};
pub use smol_str::SmolStr;
