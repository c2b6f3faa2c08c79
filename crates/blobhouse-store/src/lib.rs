//! BlobHouse Store Layer
//!
//! This crate implements the store-side lifecycle machinery for BlobHouse -
//! today, that means compaction: deciding when a store's on-disk log has
//! accumulated enough deleted and expired data to be worth rewriting, and
//! running those rewrites in the background without getting in the way of
//! foreground reads and writes.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌────────────────────────── mount point /mnt/0 ──────────────────────────┐
//! │                                                                        │
//! │  ┌───────────────────┐      one thread per mount point                 │
//! │  │ CompactionManager │──────────────┐                                  │
//! │  └───────────────────┘              ▼                                  │
//! │                         ┌─────────────────────┐                        │
//! │                         │ scheduler thread    │                        │
//! │                         │  resume leftovers   │                        │
//! │                         │  ┌───────────────┐  │   compact(details)     │
//! │                         │  │ for each store│──┼──────────────┐         │
//! │                         │  └───────────────┘  │              ▼         │
//! │                         │  park until next    │      ┌─────────────┐   │
//! │                         │  pass or disable()  │      │  BlobStore  │   │
//! │                         └─────────────────────┘      │ (trait impl)│   │
//! │                                                      └─────────────┘   │
//! └────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Main Components
//!
//! ### CompactionManager
//! One per mount point. Owns the scheduler thread, answers eligibility
//! queries, and provides the enable/disable/await-termination lifecycle.
//!
//! ### BlobStore
//! The trait a store implementation provides so the manager can ask about
//! capacity and journal state and hand it work.
//!
//! ### CompactionDetails
//! The work order a single compaction run receives: the retention cutoff
//! and the log segments to rewrite.
//!
//! ## Quick Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use blobhouse_store::{BlobStore, CompactionConfig, CompactionManager};
//!
//! # fn stores() -> Vec<Arc<dyn BlobStore>> { vec![] }
//! let config = CompactionConfig {
//!     enabled: true,
//!     ..CompactionConfig::default()
//! };
//! let manager = CompactionManager::new("/mnt/0", config, stores());
//! manager.enable();
//! // ... serve traffic ...
//! manager.disable();
//! manager.await_termination();
//! ```

pub mod compaction;
pub mod config;
pub mod error;
pub mod store;

pub use compaction::CompactionManager;
pub use config::CompactionConfig;
pub use error::{Result, StoreError};
pub use store::{BlobStore, CompactionDetails};
