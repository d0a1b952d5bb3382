//! Persistence ports for the ClipRank backend.
//!
//! This crate provides:
//! - The store traits the services are written against
//! - `MemoryStore`, the in-process implementation backing tests and local
//!   runs (deployment adapters live outside this repository)
//! - Clip list ordering shared by every implementation

pub mod error;
pub mod memory;
pub mod repos;
pub mod sorting;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use repos::{ClipStore, MediaStore, SegmentStore, Store, TranscriptStore};
pub use sorting::sort_clips_for_listing;
