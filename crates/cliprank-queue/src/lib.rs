//! Render job queue boundary.
//!
//! This crate provides:
//! - The `RenderQueue` trait with at-least-once `enqueue_unique` semantics
//! - A Redis Streams implementation with dedup keys
//! - An in-process queue for tests and local runs

pub mod error;
pub mod job;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use job::{JobId, RenderClipJob, RENDER_CLIP_JOB_TYPE};
pub use queue::{MemoryQueue, QueueConfig, RedisQueue, RenderQueue};
