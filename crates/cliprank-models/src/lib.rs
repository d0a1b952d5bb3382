//! Shared data models for the ClipRank backend.
//!
//! This crate provides Serde-serializable types for:
//! - The media aggregate and its detection lifecycle
//! - Transcript words and speaker turns
//! - Acoustic silence intervals
//! - Persisted detection segments and recommendation clips
//! - Render profiles and their canonical content hash
//! - Offset pagination for list endpoints

pub mod clip;
pub mod media;
pub mod page;
pub mod profile;
pub mod segment;
pub mod silence;
pub mod transcript;

// Re-export common types
pub use clip::{Clip, ClipStatus, ClipSummary};
pub use media::{Media, MediaId, MediaStatus};
pub use page::{Page, PageRequest};
pub use profile::{profile_hash, ProfileError, ProfileResult};
pub use segment::{window_key, MediaSegment};
pub use silence::SilenceInterval;
pub use transcript::{SpeakerTurn, Transcript, Word};
