//! Business services.

pub mod detection;
pub mod recommendation;
pub mod silence;

pub use detection::DetectionService;
pub use recommendation::RecommendationService;
pub use silence::{NoopSilenceDetector, SilenceDetectError, SilenceDetector};
