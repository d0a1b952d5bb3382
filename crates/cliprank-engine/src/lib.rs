//! Clip candidate detection and recommendation engine.
//!
//! The engine is pure, synchronous and CPU-bound: it turns a word-level
//! transcript plus acoustic silence cues into a small, ranked,
//! non-overlapping set of clip windows. No I/O, no clock reads, no
//! randomness; identical inputs always produce identical output.
//!
//! Two phases share the selector but deliberately not the scorer:
//! - **Detection** enumerates sentence-pair windows and scores them with the
//!   length-bell heuristic ([`heuristic`]), persisting the winners as
//!   segments.
//! - **Recommendation** expands persisted segments (or tiles the timeline)
//!   into windows and scores them from word-level features ([`features`]).

pub mod config;
pub mod features;
pub mod generate;
pub mod heuristic;
pub mod keywords;
pub mod segmenter;
pub mod select;
pub mod snap;
pub mod window;

pub use config::{DetectionConfig, ScoreWeights, SelectorConfig, WindowBounds};
pub use features::{extract_features, score_features, WindowFeatures};
pub use generate::{generate_anchored, generate_sliding};
pub use heuristic::{score_window, HeuristicInput, ScoreBreakdown};
pub use keywords::derive_boost_keywords;
pub use segmenter::{segment_sentences, SentenceSpan};
pub use select::select_top;
pub use snap::SilenceIndex;
pub use window::{ScoredWindow, Window};
