//! Request handlers.

pub mod health;
pub mod media;
pub mod recommendations;

pub use health::*;
pub use media::*;
pub use recommendations::*;
