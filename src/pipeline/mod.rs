//! Image normalization and model-facing plumbing.

pub mod gemini_types;
pub mod normalize;
pub mod prompt;
pub mod reply;
pub mod vision;

pub use normalize::*;
pub use prompt::*;
pub use reply::*;
pub use vision::*;
