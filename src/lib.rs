//! Tonematch - library crate.
//!
//! Reference-based color grading: channel-statistics transfer from a
//! reference image onto a source image, plus the post-transfer adjustment
//! pipeline and the session state that sequences them.

pub mod adjust;
pub mod color;
pub mod error;
pub mod image_io;
pub mod pipeline;
pub mod session;
