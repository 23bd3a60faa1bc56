//! Color measurement and transfer: channel statistics, LAB conversion, and
//! the reference-to-source moment-matching transfer itself.

pub mod clahe;
pub mod lab;
pub mod stats;
pub mod transfer;
