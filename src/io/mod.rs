//! Filesystem output.

pub mod writer;

pub use writer::{OutputWriter, WriteStatistics};
