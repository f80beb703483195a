//! Unified error types for the chordslide library.
//!
//! Structural failures that prevent establishing a valid traversal order
//! abort the whole operation and surface through [`Error`]. Per-slide
//! failures during traversal never appear here; they are collected as
//! warnings on the annotation report instead.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
