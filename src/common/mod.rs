//! Common types and utilities shared across the crate.
//!
//! This module provides the unified error type used by the high-level
//! annotation and session APIs, so callers see one consistent taxonomy
//! regardless of which subsystem a failure originated in.

// Submodule declarations
pub mod error;

// Re-exports for convenience
pub use error::{Error, Result};
