//! Common utilities and types shared by the prefetch model.
//!
//! This module provides the fundamental building blocks used across the crate. It includes:
//! 1. **Address Types:** Strong types for byte addresses and cache-line indices.
//! 2. **Constants:** Engine-wide constants (request priority, histogram bucketing).
//! 3. **Error Handling:** Construction-time configuration errors.

/// Address type definitions (byte addresses and line indices).
pub mod addr;

/// Common constants used throughout the model.
pub mod constants;

/// Error types for configuration and construction.
pub mod error;

pub use addr::{Cycle, LineAddr};
pub use error::ConfigError;
