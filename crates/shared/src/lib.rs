//! # Chessmind Shared
//!
//! Common types and interfaces used across all Chessmind crates.

pub mod chess;
pub mod config;
pub mod error;
pub mod ids;

// Re-exports
pub use chess::*;
pub use config::*;
pub use error::*;
pub use ids::*;
