//! Signal Rank Core - Scan result model and pure scoring rules
//!
//! This crate provides the foundational pieces:
//! - Per-track scan result types (repository and site signals)
//! - The scoring table: per-axis sub-scores, hybrid merge, rounding, tiers
//! - The `ScanInputs` sum type joining the two optional data tracks
//!
//! Nothing here performs I/O; collectors live in `sr-collectors` and the
//! orchestration in `sr-engine`.

pub mod model;
pub mod score;

pub use model::*;
pub use score::*;
