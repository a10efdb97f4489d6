//! Signal Rank Engine
//!
//! Ties the collectors and the calculator together: request validation,
//! concurrent per-track collection, the degradation policy, and the final
//! scoring pass. Callers hand in an identifier, they get back one
//! [`sr_core::SrResult`].

pub mod engine;

pub use engine::*;
