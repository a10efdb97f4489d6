//! Signal Rank Net Layer
//!
//! Shared HTTP plumbing for the collectors:
//! - Pooled `reqwest` clients (API calls and page fetches)
//! - Stateless retry policy with exponential backoff and rate-limit waits
//! - Deadline-aware backoff sleeps

pub mod client;
pub mod retry;

pub use client::*;
pub use retry::*;

use thiserror::Error;

/// Errors from the network layer
#[derive(Debug, Error)]
pub enum NetError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Target not found upstream")]
    NotFound,

    #[error("Retries exhausted after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("Deadline exceeded during backoff")]
    DeadlineExceeded,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
