//! Signal Rank Collectors
//!
//! The two untrusted data sources feeding the scorer:
//! - **GitHubCollector**: repository metadata, commit recency, root listing,
//!   and README signals via the code-hosting REST API
//! - **SiteCollector**: transport, structured-data, meta, and interop
//!   signals scraped from one page of rendered HTML
//!
//! Each collector owns the fixed keyword/filename/domain tables it scores
//! against, so the scoring rules stay auditable in one place per signal.

pub mod github;
pub mod site;

pub use github::*;
pub use site::*;
