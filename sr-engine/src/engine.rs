//! Scan orchestration
//!
//! One `scan` call is one logical task: validate the request, fan out to
//! whichever collectors apply (concurrently when both do), join their
//! results, then hand the completed tracks to the pure calculator. Scoring
//! never starts until both applicable collectors have terminated.

use chrono::Utc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};

use sr_collectors::{GitHubCollector, GitHubConfig, SiteCollector, SiteConfig};
use sr_core::{calculate, GitHubScanResult, SaasScanResult, ScanInputs, SrResult};
use sr_net::NetError;

/// Errors surfaced to the engine's caller.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Neither a repository identifier nor a site URL was supplied")]
    InvalidInput,

    #[error("Repository not found")]
    RepoNotFound,

    #[error("Repository scan failed: {0}")]
    Github(#[source] NetError),

    #[error("Site scan failed: {0}")]
    Site(#[source] NetError),
}

/// What to scan. At least one of the repository pair or the site URL must
/// be present.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    pub repo_owner: Option<String>,
    pub repo_name: Option<String>,
    pub site_url: Option<String>,
    /// Externally-verified ownership; feeds the Track B trust axis.
    pub is_claimed: bool,
}

impl ScanRequest {
    /// The repository identifier, present only when both halves are.
    pub fn repo(&self) -> Option<(&str, &str)> {
        match (self.repo_owner.as_deref(), self.repo_name.as_deref()) {
            (Some(owner), Some(name)) => Some((owner, name)),
            _ => None,
        }
    }

    /// Rejects a request naming no target, before any network call.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.repo().is_none() && self.site_url.is_none() {
            return Err(EngineError::InvalidInput);
        }
        Ok(())
    }
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub github: GitHubConfig,
    pub site: SiteConfig,
    /// Per-scan deadline; backoff sleeps inside collectors abort when it
    /// fires. `None` disables the deadline.
    pub scan_timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            github: GitHubConfig::default(),
            site: SiteConfig::default(),
            scan_timeout: Some(Duration::from_secs(60)),
        }
    }
}

/// The scoring engine: collectors plus the pure calculator.
///
/// Holds no per-scan state; one instance serves many concurrent callers.
pub struct SrEngine {
    github: GitHubCollector,
    site: SiteCollector,
    scan_timeout: Option<Duration>,
}

impl SrEngine {
    pub fn new(config: EngineConfig) -> Result<Self, NetError> {
        Ok(Self {
            github: GitHubCollector::new(config.github)?,
            site: SiteCollector::new(config.site)?,
            scan_timeout: config.scan_timeout,
        })
    }

    /// Run one scan end to end and return the scored result.
    ///
    /// A failed track degrades to single-track scoring unless it was the
    /// only track requested, in which case its error surfaces.
    pub async fn scan(&self, request: &ScanRequest) -> Result<SrResult, EngineError> {
        request.validate()?;

        let deadline = self.scan_timeout.map(|t| Instant::now() + t);

        let github_fut = async {
            match request.repo() {
                Some((owner, name)) => Some(self.github.scan(owner, name, deadline).await),
                None => None,
            }
        };
        let site_fut = async {
            match request.site_url.as_deref() {
                Some(url) => Some(self.site.scan(url, deadline).await),
                None => None,
            }
        };

        let (github_outcome, site_outcome) = tokio::join!(github_fut, site_fut);

        let site_requested = request.site_url.is_some();
        let github_result: Option<GitHubScanResult> = match github_outcome {
            None => None,
            Some(Ok(found)) => {
                if found.is_none() && !site_requested {
                    return Err(EngineError::RepoNotFound);
                }
                found
            }
            Some(Err(e)) if !site_requested => return Err(EngineError::Github(e)),
            Some(Err(e)) => {
                warn!("Repository track failed, degrading to site-only: {}", e);
                None
            }
        };

        let site_result: Option<SaasScanResult> = match site_outcome {
            None => None,
            Some(Ok(result)) => Some(result),
            Some(Err(e)) if github_result.is_none() => return Err(EngineError::Site(e)),
            Some(Err(e)) => {
                warn!("Site track failed, degrading to repository-only: {}", e);
                None
            }
        };

        // Validation plus the degradation checks above guarantee at least
        // one track survives.
        let inputs = ScanInputs::from_tracks(github_result, site_result)
            .ok_or(EngineError::InvalidInput)?;

        let result = calculate(&inputs, request.is_claimed, Utc::now());
        info!(
            "Scored {:?} track: final {} tier {:?}",
            result.track, result.final_score, result.tier
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_request() {
        let request = ScanRequest::default();
        assert!(matches!(
            request.validate(),
            Err(EngineError::InvalidInput)
        ));
    }

    #[test]
    fn test_validate_requires_both_repo_halves() {
        let request = ScanRequest {
            repo_owner: Some("acme".to_string()),
            ..Default::default()
        };
        assert!(request.repo().is_none());
        assert!(request.validate().is_err());

        let request = ScanRequest {
            repo_owner: Some("acme".to_string()),
            repo_name: Some("agent".to_string()),
            ..Default::default()
        };
        assert_eq!(request.repo(), Some(("acme", "agent")));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_url_only() {
        let request = ScanRequest {
            site_url: Some("https://acme.example".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_ok());
    }

    #[tokio::test]
    async fn test_scan_rejects_empty_request_before_network() {
        let engine = SrEngine::new(EngineConfig::default()).unwrap();
        let result = engine.scan(&ScanRequest::default()).await;
        assert!(matches!(result, Err(EngineError::InvalidInput)));
    }
}
