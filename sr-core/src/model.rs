//! Scan result types produced by the collectors and consumed by the scorer.
//!
//! Every type here is a plain immutable value: collectors build one, the
//! calculator reads it, nothing mutates it afterwards. Serialization follows
//! the engine's JSON boundary (camelCase field names).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Signals gathered from a code-hosting repository (Track A).
///
/// All fields are always present; a collector that fails to fetch an
/// individual signal fills in the neutral default for that field instead of
/// failing the whole scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubScanResult {
    pub owner: String,
    pub repo: String,
    pub stars: i64,
    pub forks: i64,
    /// Branch-tip commit timestamp; `None` when unknown.
    pub last_commit_date: Option<DateTime<Utc>>,
    pub has_license: bool,
    pub has_openapi: bool,
    pub has_dockerfile: bool,
    pub has_manifest: bool,
    /// README length in lines.
    pub readme_length: usize,
    pub has_usage_code_block: bool,
    pub has_mcp: bool,
    pub has_standard_interface: bool,
    pub homepage: Option<String>,
    pub description: String,
    pub topics: Vec<String>,
}

impl GitHubScanResult {
    /// A result carrying only identity, with every signal at its neutral
    /// default. Collectors start from this and fill in what they can fetch.
    pub fn empty(owner: &str, repo: &str) -> Self {
        Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            stars: 0,
            forks: 0,
            last_commit_date: None,
            has_license: false,
            has_openapi: false,
            has_dockerfile: false,
            has_manifest: false,
            readme_length: 0,
            has_usage_code_block: false,
            has_mcp: false,
            has_standard_interface: false,
            homepage: None,
            description: String::new(),
            topics: Vec::new(),
        }
    }
}

/// Signals extracted from a hosted site's rendered HTML (Track B).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaasScanResult {
    pub https_valid: bool,
    /// Remaining TLS certificate validity in whole months, 0 when unknown.
    pub ssl_valid_months: u32,
    /// Social-platform links, deduplicated by full href.
    pub social_links: Vec<String>,
    pub has_json_ld: bool,
    /// First JSON-LD block that parsed successfully, if any.
    pub json_ld_content: Option<serde_json::Value>,
    pub has_basic_meta: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub has_h1: bool,
    pub has_og_tags: bool,
    pub og_title: Option<String>,
    pub og_image: Option<String>,
    pub has_api_docs_path: bool,
    pub api_docs_url: Option<String>,
    pub has_integration_keywords: bool,
    pub integration_keywords: Vec<String>,
    pub has_login_button: bool,
    /// Extracted page text, used for keyword scans.
    pub page_content: String,
}

impl SaasScanResult {
    /// All signals at their negative default.
    pub fn empty() -> Self {
        Self {
            https_valid: false,
            ssl_valid_months: 0,
            social_links: Vec::new(),
            has_json_ld: false,
            json_ld_content: None,
            has_basic_meta: false,
            meta_title: None,
            meta_description: None,
            has_h1: false,
            has_og_tags: false,
            og_title: None,
            og_image: None,
            has_api_docs_path: false,
            api_docs_url: None,
            has_integration_keywords: false,
            integration_keywords: Vec::new(),
            has_login_button: false,
            page_content: String::new(),
        }
    }
}

/// Letter tier derived from the rounded final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    S,
    A,
    B,
    C,
}

/// Which data tracks contributed to a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Track {
    OpenSource,
    SaaS,
    Hybrid,
}

/// Per-axis sub-scores. Axes from a track that did not apply are omitted
/// from the serialized breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrScoreBreakdown {
    // Track A axes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stars_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forks_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vitality_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_score: Option<f64>,
    // Track B axes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aeo_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interop_score: Option<f64>,
}

/// The engine's sole output: one comparable score plus its derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrResult {
    /// Track A total, 0 when no repository data was available.
    pub score_a: f64,
    /// Track B total, 0 when no site data was available.
    pub score_b: f64,
    /// Merged score, rounded to exactly one decimal.
    pub final_score: f64,
    pub tier: Tier,
    pub track: Track,
    pub breakdown: SrScoreBreakdown,
}

/// The tracks available for one scoring run.
///
/// A sum type rather than a pair of options so the merge branch in the
/// calculator is exhaustive: there is no representable "neither track" state.
#[derive(Debug, Clone)]
pub enum ScanInputs {
    OpenSource(GitHubScanResult),
    Saas(SaasScanResult),
    Hybrid(GitHubScanResult, SaasScanResult),
}

impl ScanInputs {
    /// Combine optional per-track results. `None` when both are absent,
    /// which callers must treat as an input error upstream of scoring.
    pub fn from_tracks(
        github: Option<GitHubScanResult>,
        saas: Option<SaasScanResult>,
    ) -> Option<Self> {
        match (github, saas) {
            (Some(g), Some(s)) => Some(Self::Hybrid(g, s)),
            (Some(g), None) => Some(Self::OpenSource(g)),
            (None, Some(s)) => Some(Self::Saas(s)),
            (None, None) => None,
        }
    }

    pub fn track(&self) -> Track {
        match self {
            Self::OpenSource(_) => Track::OpenSource,
            Self::Saas(_) => Track::SaaS,
            Self::Hybrid(..) => Track::Hybrid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tracks_exhaustive() {
        let g = GitHubScanResult::empty("acme", "agent");
        let s = SaasScanResult::empty();

        assert!(matches!(
            ScanInputs::from_tracks(Some(g.clone()), Some(s.clone())),
            Some(ScanInputs::Hybrid(..))
        ));
        assert!(matches!(
            ScanInputs::from_tracks(Some(g), None),
            Some(ScanInputs::OpenSource(_))
        ));
        assert!(matches!(
            ScanInputs::from_tracks(None, Some(s)),
            Some(ScanInputs::Saas(_))
        ));
        assert!(ScanInputs::from_tracks(None, None).is_none());
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = SrResult {
            score_a: 8.5,
            score_b: 0.0,
            final_score: 8.5,
            tier: Tier::A,
            track: Track::OpenSource,
            breakdown: SrScoreBreakdown {
                stars_score: Some(1.5),
                ..Default::default()
            },
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["scoreA"], 8.5);
        assert_eq!(json["finalScore"], 8.5);
        assert_eq!(json["tier"], "A");
        assert_eq!(json["track"], "OpenSource");
        assert_eq!(json["breakdown"]["starsScore"], 1.5);
        // Axes that did not apply are omitted entirely
        assert!(json["breakdown"].get("trustScore").is_none());
    }
}
