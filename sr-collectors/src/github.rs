//! GitHub signal collector
//!
//! Gathers Track A signals for one repository from the code-hosting REST API:
//! metadata, branch-tip commit recency, root directory listing, and README
//! text. The metadata fetch is the hard prerequisite; the three follow-up
//! fetches run concurrently once the default branch is known, and each one
//! degrades to neutral defaults if its retries exhaust.

use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, info};

use sr_core::GitHubScanResult;
use sr_net::{create_api_client, with_retry, FetchError, HttpConfig, NetError, RetryPolicy};

/// MCP-protocol mentions, matched case-insensitively as substrings over
/// description + README + topics.
pub const MCP_KEYWORDS: &[&str] = &[
    "mcp",
    "model context protocol",
    "mcp server",
    "mcp-server",
    "modelcontextprotocol",
];

/// Known agent framework / SDK names. Illustrative rather than exhaustive;
/// kept as one auditable constant.
pub const FRAMEWORK_KEYWORDS: &[&str] = &[
    "langchain",
    "langgraph",
    "llamaindex",
    "llama-index",
    "autogen",
    "crewai",
    "semantic kernel",
    "semantic-kernel",
    "openai sdk",
    "vercel ai sdk",
    "haystack",
    "smolagents",
];

/// Usage-intent phrases a README must carry (alongside a fenced code block)
/// to count as usage-quality documentation.
pub const USAGE_KEYWORDS: &[&str] = &[
    "usage",
    "example",
    "getting started",
    "quick start",
    "how to use",
    "installation",
];

/// API spec filenames tested case-insensitively at the repository root.
pub const OPENAPI_FILES: &[&str] = &[
    "openapi.yaml",
    "openapi.yml",
    "openapi.json",
    "swagger.yaml",
    "swagger.yml",
    "swagger.json",
];

/// Manifest/package filenames tested case-insensitively at the root.
pub const MANIFEST_FILES: &[&str] = &[
    "package.json",
    "cargo.toml",
    "pyproject.toml",
    "setup.py",
    "go.mod",
    "pom.xml",
    "manifest.json",
    "agent.json",
];

/// Container filenames tested case-insensitively at the root.
pub const DOCKER_FILES: &[&str] = &[
    "dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

/// Collector configuration
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// Personal access token (optional, raises the rate limit)
    pub token: Option<String>,
    /// REST API base URL
    pub api_base: String,
    pub http: HttpConfig,
    pub retry: RetryPolicy,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: std::env::var("GITHUB_TOKEN").ok(),
            api_base: "https://api.github.com".to_string(),
            http: HttpConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Collector for repository signals
pub struct GitHubCollector {
    client: Client,
    token: Option<String>,
    api_base: String,
    policy: RetryPolicy,
}

impl GitHubCollector {
    pub fn new(config: GitHubConfig) -> Result<Self, NetError> {
        Ok(Self {
            client: create_api_client(&config.http)?,
            token: config.token,
            api_base: config.api_base,
            policy: config.retry,
        })
    }

    /// Scan one repository. `Ok(None)` means the repository does not exist;
    /// any other exhausted failure of the metadata fetch is an error.
    pub async fn scan(
        &self,
        owner: &str,
        repo: &str,
        deadline: Option<Instant>,
    ) -> Result<Option<GitHubScanResult>, NetError> {
        let meta: RepoMeta = match self
            .get_json(&format!("/repos/{owner}/{repo}"), deadline)
            .await
        {
            Ok(meta) => meta,
            Err(NetError::NotFound) => {
                info!("Repository {}/{} not found", owner, repo);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let branch = meta.default_branch.clone();
        let (commit, listing, readme) = tokio::join!(
            self.fetch_tip_commit(owner, repo, &branch, deadline),
            self.fetch_root_listing(owner, repo, deadline),
            self.fetch_readme(owner, repo, deadline),
        );

        // Branch-tip commit dates are more trustworthy than repo-level
        // pushed_at, which is the degraded fallback.
        let last_commit_date = match degrade(commit, "tip commit")? {
            Some(date) => Some(date),
            None => meta.pushed_at,
        };

        let root_names = degrade(listing, "root listing")?.unwrap_or_default();
        let (has_openapi, has_manifest, has_dockerfile) = match_root_files(&root_names);

        let readme_text = degrade(readme, "readme")?.unwrap_or_default();
        let readme_length = if readme_text.is_empty() {
            0
        } else {
            readme_text.lines().count()
        };
        let has_usage_code_block = readme_usage_quality(&readme_text);

        let description = meta.description.unwrap_or_default();
        let haystack = format!(
            "{} {} {}",
            description,
            readme_text,
            meta.topics.join(" ")
        )
        .to_lowercase();
        let has_mcp = contains_any(&haystack, MCP_KEYWORDS);
        let has_standard_interface = contains_any(&haystack, FRAMEWORK_KEYWORDS);

        debug!(
            "Scanned {}/{}: {} stars, {} forks, mcp={}",
            owner, repo, meta.stargazers_count, meta.forks_count, has_mcp
        );

        Ok(Some(GitHubScanResult {
            owner: owner.to_string(),
            repo: repo.to_string(),
            stars: meta.stargazers_count,
            forks: meta.forks_count,
            last_commit_date,
            has_license: meta.license.is_some(),
            has_openapi,
            has_dockerfile,
            has_manifest,
            readme_length,
            has_usage_code_block,
            has_mcp,
            has_standard_interface,
            homepage: meta.homepage.filter(|h| !h.is_empty()),
            description,
            topics: meta.topics,
        }))
    }

    async fn fetch_tip_commit(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        deadline: Option<Instant>,
    ) -> Result<DateTime<Utc>, NetError> {
        let commit: CommitInfo = self
            .get_json(&format!("/repos/{owner}/{repo}/commits/{branch}"), deadline)
            .await?;
        commit
            .commit
            .committer
            .map(|c| c.date)
            .ok_or(NetError::NotFound)
    }

    async fn fetch_root_listing(
        &self,
        owner: &str,
        repo: &str,
        deadline: Option<Instant>,
    ) -> Result<Vec<String>, NetError> {
        let entries: Vec<RootEntry> = self
            .get_json(&format!("/repos/{owner}/{repo}/contents/"), deadline)
            .await?;
        Ok(entries
            .into_iter()
            .filter(|e| e.kind == "file")
            .map(|e| e.name)
            .collect())
    }

    async fn fetch_readme(
        &self,
        owner: &str,
        repo: &str,
        deadline: Option<Instant>,
    ) -> Result<String, NetError> {
        let payload: ReadmePayload = self
            .get_json(&format!("/repos/{owner}/{repo}/readme"), deadline)
            .await?;
        Ok(decode_readme(&payload.content).unwrap_or_default())
    }

    /// One GET against the API with retry, rate-limit waits, and JSON
    /// deserialization.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        deadline: Option<Instant>,
    ) -> Result<T, NetError> {
        let url = format!("{}{}", self.api_base, path);

        with_retry(&self.policy, deadline, path, || {
            let url = url.clone();
            async move {
                let mut request = self
                    .client
                    .get(&url)
                    .header("Accept", "application/vnd.github.v3+json");
                if let Some(token) = &self.token {
                    request = request.bearer_auth(token);
                }

                let response = request
                    .send()
                    .await
                    .map_err(|e| FetchError::Transient(e.to_string()))?;

                let status = response.status();
                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(FetchError::NotFound);
                }
                if status == reqwest::StatusCode::FORBIDDEN && quota_exhausted(&response) {
                    return Err(FetchError::RateLimited {
                        reset_at: quota_reset(&response),
                    });
                }
                if !status.is_success() {
                    return Err(FetchError::Transient(format!("status {status}")));
                }

                response
                    .json::<T>()
                    .await
                    .map_err(|e| FetchError::Transient(e.to_string()))
            }
        })
        .await
    }
}

/// Map a degraded sub-fetch to `None` instead of failing the scan. A
/// deadline hit is the one failure that still propagates, so callers never
/// receive silently partial data on timeout.
fn degrade<T>(result: Result<T, NetError>, what: &str) -> Result<Option<T>, NetError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(NetError::DeadlineExceeded) => Err(NetError::DeadlineExceeded),
        Err(e) => {
            debug!("{} degraded to default: {}", what, e);
            Ok(None)
        }
    }
}

fn quota_exhausted(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "0")
}

fn quota_reset(response: &reqwest::Response) -> Option<DateTime<Utc>> {
    let epoch = response
        .headers()
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())?
        .parse::<i64>()
        .ok()?;
    Utc.timestamp_opt(epoch, 0).single()
}

/// Case-insensitive membership of root filenames against the three fixed
/// candidate sets: (openapi, manifest, dockerfile).
fn match_root_files(names: &[String]) -> (bool, bool, bool) {
    let lowered: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
    let any_in = |set: &[&str]| lowered.iter().any(|n| set.contains(&n.as_str()));
    (
        any_in(OPENAPI_FILES),
        any_in(MANIFEST_FILES),
        any_in(DOCKER_FILES),
    )
}

/// Usage quality requires both a fenced code block and a usage-intent
/// keyword.
fn readme_usage_quality(readme: &str) -> bool {
    let has_fenced_block = readme.matches("```").count() >= 2;
    has_fenced_block && contains_any(&readme.to_lowercase(), USAGE_KEYWORDS)
}

fn contains_any(haystack_lower: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack_lower.contains(n))
}

/// Decode the API's base64 README payload (newline-chunked).
fn decode_readme(content: &str) -> Option<String> {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

// REST API response shapes; only the fields the collector reads.
#[derive(Debug, Deserialize)]
struct RepoMeta {
    stargazers_count: i64,
    forks_count: i64,
    #[serde(default)]
    license: Option<LicenseInfo>,
    #[serde(default)]
    homepage: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    default_branch: String,
    #[serde(default)]
    pushed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct LicenseInfo {
    #[serde(default)]
    #[allow(dead_code)]
    spdx_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitInfo {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    #[serde(default)]
    committer: Option<CommitSignature>,
}

#[derive(Debug, Deserialize)]
struct CommitSignature {
    date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct RootEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ReadmePayload {
    content: String,
}
