//! Signal Rank CLI
//!
//! Scores one entity from its repository identifier and/or site URL and
//! prints the result as JSON.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use sr_collectors::{GitHubConfig, SiteConfig};
use sr_engine::{EngineConfig, ScanRequest, SrEngine};

#[derive(Parser)]
#[command(name = "signal-rank")]
#[command(author, version, about = "Score an agent repository and/or SaaS site", long_about = None)]
struct Cli {
    /// Repository owner (use together with --repo)
    #[arg(long)]
    owner: Option<String>,

    /// Repository name
    #[arg(long)]
    repo: Option<String>,

    /// Site URL to scan
    #[arg(long)]
    url: Option<String>,

    /// Site ownership is externally verified
    #[arg(long)]
    claimed: bool,

    /// API token for the code-hosting service (raises the rate limit)
    #[arg(long, env = "GITHUB_TOKEN")]
    token: Option<String>,

    /// Overall scan timeout in seconds (0 = no deadline)
    #[arg(long, default_value = "60")]
    timeout: u64,

    /// Print compact JSON instead of pretty
    #[arg(long)]
    compact: bool,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1")]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let config = EngineConfig {
        github: GitHubConfig {
            token: cli.token.clone(),
            ..GitHubConfig::default()
        },
        site: SiteConfig::default(),
        scan_timeout: (cli.timeout > 0).then(|| Duration::from_secs(cli.timeout)),
    };

    let request = ScanRequest {
        repo_owner: cli.owner,
        repo_name: cli.repo,
        site_url: cli.url,
        is_claimed: cli.claimed,
    };

    let engine = SrEngine::new(config)?;
    let result = engine.scan(&request).await?;

    let json = if cli.compact {
        serde_json::to_string(&result)?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    println!("{json}");

    Ok(())
}
