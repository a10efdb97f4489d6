//! Pure scoring rules for Signal Rank.
//!
//! Everything in this module is a total function over its inputs: out-of-range
//! values clamp, absent signals contribute their worst case, and nothing here
//! performs I/O or holds state. Re-running any function on identical inputs
//! yields an identical result.
//!
//! Track A (repository) axes: stars, forks, vitality, readiness, protocol.
//! Track B (site) axes: trust, AEO, interop. When both tracks are present the
//! final score is the stronger track plus a fixed hybrid bonus, never a
//! weighted average.

use chrono::{DateTime, Utc};

use crate::model::{
    GitHubScanResult, SaasScanResult, ScanInputs, SrResult, SrScoreBreakdown, Tier,
};

/// Days within which the latest commit still counts as active.
pub const VITALITY_WINDOW_DAYS: i64 = 30;

/// README line count above which documentation earns readiness credit.
pub const README_DEPTH_THRESHOLD: usize = 200;

/// Fixed bonus for an entity present on both tracks.
pub const HYBRID_BONUS: f64 = 0.5;

/// Upper bound of every score in the system.
pub const MAX_SCORE: f64 = 10.0;

/// Step table on star count. Negative counts earn nothing.
pub fn calculate_stars_score(stars: i64) -> f64 {
    match stars {
        s if s >= 20_000 => 2.0,
        s if s >= 10_000 => 1.5,
        s if s >= 5_000 => 1.0,
        s if s >= 1_000 => 0.5,
        _ => 0.0,
    }
}

/// Full credit when the fork count outpaces a tenth of the star count.
/// A repo with no stars still earns it from any fork at all.
pub fn calculate_forks_score(stars: i64, forks: i64) -> f64 {
    let stars = stars.max(0);
    let forks = forks.max(0);

    let engaged = if stars == 0 {
        forks > 0
    } else {
        forks as f64 > stars as f64 * 0.1
    };

    if engaged {
        1.0
    } else {
        0.0
    }
}

/// Recency credit for a commit within the vitality window, plus license
/// credit. An unknown commit date earns no recency credit.
pub fn calculate_vitality_score(
    last_commit: Option<DateTime<Utc>>,
    has_license: bool,
    now: DateTime<Utc>,
) -> f64 {
    let mut score = 0.0;

    if let Some(date) = last_commit {
        if (now - date).num_days() <= VITALITY_WINDOW_DAYS {
            score += 1.0;
        }
    }

    if has_license {
        score += 1.0;
    }

    score
}

/// Machine-readiness: an API spec file, container support, and a README deep
/// enough to carry a real usage example.
pub fn calculate_readiness_score(
    has_openapi: bool,
    has_dockerfile: bool,
    readme_length: usize,
    has_usage_code_block: bool,
) -> f64 {
    let mut score = 0.0;

    if has_openapi {
        score += 1.5;
    }
    if has_dockerfile {
        score += 0.5;
    }
    if readme_length > README_DEPTH_THRESHOLD && has_usage_code_block {
        score += 1.0;
    }

    score
}

/// MCP support dominates: a repo that mentions MCP gets the full protocol
/// credit and the framework credit is not added on top.
pub fn calculate_protocol_score(has_mcp: bool, has_standard_interface: bool) -> f64 {
    if has_mcp {
        2.0
    } else if has_standard_interface {
        1.0
    } else {
        0.0
    }
}

/// Trust axis for a site: transport security, social presence, and
/// externally-verified ownership.
pub fn calculate_trust_score(r: &SaasScanResult, is_claimed: bool) -> f64 {
    let mut score = 0.0;

    if r.https_valid {
        score += 1.0;
    }
    if r.social_links.len() >= 2 {
        score += 1.0;
    }
    if is_claimed {
        score += 1.0;
    }

    score
}

/// Answer-engine optimization: how parseable the page is for automated
/// agents. JSON-LD carries the most weight.
pub fn calculate_aeo_score(r: &SaasScanResult) -> f64 {
    let mut score = 0.0;

    if r.has_basic_meta {
        score += 1.0;
    }
    if r.has_json_ld {
        score += 2.0;
    }
    if r.has_og_tags {
        score += 1.0;
    }

    score
}

/// Interoperability surface: published API docs, integration keywords, and a
/// product affordance for accounts.
pub fn calculate_interop_score(r: &SaasScanResult) -> f64 {
    let mut score = 0.0;

    if r.has_api_docs_path {
        score += 1.5;
    }
    if r.has_integration_keywords {
        score += 1.0;
    }
    if r.has_login_button {
        score += 0.5;
    }

    score
}

/// Fixed-bonus merge for entities present on both tracks. Always at least
/// `max(score_a, score_b)` and never above [`MAX_SCORE`].
pub fn calculate_hybrid_score(score_a: f64, score_b: f64) -> f64 {
    (score_a.max(score_b) + HYBRID_BONUS).min(MAX_SCORE)
}

/// Round-half-up to one decimal. Negative, NaN, or infinite input rounds
/// to zero.
pub fn round_score(score: f64) -> f64 {
    if !score.is_finite() || score < 0.0 {
        return 0.0;
    }
    (score * 10.0).round() / 10.0
}

/// Tier table over the rounded final score. Invalid scores land in the
/// bottom tier rather than erroring.
pub fn get_tier(rounded: f64) -> Tier {
    if !rounded.is_finite() {
        return Tier::C;
    }
    if rounded >= 9.0 {
        Tier::S
    } else if rounded >= 7.5 {
        Tier::A
    } else if rounded >= 5.0 {
        Tier::B
    } else {
        Tier::C
    }
}

/// Whether a score already lies in the valid range.
pub fn is_valid_score(score: f64) -> bool {
    (0.0..=MAX_SCORE).contains(&score)
}

/// Clamp into `[0, 10]`. Normalizing `-0.0` yields `+0.0`.
pub fn normalize_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    let clamped = score.clamp(0.0, MAX_SCORE);
    if clamped == 0.0 {
        0.0
    } else {
        clamped
    }
}

/// Track A total plus its per-axis breakdown.
pub fn score_track_a(r: &GitHubScanResult, now: DateTime<Utc>) -> (f64, SrScoreBreakdown) {
    let stars = calculate_stars_score(r.stars);
    let forks = calculate_forks_score(r.stars, r.forks);
    let vitality = calculate_vitality_score(r.last_commit_date, r.has_license, now);
    let readiness = calculate_readiness_score(
        r.has_openapi,
        r.has_dockerfile,
        r.readme_length,
        r.has_usage_code_block,
    );
    let protocol = calculate_protocol_score(r.has_mcp, r.has_standard_interface);

    let total = normalize_score(stars + forks + vitality + readiness + protocol);
    let breakdown = SrScoreBreakdown {
        stars_score: Some(stars),
        forks_score: Some(forks),
        vitality_score: Some(vitality),
        readiness_score: Some(readiness),
        protocol_score: Some(protocol),
        ..Default::default()
    };

    (total, breakdown)
}

/// Track B total plus its per-axis breakdown.
pub fn score_track_b(r: &SaasScanResult, is_claimed: bool) -> (f64, SrScoreBreakdown) {
    let trust = calculate_trust_score(r, is_claimed);
    let aeo = calculate_aeo_score(r);
    let interop = calculate_interop_score(r);

    let total = normalize_score(trust + aeo + interop);
    let breakdown = SrScoreBreakdown {
        trust_score: Some(trust),
        aeo_score: Some(aeo),
        interop_score: Some(interop),
        ..Default::default()
    };

    (total, breakdown)
}

fn merge_breakdowns(a: SrScoreBreakdown, b: SrScoreBreakdown) -> SrScoreBreakdown {
    SrScoreBreakdown {
        stars_score: a.stars_score.or(b.stars_score),
        forks_score: a.forks_score.or(b.forks_score),
        vitality_score: a.vitality_score.or(b.vitality_score),
        readiness_score: a.readiness_score.or(b.readiness_score),
        protocol_score: a.protocol_score.or(b.protocol_score),
        trust_score: b.trust_score.or(a.trust_score),
        aeo_score: b.aeo_score.or(a.aeo_score),
        interop_score: b.interop_score.or(a.interop_score),
    }
}

/// Score one entity from whichever tracks its scan produced.
///
/// `now` is threaded in explicitly so the calculation stays a pure function
/// of its arguments; callers pass `Utc::now()`.
pub fn calculate(inputs: &ScanInputs, is_claimed: bool, now: DateTime<Utc>) -> SrResult {
    let track = inputs.track();

    let (score_a, score_b, final_raw, breakdown) = match inputs {
        ScanInputs::OpenSource(g) => {
            let (a, bd) = score_track_a(g, now);
            (a, 0.0, a, bd)
        }
        ScanInputs::Saas(s) => {
            let (b, bd) = score_track_b(s, is_claimed);
            (0.0, b, b, bd)
        }
        ScanInputs::Hybrid(g, s) => {
            let (a, bd_a) = score_track_a(g, now);
            let (b, bd_b) = score_track_b(s, is_claimed);
            let merged = calculate_hybrid_score(a, b);
            (a, b, merged, merge_breakdowns(bd_a, bd_b))
        }
    };

    let final_score = round_score(final_raw);

    SrResult {
        score_a,
        score_b,
        final_score,
        tier: get_tier(final_score),
        track,
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::model::Track;

    fn days_ago(days: i64) -> DateTime<Utc> {
        Utc::now() - Duration::days(days)
    }

    #[test]
    fn test_stars_step_boundaries() {
        assert_eq!(calculate_stars_score(-5), 0.0);
        assert_eq!(calculate_stars_score(0), 0.0);
        assert_eq!(calculate_stars_score(999), 0.0);
        assert_eq!(calculate_stars_score(1_000), 0.5);
        assert_eq!(calculate_stars_score(4_999), 0.5);
        assert_eq!(calculate_stars_score(5_000), 1.0);
        assert_eq!(calculate_stars_score(9_999), 1.0);
        assert_eq!(calculate_stars_score(10_000), 1.5);
        assert_eq!(calculate_stars_score(19_999), 1.5);
        assert_eq!(calculate_stars_score(20_000), 2.0);
        assert_eq!(calculate_stars_score(1_000_000), 2.0);
    }

    #[test]
    fn test_forks_ratio() {
        // forks must strictly exceed a tenth of the stars
        assert_eq!(calculate_forks_score(1_000, 100), 0.0);
        assert_eq!(calculate_forks_score(1_000, 101), 1.0);
        assert_eq!(calculate_forks_score(15_000, 2_000), 1.0);
        // zero-star special case
        assert_eq!(calculate_forks_score(0, 0), 0.0);
        assert_eq!(calculate_forks_score(0, 1), 1.0);
        // negative inputs behave as zero
        assert_eq!(calculate_forks_score(-10, 1), 1.0);
        assert_eq!(calculate_forks_score(0, -1), 0.0);
    }

    #[test]
    fn test_vitality_window() {
        let now = Utc::now();
        let two_days = now - Duration::days(2);
        let thirty_one_days = now - Duration::days(31);
        assert_eq!(calculate_vitality_score(Some(two_days), false, now), 1.0);
        assert_eq!(calculate_vitality_score(Some(thirty_one_days), false, now), 0.0);
        assert_eq!(calculate_vitality_score(Some(thirty_one_days), true, now), 1.0);
        assert_eq!(calculate_vitality_score(Some(two_days), true, now), 2.0);
        assert_eq!(calculate_vitality_score(None, true, now), 1.0);
        assert_eq!(calculate_vitality_score(None, false, now), 0.0);
    }

    #[test]
    fn test_readiness_components() {
        assert_eq!(calculate_readiness_score(true, true, 300, true), 3.0);
        assert_eq!(calculate_readiness_score(true, false, 0, false), 1.5);
        assert_eq!(calculate_readiness_score(false, true, 0, false), 0.5);
        // both README depth and a usage block are required together
        assert_eq!(calculate_readiness_score(false, false, 300, false), 0.0);
        assert_eq!(calculate_readiness_score(false, false, 200, true), 0.0);
        assert_eq!(calculate_readiness_score(false, false, 201, true), 1.0);
    }

    #[test]
    fn test_protocol_precedence() {
        assert_eq!(calculate_protocol_score(true, true), 2.0);
        assert_eq!(calculate_protocol_score(true, false), 2.0);
        assert_eq!(calculate_protocol_score(false, true), 1.0);
        assert_eq!(calculate_protocol_score(false, false), 0.0);
    }

    #[test]
    fn test_hybrid_score_bounds() {
        assert_eq!(calculate_hybrid_score(8.5, 10.0), 10.0);
        assert_eq!(calculate_hybrid_score(7.0, 5.0), 7.5);
        assert_eq!(calculate_hybrid_score(9.5, 0.0), 10.0);
        assert_eq!(calculate_hybrid_score(9.8, 9.7), 10.0);
        assert_eq!(calculate_hybrid_score(0.0, 0.0), 0.5);

        // bonus is exactly 0.5 anywhere below the cap
        for tenths in 0..=95 {
            let a = tenths as f64 / 10.0;
            let merged = calculate_hybrid_score(a, 0.0);
            assert!((merged - (a + 0.5)).abs() < 1e-9);
            assert!(merged >= a);
            assert!(merged <= MAX_SCORE);
        }
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_score(7.45), 7.5);
        assert_eq!(round_score(7.44), 7.4);
        assert_eq!(round_score(8.95), 9.0);
        assert_eq!(round_score(4.95), 5.0);
        assert_eq!(round_score(10.0), 10.0);
        assert_eq!(round_score(0.0), 0.0);
    }

    #[test]
    fn test_round_invalid_inputs() {
        assert_eq!(round_score(-1.2), 0.0);
        assert_eq!(round_score(f64::NAN), 0.0);
        assert_eq!(round_score(f64::INFINITY), 0.0);
        assert_eq!(round_score(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(get_tier(10.0), Tier::S);
        assert_eq!(get_tier(9.0), Tier::S);
        assert_eq!(get_tier(8.99), Tier::A);
        assert_eq!(get_tier(7.5), Tier::A);
        assert_eq!(get_tier(7.49), Tier::B);
        assert_eq!(get_tier(5.0), Tier::B);
        assert_eq!(get_tier(4.99), Tier::C);
        assert_eq!(get_tier(-3.0), Tier::C);
        assert_eq!(get_tier(f64::NAN), Tier::C);
        assert_eq!(get_tier(f64::INFINITY), Tier::C);
    }

    #[test]
    fn test_normalize_and_validity() {
        assert!(is_valid_score(0.0));
        assert!(is_valid_score(10.0));
        assert!(!is_valid_score(-0.1));
        assert!(!is_valid_score(10.1));
        assert!(!is_valid_score(f64::NAN));

        assert_eq!(normalize_score(12.0), 10.0);
        assert_eq!(normalize_score(-3.0), 0.0);
        assert_eq!(normalize_score(f64::NAN), 0.0);
        // -0.0 normalizes to +0.0
        assert!(normalize_score(-0.0).is_sign_positive());
    }

    fn strong_repo() -> GitHubScanResult {
        GitHubScanResult {
            stars: 15_000,
            forks: 2_000,
            last_commit_date: Some(days_ago(2)),
            has_license: true,
            has_openapi: true,
            has_dockerfile: true,
            has_manifest: true,
            readme_length: 300,
            has_usage_code_block: true,
            has_mcp: true,
            has_standard_interface: false,
            description: "An MCP server for things".to_string(),
            ..GitHubScanResult::empty("acme", "agent")
        }
    }

    fn strong_site() -> SaasScanResult {
        SaasScanResult {
            https_valid: true,
            social_links: vec![
                "https://x.com/acme".to_string(),
                "https://github.com/acme".to_string(),
                "https://discord.gg/acme".to_string(),
            ],
            has_json_ld: true,
            has_basic_meta: true,
            has_h1: true,
            has_og_tags: true,
            has_api_docs_path: true,
            has_integration_keywords: true,
            integration_keywords: vec!["webhook".to_string()],
            has_login_button: true,
            ..SaasScanResult::empty()
        }
    }

    #[test]
    fn test_strong_repo_scores_exactly() {
        let (total, bd) = score_track_a(&strong_repo(), Utc::now());

        assert_eq!(bd.stars_score, Some(1.5));
        assert_eq!(bd.forks_score, Some(1.0)); // 2000 > 1500
        assert_eq!(bd.vitality_score, Some(2.0));
        assert_eq!(bd.readiness_score, Some(3.0));
        assert_eq!(bd.protocol_score, Some(2.0));
        assert_eq!(total, 9.5);
    }

    #[test]
    fn test_strong_site_scores_perfect() {
        let (total, bd) = score_track_b(&strong_site(), true);

        assert_eq!(bd.trust_score, Some(3.0));
        assert_eq!(bd.aeo_score, Some(4.0));
        assert_eq!(bd.interop_score, Some(3.0));
        assert_eq!(total, 10.0);

        let result = calculate(&ScanInputs::Saas(strong_site()), true, Utc::now());
        assert_eq!(result.final_score, 10.0);
        assert_eq!(result.tier, Tier::S);
        assert_eq!(result.track, Track::SaaS);
        assert_eq!(result.score_a, 0.0);
    }

    #[test]
    fn test_hybrid_end_to_end() {
        let inputs = ScanInputs::Hybrid(strong_repo(), strong_site());
        let result = calculate(&inputs, true, Utc::now());

        assert_eq!(result.track, Track::Hybrid);
        assert_eq!(result.score_a, 9.5);
        assert_eq!(result.score_b, 10.0);
        assert_eq!(result.final_score, 10.0);
        assert_eq!(result.tier, Tier::S);
        // both tracks' axes survive into the merged breakdown
        assert_eq!(result.breakdown.protocol_score, Some(2.0));
        assert_eq!(result.breakdown.aeo_score, Some(4.0));
    }

    #[test]
    fn test_final_never_below_either_track() {
        let weak_repo = GitHubScanResult::empty("acme", "quiet");
        let inputs = ScanInputs::Hybrid(weak_repo, strong_site());
        let result = calculate(&inputs, false, Utc::now());

        assert!(result.final_score >= result.score_a);
        assert!(result.final_score >= result.score_b);
        assert!(result.final_score <= MAX_SCORE);
    }

    #[test]
    fn test_calculator_is_idempotent() {
        let inputs = ScanInputs::OpenSource(strong_repo());
        let now = Utc::now();
        let first = calculate(&inputs, false, now);
        let second = calculate(&inputs, false, now);
        assert_eq!(first, second);
    }
}
