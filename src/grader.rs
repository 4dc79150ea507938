use crate::http_client::{FetchError, HttpClient};
use crate::parser::{self, PageFacts, ParseError};
use serde::Serialize;
use url::Url;

const BASELINE: i32 = 100;
const SLOW_THRESHOLD_SECS: f64 = 1.2;
const PENALTY_SLOW: i32 = 30;
const PENALTY_NO_H1: i32 = 20;
const PENALTY_NO_META_DESCRIPTION: i32 = 15;
const PENALTY_MISSING_ALT: i32 = 10;

/// Result of grading a single website.
#[derive(Debug, Clone, Serialize)]
pub struct Audit {
    pub url: String,
    pub score: u8,
    /// Wall-clock duration of the request in seconds. Kept under the
    /// original tool's (loose) name for the latency signal.
    pub ttfb_secs: f64,
    pub status: u16,
    pub title: Option<String>,
    pub issues: Vec<String>,
}

/// Fetch a page and apply the fixed deduction table.
///
/// URLs without a scheme get `https://` prepended, matching how lead
/// lists usually carry bare domains.
pub async fn grade(client: &HttpClient, raw_url: &str) -> Result<Audit, GradeError> {
    let url = normalize_url(raw_url)?;

    let page = client.fetch(&url).await?;
    let ttfb_secs = page.elapsed.as_secs_f64();
    let facts = parser::extract_facts(&page.body)?;
    let (score, issues) = apply_deductions(&facts, ttfb_secs);

    Ok(Audit {
        url,
        score,
        ttfb_secs,
        status: page.status,
        title: facts.title,
        issues,
    })
}

/// The deduction table. This is the entire decision logic of the tool.
pub fn apply_deductions(facts: &PageFacts, ttfb_secs: f64) -> (u8, Vec<String>) {
    let mut score = BASELINE;
    let mut issues = Vec::new();

    if ttfb_secs > SLOW_THRESHOLD_SECS {
        score -= PENALTY_SLOW;
        issues.push(format!("Performance: {:.2}s load time.", ttfb_secs));
    }
    if facts.h1_count == 0 {
        score -= PENALTY_NO_H1;
        issues.push("SEO: no H1 heading found.".to_string());
    }
    if !facts.has_meta_description {
        score -= PENALTY_NO_META_DESCRIPTION;
        issues.push("Marketing: meta description missing.".to_string());
    }
    // "Many" missing alts: more than half of the page's images.
    if facts.img_count > 0 && facts.img_missing_alt * 2 > facts.img_count {
        score -= PENALTY_MISSING_ALT;
        issues.push(format!(
            "Accessibility: {} of {} images missing alt text.",
            facts.img_missing_alt, facts.img_count
        ));
    }

    (score.clamp(0, 100) as u8, issues)
}

pub fn normalize_url(raw: &str) -> Result<String, GradeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GradeError::EmptyUrl);
    }

    let with_scheme = if trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let parsed = Url::parse(&with_scheme).map_err(GradeError::BadUrl)?;
    Ok(parsed.to_string())
}

#[derive(Debug)]
pub enum GradeError {
    EmptyUrl,
    BadUrl(url::ParseError),
    Fetch(FetchError),
    Parse(ParseError),
}

impl From<FetchError> for GradeError {
    fn from(err: FetchError) -> Self {
        GradeError::Fetch(err)
    }
}

impl From<ParseError> for GradeError {
    fn from(err: ParseError) -> Self {
        GradeError::Parse(err)
    }
}

impl std::fmt::Display for GradeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GradeError::EmptyUrl => write!(f, "empty website field"),
            GradeError::BadUrl(e) => write!(f, "invalid URL: {}", e),
            GradeError::Fetch(e) => write!(f, "{}", e),
            GradeError::Parse(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for GradeError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy_facts() -> PageFacts {
        PageFacts {
            title: Some("t".to_string()),
            h1_count: 1,
            has_meta_description: true,
            img_count: 2,
            img_missing_alt: 0,
        }
    }

    #[test]
    fn perfect_page_scores_100() {
        let (score, issues) = apply_deductions(&healthy_facts(), 0.4);
        assert_eq!(score, 100);
        assert!(issues.is_empty());
    }

    #[test]
    fn slow_page_loses_30() {
        let (score, issues) = apply_deductions(&healthy_facts(), 1.21);
        assert_eq!(score, 70);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].starts_with("Performance:"));
    }

    #[test]
    fn threshold_is_exclusive() {
        let (score, _) = apply_deductions(&healthy_facts(), 1.2);
        assert_eq!(score, 100);
    }

    #[test]
    fn missing_h1_loses_20() {
        let mut facts = healthy_facts();
        facts.h1_count = 0;
        let (score, issues) = apply_deductions(&facts, 0.1);
        assert_eq!(score, 80);
        assert_eq!(issues, vec!["SEO: no H1 heading found.".to_string()]);
    }

    #[test]
    fn missing_meta_description_loses_15() {
        let mut facts = healthy_facts();
        facts.has_meta_description = false;
        let (score, _) = apply_deductions(&facts, 0.1);
        assert_eq!(score, 85);
    }

    #[test]
    fn majority_missing_alt_loses_10() {
        let mut facts = healthy_facts();
        facts.img_count = 4;
        facts.img_missing_alt = 3;
        let (score, issues) = apply_deductions(&facts, 0.1);
        assert_eq!(score, 90);
        assert_eq!(
            issues,
            vec!["Accessibility: 3 of 4 images missing alt text.".to_string()]
        );
    }

    #[test]
    fn half_missing_alt_is_tolerated() {
        let mut facts = healthy_facts();
        facts.img_count = 4;
        facts.img_missing_alt = 2;
        let (score, _) = apply_deductions(&facts, 0.1);
        assert_eq!(score, 100);
    }

    #[test]
    fn no_images_never_flags_alt() {
        let mut facts = healthy_facts();
        facts.img_count = 0;
        facts.img_missing_alt = 0;
        let (score, _) = apply_deductions(&facts, 0.1);
        assert_eq!(score, 100);
    }

    #[test]
    fn everything_wrong_stacks_all_penalties() {
        let facts = PageFacts {
            title: None,
            h1_count: 0,
            has_meta_description: false,
            img_count: 3,
            img_missing_alt: 3,
        };
        let (score, issues) = apply_deductions(&facts, 5.0);
        assert_eq!(score, 25);
        assert_eq!(issues.len(), 4);
    }

    #[test]
    fn bare_domain_gets_https() {
        assert_eq!(
            normalize_url("koeln-handwerk.de").unwrap(),
            "https://koeln-handwerk.de/"
        );
    }

    #[test]
    fn existing_scheme_kept() {
        assert_eq!(
            normalize_url("http://example.com/shop").unwrap(),
            "http://example.com/shop"
        );
    }

    #[test]
    fn empty_url_is_an_error() {
        assert!(matches!(normalize_url("  "), Err(GradeError::EmptyUrl)));
    }

    #[test]
    fn garbage_url_is_an_error() {
        assert!(matches!(
            normalize_url("http://"),
            Err(GradeError::BadUrl(_))
        ));
    }
}
