use crate::grader::{self, Audit};
use crate::http_client::HttpClient;
use crate::leads::LeadFile;
use crate::ui::AuditStats;
use csv::StringRecord;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::Ordering;

/// One lead row after grading. Failed or empty rows score 0 with the
/// error text as their only issue, so the output keeps one row per
/// input row.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredLead {
    #[serde(skip)]
    pub row: StringRecord,
    pub website: String,
    pub score: u8,
    pub ttfb_secs: Option<f64>,
    pub status: Option<u16>,
    pub title: Option<String>,
    pub issues: Vec<String>,
}

impl ScoredLead {
    fn from_audit(row: StringRecord, website: &str, audit: Audit) -> Self {
        Self {
            row,
            website: website.to_string(),
            score: audit.score,
            ttfb_secs: Some(audit.ttfb_secs),
            status: Some(audit.status),
            title: audit.title,
            issues: audit.issues,
        }
    }

    fn failed(row: StringRecord, website: &str, error: String) -> Self {
        Self {
            row,
            website: website.to_string(),
            score: 0,
            ttfb_secs: None,
            status: None,
            title: None,
            issues: vec![format!("Error: {}", error)],
        }
    }
}

/// Grade every row of the lead list, strictly in order. No parallelism:
/// one request in flight at a time, stats updated as rows finish.
///
/// With `print_progress` set (quiet mode, no dashboard) each row gets a
/// plain progress line on stderr instead.
pub async fn run(
    leads: &LeadFile,
    client: &HttpClient,
    stats: Arc<AuditStats>,
    print_progress: bool,
) -> Vec<ScoredLead> {
    let total = leads.rows.len();
    let mut scored = Vec::with_capacity(total);

    for (i, row) in leads.rows.iter().enumerate() {
        if stats.should_stop() {
            break;
        }

        let website = leads.website(row).trim().to_string();
        stats.set_current(&website);

        let lead = match grader::grade(client, &website).await {
            Ok(audit) => ScoredLead::from_audit(row.clone(), &website, audit),
            Err(e) => {
                stats.add_error(format!("{}: {}", display_target(&website), e));
                stats.failed.fetch_add(1, Ordering::Relaxed);
                ScoredLead::failed(row.clone(), &website, e.to_string())
            }
        };

        if print_progress {
            eprintln!(
                "[{}/{}] {} -> {}",
                i + 1,
                total,
                display_target(&website),
                lead.score
            );
        }

        stats.record_score(lead.score);
        stats.processed.fetch_add(1, Ordering::Relaxed);
        scored.push(lead);
    }

    scored
}

fn display_target(website: &str) -> &str {
    if website.is_empty() { "<empty>" } else { website }
}
