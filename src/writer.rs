use crate::bulk::ScoredLead;
use csv::StringRecord;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

pub const SCORE_COLUMN: &str = "Score";

/// Write the scored lead list: every input column untouched, a `Score`
/// column appended, rows sorted worst-first.
pub fn write_scored_csv(
    path: &Path,
    headers: &StringRecord,
    scored: &[ScoredLead],
) -> Result<(), WriteError> {
    let file = File::create(path)?;
    write_scored_csv_to(file, headers, scored)
}

pub fn write_scored_csv_to<W: io::Write>(
    writer: W,
    headers: &StringRecord,
    scored: &[ScoredLead],
) -> Result<(), WriteError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut out_headers = headers.clone();
    out_headers.push_field(SCORE_COLUMN);
    csv_writer.write_record(&out_headers)?;

    let mut ordered: Vec<&ScoredLead> = scored.iter().collect();
    ordered.sort_by_key(|lead| lead.score);

    for lead in ordered {
        let mut record = lead.row.clone();
        // Short rows are padded so the Score field stays in its column.
        while record.len() < headers.len() {
            record.push_field("");
        }
        record.push_field(&lead.score.to_string());
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// One JSON object per line, keeping the issue list and latency that
/// the CSV flattens away.
pub fn write_jsonl(path: &Path, scored: &[ScoredLead]) -> Result<(), WriteError> {
    let file = File::create(path)?;
    write_jsonl_to(BufWriter::new(file), scored)
}

pub fn write_jsonl_to<W: io::Write>(mut writer: W, scored: &[ScoredLead]) -> Result<(), WriteError> {
    for lead in scored {
        let line = serde_json::to_string(lead)?;
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Debug)]
pub enum WriteError {
    Io(io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
}

impl From<io::Error> for WriteError {
    fn from(err: io::Error) -> Self {
        WriteError::Io(err)
    }
}

impl From<csv::Error> for WriteError {
    fn from(err: csv::Error) -> Self {
        WriteError::Csv(err)
    }
}

impl From<serde_json::Error> for WriteError {
    fn from(err: serde_json::Error) -> Self {
        WriteError::Json(err)
    }
}

impl std::fmt::Display for WriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteError::Io(e) => write!(f, "write failed: {}", e),
            WriteError::Csv(e) => write!(f, "CSV write failed: {}", e),
            WriteError::Json(e) => write!(f, "JSON write failed: {}", e),
        }
    }
}

impl std::error::Error for WriteError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(row: &[&str], website: &str, score: u8) -> ScoredLead {
        ScoredLead {
            row: StringRecord::from(row.to_vec()),
            website: website.to_string(),
            score,
            ttfb_secs: Some(0.5),
            status: Some(200),
            title: None,
            issues: vec![],
        }
    }

    #[test]
    fn appends_score_and_sorts_ascending() {
        let headers = StringRecord::from(vec!["Name", "Website"]);
        let scored = vec![
            lead(&["Meier", "meier.de"], "meier.de", 85),
            lead(&["Schulz", "schulz.de"], "schulz.de", 40),
            lead(&["Weber", "weber.de"], "weber.de", 70),
        ];

        let mut out = Vec::new();
        write_scored_csv_to(&mut out, &headers, &scored).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Name,Website,Score");
        assert_eq!(lines[1], "Schulz,schulz.de,40");
        assert_eq!(lines[2], "Weber,weber.de,70");
        assert_eq!(lines[3], "Meier,meier.de,85");
    }

    #[test]
    fn sort_is_stable_for_equal_scores() {
        let headers = StringRecord::from(vec!["Website"]);
        let scored = vec![
            lead(&["a.de"], "a.de", 50),
            lead(&["b.de"], "b.de", 50),
        ];

        let mut out = Vec::new();
        write_scored_csv_to(&mut out, &headers, &scored).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "a.de,50");
        assert_eq!(lines[2], "b.de,50");
    }

    #[test]
    fn short_rows_are_padded() {
        let headers = StringRecord::from(vec!["Name", "Website"]);
        let scored = vec![lead(&["only-name"], "", 0)];

        let mut out = Vec::new();
        write_scored_csv_to(&mut out, &headers, &scored).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().nth(1).unwrap(), "only-name,,0");
    }

    #[test]
    fn jsonl_has_one_object_per_row() {
        let mut failed = lead(&["x.de"], "x.de", 0);
        failed.ttfb_secs = None;
        failed.status = None;
        failed.issues = vec!["Error: request failed".to_string()];
        let scored = vec![lead(&["a.de"], "a.de", 85), failed];

        let mut out = Vec::new();
        write_jsonl_to(&mut out, &scored).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["website"], "a.de");
        assert_eq!(first["score"], 85);

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["score"], 0);
        assert_eq!(second["issues"][0], "Error: request failed");
    }
}
