use csv::StringRecord;
use std::io;
use std::path::Path;

pub const WEBSITE_COLUMN: &str = "Website";
pub const ADDRESS_COLUMN: &str = "Address";

/// An uploaded lead list: header row plus pass-through data rows.
/// Columns other than `Website` (and `Address`, for the map) are never
/// interpreted, only carried into the output.
#[derive(Debug)]
pub struct LeadFile {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
    pub website_idx: usize,
    pub address_idx: Option<usize>,
}

impl LeadFile {
    pub fn load(path: &Path) -> Result<Self, LeadsError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, LeadsError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();

        let website_idx = headers
            .iter()
            .position(|h| h == WEBSITE_COLUMN)
            .ok_or_else(|| {
                LeadsError::MissingWebsiteColumn(headers.iter().map(String::from).collect())
            })?;
        let address_idx = headers.iter().position(|h| h == ADDRESS_COLUMN);

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            rows.push(record?);
        }

        Ok(Self {
            headers,
            rows,
            website_idx,
            address_idx,
        })
    }

    pub fn website<'a>(&self, row: &'a StringRecord) -> &'a str {
        row.get(self.website_idx).unwrap_or("")
    }

    pub fn address<'a>(&self, row: &'a StringRecord) -> Option<&'a str> {
        let idx = self.address_idx?;
        row.get(idx).map(str::trim).filter(|a| !a.is_empty())
    }
}

#[derive(Debug)]
pub enum LeadsError {
    Io(io::Error),
    Csv(csv::Error),
    MissingWebsiteColumn(Vec<String>),
}

impl From<io::Error> for LeadsError {
    fn from(err: io::Error) -> Self {
        LeadsError::Io(err)
    }
}

impl From<csv::Error> for LeadsError {
    fn from(err: csv::Error) -> Self {
        LeadsError::Csv(err)
    }
}

impl std::fmt::Display for LeadsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeadsError::Io(e) => write!(f, "cannot read lead file: {}", e),
            LeadsError::Csv(e) => write!(f, "bad CSV: {}", e),
            LeadsError::MissingWebsiteColumn(headers) => write!(
                f,
                "CSV has no '{}' column (found: {})",
                WEBSITE_COLUMN,
                headers.join(", ")
            ),
        }
    }
}

impl std::error::Error for LeadsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_website_column_among_others() {
        let csv = "Name,Website,City\nMeier,meier.de,Cologne\nSchulz,schulz.de,Bonn\n";
        let leads = LeadFile::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(leads.website_idx, 1);
        assert_eq!(leads.rows.len(), 2);
        assert_eq!(leads.website(&leads.rows[0]), "meier.de");
    }

    #[test]
    fn missing_website_column_names_headers() {
        let csv = "Name,Url\nMeier,meier.de\n";
        let err = LeadFile::from_reader(csv.as_bytes()).unwrap_err();
        match err {
            LeadsError::MissingWebsiteColumn(headers) => {
                assert_eq!(headers, vec!["Name".to_string(), "Url".to_string()]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn column_match_is_exact() {
        // The original tool required the exact header 'Website'.
        let csv = "website\nmeier.de\n";
        assert!(matches!(
            LeadFile::from_reader(csv.as_bytes()),
            Err(LeadsError::MissingWebsiteColumn(_))
        ));
    }

    #[test]
    fn address_is_optional_and_trimmed() {
        let csv = "Website,Address\nmeier.de, Hauptstr. 1 \nschulz.de,\n";
        let leads = LeadFile::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(leads.address(&leads.rows[0]), Some("Hauptstr. 1"));
        assert_eq!(leads.address(&leads.rows[1]), None);
    }

    #[test]
    fn short_rows_yield_empty_website() {
        let csv = "Name,Website\nonly-name\n";
        let leads = LeadFile::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(leads.website(&leads.rows[0]), "");
    }
}
