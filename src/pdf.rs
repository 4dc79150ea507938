use crate::grader::Audit;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::io;
use std::path::Path;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LINE_STEP_MM: f32 = 8.0;
const WRAP_COLUMNS: usize = 90;

const REPORT_TITLE: &str = "SITEGRADE AUDIT REPORT";
const FOOTER_NOTE: &str =
    "Note: these issues cost you leads every day. Get in touch for a fix-up plan.";

/// Fixed-layout one-page A4 report: banner, URL, score, findings,
/// contact note.
pub fn render_pdf(audit: &Audit) -> Result<Vec<u8>, PdfError> {
    let (doc, page, layer) = PdfDocument::new(
        REPORT_TITLE,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "report",
    );

    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| PdfError(e.to_string()))?;
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| PdfError(e.to_string()))?;
    let italic = doc
        .add_builtin_font(BuiltinFont::HelveticaOblique)
        .map_err(|e| PdfError(e.to_string()))?;

    let layer = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT_MM - 25.0;

    layer.use_text(REPORT_TITLE, 20.0, Mm(MARGIN_MM), Mm(y), &bold);
    y -= 15.0;

    layer.use_text(
        latinize(&format!("Analysis for: {}", audit.url)),
        14.0,
        Mm(MARGIN_MM),
        Mm(y),
        &bold,
    );
    y -= 12.0;

    layer.use_text(
        format!("Overall score: {}/100", audit.score),
        16.0,
        Mm(MARGIN_MM),
        Mm(y),
        &bold,
    );
    y -= 15.0;

    layer.use_text("Findings:", 12.0, Mm(MARGIN_MM), Mm(y), &bold);
    y -= LINE_STEP_MM;

    if audit.issues.is_empty() {
        layer.use_text("- none, the page looks healthy", 11.0, Mm(MARGIN_MM), Mm(y), &regular);
        y -= LINE_STEP_MM;
    }
    for issue in &audit.issues {
        for line in wrap_text(&latinize(issue), WRAP_COLUMNS) {
            layer.use_text(format!("- {}", line), 11.0, Mm(MARGIN_MM), Mm(y), &regular);
            y -= LINE_STEP_MM;
        }
    }

    y -= 10.0;
    for line in wrap_text(FOOTER_NOTE, WRAP_COLUMNS) {
        layer.use_text(line, 10.0, Mm(MARGIN_MM), Mm(y), &italic);
        y -= LINE_STEP_MM;
    }

    doc.save_to_bytes().map_err(|e| PdfError(e.to_string()))
}

pub fn write_pdf(path: &Path, audit: &Audit) -> Result<(), PdfError> {
    let bytes = render_pdf(audit)?;
    std::fs::write(path, bytes).map_err(|e| PdfError(e.to_string()))?;
    Ok(())
}

/// The builtin Helvetica fonts only cover Latin-1; transliterate the
/// umlauts that show up in German lead lists and drop the rest.
fn latinize(raw: &str) -> String {
    raw.chars()
        .flat_map(|c| {
            match c {
                'ä' => "ae".chars().collect::<Vec<_>>(),
                'ö' => "oe".chars().collect(),
                'ü' => "ue".chars().collect(),
                'Ä' => "Ae".chars().collect(),
                'Ö' => "Oe".chars().collect(),
                'Ü' => "Ue".chars().collect(),
                'ß' => "ss".chars().collect(),
                c if c.is_ascii() => vec![c],
                _ => vec!['?'],
            }
        })
        .collect()
}

fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > columns {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[derive(Debug)]
pub struct PdfError(pub String);

impl std::fmt::Display for PdfError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF generation failed: {}", self.0)
    }
}

impl std::error::Error for PdfError {}

impl From<io::Error> for PdfError {
    fn from(err: io::Error) -> Self {
        PdfError(err.to_string())
    }
}
