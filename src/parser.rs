use lol_html::{HtmlRewriter, Settings, element, text};
use serde::Serialize;

/// The page signals the deduction table looks at.
#[derive(Debug, Default, Clone, Serialize)]
pub struct PageFacts {
    pub title: Option<String>,
    pub h1_count: usize,
    pub has_meta_description: bool,
    pub img_count: usize,
    pub img_missing_alt: usize,
}

/// Stream the document once and collect the audit signals.
pub fn extract_facts(input: &str) -> Result<PageFacts, ParseError> {
    let mut title: Option<String> = None;
    let mut h1_count = 0usize;
    let mut has_meta_description = false;
    let mut img_count = 0usize;
    let mut img_missing_alt = 0usize;

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![
                text!("title", |t| {
                    if title.is_none() {
                        title = Some(t.as_str().to_string());
                    } else {
                        title = Some(format!("{}{}", title.as_ref().unwrap(), t.as_str()));
                    }
                    Ok(())
                }),
                element!("h1", |_el| {
                    h1_count += 1;
                    Ok(())
                }),
                element!("meta[name][content]", |el| {
                    let name = el.get_attribute("name").unwrap_or_default();
                    let content = el.get_attribute("content").unwrap_or_default();
                    if name.eq_ignore_ascii_case("description") && !content.trim().is_empty() {
                        has_meta_description = true;
                    }
                    Ok(())
                }),
                element!("img", |el| {
                    img_count += 1;
                    let alt_ok = el
                        .get_attribute("alt")
                        .map(|a| !a.trim().is_empty())
                        .unwrap_or(false);
                    if !alt_ok {
                        img_missing_alt += 1;
                    }
                    Ok(())
                }),
            ],
            ..Settings::new()
        },
        |_: &[u8]| {},
    );

    rewriter
        .write(input.as_bytes())
        .map_err(|e| ParseError(e.to_string()))?;
    rewriter.end().map_err(|e| ParseError(e.to_string()))?;

    Ok(PageFacts {
        title: title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
        h1_count,
        has_meta_description,
        img_count,
        img_missing_alt,
    })
}

#[derive(Debug)]
pub struct ParseError(pub String);

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTML parse failed: {}", self.0)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_page() {
        let html = r#"<html><head>
            <title>Bakery Meier</title>
            <meta name="description" content="Fresh bread daily.">
            </head><body>
            <h1>Welcome</h1>
            <img src="a.jpg" alt="storefront">
            </body></html>"#;
        let facts = extract_facts(html).unwrap();
        assert_eq!(facts.title.as_deref(), Some("Bakery Meier"));
        assert_eq!(facts.h1_count, 1);
        assert!(facts.has_meta_description);
        assert_eq!(facts.img_count, 1);
        assert_eq!(facts.img_missing_alt, 0);
    }

    #[test]
    fn empty_description_does_not_count() {
        let html = r#"<head><meta name="description" content="  "></head>"#;
        let facts = extract_facts(html).unwrap();
        assert!(!facts.has_meta_description);
    }

    #[test]
    fn meta_name_is_case_insensitive() {
        let html = r#"<meta name="Description" content="x">"#;
        let facts = extract_facts(html).unwrap();
        assert!(facts.has_meta_description);
    }

    #[test]
    fn counts_images_without_alt() {
        let html = r#"<body>
            <img src="1.png">
            <img src="2.png" alt="">
            <img src="3.png" alt="logo">
            </body>"#;
        let facts = extract_facts(html).unwrap();
        assert_eq!(facts.img_count, 3);
        assert_eq!(facts.img_missing_alt, 2);
    }

    #[test]
    fn missing_everything() {
        let facts = extract_facts("<html><body><p>hi</p></body></html>").unwrap();
        assert_eq!(facts.h1_count, 0);
        assert!(!facts.has_meta_description);
        assert_eq!(facts.title, None);
    }
}
