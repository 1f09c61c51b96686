use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?i)https?://[^\s<>'"\)]+"#).unwrap());

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Page text from `pdf-extract`, followed by any link annotations found in the raw bytes.
    ///
    /// Profile URLs often live only in link annotations, so appending them lets the contact
    /// extractor see LinkedIn and GitHub addresses that never appear in the page text.
    pub fn extract_text(&self, data: &[u8]) -> anyhow::Result<String> {
        let mut text =
            pdf_extract::extract_text_from_mem(data).context("PDF parsing failed")?;

        let links = extract_hyperlinks(data);
        debug!(links = links.len(), "extracted PDF text");
        if !links.is_empty() {
            text.push('\n');
            text.push_str(&links.join("\n"));
        }

        Ok(text)
    }
}

fn extract_hyperlinks(data: &[u8]) -> Vec<String> {
    let raw = String::from_utf8_lossy(data);
    let mut links: Vec<String> = Vec::new();
    for m in URL_RE.find_iter(&raw) {
        let value = m.as_str().to_string();
        if !links
            .iter()
            .any(|existing: &String| existing.eq_ignore_ascii_case(&value))
        {
            links.push(value);
        }
    }

    links
}
