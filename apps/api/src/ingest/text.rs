//! Document Text Extractor: raw bytes + declared format → plain text.
//!
//! PDFs go through `pdf-extract` first and fall back to page-by-page `lopdf`
//! extraction when the primary errors, panics, or yields only whitespace.
//! DOCX has a single path (`word/document.xml` via `zip` + `quick-xml`).
//! Every failure collapses to an empty string; callers skip empty files.

use std::io::{Cursor, Read};
use std::panic::{catch_unwind, AssertUnwindSafe};

use anyhow::{anyhow, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Detects the format from a file name's extension, case-insensitively.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = std::path::Path::new(file_name)
            .extension()
            .and_then(|v| v.to_str())
            .map(|v| v.to_ascii_lowercase())?;
        match extension.as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            _ => None,
        }
    }
}

/// One way of turning document bytes into text.
pub trait TextStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn extract(&self, data: &[u8]) -> Result<String>;
}

pub struct PdfExtractStrategy;

impl TextStrategy for PdfExtractStrategy {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract(&self, data: &[u8]) -> Result<String> {
        Ok(pdf_extract::extract_text_from_mem(data)?)
    }
}

pub struct LopdfStrategy;

impl TextStrategy for LopdfStrategy {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn extract(&self, data: &[u8]) -> Result<String> {
        let doc = lopdf::Document::load_mem(data)?;
        let mut text = String::new();
        for page_num in doc.get_pages().keys() {
            // A single unreadable page should not discard the rest.
            match doc.extract_text(&[*page_num]) {
                Ok(content) => {
                    text.push_str(&content);
                    text.push('\n');
                }
                Err(err) => debug!("lopdf could not read page {page_num}: {err}"),
            }
        }
        Ok(text)
    }
}

pub struct DocxStrategy;

impl TextStrategy for DocxStrategy {
    fn name(&self) -> &'static str {
        "docx"
    }

    fn extract(&self, data: &[u8]) -> Result<String> {
        extract_docx_text(data)
    }
}

pub struct DocumentTextExtractor {
    pdf_primary: Box<dyn TextStrategy>,
    pdf_secondary: Box<dyn TextStrategy>,
    docx: Box<dyn TextStrategy>,
}

impl Default for DocumentTextExtractor {
    fn default() -> Self {
        Self::new(
            Box::new(PdfExtractStrategy),
            Box::new(LopdfStrategy),
            Box::new(DocxStrategy),
        )
    }
}

impl DocumentTextExtractor {
    pub fn new(
        pdf_primary: Box<dyn TextStrategy>,
        pdf_secondary: Box<dyn TextStrategy>,
        docx: Box<dyn TextStrategy>,
    ) -> Self {
        Self {
            pdf_primary,
            pdf_secondary,
            docx,
        }
    }

    /// Never fails: an unreadable document yields an empty string.
    pub fn extract_text(&self, data: &[u8], format: DocumentFormat) -> String {
        match format {
            DocumentFormat::Pdf => {
                if let Some(text) = run_strategy(self.pdf_primary.as_ref(), data) {
                    return text;
                }
                run_strategy(self.pdf_secondary.as_ref(), data).unwrap_or_default()
            }
            DocumentFormat::Docx => run_strategy(self.docx.as_ref(), data).unwrap_or_default(),
        }
    }
}

/// Runs one strategy, treating errors, panics, and blank output alike.
fn run_strategy(strategy: &dyn TextStrategy, data: &[u8]) -> Option<String> {
    let outcome = catch_unwind(AssertUnwindSafe(|| strategy.extract(data)))
        .unwrap_or_else(|_| Err(anyhow!("extractor panicked")));

    match outcome {
        Ok(text) if !text.trim().is_empty() => Some(text),
        Ok(_) => {
            warn!("{} produced no text", strategy.name());
            None
        }
        Err(err) => {
            warn!("{} failed: {err}", strategy.name());
            None
        }
    }
}

fn extract_docx_text(data: &[u8]) -> Result<String> {
    let cursor = Cursor::new(data);
    let mut archive = zip::ZipArchive::new(cursor)?;

    let mut document_file = archive.by_name("word/document.xml")?;
    let mut xml = String::new();
    document_file.read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut current = String::new();
    let mut lines = Vec::new();
    let mut in_paragraph = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.name().as_ref() == b"w:p" {
                    in_paragraph = true;
                    current.clear();
                }
            }
            Ok(Event::Empty(e)) => {
                if in_paragraph && matches!(e.name().as_ref(), b"w:tab" | b"w:br") {
                    current.push(' ');
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"w:p" {
                    if !current.trim().is_empty() {
                        lines.push(current.trim().to_string());
                    }
                    current.clear();
                    in_paragraph = false;
                }
            }
            Ok(Event::Text(e)) => {
                if in_paragraph {
                    let value = e.xml_content()?.into_owned();
                    current.push_str(&value);
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(err.into()),
            _ => {}
        }

        buf.clear();
    }

    Ok(lines.join("\n"))
}


#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    impl TextStrategy for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn extract(&self, _data: &[u8]) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    impl TextStrategy for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn extract(&self, _data: &[u8]) -> Result<String> {
            Err(anyhow!("cannot parse"))
        }
    }

    struct Panicking;

    impl TextStrategy for Panicking {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn extract(&self, _data: &[u8]) -> Result<String> {
            panic!("malformed xref table")
        }
    }

    fn extractor(
        primary: Box<dyn TextStrategy>,
        secondary: Box<dyn TextStrategy>,
    ) -> DocumentTextExtractor {
        DocumentTextExtractor::new(primary, secondary, Box::new(DocxStrategy))
    }

    #[test]
    fn test_format_detection_is_case_insensitive() {
        assert_eq!(DocumentFormat::from_file_name("cv/Jane.PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_file_name("jane.docx"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_file_name("jane.doc"), None);
        assert_eq!(DocumentFormat::from_file_name("README"), None);
    }

    #[test]
    fn test_primary_result_used_when_non_empty() {
        let ex = extractor(Box::new(Fixed("primary text")), Box::new(Fixed("secondary text")));
        assert_eq!(ex.extract_text(b"%PDF", DocumentFormat::Pdf), "primary text");
    }

    #[test]
    fn test_secondary_used_when_primary_fails() {
        let ex = extractor(Box::new(Failing), Box::new(Fixed("secondary text")));
        assert_eq!(ex.extract_text(b"%PDF", DocumentFormat::Pdf), "secondary text");
    }

    #[test]
    fn test_secondary_used_when_primary_blank() {
        let ex = extractor(Box::new(Fixed("  \n\t ")), Box::new(Fixed("secondary text")));
        assert_eq!(ex.extract_text(b"%PDF", DocumentFormat::Pdf), "secondary text");
    }

    #[test]
    fn test_secondary_used_when_primary_panics() {
        let ex = extractor(Box::new(Panicking), Box::new(Fixed("secondary text")));
        assert_eq!(ex.extract_text(b"%PDF", DocumentFormat::Pdf), "secondary text");
    }

    #[test]
    fn test_both_failing_returns_empty() {
        let ex = extractor(Box::new(Failing), Box::new(Failing));
        assert_eq!(ex.extract_text(b"%PDF", DocumentFormat::Pdf), "");
    }

    #[test]
    fn test_garbage_pdf_bytes_return_empty_with_real_backends() {
        let ex = DocumentTextExtractor::default();
        assert_eq!(ex.extract_text(b"definitely not a pdf", DocumentFormat::Pdf), "");
    }

    #[test]
    fn test_docx_paragraphs_become_lines() {
        let data = fixtures::docx_bytes(&["Jane Doe", "jane.doe@example.com", "Skills: Python"]);
        let text = DocumentTextExtractor::default().extract_text(&data, DocumentFormat::Docx);
        assert_eq!(text, "Jane Doe\njane.doe@example.com\nSkills: Python");
    }

    #[test]
    fn test_invalid_docx_returns_empty() {
        let text =
            DocumentTextExtractor::default().extract_text(b"PK-not-a-zip", DocumentFormat::Docx);
        assert_eq!(text, "");
    }
}
