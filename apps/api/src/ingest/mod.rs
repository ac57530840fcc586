//! Resume ingestion: upload unpacking, text extraction, field extraction.
//!
//! Everything here is synchronous CPU work. Handlers run `extract_candidates`
//! inside `tokio::task::spawn_blocking`.

pub mod fields;
pub mod text;
pub mod upload;

use serde::Serialize;
use tracing::{info, warn};

use crate::ingest::fields::extract_fields;
use crate::ingest::text::DocumentTextExtractor;
use crate::ingest::upload::ResumeFile;
use crate::models::batch::ExtractedCandidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoText,
    LowConfidence,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub file: String,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct ExtractionReport {
    /// In upload order.
    pub candidates: Vec<ExtractedCandidate>,
    pub skipped: Vec<SkippedFile>,
}

/// Turns every resume file into a candidate, skipping (and logging) files with
/// no usable text or too little signal. One bad file never aborts the rest.
pub fn extract_candidates(
    files: &[ResumeFile],
    skills: &[String],
    extractor: &DocumentTextExtractor,
) -> ExtractionReport {
    let mut report = ExtractionReport::default();

    for file in files {
        let text = extractor.extract_text(&file.data, file.format);
        if text.trim().is_empty() {
            warn!("No text extracted from {}", file.name);
            report.skipped.push(SkippedFile {
                file: file.name.clone(),
                reason: SkipReason::NoText,
            });
            continue;
        }

        match extract_fields(&text, skills, &file.name) {
            Some(candidate) => {
                info!(
                    "Extracted candidate from {} ({} chars of text)",
                    file.name,
                    text.len()
                );
                report.candidates.push(candidate);
            }
            None => {
                warn!("Dropping {}: no email or no recognised skill found", file.name);
                report.skipped.push(SkippedFile {
                    file: file.name.clone(),
                    reason: SkipReason::LowConfidence,
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::text::fixtures::docx_bytes;
    use crate::ingest::text::DocumentFormat;

    fn docx(name: &str, lines: &[&str]) -> ResumeFile {
        ResumeFile {
            name: name.to_string(),
            format: DocumentFormat::Docx,
            data: docx_bytes(lines),
        }
    }

    #[test]
    fn test_bad_and_low_confidence_files_are_skipped_not_fatal() {
        let files = vec![
            docx("good.docx", &["Jane Doe", "jane@example.com", "python"]),
            ResumeFile {
                name: "broken.pdf".to_string(),
                format: DocumentFormat::Pdf,
                data: b"garbage".to_vec(),
            },
            docx("no-email.docx", &["John Roe", "python"]),
        ];
        let skills = vec!["python".to_string()];
        let report = extract_candidates(&files, &skills, &DocumentTextExtractor::default());

        assert_eq!(report.candidates.len(), 1);
        assert_eq!(report.candidates[0].email, "jane@example.com");
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].reason, SkipReason::NoText);
        assert_eq!(report.skipped[1].reason, SkipReason::LowConfidence);
    }
}
