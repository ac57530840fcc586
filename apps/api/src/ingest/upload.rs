//! Unpacks an uploaded file into the resume documents it carries.

use std::io::{Cursor, Read};

use thiserror::Error;
use tracing::{debug, warn};

use crate::ingest::text::DocumentFormat;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unsupported file type '{0}'. Upload a ZIP of PDF/DOCX resumes, a DOCX, or a PDF.")]
    UnsupportedType(String),

    #[error("Could not read ZIP archive: {0}")]
    InvalidArchive(String),

    #[error("No PDF or DOCX files found in archive")]
    NoResumes,

    #[error("Archive expands past the {limit}-byte extraction limit")]
    ArchiveTooLarge { limit: u64 },
}

/// Caps on decompressed archive content. The request body limit only bounds
/// the compressed size.
#[derive(Debug, Clone, Copy)]
pub struct UnpackLimits {
    /// Largest single resume; bigger entries are skipped.
    pub max_entry_bytes: u64,
    /// Total decompressed bytes across the archive; exceeding it rejects the upload.
    pub max_total_bytes: u64,
}

/// One resume document pulled from an upload.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub name: String,
    pub format: DocumentFormat,
    pub data: Vec<u8>,
}

pub fn unpack_upload(
    file_name: &str,
    data: &[u8],
    limits: UnpackLimits,
) -> Result<Vec<ResumeFile>, UploadError> {
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".zip") {
        return unpack_zip(data, limits);
    }

    match DocumentFormat::from_file_name(file_name) {
        Some(format) => Ok(vec![ResumeFile {
            name: file_name.to_string(),
            format,
            data: data.to_vec(),
        }]),
        None => Err(UploadError::UnsupportedType(file_name.to_string())),
    }
}

fn unpack_zip(data: &[u8], limits: UnpackLimits) -> Result<Vec<ResumeFile>, UploadError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| UploadError::InvalidArchive(e.to_string()))?;

    let mut files = Vec::new();
    let mut total_bytes: u64 = 0;
    for index in 0..archive.len() {
        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable archive entry #{index}: {err}");
                continue;
            }
        };
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        if is_archive_metadata(&name) {
            debug!("Skipping archive metadata entry {name}");
            continue;
        }
        let Some(format) = DocumentFormat::from_file_name(&name) else {
            debug!("Skipping non-resume archive entry {name}");
            continue;
        };

        // Declared sizes are untrusted: read at most one byte past the cap.
        let mut bytes = Vec::new();
        if let Err(err) = (&mut entry)
            .take(limits.max_entry_bytes.saturating_add(1))
            .read_to_end(&mut bytes)
        {
            warn!("Skipping {name}: could not decompress ({err})");
            continue;
        }
        let size = bytes.len() as u64;
        if size > limits.max_entry_bytes {
            warn!(
                "Skipping {name}: expands past the {}-byte per-file limit",
                limits.max_entry_bytes
            );
            continue;
        }

        total_bytes += size;
        if total_bytes > limits.max_total_bytes {
            warn!(
                "Rejecting archive: decompressed content exceeds {} bytes",
                limits.max_total_bytes
            );
            return Err(UploadError::ArchiveTooLarge {
                limit: limits.max_total_bytes,
            });
        }
        files.push(ResumeFile {
            name,
            format,
            data: bytes,
        });
    }

    if files.is_empty() {
        return Err(UploadError::NoResumes);
    }
    Ok(files)
}

/// macOS Finder adds `__MACOSX/` folders and `._` resource forks to archives.
fn is_archive_metadata(name: &str) -> bool {
    let base = name.rsplit('/').next().unwrap_or(name);
    name.starts_with("__MACOSX/") || base.starts_with("._")
}
