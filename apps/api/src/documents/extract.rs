//! Plain-text extraction from uploaded résumés.

use serde::Serialize;
use tracing::debug;

use crate::documents::docx::extract_docx_text;
use crate::documents::upload::Upload;
use crate::errors::AppError;
use crate::matching::segmenter::normalize_whitespace;

/// Words per chunk when splitting extracted text.
pub const CHUNK_WORDS: usize = 500;

pub const UNSUPPORTED_FILE_TYPE: &str = "Unsupported file type. Upload a PDF, DOCX, or TXT.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileKind {
    Pdf,
    Docx,
    Txt,
}

impl FileKind {
    /// Detects the kind from the filename extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".pdf") {
            Some(FileKind::Pdf)
        } else if lower.ends_with(".docx") {
            Some(FileKind::Docx)
        } else if lower.ends_with(".txt") {
            Some(FileKind::Txt)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileKind::Pdf => ".pdf",
            FileKind::Docx => ".docx",
            FileKind::Txt => ".txt",
        }
    }
}

/// Whitespace-normalized text of one upload, split into word chunks.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub kind: FileKind,
    pub chunks: Vec<String>,
}

impl ExtractedText {
    pub fn text(&self) -> String {
        self.chunks.join(" ")
    }
}

/// Extracts and chunks the text of `bytes` according to the extension of `filename`.
///
/// PDF and DOCX parsing is CPU-bound; async callers should go through `extract_upload`.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<ExtractedText, AppError> {
    let kind = FileKind::from_filename(filename)
        .ok_or_else(|| AppError::Validation(UNSUPPORTED_FILE_TYPE.to_string()))?;

    let raw = match kind {
        FileKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| AppError::Extraction(format!("{filename}: {e}")))?,
        FileKind::Docx => extract_docx_text(bytes)
            .map_err(|e| AppError::Extraction(format!("{filename}: {e}")))?,
        FileKind::Txt => String::from_utf8_lossy(bytes).into_owned(),
    };

    let chunks = clean_and_chunk(&raw, CHUNK_WORDS);
    debug!(
        "Extracted {} chunks from {filename} ({} bytes)",
        chunks.len(),
        bytes.len()
    );

    Ok(ExtractedText { kind, chunks })
}

/// Runs `extract_text` on the blocking pool. A panic inside the PDF parser becomes an
/// extraction error.
pub async fn extract_upload(upload: Upload) -> Result<ExtractedText, AppError> {
    tokio::task::spawn_blocking(move || extract_text(&upload.filename, &upload.bytes))
        .await
        .map_err(|e| AppError::Extraction(format!("extraction task failed: {e}")))?
}

/// Normalizes whitespace and groups the words into chunks of at most `chunk_words`.
pub fn clean_and_chunk(text: &str, chunk_words: usize) -> Vec<String> {
    let normalized = normalize_whitespace(text);
    if normalized.is_empty() {
        return Vec::new();
    }

    let words: Vec<&str> = normalized.split(' ').collect();
    words
        .chunks(chunk_words.max(1))
        .map(|chunk| chunk.join(" "))
        .collect()
}
