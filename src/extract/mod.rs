// Text extraction layer
//
// Resolves each uploaded file's declared MIME type (with a filename-based
// fallback) to a supported document kind and produces plain text from it.
// Failures are per-file: one corrupt upload never aborts its batch.

pub mod docx;
pub mod pdf;

use crate::types::ExtractError;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const PLAIN_TEXT_MIME: &str = "text/plain";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    /// Resolve from the type the browser declared, falling back to a guess
    /// from the filename when the declaration is missing or generic.
    pub fn resolve(declared: &str, filename: &str) -> Option<Self> {
        match Self::from_mime(declared) {
            Some(kind) => Some(kind),
            None if declared.is_empty()
                || declared == mime::APPLICATION_OCTET_STREAM.essence_str() =>
            {
                let guessed = mime_guess::from_path(filename).first()?;
                Self::from_mime(guessed.essence_str())
            }
            None => None,
        }
    }

    fn from_mime(mime_type: &str) -> Option<Self> {
        match mime_type {
            PDF_MIME => Some(DocumentKind::Pdf),
            DOCX_MIME => Some(DocumentKind::Docx),
            PLAIN_TEXT_MIME => Some(DocumentKind::PlainText),
            _ => None,
        }
    }
}

/// Extract plain text from file bytes of a known kind.
pub fn extract_text(bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractError> {
    match kind {
        DocumentKind::Pdf => pdf::extract(bytes),
        DocumentKind::Docx => docx::extract(bytes),
        DocumentKind::PlainText => String::from_utf8(bytes.to_vec())
            .map_err(|e| ExtractError::Failed(format!("file is not valid UTF-8 text: {}", e))),
    }
}
