use lopdf::Document;

use crate::types::ExtractError;

/// Extract text from every page in document order. Pages that yield no
/// extractable text contribute nothing; only a document that cannot be
/// parsed at all is an error.
pub fn extract(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| ExtractError::Failed(format!("failed to parse PDF: {}", e)))?;

    let mut pages = Vec::new();
    for (page_num, _object_id) in doc.get_pages() {
        let Ok(text) = doc.extract_text(&[page_num]) else {
            continue;
        };
        if !text.trim().is_empty() {
            pages.push(text.trim_end().to_string());
        }
    }

    Ok(pages.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_pdf_is_a_contained_failure() {
        let err = extract(b"not a pdf at all").unwrap_err();
        assert!(matches!(err, ExtractError::Failed(_)));
    }

    #[test]
    fn test_truncated_header_is_a_contained_failure() {
        let err = extract(b"%PDF-1.7\n").unwrap_err();
        assert!(matches!(err, ExtractError::Failed(_)));
    }
}
