use std::io::Cursor;

use docx_rust::document::BodyContent;
use docx_rust::DocxFile;

use crate::types::ExtractError;

/// Extract paragraph text in body order, one line per paragraph. Empty
/// paragraphs are skipped.
pub fn extract(bytes: &[u8]) -> Result<String, ExtractError> {
    let docx_file = DocxFile::from_reader(Cursor::new(bytes))
        .map_err(|e| ExtractError::Failed(format!("failed to open DOCX: {:?}", e)))?;
    let docx = docx_file
        .parse()
        .map_err(|e| ExtractError::Failed(format!("failed to parse DOCX: {:?}", e)))?;

    let paragraphs = docx.document.body.content.iter().filter_map(|content| {
        if let BodyContent::Paragraph(paragraph) = content {
            Some(paragraph.iter_text().map(|t| t.as_ref()).collect::<String>())
        } else {
            None
        }
    });

    Ok(join_paragraphs(paragraphs))
}

fn join_paragraphs(paragraphs: impl Iterator<Item = String>) -> String {
    paragraphs
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
