// Prompt composition
//
// One deterministic template: persona header, the accumulated document
// text between delimiters, the user's question, and the closing answer
// instructions. Document text past the configured cap is cut at a char
// boundary and visibly marked rather than silently rejected downstream.

const TRUNCATION_MARKER: &str = "\n[document truncated]";

pub fn compose(document_text: &str, question: &str, max_document_chars: usize) -> String {
    let document = bounded(document_text, max_document_chars);
    format!(
        "You are Dharma Decode, an AI that simplifies legal jargon.\n\
         The user has uploaded a legal document. Here is its content:\n\
         ---\n\
         {}\n\
         ---\n\
         The user asks: {}\n\
         Please answer clearly and simply, avoiding legal jargon, and quote \
         the sections you reference briefly.",
        document, question
    )
}

fn bounded(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
    }
}
