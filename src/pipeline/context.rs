//! Context assembly: ranked documents into a bounded, numbered text block.

use crate::retrieval::NewsDocument;

const MISSING_TITLE: &str = "N/A";
const MISSING_CONTENT: &str = "No content";
const MISSING_LINK: &str = "N/A";
const TRUNCATION_MARKER: &str = "...";

/// Format ranked documents into a numbered context block.
///
/// Entry order follows the input, so entry `i` lines up with the shaped
/// sources entry `i`. Content is truncated to `max_chars` characters with a
/// marker appended when truncation occurred; missing fields render as
/// placeholders rather than being omitted, keeping the numbering stable.
pub fn build_context(documents: &[NewsDocument], max_chars: usize) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            let title = doc.title.as_deref().unwrap_or(MISSING_TITLE);
            let content = doc
                .content
                .as_deref()
                .map(|text| truncate_chars(text, max_chars))
                .unwrap_or_else(|| MISSING_CONTENT.to_string());
            let link = doc.link.as_deref().unwrap_or(MISSING_LINK);
            format!(
                "[Document {}]\nTitle: {}\nContent: {}\nSource: {}",
                i + 1,
                title,
                content,
                link
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
