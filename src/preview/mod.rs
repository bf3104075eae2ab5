//! Page-count preview for the selected PDF.
//!
//! A full PDF parse would be overkill for a one-line preview, so this
//! scans the raw bytes instead: first for the page-tree dictionary's
//! `/Count`, then for individual page objects as a fallback. The scan
//! stays on `&[u8]` throughout — real PDFs mix structure tokens with
//! compressed stream data, so no byte offset is safe to slice as text.
//! Wrong or missing answers only cost an inline message; submission
//! never depends on this module.

use crate::upload::FlowError;

/// Extracts the page count from raw PDF bytes.
pub fn pdf_page_count(bytes: &[u8]) -> Result<usize, FlowError> {
    if !bytes.starts_with(b"%PDF") {
        return Err(FlowError::Preview(
            "the selected file does not look like a PDF".to_string(),
        ));
    }

    if let Some(count) = pages_dictionary_count(bytes) {
        return Ok(count);
    }
    if let Some(count) = page_object_count(bytes) {
        return Ok(count);
    }

    Err(FlowError::Preview(
        "could not determine the page count".to_string(),
    ))
}

/// First occurrence of `needle` at or after `start`.
fn find_from(haystack: &[u8], needle: &[u8], start: usize) -> Option<usize> {
    if start >= haystack.len() {
        return None;
    }
    haystack[start..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| start + pos)
}

/// Looks for a `/Type /Pages` dictionary and reads its `/Count`.
fn pages_dictionary_count(bytes: &[u8]) -> Option<usize> {
    let mut idx = 0;
    while let Some(pos) = find_from(bytes, b"/Type", idx) {
        idx = pos + b"/Type".len();

        let window_end = pos.saturating_add(50).min(bytes.len());
        if find_from(&bytes[..window_end], b"/Pages", pos).is_none() {
            continue;
        }

        // /Count lives in the same dictionary, close by.
        let dict_end = pos.saturating_add(1000).min(bytes.len());
        if let Some(count) = count_value(&bytes[pos..dict_end]) {
            if count > 0 {
                return Some(count);
            }
        }
    }
    None
}

fn count_value(snippet: &[u8]) -> Option<usize> {
    let pos = find_from(snippet, b"/Count", 0)?;
    let digits: String = snippet[pos + b"/Count".len()..]
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take_while(|b| b.is_ascii_digit())
        .map(|b| *b as char)
        .collect();
    digits.parse().ok()
}

/// Fallback: count `/Type /Page` objects, excluding the `/Pages`
/// tree nodes themselves.
fn page_object_count(bytes: &[u8]) -> Option<usize> {
    let mut count = 0;
    let mut idx = 0;
    while let Some(pos) = find_from(bytes, b"/Type", idx) {
        idx = pos + b"/Type".len();

        let mut rest = &bytes[idx..];
        while let Some((first, tail)) = rest.split_first() {
            if first.is_ascii_whitespace() {
                rest = tail;
            } else {
                break;
            }
        }
        if rest.starts_with(b"/Page") && !rest.starts_with(b"/Pages") {
            count += 1;
        }
    }
    (count > 0).then_some(count)
}
