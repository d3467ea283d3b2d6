//! Unified line diffs for description changes.

use similar::TextDiff;

/// Lines of context around each hunk.
const CONTEXT_LINES: usize = 3;

/// Compute a unified diff between two texts.
///
/// Both sides are terminated with a newline before diffing so a missing
/// final newline never shows up as a change. An absent side counts as an
/// empty text. The file headers carry empty names (`--- ` / `+++ `), and
/// equal inputs produce an empty string.
pub fn text_diff(old: Option<&str>, new: Option<&str>) -> String {
    let old = ensure_newline_end(old.unwrap_or_default());
    let new = ensure_newline_end(new.unwrap_or_default());

    TextDiff::from_lines(old.as_str(), new.as_str())
        .unified_diff()
        .context_radius(CONTEXT_LINES)
        .header("", "")
        .to_string()
}

fn ensure_newline_end(text: &str) -> String {
    let mut text = text.to_string();
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
