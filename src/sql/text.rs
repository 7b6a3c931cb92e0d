//! Plain-text helpers for laying out generated SQL.
//!
//! Indentation here is cosmetic: nothing downstream depends on it.

/// Indent every line of `text` by `width` spaces.
pub fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    let mut out = String::with_capacity(text.len() + pad.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&pad);
        out.push_str(line);
    }
    out
}

/// Join column expressions with `", "`.
pub fn cols_to_str<S: AsRef<str>>(cols: &[S]) -> String {
    cols.iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Join column expressions one per line, indented by `width` spaces.
pub fn cols_to_lines<S: AsRef<str>>(cols: &[S], width: usize) -> String {
    let joined = cols
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join(",\n");
    indent(&joined, width)
}
