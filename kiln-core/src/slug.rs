/// Derive a URL-safe identifier from a title.
///
/// Lower-cases the input and drops everything that is not a letter, digit,
/// whitespace or hyphen. Each run of whitespace and hyphens becomes a
/// single hyphen, and none are left at either end, so slugging a slug is a
/// no-op.
pub fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_separator = false;

    for c in title.to_lowercase().chars() {
        if c.is_whitespace() || c == '-' {
            pending_separator = true;
            continue;
        }
        if !c.is_alphanumeric() {
            continue;
        }
        if pending_separator && !out.is_empty() {
            out.push('-');
        }
        pending_separator = false;
        out.push(c);
    }

    out
}
