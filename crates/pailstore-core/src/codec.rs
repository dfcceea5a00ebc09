//! Line codec for the flat-file disk format
//!
//! Each persisted entry is one text line, `escapedKey:escapedValue`. Three
//! characters are escaped, in a single pass per string:
//!
//! - `\` → `\\`
//! - newline → `\n` (backslash + n, two characters)
//! - `:` → `::`
//!
//! Decoding runs one left-to-right scan that tracks escape state character
//! by character; the first colon that is not part of a `::` pair is the
//! key/value separator. A line with no such colon is malformed and the
//! loader skips it.

/// Escape one key or value for embedding in a line.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            ':' => out.push_str("::"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape`]. Unknown escape sequences and stray colons are kept
/// literally — the load path skips rather than fails.
pub fn unescape(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some('n') => {
                    chars.next();
                    out.push('\n');
                }
                Some('\\') => {
                    chars.next();
                    out.push('\\');
                }
                _ => out.push('\\'),
            },
            ':' => {
                if chars.peek() == Some(&':') {
                    chars.next();
                }
                out.push(':');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Encode one entry as a line: `escapedKey:escapedValue`.
pub fn encode_line(key: &str, value: &str) -> String {
    let mut line = escape(key);
    line.push(':');
    line.push_str(&escape(value));
    line
}

/// Decode a line into `(key, value)`, splitting at the first unescaped
/// colon. Returns `None` for a malformed line (no separator).
pub fn decode_line(line: &str) -> Option<(String, String)> {
    let mut key = String::new();
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some('n') => {
                    chars.next();
                    key.push('\n');
                }
                Some('\\') => {
                    chars.next();
                    key.push('\\');
                }
                _ => key.push('\\'),
            },
            ':' => {
                if chars.peek() == Some(&':') {
                    chars.next();
                    key.push(':');
                } else {
                    let rest: String = chars.collect();
                    return Some((key, unescape(&rest)));
                }
            }
            _ => key.push(c),
        }
    }
    None
}
