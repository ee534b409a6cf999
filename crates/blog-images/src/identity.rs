//! Escaped image identities for flat photo hosts
//!
//! A flat host has no directories, so the relative path of an image is
//! folded into its file name: every `/` becomes [`SEPARATOR_ESCAPE`] and the
//! result is prefixed with [`IDENTITY_MARKER`]. The marker tells our own
//! uploads apart from photos that arrived some other way.

/// Latin-1 "not sign", marks a file name as an encoded path.
pub const IDENTITY_MARKER: char = '\u{00AC}';

/// Latin-1 "broken bar", stands in for `/`.
pub const SEPARATOR_ESCAPE: char = '\u{00A6}';

/// Encode a post-relative image path as a flat file name.
pub fn encode(rel_path: &str) -> String {
    let mut encoded = String::with_capacity(rel_path.len() + 4);
    encoded.push(IDENTITY_MARKER);
    for ch in rel_path.chars() {
        encoded.push(if ch == '/' { SEPARATOR_ESCAPE } else { ch });
    }
    encoded
}

/// Decode a file name produced by [`encode`]; `None` if it carries no marker.
pub fn decode(name: &str) -> Option<String> {
    name.strip_prefix(IDENTITY_MARKER)
        .map(|rest| rest.replace(SEPARATOR_ESCAPE, "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_with_sentinels() {
        assert_eq!(encode("2024-03-01-hello/cat.png"), "¬2024-03-01-hello¦cat.png");
        assert_eq!(encode("cat.png"), "¬cat.png");
    }

    #[test]
    fn decodes_only_marked_names() {
        assert_eq!(decode("¬img¦cat.png").as_deref(), Some("img/cat.png"));
        assert_eq!(decode("cat.png"), None);
        assert_eq!(decode("img¦cat.png"), None);
    }
}
