use aho_corasick::AhoCorasick;
use memchr::memchr;
use once_cell::sync::Lazy;

// Static initialization: automaton is built only once, thread-safe
static XML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'", "\r"])
        .expect("Failed to build XML escaper")
});

// Parsers normalize raw whitespace in attribute values to spaces, so tabs and
// line breaks must travel as character references.
static ATTR_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'", "\n", "\r", "\t"])
        .expect("Failed to build XML attribute escaper")
});

/// Escape XML special characters.
///
/// # Examples
///
/// ```
/// use litchi_pptx::common::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(escape_xml("<tag>\"hello\"</tag>"), "&lt;tag&gt;&quot;hello&quot;&lt;/tag&gt;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    XML_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&apos;", "&#xD;"])
}

/// Escape an attribute value. Besides the special characters, tab, line feed
/// and carriage return are written as character references.
///
/// # Examples
///
/// ```
/// use litchi_pptx::common::xml::escape_attr;
/// assert_eq!(escape_attr("a\nb\tc"), "a&#xA;b&#x9;c");
/// ```
#[inline]
pub fn escape_attr(s: &str) -> String {
    ATTR_ESCAPER.replace_all(
        s,
        &["&amp;", "&lt;", "&gt;", "&quot;", "&apos;", "&#xA;", "&#xD;", "&#x9;"],
    )
}

/// Resolve the body of an entity reference (the text between `&` and `;`).
///
/// Handles the five predefined entities and decimal/hex character references.
pub fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)
        },
    }
}

/// Unescape XML entities.
///
/// Replaces the predefined entities and numeric character references.
/// Unknown or malformed entities are left unchanged.
///
/// # Examples
///
/// ```
/// use litchi_pptx::common::xml::unescape_xml;
/// assert_eq!(unescape_xml("&lt;a &amp; b&gt;"), "<a & b>");
/// assert_eq!(unescape_xml("&quot;hello&apos;"), "\"hello'");
/// assert_eq!(unescape_xml("&amp;lt;"), "&lt;");
/// assert_eq!(unescape_xml("a & b"), "a & b");
/// assert_eq!(unescape_xml("&invalid;"), "&invalid;");
/// assert_eq!(unescape_xml("&#x41;&#66;"), "AB");
/// ```
pub fn unescape_xml(s: &str) -> String {
    let bytes = s.as_bytes();
    if memchr(b'&', bytes).is_none() {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut pos = 0;
    while let Some(offset) = memchr(b'&', &bytes[pos..]) {
        let amp = pos + offset;
        out.push_str(&s[pos..amp]);
        let resolved = memchr(b';', &bytes[amp..])
            .filter(|&len| len > 1 && len <= 10)
            .and_then(|len| resolve_entity(&s[amp + 1..amp + len]).map(|c| (c, len)));
        match resolved {
            Some((c, len)) => {
                out.push(c);
                pos = amp + len + 1;
            },
            None => {
                out.push('&');
                pos = amp + 1;
            },
        }
    }
    out.push_str(&s[pos..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_roundtrip() {
        let raw = "Q&A <draft> \"v1\" it's";
        assert_eq!(unescape_xml(&escape_xml(raw)), raw);
    }

    #[test]
    fn test_attribute_whitespace_is_referenced() {
        let raw = "line one\nline two\r\n\tindented";
        let escaped = escape_attr(raw);
        assert!(!escaped.contains(['\n', '\r', '\t']));
        assert_eq!(unescape_xml(&escaped), raw);
        assert_eq!(escape_xml("a\r\nb"), "a&#xD;\nb");
    }

    #[test]
    fn test_resolve_entity() {
        assert_eq!(resolve_entity("amp"), Some('&'));
        assert_eq!(resolve_entity("#x20"), Some(' '));
        assert_eq!(resolve_entity("#169"), Some('©'));
        assert_eq!(resolve_entity("nbsp"), None);
        assert_eq!(resolve_entity("#xZZ"), None);
    }

    #[test]
    fn test_unescape_incomplete() {
        assert_eq!(unescape_xml("&amp"), "&amp");
        assert_eq!(unescape_xml("tail &"), "tail &");
    }
}
