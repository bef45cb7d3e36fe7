//! Escaped HTML output and attribute escaping.

use std::fmt;

use axum::response::{Html, IntoResponse, Response};
use serde::{Serialize, Serializer};

/// A fragment of HTML that has already been escaped.
///
/// Every value placed inside an attribute or element body by the renderer is
/// escaped exactly once before it lands here, so callers must emit the
/// fragment verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlFragment(String);

impl HtmlFragment {
    /// Wrap markup that is already safe to emit.
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    /// Borrow the markup.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take ownership of the markup.
    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for HtmlFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HtmlFragment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<HtmlFragment> for String {
    fn from(fragment: HtmlFragment) -> Self {
        fragment.0
    }
}

impl Serialize for HtmlFragment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl IntoResponse for HtmlFragment {
    fn into_response(self) -> Response {
        Html(self.0).into_response()
    }
}

/// Escape a string for use inside a double- or single-quoted attribute value
/// or element body.
///
/// Existing character references (`&amp;`, `&#039;`, `&#x27;`) are left
/// intact so a value that round-trips through a previous render is not
/// escaped twice.
pub fn escape_attribute(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for (i, ch) in input.char_indices() {
        match ch {
            '&' if starts_char_reference(&input[i..]) => output.push('&'),
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#039;"),
            _ => output.push(ch),
        }
    }
    output
}

/// Longest reference body looked at after `&`.
const MAX_REFERENCE_LEN: usize = 32;

/// Whether `s` (which starts with `&`) opens a named, decimal or hex
/// character reference terminated by `;`.
///
/// Named references are matched by shape only: any `&name;` made of ASCII
/// letters and digits is kept, known entity or not.
fn starts_char_reference(s: &str) -> bool {
    let Some(rest) = s.strip_prefix('&') else {
        return false;
    };

    let end = rest
        .bytes()
        .take(MAX_REFERENCE_LEN + 1)
        .position(|b| !(b.is_ascii_alphanumeric() || b == b'#'))
        .unwrap_or(MAX_REFERENCE_LEN + 1);
    if end > MAX_REFERENCE_LEN || rest.as_bytes().get(end) != Some(&b';') {
        return false;
    }
    let body = &rest[..end];

    if let Some(num) = body.strip_prefix('#') {
        if let Some(hex) = num.strip_prefix(['x', 'X']) {
            return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
        }
        return !num.is_empty() && num.chars().all(|c| c.is_ascii_digit());
    }

    let mut chars = body.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_special_chars() {
        assert_eq!(
            escape_attribute(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#039;Jerry&#039;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_keeps_existing_entities() {
        assert_eq!(escape_attribute("a &amp; b"), "a &amp; b");
        assert_eq!(escape_attribute("&#039;quoted&#x27;"), "&#039;quoted&#x27;");
        assert_eq!(escape_attribute("&lt;b&gt;"), "&lt;b&gt;");
    }

    #[test]
    fn test_escape_bare_ampersands() {
        assert_eq!(escape_attribute("a & b"), "a &amp; b");
        assert_eq!(escape_attribute("&;"), "&amp;;");
        assert_eq!(escape_attribute("&#;"), "&amp;#;");
        assert_eq!(escape_attribute("&#xZZ;"), "&amp;#xZZ;");
        assert_eq!(escape_attribute("R&D"), "R&amp;D");
        assert_eq!(escape_attribute("&1abc;"), "&amp;1abc;");
        assert_eq!(escape_attribute("& b;"), "&amp; b;");
        assert_eq!(escape_attribute("&a#b;"), "&amp;a#b;");
    }

    #[test]
    fn test_escape_keeps_unknown_named_shapes() {
        assert_eq!(escape_attribute("&foo;"), "&foo;");
        assert_eq!(escape_attribute("x &eacute; y"), "x &eacute; y");
    }

    #[test]
    fn test_escape_distant_semicolon() {
        let input = format!("&{};", "a".repeat(MAX_REFERENCE_LEN + 1));
        assert_eq!(escape_attribute(&input), format!("&amp;{}", &input[1..]));

        let spaced = format!("R&D {} end;", "x".repeat(10_000));
        assert!(escape_attribute(&spaced).starts_with("R&amp;D "));
    }

    #[test]
    fn test_escape_many_ampersands_is_linear() {
        let input = "&".repeat(1_000_000);
        let started = std::time::Instant::now();
        let escaped = escape_attribute(&input);
        assert_eq!(escaped.len(), input.len() * 5);
        assert!(started.elapsed() < std::time::Duration::from_secs(2));

        let trailing = format!("{};", "&".repeat(200_000));
        assert!(escape_attribute(&trailing).ends_with("&amp;;"));
    }

    #[test]
    fn test_escape_is_idempotent() {
        let once = escape_attribute(r#"<"it's" & more>"#);
        assert_eq!(escape_attribute(&once), once);
    }

    #[test]
    fn test_escape_plain_and_empty() {
        assert_eq!(escape_attribute("hello world"), "hello world");
        assert_eq!(escape_attribute(""), "");
        assert_eq!(escape_attribute("ação"), "ação");
    }

    #[test]
    fn test_fragment_serializes_as_string() {
        let fragment = HtmlFragment::new("<b>x</b>");
        assert_eq!(serde_json::to_string(&fragment).unwrap(), r#""<b>x</b>""#);
        assert_eq!(fragment.to_string(), "<b>x</b>");
    }
}
