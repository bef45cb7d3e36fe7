//! formkit test utilities.
//!
//! Helpers for testing: renderer fixtures, stub request collaborators, and
//! regex-based inspection of rendered markup.

// Test helpers are allowed to panic on bad fixtures.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashSet;
use std::sync::LazyLock;

use formkit::{ErrorBag, ErrorOracle, FormRenderer, Model, OldInput};
use regex::Regex;
use serde_json::Value;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(input|option|label|form|textarea|select)\b([^>]*)>").unwrap()
});
static ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.\[\]]*)(?:="([^"]*)")?"#).unwrap());
static SELECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<select\b([^>]*)>(.*?)</select>").unwrap());
static OPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<option\b([^>]*)>(.*?)</option>").unwrap());

/// A renderer with no old input, no errors and a fixed token.
pub fn renderer() -> FormRenderer {
    FormRenderer::new(OldInput::new(), ErrorBag::new(), TEST_TOKEN)
}

/// The CSRF token used by [`renderer`].
pub const TEST_TOKEN: &str = "test-token";

/// A renderer over the given old input and errors.
pub fn renderer_with(old_input: OldInput, errors: ErrorBag) -> FormRenderer {
    FormRenderer::new(old_input, errors, TEST_TOKEN)
}

/// Build a model from a JSON object literal.
///
/// # Panics
///
/// Panics if `value` is not an object.
pub fn model(value: Value) -> Model {
    Model::try_from(value).expect("model fixture must be a JSON object")
}

/// An error oracle that flags a fixed set of fields.
#[derive(Debug, Clone, Default)]
pub struct FlaggedFields {
    fields: HashSet<String>,
}

impl FlaggedFields {
    pub fn new(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl ErrorOracle for FlaggedFields {
    fn has_error(&self, field: &str) -> bool {
        self.fields.contains(field)
    }
}

/// One parsed start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTag {
    pub name: String,
    /// Attributes in source order; bare attributes have no value.
    pub attributes: Vec<(String, Option<String>)>,
}

impl ParsedTag {
    /// Value of an attribute; bare attributes read as an empty string.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_deref().unwrap_or_default())
    }

    pub fn has(&self, name: &str) -> bool {
        self.attributes.iter().any(|(key, _)| key == name)
    }

    /// Attribute names in source order.
    pub fn keys(&self) -> Vec<&str> {
        self.attributes.iter().map(|(key, _)| key.as_str()).collect()
    }
}

fn parse_attributes(source: &str) -> Vec<(String, Option<String>)> {
    ATTR_RE
        .captures_iter(source)
        .map(|caps| {
            let key = caps[1].to_string();
            let value = caps.get(2).map(|m| m.as_str().to_string());
            (key, value)
        })
        .collect()
}

/// All start tags of the given element name, in document order.
pub fn tags(html: &str, element: &str) -> Vec<ParsedTag> {
    TAG_RE
        .captures_iter(html)
        .filter(|caps| &caps[1] == element)
        .map(|caps| ParsedTag {
            name: caps[1].to_string(),
            attributes: parse_attributes(&caps[2]),
        })
        .collect()
}

/// The value of the hidden input named `name`, if present.
pub fn hidden_value(html: &str, name: &str) -> Option<String> {
    tags(html, "input")
        .into_iter()
        .find(|tag| tag.get("type") == Some("hidden") && tag.get("name") == Some(name))
        .and_then(|tag| tag.get("value").map(str::to_string))
}

/// Values of the checked checkboxes or radios named `name`.
pub fn checked_values(html: &str, name: &str) -> Vec<String> {
    tags(html, "input")
        .into_iter()
        .filter(|tag| tag.get("name") == Some(name) && tag.has("checked"))
        .filter_map(|tag| tag.get("value").map(str::to_string))
        .collect()
}

/// One `<option>` of a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOption {
    pub value: String,
    pub text: String,
    pub selected: bool,
}

/// Options of every select in the fragment, in document order.
pub fn parse_options(html: &str) -> Vec<ParsedOption> {
    OPTION_RE
        .captures_iter(html)
        .map(|caps| {
            let attributes = parse_attributes(&caps[1]);
            let tag = ParsedTag {
                name: "option".to_string(),
                attributes,
            };
            ParsedOption {
                value: tag.get("value").unwrap_or_default().to_string(),
                text: caps[2].to_string(),
                selected: tag.has("selected"),
            }
        })
        .collect()
}

/// Options of the select named `name`.
pub fn select_options(html: &str, name: &str) -> Vec<ParsedOption> {
    SELECT_RE
        .captures_iter(html)
        .find(|caps| {
            parse_attributes(&caps[1])
                .iter()
                .any(|(key, value)| key == "name" && value.as_deref() == Some(name))
        })
        .map(|caps| parse_options(&caps[2]))
        .unwrap_or_default()
}

/// Values of the selected options of the select named `name`.
pub fn selected_values(html: &str, name: &str) -> Vec<String> {
    select_options(html, name)
        .into_iter()
        .filter(|option| option.selected)
        .map(|option| option.value)
        .collect()
}

/// Assertion helpers for rendered markup.
pub mod assert {
    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected markup to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected markup to NOT contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that no raw `<`, `>` or `"` appears inside attribute values and
    /// every `&` starts a character reference.
    pub fn well_escaped_attributes(html: &str) {
        for tag in super::TAG_RE.captures_iter(html) {
            for (key, value) in super::parse_attributes(&tag[2]) {
                let Some(value) = value else { continue };
                assert!(
                    !value.contains('<') && !value.contains('>'),
                    "Attribute '{key}' carries a raw angle bracket: {value}"
                );
                for (index, _) in value.match_indices('&') {
                    let rest = &value[index + 1..];
                    let terminated = rest.find(';').is_some_and(|end| {
                        end > 0
                            && rest[..end]
                                .chars()
                                .all(|c| c.is_ascii_alphanumeric() || c == '#')
                    });
                    assert!(terminated, "Attribute '{key}' carries a bare ampersand: {value}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = concat!(
        r#"<input value="tok" class="" type="hidden" name="_token">"#,
        r#"<label><input type="checkbox" name="tags[]" value="a"> A</label>"#,
        r#"<label><input type="checkbox" name="tags[]" value="b" checked> B</label>"#,
        r#"<select class="" name="kind" id="kind"><option value="">Pick</option>"#,
        r#"<option value="x" selected>X &amp; Y</option></select>"#,
    );

    #[test]
    fn test_hidden_value() {
        assert_eq!(hidden_value(SAMPLE, "_token").as_deref(), Some("tok"));
        assert_eq!(hidden_value(SAMPLE, "_method"), None);
    }

    #[test]
    fn test_checked_values() {
        assert_eq!(checked_values(SAMPLE, "tags[]"), vec!["b"]);
        assert!(checked_values(SAMPLE, "tags").is_empty());
    }

    #[test]
    fn test_select_options() {
        let options = select_options(SAMPLE, "kind");
        assert_eq!(options.len(), 2);
        assert_eq!(options[1].text, "X &amp; Y");
        assert_eq!(selected_values(SAMPLE, "kind"), vec!["x"]);
        assert!(select_options(SAMPLE, "other").is_empty());
    }

    #[test]
    fn test_tag_attribute_order() {
        let hidden = &tags(SAMPLE, "input")[0];
        assert_eq!(hidden.keys(), vec!["value", "class", "type", "name"]);
        assert_eq!(hidden.get("class"), Some(""));
    }

    #[test]
    fn test_escaping_assertion() {
        assert::well_escaped_attributes(SAMPLE);
        assert::well_escaped_attributes(r#"<input value="a &amp; b &#039;c&#039;">"#);
    }

    #[test]
    #[should_panic(expected = "bare ampersand")]
    fn test_escaping_assertion_catches_bare_ampersand() {
        assert::well_escaped_attributes(r#"<input value="a & b">"#);
    }

    #[test]
    fn test_flagged_fields() {
        let oracle = FlaggedFields::new(&["email"]);
        assert!(oracle.has_error("email"));
        assert!(!oracle.has_error("name"));
    }
}
