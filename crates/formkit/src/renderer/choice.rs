//! Choice controls: selects, checkbox and radio groups, and the button bar.

use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;
use crate::html::{HtmlFragment, escape_attribute};

use super::{FormRenderer, is_blank};

/// Ordered `(key, label)` choices.
///
/// Keys are unique; inserting an existing key replaces its label in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Items {
    entries: Vec<(String, String)>,
}

impl Items {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.insert(key, label);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, label: impl Into<String>) {
        let key = key.into();
        let label = label.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = label,
            None => self.entries.push((key, label)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Items {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut items = Items::new();
        for (key, label) in iter {
            items.insert(key, label);
        }
        items
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for Items {
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Items {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl FormRenderer {
    /// A single `<select>` led by an empty placeholder option.
    ///
    /// The option matching the resolved value is selected; with nothing
    /// resolved that is the placeholder. An item with an empty key is
    /// shadowed by the placeholder.
    pub fn select(
        &self,
        name: &str,
        label: &str,
        required: bool,
        items: impl Into<Items>,
        attributes: Attributes,
    ) -> HtmlFragment {
        let defaults = self.control_defaults(Attributes::new(), name, name, required, &attributes);
        let mut attributes = Attributes::merge(&defaults, &attributes);

        let for_id = attributes.get_text("id").unwrap_or(name);
        let label = self.label(for_id, label, required);

        let mut options = Items::new().with("", self.config.select_placeholder.as_str());
        let items: Items = items.into();
        for (key, text) in items.entries {
            if !key.is_empty() {
                options.insert(key, text);
            }
        }

        let selected = self.resolve_value(name, &attributes);
        let options: String = options
            .iter()
            .map(|(key, text)| render_option(key, text, key == selected))
            .collect();

        attributes.remove("value");

        let select = format!("<select {}>{options}</select>", attributes.to_html());
        Self::template(&label, &select)
    }

    /// A [`select`](Self::select) tagged with the `select2` class.
    pub fn select2(
        &self,
        name: &str,
        label: &str,
        required: bool,
        items: impl Into<Items>,
        attributes: Attributes,
    ) -> HtmlFragment {
        let mut attributes = attributes;
        attributes.prepend_class("select2");
        self.select(name, label, required, items, attributes)
    }

    /// A `<select multiple>`.
    ///
    /// `name` may carry a trailing `[]` for array submission; it is kept in
    /// the markup but stripped when looking up errors and values. Models
    /// supply the selection under `{name}_dropdown`.
    pub fn multiselect(
        &self,
        name: &str,
        label: &str,
        required: bool,
        items: impl Into<Items>,
        attributes: Attributes,
    ) -> HtmlFragment {
        let bare_name = name.replace("[]", "");

        let defaults = self
            .control_defaults(Attributes::new(), name, &bare_name, required, &attributes)
            .with("multiple", true);
        let mut attributes = Attributes::merge(&defaults, &attributes);

        let for_id = attributes.get_text("id").unwrap_or(name);
        let label = self.label(for_id, label, required);

        let selected = self.resolve_values(&bare_name, &attributes);
        let items: Items = items.into();
        let options: String = items
            .iter()
            .map(|(key, text)| render_option(key, text, selected.iter().any(|s| s == key)))
            .collect();

        attributes.remove("value");

        let select = format!("<select {}>{options}</select>", attributes.to_html());
        Self::template(&label, &select)
    }

    /// A [`multiselect`](Self::multiselect) tagged with the `select2` class.
    pub fn multiselect2(
        &self,
        name: &str,
        label: &str,
        required: bool,
        items: impl Into<Items>,
        attributes: Attributes,
    ) -> HtmlFragment {
        let mut attributes = attributes;
        attributes.prepend_class("select2");
        self.multiselect(name, label, required, items, attributes)
    }

    /// A group of checkboxes sharing `name`.
    ///
    /// `checked` is used as the explicit selection only when non-empty, so
    /// old input still wins and the model's `{name}_dropdown` still applies.
    pub fn checkbox<I, S>(
        &self,
        name: &str,
        label: &str,
        items: impl Into<Items>,
        checked: I,
    ) -> HtmlFragment
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let label = self.label(name, label, false);
        let bare_name = name.replace("[]", "");

        let checked: Vec<String> = checked.into_iter().map(Into::into).collect();
        let explicit = if checked.is_empty() {
            Attributes::new()
        } else {
            Attributes::new().with("value", checked)
        };
        let checked = self.resolve_values(&bare_name, &explicit);

        let items: Items = items.into();
        let fields: String = items
            .iter()
            .map(|(key, text)| {
                render_choice("checkbox", name, key, text, checked.iter().any(|c| c == key))
            })
            .collect();

        Self::template(&label, &fields)
    }

    /// A group of radio buttons sharing `name`.
    ///
    /// An empty or `"0"` `checked` leaves the selection to old input and the
    /// model.
    pub fn radio(
        &self,
        name: &str,
        label: &str,
        items: impl Into<Items>,
        checked: &str,
    ) -> HtmlFragment {
        let label = self.label(name, label, false);

        let explicit = if is_blank(checked) {
            Attributes::new()
        } else {
            Attributes::new().with("value", checked)
        };
        let checked = self.resolve_value(name, &explicit);

        let items: Items = items.into();
        let fields: String = items
            .iter()
            .map(|(key, text)| render_choice("radio", name, key, text, key == checked))
            .collect();

        Self::template(&label, &fields)
    }

    /// The submit button bar, with an optional cancel link.
    ///
    /// `None` for the label uses the configured submit label.
    pub fn buttons(&self, submit_label: Option<&str>, cancel_link: Option<&str>) -> HtmlFragment {
        let submit_label = submit_label.unwrap_or(self.config.submit_label.as_str());

        let mut html = String::from(r#"<div class="form-buttons"><div>"#);
        html.push_str(&format!(
            r#"<button class="Button _primary" type="submit">{}</button>"#,
            escape_attribute(submit_label)
        ));

        if let Some(link) = cancel_link.filter(|l| !l.is_empty()) {
            html.push_str(&format!(
                r#"<a href="{}" class="Button _secondary _outline">{}</a>"#,
                escape_attribute(link),
                escape_attribute(&self.config.cancel_label)
            ));
        }

        html.push_str("</div></div>");
        HtmlFragment::new(html)
    }
}

fn render_option(key: &str, text: &str, selected: bool) -> String {
    format!(
        r#"<option value="{}"{}>{}</option>"#,
        escape_attribute(key),
        if selected { " selected" } else { "" },
        escape_attribute(text)
    )
}

fn render_choice(input_type: &str, name: &str, key: &str, text: &str, checked: bool) -> String {
    format!(
        r#"<label><input type="{input_type}" name="{}" value="{}"{}> {}</label>"#,
        escape_attribute(name),
        escape_attribute(key),
        if checked { " checked" } else { "" },
        escape_attribute(text)
    )
}
