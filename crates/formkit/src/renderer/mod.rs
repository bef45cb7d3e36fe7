//! Per-request form renderer.
//!
//! A [`FormRenderer`] is built once per request from the old input, the
//! validation errors and the session's CSRF token. Call [`FormRenderer::open`],
//! any number of field helpers, then [`FormRenderer::close`]. Every field
//! resolves its value in this order:
//!
//! 1. old input flashed from the previous submission (never for `_method`),
//! 2. an explicit `value` attribute,
//! 3. the model bound by `open`,
//! 4. empty.

mod choice;
mod input;

use tracing::debug;

use crate::attributes::Attributes;
use crate::config::RenderConfig;
use crate::context::{ErrorOracle, RequestValueSource};
use crate::html::{HtmlFragment, escape_attribute};
use crate::value::Model;

pub use choice::Items;

/// Methods a plain HTML form cannot submit; they travel as `_method`.
const SPOOFED_METHODS: [&str; 3] = ["DELETE", "PATCH", "PUT"];

/// Renders form markup against one request's context.
pub struct FormRenderer {
    request: Box<dyn RequestValueSource + Send + Sync>,
    errors: Box<dyn ErrorOracle + Send + Sync>,
    csrf_token: String,
    config: RenderConfig,
    model: Option<Model>,
}

impl FormRenderer {
    /// Create a renderer with the default configuration.
    pub fn new(
        request: impl RequestValueSource + Send + Sync + 'static,
        errors: impl ErrorOracle + Send + Sync + 'static,
        csrf_token: impl Into<String>,
    ) -> Self {
        Self {
            request: Box::new(request),
            errors: Box::new(errors),
            csrf_token: csrf_token.into(),
            config: RenderConfig::default(),
            model: None,
        }
    }

    /// Replace the rendering configuration.
    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// The model bound by the last `open`, if the form is still open.
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// Open a form.
    ///
    /// Any method other than `GET` submits as `POST`; `PUT`, `PATCH` and
    /// `DELETE` add a `_method` field and every non-`GET` form gets the CSRF
    /// `_token` field. A `None` model leaves an earlier binding in place.
    pub fn open(
        &mut self,
        action: &str,
        method: &str,
        model: Option<Model>,
        attributes: Attributes,
    ) -> HtmlFragment {
        let requested = method.to_uppercase();
        let effective = if requested == "GET" { "GET" } else { "POST" };

        let defaults = Attributes::new()
            .with("action", action)
            .with("method", effective)
            .with("class", vec![self.config.form_class.clone()]);
        let attributes = Attributes::merge(&defaults, &attributes);

        if let Some(model) = model {
            self.model = Some(model);
        }

        debug!(
            action = %action,
            method = %requested,
            bound_model = self.model.is_some(),
            "opening form"
        );

        let mut html = format!("<form {}>\n", attributes.to_html());
        html.push_str(&self.appendage(&requested));
        HtmlFragment::new(html)
    }

    /// Close the form and drop the bound model.
    pub fn close(&mut self) -> HtmlFragment {
        if self.model.take().is_some() {
            debug!("closing form, model unbound");
        }
        HtmlFragment::new("</form>")
    }

    /// A bare hidden input. Its value must be given explicitly.
    pub fn hidden(&self, name: &str, attributes: Attributes) -> HtmlFragment {
        let defaults = Attributes::new().with("type", "hidden").with("name", name);
        let attributes = Attributes::merge(&defaults, &attributes);
        HtmlFragment::new(format!("<input {}>", attributes.to_html()))
    }

    /// A `<label>` for the element with the given id, or an empty string when
    /// there is no text. A text of `"0"` counts as none.
    pub fn label(&self, for_id: &str, text: &str, required: bool) -> String {
        if is_blank(text) {
            return String::new();
        }

        let mut text = escape_attribute(text);
        if required {
            text.push('*');
        }

        let mut attributes = Attributes::new().with("for", for_id);
        if self.errors.has_error(for_id) {
            attributes.push_class(self.config.error_class.as_str());
        }

        format!("<label {}>{text}</label>", attributes.to_html())
    }

    /// Hidden fields that follow the opening tag for the requested method.
    fn appendage(&self, method: &str) -> String {
        let mut html = String::new();

        if SPOOFED_METHODS.contains(&method) {
            html.push_str(self.hidden("_method", Attributes::new().with("value", method)).as_str());
            html.push('\n');
        }

        if method != "GET" {
            let token = Attributes::new().with("value", self.csrf_token.as_str());
            html.push_str(self.hidden("_token", token).as_str());
            html.push('\n');
        }

        html
    }

    /// Resolve a single-valued field.
    fn resolve_value(&self, name: &str, attributes: &Attributes) -> String {
        if name != "_method" {
            if let Some(old) = self.request.old_value(name) {
                return old.to_single();
            }
        }

        if let Some(value) = attributes.get("value").filter(|v| v.is_present()) {
            return value.to_single();
        }

        self.model
            .as_ref()
            .and_then(|model| model.single(name))
            .unwrap_or_default()
    }

    /// Resolve a multi-valued field. Models provide these under
    /// `{name}_dropdown`.
    fn resolve_values(&self, name: &str, attributes: &Attributes) -> Vec<String> {
        if name != "_method" {
            if let Some(old) = self.request.old_value(name) {
                return old.to_list();
            }
        }

        if let Some(value) = attributes.get("value").filter(|v| v.is_present()) {
            return value.to_list();
        }

        self.model
            .as_ref()
            .and_then(|model| model.list(&format!("{name}_dropdown")))
            .unwrap_or_default()
    }

    /// Defaults shared by every labelled control, appended to `leading`, with
    /// the error class applied when `error_key` has an error.
    fn control_defaults(
        &self,
        leading: Attributes,
        name: &str,
        error_key: &str,
        required: bool,
        attributes: &Attributes,
    ) -> Attributes {
        let id = attributes.get_text("id").unwrap_or(name).to_string();
        let mut defaults = leading
            .with("name", name)
            .with("id", id)
            .with("required", required);
        if self.errors.has_error(error_key) {
            defaults.push_class(self.config.error_class.as_str());
        }
        defaults
    }

    /// Wrap a label and control in the field template.
    fn template(label: &str, control: &str) -> HtmlFragment {
        HtmlFragment::new(format!(
            r#"<div class="form-item">{label}<div>{control}</div></div>"#
        ))
    }
}

/// Empty or `"0"`, the two strings a form argument treats as unset.
fn is_blank(value: &str) -> bool {
    value.is_empty() || value == "0"
}

impl std::fmt::Debug for FormRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormRenderer")
            .field("config", &self.config)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::context::{ErrorBag, OldInput};

    fn renderer() -> FormRenderer {
        FormRenderer::new(OldInput::new(), ErrorBag::new(), "tok123")
    }

    fn model(value: serde_json::Value) -> Option<Model> {
        Some(Model::try_from(value).unwrap())
    }

    #[test]
    fn test_open_get_has_no_hidden_fields() {
        let mut form = renderer();
        let html = form.open("/search", "get", None, Attributes::new());
        assert_eq!(
            html.as_str(),
            "<form class=\"Form\" action=\"/search\" method=\"GET\">\n"
        );
    }

    #[test]
    fn test_open_post_adds_token() {
        let mut form = renderer();
        let html = form.open("/save", "POST", None, Attributes::new());
        assert_eq!(
            html.as_str(),
            "<form class=\"Form\" action=\"/save\" method=\"POST\">\n\
             <input value=\"tok123\" class=\"\" type=\"hidden\" name=\"_token\">\n"
        );
    }

    #[test]
    fn test_open_spoofs_methods() {
        for method in ["put", "PATCH", "Delete"] {
            let mut form = renderer();
            let html = form.open("/item/1", method, None, Attributes::new());
            let upper = method.to_uppercase();
            assert!(html.as_str().contains(r#"method="POST""#));
            assert!(html.as_str().contains(&format!(
                r#"<input value="{upper}" class="" type="hidden" name="_method">"#
            )));
            assert!(html.as_str().contains(r#"name="_token""#));
        }
    }

    #[test]
    fn test_open_merges_caller_attributes() {
        let mut form = renderer();
        let attrs = Attributes::new()
            .with("class", "wide")
            .with("method", "DELETE")
            .with("enctype", "multipart/form-data");
        let html = form.open("/upload", "post", None, attrs);
        assert!(html.as_str().starts_with(
            r#"<form class="Form wide" method="POST" enctype="multipart/form-data" action="/upload">"#
        ));
    }

    #[test]
    fn test_close_clears_model() {
        let mut form = renderer();
        assert_eq!(form.close().as_str(), "</form>");

        form.open("/x", "post", model(json!({"name": "Ana"})), Attributes::new());
        assert!(form.model().is_some());
        form.close();
        assert!(form.model().is_none());
    }

    #[test]
    fn test_open_without_model_keeps_binding() {
        let mut form = renderer();
        form.open("/x", "post", model(json!({"name": "Ana"})), Attributes::new());
        form.open("/y", "post", None, Attributes::new());
        assert!(form.model().is_some());
    }

    #[test]
    fn test_label() {
        let form = FormRenderer::new(OldInput::new(), ErrorBag::new().with("email", "bad"), "");
        assert_eq!(form.label("email", "", true), "");
        assert_eq!(form.label("email", "0", true), "");
        assert_eq!(form.label("name", "Name", false), r#"<label for="name">Name</label>"#);
        assert_eq!(form.label("name", "Name", true), r#"<label for="name">Name*</label>"#);
        assert_eq!(
            form.label("email", "E-mail", true),
            r#"<label for="email" class="_error">E-mail*</label>"#
        );
        assert_eq!(
            form.label("q", "Q & <A>", false),
            r#"<label for="q">Q &amp; &lt;A&gt;</label>"#
        );
    }

    #[test]
    fn test_value_precedence() {
        let with_value = Attributes::new().with("value", "B");

        let mut form = FormRenderer::new(OldInput::new().with("f", "A"), ErrorBag::new(), "");
        form.open("/", "post", model(json!({"f": "C"})), Attributes::new());
        assert_eq!(form.resolve_value("f", &with_value), "A");

        let mut form = renderer();
        form.open("/", "post", model(json!({"f": "C"})), Attributes::new());
        assert_eq!(form.resolve_value("f", &with_value), "B");
        assert_eq!(form.resolve_value("f", &Attributes::new()), "C");

        let form = renderer();
        assert_eq!(form.resolve_value("f", &Attributes::new()), "");
    }

    #[test]
    fn test_old_input_ignored_for_method_field() {
        let form = FormRenderer::new(OldInput::new().with("_method", "PUT"), ErrorBag::new(), "");
        let attrs = Attributes::new().with("value", "DELETE");
        assert_eq!(form.resolve_value("_method", &attrs), "DELETE");
    }

    #[test]
    fn test_multi_value_precedence() {
        let mut form = renderer();
        form.open("/", "post", model(json!({"tags_dropdown": [1, 2]})), Attributes::new());
        assert_eq!(form.resolve_values("tags", &Attributes::new()), vec!["1", "2"]);
        assert_eq!(
            form.resolve_values("tags", &Attributes::new().with("value", "9")),
            vec!["9"]
        );
        assert!(form.resolve_values("tags_dropdown", &Attributes::new()).is_empty());

        let form = FormRenderer::new(OldInput::new().with("tags", "5"), ErrorBag::new(), "");
        assert_eq!(form.resolve_values("tags", &Attributes::new()), vec!["5"]);
    }
}
