//! `<input>` helpers and `<textarea>`.

use crate::attributes::Attributes;
use crate::html::{HtmlFragment, escape_attribute};

use super::FormRenderer;

/// Input types that never get a repopulated `value`.
const SKIP_VALUE_TYPES: [&str; 4] = ["file", "password", "checkbox", "radio"];

impl FormRenderer {
    /// A labelled `<input>` of any type.
    pub fn input(
        &self,
        input_type: &str,
        name: &str,
        label: &str,
        required: bool,
        attributes: Attributes,
    ) -> HtmlFragment {
        let mut attributes = attributes;
        let leading = Attributes::new().with("type", input_type);
        let defaults = self.control_defaults(leading, name, name, required, &attributes);

        if !SKIP_VALUE_TYPES.contains(&input_type) {
            let value = self.resolve_value(name, &attributes);
            attributes.set("value", value);
        }

        let attributes = Attributes::merge(&defaults, &attributes);

        let for_id = attributes.get_text("id").unwrap_or(name);
        let label = self.label(for_id, label, required);
        let input = format!("<input {}>", attributes.to_html());

        Self::template(&label, &input)
    }

    pub fn text(
        &self,
        name: &str,
        label: &str,
        required: bool,
        attributes: Attributes,
    ) -> HtmlFragment {
        self.input("text", name, label, required, attributes)
    }

    /// A plain text input. Unlike the other masked helpers this one does not
    /// attach a `data-mask-name` hint.
    pub fn tel(
        &self,
        name: &str,
        label: &str,
        required: bool,
        attributes: Attributes,
    ) -> HtmlFragment {
        self.input("text", name, label, required, attributes)
    }

    pub fn email(
        &self,
        name: &str,
        label: &str,
        required: bool,
        attributes: Attributes,
    ) -> HtmlFragment {
        self.input("email", name, label, required, attributes)
    }

    /// A URL input with an `http://` placeholder unless one is given.
    pub fn url(
        &self,
        name: &str,
        label: &str,
        required: bool,
        attributes: Attributes,
    ) -> HtmlFragment {
        let mut attributes = attributes;
        if !attributes.is_set("placeholder") {
            attributes.set("placeholder", "http://");
        }
        self.input("url", name, label, required, attributes)
    }

    pub fn search(
        &self,
        name: &str,
        label: &str,
        required: bool,
        attributes: Attributes,
    ) -> HtmlFragment {
        self.input("search", name, label, required, attributes)
    }

    /// A password input; never repopulated.
    pub fn password(
        &self,
        name: &str,
        label: &str,
        required: bool,
        attributes: Attributes,
    ) -> HtmlFragment {
        self.input("password", name, label, required, attributes)
    }

    pub fn number(
        &self,
        name: &str,
        label: &str,
        required: bool,
        attributes: Attributes,
    ) -> HtmlFragment {
        self.input("number", name, label, required, attributes)
    }

    /// Text input masked as either a CPF or a CNPJ.
    pub fn cpfcnpj(
        &self,
        name: &str,
        label: &str,
        required: bool,
        attributes: Attributes,
    ) -> HtmlFragment {
        self.masked("cpfcnpj", name, label, required, attributes)
    }

    /// Text input masked as a CPF (individual taxpayer number).
    pub fn cpf(
        &self,
        name: &str,
        label: &str,
        required: bool,
        attributes: Attributes,
    ) -> HtmlFragment {
        self.masked("cpf", name, label, required, attributes)
    }

    /// Text input masked as a CNPJ (company registration number).
    pub fn cnpj(
        &self,
        name: &str,
        label: &str,
        required: bool,
        attributes: Attributes,
    ) -> HtmlFragment {
        self.masked("cnpj", name, label, required, attributes)
    }

    /// Text input masked as a CEP (postal code).
    pub fn cep(
        &self,
        name: &str,
        label: &str,
        required: bool,
        attributes: Attributes,
    ) -> HtmlFragment {
        self.masked("cep", name, label, required, attributes)
    }

    pub fn money(
        &self,
        name: &str,
        label: &str,
        required: bool,
        attributes: Attributes,
    ) -> HtmlFragment {
        self.masked("money", name, label, required, attributes)
    }

    pub fn float(
        &self,
        name: &str,
        label: &str,
        required: bool,
        attributes: Attributes,
    ) -> HtmlFragment {
        self.masked("float", name, label, required, attributes)
    }

    pub fn date(
        &self,
        name: &str,
        label: &str,
        required: bool,
        attributes: Attributes,
    ) -> HtmlFragment {
        self.input("date", name, label, required, attributes)
    }

    pub fn time(
        &self,
        name: &str,
        label: &str,
        required: bool,
        attributes: Attributes,
    ) -> HtmlFragment {
        self.input("time", name, label, required, attributes)
    }

    pub fn file(
        &self,
        name: &str,
        label: &str,
        required: bool,
        attributes: Attributes,
    ) -> HtmlFragment {
        self.input("file", name, label, required, attributes)
    }

    /// A labelled `<textarea>`; the resolved value becomes its content.
    pub fn textarea(
        &self,
        name: &str,
        label: &str,
        required: bool,
        attributes: Attributes,
    ) -> HtmlFragment {
        let defaults = self.control_defaults(Attributes::new(), name, name, required, &attributes);
        let mut attributes = Attributes::merge(&defaults, &attributes);

        let value = self.resolve_value(name, &attributes);
        attributes.remove("value");

        let for_id = attributes.get_text("id").unwrap_or(name);
        let label = self.label(for_id, label, required);
        let textarea = format!(
            "<textarea {}>{}</textarea>",
            attributes.to_html(),
            escape_attribute(&value)
        );

        Self::template(&label, &textarea)
    }

    /// Text input carrying a client-side mask hint. The hint overrides any
    /// `data-mask-name` the caller passed.
    fn masked(
        &self,
        mask: &str,
        name: &str,
        label: &str,
        required: bool,
        attributes: Attributes,
    ) -> HtmlFragment {
        let mut attributes = attributes;
        attributes.set("data-mask-name", mask);
        self.input("text", name, label, required, attributes)
    }
}
