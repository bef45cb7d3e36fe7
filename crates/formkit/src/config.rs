//! Rendering configuration: CSS hooks and fixed UI strings.

use std::env;

use serde::{Deserialize, Serialize};

/// Strings and class names the renderer writes into every form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Class on every `<form>` tag (default: `Form`).
    pub form_class: String,

    /// Class added to fields and labels with a validation error (default: `_error`).
    pub error_class: String,

    /// Label of the empty option leading every single select (default: `Selecione...`).
    pub select_placeholder: String,

    /// Default submit button text (default: `Salvar`).
    pub submit_label: String,

    /// Cancel link text (default: `Cancelar`).
    pub cancel_label: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            form_class: "Form".to_string(),
            error_class: "_error".to_string(),
            select_placeholder: "Selecione...".to_string(),
            submit_label: "Salvar".to_string(),
            cancel_label: "Cancelar".to_string(),
        }
    }
}

impl RenderConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |key: &str, default: String| lookup(key).unwrap_or(default);

        Self {
            form_class: var("FORMKIT_FORM_CLASS", defaults.form_class),
            error_class: var("FORMKIT_ERROR_CLASS", defaults.error_class),
            select_placeholder: var("FORMKIT_SELECT_PLACEHOLDER", defaults.select_placeholder),
            submit_label: var("FORMKIT_SUBMIT_LABEL", defaults.submit_label),
            cancel_label: var("FORMKIT_CANCEL_LABEL", defaults.cancel_label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.form_class, "Form");
        assert_eq!(config.error_class, "_error");
        assert_eq!(config.select_placeholder, "Selecione...");
    }

    #[test]
    fn test_lookup_overrides() {
        let config = RenderConfig::from_lookup(|key| match key {
            "FORMKIT_SELECT_PLACEHOLDER" => Some("Choose...".to_string()),
            "FORMKIT_SUBMIT_LABEL" => Some("Save".to_string()),
            _ => None,
        });
        assert_eq!(config.select_placeholder, "Choose...");
        assert_eq!(config.submit_label, "Save");
        assert_eq!(config.cancel_label, "Cancelar");
    }
}
