//! formkit: server-side HTML form helpers.
//!
//! Renders labelled inputs, textareas, selects and checkbox/radio groups,
//! adds CSRF and method-spoofing hidden fields, marks fields that failed
//! validation and repopulates values from old input, explicit values or a
//! bound model.
//!
//! The demo server lives in the `formkit-demo` binary.

pub mod attributes;
pub mod config;
pub mod context;
pub mod error;
pub mod flash;
pub mod html;
pub mod renderer;
pub mod value;

pub use attributes::{AttrValue, Attributes};
pub use config::RenderConfig;
pub use context::{ErrorBag, ErrorOracle, OldInput, RequestValueSource};
pub use error::{FormError, FormResult};
pub use html::{HtmlFragment, escape_attribute};
pub use renderer::{FormRenderer, Items};
pub use value::{FieldValue, Model};
