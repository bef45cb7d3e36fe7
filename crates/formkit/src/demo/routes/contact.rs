//! Contact create and edit forms.
//!
//! `GET /contact` renders an empty form; a failed `POST /contact` flashes
//! the submission and its errors and redirects back so the form comes up
//! repopulated. Editing binds the stored contact as the form model and
//! submits as a spoofed `PUT`.

use std::sync::atomic::Ordering;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use formkit::flash::{flash_errors, flash_input, take_errors, take_old_input};
use formkit::{
    Attributes, ErrorBag, FormRenderer, HtmlFragment, Items, Model, OldInput, escape_attribute,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, warn};

use crate::demo::AppState;
use crate::demo::csrf::{generate_csrf_token, verify_csrf_token};
use crate::demo::error::{AppError, AppResult};

/// A stored contact.
///
/// Serialized as the edit form's model, so the topic list goes out under
/// the key the checkbox group reads multi-valued fields from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    #[serde(rename = "topics_dropdown")]
    pub topics: Vec<String>,
    pub reply_by: String,
    pub message: String,
}

fn departments() -> Items {
    Items::from([("sales", "Sales"), ("support", "Support"), ("billing", "Billing")])
}

fn topics() -> Items {
    Items::from([("pricing", "Pricing"), ("bugs", "Bugs"), ("feedback", "Feedback")])
}

fn reply_options() -> Items {
    Items::from([("email", "E-mail"), ("phone", "Phone")])
}

/// The raw urlencoded pairs of one submission.
struct Submission {
    pairs: Vec<(String, String)>,
}

impl Submission {
    fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// First value submitted under `name`, or empty.
    fn field(&self, name: &str) -> &str {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.trim())
            .unwrap_or_default()
    }

    fn fields(&self, name: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
            .collect()
    }

    /// Everything but the token, ready to flash.
    fn old_input(&self) -> OldInput {
        OldInput::from_pairs(
            self.pairs
                .iter()
                .filter(|(key, _)| key != "_token")
                .map(|(key, value)| (key.as_str(), value.as_str())),
        )
    }

    fn validate(&self) -> ErrorBag {
        let mut errors = ErrorBag::new();

        if self.field("name").is_empty() {
            errors.add("name", "The name field is required.");
        }

        let email = self.field("email");
        if email.is_empty() {
            errors.add("email", "The e-mail field is required.");
        } else if !email.contains('@') {
            errors.add("email", "The e-mail must be a valid address.");
        }

        let department = self.field("department");
        if !department.is_empty() && !departments().iter().any(|(key, _)| key == department) {
            errors.add("department", "The selected department is invalid.");
        }

        let allowed = topics();
        if self
            .fields("topics[]")
            .iter()
            .any(|topic| !allowed.iter().any(|(key, _)| topic == key))
        {
            errors.add("topics", "The selected topics are invalid.");
        }

        if self.field("message").is_empty() {
            errors.add("message", "The message field is required.");
        }

        errors
    }

    fn into_contact(self, id: u64) -> Contact {
        Contact {
            id,
            name: self.field("name").to_string(),
            email: self.field("email").to_string(),
            phone: self.field("phone").to_string(),
            department: self.field("department").to_string(),
            topics: self.fields("topics[]"),
            reply_by: self.field("reply_by").to_string(),
            message: self.field("message").to_string(),
        }
    }
}

/// Build the renderer for this request from the flashed state and a fresh token.
async fn renderer(state: &AppState, session: &Session) -> AppResult<(FormRenderer, ErrorBag)> {
    let old_input = take_old_input(session).await?;
    let errors = take_errors(session).await?;
    let token = generate_csrf_token(session).await?;

    let form = FormRenderer::new(old_input, errors.clone(), token)
        .with_config(state.render_config().clone());
    Ok((form, errors))
}

async fn check_token(session: &Session, submission: &Submission) -> AppResult<()> {
    let token = submission.field("_token");
    if token.is_empty() || !verify_csrf_token(session, token).await? {
        warn!("CSRF token mismatch");
        return Err(AppError::Forbidden);
    }
    Ok(())
}

async fn flash_back(
    session: &Session,
    submission: &Submission,
    errors: &ErrorBag,
    to: &str,
) -> AppResult<Response> {
    flash_input(session, &submission.old_input()).await?;
    flash_errors(session, errors).await?;
    Ok(Redirect::to(to).into_response())
}

fn contact_form(
    form: &mut FormRenderer,
    action: &str,
    method: &str,
    model: Option<Model>,
    reply_by: &str,
) -> String {
    let fields = [
        form.open(action, method, model, Attributes::new()),
        form.text("name", "Name", true, Attributes::new()),
        form.email("email", "E-mail", true, Attributes::new()),
        form.tel("phone", "Phone", false, Attributes::new()),
        form.select("department", "Department", false, departments(), Attributes::new()),
        form.checkbox("topics[]", "Topics", topics(), Vec::<String>::new()),
        form.radio("reply_by", "Reply by", reply_options(), reply_by),
        form.textarea("message", "Message", true, Attributes::new().with("rows", "5")),
        form.buttons(None, Some("/contact")),
        form.close(),
    ];

    fields.iter().map(HtmlFragment::as_str).collect()
}

fn error_summary(errors: &ErrorBag) -> String {
    if errors.is_empty() {
        return String::new();
    }

    let items: String = errors
        .iter()
        .flat_map(|(_, messages)| messages.iter())
        .map(|message| format!("<li>{}</li>", escape_attribute(message)))
        .collect();
    format!(r#"<ul class="form-errors">{items}</ul>"#)
}

fn page(title: &str, body: &str) -> HtmlFragment {
    let title = escape_attribute(title);
    HtmlFragment::new(format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body><h1>{title}</h1>{body}</body></html>"
    ))
}

/// Empty contact form.
async fn new_contact(State(state): State<AppState>, session: Session) -> AppResult<HtmlFragment> {
    let (mut form, errors) = renderer(&state, &session).await?;

    let mut body = error_summary(&errors);
    body.push_str(&contact_form(&mut form, "/contact", "POST", None, "email"));

    Ok(page("New contact", &body))
}

async fn create_contact(
    State(state): State<AppState>,
    session: Session,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let submission = Submission::new(pairs);
    check_token(&session, &submission).await?;

    let errors = submission.validate();
    if !errors.is_empty() {
        info!(fields = errors.len(), "contact rejected");
        return flash_back(&session, &submission, &errors, "/contact").await;
    }

    let id = state.next_id().fetch_add(1, Ordering::Relaxed);
    state.contacts().insert(id, submission.into_contact(id));
    info!(id, "contact created");

    Ok(Redirect::to(&format!("/contact/{id}/edit")).into_response())
}

/// Edit form bound to a stored contact.
async fn edit_contact(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<u64>,
) -> AppResult<HtmlFragment> {
    let contact = state
        .contacts()
        .get(&id)
        .map(|entry| entry.value().clone())
        .ok_or(AppError::NotFound)?;
    let model = Model::from_serialize(&contact)?;

    let (mut form, errors) = renderer(&state, &session).await?;

    let mut body = error_summary(&errors);
    body.push_str(&contact_form(
        &mut form,
        &format!("/contact/{id}"),
        "PUT",
        Some(model),
        "",
    ));

    Ok(page("Edit contact", &body))
}

async fn update_contact(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<u64>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let submission = Submission::new(pairs);

    let method = submission.field("_method");
    if !method.eq_ignore_ascii_case("PUT") {
        return Err(AppError::BadRequest(format!(
            "unsupported method {method:?} for /contact/{id}"
        )));
    }

    if !state.contacts().contains_key(&id) {
        return Err(AppError::NotFound);
    }

    check_token(&session, &submission).await?;

    let edit_path = format!("/contact/{id}/edit");

    let errors = submission.validate();
    if !errors.is_empty() {
        info!(id, fields = errors.len(), "contact update rejected");
        return flash_back(&session, &submission, &errors, &edit_path).await;
    }

    state.contacts().insert(id, submission.into_contact(id));
    info!(id, "contact updated");

    Ok(Redirect::to(&edit_path).into_response())
}

/// Create the contact router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contact", get(new_contact).post(create_contact))
        .route("/contact/{id}/edit", get(edit_contact))
        .route("/contact/{id}", post(update_contact))
}
