//! Turns a completed wizard into one API call.
//!
//! Flows describe their payload as named [`PayloadField`]s; the encoding is
//! chosen from the values: plain JSON unless some field carries a file, in
//! which case everything goes out as `multipart/form-data` and structured
//! values travel as JSON text parts.

use serde_json::Value;

use super::wizard::{Wizard, WizardFlow};
use crate::api::{ApiClient, MultipartForm, RequestBody, Transport};
use crate::domain::FileRef;
use crate::errors::{EventDeskError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum PayloadValue {
    Json(Value),
    File(FileRef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayloadField {
    pub name: String,
    pub value: PayloadValue,
}

/// Body of a submission before encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A whole JSON document (e.g. an array of ticket descriptors).
    Document(Value),
    /// Named top-level fields.
    Fields(Vec<PayloadField>),
}

impl Payload {
    pub fn builder() -> PayloadBuilder {
        PayloadBuilder::default()
    }

    pub fn has_files(&self) -> bool {
        match self {
            Payload::Document(_) => false,
            Payload::Fields(fields) => fields
                .iter()
                .any(|field| matches!(field.value, PayloadValue::File(_))),
        }
    }

    pub fn encode(self) -> RequestBody {
        let has_files = self.has_files();
        match self {
            Payload::Document(value) => RequestBody::Json(value),
            Payload::Fields(fields) if !has_files => {
                let object = fields
                    .into_iter()
                    .filter_map(|field| match field.value {
                        PayloadValue::Json(value) => Some((field.name, value)),
                        PayloadValue::File(_) => None,
                    })
                    .collect::<serde_json::Map<_, _>>();
                RequestBody::Json(Value::Object(object))
            }
            Payload::Fields(fields) => {
                let mut form = MultipartForm::default();
                for field in fields {
                    match field.value {
                        PayloadValue::File(file) => form.files.push((field.name, file)),
                        PayloadValue::Json(Value::Null) => {}
                        PayloadValue::Json(Value::String(text)) => form.text.push((field.name, text)),
                        PayloadValue::Json(value) => form.text.push((field.name, value.to_string())),
                    }
                }
                RequestBody::Multipart(form)
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct PayloadBuilder {
    fields: Vec<PayloadField>,
}

impl PayloadBuilder {
    pub fn json(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push(PayloadField {
            name: name.into(),
            value: PayloadValue::Json(value.into()),
        });
        self
    }

    /// Adds `value` only when present; absent optionals are omitted.
    pub fn optional(self, name: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.json(name, value),
            None => self,
        }
    }

    pub fn file(mut self, name: impl Into<String>, file: Option<&FileRef>) -> Self {
        if let Some(file) = file.filter(|file| !file.is_empty()) {
            self.fields.push(PayloadField {
                name: name.into(),
                value: PayloadValue::File(file.clone()),
            });
        }
        self
    }

    pub fn build(self) -> Payload {
        Payload::Fields(self.fields)
    }
}

/// Lifecycle of a wizard's submission, outside the step navigator.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubmissionState<E> {
    #[default]
    Idle,
    InFlight,
    Succeeded(E),
    Failed(String),
}

impl<E> SubmissionState<E> {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SubmissionState::InFlight)
    }

    pub fn succeeded(&self) -> Option<&E> {
        match self {
            SubmissionState::Succeeded(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            SubmissionState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    Draft,
    Publish,
}

impl SubmitMode {
    pub fn is_draft(self) -> bool {
        matches!(self, SubmitMode::Draft)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Receives user-facing outcome messages (toasts in a UI, lines in a shell).
pub trait Notifier {
    fn notify(&mut self, level: NoticeLevel, message: &str);
}

impl Notifier for Vec<(NoticeLevel, String)> {
    fn notify(&mut self, level: NoticeLevel, message: &str) {
        self.push((level, message.to_string()));
    }
}

/// Sends wizards to the API and reports every outcome through a [`Notifier`].
pub struct Submitter<'a, T: Transport> {
    client: &'a ApiClient<T>,
    notifier: &'a mut dyn Notifier,
}

impl<'a, T: Transport> Submitter<'a, T> {
    pub fn new(client: &'a ApiClient<T>, notifier: &'a mut dyn Notifier) -> Self {
        Self { client, notifier }
    }

    pub fn submit<F: WizardFlow>(
        &mut self,
        wizard: &mut Wizard<F>,
        mode: SubmitMode,
    ) -> Result<F::Entity> {
        if !wizard.is_final_step() {
            return Err(EventDeskError::NotAtFinalStep {
                current: wizard.step(),
                total: wizard.total_steps(),
            });
        }
        let errors = wizard.validate_all();
        if !errors.is_empty() {
            wizard.set_errors(errors.clone());
            return Err(EventDeskError::Validation(errors));
        }
        wizard.begin_submission()?;

        let flow = wizard.flow().name();
        let request = match wizard.flow().request(wizard.state(), mode.is_draft()) {
            Ok(request) => request,
            Err(err) => {
                let message = err.to_string();
                wizard.set_submission(SubmissionState::Failed(message.clone()));
                self.notifier.notify(NoticeLevel::Error, &message);
                tracing::warn!(flow, error = %err, "submission could not be prepared");
                return Err(err);
            }
        };
        tracing::info!(
            flow,
            method = %request.method,
            path = %request.path,
            content_type = request.body.content_type().unwrap_or("none"),
            draft = mode.is_draft(),
            "submitting"
        );

        match self.client.execute::<F::Entity>(&request) {
            Ok(entity) => {
                wizard.set_submission(SubmissionState::Succeeded(entity.clone()));
                let message = if mode.is_draft() {
                    "Draft saved"
                } else {
                    "Saved successfully"
                };
                self.notifier.notify(NoticeLevel::Success, message);
                tracing::info!(flow, "submission succeeded");
                Ok(entity)
            }
            Err(err) => {
                let message = err.user_message(wizard.flow().failure_message());
                wizard.set_submission(SubmissionState::Failed(message.clone()));
                self.notifier.notify(NoticeLevel::Error, &message);
                tracing::warn!(flow, error = %err, "submission failed");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fields_without_files_encode_as_json_object() {
        let body = Payload::builder()
            .json("name", "Launch")
            .json("capacity", 120)
            .optional("venue", None::<String>)
            .file("photo", None)
            .build()
            .encode();
        assert_eq!(body.as_json(), Some(&json!({"name": "Launch", "capacity": 120})));
    }

    #[test]
    fn any_file_switches_to_multipart_with_json_text_parts() {
        let photo = FileRef::new("cover.jpg", vec![0xFF, 0xD8]);
        let body = Payload::builder()
            .json("name", "Launch")
            .json("guests", json!([{"name": "Ada"}]))
            .json("isPublic", true)
            .json("notes", Value::Null)
            .file("photo", Some(&photo))
            .build()
            .encode();

        let form = body.as_multipart().expect("multipart body");
        assert_eq!(form.text_value("name"), Some("Launch"));
        assert_eq!(form.text_value("guests"), Some(r#"[{"name":"Ada"}]"#));
        assert_eq!(form.text_value("isPublic"), Some("true"));
        assert_eq!(form.text_value("notes"), None);
        assert_eq!(form.file("photo"), Some(&photo));
    }

    #[test]
    fn documents_stay_json() {
        let payload = Payload::Document(json!([{"name": "GA"}]));
        assert!(!payload.has_files());
        assert!(payload.encode().as_json().unwrap().is_array());
    }
}
