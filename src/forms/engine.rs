//! Drives a [`Wizard`] through a [`FormInteraction`].
//!
//! The engine walks each step's prompts, feeds answers back as intents and
//! asks for confirmation on the final step. Rendering is left to the
//! interaction: terminal prompts, scripted stdin, or a test double.

use std::borrow::Cow;
use std::path::Path;

use super::descriptor::{FieldDescriptor, FieldKind, Prompt};
use super::state::{record_text, FieldValue};
use super::submission::SubmitMode;
use super::validation::{entry_key, item_key, ErrorMap};
use super::wizard::{Intent, Wizard, WizardEvent, WizardFlow, DISCOUNTS_FIELD, DISCOUNT_LABEL};
use crate::domain::FileRef;
use crate::errors::{EventDeskError, Result};

/// High-level lifecycle states emitted by the form runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormResult<T> {
    Completed(T),
    Cancelled,
}

/// Describes how prompts can be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    /// User supplied a concrete value.
    Value(String),
    /// Keep the current value.
    Keep,
    /// Abort the entire wizard immediately.
    Cancel,
    /// Return to the previous step.
    Back,
    /// Request additional information for the current field.
    Help,
}

/// Responses accepted on the final step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationResponse {
    Publish,
    SaveDraft,
    Back,
    Cancel,
}

/// Everything an interaction needs to render one prompt.
pub struct PromptContext<'a> {
    pub descriptor: &'a FieldDescriptor,
    /// Label as shown, including the list position for item fields.
    pub label: Cow<'a, str>,
    pub default: Option<String>,
    pub step: usize,
    pub total_steps: usize,
    pub step_title: &'a str,
    /// Error currently recorded for this field.
    pub error: Option<String>,
}

pub trait FormInteraction {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse;

    fn confirm(&mut self, summary: &[String]) -> ConfirmationResponse;

    /// Called when a step is blocked by validation.
    fn show_errors(&mut self, _errors: &ErrorMap) {}

    /// Help text, rejected answers and similar one-line messages.
    fn show_notice(&mut self, _message: &str) {}
}

enum StepControl {
    Done,
    Back,
    Cancel,
}

enum Answer {
    Set(FieldValue),
    Keep,
    Back,
    Cancel,
}

/// Where an answer is written.
#[derive(Clone, Copy)]
enum Target<'a> {
    Field(&'a str),
    Item { list: &'a str, index: usize },
}

pub struct FormEngine<'w, F: WizardFlow> {
    wizard: &'w mut Wizard<F>,
}

impl<'w, F: WizardFlow> FormEngine<'w, F> {
    pub fn new(wizard: &'w mut Wizard<F>) -> Self {
        Self { wizard }
    }

    /// Runs until the user confirms or cancels. On completion the wizard sits
    /// on its final step with a valid state, ready to submit in the returned
    /// mode.
    pub fn run<I: FormInteraction>(&mut self, interaction: &mut I) -> Result<FormResult<SubmitMode>> {
        loop {
            let prompts = match self.wizard.current_step() {
                Some(step) => step.prompts.clone(),
                None => return Ok(FormResult::Cancelled),
            };

            match self.run_prompts(&prompts, interaction)? {
                StepControl::Done => {}
                StepControl::Cancel => return Ok(FormResult::Cancelled),
                StepControl::Back => {
                    if self.wizard.dispatch(Intent::Prev)? == WizardEvent::Unchanged {
                        interaction.show_notice("Already at the first step.");
                    }
                    continue;
                }
            }

            if !self.wizard.is_final_step() {
                if let WizardEvent::Blocked(_) = self.wizard.dispatch(Intent::Next)? {
                    interaction.show_errors(self.wizard.errors());
                    if prompts.is_empty() {
                        return Err(EventDeskError::Validation(self.wizard.errors().clone()));
                    }
                }
                continue;
            }

            let errors = self.wizard.validate_current();
            if !errors.is_empty() {
                interaction.show_errors(&errors);
                self.wizard.set_errors(errors.clone());
                if prompts.is_empty() {
                    return Err(EventDeskError::Validation(errors));
                }
                continue;
            }

            match interaction.confirm(&self.summary()) {
                ConfirmationResponse::Publish => return Ok(FormResult::Completed(SubmitMode::Publish)),
                ConfirmationResponse::SaveDraft => return Ok(FormResult::Completed(SubmitMode::Draft)),
                ConfirmationResponse::Cancel => return Ok(FormResult::Cancelled),
                ConfirmationResponse::Back => {
                    if self.wizard.dispatch(Intent::Prev)? == WizardEvent::Unchanged {
                        interaction.show_notice("Already at the first step.");
                    }
                }
            }
        }
    }

    fn run_prompts<I: FormInteraction>(
        &mut self,
        prompts: &[Prompt],
        interaction: &mut I,
    ) -> Result<StepControl> {
        for prompt in prompts {
            let control = match prompt {
                Prompt::Field(descriptor) => {
                    self.ask_into(descriptor, descriptor.label.into(), Target::Field(descriptor.key), interaction)?
                }
                Prompt::Items {
                    list,
                    fields,
                    growable,
                } => self.run_items(list, fields, *growable, interaction)?,
                Prompt::Discounts { list } => self.run_discounts(list, interaction)?,
            };
            if !matches!(control, StepControl::Done) {
                return Ok(control);
            }
        }
        Ok(StepControl::Done)
    }

    fn run_items<I: FormInteraction>(
        &mut self,
        list: &str,
        fields: &[FieldDescriptor],
        growable: bool,
        interaction: &mut I,
    ) -> Result<StepControl> {
        let noun = self.noun(list);
        let mut index = 0;
        while index < self.wizard.state().list(list).len() {
            for descriptor in fields {
                let label = format!("{} {} - {}", capitalize(&noun), index + 1, descriptor.label);
                let control = self.ask_into(
                    descriptor,
                    label.into(),
                    Target::Item { list, index },
                    interaction,
                )?;
                if !matches!(control, StepControl::Done) {
                    return Ok(control);
                }
            }
            index += 1;

            if growable && index == self.wizard.state().list(list).len() {
                let descriptor = FieldDescriptor::new("addAnother", "Add another", FieldKind::Boolean);
                let label = format!("Add another {noun}?");
                match self.ask(&descriptor, label.into(), Some("false".into()), None, interaction)? {
                    Answer::Set(value) if value.as_bool() == Some(true) => {
                        self.wizard.dispatch(Intent::AddItem {
                            list: list.to_string(),
                        })?;
                    }
                    Answer::Back => return Ok(StepControl::Back),
                    Answer::Cancel => return Ok(StepControl::Cancel),
                    _ => {}
                }
            }
        }
        Ok(StepControl::Done)
    }

    fn run_discounts<I: FormInteraction>(&mut self, list: &str, interaction: &mut I) -> Result<StepControl> {
        let custom = FieldDescriptor::new("customCategory", "Custom category", FieldKind::Text)
            .with_optional()
            .with_help("Adds a discount category beyond the built-in ones. Leave blank to continue.");
        loop {
            match self.ask(&custom, custom.label.into(), None, None, interaction)? {
                Answer::Set(FieldValue::Text(name)) if !name.trim().is_empty() => {
                    if let Err(err) = self.wizard.dispatch(Intent::AddCategory(name)) {
                        interaction.show_notice(&err.to_string());
                    }
                }
                Answer::Back => return Ok(StepControl::Back),
                Answer::Cancel => return Ok(StepControl::Cancel),
                _ => break,
            }
        }

        let prefix = self.prefix(list);
        let percent = FieldDescriptor::new("discountPercent", "Discount %", FieldKind::Number)
            .with_optional()
            .with_help("Percentage off the ticket price, 0 to 100. Leave blank for no discount.");
        for index in 0..self.wizard.state().list(list).len() {
            let item_name = self
                .wizard
                .state()
                .list(list)
                .get(index)
                .map(|item| record_text(item, "name").trim().to_string())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| format!("Item {}", index + 1));
            for category in self.wizard.vocabulary().options() {
                let current = self
                    .wizard
                    .state()
                    .list(list)
                    .get(index)
                    .and_then(|item| item.get(DISCOUNTS_FIELD))
                    .and_then(FieldValue::as_map)
                    .and_then(|entries| entries.get(&category))
                    .cloned();
                let error = self
                    .wizard
                    .errors()
                    .get(&entry_key(&prefix, index, DISCOUNT_LABEL, &category))
                    .cloned();
                let label = format!("{item_name} - {category} discount %");
                let intent = match self.ask(&percent, label.into(), current, error, interaction)? {
                    Answer::Set(value) => {
                        let raw = value.as_text().unwrap_or_default().trim().to_string();
                        if raw.is_empty() {
                            Intent::ClearDiscount {
                                list: list.to_string(),
                                index,
                                category,
                            }
                        } else {
                            Intent::discount(list, index, category, raw)
                        }
                    }
                    Answer::Keep => continue,
                    Answer::Back => return Ok(StepControl::Back),
                    Answer::Cancel => return Ok(StepControl::Cancel),
                };
                self.wizard.dispatch(intent)?;
            }
        }
        Ok(StepControl::Done)
    }

    fn ask_into<I: FormInteraction>(
        &mut self,
        descriptor: &FieldDescriptor,
        label: Cow<'_, str>,
        target: Target<'_>,
        interaction: &mut I,
    ) -> Result<StepControl> {
        let (current, error) = match target {
            Target::Field(key) => (
                self.wizard.state().get(key).map(default_text),
                self.wizard.errors().get(key).cloned(),
            ),
            Target::Item { list, index } => (
                self.wizard
                    .state()
                    .list(list)
                    .get(index)
                    .and_then(|item| item.get(descriptor.key))
                    .map(default_text),
                self.wizard
                    .errors()
                    .get(&item_key(&self.prefix(list), index, descriptor.key))
                    .cloned(),
            ),
        };
        let current = current.filter(|value| !value.is_empty());
        let value = match self.ask(descriptor, label, current, error, interaction)? {
            Answer::Set(value) => value,
            Answer::Keep => return Ok(StepControl::Done),
            Answer::Back => return Ok(StepControl::Back),
            Answer::Cancel => return Ok(StepControl::Cancel),
        };
        let intent = match target {
            Target::Field(key) => Intent::set(key, value),
            Target::Item { list, index } => Intent::update(list, index, descriptor.key, value),
        };
        self.wizard.dispatch(intent)?;
        Ok(StepControl::Done)
    }

    /// Prompts until the answer can be converted for the field's kind.
    fn ask<I: FormInteraction>(
        &self,
        descriptor: &FieldDescriptor,
        label: Cow<'_, str>,
        default: Option<String>,
        error: Option<String>,
        interaction: &mut I,
    ) -> Result<Answer> {
        let step_title = self.wizard.current_step().map(|step| step.title).unwrap_or_default();
        loop {
            let context = PromptContext {
                descriptor,
                label: Cow::Borrowed(label.as_ref()),
                default: default.clone(),
                step: self.wizard.step(),
                total_steps: self.wizard.total_steps(),
                step_title,
                error: error.clone(),
            };
            match interaction.prompt_field(&context) {
                PromptResponse::Value(raw) => match convert(descriptor, &raw) {
                    Ok(Some(value)) => return Ok(Answer::Set(value)),
                    Ok(None) => return Ok(Answer::Keep),
                    Err(message) => interaction.show_notice(&message),
                },
                PromptResponse::Keep => return Ok(Answer::Keep),
                PromptResponse::Back => return Ok(Answer::Back),
                PromptResponse::Cancel => return Ok(Answer::Cancel),
                PromptResponse::Help => interaction.show_notice(
                    descriptor
                        .help
                        .unwrap_or("No additional help is available for this field."),
                ),
            }
        }
    }

    fn summary(&self) -> Vec<String> {
        let state = self.wizard.state();
        let mut lines = vec!["Review your entries:".to_string()];
        for step in self.wizard.flow().steps() {
            for prompt in &step.prompts {
                match prompt {
                    Prompt::Field(descriptor) => lines.push(format!(
                        "  {}: {}",
                        descriptor.label,
                        state
                            .get(descriptor.key)
                            .map(FieldValue::summary)
                            .unwrap_or_else(|| "[unfilled]".into())
                    )),
                    Prompt::Items { list, fields, .. } => {
                        let noun = capitalize(&self.noun(list));
                        for (index, item) in state.list(list).iter().enumerate() {
                            for descriptor in fields {
                                let value = item
                                    .get(descriptor.key)
                                    .map(FieldValue::summary)
                                    .unwrap_or_else(|| "[unfilled]".into());
                                lines.push(format!(
                                    "  {noun} {} - {}: {value}",
                                    index + 1,
                                    descriptor.label
                                ));
                            }
                        }
                    }
                    Prompt::Discounts { list } => {
                        let noun = capitalize(&self.noun(list));
                        for (index, item) in state.list(list).iter().enumerate() {
                            let discounts = item
                                .get(DISCOUNTS_FIELD)
                                .map(FieldValue::summary)
                                .unwrap_or_else(|| "none".into());
                            lines.push(format!("  {noun} {} - Discounts: {discounts}", index + 1));
                        }
                    }
                }
            }
        }
        lines
    }

    fn noun(&self, list: &str) -> String {
        self.wizard
            .flow()
            .lists()
            .iter()
            .find(|policy| policy.field == list)
            .map(|policy| policy.noun.to_string())
            .unwrap_or_else(|| "item".into())
    }

    fn prefix(&self, list: &str) -> String {
        self.wizard
            .flow()
            .lists()
            .iter()
            .find(|policy| policy.field == list)
            .map(|policy| policy.prefix.to_string())
            .unwrap_or_else(|| list.to_string())
    }
}

fn default_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Bool(true) => "true".into(),
        FieldValue::Bool(false) => "false".into(),
        FieldValue::File(file) => file.file_name.clone(),
        FieldValue::Text(text) => text.clone(),
        other => other.summary(),
    }
}

/// Converts a raw answer; `Ok(None)` keeps the current value.
fn convert(descriptor: &FieldDescriptor, raw: &str) -> std::result::Result<Option<FieldValue>, String> {
    let trimmed = raw.trim();
    match &descriptor.kind {
        FieldKind::Boolean => FieldValue::text(trimmed)
            .as_bool()
            .map(|flag| Some(FieldValue::Bool(flag)))
            .ok_or_else(|| "Answer yes or no.".to_string()),
        FieldKind::File if trimmed.is_empty() => Ok(None),
        FieldKind::File => FileRef::from_path(Path::new(trimmed))
            .map(|file| Some(FieldValue::File(file)))
            .map_err(|err| format!("Could not read `{trimmed}`: {err}")),
        FieldKind::Choice(options) if !trimmed.is_empty() => {
            let by_index = trimmed
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| options.get(i));
            by_index
                .or_else(|| options.iter().find(|option| option.eq_ignore_ascii_case(trimmed)))
                .map(|option| Some(FieldValue::text(option.as_str())))
                .ok_or_else(|| format!("Choose one of: {}", options.join(", ")))
        }
        _ => Ok(Some(FieldValue::text(trimmed))),
    }
}

fn capitalize(noun: &str) -> String {
    let mut chars = noun.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
