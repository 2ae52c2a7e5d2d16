//! Reducer owning one wizard's state.
//!
//! Every UI event becomes an [`Intent`] applied through [`Wizard::dispatch`],
//! which keeps form values, the error map, the step navigator and the
//! category vocabulary consistent with each other.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;

use super::collections::{self, CategoryVocabulary, CollectionError, ListPolicy};
use super::descriptor::StepDescriptor;
use super::navigator::StepNavigator;
use super::state::{FieldValue, FormState, Record};
use super::submission::SubmissionState;
use super::validation::{entry_key, item_key, ErrorMap};
use crate::api::ApiRequest;
use crate::errors::{EventDeskError, Result};

/// Field of a list element holding its category discounts.
pub const DISCOUNTS_FIELD: &str = "categoryDiscounts";
/// Label used in discount error keys (`ticket-0-discount-Student`).
pub const DISCOUNT_LABEL: &str = "discount";

/// A concrete multi-step form: its steps, lists and submission mapping.
pub trait WizardFlow {
    /// Entity returned by the API on successful submission.
    type Entity: DeserializeOwned + Clone + fmt::Debug;

    fn name(&self) -> &'static str;

    fn steps(&self) -> &[StepDescriptor];

    fn lists(&self) -> &[ListPolicy] {
        &[]
    }

    fn initial_state(&self) -> FormState;

    /// Maps the collected state to the API call. Must not perform I/O.
    fn request(&self, state: &FormState, draft: bool) -> Result<ApiRequest>;

    /// Shown when a failed submission carries no server message.
    fn failure_message(&self) -> &'static str {
        "Something went wrong. Please try again."
    }
}

/// User actions understood by [`Wizard::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    SetField {
        key: String,
        value: FieldValue,
    },
    AddItem {
        list: String,
    },
    RemoveItem {
        list: String,
        index: usize,
    },
    UpdateItem {
        list: String,
        index: usize,
        field: String,
        value: FieldValue,
    },
    SetDiscount {
        list: String,
        index: usize,
        category: String,
        percent: String,
    },
    ClearDiscount {
        list: String,
        index: usize,
        category: String,
    },
    AddCategory(String),
    RemoveCategory(String),
    Next,
    Prev,
}

impl Intent {
    pub fn set(key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Intent::SetField {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn update(
        list: impl Into<String>,
        index: usize,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Self {
        Intent::UpdateItem {
            list: list.into(),
            index,
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn discount(
        list: impl Into<String>,
        index: usize,
        category: impl Into<String>,
        percent: impl Into<String>,
    ) -> Self {
        Intent::SetDiscount {
            list: list.into(),
            index,
            category: category.into(),
            percent: percent.into(),
        }
    }
}

/// What a dispatched intent did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    Updated,
    Advanced(usize),
    /// Validation failed; carries the number of failing fields.
    Blocked(usize),
    SteppedBack(usize),
    Unchanged,
}

pub struct Wizard<F: WizardFlow> {
    flow: F,
    state: FormState,
    errors: ErrorMap,
    navigator: StepNavigator,
    vocabulary: CategoryVocabulary,
    submission: SubmissionState<F::Entity>,
}

impl<F: WizardFlow> Wizard<F> {
    pub fn new(flow: F) -> Self {
        let state = flow.initial_state();
        Self::with_state(flow, state)
    }

    /// Starts from a pre-filled state, e.g. an entity fetched for editing.
    pub fn with_state(flow: F, state: FormState) -> Self {
        let navigator = StepNavigator::new(flow.steps().len());
        tracing::debug!(flow = flow.name(), steps = navigator.total(), "wizard started");
        Self {
            flow,
            state,
            errors: ErrorMap::new(),
            navigator,
            vocabulary: CategoryVocabulary::new(),
            submission: SubmissionState::Idle,
        }
    }

    pub fn flow(&self) -> &F {
        &self.flow
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn step(&self) -> usize {
        self.navigator.current()
    }

    pub fn total_steps(&self) -> usize {
        self.navigator.total()
    }

    pub fn is_final_step(&self) -> bool {
        self.navigator.is_final()
    }

    pub fn vocabulary(&self) -> &CategoryVocabulary {
        &self.vocabulary
    }

    pub fn submission(&self) -> &SubmissionState<F::Entity> {
        &self.submission
    }

    pub fn current_step(&self) -> Option<&StepDescriptor> {
        self.flow.steps().get(self.step() - 1)
    }

    /// Errors the current step would report, without recording them.
    pub fn validate_current(&self) -> ErrorMap {
        self.current_step()
            .map(|step| step.rules.validate(&self.state))
            .unwrap_or_default()
    }

    /// Errors of every step merged in step order; the earliest step's message
    /// wins for a shared key. Fields stay editable after their step is
    /// passed, so submission checks the whole form.
    pub fn validate_all(&self) -> ErrorMap {
        let mut errors = ErrorMap::new();
        for step in self.flow.steps() {
            for (key, message) in step.rules.validate(&self.state) {
                errors.entry(key).or_insert(message);
            }
        }
        errors
    }

    pub(crate) fn set_errors(&mut self, errors: ErrorMap) {
        self.errors = errors;
    }

    pub(crate) fn set_submission(&mut self, submission: SubmissionState<F::Entity>) {
        self.submission = submission;
    }

    /// Marks a submission as started; rejects a second concurrent one.
    pub fn begin_submission(&mut self) -> Result<()> {
        match self.submission {
            SubmissionState::InFlight => Err(EventDeskError::SubmissionInFlight),
            SubmissionState::Succeeded(_) => Err(EventDeskError::AlreadySubmitted),
            _ => {
                self.submission = SubmissionState::InFlight;
                Ok(())
            }
        }
    }

    pub fn dispatch(&mut self, intent: Intent) -> Result<WizardEvent> {
        match intent {
            Intent::SetField { key, value } => {
                self.errors.remove(&key);
                self.state.set(key, value);
                Ok(WizardEvent::Updated)
            }
            Intent::AddItem { list } => {
                let policy = self.policy(&list)?;
                let items = collections::add(self.state.list(policy.field), (policy.template)());
                self.replace_list(&policy, items);
                Ok(WizardEvent::Updated)
            }
            Intent::RemoveItem { list, index } => {
                let policy = self.policy(&list)?;
                let items = collections::remove(
                    self.state.list(policy.field),
                    index,
                    policy.min_items,
                    policy.noun,
                )?;
                self.replace_list(&policy, items);
                Ok(WizardEvent::Updated)
            }
            Intent::UpdateItem {
                list,
                index,
                field,
                value,
            } => {
                let policy = self.policy(&list)?;
                let items = collections::update(self.state.list(policy.field), index, |item| {
                    item.insert(field.clone(), value);
                })?;
                self.state.set_list(policy.field, items);
                self.errors.remove(&item_key(policy.prefix, index, &field));
                Ok(WizardEvent::Updated)
            }
            Intent::SetDiscount {
                list,
                index,
                category,
                percent,
            } => {
                let category = self
                    .vocabulary
                    .canonical(&category)
                    .ok_or(CollectionError::UnknownCategory(category))?;
                let policy = self.policy(&list)?;
                let items = collections::update(self.state.list(policy.field), index, |item| {
                    let current = discounts_of(item);
                    let next = if current.contains_key(&category) {
                        collections::update_key(&current, &category, percent.trim().to_string())
                    } else {
                        collections::add_key(&current, &category, percent.trim().to_string())
                    };
                    if let Ok(next) = next {
                        item.insert(DISCOUNTS_FIELD.to_string(), FieldValue::Map(next));
                    }
                })?;
                self.state.set_list(policy.field, items);
                self.errors
                    .remove(&entry_key(policy.prefix, index, DISCOUNT_LABEL, &category));
                Ok(WizardEvent::Updated)
            }
            Intent::ClearDiscount {
                list,
                index,
                category,
            } => {
                let policy = self.policy(&list)?;
                let category = self.vocabulary.canonical(&category).unwrap_or(category);
                let Some(item) = self.state.list(policy.field).get(index) else {
                    return Err(CollectionError::IndexOutOfRange {
                        index,
                        len: self.state.list(policy.field).len(),
                    }
                    .into());
                };
                let Ok(next) = collections::remove_key(&discounts_of(item), &category) else {
                    return Ok(WizardEvent::Unchanged);
                };
                let items = collections::update(self.state.list(policy.field), index, |item| {
                    item.insert(DISCOUNTS_FIELD.to_string(), FieldValue::Map(next));
                })?;
                self.state.set_list(policy.field, items);
                self.errors
                    .remove(&entry_key(policy.prefix, index, DISCOUNT_LABEL, &category));
                Ok(WizardEvent::Updated)
            }
            Intent::AddCategory(name) => {
                let added = self.vocabulary.add(&name)?;
                tracing::debug!(flow = self.flow.name(), category = %added, "custom category added");
                Ok(WizardEvent::Updated)
            }
            Intent::RemoveCategory(name) => {
                let removed = self.vocabulary.remove(&name)?;
                self.purge_category(&removed);
                tracing::debug!(flow = self.flow.name(), category = %removed, "custom category removed");
                Ok(WizardEvent::Updated)
            }
            Intent::Next => {
                let errors = self.validate_current();
                if !errors.is_empty() {
                    let count = errors.len();
                    tracing::debug!(flow = self.flow.name(), step = self.step(), count, "step blocked");
                    self.errors = errors;
                    return Ok(WizardEvent::Blocked(count));
                }
                self.errors.clear();
                if self.navigator.next(&self.errors) {
                    tracing::debug!(flow = self.flow.name(), step = self.step(), "advanced");
                    Ok(WizardEvent::Advanced(self.step()))
                } else {
                    Ok(WizardEvent::Unchanged)
                }
            }
            Intent::Prev => {
                if self.navigator.prev() {
                    self.errors.clear();
                    tracing::debug!(flow = self.flow.name(), step = self.step(), "stepped back");
                    Ok(WizardEvent::SteppedBack(self.step()))
                } else {
                    Ok(WizardEvent::Unchanged)
                }
            }
        }
    }

    fn policy(&self, list: &str) -> Result<ListPolicy> {
        self.flow
            .lists()
            .iter()
            .find(|policy| policy.field == list)
            .copied()
            .ok_or_else(|| CollectionError::UnknownList(list.to_string()).into())
    }

    /// Stores a structurally changed list; its positional error keys no
    /// longer line up, so they are dropped.
    fn replace_list(&mut self, policy: &ListPolicy, items: Vec<Record>) {
        self.state.set_list(policy.field, items);
        let prefix = policy.error_prefix();
        self.errors.retain(|key, _| !key.starts_with(&prefix));
    }

    fn purge_category(&mut self, category: &str) {
        let policies: Vec<ListPolicy> = self.flow.lists().to_vec();
        for policy in policies {
            let items: Vec<Record> = self
                .state
                .list(policy.field)
                .iter()
                .cloned()
                .map(|mut item| {
                    if let Some(FieldValue::Map(entries)) = item.get_mut(DISCOUNTS_FIELD) {
                        entries.remove(category);
                    }
                    item
                })
                .collect();
            if !items.is_empty() {
                self.state.set_list(policy.field, items);
            }
            let suffix = format!("-{DISCOUNT_LABEL}-{category}");
            let prefix = policy.error_prefix();
            self.errors
                .retain(|key, _| !(key.starts_with(&prefix) && key.ends_with(&suffix)));
        }
    }
}

fn discounts_of(item: &Record) -> BTreeMap<String, String> {
    item.get(DISCOUNTS_FIELD)
        .and_then(FieldValue::as_map)
        .cloned()
        .unwrap_or_default()
}
