//! Event setup: edit an existing event's details, schedule and cover photo.

use super::{non_blank, parse_number, wire_datetime};
use crate::api::client::segment;
use crate::api::ApiRequest;
use crate::domain::common::DATETIME_FORMAT;
use crate::domain::{Event, EventStatus};
use crate::errors::Result;
use crate::forms::descriptor::{FieldDescriptor, FieldKind, Prompt, StepDescriptor};
use crate::forms::state::FormState;
use crate::forms::submission::Payload;
use crate::forms::validation::{Predicate, Rule, RuleTable};
use crate::forms::wizard::WizardFlow;

pub const EVENT_CATEGORIES: [&str; 7] = [
    "Conference",
    "Concert",
    "Workshop",
    "Sports",
    "Festival",
    "Exhibition",
    "Other",
];

pub struct EventSetupFlow {
    event_id: String,
    prefill: Option<Event>,
    steps: Vec<StepDescriptor>,
}

impl EventSetupFlow {
    pub fn new(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            prefill: None,
            steps: event_steps(),
        }
    }

    /// Starts from the event as currently stored.
    pub fn from_event(event: Event) -> Self {
        Self {
            event_id: event.id.clone(),
            prefill: Some(event),
            steps: event_steps(),
        }
    }
}

impl WizardFlow for EventSetupFlow {
    type Entity = Event;

    fn name(&self) -> &'static str {
        "event"
    }

    fn steps(&self) -> &[StepDescriptor] {
        &self.steps
    }

    fn initial_state(&self) -> FormState {
        let mut state = FormState::new();
        let Some(event) = &self.prefill else {
            for key in ["name", "description", "category", "venueId", "startDate", "endDate", "capacity"] {
                state.set(key, "");
            }
            state.set("isPublic", false);
            return state;
        };
        let date = |value: Option<chrono::NaiveDateTime>| {
            value
                .map(|value| value.format(DATETIME_FORMAT).to_string())
                .unwrap_or_default()
        };
        state.set("name", event.name.as_str());
        state.set("description", event.description.clone().unwrap_or_default());
        state.set("category", event.category.clone().unwrap_or_default());
        state.set(
            "venueId",
            event
                .venue
                .as_ref()
                .map(|venue| venue.id().to_string())
                .unwrap_or_default(),
        );
        state.set("startDate", date(event.start_date));
        state.set("endDate", date(event.end_date));
        state.set(
            "capacity",
            event.capacity.map(|c| c.to_string()).unwrap_or_default(),
        );
        state.set("isPublic", event.is_public.unwrap_or(false));
        state
    }

    fn request(&self, state: &FormState, draft: bool) -> Result<ApiRequest> {
        let capacity = match non_blank(state.text("capacity")) {
            Some(raw) => Some(parse_number::<u32>("Capacity", &raw)?),
            None => None,
        };
        let status = if draft {
            EventStatus::Draft
        } else {
            EventStatus::Published
        };
        let payload = Payload::builder()
            .json("name", state.text("name").trim())
            .json("description", state.text("description").trim())
            .json("category", state.text("category").trim())
            .optional("venue", non_blank(state.text("venueId")))
            .json("startDate", wire_datetime("Start date", state.text("startDate"))?)
            .json("endDate", wire_datetime("End date", state.text("endDate"))?)
            .optional("capacity", capacity)
            .json("isPublic", state.flag("isPublic"))
            .json("status", serde_json::to_value(status)?)
            .file("photo", state.file("photo"))
            .build();
        let path = format!("/events/{}", segment(&self.event_id)?);
        Ok(ApiRequest::patch(path, payload.encode()))
    }

    fn failure_message(&self) -> &'static str {
        "Failed to update event"
    }
}

fn event_steps() -> Vec<StepDescriptor> {
    let categories: Vec<String> = EVENT_CATEGORIES.iter().map(|c| c.to_string()).collect();
    vec![
        StepDescriptor::new(
            "Basics",
            RuleTable::new(vec![
                Rule::field("name", Predicate::NonBlank, "Event name is required"),
                Rule::field("description", Predicate::NonBlank, "Description is required"),
                Rule::field("category", Predicate::NonBlank, "Pick a category"),
                Rule::field(
                    "category",
                    Predicate::OneOf(categories.clone()),
                    format!("Category must be one of: {}", EVENT_CATEGORIES.join(", ")),
                ),
            ]),
            vec![
                Prompt::Field(FieldDescriptor::new("name", "Event name", FieldKind::Text)),
                Prompt::Field(FieldDescriptor::new(
                    "description",
                    "Description",
                    FieldKind::Text,
                )),
                Prompt::Field(FieldDescriptor::new(
                    "category",
                    "Category",
                    FieldKind::Choice(categories),
                )),
            ],
        ),
        StepDescriptor::new(
            "Schedule & capacity",
            RuleTable::new(vec![
                Rule::field("startDate", Predicate::NonBlank, "Start date is required"),
                Rule::field("startDate", Predicate::Date, "Use YYYY-MM-DD or YYYY-MM-DDTHH:MM"),
                Rule::field("endDate", Predicate::NonBlank, "End date is required"),
                Rule::field("endDate", Predicate::Date, "Use YYYY-MM-DD or YYYY-MM-DDTHH:MM"),
                Rule::field(
                    "endDate",
                    Predicate::After("startDate"),
                    "The event must end after it starts",
                ),
                Rule::field(
                    "capacity",
                    Predicate::WholeNumber { min: 1 },
                    "Capacity must be a whole number of at least 1",
                )
                .optional(),
            ]),
            vec![
                Prompt::Field(
                    FieldDescriptor::new("venueId", "Venue id", FieldKind::Text).with_optional(),
                ),
                Prompt::Field(FieldDescriptor::new("startDate", "Starts", FieldKind::Date)),
                Prompt::Field(FieldDescriptor::new("endDate", "Ends", FieldKind::Date)),
                Prompt::Field(
                    FieldDescriptor::new("capacity", "Capacity", FieldKind::Number)
                        .with_optional(),
                ),
            ],
        ),
        StepDescriptor::new(
            "Visibility & media",
            RuleTable::default(),
            vec![
                Prompt::Field(FieldDescriptor::new("isPublic", "Public", FieldKind::Boolean)),
                Prompt::Field(
                    FieldDescriptor::new("photo", "Cover photo", FieldKind::File)
                        .with_optional()
                        .with_help("Path to a JPEG or PNG file; leave blank to keep the current one."),
                ),
            ],
        ),
    ]
}
