//! Venue booking request: slot details, guest list, supporting documents.

use serde_json::{json, Value};

use super::{non_blank, parse_number, wire_datetime};
use crate::api::ApiRequest;
use crate::domain::{Booking, BookingStatus};
use crate::errors::Result;
use crate::forms::collections::ListPolicy;
use crate::forms::descriptor::{FieldDescriptor, FieldKind, Prompt, StepDescriptor};
use crate::forms::state::{record, record_text, FieldValue, FormState, Record};
use crate::forms::submission::Payload;
use crate::forms::validation::{Predicate, Rule, RuleTable};
use crate::forms::wizard::WizardFlow;

pub const GUESTS: &str = "guests";
const PREFIX: &str = "guest";
const NOTES_LIMIT: usize = 1000;

fn guest_template() -> Record {
    record([("name", ""), ("email", ""), ("phone", "")])
}

pub struct BookingFlow {
    venue_id: Option<String>,
    steps: Vec<StepDescriptor>,
    lists: [ListPolicy; 1],
}

impl BookingFlow {
    pub fn new() -> Self {
        Self {
            venue_id: None,
            steps: booking_steps(),
            lists: [ListPolicy {
                field: GUESTS,
                prefix: PREFIX,
                noun: "guest",
                min_items: 1,
                template: guest_template,
            }],
        }
    }

    pub fn for_venue(venue_id: impl Into<String>) -> Self {
        Self {
            venue_id: Some(venue_id.into()),
            ..Self::new()
        }
    }
}

impl Default for BookingFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardFlow for BookingFlow {
    type Entity = Booking;

    fn name(&self) -> &'static str {
        "booking"
    }

    fn steps(&self) -> &[StepDescriptor] {
        &self.steps
    }

    fn lists(&self) -> &[ListPolicy] {
        &self.lists
    }

    fn initial_state(&self) -> FormState {
        let mut state = FormState::new();
        state.set("venueId", self.venue_id.clone().unwrap_or_default());
        for key in ["eventName", "date", "startTime", "endTime", "expectedAttendees", "notes"] {
            state.set(key, "");
        }
        state.set_list(GUESTS, vec![guest_template()]);
        state
    }

    fn request(&self, state: &FormState, draft: bool) -> Result<ApiRequest> {
        let guests: Vec<Value> = state
            .list(GUESTS)
            .iter()
            .map(|guest| {
                let mut entry = json!({ "name": record_text(guest, "name").trim() });
                for key in ["email", "phone"] {
                    if let Some(value) = non_blank(record_text(guest, key)) {
                        entry[key] = Value::String(value);
                    }
                }
                entry
            })
            .collect();
        let attendees = match non_blank(state.text("expectedAttendees")) {
            Some(raw) => Some(parse_number::<u32>("Expected attendees", &raw)?),
            None => None,
        };
        let status = if draft {
            BookingStatus::Draft
        } else {
            BookingStatus::Pending
        };

        let mut builder = Payload::builder()
            .json("venueId", state.text("venueId").trim())
            .json("eventName", state.text("eventName").trim())
            .json("date", wire_datetime("Date", state.text("date"))?)
            .json("startTime", state.text("startTime").trim())
            .json("endTime", state.text("endTime").trim())
            .optional("expectedAttendees", attendees)
            .json("guests", Value::Array(guests))
            .optional("notes", non_blank(state.text("notes")))
            .json("status", serde_json::to_value(status)?)
            .file("supportingDocument", state.file("supportingDocument"));
        for (index, guest) in state.list(GUESTS).iter().enumerate() {
            builder = builder.file(
                format!("guestPhoto_{index}"),
                guest.get("photo").and_then(FieldValue::as_file),
            );
        }
        Ok(ApiRequest::post("/bookings", builder.build().encode()))
    }

    fn failure_message(&self) -> &'static str {
        "Failed to submit booking request"
    }
}

fn booking_steps() -> Vec<StepDescriptor> {
    let guest = |field: &'static str, predicate: Predicate, message: &str| {
        Rule::each(GUESTS, PREFIX, field, predicate, message)
    };
    vec![
        StepDescriptor::new(
            "Booking details",
            RuleTable::new(vec![
                Rule::field("venueId", Predicate::NonBlank, "Choose a venue"),
                Rule::field("eventName", Predicate::NonBlank, "Event name is required"),
                Rule::field("date", Predicate::NonBlank, "Date is required"),
                Rule::field("date", Predicate::Date, "Use YYYY-MM-DD"),
                Rule::field("startTime", Predicate::NonBlank, "Start time is required"),
                Rule::field("startTime", Predicate::Time, "Use 24-hour HH:MM"),
                Rule::field("endTime", Predicate::NonBlank, "End time is required"),
                Rule::field("endTime", Predicate::Time, "Use 24-hour HH:MM"),
                Rule::field(
                    "endTime",
                    Predicate::After("startTime"),
                    "End time must be after start time",
                ),
                Rule::field(
                    "expectedAttendees",
                    Predicate::WholeNumber { min: 1 },
                    "Expected attendees must be a whole number of at least 1",
                )
                .optional(),
            ]),
            vec![
                Prompt::Field(FieldDescriptor::new("venueId", "Venue id", FieldKind::Text)),
                Prompt::Field(FieldDescriptor::new("eventName", "Event name", FieldKind::Text)),
                Prompt::Field(FieldDescriptor::new("date", "Date", FieldKind::Date)),
                Prompt::Field(FieldDescriptor::new("startTime", "Start time", FieldKind::Time)),
                Prompt::Field(FieldDescriptor::new("endTime", "End time", FieldKind::Time)),
                Prompt::Field(
                    FieldDescriptor::new(
                        "expectedAttendees",
                        "Expected attendees",
                        FieldKind::Number,
                    )
                    .with_optional(),
                ),
            ],
        ),
        StepDescriptor::new(
            "Guests",
            RuleTable::new(vec![
                Rule::field(GUESTS, Predicate::MinItems(1), "Add at least one guest"),
                guest("name", Predicate::NonBlank, "Guest name is required"),
                guest("email", Predicate::Email, "Enter a valid email").optional(),
            ]),
            vec![Prompt::Items {
                list: GUESTS,
                fields: vec![
                    FieldDescriptor::new("name", "Guest name", FieldKind::Text),
                    FieldDescriptor::new("email", "Email", FieldKind::Text).with_optional(),
                    FieldDescriptor::new("phone", "Phone", FieldKind::Text).with_optional(),
                    FieldDescriptor::new("photo", "Photo", FieldKind::File).with_optional(),
                ],
                growable: true,
            }],
        ),
        StepDescriptor::new(
            "Documents & notes",
            RuleTable::new(vec![Rule::field(
                "notes",
                Predicate::MaxLength(NOTES_LIMIT),
                format!("Notes cannot exceed {NOTES_LIMIT} characters"),
            )
            .optional()]),
            vec![
                Prompt::Field(
                    FieldDescriptor::new(
                        "supportingDocument",
                        "Supporting document",
                        FieldKind::File,
                    )
                    .with_optional()
                    .with_help("Path to a PDF or image backing the request."),
                ),
                Prompt::Field(
                    FieldDescriptor::new("notes", "Notes", FieldKind::Text).with_optional(),
                ),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FileRef;
    use crate::forms::wizard::{Intent, Wizard, WizardEvent};

    fn details(wizard: &mut Wizard<BookingFlow>) {
        for (key, value) in [
            ("eventName", "Product launch"),
            ("date", "2025-09-12"),
            ("startTime", "18:00"),
            ("endTime", "22:30"),
            ("expectedAttendees", "80"),
        ] {
            wizard.dispatch(Intent::set(key, value)).unwrap();
        }
    }

    #[test]
    fn end_time_must_follow_start_time() {
        let mut wizard = Wizard::new(BookingFlow::for_venue("ven1"));
        details(&mut wizard);
        wizard.dispatch(Intent::set("endTime", "17:00")).unwrap();
        assert_eq!(wizard.dispatch(Intent::Next).unwrap(), WizardEvent::Blocked(1));
        assert_eq!(wizard.errors()["endTime"], "End time must be after start time");
    }

    #[test]
    fn guest_email_is_checked_only_when_given() {
        let mut wizard = Wizard::new(BookingFlow::for_venue("ven1"));
        details(&mut wizard);
        wizard.dispatch(Intent::Next).unwrap();
        wizard.dispatch(Intent::update(GUESTS, 0, "name", "Ada")).unwrap();
        assert_eq!(wizard.dispatch(Intent::Next).unwrap(), WizardEvent::Advanced(3));

        wizard.dispatch(Intent::Prev).unwrap();
        wizard
            .dispatch(Intent::update(GUESTS, 0, "email", "ada@"))
            .unwrap();
        assert_eq!(wizard.dispatch(Intent::Next).unwrap(), WizardEvent::Blocked(1));
        assert!(wizard.errors().contains_key("guest-0-email"));
    }

    #[test]
    fn guest_photo_makes_request_multipart() {
        let flow = BookingFlow::for_venue("ven1");
        let mut state = flow.initial_state();
        state.set("date", "2025-09-12");
        state.set_list(
            GUESTS,
            vec![record([
                ("name", FieldValue::text("Ada")),
                ("photo", FieldValue::File(FileRef::new("ada.jpg", vec![9]))),
            ])],
        );

        let request = flow.request(&state, false).unwrap();
        let form = request.body.as_multipart().expect("multipart");
        assert_eq!(form.text_value("guests"), Some(r#"[{"name":"Ada"}]"#));
        assert_eq!(form.text_value("status"), Some("pending"));
        assert!(form.file("guestPhoto_0").is_some());
    }

    #[test]
    fn plain_request_is_json() {
        let flow = BookingFlow::for_venue("ven1");
        let mut state = flow.initial_state();
        state.set("date", "2025-09-12");
        let request = flow.request(&state, true).unwrap();
        let body = request.body.as_json().expect("json");
        assert_eq!(body["status"], json!("draft"));
        assert_eq!(body["guests"].as_array().map(Vec::len), Some(1));
        assert!(body.get("notes").is_none());
    }
}
