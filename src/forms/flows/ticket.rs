//! Four-step ticket creation: names, pricing and availability, discounts and
//! refunds, review.

use serde::Serialize;

use super::{non_blank, parse_number, wire_datetime};
use crate::api::client::segment;
use crate::api::ApiRequest;
use crate::domain::{CategoryDiscount, TicketStatus, TicketType};
use crate::errors::Result;
use crate::forms::collections::ListPolicy;
use crate::forms::descriptor::{FieldDescriptor, FieldKind, Prompt, StepDescriptor};
use crate::forms::state::{record, record_flag, record_text, FieldValue, FormState, Record};
use crate::forms::submission::Payload;
use crate::forms::validation::{Condition, Predicate, Rule, RuleTable};
use crate::forms::wizard::{WizardFlow, DISCOUNTS_FIELD, DISCOUNT_LABEL};

pub const TICKETS: &str = "tickets";
const PREFIX: &str = "ticket";

fn ticket_template() -> Record {
    record([
        ("name", FieldValue::text("")),
        ("description", FieldValue::text("")),
        ("price", FieldValue::text("")),
        ("quantity", FieldValue::text("")),
        ("maxPerPerson", FieldValue::text("")),
        ("saleStartDate", FieldValue::text("")),
        ("saleEndDate", FieldValue::text("")),
        ("isRefundable", FieldValue::Bool(false)),
        ("refundPolicy", FieldValue::text("")),
        ("refundDeadlineDays", FieldValue::text("")),
        (DISCOUNTS_FIELD, FieldValue::Map(Default::default())),
    ])
}

/// Descriptor posted for each ticket type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDescriptor {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: u32,
    pub max_per_person: u32,
    pub sale_start_date: String,
    pub sale_end_date: String,
    pub is_refundable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_deadline_days: Option<u32>,
    pub category_discounts: Vec<CategoryDiscount>,
    pub status: TicketStatus,
}

impl TicketDescriptor {
    fn from_record(item: &Record, draft: bool) -> Result<Self> {
        let is_refundable = record_flag(item, "isRefundable");
        let category_discounts = item
            .get(DISCOUNTS_FIELD)
            .and_then(FieldValue::as_map)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(_, percent)| !percent.trim().is_empty())
                    .map(|(category, percent)| {
                        Ok(CategoryDiscount {
                            category: category.clone(),
                            discount_percent: parse_number("Discount", percent)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            name: record_text(item, "name").trim().to_string(),
            description: record_text(item, "description").trim().to_string(),
            price: parse_number("Price", record_text(item, "price"))?,
            quantity: parse_number("Quantity", record_text(item, "quantity"))?,
            max_per_person: parse_number("Max per person", record_text(item, "maxPerPerson"))?,
            sale_start_date: wire_datetime("Sale start", record_text(item, "saleStartDate"))?,
            sale_end_date: wire_datetime("Sale end", record_text(item, "saleEndDate"))?,
            is_refundable,
            refund_policy: if is_refundable {
                non_blank(record_text(item, "refundPolicy"))
            } else {
                None
            },
            refund_deadline_days: match non_blank(record_text(item, "refundDeadlineDays")) {
                Some(days) if is_refundable => Some(parse_number("Refund deadline", &days)?),
                _ => None,
            },
            category_discounts,
            status: TicketStatus::for_submission(draft),
        })
    }
}

pub struct TicketFlow {
    event_id: String,
    steps: Vec<StepDescriptor>,
    lists: [ListPolicy; 1],
}

impl TicketFlow {
    pub fn new(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            steps: ticket_steps(),
            lists: [ListPolicy {
                field: TICKETS,
                prefix: PREFIX,
                noun: "ticket type",
                min_items: 1,
                template: ticket_template,
            }],
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    /// Descriptors built from the current state, as they would be posted.
    pub fn descriptors(&self, state: &FormState, draft: bool) -> Result<Vec<TicketDescriptor>> {
        state
            .list(TICKETS)
            .iter()
            .map(|item| TicketDescriptor::from_record(item, draft))
            .collect()
    }
}

impl WizardFlow for TicketFlow {
    type Entity = Vec<TicketType>;

    fn name(&self) -> &'static str {
        "ticket"
    }

    fn steps(&self) -> &[StepDescriptor] {
        &self.steps
    }

    fn lists(&self) -> &[ListPolicy] {
        &self.lists
    }

    fn initial_state(&self) -> FormState {
        let mut state = FormState::new();
        state.set_list(TICKETS, vec![ticket_template()]);
        state
    }

    fn request(&self, state: &FormState, draft: bool) -> Result<ApiRequest> {
        let descriptors = self.descriptors(state, draft)?;
        let document = serde_json::to_value(descriptors)?;
        let path = format!("/events/{}/tickets", segment(&self.event_id)?);
        Ok(ApiRequest::post(path, Payload::Document(document).encode()))
    }

    fn failure_message(&self) -> &'static str {
        "Failed to create tickets"
    }
}

fn each(field: &'static str, predicate: Predicate, message: &str) -> Rule {
    Rule::each(TICKETS, PREFIX, field, predicate, message)
}

fn ticket_steps() -> Vec<StepDescriptor> {
    let details = RuleTable::new(vec![
        each("name", Predicate::NonBlank, "Ticket name is required"),
        each("description", Predicate::NonBlank, "Description is required"),
    ]);

    let pricing = RuleTable::new(vec![
        each("price", Predicate::NonBlank, "Price is required"),
        each("price", Predicate::Number, "Price must be a number"),
        each("price", Predicate::NonNegativeNumber, "Price cannot be negative"),
        each("quantity", Predicate::NonBlank, "Quantity is required"),
        each(
            "quantity",
            Predicate::WholeNumber { min: 1 },
            "Quantity must be a whole number of at least 1",
        ),
        each("maxPerPerson", Predicate::NonBlank, "Max per person is required"),
        each(
            "maxPerPerson",
            Predicate::WholeNumber { min: 1 },
            "Max per person must be a whole number of at least 1",
        ),
        each(
            "maxPerPerson",
            Predicate::AtMost("quantity"),
            "Max per person cannot exceed the quantity",
        ),
        each("saleStartDate", Predicate::NonBlank, "Sale start date is required"),
        each("saleStartDate", Predicate::Date, "Use YYYY-MM-DD or YYYY-MM-DDTHH:MM"),
        each("saleEndDate", Predicate::NonBlank, "Sale end date is required"),
        each("saleEndDate", Predicate::Date, "Use YYYY-MM-DD or YYYY-MM-DDTHH:MM"),
        each(
            "saleEndDate",
            Predicate::After("saleStartDate"),
            "Sale end must be after sale start",
        ),
    ]);

    let extras = RuleTable::new(vec![
        Rule::each_entry(
            TICKETS,
            PREFIX,
            DISCOUNTS_FIELD,
            DISCOUNT_LABEL,
            Predicate::Percent,
            "Discount must be between 0 and 100",
        )
        .optional(),
        each("refundPolicy", Predicate::NonBlank, "Describe the refund policy")
            .when(Condition::IsTrue("isRefundable")),
        each(
            "refundDeadlineDays",
            Predicate::WholeNumber { min: 0 },
            "Refund deadline must be a whole number of days",
        )
        .when(Condition::IsTrue("isRefundable"))
        .optional(),
    ]);

    let review = RuleTable::new(vec![Rule::field(
        TICKETS,
        Predicate::MinItems(1),
        "Add at least one ticket type",
    )]);

    vec![
        StepDescriptor::new(
            "Ticket types",
            details,
            vec![Prompt::Items {
                list: TICKETS,
                fields: vec![
                    FieldDescriptor::new("name", "Name", FieldKind::Text)
                        .with_help("Shown to buyers, e.g. `General Admission`."),
                    FieldDescriptor::new("description", "Description", FieldKind::Text),
                ],
                growable: true,
            }],
        ),
        StepDescriptor::new(
            "Pricing & availability",
            pricing,
            vec![Prompt::Items {
                list: TICKETS,
                fields: vec![
                    FieldDescriptor::new("price", "Price", FieldKind::Number)
                        .with_help("Use 0 for free tickets."),
                    FieldDescriptor::new("quantity", "Quantity", FieldKind::Number),
                    FieldDescriptor::new("maxPerPerson", "Max per person", FieldKind::Number),
                    FieldDescriptor::new("saleStartDate", "Sale starts", FieldKind::Date),
                    FieldDescriptor::new("saleEndDate", "Sale ends", FieldKind::Date),
                ],
                growable: false,
            }],
        ),
        StepDescriptor::new(
            "Discounts & refunds",
            extras,
            vec![
                Prompt::Discounts { list: TICKETS },
                Prompt::Items {
                    list: TICKETS,
                    fields: vec![
                        FieldDescriptor::new("isRefundable", "Refundable", FieldKind::Boolean),
                        FieldDescriptor::new("refundPolicy", "Refund policy", FieldKind::Text)
                            .with_optional()
                            .with_help("Required when the ticket is refundable."),
                        FieldDescriptor::new(
                            "refundDeadlineDays",
                            "Refund deadline (days before event)",
                            FieldKind::Number,
                        )
                        .with_optional(),
                    ],
                    growable: false,
                },
            ],
        ),
        StepDescriptor::new("Review", review, Vec::new()),
    ]
}
