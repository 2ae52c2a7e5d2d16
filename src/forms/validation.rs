//! Declarative validation rules evaluated per wizard step.
//!
//! A step's rule table is a plain list of [`Rule`]s. Evaluating it against the
//! form state yields an [`ErrorMap`] keyed by field path; an empty map means
//! the step is valid. Rules are pure, so the same state always produces the
//! same map.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::state::{record_flag, FieldValue, FormState, Record};
use crate::domain::common::{parse_datetime, parse_time};

/// Field path to the first failing rule's message.
///
/// Scalar fields use their own key (`eventName`), positional list elements use
/// `<prefix>-<index>-<field>` (`ticket-0-price`) and keyed entries use
/// `<prefix>-<index>-<label>-<key>` (`ticket-0-discount-Student`).
pub type ErrorMap = BTreeMap<String, String>;

type PredicateCallback = dyn Fn(Option<&FieldValue>, &Record) -> bool + Send + Sync;

/// Checks applied to a single value.
#[derive(Clone)]
pub enum Predicate {
    NonBlank,
    Number,
    PositiveNumber,
    NonNegativeNumber,
    WholeNumber { min: i64 },
    /// Number in `[0, 100]`.
    Percent,
    Date,
    Time,
    Email,
    MaxLength(usize),
    MinItems(usize),
    OneOf(Vec<String>),
    /// Date or time strictly earlier than the named sibling field.
    Before(&'static str),
    /// Date or time strictly later than the named sibling field.
    After(&'static str),
    /// Number not greater than the named sibling field.
    AtMost(&'static str),
    FilePresent,
    Custom(Arc<PredicateCallback>),
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Custom(_) => f.write_str("Custom(..)"),
            Predicate::WholeNumber { min } => write!(f, "WholeNumber {{ min: {min} }}"),
            Predicate::MaxLength(max) => write!(f, "MaxLength({max})"),
            Predicate::MinItems(min) => write!(f, "MinItems({min})"),
            Predicate::OneOf(options) => write!(f, "OneOf({options:?})"),
            Predicate::Before(other) => write!(f, "Before({other})"),
            Predicate::After(other) => write!(f, "After({other})"),
            Predicate::AtMost(other) => write!(f, "AtMost({other})"),
            other => f.write_str(match other {
                Predicate::NonBlank => "NonBlank",
                Predicate::Number => "Number",
                Predicate::PositiveNumber => "PositiveNumber",
                Predicate::NonNegativeNumber => "NonNegativeNumber",
                Predicate::Percent => "Percent",
                Predicate::Date => "Date",
                Predicate::Time => "Time",
                Predicate::Email => "Email",
                _ => "FilePresent",
            }),
        }
    }
}

impl Predicate {
    /// `scope` is the record holding the value: the whole form for scalar
    /// fields, the list element for per-item rules.
    pub fn holds(&self, value: Option<&FieldValue>, scope: &Record) -> bool {
        match self {
            Predicate::NonBlank => value.map(|v| !v.is_blank()).unwrap_or(false),
            Predicate::Number => number(value).is_some(),
            Predicate::PositiveNumber => number(value).map(|n| n > 0.0).unwrap_or(false),
            Predicate::NonNegativeNumber => number(value).map(|n| n >= 0.0).unwrap_or(false),
            Predicate::WholeNumber { min } => text(value)
                .and_then(|raw| raw.parse::<i64>().ok())
                .map(|n| n >= *min)
                .unwrap_or(false),
            Predicate::Percent => number(value)
                .map(|n| (0.0..=100.0).contains(&n))
                .unwrap_or(false),
            Predicate::Date => text(value).and_then(parse_datetime).is_some(),
            Predicate::Time => text(value).and_then(parse_time).is_some(),
            Predicate::Email => text(value).map(is_email).unwrap_or(false),
            Predicate::MaxLength(max) => text(value)
                .map(|raw| raw.chars().count() <= *max)
                .unwrap_or(true),
            Predicate::MinItems(min) => value
                .and_then(FieldValue::as_list)
                .map(|items| items.len() >= *min)
                .unwrap_or(*min == 0),
            Predicate::OneOf(options) => text(value)
                .map(|raw| options.iter().any(|option| option.eq_ignore_ascii_case(raw)))
                .unwrap_or(false),
            Predicate::Before(other) => {
                ordered(value, scope.get(*other)).unwrap_or(std::cmp::Ordering::Less)
                    == std::cmp::Ordering::Less
            }
            Predicate::After(other) => {
                ordered(value, scope.get(*other)).unwrap_or(std::cmp::Ordering::Greater)
                    == std::cmp::Ordering::Greater
            }
            Predicate::AtMost(other) => match (number(value), number(scope.get(*other))) {
                (Some(left), Some(right)) => left <= right,
                _ => true,
            },
            Predicate::FilePresent => value
                .and_then(FieldValue::as_file)
                .map(|file| !file.is_empty())
                .unwrap_or(false),
            Predicate::Custom(check) => check(value, scope),
        }
    }
}

fn text(value: Option<&FieldValue>) -> Option<&str> {
    value.and_then(FieldValue::as_text).map(str::trim)
}

fn number(value: Option<&FieldValue>) -> Option<f64> {
    text(value)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// Compares two date or time values. `None` when either side is missing or
/// unparseable; format errors are reported by the `Date`/`Time` rules.
fn ordered(left: Option<&FieldValue>, right: Option<&FieldValue>) -> Option<std::cmp::Ordering> {
    let (left, right) = (text(left)?, text(right)?);
    if let (Some(l), Some(r)) = (parse_datetime(left), parse_datetime(right)) {
        return Some(l.cmp(&r));
    }
    match (parse_time(left), parse_time(right)) {
        (Some(l), Some(r)) => Some(l.cmp(&r)),
        _ => None,
    }
}

fn is_email(raw: &str) -> bool {
    if raw.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = raw.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        _ => false,
    }
}

/// Gate deciding whether a rule applies to a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Always,
    IsTrue(&'static str),
    IsFalse(&'static str),
    Filled(&'static str),
}

impl Condition {
    fn applies(&self, scope: &Record) -> bool {
        match self {
            Condition::Always => true,
            Condition::IsTrue(key) => record_flag(scope, key),
            Condition::IsFalse(key) => !record_flag(scope, key),
            Condition::Filled(key) => scope.get(*key).map(|v| !v.is_blank()).unwrap_or(false),
        }
    }
}

/// Where a rule looks for its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Top-level field.
    Field,
    /// Same field of every element of a positional list.
    Each {
        list: &'static str,
        prefix: &'static str,
    },
    /// Every entry of a keyed map held by each list element.
    EachEntry {
        list: &'static str,
        prefix: &'static str,
        label: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub scope: Scope,
    pub field: &'static str,
    pub predicate: Predicate,
    pub message: String,
    pub condition: Condition,
    /// Optional rules are skipped while the value is blank.
    pub optional: bool,
}

impl Rule {
    pub fn field(field: &'static str, predicate: Predicate, message: impl Into<String>) -> Self {
        Self {
            scope: Scope::Field,
            field,
            predicate,
            message: message.into(),
            condition: Condition::Always,
            optional: false,
        }
    }

    pub fn each(
        list: &'static str,
        prefix: &'static str,
        field: &'static str,
        predicate: Predicate,
        message: impl Into<String>,
    ) -> Self {
        Self {
            scope: Scope::Each { list, prefix },
            ..Self::field(field, predicate, message)
        }
    }

    /// Applies `predicate` to every entry of the map stored under `map` in each
    /// list element.
    pub fn each_entry(
        list: &'static str,
        prefix: &'static str,
        map: &'static str,
        label: &'static str,
        predicate: Predicate,
        message: impl Into<String>,
    ) -> Self {
        Self {
            scope: Scope::EachEntry {
                list,
                prefix,
                label,
            },
            ..Self::field(map, predicate, message)
        }
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    fn check(&self, key: String, value: Option<&FieldValue>, scope: &Record, errors: &mut ErrorMap) {
        if !self.condition.applies(scope) {
            return;
        }
        if self.optional && value.map(FieldValue::is_blank).unwrap_or(true) {
            return;
        }
        if !self.predicate.holds(value, scope) {
            errors.entry(key).or_insert_with(|| self.message.clone());
        }
    }

    fn evaluate(&self, state: &FormState, errors: &mut ErrorMap) {
        match &self.scope {
            Scope::Field => {
                self.check(
                    self.field.to_string(),
                    state.get(self.field),
                    state.record(),
                    errors,
                );
            }
            Scope::Each { list, prefix } => {
                for (index, item) in state.list(list).iter().enumerate() {
                    self.check(
                        item_key(prefix, index, self.field),
                        item.get(self.field),
                        item,
                        errors,
                    );
                }
            }
            Scope::EachEntry {
                list,
                prefix,
                label,
            } => {
                for (index, item) in state.list(list).iter().enumerate() {
                    let Some(entries) = item.get(self.field).and_then(FieldValue::as_map) else {
                        continue;
                    };
                    for (entry, raw) in entries {
                        let value = FieldValue::text(raw.as_str());
                        self.check(
                            entry_key(prefix, index, label, entry),
                            Some(&value),
                            item,
                            errors,
                        );
                    }
                }
            }
        }
    }
}

/// Error key of a positional list element's field.
pub fn item_key(prefix: &str, index: usize, field: &str) -> String {
    format!("{prefix}-{index}-{field}")
}

/// Error key of one keyed entry inside a list element.
pub fn entry_key(prefix: &str, index: usize, label: &str, entry: &str) -> String {
    format!("{prefix}-{index}-{label}-{entry}")
}

/// Ordered rules for one wizard step.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluates every rule; for each key only the first failure is kept.
    pub fn validate(&self, state: &FormState) -> ErrorMap {
        let mut errors = ErrorMap::new();
        for rule in &self.rules {
            rule.evaluate(state, &mut errors);
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::state::record;

    fn tickets(items: Vec<Record>) -> FormState {
        let mut state = FormState::new();
        state.set_list("tickets", items);
        state
    }

    #[test]
    fn first_failing_rule_wins_per_key() {
        let table = RuleTable::new(vec![
            Rule::each("tickets", "ticket", "price", Predicate::NonBlank, "Price is required"),
            Rule::each("tickets", "ticket", "price", Predicate::Number, "Price must be a number"),
        ]);
        let errors = table.validate(&tickets(vec![record([("price", "")])]));
        assert_eq!(errors["ticket-0-price"], "Price is required");
    }

    #[test]
    fn conditional_rule_only_applies_when_flag_set() {
        let table = RuleTable::new(vec![Rule::each(
            "tickets",
            "ticket",
            "refundPolicy",
            Predicate::NonBlank,
            "Describe the refund policy",
        )
        .when(Condition::IsTrue("isRefundable"))]);

        let off = tickets(vec![record([("isRefundable", "false"), ("refundPolicy", "")])]);
        assert!(table.validate(&off).is_empty());

        let on = tickets(vec![record([
            ("isRefundable", FieldValue::Bool(true)),
            ("refundPolicy", FieldValue::text(" ")),
        ])]);
        assert_eq!(
            table.validate(&on).get("ticket-0-refundPolicy").map(String::as_str),
            Some("Describe the refund policy")
        );
    }

    #[test]
    fn keyed_entries_get_their_own_keys() {
        let table = RuleTable::new(vec![Rule::each_entry(
            "tickets",
            "ticket",
            "categoryDiscounts",
            "discount",
            Predicate::Percent,
            "Discount must be between 0 and 100",
        )]);
        let mut discounts = BTreeMap::new();
        discounts.insert("Student".to_string(), "150".to_string());
        discounts.insert("Senior".to_string(), "20".to_string());
        let state = tickets(vec![record([("categoryDiscounts", FieldValue::Map(discounts))])]);

        let errors = table.validate(&state);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("ticket-0-discount-Student"));
    }

    #[test]
    fn relative_rules_compare_sibling_fields() {
        let item = record([
            ("quantity", "10"),
            ("maxPerPerson", "12"),
            ("saleStartDate", "2025-06-10"),
            ("saleEndDate", "2025-06-01"),
        ]);
        assert!(!Predicate::AtMost("quantity").holds(item.get("maxPerPerson"), &item));
        assert!(!Predicate::After("saleStartDate").holds(item.get("saleEndDate"), &item));
        assert!(!Predicate::Before("saleEndDate").holds(item.get("saleStartDate"), &item));

        let times = record([("startTime", "09:00"), ("endTime", "17:30")]);
        assert!(Predicate::After("startTime").holds(times.get("endTime"), &times));
    }

    #[test]
    fn optional_rules_skip_blank_values() {
        let table = RuleTable::new(vec![Rule::field(
            "contactEmail",
            Predicate::Email,
            "Enter a valid email",
        )
        .optional()]);
        let mut state = FormState::new();
        assert!(table.validate(&state).is_empty());
        state.set("contactEmail", "not-an-email");
        assert!(!table.validate(&state).is_empty());
        state.set("contactEmail", "ops@venue.example");
        assert!(table.validate(&state).is_empty());
    }
}
