use eventdesk::checkin::TicketCode;
use eventdesk::forms::collections;
use eventdesk::forms::flows::TicketFlow;
use eventdesk::forms::state::record;
use eventdesk::forms::{
    CategoryVocabulary, ErrorMap, FieldValue, FormState, Predicate, Record, Rule, RuleTable,
    StepNavigator, WizardFlow,
};
use proptest::prelude::*;

/// A generated pricing input and what it is known to represent.
#[derive(Debug, Clone)]
enum Cell {
    Blank,
    Junk,
    Number(f64),
    /// Day of January 2030, with or without a 09:00 time.
    Day { day: u32, timed: bool },
}

fn number_cell() -> impl Strategy<Value = (String, Cell)> {
    prop_oneof![
        Just((String::new(), Cell::Blank)),
        Just(("   ".to_string(), Cell::Blank)),
        "[a-z]{1,6}".prop_map(|raw| (raw, Cell::Junk)),
        (-20i64..40).prop_map(|n| (n.to_string(), Cell::Number(n as f64))),
        (-2000i64..4000).prop_map(|cents| {
            let value = cents as f64 / 100.0;
            (value.to_string(), Cell::Number(value))
        }),
    ]
}

fn date_cell() -> impl Strategy<Value = (String, Cell)> {
    prop_oneof![
        Just((String::new(), Cell::Blank)),
        "[a-z]{2,8}".prop_map(|raw| (raw, Cell::Junk)),
        (1u32..29, any::<bool>()).prop_map(|(day, timed)| {
            let raw = if timed {
                format!("2030-01-{day:02}T09:00")
            } else {
                format!("2030-01-{day:02}")
            };
            (raw, Cell::Day { day, timed })
        }),
    ]
}

fn whole_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) if n.fract() == 0.0 && *n >= 1.0 => Some(*n),
        _ => None,
    }
}

fn expected_pricing_errors(
    price: &Cell,
    quantity: &Cell,
    max: &Cell,
    start: &Cell,
    end: &Cell,
) -> ErrorMap {
    let mut errors = ErrorMap::new();
    let mut expect = |field: &str, message: Option<&str>| {
        if let Some(message) = message {
            errors.insert(format!("ticket-0-{field}"), message.to_string());
        }
    };

    expect(
        "price",
        match price {
            Cell::Blank => Some("Price is required"),
            Cell::Number(n) if *n < 0.0 => Some("Price cannot be negative"),
            Cell::Number(_) => None,
            _ => Some("Price must be a number"),
        },
    );

    expect(
        "quantity",
        match quantity {
            Cell::Blank => Some("Quantity is required"),
            other if whole_number(other).is_none() => {
                Some("Quantity must be a whole number of at least 1")
            }
            _ => None,
        },
    );

    let quantity_value = match quantity {
        Cell::Number(n) => Some(*n),
        _ => None,
    };
    expect(
        "maxPerPerson",
        match (max, whole_number(max), quantity_value) {
            (Cell::Blank, _, _) => Some("Max per person is required"),
            (_, None, _) => Some("Max per person must be a whole number of at least 1"),
            (_, Some(limit), Some(available)) if limit > available => {
                Some("Max per person cannot exceed the quantity")
            }
            _ => None,
        },
    );

    let moment = |cell: &Cell| match cell {
        Cell::Day { day, timed } => Some((*day, *timed)),
        _ => None,
    };
    let format_message = "Use YYYY-MM-DD or YYYY-MM-DDTHH:MM";
    expect(
        "saleStartDate",
        match start {
            Cell::Blank => Some("Sale start date is required"),
            Cell::Day { .. } => None,
            _ => Some(format_message),
        },
    );
    expect(
        "saleEndDate",
        match (end, moment(end), moment(start)) {
            (Cell::Blank, _, _) => Some("Sale end date is required"),
            (_, None, _) => Some(format_message),
            (_, Some(closes), Some(opens)) if closes <= opens => {
                Some("Sale end must be after sale start")
            }
            _ => None,
        },
    );
    errors
}

fn percent_holds(raw: &str) -> bool {
    Predicate::Percent.holds(Some(&FieldValue::text(raw)), &Record::new())
}

proptest! {
    #[test]
    fn seven_digit_codes_are_accepted(code in "[0-9]{7}", pad in " {0,3}") {
        let typed = format!("{pad}{code}{pad}");
        let parsed = TicketCode::manual(&typed).unwrap();
        prop_assert_eq!(parsed.as_str(), code.as_str());
    }

    #[test]
    fn other_lengths_are_rejected(code in "[0-9]{0,6}|[0-9]{8,12}") {
        prop_assert!(TicketCode::manual(&code).is_err());
    }

    #[test]
    fn non_digits_are_rejected(prefix in "[0-9]{3}", letter in "[a-zA-Z]", suffix in "[0-9]{3}") {
        let code = format!("{prefix}{letter}{suffix}");
        prop_assert!(TicketCode::manual(&code).is_err());
    }

    #[test]
    fn percent_matches_closed_range(value in -1000.0f64..1000.0) {
        prop_assert_eq!(percent_holds(&value.to_string()), (0.0..=100.0).contains(&value));
    }

    #[test]
    fn filled_required_field_never_errors(name in "[A-Za-z][A-Za-z ]{0,20}") {
        let rules = RuleTable::new(vec![Rule::field("name", Predicate::NonBlank, "Name is required")]);
        let mut state = FormState::new();
        state.set("name", name.as_str());
        prop_assert!(rules.validate(&state).is_empty());
    }

    #[test]
    fn whitespace_only_field_always_errors(blank in "[ \t]{0,8}") {
        let rules = RuleTable::new(vec![Rule::field("name", Predicate::NonBlank, "Name is required")]);
        let mut state = FormState::new();
        state.set("name", blank.as_str());
        let errors = rules.validate(&state);
        prop_assert_eq!(errors.get("name").map(String::as_str), Some("Name is required"));
    }

    #[test]
    fn navigator_stays_in_bounds(total in 1usize..8, moves in proptest::collection::vec(any::<(bool, bool)>(), 0..40)) {
        let mut navigator = StepNavigator::new(total);
        let mut blocking = eventdesk::forms::ErrorMap::new();
        blocking.insert("field".into(), "broken".into());
        let clean = eventdesk::forms::ErrorMap::new();

        for (forward, has_errors) in moves {
            let before = navigator.current();
            if forward {
                let moved = navigator.next(if has_errors { &blocking } else { &clean });
                if has_errors {
                    prop_assert!(!moved);
                    prop_assert_eq!(navigator.current(), before);
                }
            } else {
                navigator.prev();
            }
            prop_assert!(navigator.current() >= 1);
            prop_assert!(navigator.current() <= total);
        }
    }

    #[test]
    fn removal_never_drops_below_minimum(len in 0usize..6, index in 0usize..6) {
        let items: Vec<usize> = (0..len).collect();
        match collections::remove(&items, index, 1, "item") {
            Ok(next) => {
                prop_assert_eq!(next.len(), len - 1);
                prop_assert!(!next.is_empty());
                prop_assert!(!next.contains(&index));
                let expected: Vec<usize> = (0..len).filter(|item| *item != index).collect();
                prop_assert_eq!(next, expected);
            }
            Err(_) => {
                prop_assert!(index >= len || len <= 1);
            }
        }
        prop_assert_eq!(items.len(), len);
    }

    #[test]
    fn pricing_step_reports_the_first_failing_rule_per_field(
        (price_raw, price) in number_cell(),
        (quantity_raw, quantity) in number_cell(),
        (max_raw, max) in number_cell(),
        (start_raw, start) in date_cell(),
        (end_raw, end) in date_cell(),
    ) {
        let flow = TicketFlow::new("evt1");
        let pricing = &flow.steps()[1].rules;
        let mut state = FormState::new();
        state.set_list(
            "tickets",
            vec![record([
                ("name", "General"),
                ("description", "Standing room"),
                ("price", price_raw.as_str()),
                ("quantity", quantity_raw.as_str()),
                ("maxPerPerson", max_raw.as_str()),
                ("saleStartDate", start_raw.as_str()),
                ("saleEndDate", end_raw.as_str()),
            ])],
        );

        let errors = pricing.validate(&state);
        prop_assert_eq!(errors, expected_pricing_errors(&price, &quantity, &max, &start, &end));
    }

    #[test]
    fn custom_categories_round_trip(names in proptest::collection::btree_set("x[a-z]{3,10}", 1..5)) {
        let mut vocabulary = CategoryVocabulary::new();
        let builtin = vocabulary.options();
        for name in &names {
            vocabulary.add(name).unwrap();
        }
        prop_assert_eq!(vocabulary.options().len(), builtin.len() + names.len());
        for name in &names {
            prop_assert!(vocabulary.add(&name.to_uppercase()).is_err());
            vocabulary.remove(name).unwrap();
        }
        prop_assert_eq!(vocabulary.options(), builtin);
    }
}
