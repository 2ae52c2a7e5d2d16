use super::validation::RuleTable;

/// Supported input kinds for prompted fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Date,
    Time,
    Boolean,
    /// Path to a local file, loaded into a [`crate::domain::FileRef`].
    File,
    Choice(Vec<String>),
}

/// Declarative description of a single prompted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub help: Option<&'static str>,
}

impl FieldDescriptor {
    pub fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: true,
            help: None,
        }
    }

    pub fn with_optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

/// What a step asks for, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Field(FieldDescriptor),
    /// The same fields for every element of a positional list. When
    /// `growable`, the user is offered another element after the last one.
    Items {
        list: &'static str,
        fields: Vec<FieldDescriptor>,
        growable: bool,
    },
    /// One percentage per discount category for every element of `list`.
    Discounts { list: &'static str },
}

/// One page of a wizard: its title, the rules gating "next" and the prompts
/// used by interactive front ends.
#[derive(Debug, Clone)]
pub struct StepDescriptor {
    pub title: &'static str,
    pub rules: RuleTable,
    pub prompts: Vec<Prompt>,
}

impl StepDescriptor {
    pub fn new(title: &'static str, rules: RuleTable, prompts: Vec<Prompt>) -> Self {
        Self {
            title,
            rules,
            prompts,
        }
    }
}
