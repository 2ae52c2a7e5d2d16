//! Multi-step form core: state, validation, navigation, collection editing,
//! submission, and the concrete ticket, event and booking flows.

pub mod collections;
pub mod descriptor;
pub mod engine;
pub mod flows;
pub mod navigator;
pub mod state;
pub mod submission;
pub mod validation;
pub mod wizard;

pub use collections::{CategoryVocabulary, CollectionError, ListPolicy};
pub use descriptor::{FieldDescriptor, FieldKind, Prompt, StepDescriptor};
pub use engine::{
    ConfirmationResponse, FormEngine, FormInteraction, FormResult, PromptContext, PromptResponse,
};
pub use navigator::StepNavigator;
pub use state::{FieldValue, FormState, Record};
pub use submission::{
    NoticeLevel, Notifier, Payload, PayloadValue, SubmissionState, SubmitMode, Submitter,
};
pub use validation::{Condition, ErrorMap, Predicate, Rule, RuleTable};
pub use wizard::{Intent, Wizard, WizardEvent, WizardFlow};
