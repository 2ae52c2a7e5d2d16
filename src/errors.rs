use std::result::Result as StdResult;

use thiserror::Error;

use crate::api::ApiError;
use crate::checkin::CodeError;
use crate::forms::collections::CollectionError;
use crate::forms::validation::ErrorMap;

/// Unified error type for the domain, form and API layers.
#[derive(Debug, Error)]
pub enum EventDeskError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Collection(#[from] CollectionError),
    #[error(transparent)]
    Code(#[from] CodeError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{} field(s) need attention", .0.len())]
    Validation(ErrorMap),
    #[error("Submission is only available on the final step (currently {current} of {total})")]
    NotAtFinalStep { current: usize, total: usize },
    #[error("A submission is already in progress")]
    SubmissionInFlight,
    #[error("This form has already been submitted")]
    AlreadySubmitted,
    #[error("Cannot move ticket from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("The {role} role cannot {action}")]
    NotPermitted { role: String, action: String },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Camera unavailable: {0}")]
    Camera(String),
}

pub type Result<T> = StdResult<T, EventDeskError>;
