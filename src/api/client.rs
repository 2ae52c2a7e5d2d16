use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::envelope::{decode_response, Envelope};
use super::error::{server_message, ApiError};
use super::transport::{
    ApiRequest, ApiResponse, HttpTransport, Method, MultipartForm, RequestBody, Transport,
};
use crate::domain::{
    Booking, BookingDecision, CheckOutcome, CodeType, Event, FileRef, InvitationDetails,
    Organization, TicketStatus, TicketType,
};

const INVALID_CODE_FALLBACK: &str = "Invalid or unrecognised ticket code";

/// Typed facade over the API endpoints used by the flows.
pub struct ApiClient<T = HttpTransport> {
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends a prepared request and decodes its envelope into `R`.
    pub fn execute<R: DeserializeOwned>(&self, request: &ApiRequest) -> Result<R, ApiError> {
        let response = self.transport.send(request)?;
        let status = response.status;
        let result = decode_response(response);
        match &result {
            Ok(_) => tracing::debug!(method = %request.method, path = %request.path, status, "request succeeded"),
            Err(err) => tracing::warn!(method = %request.method, path = %request.path, error = %err, "request failed"),
        }
        result
    }

    pub fn get_event(&self, event_id: &str) -> Result<Event, ApiError> {
        let path = format!("/events/{}", segment(event_id)?);
        self.execute(&ApiRequest::get(path))
    }

    pub fn update_ticket_status(
        &self,
        event_id: &str,
        ticket_id: &str,
        status: TicketStatus,
    ) -> Result<TicketType, ApiError> {
        let path = format!(
            "/events/{}/tickets/{}",
            segment(event_id)?,
            segment(ticket_id)?
        );
        let body = RequestBody::Json(json!({ "status": status.to_string() }));
        self.execute(&ApiRequest::patch(path, body))
    }

    pub fn decide_booking(
        &self,
        booking_id: &str,
        decision: BookingDecision,
        reason: Option<&str>,
    ) -> Result<Booking, ApiError> {
        let path = format!("/bookings/{}/status", segment(booking_id)?);
        let mut body = json!({ "status": decision.status().to_string() });
        if let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) {
            body["reason"] = Value::String(reason.to_string());
        }
        self.execute(&ApiRequest::patch(path, RequestBody::Json(body)))
    }

    pub fn update_organization_logo(
        &self,
        organization_id: &str,
        logo: FileRef,
    ) -> Result<Organization, ApiError> {
        let path = format!("/organizations/{}/logo", segment(organization_id)?);
        self.execute(&ApiRequest::patch(path, single_file("logo", logo)))
    }

    pub fn update_supporting_document(
        &self,
        organization_id: &str,
        document: FileRef,
    ) -> Result<Organization, ApiError> {
        let path = format!(
            "/organizations/{}/supporting-document",
            segment(organization_id)?
        );
        self.execute(&ApiRequest::patch(
            path,
            single_file("supportingDocument", document),
        ))
    }

    /// Validates a ticket code at the door.
    ///
    /// An already-used ticket comes back as a non-2xx response whose body still
    /// describes the invitation; that case is reported as
    /// [`CheckOutcome::AlreadyUsed`] rather than an error.
    pub fn check_invitation(
        &self,
        ticket_code: &str,
        code_type: CodeType,
    ) -> Result<CheckOutcome, ApiError> {
        let request = ApiRequest::new(
            Method::Post,
            "/invitations/check",
            RequestBody::Json(json!({ "ticketCode": ticket_code, "codeType": code_type })),
        );
        let response = self.transport.send(&request)?;
        let outcome = classify_check(&response)?;
        match &outcome {
            CheckOutcome::Admitted(_) => tracing::info!(%code_type, "invitation admitted"),
            CheckOutcome::AlreadyUsed(_) => tracing::info!(%code_type, "invitation already used"),
            CheckOutcome::Rejected { message } => {
                tracing::warn!(%code_type, status = response.status, %message, "invitation rejected")
            }
        }
        Ok(outcome)
    }
}

fn classify_check(response: &ApiResponse) -> Result<CheckOutcome, ApiError> {
    let envelope = Envelope::from_body(&response.body);
    let details = envelope
        .data
        .clone()
        .filter(|data| data.is_object())
        .and_then(|data| serde_json::from_value::<InvitationDetails>(data).ok());

    if response.is_success() && envelope.success {
        let details = details.ok_or_else(|| {
            ApiError::Decode("check response carried no invitation details".into())
        })?;
        return Ok(if details.already_used() {
            CheckOutcome::AlreadyUsed(details)
        } else {
            CheckOutcome::Admitted(details)
        });
    }

    match details {
        Some(details) if details.already_used() => Ok(CheckOutcome::AlreadyUsed(details)),
        _ => Ok(CheckOutcome::Rejected {
            message: envelope
                .message
                .or_else(|| server_message(&response.body))
                .unwrap_or_else(|| INVALID_CODE_FALLBACK.to_string()),
        }),
    }
}

fn single_file(name: &str, file: FileRef) -> RequestBody {
    RequestBody::Multipart(MultipartForm {
        text: Vec::new(),
        files: vec![(name.to_string(), file)],
    })
}

/// Guards path segments against ids that would change the route.
pub(crate) fn segment(id: &str) -> Result<&str, ApiError> {
    let trimmed = id.trim();
    let valid = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
    if valid {
        Ok(trimmed)
    } else {
        Err(ApiError::InvalidRequest(format!("`{}` is not a valid id", id)))
    }
}
