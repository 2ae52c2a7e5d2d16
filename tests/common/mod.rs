#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

use eventdesk::api::{ApiClient, ApiError, ApiRequest, ApiResponse, Transport};
use eventdesk::config::ConfigManager;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated data directory for one test.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn setup_config_manager() -> ConfigManager {
    ConfigManager::with_base_dir(temp_home()).expect("create config manager for temp dir")
}

/// Transport double: records every request and replays queued responses.
/// An empty queue answers `503` so unexpected calls surface as failures.
#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<ApiRequest>>,
    responses: Mutex<VecDeque<Result<ApiResponse, ApiError>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(responses: impl IntoIterator<Item = ApiResponse>) -> Self {
        let transport = Self::new();
        for response in responses {
            transport.push(response);
        }
        transport
    }

    pub fn push(&self, response: ApiResponse) {
        self.responses
            .lock()
            .expect("lock responses")
            .push_back(Ok(response));
    }

    pub fn push_error(&self, error: ApiError) {
        self.responses
            .lock()
            .expect("lock responses")
            .push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().expect("lock requests").clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("lock requests").len()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests
            .lock()
            .expect("lock requests")
            .push(request.clone());
        self.responses
            .lock()
            .expect("lock responses")
            .pop_front()
            .unwrap_or_else(|| Ok(status(503, json!({"message": "no canned response"}))))
    }
}

pub fn client(responses: impl IntoIterator<Item = ApiResponse>) -> ApiClient<RecordingTransport> {
    ApiClient::new(RecordingTransport::with_responses(responses))
}

/// `200` with the standard success envelope around `data`.
pub fn ok(data: Value) -> ApiResponse {
    ApiResponse {
        status: 200,
        body: json!({"success": true, "data": data}),
    }
}

pub fn status(code: u16, body: Value) -> ApiResponse {
    ApiResponse { status: code, body }
}

pub fn ticket_json(id: &str, name: &str, status: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "price": 50.0,
        "quantity": 10,
        "sold": 3,
        "status": status,
        "saleEndDate": "2099-01-01T00:00:00.000Z"
    })
}
