//! Thin typed client for the remote REST API.
//!
//! Every response is unwrapped from the `{success, data, message}` envelope and
//! decoded into a domain type here, so callers never handle raw payloads.

pub mod client;
pub mod envelope;
pub mod error;
pub mod transport;

pub use client::ApiClient;
pub use envelope::{decode_response, Envelope};
pub use error::ApiError;
pub use transport::{
    ApiRequest, ApiResponse, HttpTransport, Method, MultipartForm, RequestBody, Transport,
};
