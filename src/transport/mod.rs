//! Transport layer: HTTP and wire-format details (serialization/deserialization).

mod account;
mod error_body;
mod send_sms;

pub use account::decode_me_json_response;
pub use error_body::extract_error_detail;
pub use send_sms::{decode_send_sms_json_response, encode_send_sms_json};

/// Relative path of the account endpoint.
pub const ME_PATH: &str = "rest/me";
/// Relative path of the message submission endpoint.
pub const MTSMS_PATH: &str = "rest/mtsms";

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
}
