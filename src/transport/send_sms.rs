use serde_json::{Value, json};

use super::TransportError;
use crate::domain::{MESSAGE_CLASS, SendSms, SendSmsResponse};

/// Message id as returned in `ids`: integers and strings verbatim, other
/// numbers in their JSON form. Anything else is not an id.
fn transport_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => Some(number.to_string()),
        Value::String(id) => Some(id.clone()),
        _ => None,
    }
}

pub fn encode_send_sms_json(request: &SendSms) -> Value {
    json!({
        "sender": request.sender().as_str(),
        "message": request.message(),
        "recipients": [{ "msisdn": request.recipient().as_str() }],
        "encoding": request.encoding().as_wire(),
        "class": MESSAGE_CLASS,
    })
}

/// Decode a `rest/mtsms` success body.
///
/// Only invalid JSON is an error. A body without an `ids` list yields no ids,
/// which the caller reports as a malformed success.
pub fn decode_send_sms_json_response(json: &str) -> Result<SendSmsResponse, TransportError> {
    let parsed: Value = serde_json::from_str(json)?;
    let ids = match parsed.get("ids") {
        Some(Value::Array(ids)) => ids.iter().filter_map(transport_id).collect(),
        _ => Vec::new(),
    };
    Ok(SendSmsResponse {
        ids,
        body: json.to_owned(),
    })
}
