use serde::Deserialize;

use super::TransportError;
use crate::domain::AccountResponse;

#[derive(Debug, Clone, Deserialize)]
struct MeJsonResponse {
    #[serde(default)]
    credits: Option<TransportNumber>,
    #[serde(default)]
    currency: Option<String>,
}

/// Credit amount returned as either JSON number or numeric string.
///
/// Only finite values are kept; `"NaN"` or `"inf"` count as missing.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TransportNumber {
    Number(f64),
    String(String),
}

impl TransportNumber {
    fn into_f64(self) -> Option<f64> {
        let value = match self {
            Self::Number(value) => Some(value),
            Self::String(value) => value.trim().parse::<f64>().ok(),
        };
        value.filter(|value| value.is_finite())
    }
}

pub fn decode_me_json_response(json: &str) -> Result<AccountResponse, TransportError> {
    let parsed: MeJsonResponse = serde_json::from_str(json)?;
    Ok(AccountResponse {
        credits: parsed.credits.and_then(TransportNumber::into_f64),
        currency: parsed.currency,
        body: json.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_me_maps_payload() {
        let json = r#"
        {
          "credits": 1234.56,
          "currency": "EUR",
          "id": 1
        }
        "#;

        let parsed = decode_me_json_response(json).unwrap();
        assert_eq!(parsed.credits, Some(1234.56));
        assert_eq!(parsed.currency.as_deref(), Some("EUR"));
        assert_eq!(parsed.body, json);
    }

    #[test]
    fn decode_me_supports_numeric_strings() {
        let parsed = decode_me_json_response(r#"{"credits": " 5 ", "currency": "DKK"}"#).unwrap();
        assert_eq!(parsed.credits, Some(5.0));

        let parsed = decode_me_json_response(r#"{"credits": "n/a", "currency": "DKK"}"#).unwrap();
        assert_eq!(parsed.credits, None);
    }

    #[test]
    fn decode_me_drops_non_finite_credits() {
        for credits in ["NaN", "inf", "-infinity"] {
            let json = format!(r#"{{"credits": "{credits}", "currency": "DKK"}}"#);
            let parsed = decode_me_json_response(&json).unwrap();
            assert_eq!(parsed.credits, None, "credits {credits:?}");
        }
    }

    #[test]
    fn decode_me_tolerates_missing_fields() {
        let parsed = decode_me_json_response("{}").unwrap();
        assert_eq!(parsed.credits, None);
        assert_eq!(parsed.currency, None);
    }

    #[test]
    fn decode_me_rejects_invalid_json() {
        assert!(matches!(
            decode_me_json_response("<html>"),
            Err(TransportError::Json(_))
        ));
    }
}
