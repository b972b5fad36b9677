//! Domain layer: strong types with validation and invariants (no I/O).

mod config;
mod encoding;
mod error_kind;
mod request;
mod response;
mod validation;
mod value;

pub use config::ProviderConfig;
pub use encoding::Encoding;
pub use error_kind::{ErrorKind, RULES, Rule, TranslatedError, classify, translate};
pub use request::{MESSAGE_CLASS, SendSms};
pub use response::{AccountResponse, BalanceSnapshot, SendSmsResponse};
pub use validation::ValidationError;
pub use value::{
    ApiToken, BaseUrl, CheckInterval, IntervalUnit, Msisdn, Region, SenderName,
};

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn api_token_rejects_empty() {
        assert!(matches!(
            ApiToken::new("   "),
            Err(ValidationError::Empty {
                field: ApiToken::FIELD
            })
        ));
    }

    #[test]
    fn send_sms_encoding_follows_message_text() {
        let sender = SenderName::new("Shop").unwrap();
        let to = Msisdn::new("4512345678").unwrap();

        let plain = SendSms::new(sender.clone(), to.clone(), "Hello");
        assert_eq!(plain.encoding(), Encoding::Gsm7);

        let emoji = SendSms::new(sender, to, "Hej 😀");
        assert_eq!(emoji.encoding(), Encoding::Ucs2);
    }

    #[test]
    fn account_snapshot_requires_credits_and_currency() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();

        let ok = AccountResponse {
            credits: Some(5.0),
            currency: Some("DKK".to_owned()),
            body: String::new(),
        };
        let snapshot = ok.snapshot(at).unwrap();
        assert_eq!(snapshot.credits, 5.0);
        assert_eq!(snapshot.currency, "DKK");
        assert_eq!(snapshot.observed_at, at);

        let zero = AccountResponse {
            credits: Some(0.0),
            ..ok.clone()
        };
        assert!(zero.snapshot(at).is_some());

        let no_credits = AccountResponse {
            credits: None,
            ..ok.clone()
        };
        assert!(no_credits.snapshot(at).is_none());

        let not_a_number = AccountResponse {
            credits: Some(f64::NAN),
            ..ok.clone()
        };
        assert!(not_a_number.snapshot(at).is_none());

        let blank_currency = AccountResponse {
            currency: Some(" ".to_owned()),
            ..ok
        };
        assert!(blank_currency.snapshot(at).is_none());
    }

    #[test]
    fn send_response_first_id() {
        let response = SendSmsResponse {
            ids: vec!["101".to_owned(), "102".to_owned()],
            body: String::new(),
        };
        assert_eq!(response.first_id(), Some("101"));

        let empty = SendSmsResponse {
            ids: Vec::new(),
            body: "{}".to_owned(),
        };
        assert_eq!(empty.first_id(), None);
    }
}
