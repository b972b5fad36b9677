//! Batch dispatch: one submission and one outcome per message.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{Instrument, Span};

use crate::client::{GatewayClient, GatewayError, Transport};
use crate::domain::{
    ApiToken, ErrorKind, Msisdn, ProviderConfig, Region, SendSms, SenderName,
    ValidationError,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Opaque host identifier echoed back in the matching [`SendOutcome`].
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CorrelationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CorrelationId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<u64> for CorrelationId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A message the host wants delivered.
pub struct Message {
    pub recipient: String,
    pub body: String,
    pub correlation_id: CorrelationId,
}

impl Message {
    pub fn new(
        recipient: impl Into<String>,
        body: impl Into<String>,
        correlation_id: impl Into<CorrelationId>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            body: body.into(),
            correlation_id: correlation_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Delivery state reported to the host.
pub enum SendStatus {
    Success,
    WrongNumberFormat,
    InsufficientCredit,
    ServerError,
}

impl SendStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::WrongNumberFormat => "wrong_number_format",
            Self::InsufficientCredit => "insufficient_credit",
            Self::ServerError => "server_error",
        }
    }
}

impl From<ErrorKind> for SendStatus {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InsufficientCredit => Self::InsufficientCredit,
            ErrorKind::WrongNumberFormat => Self::WrongNumberFormat,
            ErrorKind::AuthError | ErrorKind::SenderError | ErrorKind::GenericServerError => {
                Self::ServerError
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Result of one [`Message`].
pub struct SendOutcome {
    pub correlation_id: CorrelationId,
    pub status: SendStatus,
    pub provider_message_id: Option<String>,
    pub error_text: Option<String>,
}

impl SendOutcome {
    fn success(correlation_id: CorrelationId, provider_message_id: impl Into<String>) -> Self {
        Self {
            correlation_id,
            status: SendStatus::Success,
            provider_message_id: Some(provider_message_id.into()),
            error_text: None,
        }
    }

    fn failure(correlation_id: CorrelationId, status: SendStatus, error_text: String) -> Self {
        Self {
            correlation_id,
            status,
            provider_message_id: None,
            error_text: Some(error_text),
        }
    }
}

#[derive(Debug, Clone)]
/// Sends batches of messages through GatewayAPI.
///
/// Messages are submitted sequentially, one call per message. A failure on
/// one message never affects the others, and the returned outcomes always
/// match the input in order and length.
pub struct SmsDispatcher {
    transport: Transport,
    span: Span,
}

impl SmsDispatcher {
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            span: Span::none(),
        }
    }

    /// Span that dispatch logs are recorded under.
    pub fn span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Send every message and report one outcome per message.
    ///
    /// Configuration problems (blank token or sender, invalid sender or base URL)
    /// fail the whole batch with [`SendStatus::ServerError`] before any network call.
    pub async fn dispatch(
        &self,
        config: &ProviderConfig,
        messages: &[Message],
    ) -> Vec<SendOutcome> {
        async {
            tracing::info!(provider = %config.name, count = messages.len(), "dispatching sms batch");

            let (client, sender, region) = match self.prepare(config) {
                Ok(prepared) => prepared,
                Err(err) => {
                    tracing::error!(provider = %config.name, error = %err, "sms batch rejected");
                    let text = err.to_string();
                    return messages
                        .iter()
                        .map(|message| {
                            SendOutcome::failure(
                                message.correlation_id.clone(),
                                SendStatus::ServerError,
                                text.clone(),
                            )
                        })
                        .collect();
                }
            };

            let mut outcomes = Vec::with_capacity(messages.len());
            for message in messages {
                outcomes.push(send_one(&client, &sender, region, message).await);
            }
            outcomes
        }
        .instrument(self.span.clone())
        .await
    }

    fn prepare(
        &self,
        config: &ProviderConfig,
    ) -> Result<(GatewayClient, SenderName, Option<Region>), GatewayError> {
        if config.api_token.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: ApiToken::FIELD,
            }
            .into());
        }
        let sender = SenderName::new(config.sender_name.as_str())?;
        let region = config.region()?;
        let client = GatewayClient::from_config(config, &self.transport)?;
        Ok((client, sender, region))
    }
}

async fn send_one(
    client: &GatewayClient,
    sender: &SenderName,
    region: Option<Region>,
    message: &Message,
) -> SendOutcome {
    let id = message.correlation_id.clone();

    let recipient = match region {
        Some(region) => Msisdn::normalize(Some(region), &message.recipient),
        None => Msisdn::new(message.recipient.as_str()),
    };
    let recipient = match recipient {
        Ok(recipient) => recipient,
        Err(err) => {
            tracing::warn!(correlation_id = %id, error = %err, "sms skipped");
            return SendOutcome::failure(id, SendStatus::WrongNumberFormat, err.to_string());
        }
    };

    let request = SendSms::new(sender.clone(), recipient, message.body.as_str());
    match client.send_sms(&request).await {
        Ok(response) => match response.first_id() {
            Some(provider_message_id) => {
                tracing::info!(
                    correlation_id = %id,
                    recipient = %request.recipient(),
                    provider_message_id,
                    "sms sent"
                );
                SendOutcome::success(id, provider_message_id)
            }
            None => {
                let text = format!(
                    "Unknown or malformed success response from GatewayAPI: {}",
                    response.body
                );
                tracing::warn!(correlation_id = %id, error = %text, "sms failed");
                SendOutcome::failure(id, SendStatus::ServerError, text)
            }
        },
        Err(err) => match err.translate() {
            Some(translated) => {
                let status = SendStatus::from(translated.kind);
                let text = translated.outcome_text();
                tracing::error!(
                    correlation_id = %id,
                    recipient = %request.recipient(),
                    status = status.as_str(),
                    error = %text,
                    "sms failed"
                );
                SendOutcome::failure(id, status, text)
            }
            None => {
                let text = format!("Unexpected error sending SMS: {err}");
                tracing::error!(correlation_id = %id, error = %text, "sms failed unexpectedly");
                SendOutcome::failure(id, SendStatus::ServerError, text)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::{FakeTransport, msisdn_of, reply};

    fn config() -> ProviderConfig {
        ProviderConfig {
            name: "main".to_owned(),
            api_token: "tok".to_owned(),
            sender_name: "Shop".to_owned(),
            ..Default::default()
        }
    }

    fn messages() -> Vec<Message> {
        vec![
            Message::new("000", "first", 1u64),
            Message::new("4512345678", "second", 2u64),
        ]
    }

    #[tokio::test]
    async fn failure_on_one_message_does_not_affect_the_next() {
        let transport = FakeTransport::new(|request| match msisdn_of(request) {
            Some("000") => Ok(reply(400, r#"{"message": "Invalid MSISDN"}"#)),
            _ => Ok(reply(200, r#"{"ids": [777]}"#)),
        });
        let dispatcher = SmsDispatcher::new(transport.transport());

        let outcomes = dispatcher.dispatch(&config(), &messages()).await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].correlation_id, CorrelationId::from(1u64));
        assert_eq!(outcomes[0].status, SendStatus::WrongNumberFormat);
        assert_eq!(
            outcomes[0].error_text.as_deref(),
            Some("GatewayAPI HTTP error: 400 - Invalid MSISDN")
        );
        assert_eq!(outcomes[1].correlation_id, CorrelationId::from(2u64));
        assert_eq!(outcomes[1].status, SendStatus::Success);
        assert_eq!(outcomes[1].provider_message_id.as_deref(), Some("777"));
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn empty_token_fails_batch_without_network_calls() {
        let transport = FakeTransport::respond(200, r#"{"ids": [1]}"#);
        let dispatcher = SmsDispatcher::new(transport.transport());
        let config = ProviderConfig {
            api_token: String::new(),
            ..config()
        };

        let outcomes = dispatcher.dispatch(&config, &messages()).await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|it| it.status == SendStatus::ServerError));
        assert!(outcomes.iter().all(|it| it.provider_message_id.is_none()));
        assert_eq!(
            outcomes[0].error_text.as_deref(),
            Some("validation error: api_token must not be empty")
        );
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_or_invalid_sender_fails_batch_without_network_calls() {
        let transport = FakeTransport::respond(200, r#"{"ids": [1]}"#);
        let dispatcher = SmsDispatcher::new(transport.transport());

        for sender in ["", "ABCDEFGHIJKL", "12"] {
            let config = ProviderConfig {
                sender_name: sender.to_owned(),
                ..config()
            };
            let outcomes = dispatcher.dispatch(&config, &messages()).await;
            assert_eq!(outcomes.len(), 2);
            assert!(outcomes.iter().all(|it| it.status == SendStatus::ServerError));
        }
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn malformed_success_body_is_server_error() {
        let transport = FakeTransport::respond(200, r#"{"ids": []}"#);
        let dispatcher = SmsDispatcher::new(transport.transport());

        let outcomes = dispatcher
            .dispatch(&config(), &[Message::new("4512345678", "hi", "a")])
            .await;

        assert_eq!(outcomes[0].status, SendStatus::ServerError);
        assert_eq!(
            outcomes[0].error_text.as_deref(),
            Some(r#"Unknown or malformed success response from GatewayAPI: {"ids": []}"#)
        );
    }

    #[tokio::test]
    async fn unexpected_ids_shape_is_reported_as_malformed_success() {
        let transport = FakeTransport::respond(200, r#"{"ids": "x"}"#);
        let dispatcher = SmsDispatcher::new(transport.transport());

        let outcomes = dispatcher
            .dispatch(&config(), &[Message::new("4512345678", "hi", "a")])
            .await;

        assert_eq!(outcomes[0].status, SendStatus::ServerError);
        assert_eq!(
            outcomes[0].error_text.as_deref(),
            Some(r#"Unknown or malformed success response from GatewayAPI: {"ids": "x"}"#)
        );
    }

    #[tokio::test]
    async fn provider_errors_map_to_outcome_statuses() {
        let transport = FakeTransport::new(|request| match msisdn_of(request) {
            Some("1") => Ok(reply(402, r#"{"message": "Insufficient credit"}"#)),
            Some("2") => Ok(reply(401, r#"{"detail": "Unauthorized"}"#)),
            Some("3") => Ok(reply(400, r#"{"message": "Sender not allowed"}"#)),
            _ => Ok(reply(500, "boom")),
        });
        let dispatcher = SmsDispatcher::new(transport.transport());
        let batch = [
            Message::new("1", "x", "credit"),
            Message::new("2", "x", "auth"),
            Message::new("3", "x", "sender"),
            Message::new("4", "x", "other"),
        ];

        let outcomes = dispatcher.dispatch(&config(), &batch).await;

        assert_eq!(outcomes[0].status, SendStatus::InsufficientCredit);
        assert_eq!(outcomes[1].status, SendStatus::ServerError);
        assert_eq!(
            outcomes[1].error_text.as_deref(),
            Some("Authentication error with GatewayAPI: GatewayAPI HTTP error: 401 - Unauthorized")
        );
        assert_eq!(outcomes[2].status, SendStatus::ServerError);
        assert_eq!(
            outcomes[2].error_text.as_deref(),
            Some("Invalid or disallowed sender name: GatewayAPI HTTP error: 400 - Sender not allowed")
        );
        assert_eq!(outcomes[3].status, SendStatus::ServerError);
        assert_eq!(
            outcomes[3].error_text.as_deref(),
            Some("GatewayAPI HTTP error: 500 - boom")
        );
    }

    #[tokio::test]
    async fn transport_and_local_failures_are_isolated() {
        let transport = FakeTransport::new(|request| match msisdn_of(request) {
            Some("1") => Err(GatewayError::Timeout),
            Some("2") => Ok(reply(200, "not json")),
            _ => Ok(reply(200, r#"{"ids": ["ok"]}"#)),
        });
        let dispatcher = SmsDispatcher::new(transport.transport());
        let batch = [
            Message::new("1", "x", "timeout"),
            Message::new("2", "x", "parse"),
            Message::new("  ", "x", "blank"),
            Message::new("3", "x", "fine"),
        ];

        let outcomes = dispatcher.dispatch(&config(), &batch).await;

        let ids = outcomes
            .iter()
            .map(|it| it.correlation_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["timeout", "parse", "blank", "fine"]);

        assert_eq!(outcomes[0].status, SendStatus::ServerError);
        assert_eq!(
            outcomes[0].error_text.as_deref(),
            Some("GatewayAPI connection timeout")
        );
        assert_eq!(outcomes[1].status, SendStatus::ServerError);
        assert!(
            outcomes[1]
                .error_text
                .as_deref()
                .unwrap()
                .starts_with("Unexpected error sending SMS: parse error:")
        );
        assert_eq!(outcomes[2].status, SendStatus::WrongNumberFormat);
        assert_eq!(outcomes[3].status, SendStatus::Success);
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn default_region_normalizes_recipients() {
        let transport = FakeTransport::respond(200, r#"{"ids": [5]}"#);
        let dispatcher = SmsDispatcher::new(transport.transport());
        let config = ProviderConfig {
            default_region: Some("DK".to_owned()),
            ..config()
        };
        let batch = [
            Message::new("20 12 34 56", "x", "national"),
            Message::new("+46 70 123 45 67", "x", "foreign"),
            Message::new("call me", "x", "garbage"),
        ];

        let outcomes = dispatcher.dispatch(&config, &batch).await;

        assert_eq!(outcomes[0].status, SendStatus::Success);
        assert_eq!(outcomes[1].status, SendStatus::Success);
        assert_eq!(outcomes[2].status, SendStatus::WrongNumberFormat);
        let sent = transport
            .requests()
            .iter()
            .map(|request| msisdn_of(request).unwrap().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(sent, ["4520123456", "46701234567"]);
    }

    #[tokio::test]
    async fn unknown_region_fails_batch_without_network_calls() {
        let transport = FakeTransport::respond(200, r#"{"ids": [5]}"#);
        let dispatcher = SmsDispatcher::new(transport.transport());
        let config = ProviderConfig {
            default_region: Some("Denmark".to_owned()),
            ..config()
        };

        let outcomes = dispatcher.dispatch(&config, &messages()).await;

        assert!(outcomes.iter().all(|it| it.status == SendStatus::ServerError));
        assert_eq!(
            outcomes[0].error_text.as_deref(),
            Some("validation error: unknown region code: Denmark")
        );
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_batch_yields_no_outcomes() {
        let transport = FakeTransport::respond(200, r#"{"ids": [1]}"#);
        let dispatcher = SmsDispatcher::new(transport.transport());

        assert!(dispatcher.dispatch(&config(), &[]).await.is_empty());
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn status_serializes_in_snake_case() {
        assert_eq!(
            serde_json::to_string(&SendStatus::WrongNumberFormat).unwrap(),
            r#""wrong_number_format""#
        );
        assert_eq!(SendStatus::from(ErrorKind::SenderError), SendStatus::ServerError);
    }
}
