use crate::domain::encoding::Encoding;
use crate::domain::value::{Msisdn, SenderName};

/// Message class sent with every submission (`class`).
pub const MESSAGE_CLASS: &str = "standard";

/// A single-recipient submission to `rest/mtsms`.
///
/// GatewayAPI accepts a recipient list, but this connector always submits one
/// recipient per call so that every message gets its own outcome.
#[derive(Debug, Clone)]
pub struct SendSms {
    sender: SenderName,
    recipient: Msisdn,
    message: String,
}

impl SendSms {
    pub fn new(sender: SenderName, recipient: Msisdn, message: impl Into<String>) -> Self {
        Self {
            sender,
            recipient,
            message: message.into(),
        }
    }

    pub fn sender(&self) -> &SenderName {
        &self.sender
    }

    pub fn recipient(&self) -> &Msisdn {
        &self.recipient
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Encoding derived from the message text.
    pub fn encoding(&self) -> Encoding {
        Encoding::classify(&self.message)
    }
}
