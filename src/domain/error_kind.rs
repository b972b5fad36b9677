//! Classification of GatewayAPI error text into a stable set of kinds.
//!
//! GatewayAPI reports most failures as free-form English text, so classification
//! is keyword based. Text the rules do not recognize (including localized or
//! reworded messages) falls through to [`ErrorKind::GenericServerError`].

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Provider-level meaning of a failed request.
pub enum ErrorKind {
    InsufficientCredit,
    WrongNumberFormat,
    AuthError,
    SenderError,
    GenericServerError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InsufficientCredit => "insufficient_credit",
            Self::WrongNumberFormat => "wrong_number_format",
            Self::AuthError => "auth_error",
            Self::SenderError => "sender_error",
            Self::GenericServerError => "generic_server_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classification rule.
///
/// Every group in `all_of` must match; a group matches when any of its
/// needles occurs in the lowercased message.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub kind: ErrorKind,
    pub all_of: &'static [&'static [&'static str]],
}

impl Rule {
    /// `haystack` must already be lowercased.
    pub fn matches(&self, haystack: &str) -> bool {
        self.all_of
            .iter()
            .all(|group| group.iter().any(|needle| haystack.contains(needle)))
    }
}

/// Ordered rule table; the first match wins.
pub const RULES: &[Rule] = &[
    Rule {
        kind: ErrorKind::InsufficientCredit,
        all_of: &[&["balance", "credit", "insufficient funds"]],
    },
    Rule {
        kind: ErrorKind::WrongNumberFormat,
        all_of: &[&["msisdn", "recipient", "invalid number", "number format"]],
    },
    Rule {
        kind: ErrorKind::AuthError,
        all_of: &[&["authentication failed", "unauthorized", "token"]],
    },
    Rule {
        kind: ErrorKind::SenderError,
        all_of: &[&["sender"], &["invalid", "not allowed"]],
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
/// A failure mapped to an [`ErrorKind`], with the original text preserved.
pub struct TranslatedError {
    pub kind: ErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl TranslatedError {
    /// Text suitable for a per-message outcome.
    pub fn outcome_text(&self) -> String {
        match self.kind {
            ErrorKind::AuthError => {
                format!("Authentication error with GatewayAPI: {}", self.message)
            }
            ErrorKind::SenderError => {
                format!("Invalid or disallowed sender name: {}", self.message)
            }
            _ => self.message.clone(),
        }
    }
}

impl fmt::Display for TranslatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Classify `raw_message` with [`RULES`].
pub fn classify(raw_message: &str) -> ErrorKind {
    let haystack = raw_message.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&haystack))
        .map_or(ErrorKind::GenericServerError, |rule| rule.kind)
}

/// Map a raw HTTP/provider failure to a [`TranslatedError`].
pub fn translate(http_status: Option<u16>, raw_message: &str) -> TranslatedError {
    let kind = classify(raw_message);
    tracing::warn!(
        status = ?http_status,
        raw = raw_message,
        kind = %kind,
        "translated GatewayAPI error"
    );
    TranslatedError {
        kind,
        status: http_status,
        message: raw_message.to_owned(),
    }
}
