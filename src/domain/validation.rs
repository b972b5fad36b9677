use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    InvalidSenderName { input: String, reason: &'static str },
    InvalidPhoneNumber { input: String },
    InvalidRegion { input: String },
    InvalidBaseUrl { input: String },
    IntervalNotPositive { actual: i32 },
    IntervalUnitMissing,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::InvalidSenderName { input, reason } => {
                write!(f, "invalid sender name {input:?}: {reason}")
            }
            Self::InvalidPhoneNumber { input } => write!(f, "invalid phone number: {input}"),
            Self::InvalidRegion { input } => write!(f, "unknown region code: {input}"),
            Self::InvalidBaseUrl { input } => write!(f, "invalid base url: {input}"),
            Self::IntervalNotPositive { actual } => {
                write!(f, "balance check interval must be positive, got {actual}")
            }
            Self::IntervalUnitMissing => {
                write!(f, "balance check interval unit must be set when checks are enabled")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
