use chrono::{DateTime, Months, TimeDelta, Utc};
use phonenumber::country;
use serde::{Deserialize, Serialize};

use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// GatewayAPI API token, sent as the HTTP Basic username.
///
/// Invariant: non-empty after trimming.
pub struct ApiToken(String);

impl ApiToken {
    /// Configuration field name (`api_token`).
    pub const FIELD: &'static str = "api_token";

    /// Create a validated [`ApiToken`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Sender shown on the handset (`sender`).
///
/// Invariants:
/// - numeric senders are 3 to 15 digits,
/// - alphanumeric senders are 1 to 11 letters or digits once spaces are stripped.
///
/// The value is kept as provided; GatewayAPI applies its own handling of spaces.
pub struct SenderName(String);

impl SenderName {
    /// JSON field name used by GatewayAPI (`sender`).
    pub const FIELD: &'static str = "sender";

    pub const NUMERIC_MIN: usize = 3;
    pub const NUMERIC_MAX: usize = 15;
    pub const ALPHANUMERIC_MAX: usize = 11;

    /// Create a validated [`SenderName`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        if value.chars().all(char::is_numeric) {
            let len = value.chars().count();
            if !(Self::NUMERIC_MIN..=Self::NUMERIC_MAX).contains(&len) {
                return Err(ValidationError::InvalidSenderName {
                    input: value,
                    reason: "numeric sender must be 3-15 digits",
                });
            }
            return Ok(Self(value));
        }

        let stripped = value.chars().filter(|c| *c != ' ').collect::<Vec<_>>();
        if stripped.is_empty()
            || stripped.len() > Self::ALPHANUMERIC_MAX
            || !stripped.iter().all(|c| c.is_alphanumeric())
        {
            return Err(ValidationError::InvalidSenderName {
                input: value,
                reason: "alphanumeric sender must be 1-11 letters or digits, spaces excluded",
            });
        }
        Ok(Self(value))
    }

    /// Borrow the sender as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Recipient number as sent to GatewayAPI (`msisdn`).
///
/// Invariant: non-empty after trimming. [`Msisdn::new`] keeps the input as is;
/// [`Msisdn::normalize`] rewrites it to international digits.
pub struct Msisdn(String);

impl Msisdn {
    /// JSON field name used by GatewayAPI (`msisdn`).
    pub const FIELD: &'static str = "msisdn";

    /// Create a validated (non-empty) recipient.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Parse `input` as a phone number and keep its international digits
    /// (E.164 without the `+`).
    ///
    /// Numbers written without a country prefix are read in `region`'s
    /// national numbering plan.
    pub fn normalize(region: Option<Region>, input: &str) -> Result<Self, ValidationError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let number = phonenumber::parse(region.map(Region::id), raw).map_err(|_| {
            ValidationError::InvalidPhoneNumber {
                input: raw.to_owned(),
            }
        })?;
        let e164 = phonenumber::format(&number)
            .mode(phonenumber::Mode::E164)
            .to_string();

        Ok(Self(e164.trim_start_matches('+').to_owned()))
    }

    /// Raw (trimmed) value as sent to GatewayAPI.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Msisdn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Country used to read recipients that lack a country prefix.
pub struct Region(country::Id);

impl Region {
    /// Config field holding the region code (`default_region`).
    pub const FIELD: &'static str = "default_region";

    /// Parse an ISO 3166-1 alpha-2 code such as `DK` (case-insensitive).
    pub fn new(code: &str) -> Result<Self, ValidationError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        code.to_ascii_uppercase()
            .parse::<country::Id>()
            .map(Self)
            .map_err(|_| ValidationError::InvalidRegion {
                input: code.to_owned(),
            })
    }

    pub fn id(self) -> country::Id {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Root URL of the GatewayAPI REST service.
///
/// Invariant: an absolute `http` or `https` URL. Trailing slashes are dropped so
/// that [`BaseUrl::join`] never produces `//`.
pub struct BaseUrl(String);

impl BaseUrl {
    /// Configuration field name (`base_url`).
    pub const FIELD: &'static str = "base_url";

    /// Public GatewayAPI endpoint (EU).
    pub const DEFAULT: &'static str = "https://gatewayapi.eu";

    /// Create a validated [`BaseUrl`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let parsed = url::Url::parse(trimmed).map_err(|_| ValidationError::InvalidBaseUrl {
            input: trimmed.to_owned(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ValidationError::InvalidBaseUrl {
                input: trimmed.to_owned(),
            });
        }

        Ok(Self(trimmed.trim_end_matches('/').to_owned()))
    }

    /// Join a relative API path, tolerating a leading slash on `path`.
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BaseUrl {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Unit of the balance check interval.
pub enum IntervalUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Positive balance check interval.
pub struct CheckInterval {
    qty: u32,
    unit: IntervalUnit,
}

impl CheckInterval {
    /// Create a validated interval from host configuration values.
    pub fn new(qty: i32, unit: Option<IntervalUnit>) -> Result<Self, ValidationError> {
        let unit = unit.ok_or(ValidationError::IntervalUnitMissing)?;
        let qty = u32::try_from(qty)
            .ok()
            .filter(|qty| *qty > 0)
            .ok_or(ValidationError::IntervalNotPositive { actual: qty })?;
        Ok(Self { qty, unit })
    }

    pub fn qty(self) -> u32 {
        self.qty
    }

    pub fn unit(self) -> IntervalUnit {
        self.unit
    }

    /// The instant one interval after `instant`, or `None` on overflow.
    ///
    /// Months are calendar months; the day is clamped to the end of shorter months.
    pub fn after(self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let qty = i64::from(self.qty);
        let delta = match self.unit {
            IntervalUnit::Minutes => TimeDelta::try_minutes(qty),
            IntervalUnit::Hours => TimeDelta::try_hours(qty),
            IntervalUnit::Days => TimeDelta::try_days(qty),
            IntervalUnit::Weeks => TimeDelta::try_weeks(qty),
            IntervalUnit::Months => return instant.checked_add_months(Months::new(self.qty)),
        };
        delta.and_then(|delta| instant.checked_add_signed(delta))
    }
}
