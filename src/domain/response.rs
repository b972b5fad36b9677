use chrono::{DateTime, Utc};

/// Decoded `rest/me` response, as returned by the provider.
///
/// Fields are optional because the client does not validate them; use
/// [`AccountResponse::snapshot`] to obtain a trusted [`BalanceSnapshot`].
#[derive(Debug, Clone, PartialEq)]
pub struct AccountResponse {
    pub credits: Option<f64>,
    pub currency: Option<String>,
    /// Raw response body, kept for diagnostics.
    pub body: String,
}

impl AccountResponse {
    /// Validate the payload: credits must be present and finite, and the currency non-empty.
    pub fn snapshot(&self, observed_at: DateTime<Utc>) -> Option<BalanceSnapshot> {
        let credits = self.credits.filter(|credits| credits.is_finite())?;
        let currency = self.currency.as_deref().filter(|it| !it.trim().is_empty())?;
        Some(BalanceSnapshot {
            credits,
            currency: currency.to_owned(),
            observed_at,
        })
    }
}

/// Account credit observed at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceSnapshot {
    pub credits: f64,
    pub currency: String,
    pub observed_at: DateTime<Utc>,
}

/// Decoded `rest/mtsms` response.
///
/// `ids` may be empty on a malformed success body; callers must check before
/// trusting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendSmsResponse {
    pub ids: Vec<String>,
    /// Raw response body, kept for diagnostics.
    pub body: String,
}

impl SendSmsResponse {
    /// First provider message id, if any.
    pub fn first_id(&self) -> Option<&str> {
        self.ids.first().map(String::as_str)
    }
}
