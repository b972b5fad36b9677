use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::validation::ValidationError;
use crate::domain::value::{BaseUrl, CheckInterval, IntervalUnit, Region, SenderName};

/// Host-owned configuration of one GatewayAPI account.
///
/// The connector only reads this structure, except for `next_check_at` and
/// `last_check_result`, which the balance monitor writes back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Host label of this configuration, used in logs and alerts.
    pub name: String,
    /// Human account label shown in low-credit alerts.
    pub account_label: Option<String>,
    pub api_token: String,
    pub base_url: String,
    pub sender_name: String,
    /// ISO country code used to normalize recipients; unset sends them as given.
    pub default_region: Option<String>,
    pub balance_check_enabled: bool,
    pub min_credit_limit: f64,
    pub check_interval_qty: i32,
    pub check_interval_unit: Option<IntervalUnit>,
    pub next_check_at: Option<DateTime<Utc>>,
    pub last_check_result: Option<String>,
    pub notify_channel_ids: Vec<String>,
    pub notify_user_ids: Vec<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            account_label: None,
            api_token: String::new(),
            base_url: BaseUrl::DEFAULT.to_owned(),
            sender_name: String::new(),
            default_region: None,
            balance_check_enabled: false,
            min_credit_limit: 10.0,
            check_interval_qty: 1,
            check_interval_unit: Some(IntervalUnit::Days),
            next_check_at: None,
            last_check_result: None,
            notify_channel_ids: Vec::new(),
            notify_user_ids: Vec::new(),
        }
    }
}

impl ProviderConfig {
    /// Label used in alerts: the account label when set, otherwise the config name.
    pub fn display_label(&self) -> &str {
        self.account_label
            .as_deref()
            .filter(|it| !it.trim().is_empty())
            .unwrap_or(self.name.as_str())
    }

    /// Interval of periodic balance checks, or `None` when checks are disabled or
    /// the interval settings are invalid.
    pub fn check_interval(&self) -> Option<CheckInterval> {
        if !self.balance_check_enabled {
            return None;
        }
        CheckInterval::new(self.check_interval_qty, self.check_interval_unit).ok()
    }

    /// Region for recipient normalization; `None` when unset or blank.
    pub fn region(&self) -> Result<Option<Region>, ValidationError> {
        match self.default_region.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(code) => Region::new(code).map(Some),
        }
    }

    /// Check the constraints an operator must satisfy when saving the configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.sender_name.is_empty() {
            SenderName::new(self.sender_name.as_str())?;
        }
        BaseUrl::new(self.base_url.as_str())?;
        self.region()?;
        if self.balance_check_enabled {
            CheckInterval::new(self.check_interval_qty, self.check_interval_unit)?;
        }
        Ok(())
    }
}
