//! Periodic balance checks with low-credit alerts.
//!
//! The host owns the timer: it calls [`due_for_check`] (or
//! [`BalanceMonitor::check_due`]) whenever it likes, and the monitor decides
//! which configurations are due and performs the state transitions.
//!
//! Per configuration the monitor moves between three states:
//!
//! ```text
//!   Idle --schedule (enabled, valid interval)--> Scheduled
//!   Scheduled --due or forced--> Checking --always--> Scheduled
//!   Scheduled/Checking --disabled or invalid interval--> Idle
//! ```
//!
//! A check always reschedules, whatever its result, so a transient outage
//! never stops monitoring. The host must not run two checks of the same
//! configuration concurrently.

mod notify;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{Instrument, Span};

use crate::client::{GatewayClient, GatewayError, Transport};
use crate::domain::{AccountResponse, BalanceSnapshot, ProviderConfig};

pub use notify::{
    FanOutReport, Notification, NotificationTarget, Notifier, fan_out, low_credit_notification,
    targets,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Scheduled { next_check_at: DateTime<Utc> },
    /// Only held while [`BalanceMonitor::check`] runs.
    Checking,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// Balance above the configured limit.
    Healthy(BalanceSnapshot),
    /// Balance at or below the limit; notifications were fanned out.
    LowCredit {
        snapshot: BalanceSnapshot,
        report: FanOutReport,
    },
    /// The provider answered without usable `credits`/`currency`.
    Malformed { body: String },
    /// The check failed; the error text is also in `last_check_result`.
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub provider: String,
    pub outcome: CheckOutcome,
    /// State after rescheduling.
    pub state: MonitorState,
}

/// The configurations whose periodic check is due at `now`.
pub fn due_for_check(
    configs: &mut [ProviderConfig],
    now: DateTime<Utc>,
) -> Vec<&mut ProviderConfig> {
    configs
        .iter_mut()
        .filter(|config| BalanceMonitor::is_due(config, now))
        .collect()
}

/// Balance polling and low-credit alerting for GatewayAPI configurations.
#[derive(Clone)]
pub struct BalanceMonitor {
    transport: Transport,
    notifier: Arc<dyn Notifier>,
    span: Span,
}

impl BalanceMonitor {
    pub fn new(transport: Transport, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            transport,
            notifier,
            span: Span::none(),
        }
    }

    /// Span that monitor logs are recorded under.
    pub fn span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Current state of `config`, derived from `next_check_at`.
    pub fn state(config: &ProviderConfig) -> MonitorState {
        match config.next_check_at {
            Some(next_check_at) => MonitorState::Scheduled { next_check_at },
            None => MonitorState::Idle,
        }
    }

    /// Whether a periodic check of `config` should run at `now`.
    pub fn is_due(config: &ProviderConfig, now: DateTime<Utc>) -> bool {
        config.check_interval().is_some() && config.next_check_at.is_some_and(|at| now >= at)
    }

    /// Apply the scheduling rule to `config`.
    ///
    /// Sets `next_check_at` one interval after `now` when checks are enabled
    /// with a valid interval; clears it otherwise. Call this after every
    /// configuration change.
    pub fn schedule(&self, config: &mut ProviderConfig, now: DateTime<Utc>) -> MonitorState {
        let _entered = self.span.enter();
        match config.check_interval().and_then(|interval| interval.after(now)) {
            Some(next_check_at) => {
                config.next_check_at = Some(next_check_at);
                tracing::info!(provider = %config.name, %next_check_at, "next balance check scheduled");
                MonitorState::Scheduled { next_check_at }
            }
            None => {
                if config.next_check_at.take().is_some() {
                    tracing::info!(provider = %config.name, "balance checks unscheduled");
                }
                MonitorState::Idle
            }
        }
    }

    /// Poll the balance of `config` now, record the result, alert on low
    /// credit, and reschedule.
    ///
    /// Never fails: every error ends up in `last_check_result` and the report.
    pub async fn check(&self, config: &mut ProviderConfig, now: DateTime<Utc>) -> CheckReport {
        let span = self.span.clone();
        async move {
            tracing::info!(provider = %config.name, state = ?MonitorState::Checking, "checking balance");
            let stamp = timestamp(now);

            let outcome = match self.poll(config).await {
                Ok(account) => match account.snapshot(now) {
                    Some(snapshot) => {
                        config.last_check_result = Some(format!(
                            "OK ({stamp}): {} {}",
                            snapshot.credits, snapshot.currency
                        ));
                        tracing::info!(
                            provider = %config.name,
                            credits = snapshot.credits,
                            currency = %snapshot.currency,
                            "balance checked"
                        );
                        self.evaluate(config, snapshot).await
                    }
                    None => {
                        let text = format!("Unexpected balance response: {}", account.body);
                        tracing::error!(provider = %config.name, error = %text, "balance check failed");
                        config.last_check_result = Some(format!("Error ({stamp}): {text}"));
                        CheckOutcome::Malformed { body: account.body }
                    }
                },
                Err(err) => {
                    let text = format!("Error during balance check: {err}");
                    tracing::error!(provider = %config.name, error = %text, "balance check failed");
                    config.last_check_result = Some(format!("Failed ({stamp}): {text}"));
                    CheckOutcome::Failed {
                        error: err.to_string(),
                    }
                }
            };

            let state = self.schedule(config, now);
            CheckReport {
                provider: config.name.clone(),
                outcome,
                state,
            }
        }
        .instrument(span)
        .await
    }

    /// Run [`BalanceMonitor::check`] on every configuration that is due.
    pub async fn check_due(
        &self,
        configs: &mut [ProviderConfig],
        now: DateTime<Utc>,
    ) -> Vec<CheckReport> {
        let due = due_for_check(configs, now);
        tracing::info!(parent: &self.span, count = due.len(), "running due balance checks");

        let mut reports = Vec::with_capacity(due.len());
        for config in due {
            reports.push(self.check(config, now).await);
        }
        reports
    }

    /// User-initiated credentials test.
    ///
    /// Records the result in `last_check_result` like a periodic check, but
    /// returns the error to the caller, sends no notifications, and leaves the
    /// schedule untouched.
    pub async fn test_connection(
        &self,
        config: &mut ProviderConfig,
        now: DateTime<Utc>,
    ) -> Result<BalanceSnapshot, GatewayError> {
        let span = self.span.clone();
        async move {
            tracing::info!(provider = %config.name, "testing GatewayAPI credentials");
            let stamp = timestamp(now);

            let result = self.poll(config).await.and_then(|account| {
                account
                    .snapshot(now)
                    .ok_or_else(|| GatewayError::MalformedResponse {
                        body: account.body.clone(),
                    })
            });

            match &result {
                Ok(snapshot) => {
                    config.last_check_result = Some(format!(
                        "OK ({stamp}): {} {}",
                        snapshot.credits, snapshot.currency
                    ));
                    tracing::info!(
                        provider = %config.name,
                        credits = snapshot.credits,
                        currency = %snapshot.currency,
                        "credential check succeeded"
                    );
                }
                Err(err) => {
                    config.last_check_result = Some(format!("Failed ({stamp}): {err}"));
                    tracing::error!(provider = %config.name, error = %err, "credential check failed");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn poll(&self, config: &ProviderConfig) -> Result<AccountResponse, GatewayError> {
        let client = GatewayClient::from_config(config, &self.transport)?;
        client.get_balance().await
    }

    async fn evaluate(&self, config: &ProviderConfig, snapshot: BalanceSnapshot) -> CheckOutcome {
        if snapshot.credits > config.min_credit_limit {
            return CheckOutcome::Healthy(snapshot);
        }

        tracing::warn!(
            provider = %config.name,
            credits = snapshot.credits,
            currency = %snapshot.currency,
            limit = config.min_credit_limit,
            "low balance detected"
        );
        let notification = low_credit_notification(config, &snapshot);
        let report = fan_out(self.notifier.as_ref(), &targets(config), &notification).await;
        CheckOutcome::LowCredit { snapshot, report }
    }
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}
