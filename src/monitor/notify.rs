//! Low-credit notifications: content and per-sink fan-out.
//!
//! Posting to a channel or inbox is the host's job; this module only decides
//! who gets notified and with what.

use std::error::Error as StdError;
use std::fmt;

use crate::BoxFuture;
use crate::domain::{BalanceSnapshot, ProviderConfig};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Where a notification should be posted.
pub enum NotificationTarget {
    /// A group channel, by host id.
    Channel(String),
    /// An individual user inbox, by host id.
    User(String),
}

impl fmt::Display for NotificationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel(id) => write!(f, "channel:{id}"),
            Self::User(id) => write!(f, "user:{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

/// Host-side delivery of notifications.
pub trait Notifier: Send + Sync {
    fn deliver<'a>(
        &'a self,
        target: &'a NotificationTarget,
        notification: &'a Notification,
    ) -> BoxFuture<'a, Result<(), Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanOutReport {
    pub delivered: Vec<NotificationTarget>,
    pub failed: Vec<NotificationTarget>,
}

/// Configured sinks: channels first, then users.
pub fn targets(config: &ProviderConfig) -> Vec<NotificationTarget> {
    config
        .notify_channel_ids
        .iter()
        .cloned()
        .map(NotificationTarget::Channel)
        .chain(
            config
                .notify_user_ids
                .iter()
                .cloned()
                .map(NotificationTarget::User),
        )
        .collect()
}

pub fn low_credit_notification(
    config: &ProviderConfig,
    snapshot: &BalanceSnapshot,
) -> Notification {
    let label = config.display_label();
    let currency = snapshot.currency.as_str();
    Notification {
        subject: format!("Low GatewayAPI credit alert for {label}"),
        body: format!(
            "The GatewayAPI account '{label}' used for SMS has a low credit balance.\n\
             Current balance: {credits} {currency}\n\
             Configured limit: {limit} {currency}\n\
             Please top up the GatewayAPI account to keep SMS delivery running.\n\
             Configuration: {name}",
            credits = snapshot.credits,
            limit = config.min_credit_limit,
            name = config.name,
        ),
    }
}

/// Deliver `notification` to every target.
///
/// Each delivery is attempted on its own; a failing sink is logged and does
/// not stop delivery to the rest.
pub async fn fan_out(
    notifier: &dyn Notifier,
    targets: &[NotificationTarget],
    notification: &Notification,
) -> FanOutReport {
    let mut report = FanOutReport::default();
    for target in targets {
        match notifier.deliver(target, notification).await {
            Ok(()) => {
                tracing::info!(%target, "low credit notification sent");
                report.delivered.push(target.clone());
            }
            Err(err) => {
                tracing::error!(%target, error = %err, "low credit notification failed");
                report.failed.push(target.clone());
            }
        }
    }
    report
}
