use std::io;
use std::sync::Arc;

use chrono::Utc;
use gatewayapi::{
    BalanceMonitor, BoxFuture, IntervalUnit, Notification, NotificationTarget, Notifier,
    ProviderConfig, Transport,
};
use tracing_subscriber::EnvFilter;

/// Prints notifications instead of posting them anywhere.
struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn deliver<'a>(
        &'a self,
        target: &'a NotificationTarget,
        notification: &'a Notification,
    ) -> BoxFuture<'a, Result<(), Box<dyn std::error::Error + Send + Sync>>> {
        Box::pin(async move {
            println!("--- {target}: {}\n{}", notification.subject, notification.body);
            Ok(())
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let api_token = std::env::var("GATEWAYAPI_TOKEN").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "GATEWAYAPI_TOKEN environment variable is required",
        )
    })?;
    let min_credit_limit = match std::env::var("GATEWAYAPI_MIN_CREDIT") {
        Ok(raw) => raw.parse()?,
        Err(_) => 10.0,
    };

    let mut config = ProviderConfig {
        name: "demo".to_owned(),
        api_token,
        balance_check_enabled: true,
        min_credit_limit,
        check_interval_qty: 1,
        check_interval_unit: Some(IntervalUnit::Hours),
        notify_user_ids: vec!["demo-user".to_owned()],
        ..Default::default()
    };
    if let Ok(base_url) = std::env::var("GATEWAYAPI_BASE_URL") {
        config.base_url = base_url;
    }
    config.validate()?;

    let monitor = BalanceMonitor::new(Transport::new()?, Arc::new(StdoutNotifier))
        .span(tracing::info_span!("check_balance_demo"));

    let snapshot = monitor.test_connection(&mut config, Utc::now()).await?;
    println!(
        "credits: {}, currency: {}, last_check_result: {:?}",
        snapshot.credits, snapshot.currency, config.last_check_result
    );

    let report = monitor.check(&mut config, Utc::now()).await;
    println!(
        "outcome: {:?}, state: {:?}, last_check_result: {:?}",
        report.outcome, report.state, config.last_check_result
    );

    Ok(())
}
