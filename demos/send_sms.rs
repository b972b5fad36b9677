use std::io;

use gatewayapi::{Message, ProviderConfig, SmsDispatcher, Transport};
use tracing_subscriber::EnvFilter;

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
    let recipient = std::env::var("GATEWAYAPI_MSISDN").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "GATEWAYAPI_MSISDN environment variable is required",
        )
    })?;
    let sender_name =
        std::env::var("GATEWAYAPI_SENDER").unwrap_or_else(|_| "Demo".to_owned());
    let message = std::env::var("GATEWAYAPI_MESSAGE")
        .unwrap_or_else(|_| "Hello from the gatewayapi send_sms demo.".to_owned());

    let mut config = ProviderConfig {
        name: "demo".to_owned(),
        api_token,
        sender_name,
        default_region: std::env::var("GATEWAYAPI_REGION").ok(),
        ..Default::default()
    };
    if let Ok(base_url) = std::env::var("GATEWAYAPI_BASE_URL") {
        config.base_url = base_url;
    }
    config.validate()?;

    let dispatcher =
        SmsDispatcher::new(Transport::new()?).span(tracing::info_span!("send_sms_demo"));
    let outcomes = dispatcher
        .dispatch(&config, &[Message::new(recipient, message, "demo-1")])
        .await;

    for outcome in outcomes {
        println!(
            "correlation_id: {}, status: {}, provider_message_id: {:?}, error: {:?}",
            outcome.correlation_id,
            outcome.status.as_str(),
            outcome.provider_message_id,
            outcome.error_text
        );
    }

    Ok(())
}
