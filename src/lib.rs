//! GatewayAPI SMS connector.
//!
//! The crate bridges a host's "send these messages, tell me what happened"
//! abstraction to the GatewayAPI REST API, and watches the account balance so
//! the host can be alerted before credit runs out. It is built in layers: a
//! domain layer of strong types, a transport layer for wire-format quirks, a
//! client layer orchestrating requests, and the dispatch and monitor services
//! on top.
//!
//! ```rust,no_run
//! use gatewayapi::{Message, ProviderConfig, SmsDispatcher, Transport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gatewayapi::GatewayError> {
//!     let config = ProviderConfig {
//!         name: "main".to_owned(),
//!         api_token: "...".to_owned(),
//!         sender_name: "Shop".to_owned(),
//!         ..Default::default()
//!     };
//!     let dispatcher = SmsDispatcher::new(Transport::new()?);
//!     let outcomes = dispatcher
//!         .dispatch(&config, &[Message::new("4512345678", "hello", "msg-1")])
//!         .await;
//!     println!("{outcomes:?}");
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

use std::future::Future;
use std::pin::Pin;

pub mod client;
pub mod dispatch;
pub mod domain;
pub mod monitor;
pub mod provider;
mod transport;

/// Boxed future returned by the crate's object-safe async seams.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub use client::{
    DEFAULT_TIMEOUT, GatewayClient, GatewayClientBuilder, GatewayError, Transport,
    TransportBuilder,
};
pub use dispatch::{CorrelationId, Message, SendOutcome, SendStatus, SmsDispatcher};
pub use domain::{
    AccountResponse, ApiToken, BalanceSnapshot, BaseUrl, CheckInterval, Encoding, ErrorKind,
    IntervalUnit, Msisdn, ProviderConfig, Region, SendSms, SendSmsResponse, SenderName,
    TranslatedError, ValidationError,
};
pub use monitor::{
    BalanceMonitor, CheckOutcome, CheckReport, FanOutReport, MonitorState, Notification,
    NotificationTarget, Notifier, due_for_check,
};
pub use provider::{GatewayApiProvider, SmsProvider};
