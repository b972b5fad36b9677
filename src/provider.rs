//! Host-facing capability interface.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::Span;

use crate::BoxFuture;
use crate::client::{GatewayError, Transport};
use crate::dispatch::{Message, SendOutcome, SmsDispatcher};
use crate::domain::{BalanceSnapshot, ProviderConfig};
use crate::monitor::{BalanceMonitor, Notifier};

/// What a host needs from an SMS provider integration.
pub trait SmsProvider: Send + Sync {
    /// Stable provider identifier, e.g. for selecting an integration by name.
    fn name(&self) -> &'static str;

    /// Send `messages`, returning one outcome per message in input order.
    fn send_batch<'a>(
        &'a self,
        config: &'a ProviderConfig,
        messages: &'a [Message],
    ) -> BoxFuture<'a, Vec<SendOutcome>>;

    /// Check credentials by fetching the balance; records the result on `config`.
    fn test_connection<'a>(
        &'a self,
        config: &'a mut ProviderConfig,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<BalanceSnapshot, GatewayError>>;
}

/// [`SmsProvider`] backed by GatewayAPI.
#[derive(Clone)]
pub struct GatewayApiProvider {
    dispatcher: SmsDispatcher,
    monitor: BalanceMonitor,
}

impl GatewayApiProvider {
    pub const NAME: &'static str = "gatewayapi";

    pub fn new(transport: Transport, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            dispatcher: SmsDispatcher::new(transport.clone()),
            monitor: BalanceMonitor::new(transport, notifier),
        }
    }

    /// Span that dispatch and monitor logs are recorded under.
    pub fn span(self, span: Span) -> Self {
        Self {
            dispatcher: self.dispatcher.span(span.clone()),
            monitor: self.monitor.span(span),
        }
    }

    /// The monitor used for balance checks, for hosts driving periodic checks.
    pub fn monitor(&self) -> &BalanceMonitor {
        &self.monitor
    }
}

impl SmsProvider for GatewayApiProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn send_batch<'a>(
        &'a self,
        config: &'a ProviderConfig,
        messages: &'a [Message],
    ) -> BoxFuture<'a, Vec<SendOutcome>> {
        Box::pin(self.dispatcher.dispatch(config, messages))
    }

    fn test_connection<'a>(
        &'a self,
        config: &'a mut ProviderConfig,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<BalanceSnapshot, GatewayError>> {
        Box::pin(self.monitor.test_connection(config, now))
    }
}
