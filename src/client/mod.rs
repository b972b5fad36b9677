//! Client layer: authenticated calls to the two GatewayAPI endpoints.

#[cfg(test)]
pub(crate) mod fake;

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tracing::{Instrument, Span};

use crate::BoxFuture;
use crate::domain::{
    AccountResponse, ApiToken, BaseUrl, ProviderConfig, SendSms, SendSmsResponse,
    TranslatedError, ValidationError, translate,
};
use crate::transport::{
    ME_PATH, MTSMS_PATH, decode_me_json_response, decode_send_sms_json_response,
    encode_send_sms_json, extract_error_detail,
};

/// Timeout applied to every GatewayAPI call unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub(crate) struct HttpRequest {
    pub(crate) method: HttpMethod,
    pub(crate) url: String,
    /// HTTP Basic username; the password is always empty.
    pub(crate) username: String,
    pub(crate) json: Option<Value>,
}

#[derive(Debug, Clone)]
pub(crate) struct HttpResponse {
    pub(crate) status: u16,
    pub(crate) body: String,
}

pub(crate) trait HttpTransport: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, GatewayError>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, GatewayError>> {
        Box::pin(async move {
            let builder = match request.method {
                HttpMethod::Get => self.client.get(&request.url),
                HttpMethod::Post => self.client.post(&request.url),
            };
            let mut builder = builder
                .basic_auth(&request.username, Some(""))
                .header(ACCEPT, "application/json")
                .header(CONTENT_TYPE, "application/json");
            if let Some(json) = &request.json {
                builder = builder.json(json);
            }

            let response = builder.send().await.map_err(map_reqwest_error)?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(map_reqwest_error)?;
            Ok(HttpResponse { status, body })
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Connection(Box::new(err))
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`GatewayClient`].
///
/// Transport and provider failures ([`GatewayError::Timeout`],
/// [`GatewayError::Connection`], [`GatewayError::Http`]) can be classified with
/// [`GatewayError::translate`]; the remaining variants are local failures.
pub enum GatewayError {
    /// The request did not complete within the configured timeout.
    #[error("GatewayAPI connection timeout")]
    Timeout,

    /// DNS, connection, or TLS failure.
    #[error("GatewayAPI connection error: {0}")]
    Connection(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-2xx response; `detail` is the most specific message found in the body.
    #[error("GatewayAPI HTTP error: {status} - {detail}")]
    Http { status: u16, detail: String },

    /// A 2xx response body could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[source] Box<dyn StdError + Send + Sync>),

    /// A 2xx response parsed but lacked required fields.
    #[error("unexpected response from GatewayAPI: {body}")]
    MalformedResponse { body: String },

    /// Local configuration was rejected before any network call.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl GatewayError {
    /// HTTP status code for [`GatewayError::Http`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classify a transport or provider failure; `None` for local failures.
    pub fn translate(&self) -> Option<TranslatedError> {
        match self {
            Self::Timeout | Self::Connection(_) | Self::Http { .. } => {
                Some(translate(self.status(), &self.to_string()))
            }
            Self::Parse(_) | Self::MalformedResponse { .. } | Self::Validation(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
/// Builder for [`Transport`].
pub struct TransportBuilder {
    timeout: Duration,
    user_agent: Option<String>,
}

impl TransportBuilder {
    /// Override the per-request timeout (default [`DEFAULT_TIMEOUT`]).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn build(self) -> Result<Transport, GatewayError> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| GatewayError::Connection(Box::new(err)))?;

        Ok(Transport::from_http(Arc::new(ReqwestTransport { client })))
    }
}

#[derive(Clone)]
/// Shared HTTP transport.
///
/// Cheap to clone; one instance can serve clients for any number of
/// configurations.
pub struct Transport {
    http: Arc<dyn HttpTransport>,
}

impl Transport {
    /// Transport with [`DEFAULT_TIMEOUT`].
    pub fn new() -> Result<Self, GatewayError> {
        Self::builder().build()
    }

    pub fn builder() -> TransportBuilder {
        TransportBuilder {
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    pub(crate) fn from_http(http: Arc<dyn HttpTransport>) -> Self {
        Self { http }
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
/// Builder for [`GatewayClient`].
///
/// Use this when you need to customize the base URL, transport, or logging span.
pub struct GatewayClientBuilder {
    token: ApiToken,
    base_url: BaseUrl,
    transport: Option<Transport>,
    span: Span,
}

impl GatewayClientBuilder {
    pub fn new(token: ApiToken) -> Self {
        Self {
            token,
            base_url: BaseUrl::default(),
            transport: None,
            span: Span::none(),
        }
    }

    /// Override the GatewayAPI root URL (default `https://gatewayapi.eu`).
    pub fn base_url(mut self, base_url: BaseUrl) -> Self {
        self.base_url = base_url;
        self
    }

    /// Reuse an existing transport instead of creating one.
    pub fn transport(mut self, transport: Transport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Span that request logs are recorded under.
    pub fn span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn build(self) -> Result<GatewayClient, GatewayError> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Transport::new()?,
        };
        Ok(GatewayClient {
            token: self.token,
            base_url: self.base_url,
            http: transport.http,
            span: self.span,
        })
    }
}

#[derive(Clone)]
/// Authenticated GatewayAPI client.
///
/// Every call uses HTTP Basic auth with the API token as username and an empty
/// password, JSON request/response headers, and the transport timeout.
/// Calls are never retried.
pub struct GatewayClient {
    token: ApiToken,
    base_url: BaseUrl,
    http: Arc<dyn HttpTransport>,
    span: Span,
}

impl GatewayClient {
    /// Client for the default base URL with a fresh transport.
    pub fn new(token: ApiToken) -> Result<Self, GatewayError> {
        Self::builder(token).build()
    }

    pub fn builder(token: ApiToken) -> GatewayClientBuilder {
        GatewayClientBuilder::new(token)
    }

    /// Client for a host configuration.
    ///
    /// Fails with [`GatewayError::Validation`] if the token is blank or the base
    /// URL is invalid.
    pub fn from_config(
        config: &ProviderConfig,
        transport: &Transport,
    ) -> Result<Self, GatewayError> {
        let token = ApiToken::new(config.api_token.as_str())?;
        let base_url = BaseUrl::new(config.base_url.as_str())?;
        Self::builder(token)
            .base_url(base_url)
            .transport(transport.clone())
            .build()
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Query the account balance (`GET rest/me`).
    ///
    /// The decoded body is returned without validation; see
    /// [`AccountResponse::snapshot`].
    pub async fn get_balance(&self) -> Result<AccountResponse, GatewayError> {
        async {
            let body = self.execute(HttpMethod::Get, ME_PATH, None).await?;
            decode_me_json_response(&body).map_err(|err| GatewayError::Parse(Box::new(err)))
        }
        .instrument(self.span.clone())
        .await
    }

    /// Submit one message to one recipient (`POST rest/mtsms`).
    ///
    /// The caller must check that [`SendSmsResponse::ids`] is non-empty.
    pub async fn send_sms(&self, request: &SendSms) -> Result<SendSmsResponse, GatewayError> {
        async {
            let payload = encode_send_sms_json(request);
            tracing::info!(
                recipient = %request.recipient(),
                encoding = request.encoding().as_wire(),
                "submitting sms"
            );
            let body = self
                .execute(HttpMethod::Post, MTSMS_PATH, Some(payload))
                .await?;
            decode_send_sms_json_response(&body)
                .map_err(|err| GatewayError::Parse(Box::new(err)))
        }
        .instrument(self.span.clone())
        .await
    }

    async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        json: Option<Value>,
    ) -> Result<String, GatewayError> {
        let url = self.base_url.join(path);
        tracing::debug!(?method, %url, payload = ?json, "GatewayAPI request");

        let request = HttpRequest {
            method,
            url: url.clone(),
            username: self.token.as_str().to_owned(),
            json,
        };
        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(?method, %url, error = %err, "GatewayAPI request failed");
                return Err(err);
            }
        };
        tracing::debug!(status = response.status, %url, body = %response.body, "GatewayAPI response");

        if !(200..=299).contains(&response.status) {
            let err = GatewayError::Http {
                status: response.status,
                detail: extract_error_detail(&response.body),
            };
            tracing::error!(%url, error = %err, "GatewayAPI rejected request");
            return Err(err);
        }

        Ok(response.body)
    }
}

impl fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
