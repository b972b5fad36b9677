//! Scriptable in-memory transport for unit tests.

use std::sync::{Arc, Mutex};

use super::{GatewayError, HttpRequest, HttpResponse, HttpTransport, Transport};
use crate::BoxFuture;

type Handler = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, GatewayError> + Send + Sync>;

pub(crate) struct FakeTransport {
    handler: Handler,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub(crate) fn new(
        handler: impl Fn(&HttpRequest) -> Result<HttpResponse, GatewayError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Answer every request with the same status and body.
    pub(crate) fn respond(status: u16, body: impl Into<String>) -> Arc<Self> {
        let body = body.into();
        Self::new(move |_| Ok(reply(status, body.as_str())))
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn transport(self: &Arc<Self>) -> Transport {
        Transport::from_http(self.clone())
    }
}

pub(crate) fn reply(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        body: body.to_owned(),
    }
}

/// Recipient of a recorded `rest/mtsms` request.
pub(crate) fn msisdn_of(request: &HttpRequest) -> Option<&str> {
    request.json.as_ref()?["recipients"][0]["msisdn"].as_str()
}

impl HttpTransport for FakeTransport {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, GatewayError>> {
        let result = (self.handler)(&request);
        self.requests.lock().unwrap().push(request);
        Box::pin(async move { result })
    }
}
