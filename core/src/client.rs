//! The request client.
//!
//! # Design
//! `Client` holds the immutable defaults, the transport, an optional custom
//! classifier and three pipelines (request, response, transport error). Every
//! call runs the same sequence on its own `EffectiveConfig`:
//!
//! merge → resolve URL → request transforms → content-type cleanup →
//! encode → send → decode → response transforms → classify.
//!
//! Registration methods take `&mut self` while calls borrow `&self`, so the
//! pipelines cannot change while a call is in flight.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::body;
use crate::config::{self, CallConfig, ClientDefaults, EffectiveConfig, RequestOptions};
use crate::error::{Error, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::outcome::{classify_status, ClassifierFn, PendingRequest, Response};
use crate::transform::{ErrorPipeline, TransformContext, TransformPipeline};
use crate::transport::Transport;
use crate::url;

/// Configurable request client wrapping a `Transport`.
#[derive(Clone)]
pub struct Client {
    defaults: ClientDefaults,
    transport: Arc<dyn Transport>,
    callback: Option<Arc<ClassifierFn>>,
    transform_req: TransformPipeline,
    transform_res: TransformPipeline,
    transform_err: ErrorPipeline,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("defaults", &self.defaults)
            .field("custom_callback", &self.callback.is_some())
            .field("transform_req", &self.transform_req)
            .field("transform_res", &self.transform_res)
            .field("transform_err", &self.transform_err)
            .finish()
    }
}

impl Client {
    /// Create a client backed by `UreqTransport`.
    #[cfg(feature = "ureq")]
    pub fn new(options: RequestOptions) -> Self {
        Self::with_transport(options, crate::transport::UreqTransport::new())
    }

    pub fn with_transport<T>(options: RequestOptions, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        Self {
            defaults: ClientDefaults::new(options),
            transport: Arc::new(transport),
            callback: None,
            transform_req: TransformPipeline::new(),
            transform_res: TransformPipeline::new(),
            transform_err: ErrorPipeline::new(),
        }
    }

    pub fn defaults(&self) -> &ClientDefaults {
        &self.defaults
    }

    /// Replace the default status classifier. The callback alone decides
    /// whether every later call resolves or rejects.
    pub fn set_callback<F>(&mut self, callback: F)
    where
        F: Fn(&EffectiveConfig, Response) -> Result<Response, Error> + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
    }

    /// Request-side transforms; they see `status == None`.
    pub fn transform_req_mut(&mut self) -> &mut TransformPipeline {
        &mut self.transform_req
    }

    pub fn transform_res_mut(&mut self) -> &mut TransformPipeline {
        &mut self.transform_res
    }

    /// Handlers run on transport errors before the call rejects.
    pub fn transform_err_mut(&mut self) -> &mut ErrorPipeline {
        &mut self.transform_err
    }

    pub fn set_transform_req(&mut self, pipeline: TransformPipeline) {
        self.transform_req = pipeline;
    }

    pub fn set_transform_res(&mut self, pipeline: TransformPipeline) {
        self.transform_res = pipeline;
    }

    pub fn set_transform_err(&mut self, pipeline: ErrorPipeline) {
        self.transform_err = pipeline;
    }

    /// Issue one call.
    pub fn request(&self, call: CallConfig) -> PendingRequest<'_> {
        PendingRequest::new(self.execute(call))
    }

    pub fn get(&self, url: impl Into<String>) -> PendingRequest<'_> {
        self.request(CallConfig::new(url).method(HttpMethod::Get))
    }

    pub fn post(&self, url: impl Into<String>, body: impl Into<Value>) -> PendingRequest<'_> {
        self.request(CallConfig::new(url).method(HttpMethod::Post).body(body))
    }

    #[instrument(
        name = "request",
        skip_all,
        fields(request_id = %Uuid::new_v4(), method = tracing::field::Empty, url = tracing::field::Empty)
    )]
    async fn execute(&self, call: CallConfig) -> Result<Response, Error> {
        let mut config = config::merge(&self.defaults, call);
        config.url = url::resolve(&config.url, config.params.as_ref());
        if config.url.is_empty() {
            return Err(Error::InvalidArgument("request url is empty".to_string()));
        }

        let span = tracing::Span::current();
        span.record("method", tracing::field::display(config.method));
        span.record("url", config.url.as_str());

        self.apply_request_transforms(&mut config)?;
        config::strip_blank_content_type(&mut config.headers);

        let request = HttpRequest {
            method: config.method,
            url: config.url.clone(),
            headers: config.headers.clone(),
            body: body::encode(&config.body, config.json)?,
            timeout: config.timeout,
            extensions: config.extensions.clone(),
        };

        debug!(headers = request.headers.len(), has_body = request.body.is_some(), "sending request");
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(error) => return Err(self.reject_transport(&config, error)),
        };

        let response = self.apply_response_transforms(&config, response)?;
        let outcome = match &self.callback {
            Some(callback) => callback(&config, response),
            None => classify_status(&config, response),
        };

        match &outcome {
            Ok(response) => debug!(status = ?response.status, "request resolved"),
            Err(err) => debug!(error = %err, "request rejected"),
        }
        outcome
    }

    fn apply_request_transforms(&self, config: &mut EffectiveConfig) -> Result<(), Error> {
        if self.transform_req.is_empty() {
            return Ok(());
        }
        let snapshot = config.clone();
        let mut ctx = TransformContext {
            config: &snapshot,
            data: &mut config.body,
            headers: &mut config.headers,
            status: None,
        };
        self.transform_req.apply(&mut ctx).inspect_err(|err| {
            warn!(error = %err, "request transform failed");
        })
    }

    fn apply_response_transforms(
        &self,
        config: &EffectiveConfig,
        response: HttpResponse,
    ) -> Result<Response, Error> {
        let HttpResponse {
            status,
            mut headers,
            body,
        } = response;
        let mut data = body::decode(&body, config.json);

        let mut ctx = TransformContext {
            config,
            data: &mut data,
            headers: &mut headers,
            status,
        };
        self.transform_res.apply(&mut ctx).inspect_err(|err| {
            warn!(error = %err, "response transform failed");
        })?;

        Ok(Response {
            status,
            headers,
            body: data,
        })
    }

    fn reject_transport(&self, config: &EffectiveConfig, mut error: TransportError) -> Error {
        warn!(error = %error, "transport failure");
        match self.transform_err.apply(config, &mut error) {
            Ok(()) => Error::Transport(error),
            Err(handler_err) => handler_err,
        }
    }
}
