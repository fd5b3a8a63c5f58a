//! Response normalization.
//!
//! # Design
//! A call settles exactly once, into `Ok(Response)` or `Err(Error)`. The
//! default classifier decides from the status code alone:
//!
//! - status in `[200, 400)` resolves,
//! - a missing status or any other code rejects with `Error::HttpStatus`,
//!   which keeps the response (status, headers, transformed body).
//!
//! With `simple = false` every response that carries a status resolves.
//! Transport failures never reach a classifier; they are rejected before.
//!
//! A custom classifier installed through `Client::set_callback` replaces this
//! logic entirely. It returns a `Result`, so it settles the call exactly once.

use std::future::{Future, IntoFuture};

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::EffectiveConfig;
use crate::error::Error;
use crate::http::Headers;

/// The normalized response of a call. `body` has already passed through the
/// response transforms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub status: Option<u16>,
    pub headers: Headers,
    pub body: Value,
}

impl Response {
    /// Whether the status falls in `[200, 400)`.
    pub fn is_success(&self) -> bool {
        is_success_status(self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Deserialize the body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(T::deserialize(&self.body)?)
    }
}

pub type ClassifierFn = dyn Fn(&EffectiveConfig, Response) -> Result<Response, Error> + Send + Sync;

pub fn is_success_status(status: Option<u16>) -> bool {
    matches!(status, Some(200..=399))
}

/// The default status classifier.
pub fn classify_status(config: &EffectiveConfig, response: Response) -> Result<Response, Error> {
    if response.is_success() || (!config.simple && response.status.is_some()) {
        Ok(response)
    } else {
        Err(Error::status(response))
    }
}

type SuccessObserver<'a> = Box<dyn FnOnce(&Response) + Send + 'a>;
type ErrorObserver<'a> = Box<dyn FnOnce(&Error) + Send + 'a>;

/// An in-flight call.
///
/// Await it (it implements `IntoFuture`) to get the outcome. Observers
/// registered with `on_success` / `on_error` run, in registration order, right
/// after the call settles and before the outcome is returned. They only see
/// the outcome by reference and cannot change it.
#[must_use = "a request does nothing unless awaited"]
pub struct PendingRequest<'a> {
    future: BoxFuture<'a, Result<Response, Error>>,
    on_success: Vec<SuccessObserver<'a>>,
    on_error: Vec<ErrorObserver<'a>>,
}

impl<'a> PendingRequest<'a> {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<Response, Error>> + Send + 'a,
    {
        Self {
            future: Box::pin(future),
            on_success: Vec::new(),
            on_error: Vec::new(),
        }
    }

    /// Observe a successful outcome.
    pub fn on_success<F>(mut self, observer: F) -> Self
    where
        F: FnOnce(&Response) + Send + 'a,
    {
        self.on_success.push(Box::new(observer));
        self
    }

    /// Observe a failed outcome. `Error::response` gives access to the
    /// response when one was received.
    pub fn on_error<F>(mut self, observer: F) -> Self
    where
        F: FnOnce(&Error) + Send + 'a,
    {
        self.on_error.push(Box::new(observer));
        self
    }
}

impl<'a> IntoFuture for PendingRequest<'a> {
    type Output = Result<Response, Error>;
    type IntoFuture = BoxFuture<'a, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let PendingRequest {
            future,
            on_success,
            on_error,
        } = self;
        Box::pin(async move {
            let outcome = future.await;
            match &outcome {
                Ok(response) => on_success.into_iter().for_each(|observer| observer(response)),
                Err(error) => on_error.into_iter().for_each(|observer| observer(error)),
            }
            outcome
        })
    }
}
