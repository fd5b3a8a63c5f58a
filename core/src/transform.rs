//! Ordered transform pipelines.
//!
//! # Design
//! A handler is a closure that mutates the data and headers it is lent
//! through a `TransformContext`; it returns nothing but a success flag.
//! Handlers run synchronously in registration order and each one sees the
//! mutations of the handlers before it. The first handler error aborts the
//! pipeline and the call.
//!
//! The same pipeline type serves the request side (status is `None`), the
//! response side, and transport errors (`ErrorPipeline`).

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::config::EffectiveConfig;
use crate::error::{BoxError, Error, TransportError};
use crate::http::Headers;

/// State lent to a data transform.
pub struct TransformContext<'a> {
    /// The effective configuration of the call. On the request side this is
    /// the configuration as merged, before any handler ran.
    pub config: &'a EffectiveConfig,
    /// The body being transformed. Read this rather than `config.body`,
    /// which does not reflect earlier handlers.
    pub data: &'a mut Value,
    pub headers: &'a mut Headers,
    /// `None` for request transforms.
    pub status: Option<u16>,
}

pub type TransformFn = dyn Fn(&mut TransformContext<'_>) -> Result<(), BoxError> + Send + Sync;

pub type ErrorTransformFn =
    dyn Fn(&EffectiveConfig, &mut TransportError) -> Result<(), BoxError> + Send + Sync;

/// An ordered list of handlers. Empty means no-op.
pub struct Pipeline<H: ?Sized> {
    handlers: Vec<Arc<H>>,
}

pub type TransformPipeline = Pipeline<TransformFn>;
pub type ErrorPipeline = Pipeline<ErrorTransformFn>;

impl<H: ?Sized> Pipeline<H> {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

impl<H: ?Sized> Default for Pipeline<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ?Sized> Clone for Pipeline<H> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<H: ?Sized> fmt::Debug for Pipeline<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl TransformPipeline {
    /// A pipeline holding exactly one handler.
    pub fn single<F>(handler: F) -> Self
    where
        F: Fn(&mut TransformContext<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let mut pipeline = Self::new();
        pipeline.push(handler);
        pipeline
    }

    pub fn push<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut TransformContext<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Run every handler in order. Returns the first handler error.
    pub fn apply(&self, ctx: &mut TransformContext<'_>) -> Result<(), Error> {
        for handler in &self.handlers {
            handler(ctx).map_err(Error::Handler)?;
        }
        Ok(())
    }
}

impl FromIterator<Arc<TransformFn>> for TransformPipeline {
    fn from_iter<I: IntoIterator<Item = Arc<TransformFn>>>(iter: I) -> Self {
        Self {
            handlers: iter.into_iter().collect(),
        }
    }
}

impl ErrorPipeline {
    pub fn single<F>(handler: F) -> Self
    where
        F: Fn(&EffectiveConfig, &mut TransportError) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let mut pipeline = Self::new();
        pipeline.push(handler);
        pipeline
    }

    pub fn push<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&EffectiveConfig, &mut TransportError) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.handlers.push(Arc::new(handler));
        self
    }

    pub fn apply(&self, config: &EffectiveConfig, error: &mut TransportError) -> Result<(), Error> {
        for handler in &self.handlers {
            handler(config, error).map_err(Error::Handler)?;
        }
        Ok(())
    }
}

impl FromIterator<Arc<ErrorTransformFn>> for ErrorPipeline {
    fn from_iter<I: IntoIterator<Item = Arc<ErrorTransformFn>>>(iter: I) -> Self {
        Self {
            handlers: iter.into_iter().collect(),
        }
    }
}
