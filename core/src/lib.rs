//! Configurable HTTP request client.
//!
//! # Overview
//! Wraps a pluggable `Transport` with layered configuration, `:name` URL
//! parameters, ordered transform pipelines and a normalized outcome: every
//! call settles into `Ok(Response)` or `Err(Error)`.
//!
//! # Design
//! - `config` folds the baseline, client defaults and call options into one
//!   `EffectiveConfig` per call.
//! - `transform` pipelines mutate request and response data in place.
//! - `outcome` classifies responses by status; a custom classifier can take
//!   over through `Client::set_callback`.
//! - The transport only sees plain `HttpRequest` / `HttpResponse` data, so
//!   tests can swap it for a stub.
//!
//! ```no_run
//! use reqhttp_core::{CallConfig, Client, RequestOptions};
//!
//! async fn fetch_item() -> Result<(), reqhttp_core::Error> {
//!     let client = Client::new(RequestOptions::new().with_header("A", "1"));
//!     let response = client
//!         .request(CallConfig::new("http://localhost:3000/x/:id").param("id", 42))
//!         .on_success(|response| println!("got {}", response.body))
//!         .await?;
//!     assert!(response.is_success());
//!     Ok(())
//! }
//! ```

pub mod body;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod outcome;
pub mod transform;
pub mod transport;
pub mod url;

pub use client::Client;
pub use config::{merge, merge_headers, CallConfig, ClientDefaults, EffectiveConfig, Params, RequestOptions};
pub use error::{BoxError, Error, TransportError};
pub use http::{Headers, HttpMethod, HttpRequest, HttpResponse};
pub use outcome::{classify_status, PendingRequest, Response};
pub use transform::{ErrorPipeline, Pipeline, TransformContext, TransformPipeline};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use transport::Transport;
