//! The transport seam.
//!
//! # Design
//! The client never touches the network itself. It hands a fully prepared
//! `HttpRequest` to a `Transport` and gets back either an `HttpResponse`
//! (whatever its status) or a `TransportError` when no response could be
//! obtained. Timeouts, TLS and redirects are the transport's business.
//!
//! `UreqTransport` (feature `ureq`) is the bundled implementation. ureq is a
//! blocking client, so each exchange runs on tokio's blocking pool and the
//! calling task only suspends on the join handle. Once a status line has been
//! received the exchange always yields an `HttpResponse`: body bytes are
//! decoded lossily and a body that cannot be read is reported as empty.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Sends one request and reports what came back.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[cfg(feature = "ureq")]
pub use self::ureq_transport::{UreqTransport, MAX_BODY_BYTES};

#[cfg(feature = "ureq")]
mod ureq_transport {
    use std::io;

    use async_trait::async_trait;
    use serde_json::Value;
    use tracing::warn;

    use super::Transport;
    use crate::error::TransportError;
    use crate::http::{Headers, HttpMethod, HttpRequest, HttpResponse};

    /// Transport backed by `ureq`.
    ///
    /// Status codes are returned as data. Recognized extensions:
    /// `followRedirect` (bool), `maxRedirects` (number) and `maxBodyBytes`
    /// (number, default [`MAX_BODY_BYTES`]).
    ///
    /// Must be driven from within a tokio runtime.
    #[derive(Debug, Clone, Default)]
    pub struct UreqTransport;

    /// Response bodies beyond this size are dropped.
    pub const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

    impl UreqTransport {
        pub fn new() -> Self {
            Self
        }

        fn agent(request: &HttpRequest) -> ureq::Agent {
            let mut config = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(Some(request.timeout));

            let follow = request
                .extensions
                .get("followRedirect")
                .and_then(Value::as_bool)
                .unwrap_or(true);
            if !follow {
                config = config.max_redirects(0);
            } else if let Some(max) = request.extensions.get("maxRedirects").and_then(Value::as_u64) {
                config = config.max_redirects(u32::try_from(max).unwrap_or(u32::MAX));
            }

            config.build().new_agent()
        }

        fn execute(request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let agent = Self::agent(&request);
            let url = request.url.as_str();
            let body = request.body.as_deref();

            let result = match request.method {
                HttpMethod::Get => with_headers(agent.get(url), &request.headers).call(),
                HttpMethod::Delete => with_headers(agent.delete(url), &request.headers).call(),
                HttpMethod::Head => with_headers(agent.head(url), &request.headers).call(),
                HttpMethod::Options => with_headers(agent.options(url), &request.headers).call(),
                HttpMethod::Post => send(with_headers(agent.post(url), &request.headers), body),
                HttpMethod::Put => send(with_headers(agent.put(url), &request.headers), body),
                HttpMethod::Patch => send(with_headers(agent.patch(url), &request.headers), body),
            };
            let mut response = result.map_err(TransportError::from)?;

            let status = response.status().as_u16();
            let mut headers = Headers::new();
            for (name, value) in response.headers() {
                let Ok(value) = value.to_str() else {
                    continue;
                };
                headers
                    .entry(name.as_str().to_string())
                    .and_modify(|existing| {
                        existing.push_str(", ");
                        existing.push_str(value);
                    })
                    .or_insert_with(|| value.to_string());
            }

            let body = if request.method == HttpMethod::Head {
                String::new()
            } else {
                let limit = request
                    .extensions
                    .get("maxBodyBytes")
                    .and_then(Value::as_u64)
                    .unwrap_or(MAX_BODY_BYTES);
                match response.body_mut().with_config().limit(limit).read_to_vec() {
                    Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                    Err(err) => {
                        warn!(status, error = %err, "response body could not be read");
                        String::new()
                    }
                }
            };

            Ok(HttpResponse {
                status: Some(status),
                headers,
                body,
            })
        }
    }

    fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &Headers) -> ureq::RequestBuilder<B> {
        for (key, value) in headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        builder
    }

    fn send(
        builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
        body: Option<&str>,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        match body {
            Some(body) => builder.send(body.as_bytes()),
            None => builder.send_empty(),
        }
    }

    #[async_trait]
    impl Transport for UreqTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            tokio::task::spawn_blocking(move || Self::execute(request))
                .await
                .map_err(|err| TransportError::Other(format!("transport task failed: {err}")))?
        }
    }

    impl From<ureq::Error> for TransportError {
        fn from(err: ureq::Error) -> Self {
            match err {
                ureq::Error::Timeout(_) => TransportError::Timeout,
                ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => {
                    TransportError::Connection(err.to_string())
                }
                ureq::Error::Io(io_err) => io_err.into(),
                other => TransportError::Other(other.to_string()),
            }
        }
    }

    impl From<io::Error> for TransportError {
        fn from(err: io::Error) -> Self {
            match err.kind() {
                io::ErrorKind::TimedOut => TransportError::Timeout,
                io::ErrorKind::ConnectionRefused
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::NotConnected => TransportError::Connection(err.to_string()),
                _ => TransportError::Other(err.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct Recording {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for Recording {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request.url);
            Ok(HttpResponse::new(200, "{}"))
        }
    }

    #[tokio::test]
    async fn transport_is_object_safe() {
        let recording = Recording {
            seen: Mutex::new(Vec::new()),
        };
        let transport: &dyn Transport = &recording;
        let request = HttpRequest {
            method: crate::http::HttpMethod::Get,
            url: "http://localhost/a".to_string(),
            headers: Default::default(),
            body: None,
            timeout: std::time::Duration::from_secs(1),
            extensions: Default::default(),
        };
        let response = transport.send(request).await.unwrap();
        assert_eq!(response.status, Some(200));
        assert_eq!(*recording.seen.lock().unwrap(), vec!["http://localhost/a"]);
    }

    #[cfg(feature = "ureq")]
    #[test]
    fn io_errors_map_to_transport_errors() {
        let timeout = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow");
        assert_eq!(TransportError::from(timeout), TransportError::Timeout);

        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(TransportError::from(refused), TransportError::Connection(_)));
    }
}
