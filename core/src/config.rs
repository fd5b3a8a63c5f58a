//! Layered request configuration.
//!
//! # Design
//! Three layers feed every call: the built-in baseline, the client defaults
//! given at construction, and the per-call `CallConfig`. The baseline and the
//! client options are folded together once, in `ClientDefaults::new`; each
//! call is then merged over the defaults by `merge`, producing a fresh
//! `EffectiveConfig` that lives only as long as the call.
//!
//! Merging is shallow: a top-level value supplied by the later layer replaces
//! the earlier one wholesale. Headers are the exception on the per-call step
//! and are merged key by key through `merge_headers`.
//!
//! The option set is open. Keys the client does not recognize are captured in
//! `extensions` and handed to the transport untouched.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::http::{Headers, HttpMethod};

/// Placeholder name to substitution value.
pub type Params = Map<String, Value>;

pub const DEFAULT_CONTENT_TYPE: &str = "application/json;charset=utf-8";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Options shared by the client defaults and every call. All optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,

    /// Encode the request body as JSON and parse the response body as JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,

    /// Milliseconds on the wire.
    #[serde(default, with = "duration_ms", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve_with_full_response: Option<bool>,

    /// When `false`, any response with a status resolves successfully.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple: Option<bool>,

    /// Transport-specific options, passed through as-is.
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = Some(json);
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_simple(mut self, simple: bool) -> Self {
        self.simple = Some(simple);
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }
}

/// Client-level configuration: the baseline with the construction options
/// applied on top. Read on every call, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientDefaults {
    pub method: HttpMethod,
    pub json: bool,
    pub headers: Headers,
    pub timeout: Duration,
    pub resolve_with_full_response: bool,
    pub simple: bool,
    pub extensions: Map<String, Value>,
}

impl Default for ClientDefaults {
    fn default() -> Self {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), DEFAULT_CONTENT_TYPE.to_string());
        Self {
            method: HttpMethod::Get,
            json: true,
            headers,
            timeout: DEFAULT_TIMEOUT,
            resolve_with_full_response: true,
            simple: true,
            extensions: Map::new(),
        }
    }
}

impl ClientDefaults {
    /// Shallow-merge `options` over the baseline. Supplying `headers` replaces
    /// the baseline headers, `Content-Type` included.
    pub fn new(options: RequestOptions) -> Self {
        let baseline = Self::default();
        Self {
            method: options.method.unwrap_or(baseline.method),
            json: options.json.unwrap_or(baseline.json),
            headers: options.headers.unwrap_or(baseline.headers),
            timeout: options.timeout.unwrap_or(baseline.timeout),
            resolve_with_full_response: options
                .resolve_with_full_response
                .unwrap_or(baseline.resolve_with_full_response),
            simple: options.simple.unwrap_or(baseline.simple),
            extensions: options.extensions,
        }
    }
}

impl From<RequestOptions> for ClientDefaults {
    fn from(options: RequestOptions) -> Self {
        Self::new(options)
    }
}

/// Per-call configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,

    #[serde(flatten)]
    pub options: RequestOptions,
}

impl CallConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.options.method = Some(method);
        self
    }

    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params
            .get_or_insert_with(Params::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options = self.options.with_header(key, value);
        self
    }

    pub fn json(mut self, json: bool) -> Self {
        self.options.json = Some(json);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    pub fn simple(mut self, simple: bool) -> Self {
        self.options.simple = Some(simple);
        self
    }

    pub fn extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.extensions.insert(key.into(), value.into());
        self
    }
}

/// The merged configuration of one call.
///
/// `body` is `Value::Null` when the call sends no body.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    pub method: HttpMethod,
    pub url: String,
    pub json: bool,
    pub headers: Headers,
    pub timeout: Duration,
    pub resolve_with_full_response: bool,
    pub simple: bool,
    pub body: Value,
    pub params: Option<Params>,
    pub extensions: Map<String, Value>,
}

/// Merge a call over the client defaults. Call values win when present.
pub fn merge(defaults: &ClientDefaults, call: CallConfig) -> EffectiveConfig {
    let CallConfig {
        url,
        body,
        params,
        options,
    } = call;

    let headers = merge_headers([Some(&defaults.headers), options.headers.as_ref()]);

    let mut extensions = defaults.extensions.clone();
    extensions.extend(options.extensions);

    EffectiveConfig {
        method: options.method.unwrap_or(defaults.method),
        url: url.unwrap_or_default(),
        json: options.json.unwrap_or(defaults.json),
        headers,
        timeout: options.timeout.unwrap_or(defaults.timeout),
        resolve_with_full_response: options
            .resolve_with_full_response
            .unwrap_or(defaults.resolve_with_full_response),
        simple: options.simple.unwrap_or(defaults.simple),
        body: body.unwrap_or(Value::Null),
        params,
        extensions,
    }
}

/// Fold header maps left to right into a new map. Later sources overwrite
/// earlier ones key by key; absent sources are skipped.
pub fn merge_headers<'a, I>(sources: I) -> Headers
where
    I: IntoIterator<Item = Option<&'a Headers>>,
{
    let mut merged = Headers::new();
    for headers in sources.into_iter().flatten() {
        for (key, value) in headers {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Drop `Content-Type` entries (any case) that carry a blank value. A missing
/// or empty header map is left alone.
pub fn strip_blank_content_type(headers: &mut Headers) {
    if headers.is_empty() {
        return;
    }
    headers.retain(|key, value| {
        !(key.eq_ignore_ascii_case("content-type") && value.trim().is_empty())
    });
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => {
                serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
