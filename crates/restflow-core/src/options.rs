//! Per-call request options and the metadata passed to interceptors.

use crate::error::{ApiError, ApiResult};
use crate::method::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Request body, decided once at the encoder boundary and never re-inspected
/// downstream.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Structured JSON payload (the common case).
    Json(Value),
    /// Pre-built form parameters, sent url-encoded.
    Params(Vec<(String, String)>),
}

impl RequestBody {
    /// JSON view of the body for diagnostic envelopes.
    pub fn to_value(&self) -> Value {
        match self {
            RequestBody::Json(value) => value.clone(),
            RequestBody::Params(pairs) => Value::Object(
                pairs
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
        }
    }
}

/// One file descriptor for a multipart upload.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    /// Form field name the part is appended under.
    pub name: String,
    pub file_name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

/// Request authentication forwarded to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Basic { username: String, password: Option<String> },
    Bearer(String),
}

/// Synchronous per-call response transform.
pub type CallInterceptor = Arc<dyn Fn(Value) -> ApiResult<Value> + Send + Sync>;

/// Per-call overrides. Owned by the call that created it; only the request
/// interceptor may hand back a modified copy.
#[derive(Default)]
pub struct RequestOptions {
    pub query_params: Option<HashMap<String, String>>,
    pub body: Option<RequestBody>,
    pub files: Vec<FilePart>,
    pub headers: HashMap<String, String>,
    pub serialized_names: Option<HashMap<String, String>>,
    pub interceptor: Option<CallInterceptor>,
    pub mock: Option<Value>,
    pub mock_error: Option<ApiError>,
    pub enable_mock: bool,
    pub base_url: Option<String>,
    pub use_raw_url: bool,
    pub credentials: Option<Credentials>,
    pub meta: Option<Value>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query_params(mut self, query_params: HashMap<String, String>) -> Self {
        self.query_params = Some(query_params);
        self
    }

    pub fn with_json_body(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn with_params_body(mut self, pairs: Vec<(String, String)>) -> Self {
        self.body = Some(RequestBody::Params(pairs));
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_file(mut self, file: FilePart) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_interceptor(
        mut self,
        interceptor: impl Fn(Value) -> ApiResult<Value> + Send + Sync + 'static,
    ) -> Self {
        self.interceptor = Some(Arc::new(interceptor));
        self
    }

    pub fn with_serialized_names(mut self, names: HashMap<String, String>) -> Self {
        self.serialized_names = Some(names);
        self
    }

    pub fn with_mock(mut self, mock: Value) -> Self {
        self.enable_mock = true;
        self.mock = Some(mock);
        self
    }

    pub fn with_mock_error(mut self, error: ApiError) -> Self {
        self.enable_mock = true;
        self.mock_error = Some(error);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_raw_url(mut self) -> Self {
        self.use_raw_url = true;
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("query_params", &self.query_params)
            .field("body", &self.body)
            .field("files", &self.files.len())
            .field("headers", &self.headers)
            .field("serialized_names", &self.serialized_names)
            .field("interceptor", &self.interceptor.is_some())
            .field("mock", &self.mock)
            .field("mock_error", &self.mock_error)
            .field("enable_mock", &self.enable_mock)
            .field("base_url", &self.base_url)
            .field("use_raw_url", &self.use_raw_url)
            .field("credentials", &self.credentials.is_some())
            .field("meta", &self.meta)
            .finish()
    }
}

/// Context handed to the request interceptor alongside the options.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    /// Raw path as given to the call, before URL construction.
    pub url: String,
    pub method: Method,
    pub base_url: String,
    pub timeout_ms: u64,
}

/// Context handed to response interceptors and add-ons.
#[derive(Debug, Clone)]
pub struct ResponseContext {
    pub status_code: u16,
    /// Final constructed URL the request was sent to.
    pub url: String,
    pub method: Method,
    /// Caller-supplied opaque metadata, passed through untouched.
    pub meta: Option<Value>,
}
