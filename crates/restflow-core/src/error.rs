use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("{message}")]
    StatusPolicy { status_code: u16, message: String },

    #[error("response content-type is not application/json, value: {0}")]
    ContentType(String),

    #[error("JSON parse error: {0}")]
    Parse(String),

    #[error("Timeout Error")]
    Timeout { timeout_ms: u64 },

    #[error("Request cancelled")]
    Cancelled,

    #[error("{message}")]
    Application { status_code: Option<u16>, message: String, details: Option<Value> },
}

impl ApiError {
    /// Status code carried by the error itself, if it has one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::StatusPolicy { status_code, .. } => Some(*status_code),
            ApiError::Application { status_code, .. } => *status_code,
            _ => None,
        }
    }

    pub fn application(message: impl Into<String>) -> Self {
        ApiError::Application { status_code: None, message: message.into(), details: None }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Uniform failure context handed to the error interceptor. Fields not known
/// at the failure site keep their placeholder defaults.
#[derive(Debug)]
pub struct ErrorEnvelope {
    pub error: ApiError,
    pub status_code: Option<u16>,
    pub url: String,
    pub body: Option<Value>,
    pub query_params: Option<HashMap<String, String>>,
}

impl ErrorEnvelope {
    pub fn new(error: ApiError) -> Self {
        Self {
            error,
            status_code: None,
            url: "unknown".to_string(),
            body: None,
            query_params: None,
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query_params(mut self, query_params: HashMap<String, String>) -> Self {
        self.query_params = Some(query_params);
        self
    }

    /// Unwrap the envelope, discarding the context.
    pub fn into_error(self) -> ApiError {
        self.error
    }
}
