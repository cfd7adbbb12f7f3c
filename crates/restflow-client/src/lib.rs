//! HTTP request orchestration over reqwest: per-call options resolved
//! against process-wide settings, body encoding, status policy, response
//! transforms, and a single error funnel.

pub mod api;
pub mod body_builder;
mod executor;
pub mod status_policy;

// Re-export commonly used types
pub use api::{delete, get, head, options, patch, post, put, request, ApiCall};
pub use restflow_core::error::{ApiError, ApiResult, ErrorEnvelope};
pub use restflow_core::interceptor::{
    CamelCase, ErrorInterceptor, Identity, RequestInterceptor, ResponseInterceptor,
};
pub use restflow_core::method::Method;
pub use restflow_core::options::{
    CallInterceptor, Credentials, FilePart, RequestBody, RequestMeta, RequestOptions,
    ResponseContext,
};
pub use restflow_core::settings::{
    clear_default_settings, get_default_settings, set_default_settings, JsonParsePolicy,
    SettingsPatch, StatusCodeRange,
};
