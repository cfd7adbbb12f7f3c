pub mod error;
pub mod interceptor;
pub mod key_rename;
pub mod method;
pub mod options;
pub mod settings;
pub mod url_builder;

// Re-export commonly used types
pub use error::{ApiError, ApiResult, ErrorEnvelope};
pub use interceptor::{
    CamelCase, ErrorInterceptor, Identity, RequestInterceptor, ResponseInterceptor,
};
pub use key_rename::{camelize_keys, rename_keys};
pub use method::Method;
pub use options::{
    CallInterceptor, Credentials, FilePart, RequestBody, RequestMeta, RequestOptions,
    ResponseContext,
};
pub use settings::{
    clear_default_settings, get_default_settings, set_default_settings, JsonParsePolicy, Settings,
    SettingsPatch, StatusCodeRange,
};
