//! Process-wide default settings and the registry that owns them.
//!
//! The registry holds exactly one live `Settings` value. Replacement is
//! whole-object: `set_default_settings` merges a patch over hard defaults
//! (never over the previous custom value), `clear_default_settings` restores
//! the defaults exactly. Readers take an `Arc` snapshot; a snapshot taken
//! before a replacement never observes it.

use crate::interceptor::{ErrorInterceptor, Identity, RequestInterceptor, ResponseInterceptor};
use crate::options::Credentials;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, RwLock};
use std::time::Duration;

/// Accepted status codes: `[min_include, max_exclude)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCodeRange {
    pub min_include: u16,
    pub max_exclude: u16,
}

/// What to do when a JSON response body does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonParsePolicy {
    /// Treat empty or invalid JSON as a legitimate "no data" payload.
    #[default]
    Lenient,
    /// Propagate a parse error through the error funnel.
    Strict,
}

pub struct Settings {
    pub headers: HashMap<String, String>,
    pub base_url: String,
    pub timeout: Duration,
    pub credentials: Option<Credentials>,
    pub request_interceptor: Arc<dyn RequestInterceptor>,
    pub response_interceptor: Arc<dyn ResponseInterceptor>,
    pub response_interceptor_addons: Vec<Arc<dyn ResponseInterceptor>>,
    pub error_interceptor: Arc<dyn ErrorInterceptor>,
    pub response_code_white_list_range: StatusCodeRange,
    pub response_code_white_list: Vec<u16>,
    pub response_code_black_list: Vec<u16>,
    pub serialized_names: HashMap<String, String>,
    pub json_parse_policy: JsonParsePolicy,
    /// Bumped on every replacement; diagnostic only.
    pub version: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "application/json".to_string());
        Self {
            headers,
            base_url: String::new(),
            timeout: Duration::from_millis(5000),
            credentials: None,
            request_interceptor: Arc::new(Identity),
            response_interceptor: Arc::new(Identity),
            response_interceptor_addons: Vec::new(),
            error_interceptor: Arc::new(Identity),
            response_code_white_list_range: StatusCodeRange { min_include: 200, max_exclude: 300 },
            response_code_white_list: Vec::new(),
            response_code_black_list: Vec::new(),
            serialized_names: HashMap::new(),
            json_parse_policy: JsonParsePolicy::Lenient,
            version: 0,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("headers", &self.headers)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("credentials", &self.credentials.is_some())
            .field("response_interceptor_addons", &self.response_interceptor_addons.len())
            .field("response_code_white_list_range", &self.response_code_white_list_range)
            .field("response_code_white_list", &self.response_code_white_list)
            .field("response_code_black_list", &self.response_code_black_list)
            .field("serialized_names", &self.serialized_names)
            .field("json_parse_policy", &self.json_parse_policy)
            .field("version", &self.version)
            .finish()
    }
}

/// Partial settings, merged over hard defaults by `set_default_settings`.
#[derive(Default)]
pub struct SettingsPatch {
    pub headers: Option<HashMap<String, String>>,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
    pub credentials: Option<Credentials>,
    pub request_interceptor: Option<Arc<dyn RequestInterceptor>>,
    pub response_interceptor: Option<Arc<dyn ResponseInterceptor>>,
    pub response_interceptor_addons: Option<Vec<Arc<dyn ResponseInterceptor>>>,
    pub error_interceptor: Option<Arc<dyn ErrorInterceptor>>,
    pub response_code_white_list_range: Option<StatusCodeRange>,
    pub response_code_white_list: Option<Vec<u16>>,
    pub response_code_black_list: Option<Vec<u16>>,
    pub serialized_names: Option<HashMap<String, String>>,
    pub json_parse_policy: Option<JsonParsePolicy>,
}

impl SettingsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_request_interceptor(
        mut self,
        interceptor: impl RequestInterceptor + 'static,
    ) -> Self {
        self.request_interceptor = Some(Arc::new(interceptor));
        self
    }

    pub fn with_response_interceptor(
        mut self,
        interceptor: impl ResponseInterceptor + 'static,
    ) -> Self {
        self.response_interceptor = Some(Arc::new(interceptor));
        self
    }

    /// Append one add-on; add-ons run after the response interceptor, in the
    /// order they were added.
    pub fn with_response_interceptor_addon(
        mut self,
        addon: impl ResponseInterceptor + 'static,
    ) -> Self {
        self.response_interceptor_addons.get_or_insert_with(Vec::new).push(Arc::new(addon));
        self
    }

    pub fn with_error_interceptor(mut self, interceptor: impl ErrorInterceptor + 'static) -> Self {
        self.error_interceptor = Some(Arc::new(interceptor));
        self
    }

    pub fn with_response_code_range(mut self, min_include: u16, max_exclude: u16) -> Self {
        self.response_code_white_list_range = Some(StatusCodeRange { min_include, max_exclude });
        self
    }

    pub fn with_response_code_white_list(mut self, list: Vec<u16>) -> Self {
        self.response_code_white_list = Some(list);
        self
    }

    pub fn with_response_code_black_list(mut self, list: Vec<u16>) -> Self {
        self.response_code_black_list = Some(list);
        self
    }

    pub fn with_serialized_names(mut self, names: HashMap<String, String>) -> Self {
        self.serialized_names = Some(names);
        self
    }

    pub fn with_json_parse_policy(mut self, policy: JsonParsePolicy) -> Self {
        self.json_parse_policy = Some(policy);
        self
    }

    fn into_settings(self) -> Settings {
        let mut settings = Settings::default();
        if let Some(headers) = self.headers {
            settings.headers = headers;
        }
        if let Some(base_url) = self.base_url {
            settings.base_url = base_url;
        }
        if let Some(timeout) = self.timeout {
            settings.timeout = timeout;
        }
        if let Some(credentials) = self.credentials {
            settings.credentials = Some(credentials);
        }
        if let Some(interceptor) = self.request_interceptor {
            settings.request_interceptor = interceptor;
        }
        if let Some(interceptor) = self.response_interceptor {
            settings.response_interceptor = interceptor;
        }
        if let Some(addons) = self.response_interceptor_addons {
            settings.response_interceptor_addons = addons;
        }
        if let Some(interceptor) = self.error_interceptor {
            settings.error_interceptor = interceptor;
        }
        if let Some(range) = self.response_code_white_list_range {
            settings.response_code_white_list_range = range;
        }
        if let Some(list) = self.response_code_white_list {
            settings.response_code_white_list = list;
        }
        if let Some(list) = self.response_code_black_list {
            settings.response_code_black_list = list;
        }
        if let Some(names) = self.serialized_names {
            settings.serialized_names = names;
        }
        if let Some(policy) = self.json_parse_policy {
            settings.json_parse_policy = policy;
        }
        settings
    }
}

static SETTINGS: LazyLock<RwLock<Arc<Settings>>> =
    LazyLock::new(|| RwLock::new(Arc::new(Settings::default())));

/// Replace the live settings with hard defaults merged with `patch`.
pub fn set_default_settings(patch: SettingsPatch) {
    let mut settings = patch.into_settings();
    let mut slot = SETTINGS.write().unwrap();
    settings.version = slot.version + 1;
    tracing::debug!(version = settings.version, "default settings replaced");
    *slot = Arc::new(settings);
}

/// Restore the hard defaults exactly.
pub fn clear_default_settings() {
    let mut slot = SETTINGS.write().unwrap();
    let mut settings = Settings::default();
    settings.version = slot.version + 1;
    tracing::debug!(version = settings.version, "default settings cleared");
    *slot = Arc::new(settings);
}

/// Snapshot of the live settings at this instant.
pub fn get_default_settings() -> Arc<Settings> {
    SETTINGS.read().unwrap().clone()
}
