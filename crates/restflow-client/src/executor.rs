//! Single-request execution: resolve options, dispatch, evaluate the status
//! policy, then run the response transform chain.
//!
//! Every failure leaves this module as an [`ErrorEnvelope`] carrying whatever
//! request context was known at the failure site. The caller owns the error
//! interceptor hand-off and the outer timeout race.

use crate::body_builder::{self, EncodedBody};
use crate::status_policy;
use restflow_core::error::{ApiError, ErrorEnvelope};
use restflow_core::key_rename::rename_keys;
use restflow_core::method::Method;
use restflow_core::options::{
    Credentials, RequestBody, RequestMeta, RequestOptions, ResponseContext,
};
use restflow_core::settings::{JsonParsePolicy, Settings};
use restflow_core::url_builder;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, instrument, warn};

static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);

#[instrument(level = "debug", skip_all, fields(method = %method, path = %path))]
pub(crate) async fn run(
    method: Method,
    path: &str,
    mut options: RequestOptions,
    settings: &Settings,
) -> Result<Value, ErrorEnvelope> {
    options.headers = merge_headers(&settings.headers, std::mem::take(&mut options.headers));

    let meta = RequestMeta {
        url: path.to_string(),
        method,
        base_url: settings.base_url.clone(),
        timeout_ms: settings.timeout.as_millis() as u64,
    };

    // Context for failures that happen before dispatch.
    let pre_body = options.body.as_ref().map(RequestBody::to_value);
    let pre_query = options.query_params.clone();

    let options = match settings.request_interceptor.intercept(options, &meta).await {
        Ok(resolved) => resolved,
        Err(err) => {
            return Err(envelope(err, path, None, pre_body.as_ref(), pre_query.as_ref()));
        }
    };

    if options.enable_mock {
        return mock_result(options, path);
    }

    let RequestOptions {
        query_params,
        mut body,
        files,
        headers,
        serialized_names,
        interceptor,
        base_url,
        use_raw_url,
        credentials,
        meta: call_meta,
        ..
    } = options;

    let url = if use_raw_url {
        path.to_string()
    } else {
        let base = base_url.as_deref().unwrap_or(&settings.base_url);
        url_builder::merge(path, query_params.as_ref(), base)
    };

    let names = merge_names(&settings.serialized_names, serialized_names.as_ref());
    if !names.is_empty() {
        body = match body {
            Some(RequestBody::Json(value)) => Some(RequestBody::Json(rename_keys(value, &names))),
            other => other,
        };
    }

    // Context as it will go over the wire.
    let diag_body = body.as_ref().map(RequestBody::to_value);
    let diag_query = query_params;
    let fail = |err: ApiError, status: Option<u16>| {
        envelope(err, &url, status, diag_body.as_ref(), diag_query.as_ref())
    };

    let encoded = match body_builder::build(method, &headers, body, files) {
        Ok(encoded) => encoded,
        Err(err) => return Err(fail(err, None)),
    };

    let mut request = HTTP_CLIENT.request(to_reqwest_method(method), &url);
    let encoder_owns_content_type = !matches!(encoded, EncodedBody::Empty);
    for (key, value) in &headers {
        if encoder_owns_content_type && key.eq_ignore_ascii_case("content-type") {
            continue;
        }
        request = request.header(key, value);
    }
    request = match encoded {
        EncodedBody::Empty => request,
        EncodedBody::Payload { bytes, content_type } => {
            request.header(reqwest::header::CONTENT_TYPE, content_type).body(bytes)
        }
        EncodedBody::Multipart(form) => request.multipart(form),
    };
    match credentials.or_else(|| settings.credentials.clone()) {
        Some(Credentials::Basic { username, password }) => {
            request = request.basic_auth(username, password);
        }
        Some(Credentials::Bearer(token)) => {
            request = request.bearer_auth(token);
        }
        None => {}
    }

    debug!(%url, "dispatching request");
    let response = match request.send().await {
        Ok(response) => response,
        Err(err) => {
            return Err(fail(classify_transport(err, settings.timeout.as_millis() as u64), None));
        }
    };

    let status_code = response.status().as_u16();
    debug!(status_code, "response received");
    if let Err(err) = status_policy::evaluate(
        status_code,
        settings.response_code_white_list_range,
        &settings.response_code_white_list,
        &settings.response_code_black_list,
    ) {
        warn!(status_code, "status rejected by policy");
        return Err(fail(err, Some(status_code)));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let text = match response.text().await {
        Ok(text) => text,
        Err(err) => return Err(fail(ApiError::Network(err.to_string()), Some(status_code))),
    };

    let lowered = content_type.to_ascii_lowercase();
    let mut data = if lowered.contains("text") && !text.is_empty() {
        return Err(fail(ApiError::ContentType(content_type), Some(status_code)));
    } else if lowered.contains("application/json") {
        parse_json(&text, settings.json_parse_policy)
            .map_err(|err| fail(err, Some(status_code)))?
    } else {
        Value::Null
    };

    if !names.is_empty() {
        data = rename_keys(data, &names);
    }

    let ctx = ResponseContext { status_code, url: url.clone(), method, meta: call_meta };
    data = match settings.response_interceptor.intercept(data, &ctx).await {
        Ok(value) => value,
        Err(err) => return Err(fail(err, Some(status_code))),
    };

    if let Some(call_interceptor) = interceptor {
        data = match call_interceptor(data) {
            Ok(value) => value,
            Err(err) => return Err(fail(err, Some(status_code))),
        };
    }

    for addon in &settings.response_interceptor_addons {
        data = match addon.intercept(data, &ctx).await {
            Ok(value) => value,
            Err(err) => return Err(fail(err, Some(status_code))),
        };
    }

    Ok(data)
}

/// Settle a mocked call: the error if one was supplied, otherwise the mock
/// payload verbatim. Response transforms are skipped on purpose so tests see
/// exactly what they injected.
fn mock_result(mut options: RequestOptions, path: &str) -> Result<Value, ErrorEnvelope> {
    if let Some(err) = options.mock_error.take() {
        let status_code = err.status_code().unwrap_or(400);
        let body = options.body.as_ref().map(RequestBody::to_value);
        return Err(envelope(
            err,
            path,
            Some(status_code),
            body.as_ref(),
            options.query_params.as_ref(),
        ));
    }
    Ok(options.mock.take().unwrap_or(Value::Null))
}

fn parse_json(text: &str, policy: JsonParsePolicy) -> Result<Value, ApiError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(err) => match policy {
            JsonParsePolicy::Lenient => {
                warn!(%err, "invalid JSON body swallowed into null");
                Ok(Value::Null)
            }
            JsonParsePolicy::Strict => Err(ApiError::Parse(err.to_string())),
        },
    }
}

fn classify_transport(err: reqwest::Error, timeout_ms: u64) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout { timeout_ms }
    } else if err.is_connect() {
        ApiError::Connection(err.to_string())
    } else if err.is_builder() {
        ApiError::InvalidUrl(err.to_string())
    } else {
        ApiError::Network(err.to_string())
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

/// Base headers with per-call overrides; override keys match
/// case-insensitively so "content-type" replaces "Content-Type".
fn merge_headers(
    base: &HashMap<String, String>,
    overrides: HashMap<String, String>,
) -> HashMap<String, String> {
    let mut merged = base.clone();
    for (key, value) in overrides {
        merged.retain(|existing, _| !existing.eq_ignore_ascii_case(&key));
        merged.insert(key, value);
    }
    merged
}

/// Rename map for this call: settings-level names with per-call names on top.
fn merge_names(
    base: &HashMap<String, String>,
    overrides: Option<&HashMap<String, String>>,
) -> HashMap<String, String> {
    let mut merged = base.clone();
    if let Some(extra) = overrides {
        for (key, value) in extra {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

fn envelope(
    error: ApiError,
    url: &str,
    status_code: Option<u16>,
    body: Option<&Value>,
    query_params: Option<&HashMap<String, String>>,
) -> ErrorEnvelope {
    let mut env = ErrorEnvelope::new(error).with_url(url);
    if let Some(code) = status_code {
        env = env.with_status(code);
    }
    if let Some(body) = body {
        env = env.with_body(body.clone());
    }
    if let Some(query) = query_params {
        env = env.with_query_params(query.clone());
    }
    env
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_call_headers_override_base_headers_case_insensitively() {
        let mut base = HashMap::new();
        base.insert("Content-Type".to_string(), "application/json".to_string());
        base.insert("Accept".to_string(), "application/json".to_string());
        let mut overrides = HashMap::new();
        overrides.insert("content-type".to_string(), "multipart/form-data".to_string());

        let merged = merge_headers(&base, overrides);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("content-type").map(String::as_str), Some("multipart/form-data"));
        assert_eq!(merged.get("Accept").map(String::as_str), Some("application/json"));
    }

    #[test]
    fn per_call_rename_entries_win() {
        let mut base = HashMap::new();
        base.insert("a".to_string(), "x".to_string());
        base.insert("b".to_string(), "y".to_string());
        let mut overrides = HashMap::new();
        overrides.insert("a".to_string(), "z".to_string());

        let merged = merge_names(&base, Some(&overrides));
        assert_eq!(merged.get("a").map(String::as_str), Some("z"));
        assert_eq!(merged.get("b").map(String::as_str), Some("y"));
    }

    #[test]
    fn empty_json_text_parses_to_null() {
        assert_eq!(parse_json("", JsonParsePolicy::Lenient).unwrap(), Value::Null);
        assert_eq!(parse_json("  ", JsonParsePolicy::Strict).unwrap(), Value::Null);
    }

    #[test]
    fn invalid_json_follows_the_configured_policy() {
        assert_eq!(parse_json("{oops", JsonParsePolicy::Lenient).unwrap(), Value::Null);
        assert!(matches!(
            parse_json("{oops", JsonParsePolicy::Strict).unwrap_err(),
            ApiError::Parse(_)
        ));
    }
}
