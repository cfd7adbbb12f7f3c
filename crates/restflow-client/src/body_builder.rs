//! Encodes a request body into one of the three supported wire formats.
//!
//! Selection order: multipart wins when the declared content type says so or
//! any file parts are present, form-urlencoding wins when the declared
//! content type says so or the body is `Params`, everything else is JSON.
//! `GET` and `HEAD` never carry a body no matter what was supplied.

use reqwest::multipart::{Form, Part};
use restflow_core::error::{ApiError, ApiResult};
use restflow_core::method::Method;
use restflow_core::options::{FilePart, RequestBody};
use serde_json::Value;
use std::collections::HashMap;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded;charset=UTF-8";

/// Encoded body ready for dispatch.
pub enum EncodedBody {
    /// No body at all; declared headers pass through untouched.
    Empty,
    /// Serialized bytes plus the content type they require.
    Payload { bytes: Vec<u8>, content_type: &'static str },
    /// Multipart form; reqwest owns the content type and boundary.
    Multipart(Form),
}

/// Encode `body` and `files` for `method` under the merged `headers`.
pub fn build(
    method: Method,
    headers: &HashMap<String, String>,
    body: Option<RequestBody>,
    files: Vec<FilePart>,
) -> ApiResult<EncodedBody> {
    if method.is_bodyless() {
        return Ok(EncodedBody::Empty);
    }

    let declared = headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("content-type"))
        .map(|(_, value)| value.to_ascii_lowercase())
        .unwrap_or_default();

    if declared.starts_with("multipart/") || !files.is_empty() {
        return build_multipart(body, files);
    }
    if declared.starts_with("application/x-www-form-urlencoded")
        || matches!(body, Some(RequestBody::Params(_)))
    {
        return build_form(body);
    }
    build_json(body)
}

fn build_json(body: Option<RequestBody>) -> ApiResult<EncodedBody> {
    match body {
        Some(RequestBody::Json(value)) => {
            let bytes = serde_json::to_vec(&value)
                .map_err(|e| ApiError::InvalidBody(format!("JSON serialization failed: {e}")))?;
            Ok(EncodedBody::Payload { bytes, content_type: CONTENT_TYPE_JSON })
        }
        // Params never reach here; they force the form branch.
        Some(RequestBody::Params(_)) | None => Ok(EncodedBody::Empty),
    }
}

fn build_form(body: Option<RequestBody>) -> ApiResult<EncodedBody> {
    let pairs: Vec<(String, String)> = match body {
        Some(RequestBody::Params(pairs)) => pairs,
        Some(RequestBody::Json(Value::Object(map))) => {
            map.into_iter().map(|(key, value)| (key, coerce_field(value))).collect()
        }
        Some(RequestBody::Json(other)) => {
            return Err(ApiError::InvalidBody(format!(
                "form-urlencoded body must be a JSON object or params, got {other}"
            )));
        }
        None => return Ok(EncodedBody::Empty),
    };

    let mut encoded = String::new();
    for (key, value) in &pairs {
        if !encoded.is_empty() {
            encoded.push('&');
        }
        encoded.push_str(&urlencoding::encode(key));
        encoded.push('=');
        encoded.push_str(&urlencoding::encode(value));
    }

    Ok(EncodedBody::Payload { bytes: encoded.into_bytes(), content_type: CONTENT_TYPE_FORM })
}

fn build_multipart(body: Option<RequestBody>, files: Vec<FilePart>) -> ApiResult<EncodedBody> {
    let mut form = Form::new();

    match body {
        Some(RequestBody::Json(Value::Object(map))) => {
            // Field values travel as their JSON text, so strings keep quotes.
            for (key, value) in map {
                form = form.text(key, value.to_string());
            }
        }
        Some(RequestBody::Params(pairs)) => {
            for (key, value) in pairs {
                form = form.text(key, value);
            }
        }
        Some(RequestBody::Json(Value::Null)) | None => {}
        Some(RequestBody::Json(other)) => {
            return Err(ApiError::InvalidBody(format!(
                "multipart body must be a JSON object or params, got {other}"
            )));
        }
    }

    for file in files {
        let mime_type = file.mime_type.clone();
        let part = Part::bytes(file.content)
            .file_name(file.file_name)
            .mime_str(&mime_type)
            .map_err(|e| ApiError::InvalidBody(format!("Invalid MIME type '{mime_type}': {e}")))?;
        form = form.part(file.name, part);
    }

    Ok(EncodedBody::Multipart(form))
}

/// Plain-string coercion for form fields: strings stay bare, everything else
/// becomes its JSON text.
fn coerce_field(value: Value) -> String {
    match value {
        Value::String(inner) => inner,
        other => other.to_string(),
    }
}
