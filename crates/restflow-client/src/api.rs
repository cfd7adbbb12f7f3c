//! Public call surface: one function per verb, each returning an [`ApiCall`]
//! that can be awaited directly or cancelled through its token.

use crate::executor;
use futures::future::BoxFuture;
use restflow_core::error::{ApiError, ApiResult, ErrorEnvelope};
use restflow_core::method::Method;
use restflow_core::options::{RequestBody, RequestOptions};
use restflow_core::settings::get_default_settings;
use serde_json::Value;
use std::future::IntoFuture;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Build a call for an arbitrary verb. The call does nothing until awaited.
pub fn request(method: Method, path: impl Into<String>, options: RequestOptions) -> ApiCall {
    ApiCall { method, path: path.into(), options, token: CancellationToken::new() }
}

pub fn get(path: impl Into<String>, options: RequestOptions) -> ApiCall {
    request(Method::Get, path, options)
}

pub fn post(path: impl Into<String>, options: RequestOptions) -> ApiCall {
    request(Method::Post, path, options)
}

pub fn put(path: impl Into<String>, options: RequestOptions) -> ApiCall {
    request(Method::Put, path, options)
}

pub fn patch(path: impl Into<String>, options: RequestOptions) -> ApiCall {
    request(Method::Patch, path, options)
}

pub fn delete(path: impl Into<String>, options: RequestOptions) -> ApiCall {
    request(Method::Delete, path, options)
}

pub fn head(path: impl Into<String>, options: RequestOptions) -> ApiCall {
    request(Method::Head, path, options)
}

pub fn options(path: impl Into<String>, options: RequestOptions) -> ApiCall {
    request(Method::Options, path, options)
}

/// A prepared request plus the cancellation token that owns it.
///
/// Awaiting the call reads the live settings snapshot, races the pipeline
/// against the configured timeout, and funnels every failure except
/// cancellation through the error interceptor.
pub struct ApiCall {
    method: Method,
    path: String,
    options: RequestOptions,
    token: CancellationToken,
}

impl ApiCall {
    /// Token for cancelling this call from elsewhere. Cancelling a call that
    /// already settled is a no-op.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[instrument(level = "debug", skip(self), fields(request_id = %Uuid::new_v4()))]
    pub async fn send(self) -> ApiResult<Value> {
        let ApiCall { method, path, options, token } = self;
        let settings = get_default_settings();
        let timeout_ms = settings.timeout.as_millis() as u64;

        // Context for the timeout envelope; the merged URL is never known
        // here because the pipeline owns URL construction.
        let pre_body = options.body.as_ref().map(RequestBody::to_value);
        let pre_query = options.query_params.clone();

        let work = executor::run(method, &path, options, &settings);
        tokio::select! {
            _ = token.cancelled() => {
                debug!("request cancelled");
                Err(ApiError::Cancelled)
            }
            outcome = tokio::time::timeout(settings.timeout, work) => match outcome {
                Ok(Ok(data)) => Ok(data),
                Ok(Err(envelope)) => Err(settings.error_interceptor.intercept(envelope)),
                Err(_) => {
                    warn!(timeout_ms, "request timed out");
                    let mut envelope = ErrorEnvelope::new(ApiError::Timeout { timeout_ms })
                        .with_url(&path);
                    if let Some(body) = pre_body {
                        envelope = envelope.with_body(body);
                    }
                    if let Some(query) = pre_query {
                        envelope = envelope.with_query_params(query);
                    }
                    Err(settings.error_interceptor.intercept(envelope))
                }
            },
        }
    }
}

impl IntoFuture for ApiCall {
    type Output = ApiResult<Value>;
    type IntoFuture = BoxFuture<'static, ApiResult<Value>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.send())
    }
}
