//! Interceptor seams for the request/response pipeline.
//!
//! Each trait marks one fixed pipeline stage. Implementations can transform
//! the value flowing through or fail the call by returning an error.

use crate::error::{ApiError, ApiResult, ErrorEnvelope};
use crate::key_rename::camelize_keys;
use crate::options::{RequestMeta, RequestOptions, ResponseContext};
use async_trait::async_trait;
use serde_json::Value;

/// Runs before URL construction and body encoding; its result becomes the
/// effective options for the remainder of the call.
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    async fn intercept(&self, options: RequestOptions, meta: &RequestMeta)
        -> ApiResult<RequestOptions>;
}

/// Runs on the parsed response payload after an accepted status. Add-ons use
/// the same trait and are folded in order after the primary interceptor.
#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    async fn intercept(&self, data: Value, ctx: &ResponseContext) -> ApiResult<Value>;
}

/// The single error funnel. Receives the uniform envelope for every failure;
/// whatever it returns is what the call rejects with.
pub trait ErrorInterceptor: Send + Sync {
    fn intercept(&self, envelope: ErrorEnvelope) -> ApiError;
}

/// Default for all three stages: passes values through unchanged.
pub struct Identity;

#[async_trait]
impl RequestInterceptor for Identity {
    async fn intercept(
        &self,
        options: RequestOptions,
        _meta: &RequestMeta,
    ) -> ApiResult<RequestOptions> {
        Ok(options)
    }
}

#[async_trait]
impl ResponseInterceptor for Identity {
    async fn intercept(&self, data: Value, _ctx: &ResponseContext) -> ApiResult<Value> {
        Ok(data)
    }
}

impl ErrorInterceptor for Identity {
    fn intercept(&self, envelope: ErrorEnvelope) -> ApiError {
        envelope.into_error()
    }
}

/// Prebuilt add-on converting snake_case response keys to camelCase.
pub struct CamelCase;

#[async_trait]
impl ResponseInterceptor for CamelCase {
    async fn intercept(&self, data: Value, _ctx: &ResponseContext) -> ApiResult<Value> {
        Ok(camelize_keys(data))
    }
}
