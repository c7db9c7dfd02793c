//! API key authentication middleware for protecting API endpoints.
//!
//! Every request must carry an `X-API-Key` header matching one of the
//! configured keys. `GET /health` stays open for load balancers.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::{header::HeaderName, Method},
    Error, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use std::{
    collections::HashSet,
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};

use vmail_shared::config::ServerConfig;
use vmail_shared::errors::{error_codes, ErrorResponse};

/// Header carrying the caller's key
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// API key authentication middleware factory
#[derive(Clone)]
pub struct ApiKeyAuth {
    keys: Arc<HashSet<String>>,
}

impl ApiKeyAuth {
    /// Accept any of `keys`; empty keys are never accepted
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let keys = keys
            .into_iter()
            .map(Into::into)
            .filter(|k: &String| !k.is_empty())
            .collect();
        Self {
            keys: Arc::new(keys),
        }
    }

    /// Accept the keys configured for the server
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.api_keys.values().cloned())
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiKeyAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyAuthMiddleware {
            service: Rc::new(service),
            keys: Arc::clone(&self.keys),
        }))
    }
}

/// API key authentication middleware service
pub struct ApiKeyAuthMiddleware<S> {
    service: Rc<S>,
    keys: Arc<HashSet<String>>,
}

impl<S, B> Service<ServiceRequest> for ApiKeyAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        if is_open_route(&req) || self.is_authorized(&req) {
            return Box::pin(async move {
                let res = service.call(req).await?;
                Ok(res.map_into_left_body())
            });
        }

        tracing::warn!(
            path = %req.path(),
            event = "api_key_rejected",
            "Request without a valid API key"
        );
        let response = HttpResponse::Unauthorized().json(ErrorResponse::new(
            error_codes::UNAUTHORIZED,
            "Missing or invalid API key",
        ));
        Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
    }
}

impl<S> ApiKeyAuthMiddleware<S> {
    fn is_authorized(&self, req: &ServiceRequest) -> bool {
        req.headers()
            .get(&API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|presented| self.keys.contains(presented))
            .unwrap_or(false)
    }
}

/// Routes reachable without a key
fn is_open_route(req: &ServiceRequest) -> bool {
    (req.method() == Method::GET && req.path() == "/health") || req.method() == Method::OPTIONS
}
