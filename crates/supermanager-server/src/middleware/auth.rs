// Authentication middleware for Actix-web
// Decodes the bearer token of every request into an AuthContext for the secured! macro

use actix_service::forward_ready;
use actix_utils::future::{Ready, ok};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    web::Data,
};
use futures::future::LocalBoxFuture;

use supermanager_auth::model::{AUTHORIZATION_HEADER, AuthContext, TOKEN_PREFIX};
use supermanager_auth::service::auth::context_from_token;
use supermanager_server_common::AppState;

// Authentication middleware transformer
pub struct Authentication;

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthenticationMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthenticationMiddleware { service })
    }
}

pub struct AuthenticationMiddleware<S> {
    service: S,
}

/// Token of an `Authorization: Bearer <token>` header
fn extract_token(req: &ServiceRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION_HEADER)?.to_str().ok()?;

    value
        .trim()
        .strip_prefix(TOKEN_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if Method::OPTIONS != *req.method() {
            let auth_context = match extract_token(&req) {
                Some(token) => match req.app_data::<Data<AppState>>() {
                    Some(app_state) => {
                        context_from_token(&token, &app_state.token_config.signing_key)
                    }
                    None => {
                        tracing::error!("AppState not found in request app_data");
                        AuthContext {
                            token_provided: true,
                            ..Default::default()
                        }
                    }
                },
                None => AuthContext::default(),
            };

            // Always insert AuthContext so the secured! macro can inspect it
            req.extensions_mut().insert(auth_context);
        }

        let res = self.service.call(req);

        Box::pin(async move { res.await.map(ServiceResponse::map_into_left_body) })
    }
}
