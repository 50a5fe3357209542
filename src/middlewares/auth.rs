use crate::error::{AppError, AppResult};
use crate::utils::{AuthenticatedUser, JwtService};
use actix_web::http::{Method, header};
use actix_web::{
    Error, HttpMessage, HttpRequest,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

// 不需要登录的路径：文档、注册登录、Stripe 回调
const PUBLIC_EXACT: &[&str] = &["/swagger-ui", "/api-docs/openapi.json"];
const PUBLIC_PREFIXES: &[&str] = &["/swagger-ui/", "/api-docs/", "/api/v1/auth/", "/webhook/"];

fn is_public(path: &str) -> bool {
    PUBLIC_EXACT.contains(&path) || PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Bearer JWT gate for everything outside the public paths.
pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
}

impl<S> AuthMiddlewareService<S> {
    fn authenticate(&self, req: &ServiceRequest) -> AppResult<AuthenticatedUser> {
        let token = bearer_token(req)
            .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))?;
        self.jwt_service.verify_access_token(&token).map_err(|e| {
            log::debug!("Rejected access token on {}: {e}", req.path());
            AppError::AuthError("Invalid access token".to_string())
        })
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS 预检直接放行
        if req.method() == Method::OPTIONS || is_public(req.path()) {
            return Box::pin(self.service.call(req));
        }

        match self.authenticate(&req) {
            Ok(user) => {
                req.extensions_mut().insert(user);
                Box::pin(self.service.call(req))
            }
            Err(error) => Box::pin(async move { Err(error.into()) }),
        }
    }
}

/// 读取中间件写入的当前用户 ID
pub fn current_user_id(req: &HttpRequest) -> AppResult<i32> {
    req.extensions()
        .get::<AuthenticatedUser>()
        .map(|u| u.user_id)
        .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_public_paths() {
        assert!(is_public("/api/v1/auth/login"));
        assert!(is_public("/webhook/stripe"));
        assert!(is_public("/swagger-ui/index.html"));
        assert!(is_public("/api-docs/openapi.json"));
        assert!(!is_public("/api/v1/businesses"));
        assert!(!is_public("/api/v1/me"));
    }

    #[test]
    fn test_bearer_token() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def"))
            .to_srv_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("abc.def"));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic xyz"))
            .to_srv_request();
        assert_eq!(bearer_token(&req), None);

        let req = TestRequest::default().to_srv_request();
        assert_eq!(bearer_token(&req), None);
    }
}
