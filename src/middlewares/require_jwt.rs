/*!
 * JWT 认证中间件
 *
 * 校验 `Authorization: Bearer <JWT_TOKEN>` 中的 access token，并把令牌对应的用户
 * 解析为 `User` 放入请求扩展，后续处理程序以此作为调用者身份。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::{web, App};
 * use crate::middlewares::RequireJWT;
 *
 * App::new().service(
 *     web::scope("/api/v1")
 *         .wrap(RequireJWT)
 *         .route("/assignments/{id}/grades", web::get().to(handler)),
 * );
 *
 * async fn handler(req: HttpRequest) -> HttpResponse {
 *     match RequireJWT::extract_user_claims(&req) {
 *         Some(user) => HttpResponse::Ok().json(user.email),
 *         None => HttpResponse::Unauthorized().finish(),
 *     }
 * }
 * ```
 *
 * ## 认证流程
 *
 * 1. 提取并校验令牌签名、过期时间与 `token_type == "access"`
 * 2. 以 `user:<token>` 查询对象缓存，命中则直接使用
 * 3. 未命中时按 `sub` 查询用户并写回缓存
 * 4. 任一步失败返回 401
 *
 * 令牌由外部认证服务签发，签名密钥取自配置项 `jwt.secret`。
 */

use super::create_error_response;
use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::models::{ErrorCode, users::entities::User};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, error, info};

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Clone)]
pub struct RequireJWT;

fn user_cache_key(token: &str) -> String {
    format!("user:{token}")
}

// 辅助函数：提取并验证 JWT access token，解析出调用者
async fn extract_and_validate_jwt(req: &ServiceRequest) -> Result<User, String> {
    let token = req
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .ok_or_else(|| "Missing or invalid Authorization header".to_string())?;

    let claims = JwtUtils::verify_access_token(token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        "Invalid JWT token".to_string()
    })?;

    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone());

    // 从缓存中获取用户信息
    if let Some(cache) = &cache {
        match cache.get::<User>(&user_cache_key(token)).await {
            CacheResult::Found(user) => return Ok(user),
            _ => debug!("User not found in cache for subject {}", claims.sub),
        }
    }

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            error!("Storage not found in app data");
            "Identity backend unavailable".to_string()
        })?;

    let user_id = claims
        .user_id()
        .ok_or_else(|| "Invalid user ID in JWT".to_string())?;

    let user = storage
        .get_user_by_id(user_id)
        .await
        .map_err(|e| {
            error!("Failed to retrieve user {} from storage: {}", user_id, e);
            "Failed to retrieve user from storage".to_string()
        })?
        .ok_or_else(|| "User not found".to_string())?;

    // 将用户信息存入缓存
    if let Some(cache) = &cache {
        cache
            .insert(
                user_cache_key(token),
                &user,
                AppConfig::get().cache.default_ttl,
            )
            .await;
    }

    Ok(user)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 处理 OPTIONS 请求
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            // 验证 JWT token
            match extract_and_validate_jwt(&req).await {
                Ok(user) => {
                    debug!("JWT authentication successful for ID: {}", user.id);
                    req.extensions_mut().insert(user);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) => {
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        err
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            &format!("Unauthorized: {err}"),
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

// 辅助函数：从请求中提取用户信息
impl RequireJWT {
    /// 从请求扩展中提取调用者
    /// 此函数应该在应用了RequireJWT中间件的路由处理程序中使用
    pub fn extract_user_claims(req: &actix_web::HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::object_cache::moka::MokaCacheWrapper;
    use crate::models::users::entities::UserType;
    use crate::test_support::Spring2024;
    use crate::utils::jwt::{ACCESS_TOKEN_TYPE, issue_test_token};
    use actix_web::{App, HttpRequest, HttpResponse, test};

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match RequireJWT::extract_user_claims(&req) {
            Some(user) => HttpResponse::Ok().body(user.email),
            None => HttpResponse::InternalServerError().finish(),
        }
    }

    fn token_for(user_id: i64) -> String {
        issue_test_token(
            user_id,
            ACCESS_TOKEN_TYPE,
            chrono::Duration::minutes(10),
            &AppConfig::get().jwt.secret,
        )
    }

    fn moka() -> Arc<dyn ObjectCache> {
        Arc::new(MokaCacheWrapper::with_settings(16, 60))
    }

    #[actix_web::test]
    async fn test_resolved_user_is_cached_under_token() {
        let fixture = Spring2024::new().await;
        let cache = moka();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fixture.storage().clone()))
                .app_data(web::Data::new(cache.clone()))
                .service(web::scope("/me").wrap(RequireJWT).route("", web::get().to(whoami))),
        )
        .await;

        let token = token_for(fixture.instructor.id);
        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((AUTHORIZATION_HEADER, format!("{BEARER_PREFIX}{token}")))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "prof@x.edu");

        assert_eq!(
            cache.get::<User>(&user_cache_key(&token)).await,
            CacheResult::Found(fixture.instructor.clone())
        );
    }

    #[actix_web::test]
    async fn test_cached_identity_skips_storage() {
        let cache = moka();
        let token = token_for(41);
        let cached = User {
            id: 41,
            email: "cached@x.edu".to_string(),
            name: "Cached".to_string(),
            user_type: UserType::Student,
        };
        cache.insert(user_cache_key(&token), &cached, 60).await;

        // 没有注册存储：命中缓存才可能通过认证
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(cache.clone()))
                .service(web::scope("/me").wrap(RequireJWT).route("", web::get().to(whoami))),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((AUTHORIZATION_HEADER, format!("{BEARER_PREFIX}{token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, "cached@x.edu");

        // 另一个未缓存的令牌需要访问存储，因而失败
        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((AUTHORIZATION_HEADER, format!("{BEARER_PREFIX}{}", token_for(42))))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
