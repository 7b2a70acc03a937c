//! 路径参数提取器
//!
//! 直接使用 `web::Path<i64>` 时解析失败会返回纯文本 404，这里统一为
//! 400 + `ApiResponse` 信封。

/// 定义一个从路径参数中提取正整数 ID 的提取器
///
/// ```rust,ignore
/// define_safe_i64_extractor!(SafeSectionNoI64, "section_no");
///
/// async fn handler(section_no: SafeSectionNoI64) -> HttpResponse {
///     let section_no: i64 = section_no.0;
///     // ...
/// }
/// ```
#[macro_export]
macro_rules! define_safe_i64_extractor {
    ($name:ident, $param:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub i64);

        impl actix_web::FromRequest for $name {
            type Error = actix_web::Error;
            type Future = std::future::Ready<Result<Self, Self::Error>>;

            fn from_request(
                req: &actix_web::HttpRequest,
                _payload: &mut actix_web::dev::Payload,
            ) -> Self::Future {
                std::future::ready($crate::utils::extractor::parse_positive_i64(
                    req.match_info().get($param),
                    $param,
                )
                .map($name))
            }
        }
    };
}

use actix_web::{HttpResponse, error::InternalError};

use crate::models::{ApiResponse, ErrorCode};

#[doc(hidden)]
pub fn parse_positive_i64(raw: Option<&str>, param: &str) -> Result<i64, actix_web::Error> {
    let parsed = raw
        .ok_or_else(|| format!("Missing path parameter: {param}"))
        .and_then(|value| {
            value
                .parse::<i64>()
                .ok()
                .filter(|id| *id > 0)
                .ok_or_else(|| format!("Invalid path parameter {param}: '{value}'"))
        });

    parsed.map_err(|message| {
        let response = HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::BadRequest, message.clone()));
        InternalError::from_response(message, response).into()
    })
}

define_safe_i64_extractor!(SafeIDI64, "id");
define_safe_i64_extractor!(SafeSectionNoI64, "section_no");
