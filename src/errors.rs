//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称，并映射到 HTTP 响应。

use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

use crate::models::{ApiResponse, ErrorCode};

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_gradebook_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum GradebookError {
            $($variant(String),)*
        }

        impl GradebookError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(GradebookError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(GradebookError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(GradebookError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl GradebookError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        GradebookError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_gradebook_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Serialization("E009", "Serialization Error"),
    Authentication("E012", "Authentication Error"),
    Authorization("E013", "Authorization Error"),
}

impl GradebookError {
    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 对外暴露的业务错误码
    pub fn api_code(&self) -> ErrorCode {
        match self {
            GradebookError::Validation(_) => ErrorCode::BadRequest,
            GradebookError::NotFound(_) => ErrorCode::NotFound,
            GradebookError::Authentication(_) => ErrorCode::Unauthorized,
            GradebookError::Authorization(_) => ErrorCode::Forbidden,
            _ => ErrorCode::InternalServerError,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GradebookError::NotFound(_))
    }
}

impl fmt::Display for GradebookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for GradebookError {}

impl ResponseError for GradebookError {
    fn status_code(&self) -> StatusCode {
        match self {
            GradebookError::Validation(_) => StatusCode::BAD_REQUEST,
            GradebookError::NotFound(_) => StatusCode::NOT_FOUND,
            GradebookError::Authentication(_) => StatusCode::UNAUTHORIZED,
            GradebookError::Authorization(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(ApiResponse::error_empty(self.api_code(), self.message()))
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for GradebookError {
    fn from(err: sea_orm::DbErr) -> Self {
        GradebookError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for GradebookError {
    fn from(err: serde_json::Error) -> Self {
        GradebookError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GradebookError>;
