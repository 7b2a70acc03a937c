pub mod assignments;
pub mod grades;
pub mod policy;
pub mod students;

pub use assignments::AssignmentService;
pub use grades::GradeService;
pub use students::StudentService;

use std::sync::Arc;

use actix_web::{HttpRequest, web};
use tracing::{error, info};

use crate::errors::{GradebookError, Result};
use crate::middlewares::RequireJWT;
use crate::models::users::entities::User;
use crate::storage::Storage;

// 从 app data 中取出存储实例
pub(crate) fn storage_from_request(request: &HttpRequest) -> Result<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| GradebookError::database_connection("Storage not found in app data"))
}

// 当前调用者，由 RequireJWT 放入请求扩展
pub(crate) fn current_user(request: &HttpRequest) -> Result<User> {
    RequireJWT::extract_user_claims(request)
        .ok_or_else(|| GradebookError::authentication("Authentication required"))
}

// 记录失败原因，业务拒绝与系统错误分级别输出
pub(crate) fn log_failure(operation: &str, caller: &User, err: GradebookError) -> GradebookError {
    match &err {
        GradebookError::Validation(_)
        | GradebookError::NotFound(_)
        | GradebookError::Authentication(_)
        | GradebookError::Authorization(_) => {
            info!("{} rejected for user {}: {}", operation, caller.id, err);
        }
        _ => {
            error!("{} failed for user {}: {}", operation, caller.id, err);
        }
    }
    err
}
