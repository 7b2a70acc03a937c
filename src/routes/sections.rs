use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::users::entities::UserType;
use crate::services::AssignmentService;
use crate::utils::SafeSectionNoI64;

// 懒加载的全局 AssignmentService 实例
static ASSIGNMENT_SERVICE: Lazy<AssignmentService> = Lazy::new(AssignmentService::new_lazy);

// 列出课程班作业
pub async fn list_section_assignments(
    req: HttpRequest,
    section_no: SafeSectionNoI64,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .list_assignments(&req, section_no.0)
        .await
}

// 配置路由
pub fn configure_sections_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/sections")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/{section_no}/assignments")
                    // 仅教师，业务层再校验是否为该课程班教师
                    .route(
                        web::get()
                            .to(list_section_assignments)
                            .wrap(middlewares::RequireRole::new(&UserType::Instructor)),
                    ),
            ),
    );
}
