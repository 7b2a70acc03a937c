use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::grades::requests::GradeUpdate;
use crate::models::users::entities::UserType;
use crate::services::GradeService;

// 懒加载的全局 GradeService 实例
static GRADE_SERVICE: Lazy<GradeService> = Lazy::new(GradeService::new_lazy);

// 批量上传成绩
pub async fn update_grades(
    req: HttpRequest,
    body: web::Json<Vec<GradeUpdate>>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.update_grades(&req, body.into_inner()).await
}

// 配置路由
pub fn configure_grades_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/grades")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("").route(
                    web::put()
                        .to(update_grades)
                        .wrap(middlewares::RequireRole::new(&UserType::Instructor)),
                ),
            ),
    );
}
