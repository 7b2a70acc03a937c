use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::assignments::requests::{
    CreateAssignmentRequest, StudentAssignmentsQuery, UpdateAssignmentRequest,
};
use crate::models::users::entities::UserType;
use crate::services::{AssignmentService, StudentService};
use crate::utils::SafeIDI64;

// 懒加载的全局服务实例
static ASSIGNMENT_SERVICE: Lazy<AssignmentService> = Lazy::new(AssignmentService::new_lazy);
static STUDENT_SERVICE: Lazy<StudentService> = Lazy::new(StudentService::new_lazy);

// 学生查询本人某学期的作业与分数
pub async fn list_student_assignments(
    req: HttpRequest,
    query: web::Query<StudentAssignmentsQuery>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .get_student_assignments(&req, query.into_inner())
        .await
}

// 创建作业
pub async fn create_assignment(
    req: HttpRequest,
    body: web::Json<CreateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .create_assignment(&req, body.into_inner())
        .await
}

// 更新作业，ID 在请求体中
pub async fn update_assignment(
    req: HttpRequest,
    body: web::Json<UpdateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .update_assignment(&req, body.into_inner())
        .await
}

// 删除作业
pub async fn delete_assignment(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.delete_assignment(&req, path.0).await
}

// 获取作业成绩单
pub async fn get_assignment_grades(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.get_assignment_grades(&req, path.0).await
}

// 配置路由
pub fn configure_assignments_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assignments")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    // 学生查询 - 业务层限制为本人
                    .route(web::get().to(list_student_assignments))
                    // 创建作业 - 仅教师
                    .route(
                        web::post()
                            .to(create_assignment)
                            .wrap(middlewares::RequireRole::new(&UserType::Instructor)),
                    )
                    // 更新作业 - 仅教师
                    .route(
                        web::put()
                            .to(update_assignment)
                            .wrap(middlewares::RequireRole::new(&UserType::Instructor)),
                    ),
            )
            .service(
                web::resource("/{id}")
                    // 删除作业 - 仅教师
                    .route(
                        web::delete()
                            .to(delete_assignment)
                            .wrap(middlewares::RequireRole::new(&UserType::Instructor)),
                    ),
            )
            .service(
                web::resource("/{id}/grades")
                    // 成绩单 - 仅教师
                    .route(
                        web::get()
                            .to(get_assignment_grades)
                            .wrap(middlewares::RequireRole::new(&UserType::Instructor)),
                    ),
            ),
    );
}
