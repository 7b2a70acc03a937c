pub mod assignments;

pub mod grades;

pub mod sections;

pub use assignments::configure_assignments_routes;
pub use grades::configure_grades_routes;
pub use sections::configure_sections_routes;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test, web};
    use serde_json::{Value, json};

    use super::*;
    use crate::cache::ObjectCache;
    use crate::cache::object_cache::moka::MokaCacheWrapper;
    use crate::config::AppConfig;
    use crate::test_support::Spring2024;
    use crate::utils::jwt::{ACCESS_TOKEN_TYPE, issue_test_token};
    use crate::utils::{json_error_handler, query_error_handler};

    macro_rules! gradebook_app {
        ($fixture:expr) => {{
            let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(64, 60));
            test::init_service(
                App::new()
                    .app_data(web::QueryConfig::default().error_handler(query_error_handler))
                    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                    .app_data(web::Data::new($fixture.storage().clone()))
                    .app_data(web::Data::new(cache))
                    .configure(configure_sections_routes)
                    .configure(configure_assignments_routes)
                    .configure(configure_grades_routes),
            )
            .await
        }};
    }

    fn bearer(user_id: i64) -> (&'static str, String) {
        let token = issue_test_token(
            user_id,
            ACCESS_TOKEN_TYPE,
            chrono::Duration::minutes(10),
            &AppConfig::get().jwt.secret,
        );
        ("Authorization", format!("Bearer {token}"))
    }

    #[actix_web::test]
    async fn test_instructor_and_student_flow() {
        let fixture = Spring2024::new().await;
        let (student, _) = fixture.student("s1@x.edu", "Sam").await;
        let app = gradebook_app!(fixture);

        // 截止日期超出学期
        let req = test::TestRequest::post()
            .uri("/api/v1/assignments")
            .insert_header(bearer(fixture.instructor.id))
            .set_json(json!({"title": "HW1", "due_date": "2024-06-01", "section_no": 100}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/v1/assignments")
            .insert_header(bearer(fixture.instructor.id))
            .set_json(json!({"title": "HW1", "due_date": "2024-03-01", "section_no": 100}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 0);
        assert_eq!(body["data"]["due_date"], "2024-03-01");
        assert_eq!(body["data"]["course_id"], "cst363");
        let assignment_id = body["data"]["id"].as_i64().unwrap();

        let req = test::TestRequest::get()
            .uri("/api/v1/sections/100/assignments")
            .insert_header(bearer(fixture.instructor.id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/assignments/{assignment_id}/grades"))
            .insert_header(bearer(fixture.instructor.id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let sheet = body["data"].as_array().unwrap();
        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet[0]["student_email"], "s1@x.edu");
        assert!(sheet[0]["score"].is_null());
        let grade_id = sheet[0]["grade_id"].as_i64().unwrap();

        let req = test::TestRequest::put()
            .uri("/api/v1/grades")
            .insert_header(bearer(fixture.instructor.id))
            .set_json(json!([{"grade_id": grade_id, "section_no": 100, "score": 88.5}]))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri(&format!(
                "/api/v1/assignments?student_id={}&year=2024&semester=Spring",
                student.id
            ))
            .insert_header(bearer(student.id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let own = body["data"].as_array().unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0]["assignment_id"], assignment_id);
        assert_eq!(own[0]["score"], 88.5);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/assignments/{assignment_id}"))
            .insert_header(bearer(fixture.instructor.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_error_statuses() {
        let fixture = Spring2024::new().await;
        let (student, _) = fixture.student("s1@x.edu", "Sam").await;
        let app = gradebook_app!(fixture);

        // 缺少令牌
        let req = test::TestRequest::get()
            .uri("/api/v1/sections/100/assignments")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        // 非 access 类型的令牌
        let refresh = issue_test_token(
            fixture.instructor.id,
            "refresh",
            chrono::Duration::minutes(10),
            &AppConfig::get().jwt.secret,
        );
        let req = test::TestRequest::get()
            .uri("/api/v1/sections/100/assignments")
            .insert_header(("Authorization", format!("Bearer {refresh}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        // 学生访问教师接口
        let req = test::TestRequest::post()
            .uri("/api/v1/assignments")
            .insert_header(bearer(student.id))
            .set_json(json!({"title": "HW1", "due_date": "2024-03-01", "section_no": 100}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        // 不存在的课程班
        let req = test::TestRequest::get()
            .uri("/api/v1/sections/999/assignments")
            .insert_header(bearer(fixture.instructor.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 1004);

        // 非法路径参数
        let req = test::TestRequest::delete()
            .uri("/api/v1/assignments/abc")
            .insert_header(bearer(fixture.instructor.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        // 不存在的成绩
        let req = test::TestRequest::put()
            .uri("/api/v1/grades")
            .insert_header(bearer(fixture.instructor.id))
            .set_json(json!([{"grade_id": 31337, "section_no": 100, "score": 50}]))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Grade not found: 31337");

        // 查询他人作业
        let req = test::TestRequest::get()
            .uri(&format!(
                "/api/v1/assignments?student_id={}&year=2024&semester=Spring",
                student.id
            ))
            .insert_header(bearer(fixture.instructor.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        // 缺少查询参数
        let req = test::TestRequest::get()
            .uri("/api/v1/assignments?year=2024")
            .insert_header(bearer(student.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
