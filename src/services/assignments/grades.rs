use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::debug;

use super::AssignmentService;
use crate::errors::Result;
use crate::models::ApiResponse;
use crate::models::grades::responses::GradeView;
use crate::models::users::entities::User;
use crate::services::{current_user, log_failure, policy};
use crate::storage::Storage;

pub async fn get_assignment_grades(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let caller = current_user(request)?;

    let grades = list_assignment_grades(&storage, &caller, assignment_id)
        .await
        .map_err(|e| log_failure("List assignment grades", &caller, e))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(grades, "查询成功")))
}

/// 作业下每个选课学生一条成绩，按学生姓名升序
///
/// 尚无成绩记录的选课会以空分数补建，重复调用返回同一批成绩 ID。
pub(crate) async fn list_assignment_grades(
    storage: &Arc<dyn Storage>,
    caller: &User,
    assignment_id: i64,
) -> Result<Vec<GradeView>> {
    let (assignment, section) = policy::load_owned_assignment(storage, caller, assignment_id).await?;

    let enrolled = storage
        .list_enrollments_by_section(section.section_no)
        .await?;

    let mut views = Vec::with_capacity(enrolled.len());
    for entry in enrolled {
        let grade = storage
            .get_or_create_grade(entry.enrollment.id, assignment.id)
            .await?;

        views.push(GradeView {
            grade_id: grade.id,
            student_name: entry.student.name,
            student_email: entry.student.email,
            assignment_title: assignment.title.clone(),
            course_id: section.course_id.clone(),
            section_sec_id: section.sec_id,
            score: grade.score,
        });
    }

    debug!(
        "Resolved {} grade(s) for assignment {}",
        views.len(),
        assignment.id
    );
    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GradebookError;
    use crate::models::assignments::requests::NewAssignment;
    use crate::test_support::{Spring2024, TestDb, date, remove_db_files, scratch_db_path};

    async fn seed_hw1(fixture: &Spring2024) -> i64 {
        fixture
            .storage()
            .create_assignment(NewAssignment {
                section_no: Spring2024::SECTION_NO,
                title: "HW1".to_string(),
                due_date: date(2024, 3, 1),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_three_students_get_three_new_empty_grades() {
        let fixture = Spring2024::new().await;
        let id = seed_hw1(&fixture).await;
        fixture.student("c@x.edu", "Cleo").await;
        fixture.student("a@x.edu", "Ann").await;
        fixture.student("b@x.edu", "Ben").await;
        assert_eq!(fixture.db.grade_count(id).await, 0);

        let views = list_assignment_grades(fixture.storage(), &fixture.instructor, id)
            .await
            .unwrap();

        assert_eq!(views.len(), 3);
        assert!(views.iter().all(|v| v.score.is_none()));
        let names: Vec<&str> = views.iter().map(|v| v.student_name.as_str()).collect();
        assert_eq!(names, vec!["Ann", "Ben", "Cleo"]);
        assert!(views.iter().all(|v| v.assignment_title == "HW1"));
        assert!(views.iter().all(|v| v.course_id == "cst363" && v.section_sec_id == 1));
        assert_eq!(fixture.db.grade_count(id).await, 3);
    }

    #[tokio::test]
    async fn test_repeated_reads_return_same_grade_ids() {
        let fixture = Spring2024::new().await;
        let id = seed_hw1(&fixture).await;
        fixture.student("a@x.edu", "Ann").await;
        fixture.student("b@x.edu", "Ben").await;

        let first: Vec<i64> = list_assignment_grades(fixture.storage(), &fixture.instructor, id)
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.grade_id)
            .collect();
        let second: Vec<i64> = list_assignment_grades(fixture.storage(), &fixture.instructor, id)
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.grade_id)
            .collect();

        assert_eq!(first, second);
        assert_eq!(fixture.db.grade_count(id).await, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_lazy_creation_yields_one_row() {
        let path = scratch_db_path("lazy-grade");
        let fixture = Spring2024::seed(TestDb::file_backed(&path, 4).await).await;
        let id = seed_hw1(&fixture).await;
        let (_, enrollment_id) = fixture.student("a@x.edu", "Ann").await;

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let storage = Arc::clone(fixture.storage());
                tokio::spawn(async move { storage.get_or_create_grade(enrollment_id, id).await })
            })
            .collect();

        let mut grade_ids = Vec::new();
        for handle in handles {
            grade_ids.push(handle.await.unwrap().unwrap().id);
        }
        grade_ids.dedup();

        assert_eq!(grade_ids.len(), 1);
        assert_eq!(fixture.db.grade_count(id).await, 1);

        drop(fixture);
        remove_db_files(&path);
    }

    #[tokio::test]
    async fn test_students_cannot_read_grade_sheet() {
        let fixture = Spring2024::new().await;
        let id = seed_hw1(&fixture).await;
        let (student, _) = fixture.student("a@x.edu", "Ann").await;

        let err = list_assignment_grades(fixture.storage(), &student, id)
            .await
            .unwrap_err();
        assert!(matches!(err, GradebookError::Authorization(_)));
        assert_eq!(fixture.db.grade_count(id).await, 0);
    }
}
