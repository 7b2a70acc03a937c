use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AssignmentService;
use crate::errors::{GradebookError, Result};
use crate::models::ApiResponse;
use crate::models::users::entities::User;
use crate::services::{current_user, log_failure, policy};
use crate::storage::Storage;

pub async fn delete_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let caller = current_user(request)?;

    delete_section_assignment(&storage, &caller, assignment_id)
        .await
        .map_err(|e| log_failure("Delete assignment", &caller, e))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_empty("作业已删除")))
}

/// 删除作业，其成绩在同一事务中一并删除
pub(crate) async fn delete_section_assignment(
    storage: &Arc<dyn Storage>,
    caller: &User,
    assignment_id: i64,
) -> Result<()> {
    let (assignment, section) = policy::load_owned_assignment(storage, caller, assignment_id).await?;

    if !storage.delete_assignment(assignment.id).await? {
        return Err(GradebookError::not_found(format!(
            "Assignment not found: {assignment_id}"
        )));
    }

    info!(
        "Assignment {} deleted from section {} by {}",
        assignment.id, section.section_no, caller.email
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::requests::NewAssignment;
    use crate::test_support::{Spring2024, date};

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
    async fn test_non_instructor_delete_is_unauthorized_and_assignment_survives() {
        let fixture = Spring2024::new().await;
        let id = seed_hw1(&fixture).await;
        let (student, _) = fixture.student("s1@x.edu", "Sam").await;

        let err = delete_section_assignment(fixture.storage(), &student, id)
            .await
            .unwrap_err();
        assert!(matches!(err, GradebookError::Authorization(_)));

        assert!(
            fixture
                .storage()
                .get_assignment_by_id(id)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_delete_cascades_to_grades() {
        let fixture = Spring2024::new().await;
        let id = seed_hw1(&fixture).await;
        let (_, enrollment_a) = fixture.student("a@x.edu", "Ann").await;
        let (_, enrollment_b) = fixture.student("b@x.edu", "Ben").await;
        for enrollment_id in [enrollment_a, enrollment_b] {
            fixture
                .storage()
                .get_or_create_grade(enrollment_id, id)
                .await
                .unwrap();
        }
        assert_eq!(fixture.db.grade_count(id).await, 2);

        delete_section_assignment(fixture.storage(), &fixture.instructor, id)
            .await
            .unwrap();

        assert!(
            fixture
                .storage()
                .get_assignment_by_id(id)
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(fixture.db.grade_count(id).await, 0);
    }

    #[tokio::test]
    async fn test_delete_missing_assignment_is_not_found() {
        let fixture = Spring2024::new().await;
        let err = delete_section_assignment(fixture.storage(), &fixture.instructor, 5)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
