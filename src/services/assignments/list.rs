use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AssignmentService;
use crate::errors::Result;
use crate::models::ApiResponse;
use crate::models::assignments::responses::AssignmentSummary;
use crate::models::users::entities::User;
use crate::services::{current_user, log_failure, policy};
use crate::storage::Storage;

pub async fn list_assignments(
    service: &AssignmentService,
    request: &HttpRequest,
    section_no: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let caller = current_user(request)?;

    let assignments = list_section_assignments(&storage, &caller, section_no)
        .await
        .map_err(|e| log_failure("List assignments", &caller, e))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(assignments, "查询成功")))
}

/// 课程班作业列表，按截止日期升序
pub(crate) async fn list_section_assignments(
    storage: &Arc<dyn Storage>,
    caller: &User,
    section_no: i64,
) -> Result<Vec<AssignmentSummary>> {
    let section = policy::load_section(storage, section_no).await?;
    policy::ensure_section_instructor(caller, &section)?;

    let assignments = storage.list_assignments_by_section(section_no).await?;

    Ok(assignments
        .into_iter()
        .map(|assignment| AssignmentSummary::from_parts(assignment, &section))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GradebookError;
    use crate::models::assignments::requests::NewAssignment;
    use crate::models::users::entities::UserType;
    use crate::test_support::{Spring2024, date};

    async fn seed(fixture: &Spring2024, title: &str, due_date: chrono::NaiveDate) -> i64 {
        fixture
            .storage()
            .create_assignment(NewAssignment {
                section_no: Spring2024::SECTION_NO,
                title: title.to_string(),
                due_date,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_lists_in_due_date_order() {
        let fixture = Spring2024::new().await;
        let late = seed(&fixture, "Project", date(2024, 4, 20)).await;
        let early = seed(&fixture, "HW1", date(2024, 2, 1)).await;
        let tie = seed(&fixture, "HW2", date(2024, 2, 1)).await;

        let list = list_section_assignments(fixture.storage(), &fixture.instructor, 100)
            .await
            .unwrap();

        let ids: Vec<i64> = list.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![early, tie, late]);
        assert!(list.iter().all(|a| a.course_id == "cst363" && a.section_sec_id == 1));
        assert!(list.iter().all(|a| a.section_no == 100));
    }

    #[tokio::test]
    async fn test_only_section_instructor_may_list() {
        let fixture = Spring2024::new().await;
        let other = fixture
            .db
            .user("other@x.edu", "Prof Bob", UserType::Instructor)
            .await;
        let (student, _) = fixture.student("s1@x.edu", "Sam").await;

        for caller in [other, student] {
            let err = list_section_assignments(fixture.storage(), &caller, 100)
                .await
                .unwrap_err();
            assert!(matches!(err, GradebookError::Authorization(_)));
        }
    }

    #[tokio::test]
    async fn test_unknown_section_is_not_found() {
        let fixture = Spring2024::new().await;
        let err = list_section_assignments(fixture.storage(), &fixture.instructor, 999)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(err.message().contains("999"));
    }
}
