use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::StudentService;
use crate::errors::{GradebookError, Result};
use crate::models::ApiResponse;
use crate::models::assignments::requests::StudentAssignmentsQuery;
use crate::models::assignments::responses::StudentAssignmentView;
use crate::models::sections::entities::Section;
use crate::models::users::entities::User;
use crate::services::{current_user, log_failure, policy};
use crate::storage::Storage;

pub async fn get_student_assignments(
    service: &StudentService,
    request: &HttpRequest,
    query: StudentAssignmentsQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let caller = current_user(request)?;

    let assignments = list_student_assignments(&storage, &caller, query)
        .await
        .map_err(|e| log_failure("List student assignments", &caller, e))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(assignments, "查询成功")))
}

/// 学生在指定学期的作业及分数，按截止日期升序
///
/// 只允许学生本人查询。尚无成绩记录的作业会以空分数补建。
pub(crate) async fn list_student_assignments(
    storage: &Arc<dyn Storage>,
    caller: &User,
    query: StudentAssignmentsQuery,
) -> Result<Vec<StudentAssignmentView>> {
    let student = storage
        .get_user_by_id(query.student_id)
        .await?
        .filter(User::is_student)
        .ok_or_else(|| {
            GradebookError::not_found(format!("Student not found: {}", query.student_id))
        })?;

    if caller.id != student.id {
        info!(
            "User {} tried to read assignments of student {}",
            caller.id, student.id
        );
        return Err(GradebookError::authorization(
            "Students may only view their own assignments",
        ));
    }

    let assignments = storage
        .list_assignments_for_student(student.id, query.year, &query.semester)
        .await?;

    let mut sections: HashMap<i64, Section> = HashMap::new();
    let mut views = Vec::with_capacity(assignments.len());

    for assignment in assignments {
        if !sections.contains_key(&assignment.section_no) {
            let section = policy::load_section(storage, assignment.section_no).await?;
            sections.insert(assignment.section_no, section);
        }
        let section = &sections[&assignment.section_no];

        let enrollment = storage
            .get_enrollment_by_student_and_section(student.id, section.section_no)
            .await?
            .ok_or_else(|| {
                GradebookError::not_found(format!(
                    "Enrollment not found: student {} in section {}",
                    student.id, section.section_no
                ))
            })?;

        let grade = storage
            .get_or_create_grade(enrollment.id, assignment.id)
            .await?;

        views.push(StudentAssignmentView {
            assignment_id: assignment.id,
            title: assignment.title,
            due_date: assignment.due_date,
            course_id: section.course_id.clone(),
            section_sec_id: section.sec_id,
            score: grade.score,
        });
    }

    Ok(views)
}
