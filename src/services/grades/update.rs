use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::GradeService;
use crate::config::AppConfig;
use crate::errors::{GradebookError, Result};
use crate::models::ApiResponse;
use crate::models::grades::requests::GradeUpdate;
use crate::models::sections::entities::Section;
use crate::models::users::entities::User;
use crate::services::{current_user, log_failure, policy};
use crate::storage::Storage;

pub async fn update_grades(
    service: &GradeService,
    request: &HttpRequest,
    updates: Vec<GradeUpdate>,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let caller = current_user(request)?;
    let max_score = AppConfig::get().gradebook.max_score;

    apply_grade_updates(&storage, &caller, updates, max_score)
        .await
        .map_err(|e| log_failure("Update grades", &caller, e))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_empty("成绩已更新")))
}

/// 批量写入分数
///
/// 先逐项校验（成绩存在、调用者为该课程班教师、课程班一致、分数合法），
/// 全部通过后在一个事务中写入。任一项失败则不写入任何数据。
pub(crate) async fn apply_grade_updates(
    storage: &Arc<dyn Storage>,
    caller: &User,
    updates: Vec<GradeUpdate>,
    max_score: f64,
) -> Result<usize> {
    if updates.is_empty() {
        return Ok(0);
    }

    let mut sections: HashMap<i64, Section> = HashMap::new();
    let mut scores = Vec::with_capacity(updates.len());

    for update in &updates {
        let grade = storage
            .get_grade_by_id(update.grade_id)
            .await?
            .ok_or_else(|| {
                GradebookError::not_found(format!("Grade not found: {}", update.grade_id))
            })?;

        let enrollment = storage
            .get_enrollment_by_id(grade.enrollment_id)
            .await?
            .ok_or_else(|| {
                GradebookError::not_found(format!(
                    "Enrollment not found: {} (grade {})",
                    grade.enrollment_id, grade.id
                ))
            })?;

        if !sections.contains_key(&enrollment.section_no) {
            let section = policy::load_section(storage, enrollment.section_no).await?;
            sections.insert(enrollment.section_no, section);
        }
        policy::ensure_section_instructor(caller, &sections[&enrollment.section_no])?;

        if enrollment.section_no != update.section_no {
            return Err(GradebookError::validation(format!(
                "Grade {} does not belong to section {}",
                grade.id, update.section_no
            )));
        }

        policy::validate_score(grade.id, update.score, max_score)?;
        scores.push((grade.id, update.score));
    }

    let count = scores.len();
    storage.update_grade_scores(scores).await?;

    info!(
        "{} grade(s) updated by {} in section(s) {:?}",
        count,
        caller.email,
        sections.keys().collect::<Vec<_>>()
    );
    Ok(count)
}
