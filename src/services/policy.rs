//! 作业与成绩操作共享的授权与校验规则
//!
//! 所有检查都以显式传入的调用者为准，从不根据被检查的实体反推其所有者。

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::errors::{GradebookError, Result};
use crate::models::assignments::entities::Assignment;
use crate::models::sections::entities::{Section, Term};
use crate::models::users::entities::User;
use crate::storage::Storage;

pub const MAX_TITLE_LENGTH: usize = 255;

/// 调用者是否为课程班教师
pub fn is_section_instructor(caller: &User, section: &Section) -> bool {
    caller.is_instructor() && caller.email == section.instructor_email
}

pub fn ensure_section_instructor(caller: &User, section: &Section) -> Result<()> {
    if is_section_instructor(caller, section) {
        return Ok(());
    }

    info!(
        "User {} ({}) is not the instructor of section {}",
        caller.id, caller.email, section.section_no
    );
    Err(GradebookError::authorization(format!(
        "Only the instructor of section {} may perform this operation",
        section.section_no
    )))
}

/// 校验标题并返回去除首尾空白后的值
pub fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(GradebookError::validation("Assignment title must not be blank"));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(GradebookError::validation(format!(
            "Assignment title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub fn ensure_due_date_in_term(due_date: NaiveDate, term: &Term) -> Result<()> {
    if term.contains(due_date) {
        Ok(())
    } else {
        Err(GradebookError::validation(format!(
            "Due date {due_date} is outside of the course term ({} to {})",
            term.start_date, term.end_date
        )))
    }
}

/// 分数为空表示清空，否则必须是 [0, max_score] 内的有限数
pub fn validate_score(grade_id: i64, score: Option<f64>, max_score: f64) -> Result<()> {
    match score {
        None => Ok(()),
        Some(value) if value.is_finite() && (0.0..=max_score).contains(&value) => Ok(()),
        Some(value) => Err(GradebookError::validation(format!(
            "Score {value} for grade {grade_id} is out of range [0, {max_score}]"
        ))),
    }
}

pub async fn load_section(storage: &Arc<dyn Storage>, section_no: i64) -> Result<Section> {
    storage
        .get_section_by_no(section_no)
        .await?
        .ok_or_else(|| GradebookError::not_found(format!("Section not found: {section_no}")))
}

pub async fn load_assignment(storage: &Arc<dyn Storage>, assignment_id: i64) -> Result<Assignment> {
    storage
        .get_assignment_by_id(assignment_id)
        .await?
        .ok_or_else(|| GradebookError::not_found(format!("Assignment not found: {assignment_id}")))
}

/// 加载作业及其所属课程班，并要求调用者为该课程班教师
pub async fn load_owned_assignment(
    storage: &Arc<dyn Storage>,
    caller: &User,
    assignment_id: i64,
) -> Result<(Assignment, Section)> {
    let assignment = load_assignment(storage, assignment_id).await?;
    let section = load_section(storage, assignment.section_no).await?;
    ensure_section_instructor(caller, &section)?;
    Ok((assignment, section))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn section_100() -> Section {
        Section {
            section_no: 100,
            sec_id: 1,
            course_id: "cst363".to_string(),
            instructor_email: "prof@x.edu".to_string(),
            term: Term {
                id: 1,
                year: 2024,
                semester: "Spring".to_string(),
                start_date: date(2024, 1, 1),
                end_date: date(2024, 5, 1),
            },
        }
    }

    fn user(email: &str, user_type: UserType) -> User {
        User {
            id: 1,
            email: email.to_string(),
            name: "Someone".to_string(),
            user_type,
        }
    }

    #[test]
    fn test_instructor_predicate_uses_caller_identity() {
        let section = section_100();
        assert!(is_section_instructor(
            &user("prof@x.edu", UserType::Instructor),
            &section
        ));
        assert!(!is_section_instructor(
            &user("other@x.edu", UserType::Instructor),
            &section
        ));
        // 邮箱相同但不是教师类型
        assert!(!is_section_instructor(
            &user("prof@x.edu", UserType::Student),
            &section
        ));
    }

    #[test]
    fn test_denied_caller_maps_to_authorization_error() {
        let err = ensure_section_instructor(&user("other@x.edu", UserType::Instructor), &section_100())
            .unwrap_err();
        assert!(matches!(err, GradebookError::Authorization(_)));
    }

    #[test]
    fn test_validate_title() {
        assert_eq!(validate_title("  HW1 ").unwrap(), "HW1");
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH)).is_ok());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_due_date_window_is_inclusive() {
        let term = section_100().term;
        assert!(ensure_due_date_in_term(date(2024, 1, 1), &term).is_ok());
        assert!(ensure_due_date_in_term(date(2024, 5, 1), &term).is_ok());
        assert!(ensure_due_date_in_term(date(2023, 12, 31), &term).is_err());
        assert!(ensure_due_date_in_term(date(2024, 6, 1), &term).is_err());
    }

    #[test]
    fn test_validate_score() {
        assert!(validate_score(1, None, 100.0).is_ok());
        assert!(validate_score(1, Some(0.0), 100.0).is_ok());
        assert!(validate_score(1, Some(100.0), 100.0).is_ok());
        assert!(validate_score(1, Some(-0.5), 100.0).is_err());
        assert!(validate_score(1, Some(100.5), 100.0).is_err());
        assert!(validate_score(1, Some(f64::NAN), 100.0).is_err());
        assert!(validate_score(1, Some(f64::INFINITY), 100.0).is_err());
    }
}
