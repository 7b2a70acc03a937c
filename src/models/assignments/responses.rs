use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::assignments::entities::Assignment;
use crate::models::sections::entities::Section;

/// 教师视角的作业摘要
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentSummary {
    pub id: i64,
    pub title: String,
    pub due_date: NaiveDate,
    pub course_id: String,
    pub section_sec_id: i32,
    pub section_no: i64,
}

impl AssignmentSummary {
    pub fn from_parts(assignment: Assignment, section: &Section) -> Self {
        Self {
            id: assignment.id,
            title: assignment.title,
            due_date: assignment.due_date,
            course_id: section.course_id.clone(),
            section_sec_id: section.sec_id,
            section_no: section.section_no,
        }
    }
}

/// 学生视角的作业及成绩
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct StudentAssignmentView {
    pub assignment_id: i64,
    pub title: String,
    pub due_date: NaiveDate,
    pub course_id: String,
    pub section_sec_id: i32,
    pub score: Option<f64>,
}
