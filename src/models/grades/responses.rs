use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 教师视角的某份作业下单个学生的成绩
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct GradeView {
    pub grade_id: i64,
    pub student_name: String,
    pub student_email: String,
    pub assignment_title: String,
    pub course_id: String,
    pub section_sec_id: i32,
    pub score: Option<f64>,
}
