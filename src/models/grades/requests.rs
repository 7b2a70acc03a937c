use serde::Deserialize;
use ts_rs::TS;

/// 批量上传成绩中的一项
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct GradeUpdate {
    pub grade_id: i64,
    // 成绩所属课程班，必须与成绩实际所属课程班一致
    pub section_no: i64,
    // null 表示清空分数
    pub score: Option<f64>,
}
