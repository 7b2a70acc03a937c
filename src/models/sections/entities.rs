use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::users::entities::User;

// 学期：限定作业截止日期的有效区间
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "section.ts")]
pub struct Term {
    pub id: i64,
    pub year: i32,
    pub semester: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Term {
    /// 日期是否落在学期内（两端均包含）
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

// 课程班：某门课程在某学期的一次开课，由一名教师负责
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "section.ts")]
pub struct Section {
    pub section_no: i64,
    pub sec_id: i32,
    pub course_id: String,
    pub instructor_email: String,
    pub term: Term,
}

// 选课记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "section.ts")]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub section_no: i64,
}

// 选课记录及对应学生
#[derive(Debug, Clone)]
pub struct EnrolledStudent {
    pub enrollment: Enrollment,
    pub student: User,
}
