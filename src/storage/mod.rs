use std::sync::Arc;

use chrono::NaiveDate;

use crate::models::{
    assignments::{entities::Assignment, requests::NewAssignment},
    grades::entities::Grade,
    sections::entities::{EnrolledStudent, Enrollment, Section},
    users::entities::User,
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户查询方法
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;

    /// 课程班与选课查询方法
    // 通过课程班号获取课程班（含学期）
    async fn get_section_by_no(&self, section_no: i64) -> Result<Option<Section>>;
    // 通过ID获取选课记录
    async fn get_enrollment_by_id(&self, enrollment_id: i64) -> Result<Option<Enrollment>>;
    // 获取学生在某课程班的选课记录
    async fn get_enrollment_by_student_and_section(
        &self,
        student_id: i64,
        section_no: i64,
    ) -> Result<Option<Enrollment>>;
    // 列出课程班的选课学生，按学生姓名升序
    async fn list_enrollments_by_section(&self, section_no: i64) -> Result<Vec<EnrolledStudent>>;

    /// 作业管理方法
    // 创建作业
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment>;
    // 通过ID获取作业
    async fn get_assignment_by_id(&self, assignment_id: i64) -> Result<Option<Assignment>>;
    // 列出课程班的作业，按截止日期升序
    async fn list_assignments_by_section(&self, section_no: i64) -> Result<Vec<Assignment>>;
    // 列出学生在指定学期所选课程班的作业，按截止日期升序
    async fn list_assignments_for_student(
        &self,
        student_id: i64,
        year: i32,
        semester: &str,
    ) -> Result<Vec<Assignment>>;
    // 更新作业标题与截止日期
    async fn update_assignment(
        &self,
        assignment_id: i64,
        title: String,
        due_date: NaiveDate,
    ) -> Result<Option<Assignment>>;
    // 删除作业及其成绩
    async fn delete_assignment(&self, assignment_id: i64) -> Result<bool>;

    /// 成绩管理方法
    // 通过ID获取成绩
    async fn get_grade_by_id(&self, grade_id: i64) -> Result<Option<Grade>>;
    // 获取或创建 (选课, 作业) 的成绩，并发调用也只会产生一条记录
    async fn get_or_create_grade(&self, enrollment_id: i64, assignment_id: i64) -> Result<Grade>;
    // 在单个事务中批量写入分数，任一成绩不存在则整体回滚
    async fn update_grade_scores(&self, scores: Vec<(i64, Option<f64>)>) -> Result<()>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
