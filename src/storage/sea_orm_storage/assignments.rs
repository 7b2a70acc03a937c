//! 作业存储操作

use super::SeaOrmStorage;
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments, Relation};
use crate::entity::enrollments::Column as EnrollmentColumn;
use crate::entity::grades::{Column as GradeColumn, Entity as Grades};
use crate::entity::sections::Relation as SectionRelation;
use crate::entity::terms::Column as TermColumn;
use crate::errors::{GradebookError, Result};
use crate::models::assignments::{entities::Assignment, requests::NewAssignment};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建作业
    pub async fn create_assignment_impl(&self, req: NewAssignment) -> Result<Assignment> {
        let model = ActiveModel {
            title: Set(req.title),
            due_date: Set(req.due_date),
            section_no: Set(req.section_no),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("创建作业失败: {e}")))?;

        Ok(result.into_assignment())
    }

    /// 通过 ID 获取作业
    pub async fn get_assignment_by_id_impl(&self, assignment_id: i64) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(assignment_id)
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询作业失败: {e}")))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    /// 列出课程班的作业，按截止日期升序
    pub async fn list_assignments_by_section_impl(&self, section_no: i64) -> Result<Vec<Assignment>> {
        let assignments = Assignments::find()
            .filter(Column::SectionNo.eq(section_no))
            .order_by_asc(Column::DueDate)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询作业列表失败: {e}")))?;

        Ok(assignments.into_iter().map(|m| m.into_assignment()).collect())
    }

    /// 列出学生在指定学期所选课程班的全部作业
    pub async fn list_assignments_for_student_impl(
        &self,
        student_id: i64,
        year: i32,
        semester: &str,
    ) -> Result<Vec<Assignment>> {
        let assignments = Assignments::find()
            .join(JoinType::InnerJoin, Relation::Section.def())
            .join(JoinType::InnerJoin, SectionRelation::Term.def())
            .join(JoinType::InnerJoin, SectionRelation::Enrollments.def())
            .filter(EnrollmentColumn::StudentId.eq(student_id))
            .filter(TermColumn::Year.eq(year))
            .filter(TermColumn::Semester.eq(semester))
            .order_by_asc(Column::DueDate)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询学生作业失败: {e}")))?;

        Ok(assignments.into_iter().map(|m| m.into_assignment()).collect())
    }

    /// 更新作业标题与截止日期，所属课程班不变
    pub async fn update_assignment_impl(
        &self,
        assignment_id: i64,
        title: String,
        due_date: NaiveDate,
    ) -> Result<Option<Assignment>> {
        // 先检查作业是否存在
        let existing = self.get_assignment_by_id_impl(assignment_id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let model = ActiveModel {
            id: Set(assignment_id),
            title: Set(title),
            due_date: Set(due_date),
            ..Default::default()
        };

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("更新作业失败: {e}")))?;

        Ok(Some(result.into_assignment()))
    }

    /// 删除作业，同一事务内级联删除其成绩
    pub async fn delete_assignment_impl(&self, assignment_id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradebookError::database_operation(format!("开启事务失败: {e}")))?;

        let removed_grades = Grades::delete_many()
            .filter(GradeColumn::AssignmentId.eq(assignment_id))
            .exec(&txn)
            .await
            .map_err(|e| GradebookError::database_operation(format!("删除作业成绩失败: {e}")))?;

        let result = Assignments::delete_by_id(assignment_id)
            .exec(&txn)
            .await
            .map_err(|e| GradebookError::database_operation(format!("删除作业失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| GradebookError::database_operation(format!("提交事务失败: {e}")))?;

        tracing::debug!(
            "Assignment {} deleted together with {} grade(s)",
            assignment_id,
            removed_grades.rows_affected
        );

        Ok(result.rows_affected > 0)
    }
}
