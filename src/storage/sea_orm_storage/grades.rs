//! 成绩存储操作

use super::SeaOrmStorage;
use crate::entity::grades::{ActiveModel, Column, Entity as Grades};
use crate::errors::{GradebookError, Result};
use crate::models::grades::entities::Grade;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
    TransactionTrait, sea_query::OnConflict,
};

impl SeaOrmStorage {
    /// 通过 ID 获取成绩
    pub async fn get_grade_by_id_impl(&self, grade_id: i64) -> Result<Option<Grade>> {
        let result = Grades::find_by_id(grade_id)
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询成绩失败: {e}")))?;

        Ok(result.map(|m| m.into_grade()))
    }

    /// 获取或创建成绩
    ///
    /// 依赖 (enrollment_id, assignment_id) 唯一索引：插入冲突时什么也不做，
    /// 然后重新读取。并发的两个调用者最终读到的是同一条记录。
    pub async fn get_or_create_grade_impl(
        &self,
        enrollment_id: i64,
        assignment_id: i64,
    ) -> Result<Grade> {
        let model = ActiveModel {
            enrollment_id: Set(enrollment_id),
            assignment_id: Set(assignment_id),
            score: Set(None),
            ..Default::default()
        };

        let inserted = Grades::insert(model)
            .on_conflict(
                OnConflict::columns([Column::EnrollmentId, Column::AssignmentId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("创建成绩失败: {e}")))?;

        if inserted > 0 {
            tracing::debug!(
                "Created empty grade for enrollment {} / assignment {}",
                enrollment_id,
                assignment_id
            );
        }

        Grades::find()
            .filter(Column::EnrollmentId.eq(enrollment_id))
            .filter(Column::AssignmentId.eq(assignment_id))
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询成绩失败: {e}")))?
            .map(|m| m.into_grade())
            .ok_or_else(|| {
                GradebookError::database_operation(format!(
                    "成绩记录在写入后丢失: enrollment {enrollment_id}, assignment {assignment_id}"
                ))
            })
    }

    /// 批量写入分数（全部成功或全部回滚）
    pub async fn update_grade_scores_impl(&self, scores: Vec<(i64, Option<f64>)>) -> Result<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradebookError::database_operation(format!("开启事务失败: {e}")))?;

        for (grade_id, score) in scores {
            let existing = Grades::find_by_id(grade_id)
                .one(&txn)
                .await
                .map_err(|e| GradebookError::database_operation(format!("查询成绩失败: {e}")))?;

            // 事务在 drop 时回滚
            let Some(existing) = existing else {
                return Err(GradebookError::not_found(format!(
                    "Grade not found: {grade_id}"
                )));
            };

            let mut model = existing.into_active_model();
            model.score = Set(score);
            model
                .update(&txn)
                .await
                .map_err(|e| GradebookError::database_operation(format!("更新成绩失败: {e}")))?;
        }

        txn.commit()
            .await
            .map_err(|e| GradebookError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(())
    }
}
