//! 课程班与选课存储操作

use super::SeaOrmStorage;
use crate::entity::enrollments::{Column as EnrollmentColumn, Entity as Enrollments};
use crate::entity::sections::Entity as Sections;
use crate::entity::terms::Entity as Terms;
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{GradebookError, Result};
use crate::models::sections::entities::{EnrolledStudent, Enrollment, Section};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

impl SeaOrmStorage {
    /// 通过课程班号获取课程班（连同学期）
    pub async fn get_section_by_no_impl(&self, section_no: i64) -> Result<Option<Section>> {
        let result = Sections::find_by_id(section_no)
            .find_also_related(Terms)
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询课程班失败: {e}")))?;

        match result {
            Some((section, Some(term))) => Ok(Some(section.into_section(term))),
            Some((section, None)) => Err(GradebookError::database_operation(format!(
                "课程班 {} 关联的学期 {} 不存在",
                section.section_no, section.term_id
            ))),
            None => Ok(None),
        }
    }

    /// 通过 ID 获取选课记录
    pub async fn get_enrollment_by_id_impl(&self, enrollment_id: i64) -> Result<Option<Enrollment>> {
        let result = Enrollments::find_by_id(enrollment_id)
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询选课记录失败: {e}")))?;

        Ok(result.map(|m| m.into_enrollment()))
    }

    /// 获取学生在某课程班的选课记录
    pub async fn get_enrollment_by_student_and_section_impl(
        &self,
        student_id: i64,
        section_no: i64,
    ) -> Result<Option<Enrollment>> {
        let result = Enrollments::find()
            .filter(EnrollmentColumn::StudentId.eq(student_id))
            .filter(EnrollmentColumn::SectionNo.eq(section_no))
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询选课记录失败: {e}")))?;

        Ok(result.map(|m| m.into_enrollment()))
    }

    /// 列出课程班的选课学生，按姓名升序，同名按选课 ID
    pub async fn list_enrollments_by_section_impl(
        &self,
        section_no: i64,
    ) -> Result<Vec<EnrolledStudent>> {
        let rows = Enrollments::find()
            .filter(EnrollmentColumn::SectionNo.eq(section_no))
            .find_also_related(Users)
            .order_by_asc(UserColumn::Name)
            .order_by_asc(EnrollmentColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询选课列表失败: {e}")))?;

        rows.into_iter()
            .map(|(enrollment, student)| match student {
                Some(student) => Ok(EnrolledStudent {
                    enrollment: enrollment.into_enrollment(),
                    student: student.into_user(),
                }),
                None => Err(GradebookError::database_operation(format!(
                    "选课记录 {} 关联的学生 {} 不存在",
                    enrollment.id, enrollment.student_id
                ))),
            })
            .collect()
    }
}
