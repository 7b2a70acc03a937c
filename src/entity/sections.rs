//! 课程班实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sections")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub section_no: i64,
    pub sec_id: i32,
    pub course_id: String,
    pub term_id: i64,
    pub instructor_email: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::terms::Entity",
        from = "Column::TermId",
        to = "super::terms::Column::Id"
    )]
    Term,
    #[sea_orm(has_many = "super::enrollments::Entity")]
    Enrollments,
    #[sea_orm(has_many = "super::assignments::Entity")]
    Assignments,
}

impl Related<super::terms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Term.def()
    }
}

impl Related<super::enrollments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl Related<super::assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型，学期需由调用方一并查出
impl Model {
    pub fn into_section(
        self,
        term: super::terms::Model,
    ) -> crate::models::sections::entities::Section {
        crate::models::sections::entities::Section {
            section_no: self.section_no,
            sec_id: self.sec_id,
            course_id: self.course_id,
            instructor_email: self.instructor_email,
            term: term.into_term(),
        }
    }
}
