//! 用户实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub user_type: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::enrollments::Entity")]
    Enrollments,
}

impl Related<super::enrollments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_user(self) -> crate::models::users::entities::User {
        use crate::models::users::entities::{User, UserType};

        // 无法识别的类型按学生处理，不授予教师权限
        let user_type = self.user_type.parse::<UserType>().unwrap_or_else(|e| {
            tracing::warn!("User {} has unrecognized user_type: {}", self.id, e);
            UserType::Student
        });

        User {
            id: self.id,
            email: self.email,
            name: self.name,
            user_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserType;

    fn row(user_type: &str) -> Model {
        Model {
            id: 7,
            email: "x@x.edu".to_string(),
            name: "X".to_string(),
            user_type: user_type.to_string(),
        }
    }

    #[test]
    fn test_into_user_parses_known_types() {
        assert_eq!(row("INSTRUCTOR").into_user().user_type, UserType::Instructor);
        assert_eq!(row("STUDENT").into_user().user_type, UserType::Student);
    }

    #[test]
    fn test_unknown_type_never_grants_instructor() {
        let user = row("ADMIN").into_user();
        assert_eq!(user.user_type, UserType::Student);
        assert!(!user.is_instructor());
    }
}
