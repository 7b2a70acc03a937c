use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 用户类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "user.ts")]
pub enum UserType {
    Instructor, // 教师
    Student,    // 学生
}

impl UserType {
    pub const INSTRUCTOR: &'static str = "INSTRUCTOR";
    pub const STUDENT: &'static str = "STUDENT";
}

impl<'de> Deserialize<'de> for UserType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<UserType>().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserType::Instructor => write!(f, "{}", UserType::INSTRUCTOR),
            UserType::Student => write!(f, "{}", UserType::STUDENT),
        }
    }
}

impl std::str::FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            UserType::INSTRUCTOR => Ok(UserType::Instructor),
            UserType::STUDENT => Ok(UserType::Student),
            _ => Err(format!(
                "Invalid user type: '{s}'. Supported types: INSTRUCTOR, STUDENT"
            )),
        }
    }
}

// 用户实体（身份由外部认证服务维护，本服务只读）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "user.ts")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub user_type: UserType,
}

impl User {
    pub fn is_instructor(&self) -> bool {
        self.user_type == UserType::Instructor
    }

    pub fn is_student(&self) -> bool {
        self.user_type == UserType::Student
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_type_round_trip_through_strings() {
        assert_eq!("INSTRUCTOR".parse::<UserType>(), Ok(UserType::Instructor));
        assert_eq!(UserType::Student.to_string(), "STUDENT");
        assert!("teacher".parse::<UserType>().is_err());
    }

    #[test]
    fn test_user_type_json_shape() {
        let json = serde_json::to_string(&UserType::Instructor).unwrap();
        assert_eq!(json, "\"INSTRUCTOR\"");
        let parsed: UserType = serde_json::from_str("\"STUDENT\"").unwrap();
        assert_eq!(parsed, UserType::Student);
    }
}
