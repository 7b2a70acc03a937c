use crate::config::AppConfig;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

pub const ACCESS_TOKEN_TYPE: &str = "access";

// JWT Claims 结构体，令牌由外部认证服务签发
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // Subject (user ID)
    pub token_type: String, // token类型: 只接受 "access"
    pub exp: usize,         // Expiration time (时间戳)
    pub iat: usize,         // Issued at (签发时间)
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse::<i64>().ok()
    }
}

pub struct JwtUtils;

impl JwtUtils {
    // 获取 JWT 密钥
    fn get_secret() -> String {
        AppConfig::get().jwt.secret.clone()
    }

    // 验证 JWT token
    pub fn verify_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::verify_token_with_secret(token, &Self::get_secret())
    }

    pub fn verify_token_with_secret(
        token: &str,
        secret: &str,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        let decoding_key = DecodingKey::from_secret(secret.as_ref());
        let validation = Validation::default();

        decode::<Claims>(token, &decoding_key, &validation).map(|token_data| token_data.claims)
    }

    // 验证 Access Token
    pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let claims = Self::verify_token(token)?;
        if claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidToken,
            ));
        }
        Ok(claims)
    }
}

/// 测试用令牌签发，与认证服务使用相同的 HS256 格式
#[cfg(test)]
pub(crate) fn issue_test_token(
    user_id: i64,
    token_type: &str,
    expiry: chrono::Duration,
    secret: &str,
) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        token_type: token_type.to_string(),
        exp: (now + expiry).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn test_verify_valid_token() {
        let token = issue_test_token(42, ACCESS_TOKEN_TYPE, chrono::Duration::minutes(5), SECRET);
        let claims = JwtUtils::verify_token_with_secret(&token, SECRET).unwrap();
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = issue_test_token(42, ACCESS_TOKEN_TYPE, chrono::Duration::minutes(5), SECRET);
        assert!(JwtUtils::verify_token_with_secret(&token, "another-secret").is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = issue_test_token(42, ACCESS_TOKEN_TYPE, chrono::Duration::hours(-2), SECRET);
        assert!(JwtUtils::verify_token_with_secret(&token, SECRET).is_err());
    }

    #[test]
    fn test_non_numeric_subject() {
        let claims = Claims {
            sub: "alice".to_string(),
            token_type: ACCESS_TOKEN_TYPE.to_string(),
            exp: 0,
            iat: 0,
        };
        assert_eq!(claims.user_id(), None);
    }
}
