use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "staffhub_session";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub session_ttl_minutes: i64,
}

impl AuthConfig {
    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.jwt_secret.as_bytes())
    }

    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.jwt_secret.as_bytes())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::User => "USER",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "ADMIN" => Some(UserRole::Admin),
            "USER" => Some(UserRole::User),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        match self {
            UserRole::Admin => 2,
            UserRole::User => 1,
        }
    }
}

impl From<entity::user::Role> for UserRole {
    fn from(role: entity::user::Role) -> Self {
        match role {
            entity::user::Role::Admin => UserRole::Admin,
            entity::user::Role::User => UserRole::User,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.role.level() >= role.level()
    }
}

pub fn issue_token(
    user_id: Uuid,
    role: UserRole,
    config: &AuthConfig,
) -> jsonwebtoken::errors::Result<String> {
    let now = Utc::now();
    let exp = now
        .checked_add_signed(Duration::minutes(config.session_ttl_minutes))
        .unwrap_or(now)
        .timestamp() as usize;
    let claims = SessionClaims {
        sub: user_id,
        role: role.as_str().to_string(),
        exp,
        iat: now.timestamp() as usize,
    };
    jsonwebtoken::encode(&Header::default(), &claims, &config.encoding_key())
}

pub fn decode_token(
    token: &str,
    config: &AuthConfig,
) -> jsonwebtoken::errors::Result<SessionClaims> {
    jsonwebtoken::decode::<SessionClaims>(token, &config.decoding_key(), &Validation::default())
        .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "unit-test-secret".into(),
            session_ttl_minutes: 30,
        }
    }

    #[test]
    fn token_round_trip_preserves_subject_and_role() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, UserRole::Admin, &config()).unwrap();
        let claims = decode_token(&token, &config()).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, "ADMIN");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issue_token(Uuid::new_v4(), UserRole::User, &config()).unwrap();
        let other = AuthConfig {
            jwt_secret: "different-secret".into(),
            session_ttl_minutes: 30,
        };
        assert!(decode_token(&token, &other).is_err());
    }

    #[test]
    fn role_ordering_grants_admin_everything() {
        let admin = CurrentUser {
            user_id: Uuid::new_v4(),
            role: UserRole::Admin,
        };
        let user = CurrentUser {
            user_id: Uuid::new_v4(),
            role: UserRole::User,
        };
        assert!(admin.has_role(UserRole::User));
        assert!(admin.has_role(UserRole::Admin));
        assert!(user.has_role(UserRole::User));
        assert!(!user.has_role(UserRole::Admin));
    }
}
