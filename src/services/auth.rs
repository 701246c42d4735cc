//! Вход по email и паролю, JWT-сессии, профиль.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::config::{AuthConfig, JwtConfig};
use crate::error::AppError;
use crate::models::{User, UserProfile, UserRole};
use crate::repository::Repository;
use crate::services::sql_logger::QueryLog;
use crate::store::UpsertUser;

/// Содержимое токена сессии.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub name: Option<String>,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionTokens {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: Duration::hours(config.expires_in_hours),
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token encoding failed: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                warn!("rejected session token: {}", e);
                AppError::Unauthorized
            })
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "некорректный email"))]
    pub email: String,
    #[validate(length(min = 1, max = 128, message = "пароль обязателен"))]
    pub password: String,
    #[validate(length(max = 200))]
    pub name: Option<String>,
}

/// Пользователь текущей сессии.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub role: UserRole,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self { id: user.id, email: user.email.clone(), name: user.name.clone(), role: user.role }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: SessionUser,
}

/// Первый вход создаёт пользователя, повторный проверяет пароль и
/// обновляет время входа. Владелец (OWNER_EMAIL) получает роль admin.
pub async fn login(
    repo: &Repository,
    tokens: &SessionTokens,
    auth: &AuthConfig,
    req: LoginRequest,
) -> Result<LoginResponse, AppError> {
    req.validate()?;
    let email = req.email.trim().to_lowercase();

    let lookup = QueryLog::new("auth.login", "SELECT * FROM users WHERE email = $1")
        .params(&serde_json::json!({ "email": email }));
    let existing = {
        let email = email.clone();
        repo.read(lookup, move |s| async move { s.find_user_by_email(&email).await })
            .await?
    };

    let password_hash = match &existing {
        Some(user) => {
            let stored = user.password_hash.clone().ok_or(AppError::Unauthorized)?;
            if !verify_password(req.password, stored).await? {
                warn!("failed login for user {}", user.id);
                return Err(AppError::Unauthorized);
            }
            None
        }
        None => Some(hash_password(req.password, auth.bcrypt_cost).await?),
    };

    let role = (auth.owner_email.as_deref() == Some(email.as_str())).then_some(UserRole::Admin);
    let upsert = UpsertUser {
        email: email.clone(),
        name: req.name.filter(|n| !n.trim().is_empty()),
        password_hash,
        login_method: "password".to_string(),
        role,
    };
    let log = QueryLog::new(
        "auth.login",
        "INSERT INTO users (...) ON CONFLICT (email) DO UPDATE SET last_signed_in = NOW()",
    )
    .params(&serde_json::json!({ "email": email }));
    let user = repo
        .write(log, move |s| async move { s.upsert_user(upsert).await })
        .await?;

    let token = tokens.issue(&user)?;
    info!(
        "User {} signed in ({})",
        user.id,
        if existing.is_some() { "returning" } else { "new" }
    );
    Ok(LoginResponse { success: true, token, user: SessionUser::from(&user) })
}

pub async fn profile(repo: &Repository, user_id: i64) -> Result<Option<UserProfile>, AppError> {
    let log = QueryLog::new(
        "users.getProfile",
        format!("SELECT id, name, email, phone, avatar, bio, specialization, points, status FROM users WHERE id = {}", user_id),
    )
    .user(user_id)
    .params(&serde_json::json!({ "userId": user_id }));
    let user = repo
        .read(log, move |s| async move { s.find_user(user_id).await })
        .await?;
    Ok(user.map(|u| u.profile()))
}

async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| AppError::Internal(e.to_string()))
}

async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| AppError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(hours: i64) -> SessionTokens {
        SessionTokens::new(&JwtConfig { secret: "test-secret".to_string(), expires_in_hours: hours })
    }

    fn user() -> User {
        let now = Utc::now();
        User {
            id: 17,
            email: "orlova.maria@example.com".to_string(),
            name: Some("Орлова Мария".to_string()),
            password_hash: None,
            login_method: Some("password".to_string()),
            role: UserRole::Admin,
            phone: None,
            avatar: None,
            bio: None,
            specialization: None,
            points: 0,
            status: crate::models::RewardStatus::Bronze,
            created_at: now,
            updated_at: now,
            last_signed_in: now,
        }
    }

    #[test]
    fn issued_token_verifies() {
        let tokens = tokens(24);
        let token = tokens.issue(&user()).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, 17);
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.email, "orlova.maria@example.com");
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = tokens(-2);
        let token = tokens.issue(&user()).unwrap();
        assert!(matches!(tokens.verify(&token), Err(AppError::Unauthorized)));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = tokens(24).issue(&user()).unwrap();
        let other = SessionTokens::new(&JwtConfig { secret: "other".to_string(), expires_in_hours: 24 });
        assert!(matches!(other.verify(&token), Err(AppError::Unauthorized)));
        assert!(matches!(other.verify("not-a-token"), Err(AppError::Unauthorized)));
    }

    #[test]
    fn login_request_requires_email_and_password() {
        let req = LoginRequest { email: "bad".into(), password: String::new(), name: None };
        let err: AppError = req.validate().unwrap_err().into();
        let AppError::Validation(message) = err else { panic!("expected validation error") };
        assert!(message.contains("email"));
        assert!(message.contains("password"));
    }
}
