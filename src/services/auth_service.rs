//! Credential store: registration, login and per-request authentication.

use super::{
    ServiceError, ServiceResult, is_unique_violation,
    password::{hash_password, verify_password},
    token::TokenCodec,
};
use crate::{
    models::user::{CurrentUser, User},
    validation::require_text,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct AuthService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
    tokens: TokenCodec,
}

impl AuthService {
    pub fn new(db: Arc<SqlitePool>, tokens: TokenCodec) -> Self {
        Self { db, tokens }
    }

    /// Create an account and return a token for it.
    ///
    /// The password is hashed once, off the async runtime. A taken username
    /// rolls the insert back and reports a conflict on `username`.
    pub async fn register(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> ServiceResult<String> {
        let (username, password) = credentials(username, password)?;
        let password_hash = run_blocking(move || hash_password(&password))
            .await?
            .map_err(|err| ServiceError::Internal(err.to_string()))?;

        let mut tx = self.db.begin().await?;
        let inserted = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash) VALUES (?, ?)
             RETURNING id, username, password_hash",
        )
        .bind(&username)
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await;

        let user = match inserted {
            Ok(user) => user,
            Err(err) if is_unique_violation(&err) => {
                tx.rollback().await?;
                debug!("registration rejected, username `{}` taken", username);
                return Err(ServiceError::Conflict { field: "username" });
            }
            Err(err) => return Err(ServiceError::Sqlx(err)),
        };
        tx.commit().await?;

        info!(user_id = user.id, "registered user `{}`", user.username);
        self.issue(user.id)
    }

    /// Check a username/password pair and return a fresh token.
    pub async fn login(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> ServiceResult<String> {
        let (username, password) = credentials(username, password)?;

        let Some(user) = self.find_by_username(&username).await? else {
            warn!("login failed for unknown user `{}`", username);
            return Err(ServiceError::InvalidCredentials);
        };

        let stored = user.password_hash.clone();
        let matches = run_blocking(move || verify_password(&password, &stored))
            .await?
            .map_err(|err| ServiceError::Internal(err.to_string()))?;
        if !matches {
            warn!(user_id = user.id, "login failed, wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        debug!(user_id = user.id, "login succeeded");
        self.issue(user.id)
    }

    /// Resolve a bearer token to its owner.
    ///
    /// Bad signatures, expired tokens and tokens for vanished users all
    /// surface as the same `Unauthorized`.
    pub async fn authenticate(&self, token: &str) -> ServiceResult<CurrentUser> {
        let user_id = self
            .tokens
            .verify(token)
            .map_err(|_| ServiceError::Unauthorized)?;

        match self.find_by_id(user_id).await? {
            Some(user) => Ok(user.into()),
            None => Err(ServiceError::Unauthorized),
        }
    }

    /// Load the caller's full user row.
    pub async fn current_user(&self, user: &CurrentUser) -> ServiceResult<User> {
        self.find_by_id(user.id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("the user was not found.".into()))
    }

    async fn find_by_id(&self, id: i64) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&*self.db)
        .await?;
        Ok(user)
    }

    fn issue(&self, user_id: i64) -> ServiceResult<String> {
        self.tokens
            .issue(user_id)
            .map_err(|err| ServiceError::Internal(err.to_string()))
    }
}

/// Username is trimmed; the password is kept verbatim but may not be blank.
fn credentials(username: Option<&str>, password: Option<&str>) -> ServiceResult<(String, String)> {
    let username = require_text(username, "username")?;
    require_text(password, "password")?;
    Ok((username, password.unwrap_or_default().to_string()))
}

async fn run_blocking<T, F>(f: F) -> ServiceResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| ServiceError::Internal(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::Duration;

    async fn service() -> AuthService {
        let pool = db::connect_in_memory().await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        AuthService::new(
            Arc::new(pool),
            TokenCodec::new(b"test-secret", Duration::hours(1)),
        )
    }

    async fn user_count(service: &AuthService) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&*service.db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn duplicate_username_conflicts_without_second_row() {
        let service = service().await;
        service.register(Some("amy"), Some("p1")).await.unwrap();

        let err = service.register(Some("amy"), Some("p2")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { field: "username" }));
        assert_eq!(user_count(&service).await, 1);
    }

    #[tokio::test]
    async fn login_then_authenticate_resolves_same_user() {
        let service = service().await;
        let registered = service.register(Some("amy"), Some("p1")).await.unwrap();
        let registered_user = service.authenticate(&registered).await.unwrap();

        let token = service.login(Some("amy"), Some("p1")).await.unwrap();
        let user = service.authenticate(&token).await.unwrap();
        assert_eq!(user.id, registered_user.id);
        assert_eq!(user.username, "amy");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_invalid_credentials() {
        let service = service().await;
        service.register(Some("amy"), Some("p1")).await.unwrap();

        assert!(matches!(
            service.login(Some("amy"), Some("nope")).await,
            Err(ServiceError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login(Some("bob"), Some("p1")).await,
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn blank_fields_are_rejected_before_insert() {
        let service = service().await;
        assert!(matches!(
            service.register(Some("  "), Some("p1")).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.register(Some("amy"), None).await,
            Err(ServiceError::Validation(_))
        ));
        assert_eq!(user_count(&service).await, 0);
    }

    #[tokio::test]
    async fn expired_or_garbage_tokens_are_unauthorized() {
        let service = service().await;
        service.register(Some("amy"), Some("p1")).await.unwrap();

        let expired = service
            .tokens
            .issue_at(1, chrono::Utc::now() - Duration::hours(3))
            .unwrap();
        assert!(matches!(
            service.authenticate(&expired).await,
            Err(ServiceError::Unauthorized)
        ));
        assert!(matches!(
            service.authenticate("garbage").await,
            Err(ServiceError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn token_for_missing_user_is_unauthorized() {
        let service = service().await;
        let token = service.tokens.issue(999).unwrap();
        assert!(matches!(
            service.authenticate(&token).await,
            Err(ServiceError::Unauthorized)
        ));
    }
}
