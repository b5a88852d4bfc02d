//! Registration and login.

use crate::auth::{self, AuthError, IdentityClaims, PasswordError, TokenService};
use crate::models::user::UserSummary;
use crate::store::{StoreError, UniqueField, UserRepo};

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("email already registered")]
    EmailTaken,
    #[error("username already taken")]
    UsernameTaken,
    #[error(transparent)]
    Hashing(#[from] PasswordError),
    #[error(transparent)]
    Token(#[from] AuthError),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RegisterError {
    fn from(inner: StoreError) -> Self {
        match inner {
            StoreError::Duplicate(UniqueField::Email) => RegisterError::EmailTaken,
            StoreError::Duplicate(UniqueField::Username) => RegisterError::UsernameTaken,
            other => RegisterError::Store(other),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Token(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct AuthService {
    users: UserRepo,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(users: UserRepo, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<UserSummary, RegisterError> {
        require(email, "email").map_err(RegisterError::MissingField)?;
        require(username, "username").map_err(RegisterError::MissingField)?;
        require(password, "password").map_err(RegisterError::MissingField)?;

        // Fast path only; the unique indexes catch concurrent registrations.
        if self.users.email_exists(email).await? {
            tracing::info!(%email, "registration rejected: email taken");
            return Err(RegisterError::EmailTaken);
        }
        if self.users.username_exists(username).await? {
            tracing::info!(%username, "registration rejected: username taken");
            return Err(RegisterError::UsernameTaken);
        }

        let password_hash = auth::hash_password(password)?;
        let user = self.users.insert(email, username, &password_hash).await?;
        tracing::info!(user_id = user.id, %email, %username, "user registered");

        let token = self.issue_for(&user.email, &user.username)?;
        Ok(UserSummary {
            email: user.email,
            username: user.username,
            token,
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserSummary, LoginError> {
        require(email, "email").map_err(LoginError::MissingField)?;
        require(password, "password").map_err(LoginError::MissingField)?;

        let Some(user) = self.users.find_by_email(email).await? else {
            auth::verify_unknown_account(password);
            tracing::info!(%email, "login failed: unknown email");
            return Err(LoginError::InvalidCredentials);
        };

        if !auth::verify_password(password, &user.password_hash) {
            tracing::info!(%email, "login failed: wrong password");
            return Err(LoginError::InvalidCredentials);
        }

        if auth::needs_rehash(&user.password_hash) {
            self.upgrade_hash(email, password).await;
        }

        let token = self.issue_for(&user.email, &user.username)?;
        tracing::info!(%email, "login succeeded");
        Ok(UserSummary {
            email: user.email,
            username: user.username,
            token,
        })
    }

    /// Replaces a legacy hash with a canonical one. Failure is logged, not
    /// surfaced: the user already proved the password.
    async fn upgrade_hash(&self, email: &str, password: &str) {
        let result = match auth::hash_password(password) {
            Ok(hash) => self
                .users
                .update_password_hash(email, &hash)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match result {
            Ok(_) => tracing::info!(%email, "legacy password hash upgraded"),
            Err(error) => tracing::warn!(%email, %error, "legacy password hash upgrade failed"),
        }
    }

    fn issue_for(&self, email: &str, username: &str) -> Result<String, AuthError> {
        self.tokens.issue_default(
            email,
            IdentityClaims {
                username: username.to_string(),
                email: email.to_string(),
            },
        )
    }
}

fn require(value: &str, field: &'static str) -> Result<(), &'static str> {
    if value.is_empty() {
        Err(field)
    } else {
        Ok(())
    }
}
