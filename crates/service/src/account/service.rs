use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use configs::AccountsConfig;
use rand::rngs::OsRng;
use tracing::{info, debug, instrument};

use super::domain::{SignupInput, LoginInput, Account};
use super::errors::AccountError;
use super::repository::AccountRepository;

/// Account business service independent of any transport
pub struct AccountService<R: AccountRepository> {
    repo: Arc<R>,
    cfg: AccountsConfig,
}

impl<R: AccountRepository> AccountService<R> {
    pub fn new(repo: Arc<R>, cfg: AccountsConfig) -> Self { Self { repo, cfg } }

    /// Register a new account with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::account::{service::AccountService, repository::mock::MockAccountRepository};
    /// use service::account::domain::SignupInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAccountRepository::with_roles(&["customer"]));
    /// let svc = AccountService::new(repo, configs::AccountsConfig::default());
    /// let input = SignupInput { email: "user@example.com".into(), password: "Secret123".into(), role: Some("customer".into()) };
    /// let account = tokio_test::block_on(svc.signup(input)).unwrap();
    /// assert_eq!(account.username, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn signup(&self, input: SignupInput) -> Result<Account, AccountError> {
        let email = input.email.trim();
        models::user::validate_email(email).map_err(|e| AccountError::Validation(e.to_string()))?;
        if input.password.chars().count() < self.cfg.min_password_len {
            return Err(AccountError::Validation(format!("password too short (>={})", self.cfg.min_password_len)));
        }
        let role_id = match input.role.as_deref() {
            Some(name) => Some(
                self.repo
                    .find_role_id(name)
                    .await?
                    .ok_or_else(|| AccountError::Validation(format!("unknown role `{}`", name)))?,
            ),
            None => None,
        };
        if let Some(existing) = self.repo.find_account_by_email(email).await? {
            debug!("account exists: {}", existing.email);
            return Err(AccountError::Conflict);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AccountError::HashError(e.to_string()))?
            .to_string();

        let account = self.repo.create_account(email, role_id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = %account.id, profile_id = %account.profile_id, "account_created");
        Ok(account)
    }

    /// Verify an email/password pair.
    ///
    /// # Examples
    /// ```
    /// use service::account::{service::AccountService, repository::mock::MockAccountRepository};
    /// use service::account::domain::{SignupInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAccountRepository::default());
    /// let svc = AccountService::new(repo.clone(), configs::AccountsConfig::default());
    /// let _ = tokio_test::block_on(svc.signup(SignupInput { email: "u@e.com".into(), password: "Passw0rd".into(), role: None }));
    /// let account = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(account.email, "u@e.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<Account, AccountError> {
        let account = self.repo
            .find_account_by_email(input.email.trim())
            .await?
            .ok_or(AccountError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(account.id)
            .await?
            .ok_or(AccountError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AccountError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AccountError::Unauthorized);
        }
        info!(user_id = %account.id, "account_login");
        Ok(account)
    }
}
