use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{Account, Credentials};
use super::errors::AccountError;

/// Repository abstraction for account persistence.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, AccountError>;
    async fn find_role_id(&self, name: &str) -> Result<Option<Uuid>, AccountError>;

    /// Create user, profile and credentials as one unit.
    async fn create_account(
        &self,
        email: &str,
        role_id: Option<Uuid>,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<Account, AccountError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AccountError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAccountRepository {
        accounts: Mutex<HashMap<String, Account>>, // key: email
        creds: Mutex<HashMap<Uuid, Credentials>>,  // key: user_id
        roles: Mutex<HashMap<String, Uuid>>,
    }

    impl MockAccountRepository {
        pub fn with_roles(names: &[&str]) -> Self {
            let repo = Self::default();
            if let Ok(mut roles) = repo.roles.lock() {
                for n in names {
                    roles.insert(n.to_string(), Uuid::new_v4());
                }
            }
            repo
        }
    }

    fn poisoned<T>(_: T) -> AccountError { AccountError::Repository("mock lock poisoned".into()) }

    #[async_trait]
    impl AccountRepository for MockAccountRepository {
        async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, AccountError> {
            let accounts = self.accounts.lock().map_err(poisoned)?;
            Ok(accounts.get(email).cloned())
        }

        async fn find_role_id(&self, name: &str) -> Result<Option<Uuid>, AccountError> {
            let roles = self.roles.lock().map_err(poisoned)?;
            Ok(roles.get(name).copied())
        }

        async fn create_account(
            &self,
            email: &str,
            _role_id: Option<Uuid>,
            password_hash: String,
            password_algorithm: String,
        ) -> Result<Account, AccountError> {
            let mut accounts = self.accounts.lock().map_err(poisoned)?;
            if accounts.contains_key(email) {
                return Err(AccountError::Conflict);
            }
            let account = Account { id: Uuid::new_v4(), username: email.to_string(), email: email.to_string(), profile_id: Uuid::new_v4() };
            accounts.insert(email.to_string(), account.clone());
            let mut creds = self.creds.lock().map_err(poisoned)?;
            creds.insert(account.id, Credentials { user_id: account.id, password_hash, password_algorithm });
            Ok(account)
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AccountError> {
            let creds = self.creds.lock().map_err(poisoned)?;
            Ok(creds.get(&user_id).cloned())
        }
    }
}
