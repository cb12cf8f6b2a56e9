use sea_orm::{DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use crate::account::domain::{Account, Credentials};
use crate::account::errors::AccountError;
use crate::account::repository::AccountRepository;
use crate::errors::ServiceError;

pub struct SeaOrmAccountRepository {
    pub db: DatabaseConnection,
}

fn repo_err(e: impl Into<ServiceError>) -> AccountError {
    AccountError::from(e.into())
}

#[async_trait::async_trait]
impl AccountRepository for SeaOrmAccountRepository {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, AccountError> {
        let Some(u) = models::user::find_by_email(&self.db, email).await.map_err(repo_err)? else {
            return Ok(None);
        };
        let profile = models::user_profile::find_by_user(&self.db, u.id).await.map_err(repo_err)?;
        match profile {
            Some(p) => Ok(Some(Account { id: u.id, username: u.username, email: u.email, profile_id: p.id })),
            None => Err(AccountError::Repository(format!("user {} has no profile", u.id))),
        }
    }

    async fn find_role_id(&self, name: &str) -> Result<Option<Uuid>, AccountError> {
        let role = models::user_role::find_by_name(&self.db, name).await.map_err(repo_err)?;
        Ok(role.map(|r| r.id))
    }

    async fn create_account(
        &self,
        email: &str,
        role_id: Option<Uuid>,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<Account, AccountError> {
        let txn = self.db.begin().await.map_err(repo_err)?;
        let u = models::user::create(&txn, email).await.map_err(repo_err)?;
        let p = models::user_profile::create_for_user(&txn, u.id, role_id).await.map_err(repo_err)?;
        models::user_credentials::upsert_password(&txn, u.id, password_hash, &password_algorithm)
            .await
            .map_err(repo_err)?;
        txn.commit().await.map_err(repo_err)?;
        Ok(Account { id: u.id, username: u.username, email: u.email, profile_id: p.id })
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AccountError> {
        let res = models::user_credentials::find_for_user(&self.db, user_id).await.map_err(repo_err)?;
        Ok(res.map(|c| Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }))
    }
}
