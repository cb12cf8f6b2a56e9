#![cfg(test)]
use std::path::PathBuf;

use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};
use uuid::Uuid;

use models::{payment_method, services, user, user_order, user_profile};

/// Fresh database for one test: in-memory SQLite unless `TEST_DATABASE_URL`
/// points somewhere else.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let cfg = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => DatabaseConfig { url, max_connections: 10, min_connections: 1, ..DatabaseConfig::default() },
        Err(_) => DatabaseConfig::sqlite_memory(),
    };
    let db = connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Database reachable from several pooled connections at once, for tests that
/// exercise writers racing each other. Backed by a temporary SQLite file
/// unless `TEST_DATABASE_URL` is set; the file is removed on drop.
pub struct SharedDb {
    pub db: DatabaseConnection,
    path: Option<PathBuf>,
}

impl Drop for SharedDb {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            for suffix in ["", "-wal", "-shm", "-journal"] {
                let mut name = path.clone().into_os_string();
                name.push(suffix);
                let _ = std::fs::remove_file(name);
            }
        }
    }
}

pub async fn get_shared_db(max_connections: u32) -> Result<SharedDb, anyhow::Error> {
    let (url, path) = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => (url, None),
        Err(_) => {
            let path = std::env::temp_dir().join(format!("usermanagement_{}.db", Uuid::new_v4().simple()));
            (format!("sqlite://{}?mode=rwc", path.display()), Some(path))
        }
    };
    let cfg = DatabaseConfig { url, max_connections, min_connections: 1, ..DatabaseConfig::default() };
    let shared = SharedDb { db: connect_with_config(&cfg).await?, path };
    migration::Migrator::up(&shared.db, None).await?;
    Ok(shared)
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}_{}@example.com", prefix, Uuid::new_v4().simple())
}

/// User plus its empty profile, without credentials.
pub async fn user_with_profile(db: &DatabaseConnection, prefix: &str) -> Result<user::Model, anyhow::Error> {
    let u = user::create(db, &unique_email(prefix)).await?;
    user_profile::create_for_user(db, u.id, None).await?;
    Ok(u)
}

pub struct OrderFixture {
    pub buyer: user::Model,
    pub seller: user::Model,
    pub service: services::Model,
    pub payment_method: payment_method::Model,
}

impl OrderFixture {
    pub async fn create(db: &DatabaseConnection) -> Result<Self, anyhow::Error> {
        let tag = Uuid::new_v4().simple().to_string();
        Ok(Self {
            buyer: user_with_profile(db, "buyer").await?,
            seller: user_with_profile(db, "seller").await?,
            service: services::create(db, &format!("svc_{tag}"), None).await?,
            payment_method: payment_method::create(db, &format!("pm_{tag}"), None).await?,
        })
    }

    pub fn new_order(&self) -> user_order::NewOrder {
        user_order::NewOrder {
            user_id: self.buyer.id,
            booking_user_id: self.seller.id,
            service_id: self.service.id,
            payment_method_id: self.payment_method.id,
            order_details: Some("deep clean, 3 rooms".into()),
            order_for_date: (chrono::Utc::now() + chrono::Duration::days(2)).into(),
        }
    }
}
