//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20250730_000001_create_user;
mod m20250730_000002_create_user_role;
mod m20250730_000003_create_services;
mod m20250730_000004_create_payment_method;
mod m20250730_000005_create_user_profile;
mod m20250730_000006_create_user_profile_services;
mod m20250730_000007_create_user_credentials;
mod m20250730_000008_create_user_rating;
mod m20250730_000009_create_user_order;
mod m20250730_000010_create_order_status_history;
mod m20250730_000011_create_order_payment;
mod m20250730_000099_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250730_000001_create_user::Migration),
            Box::new(m20250730_000002_create_user_role::Migration),
            Box::new(m20250730_000003_create_services::Migration),
            Box::new(m20250730_000004_create_payment_method::Migration),
            Box::new(m20250730_000005_create_user_profile::Migration),
            Box::new(m20250730_000006_create_user_profile_services::Migration),
            Box::new(m20250730_000007_create_user_credentials::Migration),
            Box::new(m20250730_000008_create_user_rating::Migration),
            Box::new(m20250730_000009_create_user_order::Migration),
            Box::new(m20250730_000010_create_order_status_history::Migration),
            Box::new(m20250730_000011_create_order_payment::Migration),
            // Indexes should always be applied last
            Box::new(m20250730_000099_add_indexes::Migration),
        ]
    }
}
