//! Lookup tables: roles, services and payment methods.

use sea_orm::DatabaseConnection;
use tracing::{info, instrument};

use models::{payment_method, services, user_role};
use crate::errors::ServiceError;

#[instrument(skip(db, description))]
pub async fn create_role(db: &DatabaseConnection, name: &str, description: Option<&str>) -> Result<user_role::Model, ServiceError> {
    if user_role::find_by_name(db, name).await?.is_some() {
        return Err(ServiceError::Conflict(format!("role `{}` already exists", name.trim())));
    }
    let role = user_role::create(db, name, description).await?;
    info!(role_id = %role.id, "role_created");
    Ok(role)
}

#[instrument(skip(db, description))]
pub async fn create_service(db: &DatabaseConnection, name: &str, description: Option<&str>) -> Result<services::Model, ServiceError> {
    if services::find_by_name(db, name).await?.is_some() {
        return Err(ServiceError::Conflict(format!("service `{}` already exists", name.trim())));
    }
    let svc = services::create(db, name, description).await?;
    info!(service_id = %svc.id, "service_created");
    Ok(svc)
}

#[instrument(skip(db, description))]
pub async fn create_payment_method(
    db: &DatabaseConnection,
    name: &str,
    description: Option<&str>,
) -> Result<payment_method::Model, ServiceError> {
    if payment_method::find_by_name(db, name).await?.is_some() {
        return Err(ServiceError::Conflict(format!("payment method `{}` already exists", name.trim())));
    }
    let pm = payment_method::create(db, name, description).await?;
    info!(payment_method_id = %pm.id, "payment_method_created");
    Ok(pm)
}

pub async fn find_role_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<user_role::Model>, ServiceError> {
    Ok(user_role::find_by_name(db, name).await?)
}

/// All services, ordered by name.
pub async fn list_services(db: &DatabaseConnection) -> Result<Vec<services::Model>, ServiceError> {
    Ok(services::list(db).await?)
}
