//! Order ledger and status history.
//!
//! Status transitions are unrestricted; every transition is recorded with
//! the acting user in the same transaction as the status write.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use models::{order_status_history, payment_method, services, user, user_order, OrderStatus};
use crate::{errors::ServiceError, pagination::Pagination};

pub use models::user_order::NewOrder;

/// Parse a status label, rejecting anything outside the order status set.
pub fn parse_status(label: &str) -> Result<OrderStatus, ServiceError> {
    label.parse::<OrderStatus>().map_err(|e| ServiceError::Validation(e.to_string()))
}

/// Create a pending order. Every referenced row must already exist.
#[instrument(skip(db, input), fields(user_id = %input.user_id, booking_user_id = %input.booking_user_id))]
pub async fn create_order(db: &DatabaseConnection, input: NewOrder) -> Result<user_order::Model, ServiceError> {
    if !user::exists(db, input.user_id).await? {
        return Err(ServiceError::Validation("user does not exist".into()));
    }
    if !user::exists(db, input.booking_user_id).await? {
        return Err(ServiceError::Validation("booking user does not exist".into()));
    }
    if services::Entity::find_by_id(input.service_id).one(db).await?.is_none() {
        return Err(ServiceError::Validation("service does not exist".into()));
    }
    if payment_method::Entity::find_by_id(input.payment_method_id).one(db).await?.is_none() {
        return Err(ServiceError::Validation("payment method does not exist".into()));
    }
    let order = user_order::insert(db, &input).await?;
    info!(order_id = %order.order_id, "order_created");
    Ok(order)
}

/// Set the order status and append the matching history entry.
#[instrument(skip(db))]
pub async fn change_status(
    db: &DatabaseConnection,
    order_id: Uuid,
    new_status: OrderStatus,
    changed_by: Uuid,
) -> Result<user_order::Model, ServiceError> {
    let txn = db.begin().await?;
    // the status write goes first so it holds the lock for the whole transaction
    let res = user_order::Entity::update_many()
        .col_expr(user_order::Column::Status, Expr::value(new_status))
        .filter(user_order::Column::OrderId.eq(order_id))
        .exec(&txn)
        .await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("order"));
    }
    if !user::exists(&txn, changed_by).await? {
        return Err(ServiceError::Validation("changed_by user does not exist".into()));
    }
    order_status_history::append(&txn, order_id, new_status, changed_by).await?;
    let updated = user_order::Entity::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("order"))?;
    txn.commit().await?;
    info!(new = %new_status, "order_status_changed");
    Ok(updated)
}

pub async fn get_order(db: &DatabaseConnection, order_id: Uuid) -> Result<user_order::Model, ServiceError> {
    user_order::Entity::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("order"))
}

/// Status history of an order, oldest first.
pub async fn history(db: &DatabaseConnection, order_id: Uuid) -> Result<Vec<order_status_history::Model>, ServiceError> {
    get_order(db, order_id).await?;
    Ok(order_status_history::for_order(db, order_id).await?)
}

/// Orders where the user is either party, newest first.
pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
    opts: Pagination,
) -> Result<Vec<user_order::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let orders = user_order::Entity::find()
        .filter(
            Condition::any()
                .add(user_order::Column::UserId.eq(user_id))
                .add(user_order::Column::BookingUserId.eq(user_id)),
        )
        .order_by_desc(user_order::Column::OrderDate)
        .order_by_asc(user_order::Column::OrderId)
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await?;
    Ok(orders)
}

/// Delete an order; history and payments go with it.
#[instrument(skip(db))]
pub async fn delete_order(db: &DatabaseConnection, order_id: Uuid) -> Result<(), ServiceError> {
    let res = user_order::Entity::delete_by_id(order_id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("order"));
    }
    info!("order_deleted");
    Ok(())
}
