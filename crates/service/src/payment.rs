//! Payment attempts recorded against orders.
//!
//! Payment status is tracked per record and does not feed back into the
//! order status.

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::{order_payment, user_order, PaymentStatus};
use crate::errors::ServiceError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewPayment {
    pub order_id: Uuid,
    pub payment_method: String,
    pub amount: Decimal,
    pub transaction_id: String,
    pub payment_details: Option<serde_json::Value>,
}

/// Record a pending payment. Transaction ids are unique across all orders.
#[instrument(skip(db, input), fields(order_id = %input.order_id, transaction_id = %input.transaction_id))]
pub async fn record_payment(db: &DatabaseConnection, input: NewPayment) -> Result<order_payment::Model, ServiceError> {
    order_payment::validate(&input.payment_method, &input.transaction_id, input.amount)?;
    if user_order::Entity::find_by_id(input.order_id).one(db).await?.is_none() {
        return Err(ServiceError::not_found("order"));
    }
    if order_payment::find_by_transaction(db, &input.transaction_id).await?.is_some() {
        return Err(ServiceError::Conflict(format!("transaction `{}` already recorded", input.transaction_id.trim())));
    }
    let payment = order_payment::insert(
        db,
        input.order_id,
        &input.payment_method,
        input.amount,
        &input.transaction_id,
        input.payment_details,
    )
    .await?;
    info!(payment_id = %payment.id, amount = %payment.amount, "payment_recorded");
    Ok(payment)
}

#[instrument(skip(db))]
pub async fn update_payment_status(
    db: &DatabaseConnection,
    transaction_id: &str,
    new_status: PaymentStatus,
) -> Result<order_payment::Model, ServiceError> {
    let payment = find_by_transaction(db, transaction_id).await?;
    let mut am: order_payment::ActiveModel = payment.into();
    am.payment_status = Set(new_status);
    let updated = am.update(db).await?;
    info!(status = %new_status, "payment_status_changed");
    Ok(updated)
}

pub async fn find_by_transaction(db: &DatabaseConnection, transaction_id: &str) -> Result<order_payment::Model, ServiceError> {
    order_payment::find_by_transaction(db, transaction_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("transaction"))
}

/// Payments for an order, newest first.
pub async fn list_for_order(db: &DatabaseConnection, order_id: Uuid) -> Result<Vec<order_payment::Model>, ServiceError> {
    if user_order::Entity::find_by_id(order_id).one(db).await?.is_none() {
        return Err(ServiceError::not_found("order"));
    }
    let found = order_payment::Entity::find()
        .filter(order_payment::Column::OrderId.eq(order_id))
        .order_by_desc(order_payment::Column::PaymentDate)
        .all(db)
        .await?;
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{self, create_order};
    use crate::test_support::{get_db, OrderFixture};
    use models::OrderStatus;

    fn payment(order_id: Uuid, tx: &str, cents: i64) -> NewPayment {
        NewPayment {
            order_id,
            payment_method: "bkash".into(),
            amount: Decimal::new(cents, 2),
            transaction_id: tx.into(),
            payment_details: Some(serde_json::json!({ "wallet": "01700000000" })),
        }
    }

    #[tokio::test]
    async fn duplicate_transaction_conflicts_and_keeps_first() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let fx = OrderFixture::create(&db).await?;
        let first_order = create_order(&db, fx.new_order()).await?;
        let second_order = create_order(&db, fx.new_order()).await?;
        let tx = format!("TX-{}", Uuid::new_v4().simple());

        let first = record_payment(&db, payment(first_order.order_id, &tx, 120000)).await?;
        assert_eq!(first.payment_status, PaymentStatus::Pending);
        assert_eq!(first.payment_details["wallet"], "01700000000");

        let err = record_payment(&db, payment(second_order.order_id, &tx, 500)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let kept = find_by_transaction(&db, &tx).await?;
        assert_eq!(kept.id, first.id);
        assert_eq!(kept.order_id, first_order.order_id);
        assert_eq!(kept.amount.round_dp(2), Decimal::new(120000, 2));
        Ok(())
    }

    #[tokio::test]
    async fn status_updates_leave_order_alone() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let fx = OrderFixture::create(&db).await?;
        let o = create_order(&db, fx.new_order()).await?;
        let tx = format!("TX-{}", Uuid::new_v4().simple());
        record_payment(&db, payment(o.order_id, &tx, 2500)).await?;

        let updated = update_payment_status(&db, &tx, PaymentStatus::Failed).await?;
        assert_eq!(updated.payment_status, PaymentStatus::Failed);
        assert_eq!(order::get_order(&db, o.order_id).await?.status, OrderStatus::Pending);

        assert!(matches!(update_payment_status(&db, "nope", PaymentStatus::Completed).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn rejects_bad_input() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let fx = OrderFixture::create(&db).await?;
        let o = create_order(&db, fx.new_order()).await?;

        assert!(matches!(record_payment(&db, payment(Uuid::new_v4(), "TX-ghost", 100)).await, Err(ServiceError::NotFound(_))));
        assert!(record_payment(&db, payment(o.order_id, "TX-neg", -100)).await.unwrap_err().is_validation());

        let mut p = payment(o.order_id, "TX-long-label", 100);
        p.payment_method = "m".repeat(51);
        assert!(record_payment(&db, p).await.unwrap_err().is_validation());
        assert!(record_payment(&db, payment(o.order_id, "", 100)).await.unwrap_err().is_validation());
        Ok(())
    }

    #[tokio::test]
    async fn metadata_defaults_to_empty_object() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let fx = OrderFixture::create(&db).await?;
        let o = create_order(&db, fx.new_order()).await?;
        let mut p = payment(o.order_id, &format!("TX-{}", Uuid::new_v4().simple()), 0);
        p.payment_details = None;
        let rec = record_payment(&db, p).await?;
        assert_eq!(rec.payment_details, serde_json::json!({}));
        assert_eq!(list_for_order(&db, o.order_id).await?.len(), 1);
        assert!(matches!(list_for_order(&db, Uuid::new_v4()).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
