use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::status::PaymentStatus;
use crate::user_order;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_payment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_id: Uuid,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub payment_date: DateTimeWithTimeZone,
    #[sea_orm(unique)]
    pub transaction_id: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub amount: Decimal,
    #[sea_orm(column_type = "JsonBinary")]
    pub payment_details: Json,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Order }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Order => Entity::belongs_to(user_order::Entity).from(Column::OrderId).to(user_order::Column::OrderId).into() }
    }
}

impl Related<user_order::Entity> for Entity {
    fn to() -> RelationDef { Relation::Order.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Largest amount a `decimal(10, 2)` column holds.
pub fn max_amount() -> Decimal { Decimal::new(99_999_999_99, 2) }

pub fn validate(payment_method: &str, transaction_id: &str, amount: Decimal) -> Result<(), ModelError> {
    if payment_method.trim().is_empty() { return Err(ModelError::validation("payment method required")); }
    if payment_method.chars().count() > 50 { return Err(ModelError::validation("payment method too long (<=50)")); }
    if transaction_id.trim().is_empty() { return Err(ModelError::validation("transaction id required")); }
    if transaction_id.chars().count() > 100 { return Err(ModelError::validation("transaction id too long (<=100)")); }
    if amount.is_sign_negative() && !amount.is_zero() { return Err(ModelError::validation("amount must be >= 0")); }
    if amount.round_dp(2) != amount { return Err(ModelError::validation("amount has more than 2 decimal places")); }
    if amount > max_amount() { return Err(ModelError::validation("amount exceeds 99999999.99")); }
    Ok(())
}

/// Insert a pending payment attempt. Normalises metadata to an object when absent.
pub async fn insert<C: ConnectionTrait>(
    db: &C,
    order_id: Uuid,
    payment_method: &str,
    amount: Decimal,
    transaction_id: &str,
    payment_details: Option<Json>,
) -> Result<Model, ModelError> {
    validate(payment_method, transaction_id, amount)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        payment_method: Set(payment_method.trim().to_string()),
        payment_status: Set(PaymentStatus::Pending),
        payment_date: Set(Utc::now().into()),
        transaction_id: Set(transaction_id.trim().to_string()),
        amount: Set(amount),
        payment_details: Set(payment_details.unwrap_or_else(|| Json::Object(Default::default()))),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_transaction<C: ConnectionTrait>(db: &C, transaction_id: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::TransactionId.eq(transaction_id.trim())).one(db).await?)
}
