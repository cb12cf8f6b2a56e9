use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::status::OrderStatus;
use crate::{order_payment, order_status_history, payment_method, services, user};

/// A booking between a requesting user and a counterpart. `order_id` and
/// `order_date` are set on insert and never updated.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_order")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub booking_user_id: Uuid,
    pub service_id: Uuid,
    pub payment_method_id: Uuid,
    #[sea_orm(column_type = "Text", nullable)]
    pub order_details: Option<String>,
    pub order_date: DateTimeWithTimeZone,
    pub order_for_date: DateTimeWithTimeZone,
    pub status: OrderStatus,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    BookingUser,
    Service,
    PaymentMethod,
    History,
    Payments,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity).from(Column::UserId).to(user::Column::Id).into(),
            Relation::BookingUser => Entity::belongs_to(user::Entity).from(Column::BookingUserId).to(user::Column::Id).into(),
            Relation::Service => Entity::belongs_to(services::Entity).from(Column::ServiceId).to(services::Column::Id).into(),
            Relation::PaymentMethod => Entity::belongs_to(payment_method::Entity).from(Column::PaymentMethodId).to(payment_method::Column::Id).into(),
            Relation::History => Entity::has_many(order_status_history::Entity).into(),
            Relation::Payments => Entity::has_many(order_payment::Entity).into(),
        }
    }
}

impl Related<order_status_history::Entity> for Entity {
    fn to() -> RelationDef { Relation::History.def() }
}

impl Related<order_payment::Entity> for Entity {
    fn to() -> RelationDef { Relation::Payments.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields supplied by the booking collaborator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub booking_user_id: Uuid,
    pub service_id: Uuid,
    pub payment_method_id: Uuid,
    pub order_details: Option<String>,
    pub order_for_date: DateTimeWithTimeZone,
}

/// Insert a pending order with a freshly generated id.
pub async fn insert<C: ConnectionTrait>(db: &C, input: &NewOrder) -> Result<Model, ModelError> {
    let am = ActiveModel {
        order_id: Set(Uuid::new_v4()),
        user_id: Set(input.user_id),
        booking_user_id: Set(input.booking_user_id),
        service_id: Set(input.service_id),
        payment_method_id: Set(input.payment_method_id),
        order_details: Set(input.order_details.clone()),
        order_date: Set(Utc::now().into()),
        order_for_date: Set(input.order_for_date),
        status: Set(OrderStatus::Pending),
    };
    Ok(am.insert(db).await?)
}
