use sea_orm::{entity::prelude::*, ConnectionTrait, QueryOrder, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::status::OrderStatus;
use crate::{user, user_order};

/// Append-only record of an order status change. Rows are only removed by
/// cascade from the parent order (or the acting user).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_status_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub changed_at: DateTimeWithTimeZone,
    pub changed_by: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Order,
    ChangedBy,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Order => Entity::belongs_to(user_order::Entity).from(Column::OrderId).to(user_order::Column::OrderId).into(),
            Relation::ChangedBy => Entity::belongs_to(user::Entity).from(Column::ChangedBy).to(user::Column::Id).into(),
        }
    }
}

impl Related<user_order::Entity> for Entity {
    fn to() -> RelationDef { Relation::Order.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn append<C: ConnectionTrait>(db: &C, order_id: Uuid, status: OrderStatus, changed_by: Uuid) -> Result<Model, ModelError> {
    let am = ActiveModel {
        order_id: Set(order_id),
        status: Set(status),
        changed_at: Set(Utc::now().into()),
        changed_by: Set(changed_by),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

/// Entries for an order, oldest first.
pub async fn for_order<C: ConnectionTrait>(db: &C, order_id: Uuid) -> Result<Vec<Model>, ModelError> {
    Ok(Entity::find()
        .filter(Column::OrderId.eq(order_id))
        .order_by_asc(Column::ChangedAt)
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}
