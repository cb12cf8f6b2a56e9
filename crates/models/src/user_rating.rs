use std::collections::HashMap;

use sea_orm::{entity::prelude::*, ConnectionTrait, QuerySelect, Set};
use sea_orm::sea_query::Expr;
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::user;

/// A single rating received by a user. `created_at` is set on insert and
/// never changed.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_rating")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::User => Entity::belongs_to(user::Entity).from(Column::UserId).to(user::Column::Id).into() }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Count and sum of a user's rating values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RatingStats {
    pub count: i64,
    pub sum: i64,
}

pub fn validate_value(value: i32) -> Result<(), ModelError> {
    if value < 0 { return Err(ModelError::validation("rating must be >= 0")); }
    Ok(())
}

pub async fn insert<C: ConnectionTrait>(db: &C, user_id: Uuid, value: i32, comment: Option<&str>) -> Result<Model, ModelError> {
    validate_value(value)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        rating: Set(value),
        comment: Set(comment.map(str::to_string)),
        created_at: Set(Utc::now().into()),
    };
    Ok(am.insert(db).await?)
}

pub async fn stats_for_user<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<RatingStats, ModelError> {
    let row: Option<(i64, Option<i64>)> = Entity::find()
        .select_only()
        .column_as(Expr::col(Column::Rating).count(), "count")
        .column_as(Expr::col(Column::Rating).sum(), "sum")
        .filter(Column::UserId.eq(user_id))
        .into_tuple()
        .one(db)
        .await?;
    Ok(match row {
        Some((count, sum)) => RatingStats { count, sum: sum.unwrap_or(0) },
        None => RatingStats::default(),
    })
}

/// Count and sum for every user that has at least one rating.
pub async fn stats_by_user<C: ConnectionTrait>(db: &C) -> Result<HashMap<Uuid, RatingStats>, ModelError> {
    let rows: Vec<(Uuid, i64, Option<i64>)> = Entity::find()
        .select_only()
        .column(Column::UserId)
        .column_as(Expr::col(Column::Rating).count(), "count")
        .column_as(Expr::col(Column::Rating).sum(), "sum")
        .group_by(Column::UserId)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(user_id, count, sum)| (user_id, RatingStats { count, sum: sum.unwrap_or(0) }))
        .collect())
}
