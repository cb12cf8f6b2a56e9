use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{user_profile, user_rating};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Profile,
    Ratings,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Profile => Entity::has_one(user_profile::Entity).into(),
            Relation::Ratings => Entity::has_many(user_rating::Entity).into(),
        }
    }
}

impl Related<user_profile::Entity> for Entity {
    fn to() -> RelationDef { Relation::Profile.def() }
}

impl Related<user_rating::Entity> for Entity {
    fn to() -> RelationDef { Relation::Ratings.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let email = email.trim();
    if email.len() > 254 { return Err(ModelError::validation("email too long (<=254)")); }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.') => Ok(()),
        _ => Err(ModelError::validation("invalid email")),
    }
}

pub fn validate_username(username: &str) -> Result<(), ModelError> {
    if username.trim().is_empty() { return Err(ModelError::validation("username required")); }
    if username.len() > 150 { return Err(ModelError::validation("username too long (<=150)")); }
    Ok(())
}

/// Insert an identity row. The username is the email address.
pub async fn create<C: ConnectionTrait>(db: &C, email: &str) -> Result<Model, ModelError> {
    let email = email.trim();
    validate_email(email)?;
    validate_username(email)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(email.to_string()),
        email: Set(email.to_string()),
        created_at: Set(Utc::now().into()),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::Email.eq(email.trim())).one(db).await?)
}

pub async fn exists<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<bool, ModelError> {
    Ok(Entity::find_by_id(id).one(db).await?.is_some())
}
