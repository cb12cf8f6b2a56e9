//! Join table between profiles and the services they offer.
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{services, user_profile};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_profile_services")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub profile_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub service_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Profile,
    Service,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Profile => Entity::belongs_to(user_profile::Entity).from(Column::ProfileId).to(user_profile::Column::Id).into(),
            Relation::Service => Entity::belongs_to(services::Entity).from(Column::ServiceId).to(services::Column::Id).into(),
        }
    }
}

impl Related<services::Entity> for Entity {
    fn to() -> RelationDef { Relation::Service.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Replace the set of services linked to a profile.
pub async fn replace_for_profile<C: ConnectionTrait>(db: &C, profile_id: Uuid, service_ids: &[Uuid]) -> Result<(), ModelError> {
    Entity::delete_many().filter(Column::ProfileId.eq(profile_id)).exec(db).await?;
    if service_ids.is_empty() {
        return Ok(());
    }
    let rows = service_ids.iter().map(|sid| ActiveModel { profile_id: Set(profile_id), service_id: Set(*sid) });
    Entity::insert_many(rows).exec(db).await?;
    Ok(())
}

/// Services linked to a profile, ordered by name.
pub async fn services_for_profile<C: ConnectionTrait>(db: &C, profile_id: Uuid) -> Result<Vec<services::Model>, ModelError> {
    use sea_orm::{JoinType, QueryOrder, QuerySelect};
    let found = services::Entity::find()
        .join_rev(JoinType::InnerJoin, Relation::Service.def())
        .filter(Column::ProfileId.eq(profile_id))
        .order_by_asc(services::Column::Name)
        .all(db)
        .await?;
    Ok(found)
}
