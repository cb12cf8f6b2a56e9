use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{user, user_role};

/// One profile per user. `rating` is derived from `user_rating` and is only
/// written by the rating recalculation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: Uuid,
    pub role_id: Option<Uuid>,
    pub is_authenticated: bool,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub date_of_birth: Option<Date>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub rating: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    Role,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity).from(Column::UserId).to(user::Column::Id).into(),
            Relation::Role => Entity::belongs_to(user_role::Entity).from(Column::RoleId).to(user_role::Column::Id).into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl Related<user_role::Entity> for Entity {
    fn to() -> RelationDef { Relation::Role.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Stored aggregate at two decimal places. Some backends drop trailing
    /// zeros from the scale on read.
    pub fn aggregate(&self) -> Decimal {
        let mut rating = self.rating;
        rating.rescale(2);
        rating
    }

    /// Profile fields that are unset or blank, in display order. `services` is
    /// not a column and is reported by the caller.
    pub fn null_or_blank_fields(&self) -> Vec<&'static str> {
        fn blank(v: &Option<String>) -> bool {
            v.as_deref().map_or(true, |s| s.trim().is_empty())
        }
        let mut fields = Vec::new();
        if self.role_id.is_none() { fields.push("role"); }
        if blank(&self.full_name) { fields.push("full_name"); }
        if blank(&self.phone_number) { fields.push("phone_number"); }
        if blank(&self.bio) { fields.push("bio"); }
        if blank(&self.profile_picture) { fields.push("profile_picture"); }
        if self.date_of_birth.is_none() { fields.push("date_of_birth"); }
        if blank(&self.location) { fields.push("location"); }
        if blank(&self.website) { fields.push("website"); }
        if blank(&self.latitude) { fields.push("latitude"); }
        if blank(&self.longitude) { fields.push("longitude"); }
        fields
    }
}

/// Validate optional free-text fields against their column widths.
pub fn validate_len(field: &str, value: Option<&str>, max: usize) -> Result<(), ModelError> {
    match value {
        Some(v) if v.chars().count() > max => Err(ModelError::Validation(format!("{field} too long (<={max})"))),
        _ => Ok(()),
    }
}

/// Create the empty profile that every user owns; rating starts at 0.00.
pub async fn create_for_user<C: ConnectionTrait>(db: &C, user_id: Uuid, role_id: Option<Uuid>) -> Result<Model, ModelError> {
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        role_id: Set(role_id),
        is_authenticated: Set(false),
        full_name: Set(None),
        phone_number: Set(None),
        bio: Set(None),
        profile_picture: Set(None),
        date_of_birth: Set(None),
        location: Set(None),
        website: Set(None),
        latitude: Set(None),
        longitude: Set(None),
        rating: Set(Decimal::ZERO),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_user<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::UserId.eq(user_id)).one(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_profile() -> Model {
        Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            role_id: None,
            is_authenticated: false,
            full_name: None,
            phone_number: None,
            bio: None,
            profile_picture: None,
            date_of_birth: None,
            location: None,
            website: None,
            latitude: None,
            longitude: None,
            rating: Decimal::ZERO,
        }
    }

    #[test]
    fn empty_profile_reports_every_field() {
        let fields = empty_profile().null_or_blank_fields();
        assert_eq!(fields.len(), 10);
        assert_eq!(fields.first(), Some(&"role"));
        assert_eq!(fields.last(), Some(&"longitude"));
    }

    #[test]
    fn whitespace_counts_as_blank() {
        let mut p = empty_profile();
        p.full_name = Some("   ".into());
        p.location = Some("Dhaka".into());
        let fields = p.null_or_blank_fields();
        assert!(fields.contains(&"full_name"));
        assert!(!fields.contains(&"location"));
    }

    #[test]
    fn aggregate_always_has_two_places() {
        let mut p = empty_profile();
        p.rating = Decimal::new(15, 1);
        assert_eq!(p.aggregate().to_string(), "1.50");
        p.rating = Decimal::ZERO;
        assert_eq!(p.aggregate().to_string(), "0.00");
    }

    #[test]
    fn validate_len_counts_chars() {
        assert!(validate_len("phone_number", Some("+8801700000000"), 15).is_ok());
        assert!(validate_len("phone_number", Some("+88017000000000000"), 15).is_err());
        assert!(validate_len("phone_number", None, 15).is_ok());
    }
}
