//! Profile reads and partial updates.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::{services, user_profile, user_profile_services, user_role};
use crate::errors::ServiceError;

/// Profile as presented to callers: resolved role and service names plus the
/// fields still missing.
#[derive(Clone, Debug, Serialize)]
pub struct ProfileView {
    pub profile_id: Uuid,
    pub user_id: Uuid,
    pub role: Option<String>,
    pub is_authenticated: bool,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub services: Vec<String>,
    pub rating: Decimal,
    pub null_or_blank_fields: Vec<&'static str>,
}

/// Fields to change; `None` leaves a field as it is. The aggregate rating is
/// not part of this set.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub role: Option<String>,
    pub is_authenticated: Option<bool>,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    /// Replaces the linked services when present.
    pub services: Option<Vec<String>>,
}

impl ProfileUpdate {
    fn validate(&self) -> Result<(), ServiceError> {
        user_profile::validate_len("full_name", self.full_name.as_deref(), 100)?;
        user_profile::validate_len("phone_number", self.phone_number.as_deref(), 15)?;
        user_profile::validate_len("profile_picture", self.profile_picture.as_deref(), 255)?;
        user_profile::validate_len("location", self.location.as_deref(), 100)?;
        user_profile::validate_len("website", self.website.as_deref(), 200)?;
        user_profile::validate_len("latitude", self.latitude.as_deref(), 20)?;
        user_profile::validate_len("longitude", self.longitude.as_deref(), 20)?;
        Ok(())
    }
}

#[instrument(skip(db))]
pub async fn get_profile(db: &DatabaseConnection, user_id: Uuid) -> Result<ProfileView, ServiceError> {
    let profile = user_profile::find_by_user(db, user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("profile"))?;
    let role = match profile.role_id {
        Some(id) => user_role::Entity::find_by_id(id).one(db).await?.map(|r| r.name),
        None => None,
    };
    let services: Vec<String> = user_profile_services::services_for_profile(db, profile.id)
        .await?
        .into_iter()
        .map(|s| s.name)
        .collect();
    let mut missing = profile.null_or_blank_fields();
    if services.is_empty() {
        missing.push("services");
    }
    let rating = profile.aggregate();
    Ok(ProfileView {
        profile_id: profile.id,
        user_id: profile.user_id,
        role,
        is_authenticated: profile.is_authenticated,
        full_name: profile.full_name,
        phone_number: profile.phone_number,
        bio: profile.bio,
        profile_picture: profile.profile_picture,
        date_of_birth: profile.date_of_birth,
        location: profile.location,
        website: profile.website,
        latitude: profile.latitude,
        longitude: profile.longitude,
        services,
        rating,
        null_or_blank_fields: missing,
    })
}

#[instrument(skip(db, changes))]
pub async fn update_profile(db: &DatabaseConnection, user_id: Uuid, changes: ProfileUpdate) -> Result<ProfileView, ServiceError> {
    changes.validate()?;
    let txn = db.begin().await?;
    // lock first so a concurrent rating write cannot interleave between read and update
    if !crate::rating::try_lock_profile(&txn, user_id).await? {
        return Err(ServiceError::not_found("profile"));
    }
    let profile = user_profile::find_by_user(&txn, user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("profile"))?;
    let profile_id = profile.id;

    let mut am: user_profile::ActiveModel = profile.into();
    if let Some(name) = changes.role.as_deref() {
        let role = user_role::find_by_name(&txn, name)
            .await?
            .ok_or_else(|| ServiceError::Validation(format!("unknown role `{}`", name)))?;
        am.role_id = Set(Some(role.id));
    }
    if let Some(v) = changes.is_authenticated { am.is_authenticated = Set(v); }
    if let Some(v) = changes.full_name { am.full_name = Set(Some(v)); }
    if let Some(v) = changes.phone_number { am.phone_number = Set(Some(v)); }
    if let Some(v) = changes.bio { am.bio = Set(Some(v)); }
    if let Some(v) = changes.profile_picture { am.profile_picture = Set(Some(v)); }
    if let Some(v) = changes.date_of_birth { am.date_of_birth = Set(Some(v)); }
    if let Some(v) = changes.location { am.location = Set(Some(v)); }
    if let Some(v) = changes.website { am.website = Set(Some(v)); }
    if let Some(v) = changes.latitude { am.latitude = Set(Some(v)); }
    if let Some(v) = changes.longitude { am.longitude = Set(Some(v)); }
    if am.is_changed() {
        am.update(&txn).await?;
    }

    if let Some(names) = changes.services {
        let mut ids = BTreeSet::new();
        for name in &names {
            let svc = services::find_by_name(&txn, name)
                .await?
                .ok_or_else(|| ServiceError::Validation(format!("unknown service `{}`", name)))?;
            ids.insert(svc.id);
        }
        let ids: Vec<Uuid> = ids.into_iter().collect();
        user_profile_services::replace_for_profile(&txn, profile_id, &ids).await?;
    }
    txn.commit().await?;
    info!(%profile_id, "profile_updated");
    get_profile(db, user_id).await
}
