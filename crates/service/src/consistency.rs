//! Offline verification of the stored rating aggregates.

use std::collections::HashSet;

use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use models::{user, user_profile, user_rating};
use crate::{errors::ServiceError, rating::average};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregateDrift {
    pub user_id: Uuid,
    pub stored: Decimal,
    pub expected: Decimal,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct AuditReport {
    pub users_checked: usize,
    pub users_without_profile: Vec<Uuid>,
    pub drifted: Vec<AggregateDrift>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.users_without_profile.is_empty() && self.drifted.is_empty()
    }

    pub fn findings(&self) -> usize {
        self.users_without_profile.len() + self.drifted.len()
    }
}

/// Check one user's stored aggregate against a fresh recomputation.
pub async fn verify_user_aggregate(db: &DatabaseConnection, user_id: Uuid) -> Result<Decimal, ServiceError> {
    let profile = user_profile::find_by_user(db, user_id)
        .await?
        .ok_or_else(|| ServiceError::Consistency(format!("user {} has no profile", user_id)))?;
    let stats = user_rating::stats_for_user(db, user_id).await?;
    let expected = average(stats.sum, stats.count);
    let stored = profile.aggregate();
    if stored != expected {
        return Err(ServiceError::Consistency(format!(
            "user {} aggregate is {} but ratings average {}",
            user_id, stored, expected
        )));
    }
    Ok(expected)
}

/// Scan every user and profile.
#[instrument(skip(db))]
pub async fn audit(db: &DatabaseConnection) -> Result<AuditReport, ServiceError> {
    let users = user::Entity::find().order_by_asc(user::Column::CreatedAt).all(db).await?;
    let profiles = user_profile::Entity::find().all(db).await?;
    let stats = user_rating::stats_by_user(db).await?;

    let with_profile: HashSet<Uuid> = profiles.iter().map(|p| p.user_id).collect();
    let mut report = AuditReport { users_checked: users.len(), ..Default::default() };
    for u in &users {
        if !with_profile.contains(&u.id) {
            warn!(user_id = %u.id, "user_without_profile");
            report.users_without_profile.push(u.id);
        }
    }
    for p in profiles {
        let s = stats.get(&p.user_id).copied().unwrap_or_default();
        let expected = average(s.sum, s.count);
        let stored = p.aggregate();
        if stored != expected {
            warn!(user_id = %p.user_id, %stored, %expected, "aggregate_drift");
            report.drifted.push(AggregateDrift { user_id: p.user_id, stored, expected });
        }
    }
    info!(users = report.users_checked, findings = report.findings(), "audit_finished");
    Ok(report)
}
