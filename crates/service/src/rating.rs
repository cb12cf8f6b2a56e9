//! Rating store and aggregate recalculation.
//!
//! Every insert or delete runs in one transaction with the recompute. The
//! first statement locks the profile row with a write, then the rating table
//! is mutated and the profile `rating` column is rewritten from the remaining
//! rows. Writers for the same user queue on that lock.

use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use models::{user, user_profile, user_rating};
use crate::errors::ServiceError;

/// A committed rating together with the aggregate it produced.
#[derive(Clone, Debug)]
pub struct RatingWrite {
    pub rating: user_rating::Model,
    pub aggregate: Decimal,
}

/// Mean of `count` values summing to `sum`, rounded half-to-even to two
/// places. Zero ratings give 0.00.
pub fn average(sum: i64, count: i64) -> Decimal {
    if count <= 0 {
        return Decimal::new(0, 2);
    }
    let mean = Decimal::from(sum) / Decimal::from(count);
    let mut rounded = mean.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(2);
    rounded
}

/// Take the write lock on the user's profile row with a no-op update. Returns
/// false when the user has no profile.
///
/// This must be the first statement of the transaction: on PostgreSQL it
/// holds the row lock until commit, and on SQLite it takes the database write
/// lock before any read, so competing writers wait on the busy timeout
/// instead of failing a lock upgrade.
pub(crate) async fn try_lock_profile<C: ConnectionTrait>(txn: &C, user_id: Uuid) -> Result<bool, ServiceError> {
    let res = user_profile::Entity::update_many()
        .col_expr(user_profile::Column::Rating, Expr::col(user_profile::Column::Rating).into())
        .filter(user_profile::Column::UserId.eq(user_id))
        .exec(txn)
        .await?;
    match res.rows_affected {
        0 => Ok(false),
        1 => Ok(true),
        n => Err(ServiceError::Consistency(format!("user {} has {} profiles", user_id, n))),
    }
}

/// Like `try_lock_profile`, but a missing profile is a consistency error.
pub(crate) async fn lock_profile<C: ConnectionTrait>(txn: &C, user_id: Uuid) -> Result<(), ServiceError> {
    if !try_lock_profile(txn, user_id).await? {
        return Err(ServiceError::Consistency(format!("user {} has no profile to aggregate into", user_id)));
    }
    Ok(())
}

/// Recompute and store the aggregate for `user_id`. Callers must already hold
/// the profile lock inside `txn`.
pub async fn recalculate<C: ConnectionTrait>(txn: &C, user_id: Uuid) -> Result<Decimal, ServiceError> {
    let stats = user_rating::stats_for_user(txn, user_id).await?;
    let aggregate = average(stats.sum, stats.count);
    let res = user_profile::Entity::update_many()
        .col_expr(user_profile::Column::Rating, Expr::value(aggregate))
        .filter(user_profile::Column::UserId.eq(user_id))
        .exec(txn)
        .await?;
    if res.rows_affected != 1 {
        return Err(ServiceError::Consistency(format!(
            "expected one profile for user {}, updated {}",
            user_id, res.rows_affected
        )));
    }
    debug!(%user_id, count = stats.count, sum = stats.sum, %aggregate, "aggregate_recalculated");
    Ok(aggregate)
}

/// Record a rating for `user_id` and refresh their aggregate.
#[instrument(skip(db, comment))]
pub async fn submit_rating(
    db: &DatabaseConnection,
    user_id: Uuid,
    value: i32,
    comment: Option<&str>,
) -> Result<RatingWrite, ServiceError> {
    user_rating::validate_value(value)?;
    let txn = db.begin().await?;
    if !try_lock_profile(&txn, user_id).await? {
        if !user::exists(&txn, user_id).await? {
            return Err(ServiceError::not_found("user"));
        }
        return Err(ServiceError::Consistency(format!("user {} has no profile to aggregate into", user_id)));
    }
    let rating = user_rating::insert(&txn, user_id, value, comment).await?;
    let aggregate = recalculate(&txn, user_id).await?;
    txn.commit().await?;
    info!(rating_id = %rating.id, %aggregate, "rating_submitted");
    Ok(RatingWrite { rating, aggregate })
}

/// Remove a rating and refresh the owner's aggregate. Returns the new aggregate.
#[instrument(skip(db))]
pub async fn delete_rating(db: &DatabaseConnection, rating_id: Uuid) -> Result<Decimal, ServiceError> {
    // owner never changes, so it can be read before the lock
    let user_id = user_rating::Entity::find_by_id(rating_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("rating"))?
        .user_id;
    let txn = db.begin().await?;
    lock_profile(&txn, user_id).await?;
    let res = user_rating::Entity::delete_by_id(rating_id).exec(&txn).await?;
    if res.rows_affected == 0 {
        // removed by a writer that held the lock before us
        return Err(ServiceError::not_found("rating"));
    }
    let aggregate = recalculate(&txn, user_id).await?;
    txn.commit().await?;
    info!(%user_id, %aggregate, "rating_deleted");
    Ok(aggregate)
}

/// Ratings received by a user, newest first.
pub async fn list_ratings(db: &DatabaseConnection, user_id: Uuid) -> Result<Vec<user_rating::Model>, ServiceError> {
    let found = user_rating::Entity::find()
        .filter(user_rating::Column::UserId.eq(user_id))
        .order_by_desc(user_rating::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(found)
}

/// Stored aggregate for a user, at two decimal places.
pub async fn aggregate_for(db: &DatabaseConnection, user_id: Uuid) -> Result<Decimal, ServiceError> {
    let profile = user_profile::find_by_user(db, user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("profile"))?;
    Ok(profile.aggregate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, get_shared_db, unique_email, user_with_profile};

    fn dec(s: &str) -> Decimal { s.parse().unwrap() }

    #[test]
    fn average_of_nothing_is_zero() {
        assert_eq!(average(0, 0), Decimal::ZERO);
        assert_eq!(average(0, 0).to_string(), "0.00");
    }

    #[test]
    fn average_rounds_half_to_even() {
        assert_eq!(average(12, 3), dec("4.00"));
        assert_eq!(average(7, 2), dec("3.50"));
        assert_eq!(average(10, 3), dec("3.33"));
        assert_eq!(average(20, 3), dec("6.67"));
        // 2.125 and 2.375 sit exactly on the midpoint
        assert_eq!(average(17, 8), dec("2.12"));
        assert_eq!(average(19, 8), dec("2.38"));
    }

    #[tokio::test]
    async fn insert_and_delete_track_the_mean() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let u = user_with_profile(&db, "rated").await?;

        let mut ids = Vec::new();
        let mut aggregates = Vec::new();
        for v in [3, 5, 4] {
            let w = submit_rating(&db, u.id, v, Some("on time")).await?;
            ids.push((v, w.rating.id));
            aggregates.push(w.aggregate);
        }
        assert_eq!(aggregates, vec![dec("3.00"), dec("4.00"), dec("4.00")]);
        assert_eq!(aggregate_for(&db, u.id).await?.to_string(), "4.00");

        let five = ids.iter().find(|(v, _)| *v == 5).map(|(_, id)| *id).unwrap();
        assert_eq!(delete_rating(&db, five).await?, dec("3.50"));
        assert_eq!(aggregate_for(&db, u.id).await?.to_string(), "3.50");
        assert_eq!(list_ratings(&db, u.id).await?.len(), 2);

        for (v, id) in ids.into_iter().filter(|(v, _)| *v != 5) {
            let agg = delete_rating(&db, id).await?;
            if v == 4 {
                assert_eq!(agg, Decimal::ZERO);
            }
        }
        assert_eq!(aggregate_for(&db, u.id).await?.to_string(), "0.00");
        assert!(list_ratings(&db, u.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn missing_profile_is_a_consistency_error() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let bare = user::create(&db, &unique_email("bare")).await?;

        let err = submit_rating(&db, bare.id, 4, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Consistency(_)));
        assert!(list_ratings(&db, bare.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn rejects_unknown_user_and_negative_values() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        assert!(matches!(submit_rating(&db, Uuid::new_v4(), 3, None).await, Err(ServiceError::NotFound(_))));

        let u = user_with_profile(&db, "neg").await?;
        assert!(submit_rating(&db, u.id, -1, None).await.unwrap_err().is_validation());
        assert!(matches!(delete_rating(&db, Uuid::new_v4()).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writes_for_one_user_all_count() -> Result<(), anyhow::Error> {
        let shared = get_shared_db(4).await?;
        let db = &shared.db;
        let u = user_with_profile(db, "busy").await?;

        let user_id = u.id;
        let mut handles = Vec::new();
        for v in [1, 2, 3, 4].repeat(4) {
            let db = db.clone();
            handles.push(tokio::spawn(async move { submit_rating(&db, user_id, v, None).await }));
        }
        for h in handles {
            h.await??;
        }
        // 40 / 16
        assert_eq!(list_ratings(db, u.id).await?.len(), 16);
        assert_eq!(aggregate_for(db, u.id).await?.to_string(), "2.50");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_deletes_remove_a_rating_once() -> Result<(), anyhow::Error> {
        let shared = get_shared_db(4).await?;
        let db = &shared.db;
        let u = user_with_profile(db, "twice").await?;
        submit_rating(db, u.id, 2, None).await?;
        let target = submit_rating(db, u.id, 5, None).await?.rating.id;

        let (a, b) = tokio::join!(
            tokio::spawn({
                let db = db.clone();
                async move { delete_rating(&db, target).await }
            }),
            tokio::spawn({
                let db = db.clone();
                async move { delete_rating(&db, target).await }
            }),
        );
        let results = [a?, b?];
        let ok: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(ok, vec![&dec("2.00")]);
        assert_eq!(results.iter().filter(|r| matches!(r, Err(ServiceError::NotFound(_)))).count(), 1);
        assert_eq!(aggregate_for(db, u.id).await?.to_string(), "2.00");
        Ok(())
    }

    #[tokio::test]
    async fn large_values_fit_the_aggregate_column() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let u = user_with_profile(&db, "max").await?;
        let w = submit_rating(&db, u.id, i32::MAX, None).await?;
        assert_eq!(w.aggregate, Decimal::new(i32::MAX as i64 * 100, 2));
        assert_eq!(aggregate_for(&db, u.id).await?.to_string(), "2147483647.00");
        Ok(())
    }

    #[tokio::test]
    async fn other_users_are_untouched() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let a = user_with_profile(&db, "a").await?;
        let b = user_with_profile(&db, "b").await?;
        submit_rating(&db, a.id, 5, None).await?;
        submit_rating(&db, b.id, 2, None).await?;
        submit_rating(&db, a.id, 4, None).await?;
        assert_eq!(aggregate_for(&db, a.id).await?.to_string(), "4.50");
        assert_eq!(aggregate_for(&db, b.id).await?.to_string(), "2.00");
        Ok(())
    }
}
