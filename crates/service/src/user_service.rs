use uuid::Uuid;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait};
use tracing::{info, instrument};

use models::{user, user_profile, user_rating, user_role};
use crate::{errors::ServiceError, pagination::Pagination, rating};

/// Create a user and its empty profile in one transaction. The username is
/// the email address.
#[instrument(skip(db))]
pub async fn create_user_with_profile(
    db: &DatabaseConnection,
    email: &str,
    role: Option<&str>,
) -> Result<(user::Model, user_profile::Model), ServiceError> {
    let role_id = match role {
        Some(name) => Some(
            user_role::find_by_name(db, name)
                .await?
                .ok_or_else(|| ServiceError::Validation(format!("unknown role `{}`", name)))?
                .id,
        ),
        None => None,
    };
    if user::find_by_email(db, email).await?.is_some() {
        return Err(ServiceError::Conflict("email already registered".into()));
    }
    // a racing signup for the same email is caught by the unique index on insert
    let txn = db.begin().await?;
    let created = user::create(&txn, email).await?;
    let profile = user_profile::create_for_user(&txn, created.id, role_id).await?;
    txn.commit().await?;
    info!(user_id = %created.id, "user_created");
    Ok((created, profile))
}

/// Get a user by id.
pub async fn get_user(db: &DatabaseConnection, id: Uuid) -> Result<user::Model, ServiceError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("user"))
}

/// Delete a user. Their ratings are removed first and the aggregate reset,
/// then the user row goes and the schema cascades the rest.
#[instrument(skip(db))]
pub async fn delete_user(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    let has_profile = rating::try_lock_profile(&txn, id).await?;
    if !has_profile && !user::exists(&txn, id).await? {
        return Err(ServiceError::not_found("user"));
    }
    let removed = user_rating::Entity::delete_many()
        .filter(user_rating::Column::UserId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;
    if has_profile {
        rating::recalculate(&txn, id).await?;
    }
    user::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    info!(ratings_removed = removed, "user_deleted");
    Ok(())
}

/// List users with pagination, oldest first.
pub async fn list_users(db: &DatabaseConnection, opts: Pagination) -> Result<Vec<user::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    // SeaORM's paginate uses 0-based page index internally via fetch_page
    let users = user::Entity::find()
        .order_by_asc(user::Column::CreatedAt)
        .order_by_asc(user::Column::Email)
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await?;
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{change_status, create_order};
    use crate::test_support::{get_db, unique_email, OrderFixture};
    use models::{order_status_history, user_order, OrderStatus};

    #[tokio::test]
    async fn user_crud_service() -> Result<(), anyhow::Error> {
        let db = get_db().await?;

        let email = unique_email("svc");
        let (u, profile) = create_user_with_profile(&db, &email, None).await?;
        assert_eq!(u.username, email);
        assert_eq!(profile.user_id, u.id);
        assert!(matches!(create_user_with_profile(&db, &email, None).await, Err(ServiceError::Conflict(_))));
        assert!(create_user_with_profile(&db, &unique_email("r"), Some("no-such-role")).await.unwrap_err().is_validation());

        let found = get_user(&db, u.id).await?;
        assert_eq!(found.id, u.id);

        delete_user(&db, u.id).await?;
        assert!(matches!(get_user(&db, u.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(delete_user(&db, u.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn delete_clears_ratings_and_related_rows() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let fx = OrderFixture::create(&db).await?;
        rating::submit_rating(&db, fx.seller.id, 5, Some("great")).await?;
        rating::submit_rating(&db, fx.seller.id, 3, None).await?;
        let order = create_order(&db, fx.new_order()).await?;
        change_status(&db, order.order_id, OrderStatus::Completed, fx.seller.id).await?;

        delete_user(&db, fx.seller.id).await?;
        assert!(rating::list_ratings(&db, fx.seller.id).await?.is_empty());
        assert!(user_profile::find_by_user(&db, fx.seller.id).await?.is_none());
        assert!(user_order::Entity::find_by_id(order.order_id).one(&db).await?.is_none());
        let authored = order_status_history::Entity::find()
            .filter(order_status_history::Column::ChangedBy.eq(fx.seller.id))
            .count(&db)
            .await?;
        assert_eq!(authored, 0);
        // the other party survives
        assert_eq!(get_user(&db, fx.buyer.id).await?.id, fx.buyer.id);
        Ok(())
    }

    #[tokio::test]
    async fn delete_without_profile() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let bare = user::create(&db, &unique_email("bare")).await?;
        delete_user(&db, bare.id).await?;
        assert!(!user::exists(&db, bare.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn list_users_paginates() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        for _ in 0..3 {
            create_user_with_profile(&db, &unique_email("page"), None).await?;
        }
        let page = Pagination { page: 1, per_page: 2 };
        let page1 = list_users(&db, page).await?;
        assert_eq!(page1.len(), 2);
        let all = list_users(&db, Pagination { page: 1, per_page: 100 }).await?;
        assert!(all.len() >= 3);
        Ok(())
    }
}
