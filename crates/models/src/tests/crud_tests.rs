use anyhow::Result;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use super::setup_test_db;
use crate::{
    order_payment, order_status_history, payment_method, services, user, user_credentials, user_order,
    user_profile, user_profile_services, user_rating, user_role, OrderStatus, PaymentStatus,
};

#[tokio::test]
async fn test_user_and_profile_crud() -> Result<()> {
    let db = setup_test_db().await?;

    let u = user::create(&db, "  karim@example.com ").await?;
    assert_eq!(u.email, "karim@example.com");
    assert_eq!(u.username, u.email);
    assert!(user::exists(&db, u.id).await?);
    assert!(user::find_by_email(&db, "karim@example.com").await?.is_some());

    let role = user_role::create(&db, "provider", Some("offers services")).await?;
    let profile = user_profile::create_for_user(&db, u.id, Some(role.id)).await?;
    assert_eq!(profile.rating, Decimal::ZERO);
    assert!(!profile.is_authenticated);

    let found = user_profile::find_by_user(&db, u.id).await?.expect("profile exists");
    assert_eq!(found.id, profile.id);
    assert_eq!(found.role_id, Some(role.id));

    let mut am: user_profile::ActiveModel = found.into();
    am.full_name = Set(Some("Karim Uddin".into()));
    let updated = am.update(&db).await?;
    assert_eq!(updated.full_name.as_deref(), Some("Karim Uddin"));
    assert!(!updated.null_or_blank_fields().contains(&"full_name"));
    Ok(())
}

#[tokio::test]
async fn test_duplicate_email_rejected() -> Result<()> {
    let db = setup_test_db().await?;
    user::create(&db, "dup@example.com").await?;
    assert!(user::create(&db, "dup@example.com").await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_lookup_tables_list_sorted() -> Result<()> {
    let db = setup_test_db().await?;
    services::create(&db, "plumbing", None).await?;
    services::create(&db, "cleaning", Some("home cleaning")).await?;
    payment_method::create(&db, "card", None).await?;

    let names: Vec<String> = services::list(&db).await?.into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["cleaning".to_string(), "plumbing".to_string()]);
    assert!(payment_method::find_by_name(&db, "card").await?.is_some());
    assert!(services::create(&db, "", None).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_profile_services_replace() -> Result<()> {
    let db = setup_test_db().await?;
    let u = user::create(&db, "svc@example.com").await?;
    let profile = user_profile::create_for_user(&db, u.id, None).await?;
    let a = services::create(&db, "electrical", None).await?;
    let b = services::create(&db, "carpentry", None).await?;

    user_profile_services::replace_for_profile(&db, profile.id, &[a.id, b.id]).await?;
    let linked = user_profile_services::services_for_profile(&db, profile.id).await?;
    assert_eq!(linked.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(), vec!["carpentry", "electrical"]);

    user_profile_services::replace_for_profile(&db, profile.id, &[a.id]).await?;
    let linked = user_profile_services::services_for_profile(&db, profile.id).await?;
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].id, a.id);

    user_profile_services::replace_for_profile(&db, profile.id, &[]).await?;
    assert!(user_profile_services::services_for_profile(&db, profile.id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_credentials_upsert() -> Result<()> {
    let db = setup_test_db().await?;
    let u = user::create(&db, "cred@example.com").await?;

    let first = user_credentials::upsert_password(&db, u.id, "hash-one".into(), "argon2").await?;
    let second = user_credentials::upsert_password(&db, u.id, "hash-two".into(), "argon2").await?;
    assert_eq!(first.id, second.id);

    let stored = user_credentials::find_for_user(&db, u.id).await?.expect("credentials");
    assert_eq!(stored.password_hash, "hash-two");
    assert!(user_credentials::upsert_password(&db, u.id, " ".into(), "argon2").await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_rating_stats() -> Result<()> {
    let db = setup_test_db().await?;
    let u = user::create(&db, "rated@example.com").await?;

    let empty = user_rating::stats_for_user(&db, u.id).await?;
    assert_eq!(empty, user_rating::RatingStats { count: 0, sum: 0 });

    for v in [3, 5, 4] {
        user_rating::insert(&db, u.id, v, Some("ok")).await?;
    }
    let stats = user_rating::stats_for_user(&db, u.id).await?;
    assert_eq!(stats, user_rating::RatingStats { count: 3, sum: 12 });
    assert!(user_rating::insert(&db, u.id, -1, None).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_order_history_and_payment() -> Result<()> {
    let db = setup_test_db().await?;
    let buyer = user::create(&db, "buyer@example.com").await?;
    let seller = user::create(&db, "seller@example.com").await?;
    let svc = services::create(&db, "tutoring", None).await?;
    let pm = payment_method::create(&db, "bkash", None).await?;

    let order = user_order::insert(
        &db,
        &user_order::NewOrder {
            user_id: buyer.id,
            booking_user_id: seller.id,
            service_id: svc.id,
            payment_method_id: pm.id,
            order_details: Some("two sessions".into()),
            order_for_date: chrono::Utc::now().into(),
        },
    )
    .await?;
    assert_eq!(order.status, OrderStatus::Pending);

    order_status_history::append(&db, order.order_id, OrderStatus::Completed, seller.id).await?;
    order_status_history::append(&db, order.order_id, OrderStatus::Cancelled, buyer.id).await?;
    let entries = order_status_history::for_order(&db, order.order_id).await?;
    assert_eq!(entries.iter().map(|e| e.status).collect::<Vec<_>>(), vec![OrderStatus::Completed, OrderStatus::Cancelled]);
    assert!(entries[0].id < entries[1].id);

    let payment = order_payment::insert(&db, order.order_id, "bkash", Decimal::new(150000, 2), "TX-1001", None).await?;
    assert_eq!(payment.payment_status, PaymentStatus::Pending);
    assert_eq!(payment.amount.round_dp(2), Decimal::new(150000, 2));
    assert!(payment.payment_details.is_object());

    let found = order_payment::find_by_transaction(&db, "TX-1001").await?.expect("payment");
    assert_eq!(found.id, payment.id);

    let again = order_payment::insert(&db, order.order_id, "bkash", Decimal::ONE, "TX-1001", None).await;
    assert!(again.is_err());
    assert!(order_payment::Entity::find_by_id(payment.id).one(&db).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_rating_stats_grouped() -> Result<()> {
    let db = setup_test_db().await?;
    let a = user::create(&db, "group-a@example.com").await?;
    let b = user::create(&db, "group-b@example.com").await?;
    let c = user::create(&db, "group-c@example.com").await?;
    user_rating::insert(&db, a.id, 2, None).await?;
    user_rating::insert(&db, a.id, 4, None).await?;
    user_rating::insert(&db, b.id, 5, None).await?;

    let stats = user_rating::stats_by_user(&db).await?;
    assert_eq!(stats.get(&a.id), Some(&user_rating::RatingStats { count: 2, sum: 6 }));
    assert_eq!(stats.get(&b.id), Some(&user_rating::RatingStats { count: 1, sum: 5 }));
    assert!(!stats.contains_key(&c.id));
    Ok(())
}
