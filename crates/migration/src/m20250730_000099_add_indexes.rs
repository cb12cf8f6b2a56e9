use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Ratings: aggregate recompute scans by user
        manager
            .create_index(
                Index::create()
                    .name("idx_rating_user")
                    .table(UserRating::Table)
                    .col(UserRating::UserId)
                    .to_owned(),
            )
            .await?;

        // Orders: listing by either participant
        manager
            .create_index(
                Index::create()
                    .name("idx_order_user")
                    .table(UserOrder::Table)
                    .col(UserOrder::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_order_booking_user")
                    .table(UserOrder::Table)
                    .col(UserOrder::BookingUserId)
                    .to_owned(),
            )
            .await?;

        // History and payments: child rows by order
        manager
            .create_index(
                Index::create()
                    .name("idx_history_order")
                    .table(OrderStatusHistory::Table)
                    .col(OrderStatusHistory::OrderId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_payment_order")
                    .table(OrderPayment::Table)
                    .col(OrderPayment::OrderId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_rating_user").table(UserRating::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_order_user").table(UserOrder::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_order_booking_user").table(UserOrder::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_history_order").table(OrderStatusHistory::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_payment_order").table(OrderPayment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserRating { Table, UserId }

#[derive(DeriveIden)]
enum UserOrder { Table, UserId, BookingUserId }

#[derive(DeriveIden)]
enum OrderStatusHistory { Table, OrderId }

#[derive(DeriveIden)]
enum OrderPayment { Table, OrderId }
