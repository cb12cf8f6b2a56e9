//! Create `user_order` table.
//!
//! `order_id` is generated by the application and never updated. Deleting
//! either participant, the service or the payment method removes the order.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserOrder::Table)
                    .if_not_exists()
                    .col(uuid(UserOrder::OrderId).primary_key())
                    .col(uuid(UserOrder::UserId).not_null())
                    .col(uuid(UserOrder::BookingUserId).not_null())
                    .col(uuid(UserOrder::ServiceId).not_null())
                    .col(uuid(UserOrder::PaymentMethodId).not_null())
                    .col(text_null(UserOrder::OrderDetails))
                    .col(timestamp_with_time_zone(UserOrder::OrderDate).not_null())
                    .col(timestamp_with_time_zone(UserOrder::OrderForDate).not_null())
                    .col(string_len(UserOrder::Status, 20).not_null().default("pending"))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_user")
                            .from(UserOrder::Table, UserOrder::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_booking_user")
                            .from(UserOrder::Table, UserOrder::BookingUserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_service")
                            .from(UserOrder::Table, UserOrder::ServiceId)
                            .to(Services::Table, Services::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_payment_method")
                            .from(UserOrder::Table, UserOrder::PaymentMethodId)
                            .to(PaymentMethod::Table, PaymentMethod::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(UserOrder::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum UserOrder {
    Table,
    OrderId,
    UserId,
    BookingUserId,
    ServiceId,
    PaymentMethodId,
    OrderDetails,
    OrderDate,
    OrderForDate,
    Status,
}

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum Services { Table, Id }

#[derive(DeriveIden)]
enum PaymentMethod { Table, Id }
