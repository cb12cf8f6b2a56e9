//! Create `order_payment`: payment attempts recorded against an order.
//!
//! `transaction_id` is unique across the whole table, not per order.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrderPayment::Table)
                    .if_not_exists()
                    .col(uuid(OrderPayment::Id).primary_key())
                    .col(uuid(OrderPayment::OrderId).not_null())
                    .col(string_len(OrderPayment::PaymentMethod, 50).not_null())
                    .col(string_len(OrderPayment::PaymentStatus, 20).not_null().default("pending"))
                    .col(timestamp_with_time_zone(OrderPayment::PaymentDate).not_null())
                    .col(string_len(OrderPayment::TransactionId, 100).unique_key().not_null())
                    .col(
                        decimal_len(OrderPayment::Amount, 10, 2)
                            .not_null()
                            .check(Expr::col(OrderPayment::Amount).gte(0)),
                    )
                    .col(json_binary(OrderPayment::PaymentDetails).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_order")
                            .from(OrderPayment::Table, OrderPayment::OrderId)
                            .to(UserOrder::Table, UserOrder::OrderId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(OrderPayment::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum OrderPayment {
    Table,
    Id,
    OrderId,
    PaymentMethod,
    PaymentStatus,
    PaymentDate,
    TransactionId,
    Amount,
    PaymentDetails,
}

#[derive(DeriveIden)]
enum UserOrder { Table, OrderId }
