//! Create `order_status_history`: append-only log of order status changes.
//!
//! The auto-increment id gives a total order for entries sharing a timestamp.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrderStatusHistory::Table)
                    .if_not_exists()
                    .col(pk_auto(OrderStatusHistory::Id))
                    .col(uuid(OrderStatusHistory::OrderId).not_null())
                    .col(string_len(OrderStatusHistory::Status, 20).not_null())
                    .col(timestamp_with_time_zone(OrderStatusHistory::ChangedAt).not_null())
                    .col(uuid(OrderStatusHistory::ChangedBy).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_history_order")
                            .from(OrderStatusHistory::Table, OrderStatusHistory::OrderId)
                            .to(UserOrder::Table, UserOrder::OrderId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_history_changed_by")
                            .from(OrderStatusHistory::Table, OrderStatusHistory::ChangedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(OrderStatusHistory::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum OrderStatusHistory { Table, Id, OrderId, Status, ChangedAt, ChangedBy }

#[derive(DeriveIden)]
enum UserOrder { Table, OrderId }

#[derive(DeriveIden)]
enum User { Table, Id }
