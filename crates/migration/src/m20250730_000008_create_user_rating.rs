//! Create `user_rating` table: individual ratings received by a user.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserRating::Table)
                    .if_not_exists()
                    .col(uuid(UserRating::Id).primary_key())
                    .col(uuid(UserRating::UserId).not_null())
                    .col(
                        integer(UserRating::Rating)
                            .default(0)
                            .check(Expr::col(UserRating::Rating).gte(0)),
                    )
                    .col(text_null(UserRating::Comment))
                    .col(timestamp_with_time_zone(UserRating::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rating_user")
                            .from(UserRating::Table, UserRating::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(UserRating::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum UserRating { Table, Id, UserId, Rating, Comment, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
