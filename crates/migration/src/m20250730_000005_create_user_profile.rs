//! Create `user_profile` table, one row per user.
//!
//! `rating` holds the derived average of `user_rating`; only the rating write
//! path updates it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserProfile::Table)
                    .if_not_exists()
                    .col(uuid(UserProfile::Id).primary_key())
                    .col(uuid(UserProfile::UserId).unique_key().not_null())
                    .col(uuid_null(UserProfile::RoleId))
                    .col(boolean(UserProfile::IsAuthenticated).default(false))
                    .col(string_len_null(UserProfile::FullName, 100))
                    .col(string_len_null(UserProfile::PhoneNumber, 15))
                    .col(text_null(UserProfile::Bio))
                    .col(string_len_null(UserProfile::ProfilePicture, 255))
                    .col(date_null(UserProfile::DateOfBirth))
                    .col(string_len_null(UserProfile::Location, 100))
                    .col(string_len_null(UserProfile::Website, 200))
                    .col(string_len_null(UserProfile::Latitude, 20))
                    .col(string_len_null(UserProfile::Longitude, 20))
                    .col(
                        decimal_len(UserProfile::Rating, 12, 2)
                            .default(0)
                            .check(Expr::col(UserProfile::Rating).gte(0)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_user")
                            .from(UserProfile::Table, UserProfile::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_role")
                            .from(UserProfile::Table, UserProfile::RoleId)
                            .to(UserRole::Table, UserRole::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(UserProfile::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum UserProfile {
    Table,
    Id,
    UserId,
    RoleId,
    IsAuthenticated,
    FullName,
    PhoneNumber,
    Bio,
    ProfilePicture,
    DateOfBirth,
    Location,
    Website,
    Latitude,
    Longitude,
    Rating,
}

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum UserRole { Table, Id }
