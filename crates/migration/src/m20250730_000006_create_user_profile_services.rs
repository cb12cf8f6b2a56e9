//! Create `user_profile_services` join table (services a profile offers).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserProfileServices::Table)
                    .if_not_exists()
                    .col(uuid(UserProfileServices::ProfileId).not_null())
                    .col(uuid(UserProfileServices::ServiceId).not_null())
                    .primary_key(
                        Index::create()
                            .col(UserProfileServices::ProfileId)
                            .col(UserProfileServices::ServiceId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_services_profile")
                            .from(UserProfileServices::Table, UserProfileServices::ProfileId)
                            .to(UserProfile::Table, UserProfile::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_services_service")
                            .from(UserProfileServices::Table, UserProfileServices::ServiceId)
                            .to(Services::Table, Services::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(UserProfileServices::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum UserProfileServices { Table, ProfileId, ServiceId }

#[derive(DeriveIden)]
enum UserProfile { Table, Id }

#[derive(DeriveIden)]
enum Services { Table, Id }
