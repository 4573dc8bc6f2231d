use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{EntityTrait, Schema};

use supermanager_persistence::entity::{
    app_settings, device_builds, device_disks, device_marks, device_models, device_processors,
    device_rams, device_softwares, device_systems, device_types, devices, location_zones,
    locations, notification_types, notifications, softwares, user_profiles, user_settings, users,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

async fn create_table<E: EntityTrait>(manager: &SchemaManager<'_>, entity: E) -> Result<(), DbErr> {
    let schema = Schema::new(manager.get_database_backend());

    manager
        .create_table(
            schema
                .create_table_from_entity(entity)
                .if_not_exists()
                .to_owned(),
        )
        .await
}

async fn drop_table<E: EntityTrait>(manager: &SchemaManager<'_>, entity: E) -> Result<(), DbErr> {
    manager
        .drop_table(Table::drop().table(entity).if_exists().to_owned())
        .await
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Parents before children so foreign keys resolve
        create_table(manager, users::Entity).await?;
        create_table(manager, user_profiles::Entity).await?;
        create_table(manager, location_zones::Entity).await?;
        create_table(manager, locations::Entity).await?;
        create_table(manager, device_types::Entity).await?;
        create_table(manager, device_marks::Entity).await?;
        create_table(manager, device_models::Entity).await?;
        create_table(manager, device_systems::Entity).await?;
        create_table(manager, device_builds::Entity).await?;
        create_table(manager, device_processors::Entity).await?;
        create_table(manager, device_rams::Entity).await?;
        create_table(manager, device_disks::Entity).await?;
        create_table(manager, softwares::Entity).await?;
        create_table(manager, devices::Entity).await?;
        create_table(manager, device_softwares::Entity).await?;
        create_table(manager, notification_types::Entity).await?;
        create_table(manager, notifications::Entity).await?;
        create_table(manager, app_settings::Entity).await?;
        create_table(manager, user_settings::Entity).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-device-softwares-unique")
                    .table(device_softwares::Entity)
                    .col(device_softwares::Column::DeviceId)
                    .col(device_softwares::Column::SoftwareId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table(manager, user_settings::Entity).await?;
        drop_table(manager, app_settings::Entity).await?;
        drop_table(manager, notifications::Entity).await?;
        drop_table(manager, notification_types::Entity).await?;
        drop_table(manager, device_softwares::Entity).await?;
        drop_table(manager, devices::Entity).await?;
        drop_table(manager, softwares::Entity).await?;
        drop_table(manager, device_disks::Entity).await?;
        drop_table(manager, device_rams::Entity).await?;
        drop_table(manager, device_processors::Entity).await?;
        drop_table(manager, device_builds::Entity).await?;
        drop_table(manager, device_systems::Entity).await?;
        drop_table(manager, device_models::Entity).await?;
        drop_table(manager, device_marks::Entity).await?;
        drop_table(manager, device_types::Entity).await?;
        drop_table(manager, locations::Entity).await?;
        drop_table(manager, location_zones::Entity).await?;
        drop_table(manager, user_profiles::Entity).await?;
        drop_table(manager, users::Entity).await
    }
}
