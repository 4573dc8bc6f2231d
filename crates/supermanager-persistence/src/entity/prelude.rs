//! `SeaORM` entity prelude

pub use super::app_settings::Entity as AppSettings;
pub use super::device_builds::Entity as DeviceBuilds;
pub use super::device_disks::Entity as DeviceDisks;
pub use super::device_marks::Entity as DeviceMarks;
pub use super::device_models::Entity as DeviceModels;
pub use super::device_processors::Entity as DeviceProcessors;
pub use super::device_rams::Entity as DeviceRams;
pub use super::device_softwares::Entity as DeviceSoftwares;
pub use super::device_systems::Entity as DeviceSystems;
pub use super::device_types::Entity as DeviceTypes;
pub use super::devices::Entity as Devices;
pub use super::location_zones::Entity as LocationZones;
pub use super::locations::Entity as Locations;
pub use super::notification_types::Entity as NotificationTypes;
pub use super::notifications::Entity as Notifications;
pub use super::softwares::Entity as Softwares;
pub use super::user_profiles::Entity as UserProfiles;
pub use super::user_settings::Entity as UserSettings;
pub use super::users::Entity as Users;
