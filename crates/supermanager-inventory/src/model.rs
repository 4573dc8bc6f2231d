//! Inventory request and response models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use supermanager_auth::UserInfo;
use supermanager_common::FieldErrors;
use supermanager_common::validation::{
    CODE_NAME_MAX_LENGTH, TEXT_FIELD_MAX_LENGTH, TITLE_MAX_LENGTH, VERSION_MAX_LENGTH, ZIP_CODE_MAX_LENGTH,
    REQUIRED, check_max_length, check_required, deserialize_some, max_length_message,
};
use supermanager_persistence::Titled;

/// `{id, title, description}` of a referenced row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brief {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
}

impl<T: Titled> From<&T> for Brief {
    fn from(value: &T) -> Self {
        Self {
            id: value.id(),
            title: value.title().to_string(),
            description: value.description().map(str::to_string),
        }
    }
}

/// Columns shared by every titled resource
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BaseForm {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub code_name: Option<Option<String>>,
    pub status: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub sort_order: Option<Option<i32>>,
}

impl BaseForm {
    /// `partial` only checks the keys that are present
    pub fn errors(&self, partial: bool) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if !partial || self.title.is_some() {
            check_required(&mut errors, "title", self.title.as_deref(), TITLE_MAX_LENGTH);
        }
        check_max_length(
            &mut errors,
            "code_name",
            self.code_name.as_ref().and_then(|v| v.as_deref()),
            CODE_NAME_MAX_LENGTH,
        );

        errors
    }
}

/// Payload of the device attribute catalogs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogForm {
    #[serde(flatten)]
    pub base: BaseForm,
    pub is_deprecated: Option<bool>,
}

impl CatalogForm {
    pub fn errors(&self, partial: bool) -> FieldErrors {
        self.base.errors(partial)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub code_name: Option<String>,
    pub status: i32,
    pub is_core: bool,
    pub is_deprecated: bool,
    pub sort_order: Option<i32>,
    pub creator: Option<UserInfo>,
    pub updater: Option<UserInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SoftwareForm {
    #[serde(flatten)]
    pub catalog: CatalogForm,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub version: Option<Option<String>>,
}

impl SoftwareForm {
    pub fn errors(&self, partial: bool) -> FieldErrors {
        let mut errors = self.catalog.errors(partial);
        check_max_length(
            &mut errors,
            "version",
            self.version.as_ref().and_then(|v| v.as_deref()),
            VERSION_MAX_LENGTH,
        );
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftwareItem {
    #[serde(flatten)]
    pub catalog: CatalogItem,
    pub version: Option<String>,
}

/// Optional contact columns stored as non-null strings
fn check_contact_fields(errors: &mut FieldErrors, fields: &[(&str, &Option<String>)]) {
    for (name, value) in fields {
        let max = if *name == "zip_code" {
            ZIP_CODE_MAX_LENGTH
        } else {
            TEXT_FIELD_MAX_LENGTH
        };
        check_max_length(errors, name, value.as_deref(), max);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationZoneForm {
    #[serde(flatten)]
    pub base: BaseForm,
    pub manager: Option<String>,
    pub manager_email: Option<String>,
    pub manager_phone: Option<String>,
    pub manager_mobile: Option<String>,
}

impl LocationZoneForm {
    pub fn errors(&self, partial: bool) -> FieldErrors {
        let mut errors = self.base.errors(partial);
        check_contact_fields(
            &mut errors,
            &[
                ("manager", &self.manager),
                ("manager_email", &self.manager_email),
                ("manager_phone", &self.manager_phone),
                ("manager_mobile", &self.manager_mobile),
            ],
        );
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationZoneItem {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub code_name: Option<String>,
    pub status: i32,
    pub is_core: bool,
    pub manager: String,
    pub manager_email: String,
    pub manager_phone: String,
    pub manager_mobile: String,
    pub sort_order: Option<i32>,
    pub creator: Option<UserInfo>,
    pub updater: Option<UserInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Titles of the zone's locations
    pub locations: Vec<String>,
    pub locations_count: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationForm {
    #[serde(flatten)]
    pub base: BaseForm,
    pub location_zone_id: Option<i32>,
    pub manager: Option<String>,
    pub manager_email: Option<String>,
    pub manager_phone: Option<String>,
    pub manager_mobile: Option<String>,
    pub collaborator: Option<String>,
    pub collaborator_email: Option<String>,
    pub collaborator_phone: Option<String>,
    pub collaborator_mobile: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub latitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub longitude: Option<Option<f64>>,
}

impl LocationForm {
    pub fn contact_fields(&self) -> [(&'static str, &Option<String>); 15] {
        [
            ("manager", &self.manager),
            ("manager_email", &self.manager_email),
            ("manager_phone", &self.manager_phone),
            ("manager_mobile", &self.manager_mobile),
            ("collaborator", &self.collaborator),
            ("collaborator_email", &self.collaborator_email),
            ("collaborator_phone", &self.collaborator_phone),
            ("collaborator_mobile", &self.collaborator_mobile),
            ("phone", &self.phone),
            ("mobile", &self.mobile),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zip_code", &self.zip_code),
            ("country", &self.country),
        ]
    }

    pub fn errors(&self, partial: bool) -> FieldErrors {
        let mut errors = self.base.errors(partial);
        if !partial && self.location_zone_id.is_none() {
            errors.add("location_zone_id", REQUIRED);
        }
        check_contact_fields(&mut errors, &self.contact_fields());
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationItem {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub code_name: Option<String>,
    pub status: i32,
    pub is_core: bool,
    pub location_zone: Option<Brief>,
    pub manager: String,
    pub manager_email: String,
    pub manager_phone: String,
    pub manager_mobile: String,
    pub collaborator: String,
    pub collaborator_email: String,
    pub collaborator_phone: String,
    pub collaborator_mobile: String,
    pub phone: String,
    pub mobile: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sort_order: Option<i32>,
    pub creator: Option<UserInfo>,
    pub updater: Option<UserInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub devices_count: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceForm {
    pub internal_id: Option<String>,
    pub status: Option<i32>,
    pub location_id: Option<i32>,
    pub type_id: Option<i32>,
    pub mark_id: Option<i32>,
    pub model_id: Option<i32>,
    pub system_id: Option<i32>,
    pub build_id: Option<i32>,
    pub processor_id: Option<i32>,
    pub ram_id: Option<i32>,
    pub disk_id: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub hostname: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub disk_internal_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub disk_serial: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub network_ipv4: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub network_ipv6: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub network_mac: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub remote_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub serial: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub sector: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub user_owner: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub sort_order: Option<Option<i32>>,
}

impl DeviceForm {
    /// Foreign keys with their payload names
    pub fn references(&self) -> [(&'static str, Option<i32>); 9] {
        [
            ("location_id", self.location_id),
            ("type_id", self.type_id),
            ("mark_id", self.mark_id),
            ("model_id", self.model_id),
            ("system_id", self.system_id),
            ("build_id", self.build_id),
            ("processor_id", self.processor_id),
            ("ram_id", self.ram_id),
            ("disk_id", self.disk_id),
        ]
    }

    pub fn optional_texts(&self) -> [(&'static str, &Option<Option<String>>); 10] {
        [
            ("hostname", &self.hostname),
            ("disk_internal_id", &self.disk_internal_id),
            ("disk_serial", &self.disk_serial),
            ("network_ipv4", &self.network_ipv4),
            ("network_ipv6", &self.network_ipv6),
            ("network_mac", &self.network_mac),
            ("remote_id", &self.remote_id),
            ("serial", &self.serial),
            ("sector", &self.sector),
            ("user_owner", &self.user_owner),
        ]
    }

    pub fn errors(&self, partial: bool) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if !partial || self.internal_id.is_some() {
            check_required(
                &mut errors,
                "internal_id",
                self.internal_id.as_deref(),
                TEXT_FIELD_MAX_LENGTH,
            );
        }
        if !partial {
            for (name, value) in self.references() {
                if value.is_none() {
                    errors.add(name, REQUIRED);
                }
            }
        }
        for (name, value) in self.optional_texts() {
            if let Some(Some(v)) = value
                && v.chars().count() > TEXT_FIELD_MAX_LENGTH
            {
                errors.add(name, max_length_message(TEXT_FIELD_MAX_LENGTH));
            }
        }

        errors
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceItem {
    pub id: i32,
    pub internal_id: String,
    pub hostname: Option<String>,
    pub status: i32,
    #[serde(rename = "type")]
    pub device_type: Option<Brief>,
    pub mark: Option<Brief>,
    pub model: Option<Brief>,
    pub system: Option<Brief>,
    pub build: Option<Brief>,
    pub processor: Option<Brief>,
    pub ram: Option<Brief>,
    pub disk: Option<Brief>,
    pub disk_internal_id: Option<String>,
    pub disk_serial: Option<String>,
    pub network_ipv4: Option<String>,
    pub network_ipv6: Option<String>,
    pub network_mac: Option<String>,
    pub remote_id: Option<String>,
    pub serial: Option<String>,
    pub location: Option<Brief>,
    pub user_owner: Option<String>,
    pub sector: Option<String>,
    pub notes: Option<String>,
    pub sort_order: Option<i32>,
    pub creator: Option<UserInfo>,
    pub updater: Option<UserInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceSoftwareForm {
    pub device_id: Option<i32>,
    pub software_id: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub installed_at: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSoftwareItem {
    pub id: i32,
    pub device: i32,
    pub software: i32,
    pub installed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationTypeItem {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: i32,
    pub is_core: bool,
    pub sort_order: Option<i32>,
    pub creator: Option<UserInfo>,
    pub updater: Option<UserInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationForm {
    #[serde(flatten)]
    pub base: BaseForm,
    pub type_id: Option<i32>,
    pub module: Option<String>,
    pub module_id: Option<i32>,
}

impl NotificationForm {
    pub fn errors(&self, partial: bool) -> FieldErrors {
        let mut errors = self.base.errors(partial);

        if !partial && self.type_id.is_none() {
            errors.add("type_id", REQUIRED);
        }
        if !partial || self.module.is_some() {
            check_required(&mut errors, "module", self.module.as_deref(), TEXT_FIELD_MAX_LENGTH);
        }
        if !partial && self.module_id.is_none() {
            errors.add("module_id", REQUIRED);
        }

        errors
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationItem {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: i32,
    /// Title of the notification type
    #[serde(rename = "type")]
    pub notification_type: String,
    pub module: String,
    pub module_id: i32,
    pub sort_order: Option<i32>,
    pub creator: Option<UserInfo>,
    pub updater: Option<UserInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_form_full_requires_title() {
        let errors = BaseForm::default().errors(false);
        assert_eq!(errors.get("title"), Some(&[REQUIRED.to_string()][..]));

        assert!(BaseForm::default().errors(true).is_empty());
    }

    #[test]
    fn test_base_form_lengths() {
        let form = BaseForm {
            title: Some("t".repeat(201)),
            code_name: Some(Some("c".repeat(51))),
            ..Default::default()
        };
        let errors = form.errors(true);
        assert!(errors.contains("title"));
        assert!(errors.contains("code_name"));
    }

    #[test]
    fn test_catalog_form_ignores_read_only_keys() {
        let form: CatalogForm = serde_json::from_str(
            r#"{"title":"Laptop","is_core":true,"creator":5,"description":null,"is_deprecated":true}"#,
        )
        .unwrap();

        assert_eq!(form.base.title.as_deref(), Some("Laptop"));
        assert_eq!(form.base.description, Some(None));
        assert_eq!(form.base.code_name, None);
        assert_eq!(form.is_deprecated, Some(true));
    }

    #[test]
    fn test_location_form_requires_zone() {
        let form = LocationForm {
            base: BaseForm {
                title: Some("HQ".to_string()),
                ..Default::default()
            },
            zip_code: Some("1234567890123".to_string()),
            ..Default::default()
        };

        let errors = form.errors(false);
        assert!(errors.contains("location_zone_id"));
        assert!(errors.contains("zip_code"));
        assert!(!errors.contains("title"));
    }

    #[test]
    fn test_device_form_requires_references() {
        let errors = DeviceForm::default().errors(false);
        assert!(errors.contains("internal_id"));
        for field in ["location_id", "type_id", "disk_id"] {
            assert!(errors.contains(field), "{}", field);
        }

        assert!(DeviceForm::default().errors(true).is_empty());
    }

    #[test]
    fn test_device_item_renames_type() {
        let item = DeviceItem {
            id: 1,
            internal_id: "D-1".to_string(),
            hostname: None,
            status: 1,
            device_type: Some(Brief {
                id: 2,
                title: "Laptop".to_string(),
                description: None,
            }),
            mark: None,
            model: None,
            system: None,
            build: None,
            processor: None,
            ram: None,
            disk: None,
            disk_internal_id: None,
            disk_serial: None,
            network_ipv4: None,
            network_ipv6: None,
            network_mac: None,
            remote_id: None,
            serial: None,
            location: None,
            user_owner: None,
            sector: None,
            notes: None,
            sort_order: None,
            creator: None,
            updater: None,
            created_at: Utc::now(),
            updated_at: None,
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"]["title"], "Laptop");
        assert!(json.get("device_type").is_none());
    }
}
