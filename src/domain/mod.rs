mod addon_settings;
mod email_address;
mod subscriber_record;

pub use addon_settings::{AddonSettings, LicenseStatus, SettingField, DEFAULT_LABEL};
pub use email_address::EmailAddress;
pub use subscriber_record::SubscriberRecord;
