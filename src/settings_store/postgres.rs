use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{AddonSettings, LicenseStatus};
use crate::settings_store::{
    decode_license_status, decode_settings, encode_settings, SettingsStore, StoreError,
    LICENSE_STATUS_OPTION, SETTINGS_OPTION,
};

/// Settings store backed by the `addon_options` table
pub struct PgSettingsStore {
    db_pool: PgPool,
}

impl PgSettingsStore {
    pub const fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.db_pool).await
    }

    /// Read a single option value
    #[tracing::instrument(name = "Read add-on option", skip(self))]
    async fn read_option(&self, option_name: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let value = sqlx::query_scalar::<_, serde_json::Value>(
            r#"
            SELECT option_value
            FROM addon_options
            WHERE option_name = $1
            "#,
        )
        .bind(option_name)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(value)
    }

    /// Insert or replace a single option value
    #[tracing::instrument(name = "Write add-on option", skip(self, option_value))]
    async fn write_option(
        &self,
        option_name: &str,
        option_value: serde_json::Value,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO addon_options (option_name, option_value, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (option_name)
            DO UPDATE SET option_value = EXCLUDED.option_value, updated_at = now()
            "#,
        )
        .bind(option_name)
        .bind(option_value)
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }

    /// Delete a single option value
    #[tracing::instrument(name = "Delete add-on option", skip(self))]
    async fn delete_option(&self, option_name: &str) -> Result<(), StoreError> {
        sqlx::query(r#"DELETE FROM addon_options WHERE option_name = $1"#)
            .bind(option_name)
            .execute(&self.db_pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl SettingsStore for PgSettingsStore {
    async fn load(&self) -> Result<AddonSettings, StoreError> {
        match self.read_option(SETTINGS_OPTION).await? {
            Some(value) => decode_settings(value),
            None => Ok(AddonSettings::default()),
        }
    }

    async fn save(&self, settings: &AddonSettings) -> Result<(), StoreError> {
        self.write_option(SETTINGS_OPTION, encode_settings(settings)?)
            .await
    }

    async fn license_status(&self) -> Result<LicenseStatus, StoreError> {
        Ok(self
            .read_option(LICENSE_STATUS_OPTION)
            .await?
            .as_ref()
            .map_or(LicenseStatus::Unknown, decode_license_status))
    }

    async fn set_license_status(&self, status: LicenseStatus) -> Result<(), StoreError> {
        self.write_option(LICENSE_STATUS_OPTION, status.as_str().into())
            .await
    }

    async fn clear_license_status(&self) -> Result<(), StoreError> {
        self.delete_option(LICENSE_STATUS_OPTION).await
    }

    #[tracing::instrument(name = "Install default add-on settings", skip(self))]
    async fn install_defaults(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO addon_options (option_name, option_value)
            VALUES ($1, $2)
            ON CONFLICT (option_name) DO NOTHING
            "#,
        )
        .bind(SETTINGS_OPTION)
        .bind(encode_settings(&AddonSettings::default())?)
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(name = "Uninstall add-on settings", skip(self))]
    async fn uninstall(&self) -> Result<(), StoreError> {
        let mut transaction = self.db_pool.begin().await?;
        sqlx::query(r#"DELETE FROM addon_options WHERE option_name = ANY($1)"#)
            .bind(vec![SETTINGS_OPTION.to_string(), LICENSE_STATUS_OPTION.to_string()])
            .execute(&mut *transaction)
            .await?;
        transaction.commit().await?;

        Ok(())
    }
}
