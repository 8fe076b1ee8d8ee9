use std::{io, time};

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::domain::SubscriberRecord;

/// Mad Mimi API client error type
#[derive(thiserror::Error, Debug)]
pub enum MadMimiError {
    #[error("Failed to reach the Mad Mimi API")]
    Transport(#[from] reqwest::Error),
    #[error("Failed to encode the subscriber record")]
    Encoding(#[from] csv::Error),
    #[error("Failed to encode the subscriber record")]
    Io(#[from] io::Error),
    #[error("Invalid Mad Mimi endpoint")]
    Url(#[from] url::ParseError),
}

/// Mad Mimi API client
#[derive(Clone, Debug)]
pub struct MadMimiClient {
    http_client: Client,
    base_url: Url,
}

impl MadMimiClient {
    pub fn new(base_url: Url, timeout: time::Duration) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
        }
    }

    /// Fetch the raw audience lists document of an account
    ///
    /// The body is returned whatever the status code: Mad Mimi answers bad
    /// credentials with a plain-text body, which callers detect by parsing.
    /// <https://madmimi.com/developer/lists>
    #[tracing::instrument(name = "Fetch Mad Mimi lists", skip(self, api_key))]
    pub async fn lists(
        &self,
        username: &str,
        api_key: &SecretString,
    ) -> Result<String, MadMimiError> {
        let url = self.base_url.join("/audience_lists/lists.xml")?;
        let body = self
            .http_client
            .get(url)
            .query(&[
                ("username", username),
                ("api_key", api_key.expose_secret()),
            ])
            .send()
            .await?
            .text()
            .await?;
        Ok(body)
    }

    /// Add a subscriber to the list named in the record
    /// <https://madmimi.com/developer/lists/add-membership>
    #[tracing::instrument(
        name = "Add Mad Mimi subscriber",
        skip(self, api_key, record),
        fields(target_list = %record.target_list)
    )]
    pub async fn add_user(
        &self,
        username: &str,
        api_key: &SecretString,
        record: &SubscriberRecord,
    ) -> Result<(), MadMimiError> {
        let url = self.base_url.join("/audience_members")?;
        let csv_file = subscriber_csv(record)?;
        self.http_client
            .post(url)
            .form(&[
                ("username", username),
                ("api_key", api_key.expose_secret()),
                ("csv_file", csv_file.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Encode a subscriber as a two-row CSV document (header, values)
fn subscriber_csv(record: &SubscriberRecord) -> Result<String, MadMimiError> {
    let mut header = vec!["add_list", "email"];
    let mut values = vec![record.target_list.as_str(), record.email.as_str()];
    if let Some(first_name) = &record.first_name {
        header.push("firstName");
        values.push(first_name.as_str());
    }
    if let Some(last_name) = &record.last_name {
        header.push("lastName");
        values.push(last_name.as_str());
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(&header)?;
    writer.write_record(&values)?;
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;

    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}
