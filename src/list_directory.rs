//! Mailing lists available to a Mad Mimi account, and their dropdown markup.

use std::fmt::Write;

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use secrecy::{ExposeSecret, SecretString};

use crate::madmimi_client::{MadMimiClient, MadMimiError};

/// Why the lists of an account could not be retrieved
#[derive(thiserror::Error, Debug)]
pub enum ListDirectoryError {
    /// Mad Mimi answers bad credentials with a body that is not a lists document
    #[error("Invalid credentials. Please try again.")]
    InvalidCredentials,
    #[error("Unable to reach Mad Mimi. Please try again later.")]
    Transport(#[source] MadMimiError),
}

/// Outcome of a list lookup
#[derive(Debug)]
pub enum ListDirectoryResult {
    /// Username or API key missing, nothing was fetched
    Unconfigured,
    /// List names in the order Mad Mimi returned them
    Lists(Vec<String>),
    Error(ListDirectoryError),
}

impl ListDirectoryResult {
    /// List names, empty unless the lookup succeeded
    pub fn names(&self) -> &[String] {
        match self {
            Self::Lists(names) => names,
            Self::Unconfigured | Self::Error(_) => &[],
        }
    }
}

/// Lists document parsing error type
#[derive(thiserror::Error, Debug)]
pub enum ListParseError {
    #[error("Malformed lists document")]
    Xml(#[from] quick_xml::Error),
    #[error("Malformed list attribute")]
    Attribute(#[from] AttrError),
    #[error("The document root is not a <lists> element")]
    MissingLists,
    #[error("The document ends before its elements are closed")]
    Unclosed,
    #[error("Unexpected content outside the <lists> element")]
    StrayContent,
}

/// Extract the `name` attribute of every `<list>` directly inside `<lists>`
///
/// The document must be well formed, with `<lists>` as its only root.
pub fn parse_list_names(xml: &str) -> Result<Vec<String>, ListParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut names = Vec::new();
    let mut depth = 0_usize;
    let mut root_closed = false;
    loop {
        let event = reader.read_event()?;
        if root_closed && !matches!(event, Event::Eof | Event::Comment(_) | Event::PI(_)) {
            if is_blank(&event) {
                continue;
            }
            return Err(ListParseError::StrayContent);
        }
        match event {
            Event::Start(e) => {
                match (depth, e.name().as_ref()) {
                    (0, b"lists") => {}
                    (0, _) => return Err(ListParseError::MissingLists),
                    (1, b"list") => push_list_name(&e, &mut names)?,
                    _ => {}
                }
                depth += 1;
            }
            Event::Empty(e) => match (depth, e.name().as_ref()) {
                (0, b"lists") => root_closed = true,
                (0, _) => return Err(ListParseError::MissingLists),
                (1, b"list") => push_list_name(&e, &mut names)?,
                _ => {}
            },
            Event::End(_) => {
                depth = depth.checked_sub(1).ok_or(ListParseError::StrayContent)?;
                root_closed = depth == 0;
            }
            Event::Text(_) | Event::CData(_) if depth == 0 && !is_blank(&event) => {
                return Err(ListParseError::MissingLists);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match (root_closed, depth) {
        (true, _) => Ok(names),
        (false, 0) => Err(ListParseError::MissingLists),
        (false, _) => Err(ListParseError::Unclosed),
    }
}

fn push_list_name(list: &BytesStart<'_>, names: &mut Vec<String>) -> Result<(), ListParseError> {
    if let Some(name) = list.try_get_attribute("name")? {
        names.push(name.unescape_value()?.into_owned());
    }
    Ok(())
}

fn is_blank(event: &Event<'_>) -> bool {
    match event {
        Event::Text(text) => text.iter().all(u8::is_ascii_whitespace),
        Event::CData(data) => data.iter().all(u8::is_ascii_whitespace),
        _ => false,
    }
}

/// List lookups against Mad Mimi
#[derive(Clone)]
pub struct ListDirectory {
    client: MadMimiClient,
}

impl ListDirectory {
    pub const fn new(client: MadMimiClient) -> Self {
        Self { client }
    }

    /// Fetch the lists of an account
    #[tracing::instrument(name = "Fetch list directory", skip(self, api_key))]
    pub async fn fetch_lists(&self, username: &str, api_key: &SecretString) -> ListDirectoryResult {
        let username = username.trim();
        if username.is_empty() || api_key.expose_secret().trim().is_empty() {
            return ListDirectoryResult::Unconfigured;
        }

        let body = match self.client.lists(username, api_key).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Failed to fetch the Mad Mimi lists"
                );
                return ListDirectoryResult::Error(ListDirectoryError::Transport(e));
            }
        };

        match parse_list_names(&body) {
            Ok(names) => ListDirectoryResult::Lists(names),
            Err(e) => {
                tracing::info!(
                    error.message = %e,
                    "Mad Mimi returned an unreadable lists document, assuming bad credentials"
                );
                ListDirectoryResult::Error(ListDirectoryError::InvalidCredentials)
            }
        }
    }
}

/// Render the list dropdown, marking `selected` if it is among the lists
pub fn render_dropdown(result: &ListDirectoryResult, selected: &str) -> String {
    match result {
        ListDirectoryResult::Unconfigured => {
            disabled_dropdown("", "No lists to select from at this time.")
        }
        ListDirectoryResult::Error(e) => disabled_dropdown(" class=\"madmimi-error\"", &e.to_string()),
        ListDirectoryResult::Lists(names) => {
            let mut html = String::from(r#"<select id="madmimi-lists" name="list_name">"#);
            for name in names {
                let value = htmlescape::encode_attribute(name);
                let text = htmlescape::encode_minimal(name);
                let marker = if name == selected { " selected=\"selected\"" } else { "" };
                let _ = write!(html, r#"<option value="{value}"{marker}>{text}</option>"#);
            }
            html.push_str("</select>");
            html
        }
    }
}

fn disabled_dropdown(class: &str, message: &str) -> String {
    format!(
        r#"<select id="madmimi-lists"{class} name="list_name" disabled="disabled"><option value="none">{}</option></select>"#,
        htmlescape::encode_minimal(message)
    )
}
