use crate::domain::EmailAddress;

/// Subscriber to be added to a Mad Mimi list
///
/// Guest checkouts carry no name fields, so those are left out of the
/// record instead of being sent empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriberRecord {
    pub target_list: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl SubscriberRecord {
    /// Record for a newly registered user; missing names become empty strings
    pub fn registered(
        target_list: &str,
        email: EmailAddress,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Self {
        Self {
            target_list: target_list.to_string(),
            email: email.into(),
            first_name: Some(first_name.map(str::trim).unwrap_or_default().to_string()),
            last_name: Some(last_name.map(str::trim).unwrap_or_default().to_string()),
        }
    }

    /// Record for a guest checkout, whose email was already checked upstream
    pub fn guest(target_list: &str, email: &str) -> Self {
        Self {
            target_list: target_list.to_string(),
            email: email.trim().to_string(),
            first_name: None,
            last_name: None,
        }
    }
}
