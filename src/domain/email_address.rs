use std::fmt;

use validator::ValidateEmail;

/// Syntactically valid email address
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parse an email address, ignoring surrounding whitespace
    pub fn parse(email: &str) -> Result<Self, String> {
        let email = email.trim();
        if !email.is_empty() && email.validate_email() {
            Ok(Self(email.to_string()))
        } else {
            Err(format!("{email} is not a valid email address"))
        }
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}
