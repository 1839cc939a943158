use serde::{Deserialize, Serialize};

/// One email / secret code / sold entry.
///
/// The secret travels as `code` in JSON files and in the `email_codes` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialRecord {
    pub email: String,
    #[serde(rename = "code")]
    pub secret: String,
    pub sold: bool,
}

impl CredentialRecord {
    pub fn new(email: impl Into<String>, secret: impl Into<String>, sold: bool) -> Self {
        Self {
            email: email.into(),
            secret: secret.into(),
            sold,
        }
    }

    /// Records without an email cannot be keyed in the database.
    pub fn has_key(&self) -> bool {
        !self.email.trim().is_empty()
    }
}
