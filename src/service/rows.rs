use crate::types::CredentialRecord;
use std::collections::HashMap;

/// Ordered list of records; insertion order is display order.
///
/// Duplicate emails are allowed here and in the JSON file. They only collapse
/// when pushed to the database, where email is the key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowCollection {
    rows: Vec<CredentialRecord>,
}

impl RowCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: CredentialRecord) {
        self.rows.push(record);
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = CredentialRecord>) {
        self.rows.extend(records);
    }

    pub fn all(&self) -> &[CredentialRecord] {
        &self.rows
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut CredentialRecord> {
        self.rows.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Emails that occur more than once, in first-seen order.
    pub fn duplicate_emails(&self) -> Vec<&str> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut dups = Vec::new();
        for row in self.rows.iter().filter(|r| r.has_key()) {
            let count = seen.entry(row.email.as_str()).or_default();
            *count += 1;
            if *count == 2 {
                dups.push(row.email.as_str());
            }
        }
        dups
    }
}

impl From<Vec<CredentialRecord>> for RowCollection {
    fn from(rows: Vec<CredentialRecord>) -> Self {
        Self { rows }
    }
}
