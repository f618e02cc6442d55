//! Admin allow-list.
//!
//! Membership is an exact byte comparison against the comma-separated
//! entries. Entries are not trimmed or case-folded. Empty entries never
//! match. This list only gates the client UI; the backend enforces access.

/// Parsed allow-list of admin email addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminAllowList {
    emails: Vec<String>,
}

impl AdminAllowList {
    pub fn parse(raw: &str) -> Self {
        let emails = raw
            .split(',')
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect();
        Self { emails }
    }

    pub fn contains(&self, email: &str) -> bool {
        self.emails.iter().any(|entry| entry == email)
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}
