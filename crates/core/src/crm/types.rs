//! Records exchanged with the CRM.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status every generated case is created with.
pub const CASE_STATUS_NEW: &str = "New";

/// Origin every generated case is created with.
pub const CASE_ORIGIN_WEB: &str = "Web";

/// A customer account, read-only.
///
/// Serialized with the CRM's field names so `/accounts` returns `{"Id", "Name"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
}

impl Account {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Identifier of a created case record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(pub String);

impl CaseId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CaseId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A case to be created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCase {
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Status")]
    pub status: &'static str,
    #[serde(rename = "Origin")]
    pub origin: &'static str,
    #[serde(rename = "AccountId", skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

impl NewCase {
    /// Build a case with the fixed `New` status and `Web` origin.
    pub fn new(subject: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            description: description.into(),
            status: CASE_STATUS_NEW,
            origin: CASE_ORIGIN_WEB,
            account_id: None,
        }
    }

    pub fn with_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_case_serializes_crm_fields() {
        let case = NewCase::new("Login broken", "Cannot log in since Monday");
        let json = serde_json::to_value(&case).unwrap();
        assert_eq!(json["Subject"], "Login broken");
        assert_eq!(json["Status"], "New");
        assert_eq!(json["Origin"], "Web");
        assert!(json.get("AccountId").is_none());
    }

    #[test]
    fn test_new_case_with_account() {
        let case = NewCase::new("s", "d").with_account("001xx000003DGb2AAG");
        let json = serde_json::to_value(&case).unwrap();
        assert_eq!(json["AccountId"], "001xx000003DGb2AAG");
    }

    #[test]
    fn test_account_deserializes_record_with_attributes() {
        let record = r#"{
            "attributes": {"type": "Account", "url": "/services/data/v59.0/sobjects/Account/001"},
            "Id": "001",
            "Name": "St. Mary Clinic"
        }"#;
        let account: Account = serde_json::from_str(record).unwrap();
        assert_eq!(account, Account::new("001", "St. Mary Clinic"));
    }
}
