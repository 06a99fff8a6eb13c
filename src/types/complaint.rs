//! Complaint record data model
//! Author: kartik4091
//! Created: 2025-06-07

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Postal address. Either all four parts are meaningful or the whole address is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl Address {
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip_code: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            state: state.into(),
            zip_code: zip_code.into(),
        }
    }

    /// Builds an address from optional parts.
    ///
    /// No parts yields `None`; a partial set is rejected instead of producing a
    /// half-filled address block on the form.
    pub fn from_parts(
        label: &str,
        street: Option<String>,
        city: Option<String>,
        state: Option<String>,
        zip_code: Option<String>,
    ) -> Result<Option<Self>> {
        let parts = [street, city, state, zip_code].map(|p| p.filter(|v| !v.trim().is_empty()));
        match parts {
            [None, None, None, None] => Ok(None),
            [Some(street), Some(city), Some(state), Some(zip_code)] => {
                Ok(Some(Self::new(street, city, state, zip_code)))
            }
            _ => Err(Error::InvalidRecord(format!(
                "{label} needs street, city, state and zip code together"
            ))),
        }
    }
}

/// Complainant contact details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MyInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
}

impl MyInfo {
    /// Name, treating an empty string as absent
    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name)
    }

    /// Email, treating an empty string as absent
    pub fn email(&self) -> Option<&str> {
        non_empty(&self.email)
    }

    pub fn phone(&self) -> Option<&str> {
        non_empty(&self.phone)
    }

    pub fn is_anonymous(&self) -> bool {
        self.name().is_none()
    }
}

/// The structured input of one assembly run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintRecord {
    #[serde(default)]
    pub my_info: MyInfo,
    pub company_name: String,
    #[serde(default)]
    pub company_email: Option<String>,
    #[serde(default)]
    pub company_phone: Option<String>,
    #[serde(default)]
    pub company_address: Option<Address>,
    #[serde(default)]
    pub company_mailing_address: Option<Address>,
    #[serde(default)]
    pub additional_information: Option<String>,
    #[serde(default)]
    pub evidence_files: Vec<PathBuf>,
    #[serde(default)]
    pub redact_words: BTreeSet<String>,
}

impl ComplaintRecord {
    pub fn new(my_info: MyInfo, company_name: impl Into<String>) -> Self {
        Self {
            my_info,
            company_name: company_name.into(),
            company_email: None,
            company_phone: None,
            company_address: None,
            company_mailing_address: None,
            additional_information: None,
            evidence_files: Vec::new(),
            redact_words: BTreeSet::new(),
        }
    }

    /// Reads a record file, trying JSON first and then YAML
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::InvalidRecord(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .or_else(|_| serde_yaml::from_str(&content))
            .map_err(|e| Error::InvalidRecord(format!("{}: {}", path.display(), e)))
    }

    pub fn with_company_email(mut self, email: impl Into<String>) -> Self {
        self.company_email = Some(email.into());
        self
    }

    pub fn with_company_phone(mut self, phone: impl Into<String>) -> Self {
        self.company_phone = Some(phone.into());
        self
    }

    pub fn with_company_address(mut self, address: Address) -> Self {
        self.company_address = Some(address);
        self
    }

    pub fn with_company_mailing_address(mut self, address: Address) -> Self {
        self.company_mailing_address = Some(address);
        self
    }

    pub fn with_additional_information(mut self, text: impl Into<String>) -> Self {
        self.additional_information = Some(text.into());
        self
    }

    pub fn with_evidence<P: Into<PathBuf>>(mut self, files: impl IntoIterator<Item = P>) -> Self {
        self.evidence_files.extend(files.into_iter().map(Into::into));
        self
    }

    pub fn with_redact_words<S: Into<String>>(mut self, words: impl IntoIterator<Item = S>) -> Self {
        self.redact_words.extend(words.into_iter().map(Into::into));
        self
    }

    pub fn company_email(&self) -> Option<&str> {
        non_empty(&self.company_email)
    }

    pub fn company_phone(&self) -> Option<&str> {
        non_empty(&self.company_phone)
    }

    /// Addendum text, `None` when absent or blank
    pub fn additional_information(&self) -> Option<&str> {
        self.additional_information
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }

    pub fn wants_redaction(&self) -> bool {
        !self.redact_words.is_empty()
    }

    /// Checks the invariants every pipeline stage relies on
    pub fn validate(&self) -> Result<()> {
        if self.company_name.trim().is_empty() {
            return Err(Error::InvalidRecord("company name is required".into()));
        }
        if self.redact_words.iter().any(|w| w.is_empty()) {
            return Err(Error::InvalidRecord("redact words must not be empty".into()));
        }
        Ok(())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
