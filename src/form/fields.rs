//! Complaint record to form field mapping
//!
//! Field labels below are the exact names carried by the bundled F700-200-000 form.
//! A label that drifts from the template is silently dropped by the filler, so these
//! strings must stay character-for-character identical to the form.

use chrono::{Local, NaiveDate};

use crate::types::{Address, ComplaintRecord, MyInfo};

// Section A: complainant
pub const NAME: &str = "Name (As it appears on your ID - First Middle Last Name)";
pub const PREFERRED_LANGUAGE: &str = "Preferred Language";
pub const MAILING_ADDRESS: &str = "Mailing Address";
pub const MAILING_ADDRESS_CITY: &str = "Mailing Address City";
pub const MAILING_ADDRESS_STATE: &str = "Mailing Address State";
pub const MAILING_ADDRESS_ZIP: &str = "Mailing Address Zip Code";
pub const PHONE: &str = "Phone Number";
pub const EMAIL: &str = "Email Address";
pub const STARTING_DATE: &str = "Starting Date with this Employer";
pub const STILL_EMPLOYED: &str = "Are you still employed with the employer?";
pub const LAST_DATE_EMPLOYED: &str = "If \"No\", last date employed";
pub const REASON_FOR_LEAVING: &str = "Reason for Leaving";
pub const REASON_FOR_LEAVING_OTHER: &str = "Reason for Leaving: Don't Know/Other Specified";
pub const KIND_OF_WORK: &str = "What kind of work do you do?";
pub const NO_POSTED_RANGE: &str = "Not providing wage or salary range, benefits, and other compensation on a job posting";

// Section B: company
pub const COMPANY_NAME: &str = "Company Name";
pub const COMPANY_ADDRESS: &str = "Company Address";
pub const COMPANY_ADDRESS_CITY: &str = "Company Address City";
pub const COMPANY_ADDRESS_STATE: &str = "Company Address State";
pub const COMPANY_ADDRESS_ZIP: &str = "Company Address Zip Code";
pub const COMPANY_MAILING_ADDRESS: &str = "Company Mailing Address";
pub const COMPANY_MAILING_ADDRESS_CITY: &str = "Company Mailing Address City";
pub const COMPANY_MAILING_ADDRESS_STATE: &str = "Company Mailing Address State";
pub const COMPANY_MAILING_ADDRESS_ZIP: &str = "Company Mailing Address Zip Code";
pub const COMPANY_PHONE: &str = "Company Phone Number";
pub const COMPANY_EMAIL: &str = "Company Email Address";
pub const STILL_IN_BUSINESS: &str = "Is the company still in business?";

// Section C: confirmation
pub const CONFIRMATION: &str = "By submitting this form, I am confirming the information provided is accurate and true. I am also agreeing to cooperate and communicate with my assigned investigator. My name on this form constitutes my signature";

// Section D: signature
pub const SIGNATURE: &str = "Signature (Print or Type)";
pub const SIGNATURE_DATE: &str = "Signature Date";

/// Radio export value for "No" on the still-employed question
pub const NOT_EMPLOYED: &str = "Choice1";
pub const REASON_UNKNOWN: &str = "Don't Know/Other";
pub const NOT_APPLICABLE: &str = "N/A";
pub const AFFIRMATIVE: &str = "Yes";
pub const LANGUAGE: &str = "English";
pub const WORK_DESCRIPTION: &str = "Identify violations of RCW 49.58.110";
pub const ANONYMOUS: &str = "Anonymous";

const ADDRESS_KEYS: [&str; 4] = [
    MAILING_ADDRESS,
    MAILING_ADDRESS_CITY,
    MAILING_ADDRESS_STATE,
    MAILING_ADDRESS_ZIP,
];
const COMPANY_ADDRESS_KEYS: [&str; 4] = [
    COMPANY_ADDRESS,
    COMPANY_ADDRESS_CITY,
    COMPANY_ADDRESS_STATE,
    COMPANY_ADDRESS_ZIP,
];
const COMPANY_MAILING_KEYS: [&str; 4] = [
    COMPANY_MAILING_ADDRESS,
    COMPANY_MAILING_ADDRESS_CITY,
    COMPANY_MAILING_ADDRESS_STATE,
    COMPANY_MAILING_ADDRESS_ZIP,
];

/// One step of the identity decision table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityRule {
    /// The complainant's own name
    Name,
    /// `Anonymous (<email>)`
    AnonymousWithEmail,
    /// Literal `Anonymous`
    Anonymous,
}

/// Rules for the printed name, highest priority first
pub const NAME_RULES: &[IdentityRule] = &[IdentityRule::Name, IdentityRule::Anonymous];

/// Rules for the signature, highest priority first
pub const SIGNATURE_RULES: &[IdentityRule] = &[
    IdentityRule::Name,
    IdentityRule::AnonymousWithEmail,
    IdentityRule::Anonymous,
];

impl IdentityRule {
    pub fn apply(self, info: &MyInfo) -> Option<String> {
        match self {
            IdentityRule::Name => info.name().map(str::to_owned),
            IdentityRule::AnonymousWithEmail => info.email().map(|email| format!("{ANONYMOUS} ({email})")),
            IdentityRule::Anonymous => Some(ANONYMOUS.to_owned()),
        }
    }
}

/// First rule that yields a value wins
pub fn resolve_identity(rules: &[IdentityRule], info: &MyInfo) -> String {
    rules
        .iter()
        .find_map(|rule| rule.apply(info))
        .unwrap_or_else(|| ANONYMOUS.to_owned())
}

/// Ordered form field name to value mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(&'static str, String)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing an earlier value in place so order stays stable
    pub fn insert(&mut self, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.entries.iter().map(|(n, v)| (*n, v.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(n, _)| *n)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert_address(&mut self, keys: [&'static str; 4], address: &Address) {
        let [street, city, state, zip] = keys;
        self.insert(street, address.street.as_str());
        self.insert(city, address.city.as_str());
        self.insert(state, address.state.as_str());
        self.insert(zip, address.zip_code.as_str());
    }
}

/// Formats a signature date as `October 8, 2026`
pub fn format_signature_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Maps a complaint record onto the form, signed on `date`
pub fn map_fields(record: &ComplaintRecord, date: NaiveDate) -> FieldMap {
    let info = &record.my_info;
    let mut fields = FieldMap::new();

    fields.insert(NAME, resolve_identity(NAME_RULES, info));
    fields.insert(PREFERRED_LANGUAGE, LANGUAGE);
    if let Some(address) = &info.address {
        fields.insert_address(ADDRESS_KEYS, address);
    }
    if let Some(phone) = info.phone() {
        fields.insert(PHONE, phone);
    }
    if let Some(email) = info.email() {
        fields.insert(EMAIL, email);
    }
    fields.insert(STARTING_DATE, NOT_APPLICABLE);
    fields.insert(STILL_EMPLOYED, NOT_EMPLOYED);
    fields.insert(LAST_DATE_EMPLOYED, NOT_APPLICABLE);
    fields.insert(REASON_FOR_LEAVING, REASON_UNKNOWN);
    fields.insert(REASON_FOR_LEAVING_OTHER, NOT_APPLICABLE);
    fields.insert(KIND_OF_WORK, WORK_DESCRIPTION);
    fields.insert(NO_POSTED_RANGE, AFFIRMATIVE);

    fields.insert(COMPANY_NAME, record.company_name.as_str());
    if let Some(address) = &record.company_address {
        fields.insert_address(COMPANY_ADDRESS_KEYS, address);
    }
    if let Some(address) = &record.company_mailing_address {
        fields.insert_address(COMPANY_MAILING_KEYS, address);
    }
    if let Some(phone) = record.company_phone() {
        fields.insert(COMPANY_PHONE, phone);
    }
    if let Some(email) = record.company_email() {
        fields.insert(COMPANY_EMAIL, email);
    }
    fields.insert(STILL_IN_BUSINESS, AFFIRMATIVE);

    fields.insert(CONFIRMATION, AFFIRMATIVE);

    fields.insert(SIGNATURE, resolve_identity(SIGNATURE_RULES, info));
    fields.insert(SIGNATURE_DATE, format_signature_date(date));

    fields
}

/// [`map_fields`] signed with today's local date
pub fn map_fields_today(record: &ComplaintRecord) -> FieldMap {
    map_fields(record, Local::now().date_naive())
}
