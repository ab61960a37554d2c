use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidateUrl, ValidationError};

use crate::auth::UserId;

/// Application status of a job record
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JobStatus {
    #[default]
    Applied,
    Interview,
    Offer,
    Rejected,
}

impl JobStatus {
    pub const ALL: [JobStatus; 4] = [
        JobStatus::Applied,
        JobStatus::Interview,
        JobStatus::Offer,
        JobStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Applied => "Applied",
            JobStatus::Interview => "Interview",
            JobStatus::Offer => "Offer",
            JobStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown job status: {}", s))
    }
}

/// Salary as the client sent it, either a number or free text
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Salary {
    Amount(serde_json::Number),
    Text(String),
}

impl Salary {
    fn normalized(self) -> Option<Salary> {
        match self {
            Salary::Text(text) => non_blank(Some(text)).map(Salary::Text),
            amount => Some(amount),
        }
    }
}

/// A stored job application
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: Uuid,
    pub owner_id: UserId,
    pub company: String,
    pub role: String,
    pub status: JobStatus,
    pub location: Option<String>,
    pub salary: Option<Salary>,
    pub date_applied: Option<NaiveDate>,
    pub notes: Option<String>,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a job
///
/// `company` and `role` default to empty so a missing field reports the same
/// validation message as a blank one.
#[derive(Deserialize, Debug, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Company is required"))]
    pub company: String,

    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Role is required"))]
    pub role: String,

    pub status: Option<JobStatus>,
    pub location: Option<String>,
    pub salary: Option<Salary>,

    #[serde(default, deserialize_with = "deserialize_date")]
    pub date_applied: Option<NaiveDate>,

    pub notes: Option<String>,

    #[validate(custom(function = "validate_link", message = "Link must be a valid URL"))]
    pub link: Option<String>,
}

/// Normalized record contents ready to be inserted
#[derive(Debug, Clone)]
pub struct JobDraft {
    pub owner_id: UserId,
    pub company: String,
    pub role: String,
    pub status: JobStatus,
    pub location: Option<String>,
    pub salary: Option<Salary>,
    pub date_applied: Option<NaiveDate>,
    pub notes: Option<String>,
    pub link: Option<String>,
}

impl NewJob {
    /// Attach the owner and normalize the payload into a draft
    pub fn into_draft(self, owner_id: UserId) -> JobDraft {
        JobDraft {
            owner_id,
            company: self.company.trim().to_string(),
            role: self.role.trim().to_string(),
            status: self.status.unwrap_or_default(),
            location: non_blank(self.location),
            salary: self.salary.and_then(Salary::normalized),
            date_applied: self.date_applied,
            notes: non_blank(self.notes),
            link: non_blank(self.link),
        }
    }
}

/// Request body for a partial update
///
/// Absent fields are left alone. Optional fields sent as `null` or blank are
/// cleared. Anything not listed here (`id`, `ownerId`, `createdAt`, ...) is ignored.
#[derive(Deserialize, Debug, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    #[validate(custom(function = "validate_not_blank", message = "Company cannot be empty"))]
    pub company: Option<String>,

    #[validate(custom(function = "validate_not_blank", message = "Role cannot be empty"))]
    pub role: Option<String>,

    pub status: Option<JobStatus>,

    #[serde(default, deserialize_with = "deserialize_clearable_text")]
    pub location: Option<String>,

    #[serde(default, deserialize_with = "deserialize_present")]
    pub salary: Option<Option<Salary>>,

    #[serde(default, deserialize_with = "deserialize_clearable_date")]
    pub date_applied: Option<Option<NaiveDate>>,

    #[serde(default, deserialize_with = "deserialize_clearable_text")]
    pub notes: Option<String>,

    #[serde(default, deserialize_with = "deserialize_clearable_text")]
    #[validate(custom(function = "validate_link", message = "Link must be a valid URL"))]
    pub link: Option<String>,
}

/// Normalized field changes; `None` leaves a field as is, `Some(None)` clears it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobChanges {
    pub company: Option<String>,
    pub role: Option<String>,
    pub status: Option<JobStatus>,
    pub location: Option<Option<String>>,
    pub salary: Option<Option<Salary>>,
    pub date_applied: Option<Option<NaiveDate>>,
    pub notes: Option<Option<String>>,
    pub link: Option<Option<String>>,
}

impl JobPatch {
    pub fn into_changes(self) -> JobChanges {
        JobChanges {
            company: self.company.map(|c| c.trim().to_string()),
            role: self.role.map(|r| r.trim().to_string()),
            status: self.status,
            location: self.location.map(|v| non_blank(Some(v))),
            salary: self.salary.map(|s| s.and_then(Salary::normalized)),
            date_applied: self.date_applied,
            notes: self.notes.map(|v| non_blank(Some(v))),
            link: self.link.map(|v| non_blank(Some(v))),
        }
    }
}

impl JobChanges {
    /// Apply the changes to a record in place
    pub fn apply_to(&self, record: &mut JobRecord) {
        if let Some(company) = &self.company {
            record.company = company.clone();
        }
        if let Some(role) = &self.role {
            record.role = role.clone();
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(location) = &self.location {
            record.location = location.clone();
        }
        if let Some(salary) = &self.salary {
            record.salary = salary.clone();
        }
        if let Some(date_applied) = self.date_applied {
            record.date_applied = date_applied;
        }
        if let Some(notes) = &self.notes {
            record.notes = notes.clone();
        }
        if let Some(link) = &self.link {
            record.link = link.clone();
        }
    }
}

/// Query string accepted by the list endpoint
#[derive(Deserialize, Debug, Default)]
pub struct JobQuery {
    pub status: Option<String>,
    pub company: Option<String>,
    pub search: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Blank links are allowed and stored as absent
fn validate_link(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() || value.validate_url() {
        Ok(())
    } else {
        Err(ValidationError::new("url"))
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp; empty means not recorded
fn parse_date(raw: &str) -> Result<Option<NaiveDate>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| Some(dt.date_naive()))
        .map_err(|_| format!("invalid date: {}", raw))
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_date(&raw).map_err(de::Error::custom),
        None => Ok(None),
    }
}

fn deserialize_clearable_date<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_date(deserializer).map(Some)
}

/// Only runs when the field is present, so `null` becomes `Some(None)`
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Present text field; `null` is read as an empty string, which clears it
fn deserialize_clearable_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|v| Some(v.unwrap_or_default()))
}
