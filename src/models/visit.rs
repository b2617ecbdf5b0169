//! Visit model and related request/response types

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Lifecycle status of a visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    CheckedIn,
    CheckedOut,
}

impl VisitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitStatus::CheckedIn => "checked_in",
            VisitStatus::CheckedOut => "checked_out",
        }
    }
}

impl std::fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VisitStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checked_in" => Ok(VisitStatus::CheckedIn),
            "checked_out" => Ok(VisitStatus::CheckedOut),
            _ => Err(format!("Invalid visit status: {}", s)),
        }
    }
}

// SQLx conversion for VisitStatus (stored as VARCHAR)
impl sqlx::Type<Postgres> for VisitStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for VisitStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for VisitStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// One recorded stay of a visitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Visit {
    pub id: i32,
    pub full_name: String,
    /// RFID card or QR pass bound to this visit
    pub rfid_card_id: Option<String>,
    pub phone_number: String,
    /// Company, affiliation or address
    pub address: Option<String>,
    /// Person being visited
    pub meeting_with: String,
    pub purpose: String,
    /// Data-URL or external image reference
    pub photo_url: Option<String>,
    pub check_in_time: DateTime<Utc>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub status: VisitStatus,
}

impl Visit {
    pub fn is_checked_in(&self) -> bool {
        self.status == VisitStatus::CheckedIn
    }
}

/// Register visitor request
///
/// Missing required keys read as empty and are rejected by `into_new_visit`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateVisit {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone_number: String,
    pub rfid_card_id: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub meeting_with: String,
    #[serde(default)]
    pub purpose: String,
    pub photo_url: Option<String>,
}

impl CreateVisit {
    /// Trim every field and check the required ones, stamping the check-in time
    pub fn into_new_visit(self, check_in_time: DateTime<Utc>) -> AppResult<NewVisit> {
        Ok(NewVisit {
            full_name: required("full_name", self.full_name)?,
            phone_number: required("phone_number", self.phone_number)?,
            rfid_card_id: optional(self.rfid_card_id),
            address: optional(self.address),
            meeting_with: required("meeting_with", self.meeting_with)?,
            purpose: required("purpose", self.purpose)?,
            photo_url: optional(self.photo_url),
            check_in_time,
        })
    }
}

/// Trimmed visit ready to be stored
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewVisit {
    pub full_name: String,
    #[validate(length(max = 20, message = "Phone number must be at most 20 characters"))]
    pub phone_number: String,
    #[validate(length(max = 50, message = "RFID card id must be at most 50 characters"))]
    pub rfid_card_id: Option<String>,
    pub address: Option<String>,
    pub meeting_with: String,
    pub purpose: String,
    pub photo_url: Option<String>,
    pub check_in_time: DateTime<Utc>,
}

/// Partial update request.
///
/// Only mutable fields are accepted; `id`, `check_in_time` and `rfid_card_id`
/// are rejected as unknown keys.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct VisitPatch {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    /// Empty string clears the address
    pub address: Option<String>,
    pub meeting_with: Option<String>,
    pub purpose: Option<String>,
    /// Empty string clears the photo
    pub photo_url: Option<String>,
    pub status: Option<VisitStatus>,
    pub check_out_time: Option<DateTime<Utc>>,
}

/// Resolved column changes handed to the store.
///
/// Status is not listed: a `check_out_time` always implies `checked_out`.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct VisitChanges {
    pub full_name: Option<String>,
    #[validate(length(max = 20, message = "Phone number must be at most 20 characters"))]
    pub phone_number: Option<String>,
    pub address: Option<Option<String>>,
    pub meeting_with: Option<String>,
    pub purpose: Option<String>,
    pub photo_url: Option<Option<String>>,
    pub check_out_time: Option<DateTime<Utc>>,
}

impl VisitChanges {
    pub fn checkout(at: DateTime<Utc>) -> Self {
        Self {
            check_out_time: Some(at),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Status filter for listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    CheckedIn,
    CheckedOut,
}

impl StatusFilter {
    pub fn as_status(&self) -> Option<VisitStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::CheckedIn => Some(VisitStatus::CheckedIn),
            StatusFilter::CheckedOut => Some(VisitStatus::CheckedOut),
        }
    }
}

/// Query parameters for listing visits
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct VisitQuery {
    /// all, checked_in or checked_out
    pub status: Option<StatusFilter>,
    /// Case-insensitive match on full name, address or meeting_with
    pub search: Option<String>,
}

/// Normalized listing filter handed to the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitFilter {
    pub status: Option<VisitStatus>,
    pub search: Option<String>,
}

impl From<&VisitQuery> for VisitFilter {
    fn from(query: &VisitQuery) -> Self {
        Self {
            status: query.status.unwrap_or_default().as_status(),
            search: optional(query.search.clone()),
        }
    }
}

impl VisitFilter {
    /// In-process equivalent of the SQL filter
    pub fn matches(&self, visit: &Visit) -> bool {
        if let Some(status) = self.status {
            if visit.status != status {
                return false;
            }
        }

        match &self.search {
            None => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                let hit = |field: &str| field.to_lowercase().contains(&needle);
                hit(visit.full_name.as_str())
                    || visit.address.as_deref().map(hit).unwrap_or(false)
                    || hit(visit.meeting_with.as_str())
            }
        }
    }
}

/// Retention window for purging old visits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PurgeRange {
    Week,
    Month,
    Year,
}

impl PurgeRange {
    /// Visits checked in strictly before this instant are purged
    pub fn cutoff(&self, now: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
        let cutoff = match self {
            PurgeRange::Week => now.checked_sub_signed(Duration::days(7)),
            PurgeRange::Month => now.checked_sub_months(Months::new(1)),
            PurgeRange::Year => now.checked_sub_months(Months::new(12)),
        };
        cutoff.ok_or_else(|| AppError::BadRequest(format!("Cannot compute {:?} cutoff", self)))
    }

    pub fn label(&self) -> &'static str {
        match self {
            PurgeRange::Week => "week",
            PurgeRange::Month => "month",
            PurgeRange::Year => "year",
        }
    }
}

/// Purge response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurgeResponse {
    /// Number of visits removed
    pub deleted: u64,
    pub message: String,
}

/// Card scan request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ScanRequest {
    /// RFID card id or decoded QR pass value
    #[serde(default)]
    pub rfid: String,
}

/// Card scan response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScanResult {
    pub success: bool,
    pub visit: Option<Visit>,
    pub message: String,
}

fn required(field: &str, value: String) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim a patched required field, rejecting blanks
pub(crate) fn patched_required(field: &str, value: &Option<String>) -> AppResult<Option<String>> {
    value
        .as_ref()
        .map(|v| required(field, v.clone()))
        .transpose()
}

/// Trim a patched optional field; a blank value clears the column
pub(crate) fn patched_optional(value: &Option<String>) -> Option<Option<String>> {
    value.as_ref().map(|v| optional(Some(v.clone())))
}
