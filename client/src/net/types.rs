//! Wire records for the membership API.
//!
//! DESIGN
//! ======
//! One request and one response type per endpoint. Bodies are parsed into
//! these records at the HTTP boundary; anything that does not fit surfaces as
//! `ClientError::Malformed` instead of leaking half-filled values upward.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// =============================================================================
// ROLE / STATUS
// =============================================================================

/// Membership category, or the administrative `HEAD` role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Accounts created by `/auth/register` are stored as `GENERAL`.
    #[serde(alias = "GENERAL")]
    Normal,
    Permanent,
    Associated,
    Head,
}

impl Role {
    /// Roles an applicant may request. `HEAD` is assigned, never applied for.
    pub const APPLICABLE: [Role; 3] = [Role::Permanent, Role::Normal, Role::Associated];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Permanent => "PERMANENT",
            Self::Associated => "ASSOCIATED",
            Self::Head => "HEAD",
        }
    }

    #[must_use]
    pub fn is_applicable(self) -> bool {
        Self::APPLICABLE.contains(&self)
    }

    /// Parse a role name case-insensitively.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "NORMAL" | "GENERAL" => Some(Self::Normal),
            "PERMANENT" => Some(Self::Permanent),
            "ASSOCIATED" => Some(Self::Associated),
            "HEAD" => Some(Self::Head),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Pending,
    Active,
    Rejected,
}

impl Status {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a membership request row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

// =============================================================================
// USER
// =============================================================================

/// The authenticated member as returned by `GET /auth/me`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier (UUID).
    pub id: Uuid,
    /// Normalized login identifier (digits-only phone number).
    pub identifier: String,
    /// Assigned role; `None` until the backend sets one.
    pub role: Option<Role>,
    pub status: Status,
    /// Issued on approval, e.g. `Pid-004`.
    pub member_id: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub gotram: Option<String>,
    pub father_guardian_name: Option<String>,
    pub address: Option<String>,
    pub occupation: Option<String>,
    pub zonal_committee: Option<String>,
    pub regional_committee: Option<String>,
    pub joined_at: Option<String>,
    pub created_at: Option<String>,
}

impl User {
    /// Full name when known, otherwise the login identifier.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.identifier)
    }

    #[must_use]
    pub fn is_head(&self) -> bool {
        self.role == Some(Role::Head)
    }
}

// =============================================================================
// AUTH
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub phone: String,
    pub pin: String,
    pub full_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub phone: String,
    pub pin: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VerifyPinRequest {
    /// Phone number or email; the server keeps only its digits.
    pub identifier: String,
    pub pin: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SetPinRequest {
    pub pin: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UnlockAccountRequest {
    pub user_id: Uuid,
}

/// Successful credential exchange from register, login or verify-pin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user_id: Uuid,
    pub identifier: String,
    pub role: Option<Role>,
    pub status: Status,
}

fn default_token_type() -> String {
    "bearer".to_owned()
}

/// Generic `{ "message": ... }` reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// =============================================================================
// MEMBERSHIP APPLICATION
// =============================================================================

/// Normalized biographical data. Absent fields are omitted from the body.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BioData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub father_guardian_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    /// `HH:MM` or `HH:MM:SS`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gotram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_sect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_amount"
    )]
    pub annual_income: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub star_pada: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_proof_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub particulars: Option<String>,
}

/// Body of `POST /members/apply`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MembershipApplication {
    pub requested_role: Role,
    pub bio_data: BioData,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApplicationResponse {
    pub message: String,
    pub application_id: String,
    pub status: Status,
}

/// A row of `membership_requests`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MembershipRequestRecord {
    pub id: String,
    pub user_id: Uuid,
    pub requested_role: Role,
    pub approval_status: ApprovalStatus,
    pub payment_status: Option<String>,
    pub admin_notes: Option<String>,
    pub application_data: Option<BioData>,
    pub created_at: Option<String>,
}

/// Reply of `GET /members/status`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApplicationStatus {
    /// The caller's most recent request.
    Submitted(MembershipRequestRecord),
    /// `{"status": "NONE", "message": "No application found"}`.
    NoApplication { message: String },
}

// =============================================================================
// ADMIN
// =============================================================================

/// A pending request joined with the applicant's user row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingRequest {
    #[serde(flatten)]
    pub request: MembershipRequestRecord,
    pub users: User,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalAction {
    Approve,
    Reject,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ApprovalRequest {
    pub user_id: Uuid,
    pub action: ApprovalAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    /// Overrides the requested role on approval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalResponse {
    pub message: String,
    pub member_id: Option<String>,
    pub role: Option<Role>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CreateMemberRequest {
    pub phone: String,
    pub full_name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMemberResponse {
    pub message: String,
    pub member_id: Option<String>,
    pub user_id: Option<Uuid>,
}

// =============================================================================
// LENIENT NUMBERS
// =============================================================================

/// Decimal columns arrive either as JSON numbers or as numeric strings.
fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(number)) => number
            .as_f64()
            .map(Some)
            .ok_or_else(|| D::Error::custom("expected finite number")),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected numeric string, got {s:?}"))),
        Some(_) => Err(D::Error::custom("expected number or numeric string")),
    }
}
