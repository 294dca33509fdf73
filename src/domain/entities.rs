//! Domain entities. Pure data structures for the portal.
//!
//! The remote API mixes `Username`/`username` and `First_name`/`firstName`
//! across endpoints; serde aliases absorb that here so adapters stay thin.

use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use super::errors::DomainError;

/// Authenticated identity held for the current tab.
///
/// A session is either fully present or absent; the store never hands out a
/// partially populated one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub is_admin: bool,
}

/// Role classification derived from the session. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorizationState {
    Unauthenticated,
    AuthenticatedUser,
    AuthenticatedAdmin,
}

impl AuthorizationState {
    /// Pure function of the session. Empty token or username counts as absent.
    pub fn from_session(session: Option<&Session>) -> Self {
        match session {
            Some(s) if !s.token.is_empty() && !s.username.is_empty() => {
                if s.is_admin {
                    Self::AuthenticatedAdmin
                } else {
                    Self::AuthenticatedUser
                }
            }
            _ => Self::Unauthenticated,
        }
    }
}

impl std::fmt::Display for AuthorizationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unauthenticated => "unauthenticated",
            Self::AuthenticatedUser => "user",
            Self::AuthenticatedAdmin => "admin",
        };
        f.write_str(s)
    }
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginGrant {
    pub access_token: String,
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
}

/// Minimum age accepted by the registration form.
pub const MIN_REGISTRATION_AGE: u32 = 18;

/// Raw registration input as typed by the user. `age` is kept as text until
/// [`RegistrationForm::validate`] turns it into a [`Registration`].
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    pub email: String,
    pub mobile: String,
    pub first_name: String,
    pub last_name: String,
    pub age: String,
}

impl RegistrationForm {
    /// Strips non-digits from the age and rejects anything under 18.
    pub fn validate(self) -> Result<Registration, DomainError> {
        let digits: String = self.age.chars().filter(char::is_ascii_digit).collect();
        let age = match digits.parse::<u32>() {
            Ok(age) if age >= MIN_REGISTRATION_AGE => age,
            _ => return Err(DomainError::Validation("Please enter a valid age".into())),
        };
        Ok(Registration {
            username: self.username,
            password: self.password,
            email: self.email,
            mobile: self.mobile,
            first_name: self.first_name,
            last_name: self.last_name,
            age,
        })
    }
}

/// Body of `POST /auth/register`. Accounts start pending verification.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: String,
    pub mobile: String,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
}

/// Caller's own profile from `/api/user/details`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, alias = "Username")]
    pub username: String,
    #[serde(default, alias = "First_name", alias = "firstName")]
    pub first_name: String,
    #[serde(default, alias = "Last_name", alias = "lastName")]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Account verification lifecycle as reported in `isVerified`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Accepted,
    Rejected,
    #[default]
    #[serde(other)]
    Unknown,
}

impl VerificationStatus {
    /// Display order for the confirm-user list.
    pub fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Accepted => 1,
            Self::Rejected => 2,
            Self::Unknown => 3,
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Entry of `/api/user/tempusers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingUser {
    #[serde(rename = "Username", alias = "username")]
    pub username: String,
    #[serde(rename = "First_name", alias = "first_name", default)]
    pub first_name: String,
    #[serde(rename = "Last_name", alias = "last_name", default)]
    pub last_name: String,
    #[serde(rename = "isVerified", default)]
    pub status: VerificationStatus,
}

/// A policyholder account with the policies it holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policyholder {
    #[serde(rename = "Username", alias = "username")]
    pub username: String,
    #[serde(default, alias = "First_name", alias = "firstName")]
    pub first_name: String,
    #[serde(default, alias = "Last_name", alias = "lastName")]
    pub last_name: String,
    #[serde(rename = "isVerified", default)]
    pub status: VerificationStatus,
    #[serde(default)]
    pub policies: Vec<HeldPolicy>,
}

/// A policy owned by a policyholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeldPolicy {
    #[serde(deserialize_with = "string_or_number")]
    pub policy_id: String,
    pub category: String,
    pub policy_name: String,
    pub sum_assured: f64,
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub premium: f64,
    pub left_amount: f64,
    #[serde(default)]
    pub claimed_amounts: Vec<f64>,
}

/// Body of `PUT /api/policyholder/{username}`: adds a policy, or replaces the
/// plan of an existing one when `policy_id` matches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyEnrollment {
    pub policy_id: String,
    pub category: String,
    pub policy_name: String,
    pub sum_assured: f64,
    pub duration: u32,
    pub premium: f64,
    pub left_amount: f64,
}

/// Entry of the purchasable catalog (`/api/policy`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPolicy {
    pub name: String,
    pub category: String,
    pub sum_assured: f64,
    #[serde(default)]
    pub premium_plans: Vec<PremiumPlan>,
}

/// Duration (years) and premium pairing offered for a catalog policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PremiumPlan {
    pub duration: u32,
    pub premium: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Monetary request filed against a policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "_id", deserialize_with = "string_or_number")]
    pub id: String,
    pub policyholder_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub policy_id: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub status: ClaimStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Body of `POST /api/claim`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimApplication {
    pub policyholder_id: String,
    pub policy_id: String,
    pub amount: f64,
    pub reason: String,
    pub claim_date: NaiveDate,
}

/// Ids arrive as strings from some endpoints and as numbers from others.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}
