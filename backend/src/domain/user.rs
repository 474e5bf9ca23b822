//! User data model: identifiers, roles, moderation status and the
//! transitions the registry applies to them.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors raised while building user values from raw input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must not be empty")]
    EmptyId,
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email must look like local@domain")]
    InvalidEmail,
    #[error("email must be at most {max} characters")]
    EmailTooLong { max: usize },
    #[error("unknown role `{0}`; expected customer, agent or admin")]
    UnknownRole(String),
    #[error("unknown user status `{0}`")]
    UnknownStatus(String),
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("photo URL must be at most {max} characters")]
    PhotoUrlTooLong { max: usize },
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Maximum accepted email length (RFC 5321 path limit).
pub const EMAIL_MAX: usize = 320;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Normalised email address; the registry's natural key.
///
/// Input is trimmed and lower-cased so `Ada@Example.com ` and
/// `ada@example.com` name the same user.
///
/// # Examples
/// ```
/// use realscape::domain::Email;
///
/// let email = Email::new("  Ada@Example.com ").expect("valid email");
/// assert_eq!(email.as_ref(), "ada@example.com");
/// assert!(Email::new("not-an-email").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = email.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if normalised.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Authorisation role. New users start as [`Role::Customer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Agent,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Agent => "agent",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "agent" => Ok(Self::Agent),
            "admin" => Ok(Self::Admin),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// Moderation status. `Fraud` is terminal for every self-service flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    None,
    Requested,
    Verified,
    Fraud,
}

impl UserStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Requested => "requested",
            Self::Verified => "verified",
            Self::Fraud => "fraud",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = UserValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "none" => Ok(Self::None),
            "requested" => Ok(Self::Requested),
            "verified" => Ok(Self::Verified),
            "fraud" => Ok(Self::Fraud),
            other => Err(UserValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Why a status transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UserTransitionError {
    #[error("You have already requested, wait for some time.")]
    AlreadyRequested,
    #[error("user is flagged as fraud")]
    FraudFlagged,
}

impl UserStatus {
    /// Status after an upgrade request from this state.
    ///
    /// # Examples
    /// ```
    /// use realscape::domain::{UserStatus, UserTransitionError};
    ///
    /// assert_eq!(UserStatus::None.request_upgrade(), Ok(UserStatus::Requested));
    /// assert_eq!(
    ///     UserStatus::Requested.request_upgrade(),
    ///     Err(UserTransitionError::AlreadyRequested)
    /// );
    /// ```
    pub fn request_upgrade(self) -> Result<Self, UserTransitionError> {
        match self {
            Self::None | Self::Verified => Ok(Self::Requested),
            Self::Requested => Err(UserTransitionError::AlreadyRequested),
            Self::Fraud => Err(UserTransitionError::FraudFlagged),
        }
    }
}

/// Maximum stored profile name length.
pub const NAME_MAX: usize = 120;
/// Maximum stored photo URL length.
pub const PHOTO_URL_MAX: usize = 2048;

/// Optional profile captured on first login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    name: Option<String>,
    photo_url: Option<String>,
}

impl UserProfile {
    /// Build a profile, dropping blank values and enforcing length limits.
    pub fn new(
        name: Option<String>,
        photo_url: Option<String>,
    ) -> Result<Self, UserValidationError> {
        let name = non_blank(name);
        let photo_url = non_blank(photo_url);
        if name.as_ref().is_some_and(|n| n.chars().count() > NAME_MAX) {
            return Err(UserValidationError::NameTooLong { max: NAME_MAX });
        }
        if photo_url
            .as_ref()
            .is_some_and(|url| url.chars().count() > PHOTO_URL_MAX)
        {
            return Err(UserValidationError::PhotoUrlTooLong { max: PHOTO_URL_MAX });
        }
        Ok(Self { name, photo_url })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn photo_url(&self) -> Option<&str> {
        self.photo_url.as_deref()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Registered marketplace user.
///
/// ## Invariants
/// - `email` is normalised and unique across the registry.
/// - Once `status` is [`UserStatus::Fraud`] only an admin action can touch
///   the record, and none of them clears the flag.
///
/// The wire shape is [`UserPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UserPayload", into = "UserPayload")]
pub struct User {
    id: UserId,
    email: Email,
    role: Role,
    status: UserStatus,
    profile: UserProfile,
    created_at: DateTime<Utc>,
}

impl User {
    /// Rebuild a user from stored state.
    pub fn from_parts(
        id: UserId,
        email: Email,
        role: Role,
        status: UserStatus,
        profile: UserProfile,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            role,
            status,
            profile,
            created_at,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn status(&self) -> UserStatus {
        self.status
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_fraud(&self) -> bool {
        self.status == UserStatus::Fraud
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = status;
        self
    }
}

/// Data for a user that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRegistration {
    pub email: Email,
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
}

/// JSON representation of a [`User`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[schema(as = User)]
pub struct UserPayload {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserPayload {
    fn from(value: User) -> Self {
        let User {
            id,
            email,
            role,
            status,
            profile,
            created_at,
        } = value;
        Self {
            id: id.into(),
            email: email.into(),
            role,
            status,
            name: profile.name,
            photo_url: profile.photo_url,
            created_at,
        }
    }
}

impl TryFrom<UserPayload> for User {
    type Error = UserValidationError;

    fn try_from(value: UserPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::try_from(value.id)?,
            email: Email::try_from(value.email)?,
            role: value.role,
            status: value.status,
            profile: UserProfile::new(value.name, value.photo_url)?,
            created_at: value.created_at,
        })
    }
}
