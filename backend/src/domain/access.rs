//! Who may call what.
//!
//! [`RoutePolicy`] maps every externally reachable [`Operation`] to an
//! [`AccessRequirement`]. The defaults are the marketplace's standard table;
//! deployments may override individual entries through configuration.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::{Email, Role, User, UserStatus};

/// The caller of a protected operation, as seen by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    email: Email,
    role: Role,
    status: UserStatus,
}

impl Actor {
    pub fn new(email: Email, role: Role, status: UserStatus) -> Self {
        Self {
            email,
            role,
            status,
        }
    }

    /// Actor for a registered user.
    pub fn from_user(user: &User) -> Self {
        Self::new(user.email().clone(), user.role(), user.status())
    }

    /// Actor for a valid credential whose email is not registered. Such
    /// callers hold no elevated role.
    pub fn unregistered(email: Email) -> Self {
        Self::new(email, Role::Customer, UserStatus::None)
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_fraud(&self) -> bool {
        self.status == UserStatus::Fraud
    }

    /// Whether the actor holds `role` and is in good standing.
    pub fn has_role(&self, role: Role) -> bool {
        !self.is_fraud() && self.role == role
    }
}

/// Requirement a caller must meet before a handler runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessRequirement {
    Public,
    Authenticated,
    /// Authenticated, not fraud-flagged, and holding one of these roles.
    AnyRole(Vec<Role>),
}

impl AccessRequirement {
    pub fn requires_credential(&self) -> bool {
        !matches!(self, Self::Public)
    }

    pub fn requires_role(&self) -> bool {
        matches!(self, Self::AnyRole(_))
    }

    /// Role check for an already authenticated actor.
    pub fn permits(&self, actor: &Actor) -> bool {
        match self {
            Self::Public | Self::Authenticated => true,
            Self::AnyRole(roles) => roles.iter().any(|role| actor.has_role(*role)),
        }
    }
}

impl fmt::Display for AccessRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Authenticated => f.write_str("authenticated"),
            Self::AnyRole(roles) => {
                let names: Vec<&str> = roles.iter().map(|role| role.as_str()).collect();
                write!(f, "role:{}", names.join("|"))
            }
        }
    }
}

/// Errors raised while parsing policy configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyParseError {
    #[error("unknown access requirement `{0}`; expected public, authenticated or role:<a|b>")]
    UnknownRequirement(String),
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),
    #[error("policy entry `{0}` must look like operation=requirement")]
    MalformedEntry(String),
}

impl FromStr for AccessRequirement {
    type Err = PolicyParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        match trimmed {
            "public" => return Ok(Self::Public),
            "authenticated" => return Ok(Self::Authenticated),
            _ => {}
        }
        let Some(list) = trimmed.strip_prefix("role:") else {
            return Err(PolicyParseError::UnknownRequirement(trimmed.to_owned()));
        };
        let roles = list
            .split('|')
            .map(|raw| {
                raw.parse::<Role>()
                    .map_err(|_| PolicyParseError::UnknownRequirement(trimmed.to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::AnyRole(roles))
    }
}

/// Externally reachable operations that carry an access requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    IssueSession,
    EnsureUser,
    RequestUpgrade,
    ReadRole,
    ListUsers,
    SetRole,
    FlagFraud,
    RemoveUser,
    SubmitOffer,
    ReadOffers,
    DecideOffer,
}

impl Operation {
    pub const ALL: [Self; 11] = [
        Self::IssueSession,
        Self::EnsureUser,
        Self::RequestUpgrade,
        Self::ReadRole,
        Self::ListUsers,
        Self::SetRole,
        Self::FlagFraud,
        Self::RemoveUser,
        Self::SubmitOffer,
        Self::ReadOffers,
        Self::DecideOffer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::IssueSession => "issue_session",
            Self::EnsureUser => "ensure_user",
            Self::RequestUpgrade => "request_upgrade",
            Self::ReadRole => "read_role",
            Self::ListUsers => "list_users",
            Self::SetRole => "set_role",
            Self::FlagFraud => "flag_fraud",
            Self::RemoveUser => "remove_user",
            Self::SubmitOffer => "submit_offer",
            Self::ReadOffers => "read_offers",
            Self::DecideOffer => "decide_offer",
        }
    }

    fn default_requirement(self) -> AccessRequirement {
        match self {
            Self::EnsureUser | Self::ReadRole | Self::SubmitOffer | Self::ReadOffers => {
                AccessRequirement::Public
            }
            Self::IssueSession | Self::RequestUpgrade | Self::DecideOffer => {
                AccessRequirement::Authenticated
            }
            Self::ListUsers | Self::SetRole | Self::FlagFraud | Self::RemoveUser => {
                AccessRequirement::AnyRole(vec![Role::Admin])
            }
        }
    }
}

impl FromStr for Operation {
    type Err = PolicyParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == trimmed)
            .ok_or_else(|| PolicyParseError::UnknownOperation(trimmed.to_owned()))
    }
}

static DENY_ALL: AccessRequirement = AccessRequirement::AnyRole(Vec::new());

/// Requirement table consulted by the access gate.
///
/// # Examples
/// ```
/// use realscape::domain::{AccessRequirement, Operation, Role, RoutePolicy};
///
/// let policy = RoutePolicy::default()
///     .with_overrides("read_role=authenticated")
///     .expect("valid overrides");
/// assert_eq!(policy.requirement(Operation::ReadRole), &AccessRequirement::Authenticated);
/// assert_eq!(
///     policy.requirement(Operation::SetRole),
///     &AccessRequirement::AnyRole(vec![Role::Admin])
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    requirements: HashMap<Operation, AccessRequirement>,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        let requirements = Operation::ALL
            .into_iter()
            .map(|op| (op, op.default_requirement()))
            .collect();
        Self { requirements }
    }
}

impl RoutePolicy {
    pub fn requirement(&self, op: Operation) -> &AccessRequirement {
        // Every operation is seeded in `default`; overrides only replace.
        self.requirements.get(&op).unwrap_or(&DENY_ALL)
    }

    pub fn with_requirement(mut self, op: Operation, requirement: AccessRequirement) -> Self {
        self.requirements.insert(op, requirement);
        self
    }

    /// Apply comma-separated `operation=requirement` entries.
    pub fn with_overrides(self, overrides: &str) -> Result<Self, PolicyParseError> {
        overrides
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .try_fold(self, |policy, entry| {
                let (op, requirement) = entry
                    .split_once('=')
                    .ok_or_else(|| PolicyParseError::MalformedEntry(entry.to_owned()))?;
                Ok(policy.with_requirement(op.parse()?, requirement.parse()?))
            })
    }
}
