//! User model and role-based access policies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::UserId;

/// Role of a user; decides which access policies admit them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Admin,
    #[default]
    User,
    Viewer,
    Supplier,
}

impl UserType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "user" => Some(Self::User),
            "viewer" => Some(Self::Viewer),
            "supplier" => Some(Self::Supplier),
            _ => None,
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::User => write!(f, "user"),
            Self::Viewer => write!(f, "viewer"),
            Self::Supplier => write!(f, "supplier"),
        }
    }
}

/// Lifecycle state of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
    Deactivated,
    Archived,
}

impl UserStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "suspended" => Some(Self::Suspended),
            "deactivated" => Some(Self::Deactivated),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }

    /// Whether an account in this state may log in
    pub fn can_login(&self) -> bool {
        !matches!(self, Self::Deactivated | Self::Archived)
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
            Self::Deactivated => "deactivated",
            Self::Archived => "archived",
        };
        write!(f, "{}", s)
    }
}

/// Named set of user types allowed to perform an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessPolicy {
    OnlyAdmin,
    OnlyUser,
    OnlyViewer,
    AdminUser,
    AdminViewer,
    UserViewer,
    AllTypes,
}

impl AccessPolicy {
    /// The user types this policy admits
    pub fn allowed_types(&self) -> &'static [UserType] {
        use UserType::*;
        match self {
            Self::OnlyAdmin => &[Admin],
            Self::OnlyUser => &[User],
            Self::OnlyViewer => &[Viewer],
            Self::AdminUser => &[Admin, User],
            Self::AdminViewer => &[Admin, Viewer],
            Self::UserViewer => &[User, Viewer],
            Self::AllTypes => &[Admin, User, Viewer, Supplier],
        }
    }

    pub fn allows(&self, user_type: UserType) -> bool {
        self.allowed_types().contains(&user_type)
    }
}

impl fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::OnlyAdmin => "ONLY_ADMIN",
            Self::OnlyUser => "ONLY_USER",
            Self::OnlyViewer => "ONLY_VIEWER",
            Self::AdminUser => "ADMIN_USER",
            Self::AdminViewer => "ADMIN_VIEWER",
            Self::UserViewer => "USER_VIEWER",
            Self::AllTypes => "ALL_TYPES",
        };
        write!(f, "{}", s)
    }
}

/// Postal address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,

    pub username: String,

    pub firstname: String,

    pub lastname: String,

    /// Unique (case-insensitive) login identifier
    pub email: String,

    /// Argon2id PHC string
    pub password_hash: String,

    #[serde(default)]
    pub phone_number: String,

    #[serde(default)]
    pub position: Option<String>,

    #[serde(default)]
    pub status: UserStatus,

    #[serde(rename = "type", default)]
    pub user_type: UserType,

    #[serde(default)]
    pub last_active: Option<DateTime<Utc>>,

    #[serde(default)]
    pub address: Option<Address>,

    #[serde(default)]
    pub bio: Option<String>,

    #[serde(default)]
    pub company: Option<String>,

    #[serde(default)]
    pub skills: Vec<String>,

    #[serde(default)]
    pub hobbies: Vec<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        firstname: impl Into<String>,
        lastname: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            username: username.into(),
            firstname: firstname.into(),
            lastname: lastname.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            phone_number: String::new(),
            position: None,
            status: UserStatus::Active,
            user_type: UserType::User,
            last_active: None,
            address: None,
            bio: None,
            company: None,
            skills: Vec::new(),
            hobbies: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }

    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::Admin
    }

    /// Last time the user did anything, falling back to account creation
    pub fn last_seen(&self) -> DateTime<Utc> {
        self.last_active.unwrap_or(self.created_at)
    }

    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.username.trim().is_empty() {
            return Err(UserValidationError::EmptyField("username"));
        }
        if self.firstname.trim().is_empty() {
            return Err(UserValidationError::EmptyField("firstname"));
        }
        if self.lastname.trim().is_empty() {
            return Err(UserValidationError::EmptyField("lastname"));
        }
        if !is_plausible_email(&self.email) {
            return Err(UserValidationError::InvalidEmail(self.email.clone()));
        }
        if self.password_hash.is_empty() {
            return Err(UserValidationError::MissingPasswordHash);
        }
        Ok(())
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.username, self.email)
    }
}

fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyField(&'static str),
    InvalidEmail(String),
    MissingPasswordHash,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "{} is required", field),
            Self::InvalidEmail(email) => write!(f, "Invalid email address: {}", email),
            Self::MissingPasswordHash => write!(f, "Password hash is missing"),
        }
    }
}

impl std::error::Error for UserValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User::new("jdoe", "Jane", "Doe", "jane@example.com", "$argon2id$stub")
    }

    #[test]
    fn test_new_user_defaults() {
        let user = sample();
        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(user.user_type, UserType::User);
        assert_eq!(user.full_name(), "Jane Doe");
        assert_eq!(user.last_seen(), user.created_at);
        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_email_validation() {
        let mut user = sample();
        for bad in ["", "jane", "jane@", "@example.com", "jane@example", "ja ne@x.io"] {
            user.email = bad.to_string();
            assert!(
                matches!(user.validate(), Err(UserValidationError::InvalidEmail(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_access_policies() {
        assert!(AccessPolicy::OnlyAdmin.allows(UserType::Admin));
        assert!(!AccessPolicy::OnlyAdmin.allows(UserType::User));
        assert!(AccessPolicy::AdminUser.allows(UserType::User));
        assert!(!AccessPolicy::AdminUser.allows(UserType::Viewer));
        assert!(AccessPolicy::UserViewer.allows(UserType::Viewer));
        assert!(AccessPolicy::AllTypes.allows(UserType::Supplier));
        assert!(!AccessPolicy::AdminViewer.allows(UserType::Supplier));
    }

    #[test]
    fn test_policy_serializes_screaming_case() {
        let json = serde_json::to_string(&AccessPolicy::AdminUser).unwrap();
        assert_eq!(json, "\"ADMIN_USER\"");
        let back: AccessPolicy = serde_json::from_str("\"ALL_TYPES\"").unwrap();
        assert_eq!(back, AccessPolicy::AllTypes);
    }

    #[test]
    fn test_status_login_rules() {
        assert!(UserStatus::Active.can_login());
        assert!(UserStatus::Inactive.can_login());
        assert!(!UserStatus::Deactivated.can_login());
        assert!(!UserStatus::Archived.can_login());
        assert_eq!(UserStatus::parse("Suspended"), Some(UserStatus::Suspended));
        assert_eq!(UserType::parse("nope"), None);
    }

    #[test]
    fn test_type_field_is_renamed() {
        let mut user = sample();
        user.user_type = UserType::Viewer;
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["type"], "viewer");
        assert_eq!(json["status"], "active");
        assert!(json.get("passwordHash").is_some());
    }
}
