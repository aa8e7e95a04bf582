//! User service
//!
//! Registration, profile maintenance, login/logout and the inactive-account
//! cleanup job.

use chrono::{DateTime, Months, Utc};

use crate::audit::{EntityType, Operation};
use crate::config::settings::{InactivityThresholds, SessionSettings};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Address, User, UserId, UserStatus, UserType};
use crate::storage::Storage;

use super::auth::{hash_password, verify_password, Session, SessionStore};
use super::search::rank;

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub position: Option<String>,
    pub user_type: Option<UserType>,
}

#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub position: Option<String>,
    pub company: Option<String>,
    pub bio: Option<String>,
    pub address: Option<Address>,
    pub skills: Option<Vec<String>>,
    pub hobbies: Option<Vec<String>>,
    pub user_type: Option<UserType>,
    pub status: Option<UserStatus>,
}

/// Accounts changed by one cleanup run
#[derive(Debug, Clone, Default)]
pub struct CleanupReport {
    pub deactivated: Vec<User>,
    pub archived: Vec<User>,
}

impl CleanupReport {
    pub fn is_empty(&self) -> bool {
        self.deactivated.is_empty() && self.archived.is_empty()
    }
}

pub struct UserService<'a> {
    storage: &'a Storage,
}

impl<'a> UserService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn require(&self, id: UserId) -> LedgerResult<User> {
        self.storage
            .users
            .get(id)?
            .ok_or_else(|| LedgerError::user_not_found(id.as_uuid().to_string()))
    }

    fn store_update(&self, before: &User, mut user: User) -> LedgerResult<User> {
        user.updated_at = Utc::now();
        user.validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.users.upsert(user.clone())?;
        self.storage.users.save()?;

        self.storage.log_update(
            EntityType::User,
            user.id.as_uuid().to_string(),
            Some(user.email.clone()),
            before,
            &user,
        )?;

        Ok(user)
    }

    /// Whether no account exists yet
    pub fn is_first_user(&self) -> LedgerResult<bool> {
        Ok(self.storage.users.count()? == 0)
    }

    /// Register an account; the very first account is always an admin
    pub fn register(&self, new: NewUser) -> LedgerResult<User> {
        let email = new.email.trim().to_string();
        if self.storage.users.email_exists(&email, None)? {
            return Err(LedgerError::Duplicate {
                entity_type: "User",
                identifier: email,
            });
        }

        let password_hash = hash_password(&new.password)?;
        let mut user = User::new(
            new.username.trim(),
            new.firstname.trim(),
            new.lastname.trim(),
            email,
            password_hash,
        );
        user.phone_number = new.phone_number.trim().to_string();
        user.position = new.position;
        user.user_type = if self.is_first_user()? {
            UserType::Admin
        } else {
            new.user_type.unwrap_or_default()
        };

        user.validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.users.upsert(user.clone())?;
        self.storage.users.save()?;

        self.storage.log_create(
            EntityType::User,
            user.id.as_uuid().to_string(),
            Some(user.email.clone()),
            &user,
        )?;
        tracing::info!(email = %user.email, user_type = %user.user_type, "user registered");

        Ok(user)
    }

    pub fn get(&self, id: UserId) -> LedgerResult<Option<User>> {
        self.storage.users.get(id)
    }

    /// Find a user by email or ID
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<User>> {
        if let Some(user) = self.storage.users.get_by_email(identifier)? {
            return Ok(Some(user));
        }
        match UserId::parse_opt(identifier) {
            Some(id) => self.storage.users.get(id),
            None => Ok(None),
        }
    }

    pub fn resolve(&self, identifier: &str) -> LedgerResult<User> {
        self.find(identifier)?
            .ok_or_else(|| LedgerError::user_not_found(identifier))
    }

    pub fn list(&self) -> LedgerResult<Vec<User>> {
        self.storage.users.get_all()
    }

    /// Text search over username, first and last name and email
    pub fn search(&self, query: &str, limit: usize) -> LedgerResult<Vec<User>> {
        Ok(rank(self.list()?, query, Some(limit), |u| {
            vec![
                u.username.as_str(),
                u.firstname.as_str(),
                u.lastname.as_str(),
                u.email.as_str(),
            ]
        }))
    }

    pub fn update(&self, id: UserId, update: UserUpdate) -> LedgerResult<User> {
        let mut user = self.require(id)?;
        let before = user.clone();

        if let Some(email) = update.email {
            let email = email.trim().to_string();
            if self.storage.users.email_exists(&email, Some(id))? {
                return Err(LedgerError::Duplicate {
                    entity_type: "User",
                    identifier: email,
                });
            }
            user.email = email;
        }
        if let Some(username) = update.username {
            user.username = username.trim().to_string();
        }
        if let Some(firstname) = update.firstname {
            user.firstname = firstname.trim().to_string();
        }
        if let Some(lastname) = update.lastname {
            user.lastname = lastname.trim().to_string();
        }
        if let Some(phone) = update.phone_number {
            user.phone_number = phone.trim().to_string();
        }
        if update.position.is_some() {
            user.position = update.position;
        }
        if update.company.is_some() {
            user.company = update.company;
        }
        if update.bio.is_some() {
            user.bio = update.bio;
        }
        if update.address.is_some() {
            user.address = update.address;
        }
        if let Some(skills) = update.skills {
            user.skills = skills;
        }
        if let Some(hobbies) = update.hobbies {
            user.hobbies = hobbies;
        }
        if let Some(user_type) = update.user_type {
            user.user_type = user_type;
        }
        if let Some(status) = update.status {
            user.status = status;
        }

        self.store_update(&before, user)
    }

    pub fn change_password(&self, id: UserId, current: &str, new_password: &str) -> LedgerResult<()> {
        let mut user = self.require(id)?;
        if !verify_password(current, &user.password_hash)? {
            return Err(LedgerError::Unauthorized("Current password is incorrect".into()));
        }
        let before = user.clone();
        user.password_hash = hash_password(new_password)?;
        self.store_update(&before, user).map(|_| ())
    }

    pub fn delete(&self, id: UserId) -> LedgerResult<User> {
        let user = self.require(id)?;

        self.storage.users.delete(id)?;
        self.storage.users.save()?;

        self.storage.log_delete(
            EntityType::User,
            id.as_uuid().to_string(),
            Some(user.email.clone()),
            &user,
        )?;

        Ok(user)
    }

    /// Check credentials, stamp `last_active` and open a session
    ///
    /// Unknown email and wrong password produce the same error.
    pub fn login(
        &self,
        email: &str,
        password: &str,
        lifetimes: &SessionSettings,
    ) -> LedgerResult<(User, Session)> {
        let invalid = || LedgerError::Unauthorized("Invalid email or password".into());

        let mut user = self.storage.users.get_by_email(email)?.ok_or_else(invalid)?;
        if !verify_password(password, &user.password_hash)? {
            tracing::warn!(email = %email, "failed login");
            return Err(invalid());
        }
        if !user.status.can_login() {
            return Err(LedgerError::Forbidden(format!(
                "Account is {}; contact an administrator",
                user.status
            )));
        }

        let now = Utc::now();
        user.last_active = Some(now);
        self.storage.users.upsert(user.clone())?;
        self.storage.users.save()?;

        let session = Session::issue(&user, lifetimes, now);
        SessionStore::new(self.storage.paths()).save(&session)?;
        self.storage
            .log_session(Operation::Login, user.id.as_uuid().to_string(), &user.email)?;

        Ok((user, session))
    }

    /// Close the current session, if there is one
    pub fn logout(&self) -> LedgerResult<Option<Session>> {
        let store = SessionStore::new(self.storage.paths());
        let session = store.current(Utc::now())?;
        store.clear()?;
        if let Some(s) = &session {
            self.storage
                .log_session(Operation::Logout, s.user_id.as_uuid().to_string(), &s.email)?;
        }
        Ok(session)
    }

    /// Deactivate or archive accounts that have been idle too long
    ///
    /// Idle time counts from `last_active`, or from creation for accounts
    /// that never logged in. Archived accounts are left alone.
    pub fn cleanup_inactive(
        &self,
        thresholds: &InactivityThresholds,
        now: DateTime<Utc>,
    ) -> LedgerResult<CleanupReport> {
        let deactivate_before = now
            .checked_sub_months(Months::new(thresholds.deactivate_after_months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let archive_before = now
            .checked_sub_months(Months::new(thresholds.archive_after_months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let mut report = CleanupReport::default();
        for user in self.list()? {
            let seen = user.last_seen();
            let target = if seen < archive_before {
                UserStatus::Archived
            } else if seen < deactivate_before {
                UserStatus::Deactivated
            } else {
                continue;
            };
            if user.status == target || user.status == UserStatus::Archived {
                continue;
            }

            let before = user.clone();
            let mut changed = user;
            changed.status = target;
            let changed = self.store_update(&before, changed)?;

            match target {
                UserStatus::Archived => report.archived.push(changed),
                _ => report.deactivated.push(changed),
            }
        }

        tracing::info!(
            deactivated = report.deactivated.len(),
            archived = report.archived.len(),
            "inactive user cleanup finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use chrono::Duration;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            username: email.split('@').next().unwrap().into(),
            firstname: "Test".into(),
            lastname: "User".into(),
            email: email.into(),
            password: "s3cret-pass".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_user_becomes_admin() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);

        let first = service.register(new_user("root@example.com")).unwrap();
        let second = service.register(new_user("jane@example.com")).unwrap();

        assert_eq!(first.user_type, UserType::Admin);
        assert_eq!(second.user_type, UserType::User);
        assert!(second.password_hash.starts_with("$argon2id$"));
        assert_ne!(second.password_hash, "s3cret-pass");
    }

    #[test]
    fn test_register_rejects_duplicates_and_short_passwords() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);
        service.register(new_user("jane@example.com")).unwrap();

        assert!(matches!(
            service.register(new_user("JANE@example.com")),
            Err(LedgerError::Duplicate { .. })
        ));

        let mut short = new_user("bob@example.com");
        short.password = "1234567".into();
        assert!(service.register(short).unwrap_err().is_validation());

        let mut bad_email = new_user("bob@example.com");
        bad_email.email = "bob".into();
        assert!(service.register(bad_email).unwrap_err().is_validation());
    }

    #[test]
    fn test_login_logout() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);
        service.register(new_user("jane@example.com")).unwrap();
        let lifetimes = SessionSettings::default();

        assert!(matches!(
            service.login("jane@example.com", "wrong-password", &lifetimes),
            Err(LedgerError::Unauthorized(_))
        ));
        assert!(matches!(
            service.login("nobody@example.com", "s3cret-pass", &lifetimes),
            Err(LedgerError::Unauthorized(_))
        ));

        let (user, session) = service
            .login("Jane@Example.com", "s3cret-pass", &lifetimes)
            .unwrap();
        assert!(user.last_active.is_some());
        assert_eq!(session.user_type, UserType::Admin);

        let closed = service.logout().unwrap().unwrap();
        assert_eq!(closed.user_id, user.id);
        assert!(service.logout().unwrap().is_none());

        let ops: Vec<_> = storage
            .audit()
            .read_all()
            .unwrap()
            .into_iter()
            .map(|e| e.operation)
            .collect();
        assert!(ops.contains(&Operation::Login));
        assert!(ops.contains(&Operation::Logout));
    }

    #[test]
    fn test_deactivated_user_cannot_login() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);
        let user = service.register(new_user("jane@example.com")).unwrap();
        service
            .update(
                user.id,
                UserUpdate {
                    status: Some(UserStatus::Deactivated),
                    ..Default::default()
                },
            )
            .unwrap();

        let result = service.login("jane@example.com", "s3cret-pass", &SessionSettings::default());
        assert!(matches!(result, Err(LedgerError::Forbidden(_))));
    }

    #[test]
    fn test_cleanup_inactive() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);
        let now = Utc::now();

        let fresh = service.register(new_user("fresh@example.com")).unwrap();
        let idle = service.register(new_user("idle@example.com")).unwrap();
        let ancient = service.register(new_user("ancient@example.com")).unwrap();

        for (id, days) in [(idle.id, 200), (ancient.id, 400)] {
            let mut user = storage.users.get(id).unwrap().unwrap();
            user.last_active = Some(now - Duration::days(days));
            storage.users.upsert(user).unwrap();
        }

        let report = service
            .cleanup_inactive(&InactivityThresholds::default(), now)
            .unwrap();
        assert_eq!(report.deactivated.len(), 1);
        assert_eq!(report.deactivated[0].id, idle.id);
        assert_eq!(report.archived.len(), 1);
        assert_eq!(report.archived[0].id, ancient.id);
        assert_eq!(
            service.get(fresh.id).unwrap().unwrap().status,
            UserStatus::Active
        );

        let again = service
            .cleanup_inactive(&InactivityThresholds::default(), now)
            .unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn test_search_and_change_password() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);
        let jane = service.register(new_user("jane@example.com")).unwrap();
        service.register(new_user("bob@example.com")).unwrap();

        let hits = service.search("jane", 20).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, jane.id);

        assert!(matches!(
            service.change_password(jane.id, "nope-nope", "another-pass"),
            Err(LedgerError::Unauthorized(_))
        ));
        service
            .change_password(jane.id, "s3cret-pass", "another-pass")
            .unwrap();
        assert!(service
            .login("jane@example.com", "another-pass", &SessionSettings::default())
            .is_ok());
    }
}
