use std::collections::BTreeMap;

use libris_core::{DomainError, DomainResult, UserId, index_by_id};

use crate::{AccessLevel, CredentialService, NewUser, Sha256Credentials, User};

/// Registered users plus the credential service that checks them.
#[derive(Debug, Clone, Default)]
pub struct Directory<C = Sha256Credentials> {
    users: BTreeMap<UserId, User>,
    credentials: C,
}

impl Directory<Sha256Credentials> {
    pub fn new() -> Self {
        Self::with_credentials(Sha256Credentials)
    }
}

impl<C: CredentialService> Directory<C> {
    pub fn with_credentials(credentials: C) -> Self {
        Self {
            users: BTreeMap::new(),
            credentials,
        }
    }

    /// Rebuild a directory from persisted records.
    pub fn from_users(credentials: C, users: impl IntoIterator<Item = User>) -> DomainResult<Self> {
        Ok(Self {
            users: index_by_id(users, "user id")?,
            credentials,
        })
    }

    pub fn register(&mut self, new_user: NewUser) -> DomainResult<&User> {
        if self.users.contains_key(&new_user.id) {
            return Err(DomainError::conflict(format!(
                "user {} already exists",
                new_user.id
            )));
        }
        let new_user = new_user.validated()?;

        let credential = self.credentials.digest(&new_user.id, &new_user.credential);
        let user = User {
            id: new_user.id.clone(),
            display_name: new_user.display_name,
            email: new_user.email,
            access_level: new_user.access_level,
            credential,
            registered_on: new_user.registered_on,
        };
        Ok(self.users.entry(new_user.id).or_insert(user))
    }

    /// Check credentials. Unknown users and wrong secrets fail the same way.
    pub fn authenticate(&self, id: &UserId, credential: &str) -> DomainResult<&User> {
        let user = self.users.get(id).ok_or(DomainError::Auth)?;
        if self.credentials.verify(id, credential, &user.credential) {
            Ok(user)
        } else {
            Err(DomainError::Auth)
        }
    }

    /// Change a user's access level. Only an admin actor may do this.
    pub fn set_access_level(
        &mut self,
        actor_level: AccessLevel,
        target: &UserId,
        new_level: AccessLevel,
    ) -> DomainResult<&User> {
        match actor_level {
            AccessLevel::Admin => {}
            AccessLevel::Librarian | AccessLevel::Member => {
                return Err(DomainError::permission(format!(
                    "{actor_level} cannot change access levels"
                )));
            }
        }
        let user = self
            .users
            .get_mut(target)
            .ok_or_else(|| DomainError::not_found(format!("user {target}")))?;
        user.access_level = new_level;
        Ok(user)
    }

    /// Replace a credential after re-checking the current one.
    pub fn change_credential(&mut self, id: &UserId, current: &str, new: &str) -> DomainResult<()> {
        if new.is_empty() {
            return Err(DomainError::validation("credential cannot be empty"));
        }
        self.authenticate(id, current)?;
        let digest = self.credentials.digest(id, new);
        if let Some(user) = self.users.get_mut(id) {
            user.credential = digest;
        }
        Ok(())
    }

    pub fn get(&self, id: &UserId) -> Option<&User> {
        self.users.get(id)
    }

    pub fn contains(&self, id: &UserId) -> bool {
        self.users.contains_key(id)
    }

    pub fn has_admin(&self) -> bool {
        self.users
            .values()
            .any(|u| u.access_level == AccessLevel::Admin)
    }

    /// All users in id order.
    pub fn users(&self) -> impl Iterator<Item = &User> + '_ {
        self.users.values()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn uid(s: &str) -> UserId {
        UserId::parse(s).unwrap()
    }

    fn new_user(id: &str, level: AccessLevel, pw: &str) -> NewUser {
        NewUser {
            id: uid(id),
            display_name: id.to_uppercase(),
            email: None,
            access_level: level,
            credential: pw.to_string(),
            registered_on: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        }
    }

    #[test]
    fn register_then_authenticate() {
        let mut directory = Directory::new();
        directory.register(new_user("alice", AccessLevel::Member, "pw")).unwrap();

        let user = directory.authenticate(&uid("ALICE"), "pw").unwrap();
        assert_eq!(user.display_name, "ALICE");
        assert_ne!(user.credential.as_str(), "pw");
    }

    #[test]
    fn duplicate_registration_is_a_conflict() {
        let mut directory = Directory::new();
        directory.register(new_user("alice", AccessLevel::Member, "pw")).unwrap();
        let err = directory
            .register(new_user("Alice", AccessLevel::Admin, "other"))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn wrong_secret_and_unknown_user_are_auth_errors() {
        let mut directory = Directory::new();
        directory.register(new_user("alice", AccessLevel::Member, "pw")).unwrap();

        assert_eq!(directory.authenticate(&uid("alice"), "nope").unwrap_err(), DomainError::Auth);
        assert_eq!(directory.authenticate(&uid("mallory"), "pw").unwrap_err(), DomainError::Auth);
    }

    #[test]
    fn only_admin_sets_access_level() {
        let mut directory = Directory::new();
        directory.register(new_user("bob", AccessLevel::Member, "pw")).unwrap();

        for actor in [AccessLevel::Member, AccessLevel::Librarian] {
            let err = directory
                .set_access_level(actor, &uid("bob"), AccessLevel::Admin)
                .unwrap_err();
            assert!(matches!(err, DomainError::Permission(_)));
        }
        assert_eq!(directory.get(&uid("bob")).unwrap().access_level, AccessLevel::Member);

        let user = directory
            .set_access_level(AccessLevel::Admin, &uid("bob"), AccessLevel::Librarian)
            .unwrap();
        assert_eq!(user.access_level, AccessLevel::Librarian);
    }

    #[test]
    fn set_access_level_for_unknown_user_is_not_found() {
        let mut directory = Directory::new();
        let err = directory
            .set_access_level(AccessLevel::Admin, &uid("ghost"), AccessLevel::Member)
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn change_credential_requires_current_secret() {
        let mut directory = Directory::new();
        directory.register(new_user("carol", AccessLevel::Member, "old")).unwrap();

        assert_eq!(
            directory.change_credential(&uid("carol"), "wrong", "new").unwrap_err(),
            DomainError::Auth
        );
        directory.change_credential(&uid("carol"), "old", "new").unwrap();
        assert!(directory.authenticate(&uid("carol"), "old").is_err());
        assert!(directory.authenticate(&uid("carol"), "new").is_ok());
    }

    #[test]
    fn from_users_round_trips_and_rejects_duplicates() {
        let mut directory = Directory::new();
        directory.register(new_user("dave", AccessLevel::Admin, "pw")).unwrap();
        let users: Vec<User> = directory.users().cloned().collect();

        let rebuilt = Directory::from_users(Sha256Credentials, users.clone()).unwrap();
        assert!(rebuilt.has_admin());
        assert!(rebuilt.authenticate(&uid("dave"), "pw").is_ok());

        let doubled = users.iter().cloned().chain(users.iter().cloned());
        assert!(Directory::from_users(Sha256Credentials, doubled).is_err());
    }
}
