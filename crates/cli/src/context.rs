use libris_core::UserId;
use libris_directory::{AccessLevel, User};

/// Authenticated caller of a library operation.
///
/// Only produced by a successful login, so holding one means the credentials
/// were checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    user_id: UserId,
    access_level: AccessLevel,
}

impl Actor {
    pub(crate) fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            access_level: user.access_level,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn access_level(&self) -> AccessLevel {
        self.access_level
    }

    pub fn is(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}
