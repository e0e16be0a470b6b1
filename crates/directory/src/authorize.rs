use libris_core::{DomainError, DomainResult};

use crate::{AccessLevel, Permission};

impl AccessLevel {
    /// Whether this level grants `permission`.
    pub fn allows(self, permission: Permission) -> bool {
        match self {
            AccessLevel::Admin => true,
            AccessLevel::Librarian => match permission {
                Permission::BorrowBooks
                | Permission::ManageCatalog
                | Permission::CirculateForOthers
                | Permission::ViewOverdue => true,
                Permission::ManageUsers => false,
            },
            AccessLevel::Member => match permission {
                Permission::BorrowBooks => true,
                Permission::ManageCatalog
                | Permission::CirculateForOthers
                | Permission::ViewOverdue
                | Permission::ManageUsers => false,
            },
        }
    }
}

/// Authorize an access level for one permission.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(level: AccessLevel, required: Permission) -> DomainResult<()> {
    if level.allows(required) {
        Ok(())
    } else {
        Err(DomainError::permission(format!(
            "{level} access does not grant '{required}'"
        )))
    }
}
