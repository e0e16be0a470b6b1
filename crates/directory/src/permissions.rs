use serde::{Deserialize, Serialize};

/// Operations gated by access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Borrow and return books on one's own account.
    BorrowBooks,
    /// Add and withdraw catalog copies.
    ManageCatalog,
    /// Issue, return and inspect loans on behalf of other users.
    CirculateForOthers,
    /// List overdue loans across the library.
    ViewOverdue,
    /// Register users at any level and change access levels.
    ManageUsers,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::BorrowBooks => "borrow_books",
            Permission::ManageCatalog => "manage_catalog",
            Permission::CirculateForOthers => "circulate_for_others",
            Permission::ViewOverdue => "view_overdue",
            Permission::ManageUsers => "manage_users",
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
