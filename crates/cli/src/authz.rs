//! Access checks at the service boundary.
//!
//! Run before any component is touched, so a denied call changes nothing.

use libris_core::{DomainResult, UserId};
use libris_directory::{Permission, authorize};

use crate::context::Actor;

/// The actor's access level must grant `permission`.
pub fn require(actor: &Actor, permission: Permission) -> DomainResult<()> {
    authorize(actor.access_level(), permission)
}

/// Acting on one's own records is always allowed; anyone else's needs
/// `permission`.
pub fn require_self_or(actor: &Actor, owner: &UserId, permission: Permission) -> DomainResult<()> {
    if actor.is(owner) {
        return Ok(());
    }
    require(actor, permission)
}
