use libris_core::{DomainError, ErrorKind};

/// Process exit status for a failed command.
///
/// Domain failures get one code per kind, wherever they sit in the context
/// chain. Everything else (config, storage, IO) is 1.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    let kind = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<DomainError>())
        .map(DomainError::kind);
    match kind {
        Some(ErrorKind::Validation) => 2,
        Some(ErrorKind::NotFound) => 3,
        Some(ErrorKind::Conflict) => 4,
        Some(ErrorKind::Permission) => 5,
        Some(ErrorKind::Auth) => 6,
        None => 1,
    }
}
