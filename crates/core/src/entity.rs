//! Entity trait: identity + continuity across state changes.

use std::collections::BTreeMap;

use crate::error::{DomainError, DomainResult};

/// Entity marker + minimal interface.
///
/// Books, users and transactions are entities: two records with the same id
/// describe the same thing, even when their counters or dates differ.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Key persisted records by id.
///
/// Two records sharing an id are invalid data, reported as
/// `duplicate <what> <id>`.
pub fn index_by_id<E>(
    records: impl IntoIterator<Item = E>,
    what: &str,
) -> DomainResult<BTreeMap<E::Id, E>>
where
    E: Entity,
    E::Id: Ord + core::fmt::Display,
{
    let mut index = BTreeMap::new();
    for record in records {
        let id = record.id().clone();
        if index.contains_key(&id) {
            return Err(DomainError::validation(format!("duplicate {what} {id}")));
        }
        index.insert(id, record);
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Shelf {
        code: u32,
        label: &'static str,
    }

    impl Entity for Shelf {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.code
        }
    }

    #[test]
    fn index_keys_records_by_id() {
        let shelves = [Shelf { code: 2, label: "b" }, Shelf { code: 1, label: "a" }];
        let index = index_by_id(shelves, "shelf").unwrap();
        assert_eq!(index.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(index[&2].label, "b");
    }

    #[test]
    fn repeated_id_is_a_validation_error() {
        let shelves = [Shelf { code: 7, label: "a" }, Shelf { code: 7, label: "b" }];
        let err = index_by_id(shelves, "shelf").unwrap_err();
        assert_eq!(err, DomainError::validation("duplicate shelf 7"));
    }
}
