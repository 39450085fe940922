use thiserror::Error;

use super::topology::MembershipKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no free name for prefix '{prefix}': found {found} of {requested} below suffix {bound}")]
    NamesExhausted {
        prefix: String,
        requested: usize,
        found: usize,
        bound: u32,
    },

    #[error("{member} is claimed as a {kind} member by both {first} and {second}")]
    ConflictingMembership {
        member: String,
        kind: MembershipKind,
        first: String,
        second: String,
    },

    #[error("Interface not found: {0}")]
    NotFound(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
