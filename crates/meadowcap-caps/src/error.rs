//! Error types for the capability layer.

use thiserror::Error;

/// Why a capability is not valid.
///
/// Validity failure is an expected outcome, not a fault: the predicate
/// reports the first reason it finds and callers usually only need the
/// boolean.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidCapability {
    /// An owned-namespace source names a subspace other than the minimal key.
    #[error("owned namespace source must use the minimal subspace key")]
    NotOwnedSubspace,

    /// A delegation does not lower the delegation limit.
    #[error("delegation limit {limit} is not below parent limit {parent}")]
    LimitNotNarrowing { limit: u8, parent: u8 },

    /// The delegee is not the same kind of key as the parent's receiver.
    #[error("delegee key kind differs from the parent receiver")]
    DelegeeKindMismatch,

    /// The authorisation is not the signature kind of the parent's receiver.
    #[error("authorisation signature kind differs from the parent receiver")]
    SignatureKindMismatch,

    /// The authorisation does not verify against the parent's receiver.
    #[error("delegation signature does not verify")]
    BadSignature,

    /// A restriction range lies outside its dimension, such as a path
    /// longer than the maximum path length.
    #[error("restriction range lies outside its dimension")]
    ProductOutOfBounds,

    /// Merge components disagree on the named property.
    #[error("merge components disagree on {0}")]
    MergeMismatch(&'static str),

    /// The granted products of merge components cannot be merged.
    #[error("merge components' granted products are not mergeable")]
    UnmergeableProducts,

    /// A merge grants nothing.
    #[error("merge grants the empty product")]
    EmptyGrant,
}
