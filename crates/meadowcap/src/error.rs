//! Error types for the Meadowcap facade.

use meadowcap_caps::InvalidCapability;
use meadowcap_core::DecodeError;
use meadowcap_product::ProductError;
use thiserror::Error;

/// Errors returned when building capabilities or tokens.
///
/// These are construction errors: the caller asked for a capability that
/// would not be valid. Checking an existing capability never errors; it
/// yields `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeadowcapError {
    /// A communal source was requested for an owned namespace.
    #[error("namespace is not communal")]
    NamespaceNotCommunal,

    /// An owned source was requested for a communal namespace.
    #[error("namespace is not owned")]
    NamespaceNotOwned,

    /// The delegee is not the same kind of key as the parent's receiver.
    #[error("delegee key kind differs from the parent receiver")]
    DelegeeKindMismatch,

    /// The secret is not the kind of key the capability's receiver is.
    #[error("secret key kind differs from the capability receiver")]
    SecretKindMismatch,

    /// The requested delegation limit is not below the parent's.
    #[error("delegation limit {limit} is not below parent limit {parent}")]
    LimitNotNarrowing { limit: u8, parent: u8 },

    /// The entry's path is longer than the parameters allow.
    #[error("path of {length} bytes exceeds the maximum of {max}")]
    PathTooLong { length: usize, max: usize },

    /// A strict restriction asked for more than the parent grants.
    #[error("restriction reaches outside the parent's granted product")]
    RestrictionOutsideGrant,

    /// Merge components disagree on the named property.
    #[error("merge components disagree on {0}")]
    MergeMismatch(&'static str),

    /// A merge of no capabilities.
    #[error("merge needs at least one capability")]
    EmptyMerge,

    /// The components' granted products cannot be merged.
    #[error("granted products are not mergeable")]
    UnmergeableProducts,

    /// The merged capability would grant nothing.
    #[error("merged capability grants nothing")]
    EmptyGrant,

    /// A parent or component failed validation.
    #[error("invalid parent capability: {0}")]
    InvalidParent(InvalidCapability),

    /// A capability failed validation.
    #[error("invalid capability: {0}")]
    Invalid(#[from] InvalidCapability),

    /// Malformed range or product.
    #[error("product error: {0}")]
    Product(#[from] ProductError),

    /// Malformed encoding.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, MeadowcapError>;
