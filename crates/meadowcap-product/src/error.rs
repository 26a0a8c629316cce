//! Error types for the range and product algebra.

use thiserror::Error;

/// Faults raised at the boundary of the algebra.
///
/// These signal malformed input from the caller: a range whose ends are out
/// of order, an insertion that was required to be size-preserving but was
/// not, or a product whose dimensions disagree on emptiness.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    /// A range violates its ordering invariant.
    #[error("range violates its ordering invariant")]
    InvalidRange,

    /// An insertion under [`crate::OverlapPolicy::Reject`] hit an existing range.
    #[error("range overlaps or abuts an existing range")]
    Overlap,

    /// A set of ranges is not in disjoint canonical form.
    #[error("malformed disjoint interval: {0}")]
    MalformedInterval(String),

    /// Some but not all dimensions of a product are empty.
    #[error("product has both empty and non-empty dimensions")]
    MalformedProduct,
}

/// Result type for algebra operations.
pub type Result<T> = std::result::Result<T, ProductError>;
