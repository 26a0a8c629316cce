//! Strong type definitions for the three-dimensional namespace.
//!
//! A point in a namespace is a (subspace, path, timestamp) triple. Subspace
//! ids are keys supplied by the injected scheme; paths and timestamps are
//! fixed here.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::Blake3Hash;

/// Microseconds since the Unix epoch, as claimed by an entry's author.
pub type Timestamp = u64;

/// A path: an arbitrary byte string, ordered lexicographically.
///
/// A path that is a strict prefix of another sorts first, so the empty path
/// is the smallest path.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Path(pub Vec<u8>);

impl Path {
    /// The empty path.
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Create from raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the empty path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length of the longest common prefix with `other`.
    pub fn common_prefix_len(&self, other: &Path) -> usize {
        self.0
            .iter()
            .zip(other.0.iter())
            .take_while(|(a, b)| a == b)
            .count()
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(s) if s.chars().all(|c| !c.is_control()) => write!(f, "Path({s:?})"),
            _ => write!(f, "Path(0x{})", hex::encode(&self.0)),
        }
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<&[u8]> for Path {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for Path {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Digest of an entry's payload.
pub type PayloadDigest = Blake3Hash;

/// The metadata of a write into a namespace.
///
/// Payload storage is not Meadowcap's concern; an entry only carries the
/// payload's length and digest so an authorisation token can bind to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<N, S> {
    /// The namespace written to.
    pub namespace_id: N,
    /// The subspace written to.
    pub subspace_id: S,
    /// The path written to.
    pub path: Path,
    /// The author-claimed time of the write.
    pub timestamp: Timestamp,
    /// Length of the payload in bytes.
    pub payload_length: u64,
    /// Digest of the payload.
    pub payload_digest: PayloadDigest,
}

impl<N, S> Entry<N, S> {
    /// Create an entry for `payload`, computing its length and digest.
    pub fn new(namespace_id: N, subspace_id: S, path: Path, timestamp: Timestamp, payload: &[u8]) -> Self {
        Self {
            namespace_id,
            subspace_id,
            path,
            timestamp,
            payload_length: payload.len() as u64,
            payload_digest: Blake3Hash::hash(payload),
        }
    }
}
