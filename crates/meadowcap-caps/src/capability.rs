//! The capability data model.
//!
//! A capability is an immutable tree. Sources are leaves; delegations and
//! restrictions wrap a shared parent; merges own a non-empty list of
//! components. Nothing points back up, so no cycle can form.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use meadowcap_product::ThreeDimensionalProduct;

/// Whether a capability grants reading or writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessMode {
    Read,
    Write,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::Read => write!(f, "read"),
            AccessMode::Write => write!(f, "write"),
        }
    }
}

/// The key holding the rights of a capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Receiver<N, S> {
    /// A namespace key: the receiver of owned-namespace capabilities.
    Namespace(N),
    /// A subspace key: the receiver of communal-namespace capabilities.
    Subspace(S),
}

impl<N, S> Receiver<N, S> {
    /// Whether both receivers are the same kind of key.
    pub fn same_kind<N2, S2>(&self, other: &Receiver<N2, S2>) -> bool {
        matches!(
            (self, other),
            (Receiver::Namespace(_), Receiver::Namespace(_)) | (Receiver::Subspace(_), Receiver::Subspace(_))
        )
    }
}

/// A signature made by a [`Receiver`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReceiverSignature<NS, SS> {
    Namespace(NS),
    Subspace(SS),
}

/// The secret key of a [`Receiver`], borrowed for one signing operation.
pub enum ReceiverSecret<'a, NK, SK> {
    Namespace(&'a NK),
    Subspace(&'a SK),
}

impl<NK, SK> fmt::Debug for ReceiverSecret<'_, NK, SK> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiverSecret::Namespace(_) => f.write_str("ReceiverSecret::Namespace(..)"),
            ReceiverSecret::Subspace(_) => f.write_str("ReceiverSecret::Subspace(..)"),
        }
    }
}

/// A vector with at least one element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmpty<T>(Vec<T>);

impl<T> NonEmpty<T> {
    /// Wrap `items`, or `None` if there are none.
    pub fn new(items: Vec<T>) -> Option<Self> {
        if items.is_empty() {
            None
        } else {
            Some(Self(items))
        }
    }

    /// The first item; there always is one.
    pub fn first(&self) -> &T {
        &self.0[0]
    }

    /// Unwrap into the underlying vector.
    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl<T> Deref for NonEmpty<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<'a, T> IntoIterator for &'a NonEmpty<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A Meadowcap capability.
///
/// Type parameters are the namespace key, namespace signature, subspace key
/// and subspace signature types. Most code uses
/// [`crate::CapabilityOf`] instead of naming them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability<N, NS, S, SS> {
    /// The root grant for a namespace.
    Source {
        access_mode: AccessMode,
        namespace_id: N,
        /// For owned namespaces, always the minimal subspace key.
        subspace_id: S,
    },

    /// Hands the parent's rights to a new receiver.
    Delegation {
        parent: Arc<Capability<N, NS, S, SS>>,
        delegee: Receiver<N, S>,
        /// Signature by the parent's receiver over the delegation message.
        authorisation: ReceiverSignature<NS, SS>,
        delegation_limit: u8,
    },

    /// Narrows the parent's granted product.
    Restriction {
        parent: Arc<Capability<N, NS, S, SS>>,
        product: ThreeDimensionalProduct<S>,
    },

    /// Unions the granted products of compatible components.
    Merge {
        components: NonEmpty<Capability<N, NS, S, SS>>,
    },
}

impl<N, NS, S, SS> Capability<N, NS, S, SS> {
    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Capability::Source { .. } => "source",
            Capability::Delegation { .. } => "delegation",
            Capability::Restriction { .. } => "restriction",
            Capability::Merge { .. } => "merge",
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            Capability::Source { .. } => 1,
            Capability::Delegation { parent, .. } | Capability::Restriction { parent, .. } => {
                1 + parent.node_count()
            }
            Capability::Merge { components } => 1 + components.iter().map(|c| c.node_count()).sum::<usize>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Cap = Capability<u8, (), u8, ()>;

    fn source(ns: u8, ss: u8) -> Cap {
        Capability::Source {
            access_mode: AccessMode::Write,
            namespace_id: ns,
            subspace_id: ss,
        }
    }

    #[test]
    fn test_non_empty() {
        assert!(NonEmpty::<u8>::new(vec![]).is_none());
        let items = NonEmpty::new(vec![3, 4]).unwrap();
        assert_eq!(*items.first(), 3);
        assert_eq!(items.len(), 2);
        assert_eq!(items.into_vec(), vec![3, 4]);
    }

    #[test]
    fn test_shared_parent() {
        let root = Arc::new(source(1, 2));
        let a: Cap = Capability::Restriction {
            parent: Arc::clone(&root),
            product: ThreeDimensionalProduct::empty(),
        };
        let b: Cap = Capability::Delegation {
            parent: Arc::clone(&root),
            delegee: Receiver::Subspace(9),
            authorisation: ReceiverSignature::Subspace(()),
            delegation_limit: 3,
        };
        assert_eq!(Arc::strong_count(&root), 3);
        assert_eq!(a.kind(), "restriction");
        assert_eq!(b.node_count(), 2);

        let merged: Cap = Capability::Merge {
            components: NonEmpty::new(vec![a, b]).unwrap(),
        };
        assert_eq!(merged.node_count(), 5);
    }

    #[test]
    fn test_receiver_kind() {
        let a: Receiver<u8, u8> = Receiver::Namespace(1);
        let b: Receiver<u8, u8> = Receiver::Subspace(1);
        assert!(a.same_kind(&Receiver::<(), ()>::Namespace(())));
        assert!(!a.same_kind(&b));
        assert_eq!(AccessMode::Write.to_string(), "write");
    }
}
