//! The strategy bundle every capability operation is parameterised by.
//!
//! Correctness depends on every party using the same schemes, orders and
//! hash, so there are no ambient defaults: each entry point takes a
//! [`MeadowcapParams`] explicitly.

use async_trait::async_trait;

use meadowcap_core::{
    Blake3Hash, Ed25519Order, Ed25519PublicKey, Ed25519Scheme, KeypairScheme, OrderScheme, PathOrder,
    PayloadDigest,
};
use meadowcap_product::{Dimensions, ThreeDimensionalProduct};

use crate::capability::{Capability, Receiver, ReceiverSecret, ReceiverSignature};

/// Schemes, orders and hash functions for one deployment.
#[async_trait]
pub trait MeadowcapParams: Send + Sync {
    /// Scheme for namespace keys.
    type Namespace: KeypairScheme;
    /// Scheme for subspace keys.
    type Subspace: KeypairScheme;
    /// Order over subspace ids.
    type SubspaceOrder: OrderScheme<Value = <Self::Subspace as KeypairScheme>::PublicKey>;

    fn namespace_scheme(&self) -> &Self::Namespace;

    fn subspace_scheme(&self) -> &Self::Subspace;

    /// Orders of the timestamp, path and subspace dimensions.
    fn dimensions(&self) -> &Dimensions<Self::SubspaceOrder>;

    /// Whether `namespace` is communal (as opposed to owned).
    fn is_communal(&self, namespace: &<Self::Namespace as KeypairScheme>::PublicKey) -> bool;

    /// The subspace id every owned-namespace source must carry.
    fn minimal_subspace_key(&self) -> <Self::Subspace as KeypairScheme>::PublicKey;

    /// Hash an encoded capability before a delegation signs over it.
    async fn hash_capability(&self, encoded: &[u8]) -> Vec<u8>;

    /// Append the wire form of a payload digest.
    fn encode_payload_digest(&self, digest: &PayloadDigest, out: &mut Vec<u8>) {
        out.extend_from_slice(digest.as_bytes());
    }
}

pub type NamespaceId<P> = <<P as MeadowcapParams>::Namespace as KeypairScheme>::PublicKey;
pub type NamespaceSignature<P> = <<P as MeadowcapParams>::Namespace as KeypairScheme>::Signature;
pub type NamespaceSecret<P> = <<P as MeadowcapParams>::Namespace as KeypairScheme>::SecretKey;
pub type SubspaceId<P> = <<P as MeadowcapParams>::Subspace as KeypairScheme>::PublicKey;
pub type SubspaceSignature<P> = <<P as MeadowcapParams>::Subspace as KeypairScheme>::Signature;
pub type SubspaceSecret<P> = <<P as MeadowcapParams>::Subspace as KeypairScheme>::SecretKey;

/// The capability type for a parameter bundle.
pub type CapabilityOf<P> = Capability<NamespaceId<P>, NamespaceSignature<P>, SubspaceId<P>, SubspaceSignature<P>>;

/// The receiver type for a parameter bundle.
pub type ReceiverOf<P> = Receiver<NamespaceId<P>, SubspaceId<P>>;

/// The receiver signature type for a parameter bundle.
pub type ReceiverSignatureOf<P> = ReceiverSignature<NamespaceSignature<P>, SubspaceSignature<P>>;

/// The receiver secret type for a parameter bundle.
pub type ReceiverSecretOf<'a, P> = ReceiverSecret<'a, NamespaceSecret<P>, SubspaceSecret<P>>;

/// The product type for a parameter bundle.
pub type ProductOf<P> = ThreeDimensionalProduct<SubspaceId<P>>;

/// Ed25519 for both key kinds, Blake3 for capability hashing.
///
/// A namespace is communal when the last bit of its key is 0. Owned
/// namespace sources carry the all-zero subspace key.
#[derive(Debug, Clone)]
pub struct Ed25519Params {
    scheme: Ed25519Scheme,
    dimensions: Dimensions<Ed25519Order>,
}

impl Ed25519Params {
    /// Parameters with the default maximum path length.
    pub fn new() -> Self {
        Self {
            scheme: Ed25519Scheme,
            dimensions: Dimensions::new(PathOrder::default(), Ed25519Order),
        }
    }

    /// Set the maximum path length in bytes.
    pub fn with_max_path_length(mut self, max_length: usize) -> Self {
        self.dimensions.path = PathOrder::new(max_length);
        self
    }

    /// The maximum path length in bytes.
    pub fn max_path_length(&self) -> usize {
        self.dimensions.path.max_length()
    }
}

impl Default for Ed25519Params {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MeadowcapParams for Ed25519Params {
    type Namespace = Ed25519Scheme;
    type Subspace = Ed25519Scheme;
    type SubspaceOrder = Ed25519Order;

    fn namespace_scheme(&self) -> &Ed25519Scheme {
        &self.scheme
    }

    fn subspace_scheme(&self) -> &Ed25519Scheme {
        &self.scheme
    }

    fn dimensions(&self) -> &Dimensions<Ed25519Order> {
        &self.dimensions
    }

    fn is_communal(&self, namespace: &Ed25519PublicKey) -> bool {
        namespace.as_bytes()[31] & 1 == 0
    }

    fn minimal_subspace_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey::MIN
    }

    async fn hash_capability(&self, encoded: &[u8]) -> Vec<u8> {
        Blake3Hash::hash(encoded).as_bytes().to_vec()
    }
}
