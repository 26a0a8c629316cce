//! # Meadowcap Capabilities
//!
//! Capabilities grant read or write access to a region of a namespace.
//!
//! ## Overview
//!
//! A capability is a tree. A **source** is the root grant for a namespace.
//! A **delegation** hands the parent's rights to a new receiver, signed by
//! the parent's receiver. A **restriction** narrows the granted region. A
//! **merge** unions compatible capabilities.
//!
//! ## Namespaces
//!
//! - **Communal**: every subspace key holds the rights to its own subspace.
//!   Sources name the subspace key as receiver.
//! - **Owned**: the namespace key holds the rights to everything. Sources
//!   carry the minimal subspace key and name the namespace key as receiver.
//!
//! ## Parameters
//!
//! Every operation takes a [`MeadowcapParams`]: the key schemes, subspace
//! order, path bound and capability hash. [`Ed25519Params`] is a complete
//! bundle using Ed25519 and Blake3.
//!
//! ## Validity
//!
//! [`validate_capability`] checks signature chains and structural rules,
//! awaiting the injected verifiers. Invalid capabilities are a normal
//! outcome and are reported as [`InvalidCapability`], never as panics.

pub mod capability;
pub mod encoding;
pub mod error;
pub mod params;
pub mod semantics;
pub mod signing;
pub mod validity;

pub use capability::{AccessMode, Capability, NonEmpty, Receiver, ReceiverSecret, ReceiverSignature};
pub use encoding::{decode_capability, decode_capability_from, encode_capability, encode_capability_into};
pub use error::InvalidCapability;
pub use params::{
    CapabilityOf, Ed25519Params, MeadowcapParams, NamespaceId, NamespaceSecret, NamespaceSignature, ProductOf,
    ReceiverOf, ReceiverSecretOf, ReceiverSignatureOf, SubspaceId, SubspaceSecret, SubspaceSignature,
};
pub use semantics::{access_mode, delegation_limit, granted_product, namespace, receiver, MAX_DELEGATION_LIMIT};
pub use signing::{delegation_message, encode_receiver, sign_as_receiver, verify_as_receiver};
pub use validity::{is_capability_valid, validate_capability, BoxFuture};
