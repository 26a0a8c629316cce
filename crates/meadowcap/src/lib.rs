//! # Meadowcap
//!
//! Capability-based access control for a namespace laid out along three
//! dimensions: subspace, path and time.
//!
//! ## Overview
//!
//! - **Sources** grant a whole owned namespace to its key, or one subspace of
//!   a communal namespace to the subspace key
//! - **Delegations** pass rights on, signed by the current receiver, with a
//!   strictly shrinking delegation limit
//! - **Restrictions** narrow the granted region
//! - **Merges** union capabilities that share a receiver
//! - **Authorisation tokens** bind a write to a capability by a signature
//!
//! ## Usage
//!
//! ```rust,no_run
//! use meadowcap::{AccessMode, Ed25519Params, Meadowcap, ReceiverSecret};
//! use meadowcap::core::{Entry, Keypair, Path};
//!
//! async fn example(namespace: meadowcap::core::Ed25519PublicKey, user: Keypair) {
//!     let mc = Meadowcap::new(Ed25519Params::new());
//!
//!     // Source capability for the user's own subspace
//!     let cap = mc
//!         .create_communal_capability(AccessMode::Write, namespace, user.public_key())
//!         .unwrap();
//!
//!     // Authorise a write
//!     let entry = Entry::new(namespace, user.public_key(), Path::from("notes"), 0, b"hello");
//!     let token = mc
//!         .create_authorisation_token(&entry, cap, ReceiverSecret::Subspace(&user))
//!         .await
//!         .unwrap();
//!     assert!(mc.is_authorised_write(&entry, &token).await);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `meadowcap::core` - keys, orders, paths, entries
//! - `meadowcap::product` - ranges, intervals, products
//! - `meadowcap::caps` - the capability model, validity and encoding

pub mod error;
pub mod meadowcap;
pub mod token;

// Re-export component crates
pub use meadowcap_caps as caps;
pub use meadowcap_core as core;
pub use meadowcap_product as product;

// Re-export main types for convenience
pub use crate::meadowcap::{Meadowcap, MeadowcapConfig};
pub use error::{MeadowcapError, Result};
pub use token::{decode_token, encode_token, write_message, AuthorisationToken, EntryOf, TokenOf};

pub use meadowcap_caps::{
    AccessMode, Capability, CapabilityOf, Ed25519Params, InvalidCapability, MeadowcapParams, ProductOf, Receiver,
    ReceiverSecret, ReceiverSignature,
};
pub use meadowcap_product::{Range, Sparse3dInterval, ThreeDimensionalProduct};
