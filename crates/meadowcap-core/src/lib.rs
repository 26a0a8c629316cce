//! # Meadowcap Core
//!
//! Pure primitives for Meadowcap: the value types of the three-dimensional
//! namespace, their total orders, injected signature schemes and the byte
//! helpers the codecs are built on.
//!
//! This crate contains no I/O and no global state.
//!
//! ## Key Types
//!
//! - [`OrderScheme`] - order, successor and predecessor for one dimension
//! - [`KeypairScheme`] - sign, verify and wire format for one kind of key
//! - [`Path`], [`Timestamp`] - the path and time dimensions
//! - [`Entry`] - the metadata of a write that a capability may authorise
//! - [`Reader`] - bounds-checked decoding cursor

pub mod crypto;
pub mod encoding;
pub mod error;
pub mod order;
pub mod scheme;
pub mod types;

pub use crypto::{Blake3Hash, Ed25519PublicKey, Ed25519Signature, Keypair};
pub use encoding::{width_for, write_u64, write_uint, Reader};
pub use error::{CoreError, DecodeError, DecodeResult};
pub use order::{Ed25519Order, OrderScheme, PathOrder, TimestampOrder};
pub use scheme::{Ed25519Scheme, KeypairScheme};
pub use types::{Entry, Path, PayloadDigest, Timestamp};
