//! # Meadowcap Product
//!
//! Range algebra over the three dimensions of a namespace.
//!
//! - [`Range`] - one contiguous interval, open or closed
//! - [`DisjointInterval`] - canonical set of non-touching ranges
//! - [`ThreeDimensionalProduct`] - a granted region: one interval per dimension
//! - [`encode_product`] / [`decode_product`] - the compact binary form
//!
//! Every operation takes its dimension's [`meadowcap_core::OrderScheme`]
//! explicitly; nothing here has a default order.

pub mod encoding;
pub mod error;
pub mod interval;
pub mod product;
pub mod range;

#[cfg(test)]
mod testing;

pub use encoding::{decode_product, decode_product_from, encode_product, encode_product_into, EMPTY_PRODUCT};
pub use error::{ProductError, Result};
pub use interval::{DisjointInterval, OverlapPolicy};
pub use product::{Dimensions, Sparse3dInterval, ThreeDimensionalProduct};
pub use range::Range;
