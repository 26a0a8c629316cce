//! Proptest generators for property-based testing.
//!
//! Range generators only produce valid ranges; product generators only
//! produce canonical, non-empty products.

use proptest::prelude::*;

use meadowcap::{Ed25519Params, ProductOf};
use meadowcap_core::{Ed25519PublicKey, Keypair, Path, Timestamp};
use meadowcap_product::{DisjointInterval, Range, ThreeDimensionalProduct};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random Ed25519PublicKey.
pub fn public_key() -> impl Strategy<Value = Ed25519PublicKey> {
    keypair().prop_map(|kp| kp.public_key())
}

/// Generate a subspace id from a small alphabet, so ranges overlap often.
pub fn subspace_id() -> impl Strategy<Value = Ed25519PublicKey> {
    (0u8..8).prop_map(|b| {
        let mut bytes = [0u8; 32];
        bytes[0] = b;
        Ed25519PublicKey(bytes)
    })
}

/// Generate a timestamp below `max`.
pub fn timestamp(max: Timestamp) -> impl Strategy<Value = Timestamp> {
    0..max
}

/// Generate a path of at most `max_len` bytes over a small alphabet.
pub fn path(max_len: usize) -> impl Strategy<Value = Path> {
    prop::collection::vec(prop_oneof![Just(b'a'), Just(b'b'), Just(b'c')], 0..=max_len).prop_map(Path)
}

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// A valid range from two arbitrary bounds.
fn range_from<V: Ord>(a: V, b: V, kind: u8) -> Option<Range<V>> {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    match kind {
        0 => Some(Range::open(lo)),
        1 if lo < hi => Some(Range::closed_exclusive(lo, hi)),
        2 => Some(Range::closed_inclusive(lo, hi)),
        _ => None,
    }
}

/// Generate a valid timestamp range below `max`.
pub fn timestamp_range(max: Timestamp) -> impl Strategy<Value = Range<Timestamp>> {
    (0..max, 0..max, 0u8..3).prop_filter_map("empty range", |(a, b, kind)| range_from(a, b, kind))
}

/// Generate a valid path range.
pub fn path_range(max_len: usize) -> impl Strategy<Value = Range<Path>> {
    (path(max_len), path(max_len), 0u8..3).prop_filter_map("empty range", |(a, b, kind)| range_from(a, b, kind))
}

/// Generate a valid subspace range.
pub fn subspace_range() -> impl Strategy<Value = Range<Ed25519PublicKey>> {
    (subspace_id(), subspace_id(), 0u8..3).prop_filter_map("empty range", |(a, b, kind)| range_from(a, b, kind))
}

/// Parameters for generating a product: ranges per dimension, folded
/// together by insertion.
#[derive(Debug, Clone)]
pub struct ProductParams {
    pub timestamps: Vec<Range<Timestamp>>,
    pub paths: Vec<Range<Path>>,
    pub subspaces: Vec<Range<Ed25519PublicKey>>,
}

/// Longest path the generators produce.
pub const MAX_GENERATED_PATH: usize = 4;

impl Arbitrary for ProductParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            prop::collection::vec(timestamp_range(1_000), 1..4),
            prop::collection::vec(path_range(MAX_GENERATED_PATH), 1..4),
            prop::collection::vec(subspace_range(), 1..4),
        )
            .prop_map(|(timestamps, paths, subspaces)| ProductParams {
                timestamps,
                paths,
                subspaces,
            })
            .boxed()
    }
}

/// Generate a canonical product from parameters.
///
/// Generated ranges are valid, so insertion cannot fail.
pub fn product_from_params(params: &Ed25519Params, product: &ProductParams) -> ProductOf<Ed25519Params> {
    use meadowcap::MeadowcapParams;

    let dims = params.dimensions();
    ThreeDimensionalProduct {
        timestamp: DisjointInterval::from_ranges(product.timestamps.iter().cloned(), &dims.timestamp)
            .expect("generated timestamp ranges are valid"),
        path: DisjointInterval::from_ranges(product.paths.iter().cloned(), &dims.path)
            .expect("generated path ranges are valid"),
        subspace: DisjointInterval::from_ranges(product.subspaces.iter().cloned(), &dims.subspace)
            .expect("generated subspace ranges are valid"),
    }
}

/// Generate a canonical non-empty product under default parameters.
pub fn product() -> impl Strategy<Value = ProductOf<Ed25519Params>> {
    any::<ProductParams>().prop_map(|p| product_from_params(&Ed25519Params::new(), &p))
}
