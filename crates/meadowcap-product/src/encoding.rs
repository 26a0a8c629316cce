//! Binary encoding of products.
//!
//! ```text
//! flags                       u8   (0xff alone: the empty product)
//! count x3                    u8 (len - 1) or u64 BE (len), per flag bit
//! ranges x3                   timestamp, path, subspace
//!   per chunk of 8 ranges:    u8 mask (0x80 >> i: range i is inclusive)
//!                             start [end] per range, open range last
//! ```
//!
//! Flag bits 0..2 mark a dimension with at most 256 ranges, bits 3..5 a
//! dimension ending in an open range. Bits 6 and 7 are reserved.
//!
//! Timestamps are 8 bytes big-endian. Subspace ids use the injected key
//! encoding. Paths are front-coded against the previous path written in the
//! same dimension: common prefix length, suffix length, suffix bytes.

use meadowcap_core::{write_u64, DecodeError, DecodeResult, OrderScheme, Path, Reader};

use crate::error::ProductError;
use crate::interval::DisjointInterval;
use crate::product::{Dimensions, ThreeDimensionalProduct};
use crate::range::Range;

const TIMESTAMP_SMALL: u8 = 0x01;
const PATH_SMALL: u8 = 0x02;
const SUBSPACE_SMALL: u8 = 0x04;
const TIMESTAMP_OPEN: u8 = 0x08;
const PATH_OPEN: u8 = 0x10;
const SUBSPACE_OPEN: u8 = 0x20;
const RESERVED: u8 = 0xc0;

/// The whole encoding of the empty product.
pub const EMPTY_PRODUCT: u8 = 0xff;

const CHUNK: usize = 8;
const SMALL_COUNT: usize = 256;

/// Encode a canonical product.
pub fn encode_product<S, O>(
    product: &ThreeDimensionalProduct<S>,
    dims: &Dimensions<O>,
    encode_subspace: impl Fn(&S, &mut Vec<u8>),
) -> Vec<u8>
where
    O: OrderScheme<Value = S>,
{
    let mut out = Vec::new();
    encode_product_into(product, dims, encode_subspace, &mut out);
    out
}

/// Append the encoding of a canonical product to `out`.
pub fn encode_product_into<S, O>(
    product: &ThreeDimensionalProduct<S>,
    dims: &Dimensions<O>,
    encode_subspace: impl Fn(&S, &mut Vec<u8>),
    out: &mut Vec<u8>,
) where
    O: OrderScheme<Value = S>,
{
    if product.is_empty() {
        out.push(EMPTY_PRODUCT);
        return;
    }

    let mut flags = 0u8;
    let dimensions = [
        (product.timestamp.len(), product.timestamp.open_range().is_some(), TIMESTAMP_SMALL, TIMESTAMP_OPEN),
        (product.path.len(), product.path.open_range().is_some(), PATH_SMALL, PATH_OPEN),
        (product.subspace.len(), product.subspace.open_range().is_some(), SUBSPACE_SMALL, SUBSPACE_OPEN),
    ];
    for (len, open, small_bit, open_bit) in dimensions {
        if len <= SMALL_COUNT {
            flags |= small_bit;
        }
        if open {
            flags |= open_bit;
        }
    }
    out.push(flags);

    for (len, ..) in dimensions {
        if len <= SMALL_COUNT {
            out.push((len - 1) as u8);
        } else {
            write_u64(out, len as u64);
        }
    }

    encode_dimension(&product.timestamp, out, |ts, out| write_u64(out, *ts));

    let mut previous = Path::empty();
    encode_dimension(&product.path, out, |path: &Path, out| {
        let prefix = path.common_prefix_len(&previous);
        dims.path.encode_length(prefix, out);
        dims.path.encode_length(path.len() - prefix, out);
        out.extend_from_slice(&path.as_bytes()[prefix..]);
        previous = path.clone();
    });

    encode_dimension(&product.subspace, out, encode_subspace);
}

fn encode_dimension<V>(
    interval: &DisjointInterval<V>,
    out: &mut Vec<u8>,
    mut write_value: impl FnMut(&V, &mut Vec<u8>),
) {
    for chunk in interval.ranges().chunks(CHUNK) {
        let mask = chunk
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_inclusive())
            .fold(0u8, |mask, (i, _)| mask | (0x80 >> i));
        out.push(mask);
        for range in chunk {
            write_value(range.start(), out);
            if let Some(end) = range.end() {
                write_value(end, out);
            }
        }
    }
}

/// Decode a product occupying all of `bytes`.
pub fn decode_product<S, O>(
    bytes: &[u8],
    dims: &Dimensions<O>,
    decode_subspace: impl Fn(&mut Reader<'_>) -> DecodeResult<S>,
) -> DecodeResult<ThreeDimensionalProduct<S>>
where
    S: Clone + Eq,
    O: OrderScheme<Value = S>,
{
    let mut reader = Reader::new(bytes);
    let product = decode_product_from(&mut reader, dims, decode_subspace)?;
    reader.finish()?;
    Ok(product)
}

/// Decode a product from the front of `reader`.
pub fn decode_product_from<S, O>(
    reader: &mut Reader<'_>,
    dims: &Dimensions<O>,
    decode_subspace: impl Fn(&mut Reader<'_>) -> DecodeResult<S>,
) -> DecodeResult<ThreeDimensionalProduct<S>>
where
    S: Clone + Eq,
    O: OrderScheme<Value = S>,
{
    let flags = reader.read_u8()?;
    if flags == EMPTY_PRODUCT {
        return Ok(ThreeDimensionalProduct::empty());
    }
    if flags & RESERVED != 0 {
        return Err(DecodeError::UnknownFlags(flags));
    }

    let timestamp_count = read_count(reader, flags & TIMESTAMP_SMALL != 0)?;
    let path_count = read_count(reader, flags & PATH_SMALL != 0)?;
    let subspace_count = read_count(reader, flags & SUBSPACE_SMALL != 0)?;

    let timestamp = decode_dimension(
        reader,
        timestamp_count,
        flags & TIMESTAMP_OPEN != 0,
        &dims.timestamp,
        |reader| reader.read_u64(),
    )?;

    let mut previous = Path::empty();
    let path = decode_dimension(
        reader,
        path_count,
        flags & PATH_OPEN != 0,
        &dims.path,
        |reader| {
            let prefix = dims.path.decode_length(reader)?;
            if prefix > previous.len() {
                return Err(DecodeError::InvalidPrefix {
                    prefix,
                    previous: previous.len(),
                });
            }
            let suffix_len = dims.path.decode_length(reader)?;
            let length = prefix + suffix_len;
            if length > dims.path.max_length() {
                return Err(DecodeError::PathTooLong {
                    length,
                    max: dims.path.max_length(),
                });
            }
            let suffix = reader.read_bytes(suffix_len)?;
            if suffix.first().is_some() && suffix.first() == previous.as_bytes().get(prefix) {
                return Err(DecodeError::NonCanonical("path prefix not maximal".to_string()));
            }
            let mut bytes = previous.as_bytes()[..prefix].to_vec();
            bytes.extend_from_slice(suffix);
            previous = Path::from_bytes(bytes);
            Ok(previous.clone())
        },
    )?;

    let subspace = decode_dimension(
        reader,
        subspace_count,
        flags & SUBSPACE_OPEN != 0,
        &dims.subspace,
        decode_subspace,
    )?;

    Ok(ThreeDimensionalProduct {
        timestamp,
        path,
        subspace,
    })
}

fn read_count(reader: &mut Reader<'_>, small: bool) -> DecodeResult<u64> {
    if small {
        return Ok(u64::from(reader.read_u8()?) + 1);
    }
    let count = reader.read_u64()?;
    if count <= SMALL_COUNT as u64 {
        return Err(DecodeError::NonCanonical(format!(
            "range count {count} in 8-byte form"
        )));
    }
    Ok(count)
}

fn decode_dimension<O: OrderScheme>(
    reader: &mut Reader<'_>,
    count: u64,
    has_open: bool,
    order: &O,
    mut read_value: impl FnMut(&mut Reader<'_>) -> DecodeResult<O::Value>,
) -> DecodeResult<DisjointInterval<O::Value>> {
    // Every range costs at least one byte, so a count beyond the input is
    // truncated and must not drive the allocation.
    let remaining = reader.remaining();
    if count > remaining as u64 {
        return Err(DecodeError::UnexpectedEnd {
            needed: usize::try_from(count).unwrap_or(usize::MAX),
            remaining,
        });
    }
    let count = count as usize;

    let mut ranges = Vec::with_capacity(count);
    let mut mask = 0u8;
    for i in 0..count {
        let slot = i % CHUNK;
        if slot == 0 {
            mask = reader.read_u8()?;
            let chunk_len = (count - i).min(CHUNK);
            let unused = (0xffu16 >> chunk_len) as u8;
            if mask & unused != 0 {
                return Err(DecodeError::Inconsistent(format!(
                    "mask {mask:#04x} marks ranges past the last one"
                )));
            }
        }
        let inclusive = mask & (0x80 >> slot) != 0;
        let open = has_open && i + 1 == count;

        let start = read_value(reader)?;
        let range = if open {
            if inclusive {
                return Err(DecodeError::Inconsistent(
                    "open range marked inclusive".to_string(),
                ));
            }
            Range::open(start)
        } else {
            let end = read_value(reader)?;
            if inclusive {
                Range::closed_inclusive(start, end)
            } else {
                Range::closed_exclusive(start, end)
            }
        };
        ranges.push(range);
    }

    DisjointInterval::from_canonical_ranges(ranges, order).map_err(|err| match err {
        ProductError::InvalidRange => DecodeError::InvalidRange,
        other => DecodeError::NonCanonical(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Sparse3dInterval;
    use crate::testing::timestamp_range;
    use meadowcap_core::{PathOrder, TimestampOrder};
    use proptest::prelude::*;

    type Product = ThreeDimensionalProduct<u64>;

    fn dims() -> Dimensions<TimestampOrder> {
        Dimensions::new(PathOrder::new(6), TimestampOrder)
    }

    fn encode(product: &Product) -> Vec<u8> {
        encode_product(product, &dims(), |s, out| write_u64(out, *s))
    }

    fn decode(bytes: &[u8]) -> DecodeResult<Product> {
        decode_product(bytes, &dims(), |reader| reader.read_u64())
    }

    #[test]
    fn test_empty_product_is_single_byte() {
        assert_eq!(encode(&Product::empty()), vec![0xff]);
        assert_eq!(decode(&[0xff]).unwrap(), Product::empty());

        // One empty dimension is the empty product too.
        let mut lopsided = Product::empty();
        lopsided.timestamp = DisjointInterval::from_range(Range::open(0), &TimestampOrder).unwrap();
        assert_eq!(encode(&lopsided), vec![0xff]);
    }

    #[test]
    fn test_layout() {
        let product = Product::empty()
            .with_box(
                Sparse3dInterval::new(
                    Range::closed_exclusive(1, 2),
                    Range::closed_inclusive(Path::from("ab"), Path::from("ab")),
                    Range::open(3),
                ),
                &dims(),
            )
            .unwrap()
            .with_box(
                Sparse3dInterval {
                    path: Some(Range::closed_inclusive(Path::from("ac"), Path::from("ac"))),
                    ..Default::default()
                },
                &dims(),
            )
            .unwrap();

        let mut expected = vec![
            TIMESTAMP_SMALL | PATH_SMALL | SUBSPACE_SMALL | SUBSPACE_OPEN,
            0, // one timestamp range
            1, // two path ranges
            0, // one subspace range
        ];
        // Timestamp: mask, start, end.
        expected.push(0x00);
        expected.extend_from_slice(&1u64.to_be_bytes());
        expected.extend_from_slice(&2u64.to_be_bytes());
        // Paths: both inclusive; "ab" "ab" then "ac" "ac" front-coded.
        expected.push(0xc0);
        expected.extend_from_slice(&[0, 2, b'a', b'b']);
        expected.extend_from_slice(&[2, 0]);
        expected.extend_from_slice(&[1, 1, b'c']);
        expected.extend_from_slice(&[2, 0]);
        // Subspace: open, start only.
        expected.push(0x00);
        expected.extend_from_slice(&3u64.to_be_bytes());

        assert_eq!(encode(&product), expected);
        assert_eq!(decode(&expected).unwrap(), product);
    }

    #[test]
    fn test_large_counts_and_chunks() {
        let d = dims();
        let timestamps = (0..300u64).map(|i| Range::closed_exclusive(i * 2, i * 2 + 1));
        let product = Product {
            timestamp: DisjointInterval::from_ranges(timestamps, &d.timestamp).unwrap(),
            path: DisjointInterval::from_range(Range::open(Path::empty()), &d.path).unwrap(),
            subspace: DisjointInterval::from_range(Range::closed_exclusive(0, 9), &d.subspace).unwrap(),
        };
        let bytes = encode(&product);
        assert_eq!(bytes[0] & TIMESTAMP_SMALL, 0);
        assert_eq!(&bytes[1..9], &300u64.to_be_bytes());
        assert_eq!(decode(&bytes).unwrap(), product);
    }

    #[test]
    fn test_decode_rejects_reserved_flags() {
        assert_eq!(decode(&[0x47, 0, 0, 0]), Err(DecodeError::UnknownFlags(0x47)));
    }

    #[test]
    fn test_decode_truncated() {
        let product = Product::full(&dims());
        let bytes = encode(&product);
        for len in 0..bytes.len() {
            assert!(
                matches!(decode(&bytes[..len]), Err(DecodeError::UnexpectedEnd { .. })),
                "prefix of {len} bytes decoded"
            );
        }
    }

    #[test]
    fn test_decode_trailing_bytes() {
        let mut bytes = encode(&Product::full(&dims()));
        bytes.push(0);
        assert_eq!(decode(&bytes), Err(DecodeError::TrailingBytes(1)));
    }

    #[test]
    fn test_decode_rejects_small_count_in_long_form() {
        let mut bytes = vec![TIMESTAMP_OPEN | PATH_SMALL | PATH_OPEN | SUBSPACE_SMALL | SUBSPACE_OPEN];
        bytes.extend_from_slice(&1u64.to_be_bytes());
        bytes.extend_from_slice(&[0, 0]);
        assert!(matches!(decode(&bytes), Err(DecodeError::NonCanonical(_))));
    }

    #[test]
    fn test_decode_rejects_prefix_longer_than_previous() {
        let flags = TIMESTAMP_SMALL | PATH_SMALL | SUBSPACE_SMALL | TIMESTAMP_OPEN | PATH_OPEN | SUBSPACE_OPEN;
        let mut bytes = vec![flags, 0, 0, 0];
        bytes.push(0x00);
        bytes.extend_from_slice(&0u64.to_be_bytes());
        // First path claims a 1-byte prefix of the empty path.
        bytes.extend_from_slice(&[0x00, 1, 0]);
        assert_eq!(
            decode(&bytes),
            Err(DecodeError::InvalidPrefix {
                prefix: 1,
                previous: 0
            })
        );
    }

    #[test]
    fn test_decode_rejects_unsorted_ranges() {
        let flags = TIMESTAMP_SMALL | PATH_SMALL | SUBSPACE_SMALL | PATH_OPEN | SUBSPACE_OPEN;
        let mut bytes = vec![flags, 1, 0, 0];
        bytes.push(0x00);
        for v in [5u64, 6, 0, 1] {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        bytes.extend_from_slice(&[0x00, 0, 0]);
        bytes.push(0x00);
        bytes.extend_from_slice(&0u64.to_be_bytes());
        assert!(matches!(decode(&bytes), Err(DecodeError::NonCanonical(_))));
    }

    #[test]
    fn test_decode_rejects_inverted_range() {
        let flags = TIMESTAMP_SMALL | PATH_SMALL | SUBSPACE_SMALL | PATH_OPEN | SUBSPACE_OPEN;
        let mut bytes = vec![flags, 0, 0, 0, 0x00];
        bytes.extend_from_slice(&9u64.to_be_bytes());
        bytes.extend_from_slice(&3u64.to_be_bytes());
        bytes.extend_from_slice(&[0x00, 0, 0]);
        bytes.push(0x00);
        bytes.extend_from_slice(&0u64.to_be_bytes());
        assert_eq!(decode(&bytes), Err(DecodeError::InvalidRange));
    }

    #[test]
    fn test_paths_at_max_length_roundtrip() {
        let full = Path::from_bytes(vec![0xff; 6]);
        let product = Product::empty()
            .with_box(
                Sparse3dInterval::new(
                    Range::open(0),
                    Range::closed_inclusive(Path::from("aaaaaa"), Path::from("bbbbbb")),
                    Range::open(0),
                ),
                &dims(),
            )
            .unwrap();
        assert_eq!(
            product.path.ranges(),
            &[Range::closed_exclusive(Path::from("aaaaaa"), Path::from("bbbbbc"))]
        );
        assert_eq!(decode(&encode(&product)).unwrap(), product);

        let tail = Product::empty()
            .with_box(Sparse3dInterval::new(Range::open(0), Range::open(full), Range::open(0)), &dims())
            .unwrap();
        assert_eq!(decode(&encode(&tail)).unwrap(), tail);
    }

    #[test]
    fn test_path_past_max_length_never_reaches_the_encoder() {
        let too_long = Sparse3dInterval::new(
            Range::open(0),
            Range::closed_exclusive(Path::from("aaaaaaa"), Path::from("b")),
            Range::open(0),
        );
        assert_eq!(
            Product::empty().with_box(too_long, &dims()),
            Err(ProductError::InvalidRange)
        );
    }

    fn path_range() -> impl Strategy<Value = Range<Path>> {
        let path = prop::collection::vec(prop_oneof![Just(0u8), Just(b'a'), Just(0xffu8)], 0..=6).prop_map(Path);
        (path.clone(), path, any::<bool>()).prop_filter_map("empty range", |(a, b, open)| {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let range = if open {
                Range::open(lo)
            } else {
                Range::closed_exclusive(lo, hi)
            };
            range.is_valid(&PathOrder::new(6)).then_some(range)
        })
    }

    fn product() -> impl Strategy<Value = Product> {
        (
            prop::collection::vec(timestamp_range(), 1..12),
            prop::collection::vec(path_range(), 1..12),
            prop::collection::vec(timestamp_range(), 1..12),
        )
            .prop_map(|(ts, paths, subs)| {
                let d = dims();
                Product {
                    timestamp: DisjointInterval::from_ranges(ts, &d.timestamp).unwrap(),
                    path: DisjointInterval::from_ranges(paths, &d.path).unwrap(),
                    subspace: DisjointInterval::from_ranges(subs, &d.subspace).unwrap(),
                }
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn test_product_roundtrip(product in product()) {
            let bytes = encode(&product);
            prop_assert_eq!(decode(&bytes).unwrap(), product);
        }
    }
}
