//! Total orders over the values of each namespace dimension.
//!
//! Range algebra needs more than `Ord`: it needs the value immediately after
//! and immediately before a given one (to convert between inclusive and
//! exclusive range ends) and a rule for which of two equivalent range ends
//! encodes shorter. An [`OrderScheme`] bundles those for one value type.

use std::cmp::Ordering;
use std::fmt::Debug;

use crate::crypto::Ed25519PublicKey;
use crate::encoding::{width_for, write_uint, Reader};
use crate::error::{DecodeError, DecodeResult};
use crate::types::{Path, Timestamp};

/// Order, successor and predecessor over one dimension's values.
pub trait OrderScheme: Send + Sync {
    /// The values being ordered.
    type Value: Clone + Debug + Eq + Send + Sync;

    /// Total order over values.
    fn order(&self, a: &Self::Value, b: &Self::Value) -> Ordering;

    /// The smallest value strictly greater than `value`, if any.
    fn successor(&self, value: &Self::Value) -> Option<Self::Value>;

    /// The largest value strictly smaller than `value`, if any.
    fn predecessor(&self, value: &Self::Value) -> Option<Self::Value>;

    /// Given an inclusive end and the equivalent exclusive end
    /// (`successor(inclusive_end) == exclusive_end`), whether the inclusive
    /// form encodes shorter. Ties pick the exclusive form.
    fn is_inclusive_smaller(&self, inclusive_end: &Self::Value, exclusive_end: &Self::Value) -> bool;

    /// The smallest value.
    fn minimum(&self) -> Self::Value;

    /// Whether `value` lies in the dimension at all. Every value of the type
    /// does unless the order bounds it further.
    fn is_valid_value(&self, _value: &Self::Value) -> bool {
        true
    }
}

/// Timestamps: `u64` in numeric order.
///
/// Timestamps encode at a fixed width, so the exclusive form is always
/// canonical.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimestampOrder;

impl OrderScheme for TimestampOrder {
    type Value = Timestamp;

    fn order(&self, a: &Timestamp, b: &Timestamp) -> Ordering {
        a.cmp(b)
    }

    fn successor(&self, value: &Timestamp) -> Option<Timestamp> {
        value.checked_add(1)
    }

    fn predecessor(&self, value: &Timestamp) -> Option<Timestamp> {
        value.checked_sub(1)
    }

    fn is_inclusive_smaller(&self, _inclusive_end: &Timestamp, _exclusive_end: &Timestamp) -> bool {
        false
    }

    fn minimum(&self) -> Timestamp {
        0
    }
}

/// Paths: byte strings in lexicographic order, bounded by `max_length`.
///
/// The bound is what makes predecessors exist: the path right before `[5]`
/// is `[4, 255, 255, ...]` padded out to `max_length` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathOrder {
    max_length: usize,
}

impl PathOrder {
    /// Default bound on path length, in bytes.
    pub const DEFAULT_MAX_LENGTH: usize = 512;

    /// Create an order over paths of at most `max_length` bytes.
    ///
    /// `max_length` must be at least 1.
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length: max_length.max(1),
        }
    }

    /// The maximum path length.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Width in bytes of an encoded path length.
    pub fn length_width(&self) -> usize {
        width_for(self.max_length as u64)
    }

    /// Append a path length (or any count bounded by the max length).
    ///
    /// Callers check the bound first; see [`Self::check_path`].
    pub fn encode_length(&self, length: usize, out: &mut Vec<u8>) {
        debug_assert!(
            length <= self.max_length,
            "length {length} exceeds max path length {}",
            self.max_length
        );
        write_uint(out, length as u64, self.length_width());
    }

    /// Fail with [`DecodeError::PathTooLong`] unless `path` fits the bound.
    pub fn check_path(&self, path: &Path) -> DecodeResult<()> {
        if path.len() > self.max_length {
            return Err(DecodeError::PathTooLong {
                length: path.len(),
                max: self.max_length,
            });
        }
        Ok(())
    }

    /// Read a length written by [`Self::encode_length`].
    pub fn decode_length(&self, reader: &mut Reader<'_>) -> DecodeResult<usize> {
        let raw = reader.read_uint(self.length_width())?;
        let length = usize::try_from(raw).unwrap_or(usize::MAX);
        if length > self.max_length {
            return Err(DecodeError::PathTooLong {
                length,
                max: self.max_length,
            });
        }
        Ok(length)
    }

    /// Append a full path: its length followed by its bytes.
    pub fn encode_path(&self, path: &Path, out: &mut Vec<u8>) {
        self.encode_length(path.len(), out);
        out.extend_from_slice(path.as_bytes());
    }

    /// Read a path written by [`Self::encode_path`].
    pub fn decode_path(&self, reader: &mut Reader<'_>) -> DecodeResult<Path> {
        let length = self.decode_length(reader)?;
        Ok(Path::from(reader.read_bytes(length)?))
    }
}

impl Default for PathOrder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_LENGTH)
    }
}

impl OrderScheme for PathOrder {
    type Value = Path;

    fn order(&self, a: &Path, b: &Path) -> Ordering {
        a.cmp(b)
    }

    fn successor(&self, value: &Path) -> Option<Path> {
        let mut bytes = value.0.clone();
        if bytes.len() < self.max_length {
            bytes.push(0);
            return Some(Path(bytes));
        }
        while let Some(last) = bytes.pop() {
            if last < 0xff {
                bytes.push(last + 1);
                return Some(Path(bytes));
            }
        }
        None
    }

    fn predecessor(&self, value: &Path) -> Option<Path> {
        let mut bytes = value.0.clone();
        let last = bytes.pop()?;
        if last > 0 {
            bytes.push(last - 1);
            bytes.resize(self.max_length, 0xff);
        }
        Some(Path(bytes))
    }

    fn is_inclusive_smaller(&self, inclusive_end: &Path, exclusive_end: &Path) -> bool {
        inclusive_end.len() < exclusive_end.len()
    }

    fn minimum(&self) -> Path {
        Path::empty()
    }

    fn is_valid_value(&self, value: &Path) -> bool {
        value.len() <= self.max_length
    }
}

/// Ed25519 keys as 256-bit big-endian integers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ed25519Order;

impl OrderScheme for Ed25519Order {
    type Value = Ed25519PublicKey;

    fn order(&self, a: &Ed25519PublicKey, b: &Ed25519PublicKey) -> Ordering {
        a.cmp(b)
    }

    fn successor(&self, value: &Ed25519PublicKey) -> Option<Ed25519PublicKey> {
        value.checked_increment()
    }

    fn predecessor(&self, value: &Ed25519PublicKey) -> Option<Ed25519PublicKey> {
        value.checked_decrement()
    }

    fn is_inclusive_smaller(&self, _: &Ed25519PublicKey, _: &Ed25519PublicKey) -> bool {
        false
    }

    fn minimum(&self) -> Ed25519PublicKey {
        Ed25519PublicKey::MIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_timestamp_bounds() {
        let order = TimestampOrder;
        assert_eq!(order.successor(&u64::MAX), None);
        assert_eq!(order.predecessor(&0), None);
        assert_eq!(order.successor(&41), Some(42));
    }

    #[test]
    fn test_path_successor_extends_below_max() {
        let order = PathOrder::new(3);
        assert_eq!(order.successor(&Path::from("a")), Some(Path::from("a\0")));
        assert_eq!(order.successor(&Path::empty()), Some(Path::from_bytes(vec![0])));
    }

    #[test]
    fn test_path_successor_at_max_length() {
        let order = PathOrder::new(2);
        assert_eq!(
            order.successor(&Path::from_bytes(vec![1, 2])),
            Some(Path::from_bytes(vec![1, 3]))
        );
        assert_eq!(
            order.successor(&Path::from_bytes(vec![1, 0xff])),
            Some(Path::from_bytes(vec![2]))
        );
        assert_eq!(order.successor(&Path::from_bytes(vec![0xff, 0xff])), None);
    }

    #[test]
    fn test_path_predecessor() {
        let order = PathOrder::new(3);
        assert_eq!(order.predecessor(&Path::empty()), None);
        assert_eq!(
            order.predecessor(&Path::from_bytes(vec![7, 0])),
            Some(Path::from_bytes(vec![7]))
        );
        assert_eq!(
            order.predecessor(&Path::from_bytes(vec![5])),
            Some(Path::from_bytes(vec![4, 0xff, 0xff]))
        );
    }

    #[test]
    fn test_path_inclusive_smaller_by_length() {
        let order = PathOrder::new(8);
        // [a, a\0) and [a, a] cover the same values; the inclusive end is shorter.
        assert!(order.is_inclusive_smaller(&Path::from("a"), &Path::from("a\0")));
        assert!(!order.is_inclusive_smaller(&Path::from("ab"), &Path::from("ac")));
    }

    #[test]
    fn test_path_length_encoding() {
        let order = PathOrder::new(300);
        assert_eq!(order.length_width(), 2);

        let mut out = Vec::new();
        order.encode_path(&Path::from("hey"), &mut out);
        assert_eq!(out, vec![0, 3, b'h', b'e', b'y']);

        let mut reader = Reader::new(&out);
        assert_eq!(order.decode_path(&mut reader).unwrap(), Path::from("hey"));
    }

    #[test]
    fn test_path_length_over_max_rejected() {
        let order = PathOrder::new(4);
        let bytes = [5u8, 1, 2, 3, 4, 5];
        let mut reader = Reader::new(&bytes);
        assert_eq!(
            order.decode_path(&mut reader),
            Err(DecodeError::PathTooLong { length: 5, max: 4 })
        );
    }

    #[test]
    fn test_path_bound() {
        let order = PathOrder::new(3);
        let at_limit = Path::from("abc");
        let past_limit = Path::from("abcd");

        assert!(order.is_valid_value(&at_limit));
        assert!(!order.is_valid_value(&past_limit));
        assert!(order.check_path(&at_limit).is_ok());
        assert_eq!(
            order.check_path(&past_limit),
            Err(DecodeError::PathTooLong { length: 4, max: 3 })
        );
        assert!(TimestampOrder.is_valid_value(&u64::MAX));
    }

    #[test]
    fn test_path_at_max_length_roundtrips() {
        let order = PathOrder::new(256);
        let path = Path::from_bytes(vec![b'x'; 256]);

        let mut out = Vec::new();
        order.encode_path(&path, &mut out);
        assert_eq!(&out[..2], &[0x01, 0x00]);

        let mut reader = Reader::new(&out);
        assert_eq!(order.decode_path(&mut reader).unwrap(), path);
        assert!(reader.is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "exceeds max path length")]
    fn test_encode_length_past_bound_panics_in_debug() {
        let mut out = Vec::new();
        PathOrder::new(200).encode_length(300, &mut out);
    }

    fn bounded_path(max: usize) -> impl Strategy<Value = Path> {
        prop::collection::vec(prop_oneof![Just(0u8), Just(1u8), Just(0xfeu8), Just(0xffu8)], 0..=max)
            .prop_map(Path)
    }

    proptest! {
        #[test]
        fn test_path_successor_predecessor_inverse(path in bounded_path(4)) {
            let order = PathOrder::new(4);
            if let Some(next) = order.successor(&path) {
                prop_assert_eq!(order.order(&path, &next), Ordering::Less);
                prop_assert_eq!(order.predecessor(&next), Some(path.clone()));
            }
            if let Some(prev) = order.predecessor(&path) {
                prop_assert_eq!(order.order(&prev, &path), Ordering::Less);
                prop_assert!(prev.len() <= 4);
                prop_assert_eq!(order.successor(&prev), Some(path.clone()));
            }
        }

        #[test]
        fn test_key_successor_predecessor_inverse(bytes in any::<[u8; 32]>()) {
            let order = Ed25519Order;
            let key = Ed25519PublicKey(bytes);
            if let Some(next) = order.successor(&key) {
                prop_assert!(key < next);
                prop_assert_eq!(order.predecessor(&next), Some(key));
            }
        }
    }
}
