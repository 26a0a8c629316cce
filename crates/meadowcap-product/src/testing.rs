//! Strategies shared by the unit tests of this crate.

use meadowcap_core::TimestampOrder;
use proptest::prelude::*;

use crate::range::Range;

/// Values used by enumeration checks lie in `0..DOMAIN + 5`.
pub(crate) const DOMAIN: u64 = 40;

/// Any valid range over a small timestamp domain.
pub(crate) fn timestamp_range() -> impl Strategy<Value = Range<u64>> {
    (0..DOMAIN, 0..DOMAIN, 0u8..3).prop_filter_map("empty range", |(a, b, kind)| {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let range = match kind {
            0 => Range::open(lo),
            1 => Range::closed_exclusive(lo, hi),
            _ => Range::closed_inclusive(lo, hi),
        };
        range.is_valid(&TimestampOrder).then_some(range)
    })
}

/// Values covered by a predicate over the enumeration domain.
pub(crate) fn enumerate(covers: impl Fn(&u64) -> bool) -> Vec<u64> {
    (0..DOMAIN + 5).filter(|v| covers(v)).collect()
}
