//! Disjoint intervals: canonical sets of ranges over one dimension.
//!
//! A [`DisjointInterval`] keeps its ranges sorted by start, pairwise
//! separated by a gap, and each in canonical form. Under those rules two
//! intervals covering the same values are structurally equal.

use std::cmp::Ordering;

use meadowcap_core::OrderScheme;

use crate::error::{ProductError, Result};
use crate::range::{span_contains, span_intersect, span_touches, span_union, Range};

/// What to do when an inserted range overlaps or abuts an existing one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlapPolicy {
    /// Fold the ranges into one.
    #[default]
    Merge,
    /// Fail with [`ProductError::Overlap`], leaving the interval unchanged.
    Reject,
}

/// A set of pairwise disjoint, non-adjacent ranges in canonical form.
///
/// The empty interval covers nothing. At most one range is open, and if
/// present it is the last one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisjointInterval<V> {
    ranges: Vec<Range<V>>,
}

impl<V> Default for DisjointInterval<V> {
    fn default() -> Self {
        Self { ranges: Vec::new() }
    }
}

impl<V> DisjointInterval<V> {
    /// The empty interval.
    pub fn new() -> Self {
        Self::default()
    }

    /// The ranges, sorted by start.
    pub fn ranges(&self) -> &[Range<V>] {
        &self.ranges
    }

    /// Number of ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether the interval covers nothing.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Iterate over the ranges in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Range<V>> {
        self.ranges.iter()
    }

    /// The open range, if any.
    pub fn open_range(&self) -> Option<&Range<V>> {
        self.ranges.last().filter(|r| r.is_open())
    }

    /// All closed ranges, sorted by start.
    pub fn closed_ranges(&self) -> &[Range<V>] {
        match self.open_range() {
            Some(_) => &self.ranges[..self.ranges.len() - 1],
            None => &self.ranges,
        }
    }

    /// Take the ranges out, sorted by start.
    pub fn into_ranges(self) -> Vec<Range<V>> {
        self.ranges
    }
}

impl<'a, V> IntoIterator for &'a DisjointInterval<V> {
    type Item = &'a Range<V>;
    type IntoIter = std::slice::Iter<'a, Range<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

impl<V: Clone + Eq> DisjointInterval<V> {
    /// The interval holding a single range.
    pub fn from_range<O: OrderScheme<Value = V>>(range: Range<V>, order: &O) -> Result<Self> {
        let mut interval = Self::new();
        interval.insert(range, order)?;
        Ok(interval)
    }

    /// A one-range interval from a range known to be valid and canonical.
    pub(crate) fn from_canonical_unchecked(range: Range<V>) -> Self {
        Self { ranges: vec![range] }
    }

    /// Fold any number of valid ranges into canonical form.
    pub fn from_ranges<O, I>(ranges: I, order: &O) -> Result<Self>
    where
        O: OrderScheme<Value = V>,
        I: IntoIterator<Item = Range<V>>,
    {
        let mut interval = Self::new();
        for range in ranges {
            interval.insert(range, order)?;
        }
        Ok(interval)
    }

    /// Accept ranges that are already in canonical disjoint form, in order.
    ///
    /// Used by decoders: anything that would need folding is rejected.
    pub fn from_canonical_ranges<O: OrderScheme<Value = V>>(ranges: Vec<Range<V>>, order: &O) -> Result<Self> {
        let interval = Self { ranges };
        interval.validate(order)?;
        Ok(interval)
    }

    /// Check the canonical form invariants.
    pub fn validate<O: OrderScheme<Value = V>>(&self, order: &O) -> Result<()> {
        let mut previous_end: Option<Option<V>> = None;
        for range in &self.ranges {
            if !range.is_valid(order) {
                return Err(ProductError::InvalidRange);
            }
            if range.canonical(order) != *range {
                return Err(ProductError::MalformedInterval(
                    "range not in canonical form".to_string(),
                ));
            }
            let span = range.span(order);
            match previous_end {
                Some(None) => {
                    return Err(ProductError::MalformedInterval(
                        "range after an unbounded range".to_string(),
                    ))
                }
                Some(Some(end)) if order.order(&end, &span.start) != Ordering::Less => {
                    return Err(ProductError::MalformedInterval(
                        "ranges unsorted, overlapping or adjacent".to_string(),
                    ))
                }
                _ => {}
            }
            previous_end = Some(span.end);
        }
        Ok(())
    }

    /// Insert a range, folding it into any range it overlaps or abuts.
    pub fn insert<O: OrderScheme<Value = V>>(&mut self, range: Range<V>, order: &O) -> Result<()> {
        self.insert_with(range, order, OverlapPolicy::Merge)
    }

    /// Insert a range under an explicit overlap policy.
    pub fn insert_with<O: OrderScheme<Value = V>>(
        &mut self,
        range: Range<V>,
        order: &O,
        policy: OverlapPolicy,
    ) -> Result<()> {
        if !range.is_valid(order) {
            return Err(ProductError::InvalidRange);
        }
        let mut working = range.span(order);

        if policy == OverlapPolicy::Reject
            && self.ranges.iter().any(|r| span_touches(&r.span(order), &working, order))
        {
            return Err(ProductError::Overlap);
        }

        while let Some(index) = self
            .ranges
            .iter()
            .position(|r| span_touches(&r.span(order), &working, order))
        {
            let absorbed = self.ranges.remove(index).span(order);
            working = span_union(absorbed, working, order);
        }

        let at = self
            .ranges
            .partition_point(|r| order.order(r.start(), &working.start) == Ordering::Less);
        self.ranges.insert(at, Range::from_span(working, order));
        Ok(())
    }

    /// Functional form of [`Self::insert`].
    pub fn with_range<O: OrderScheme<Value = V>>(&self, range: Range<V>, order: &O) -> Result<Self> {
        let mut next = self.clone();
        next.insert(range, order)?;
        Ok(next)
    }

    /// Values covered by both intervals.
    pub fn intersect<O: OrderScheme<Value = V>>(&self, other: &Self, order: &O) -> Self {
        let mut spans = Vec::new();
        for a in &self.ranges {
            let a = a.span(order);
            for b in &other.ranges {
                if let Some(span) = span_intersect(&a, &b.span(order), order) {
                    spans.push(span);
                }
            }
        }
        // Pieces of disjoint sets are already disjoint; only order them.
        spans.sort_by(|a, b| order.order(&a.start, &b.start));
        Self {
            ranges: spans.into_iter().map(|s| Range::from_span(s, order)).collect(),
        }
    }

    /// Whether both intervals cover exactly the same values.
    pub fn is_equal<O: OrderScheme<Value = V>>(&self, other: &Self, order: &O) -> bool {
        self.ranges.len() == other.ranges.len()
            && self
                .ranges
                .iter()
                .zip(&other.ranges)
                .all(|(a, b)| a.is_equivalent(b, order))
    }

    /// Union of several intervals.
    pub fn merge<O: OrderScheme<Value = V>>(sets: &[Self], order: &O) -> Result<Self> {
        let mut iter = sets.iter();
        let mut acc = match iter.next() {
            Some(first) => first.clone(),
            None => return Ok(Self::new()),
        };
        for set in iter {
            for range in &set.ranges {
                acc.insert(range.clone(), order)?;
            }
        }
        Ok(acc)
    }

    /// Rewrite every range into canonical form, refolding as needed.
    pub fn canonical<O: OrderScheme<Value = V>>(&self, order: &O) -> Result<Self> {
        Self::from_ranges(self.ranges.iter().cloned(), order)
    }

    /// Whether `value` lies in some range.
    pub fn includes<O: OrderScheme<Value = V>>(&self, value: &V, order: &O) -> bool {
        self.ranges.iter().any(|r| r.includes(value, order))
    }

    /// Whether every value covered here is covered by `other`.
    pub fn is_subset_of<O: OrderScheme<Value = V>>(&self, other: &Self, order: &O) -> bool {
        // A range of `self` is contiguous and `other` has gaps between its
        // ranges, so it must fit inside a single one.
        self.ranges.iter().all(|inner| {
            let inner = inner.span(order);
            other
                .ranges
                .iter()
                .any(|outer| span_contains(&outer.span(order), &inner, order))
        })
    }
}
