//! Ranges: contiguous intervals over one dimension.
//!
//! A range is written in one of three forms. The same set of values can
//! often be written two ways (`[a, b)` and `[a, pred(b)]`), so every
//! operation works on a half-open span view and converts back through
//! [`Range::canonical`], which picks whichever form the dimension's
//! [`OrderScheme`] says encodes shorter.

use std::cmp::Ordering;

use meadowcap_core::OrderScheme;

/// A contiguous interval of values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Range<V> {
    /// All values `>= start`.
    Open { start: V },
    /// Values `v` with `start <= v < end`. Requires `start < end`.
    ClosedExclusive { start: V, end: V },
    /// Values `v` with `start <= v <= end`. Requires `start <= end`.
    ClosedInclusive { start: V, end: V },
}

/// Half-open view of a range: `[start, end)`, with `None` meaning unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Span<V> {
    pub(crate) start: V,
    pub(crate) end: Option<V>,
}

impl<V> Range<V> {
    /// All values from `start` on.
    pub fn open(start: V) -> Self {
        Range::Open { start }
    }

    /// `[start, end)`.
    pub fn closed_exclusive(start: V, end: V) -> Self {
        Range::ClosedExclusive { start, end }
    }

    /// `[start, end]`.
    pub fn closed_inclusive(start: V, end: V) -> Self {
        Range::ClosedInclusive { start, end }
    }

    /// The first value in the range.
    pub fn start(&self) -> &V {
        match self {
            Range::Open { start }
            | Range::ClosedExclusive { start, .. }
            | Range::ClosedInclusive { start, .. } => start,
        }
    }

    /// The stored end, if the range is closed.
    pub fn end(&self) -> Option<&V> {
        match self {
            Range::Open { .. } => None,
            Range::ClosedExclusive { end, .. } | Range::ClosedInclusive { end, .. } => Some(end),
        }
    }

    /// Whether this is an open range.
    pub fn is_open(&self) -> bool {
        matches!(self, Range::Open { .. })
    }

    /// Whether this is a closed inclusive range.
    pub fn is_inclusive(&self) -> bool {
        matches!(self, Range::ClosedInclusive { .. })
    }
}

impl<V: Clone + Eq> Range<V> {
    /// Check the per-kind ordering invariant, and that every bound lies in
    /// the dimension.
    pub fn is_valid<O: OrderScheme<Value = V>>(&self, order: &O) -> bool {
        if !order.is_valid_value(self.start()) || !self.end().map_or(true, |end| order.is_valid_value(end)) {
            return false;
        }
        match self {
            Range::Open { .. } => true,
            Range::ClosedExclusive { start, end } => order.order(start, end) == Ordering::Less,
            Range::ClosedInclusive { start, end } => order.order(start, end) != Ordering::Greater,
        }
    }

    /// The half-open view. An inclusive end with no successor is unbounded.
    pub(crate) fn span<O: OrderScheme<Value = V>>(&self, order: &O) -> Span<V> {
        match self {
            Range::Open { start } => Span {
                start: start.clone(),
                end: None,
            },
            Range::ClosedExclusive { start, end } => Span {
                start: start.clone(),
                end: Some(end.clone()),
            },
            Range::ClosedInclusive { start, end } => Span {
                start: start.clone(),
                end: order.successor(end),
            },
        }
    }

    /// Build the canonical range for a non-empty span.
    pub(crate) fn from_span<O: OrderScheme<Value = V>>(span: Span<V>, order: &O) -> Self {
        let Span { start, end } = span;
        match end {
            None => Range::Open { start },
            Some(end) => match order.predecessor(&end) {
                Some(last) if order.is_inclusive_smaller(&last, &end) => {
                    Range::ClosedInclusive { start, end: last }
                }
                _ => Range::ClosedExclusive { start, end },
            },
        }
    }

    /// The canonical representation of the same set of values.
    ///
    /// Inclusive ranges ending at the dimension's maximum become open.
    pub fn canonical<O: OrderScheme<Value = V>>(&self, order: &O) -> Self {
        Self::from_span(self.span(order), order)
    }

    /// Whether both ranges cover exactly the same values.
    pub fn is_equivalent<O: OrderScheme<Value = V>>(&self, other: &Self, order: &O) -> bool {
        self.span(order) == other.span(order)
    }

    /// Whether `value` lies in the range.
    pub fn includes<O: OrderScheme<Value = V>>(&self, value: &V, order: &O) -> bool {
        if order.order(self.start(), value) == Ordering::Greater {
            return false;
        }
        match self {
            Range::Open { .. } => true,
            Range::ClosedExclusive { end, .. } => order.order(value, end) == Ordering::Less,
            Range::ClosedInclusive { end, .. } => order.order(value, end) != Ordering::Greater,
        }
    }

    /// Whether every value of `other` lies in this range.
    pub fn contains<O: OrderScheme<Value = V>>(&self, other: &Self, order: &O) -> bool {
        span_contains(&self.span(order), &other.span(order), order)
    }

    /// The overlap of two ranges, in canonical form, or `None` if they share
    /// no value.
    pub fn intersect<O: OrderScheme<Value = V>>(&self, other: &Self, order: &O) -> Option<Self> {
        span_intersect(&self.span(order), &other.span(order), order)
            .map(|span| Self::from_span(span, order))
    }
}

/// Compare two exclusive ends, `None` being greater than every value.
pub(crate) fn cmp_end<O: OrderScheme>(a: &Option<O::Value>, b: &Option<O::Value>, order: &O) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => order.order(a, b),
    }
}

/// Whether `value <= end` for an exclusive end. Equality means adjacency.
fn reaches<O: OrderScheme>(value: &O::Value, end: &Option<O::Value>, order: &O) -> bool {
    match end {
        None => true,
        Some(end) => order.order(value, end) != Ordering::Greater,
    }
}

pub(crate) fn span_intersect<O: OrderScheme>(
    a: &Span<O::Value>,
    b: &Span<O::Value>,
    order: &O,
) -> Option<Span<O::Value>> {
    let start = if order.order(&a.start, &b.start) == Ordering::Less {
        b.start.clone()
    } else {
        a.start.clone()
    };
    let end = if cmp_end(&a.end, &b.end, order) == Ordering::Less {
        a.end.clone()
    } else {
        b.end.clone()
    };
    match &end {
        Some(e) if order.order(e, &start) != Ordering::Greater => None,
        _ => Some(Span { start, end }),
    }
}

/// Whether two spans overlap or abut.
pub(crate) fn span_touches<O: OrderScheme>(a: &Span<O::Value>, b: &Span<O::Value>, order: &O) -> bool {
    reaches(&b.start, &a.end, order) && reaches(&a.start, &b.end, order)
}

/// The smallest span covering two touching spans.
pub(crate) fn span_union<O: OrderScheme>(
    a: Span<O::Value>,
    b: Span<O::Value>,
    order: &O,
) -> Span<O::Value> {
    let start = if order.order(&a.start, &b.start) == Ordering::Greater {
        b.start
    } else {
        a.start
    };
    let end = if cmp_end(&a.end, &b.end, order) == Ordering::Less {
        b.end
    } else {
        a.end
    };
    Span { start, end }
}

pub(crate) fn span_contains<O: OrderScheme>(
    outer: &Span<O::Value>,
    inner: &Span<O::Value>,
    order: &O,
) -> bool {
    order.order(&outer.start, &inner.start) != Ordering::Greater
        && cmp_end(&inner.end, &outer.end, order) != Ordering::Greater
}
