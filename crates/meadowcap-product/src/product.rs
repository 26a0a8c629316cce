//! Three-dimensional products: granted regions of a namespace.
//!
//! A product is a disjoint interval per dimension. A point is included when
//! each of its coordinates lies in the corresponding interval, so a product
//! is a conjunction: one empty dimension empties the whole region.

use meadowcap_core::{OrderScheme, Path, PathOrder, Timestamp, TimestampOrder};

use crate::error::{ProductError, Result};
use crate::interval::DisjointInterval;
use crate::range::Range;

/// The order schemes of the three dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimensions<O> {
    /// Time.
    pub timestamp: TimestampOrder,
    /// Paths, bounded by a maximum length.
    pub path: PathOrder,
    /// Subspace ids, injected.
    pub subspace: O,
}

impl<O: OrderScheme> Dimensions<O> {
    /// Dimensions with the given path bound and subspace order.
    pub fn new(path: PathOrder, subspace: O) -> Self {
        Self {
            timestamp: TimestampOrder,
            path,
            subspace,
        }
    }
}

/// A single box to add to a product. `None` leaves that dimension alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sparse3dInterval<S> {
    pub timestamp: Option<Range<Timestamp>>,
    pub path: Option<Range<Path>>,
    pub subspace: Option<Range<S>>,
}

impl<S> Default for Sparse3dInterval<S> {
    fn default() -> Self {
        Self {
            timestamp: None,
            path: None,
            subspace: None,
        }
    }
}

impl<S> Sparse3dInterval<S> {
    /// A box with a range in every dimension.
    pub fn new(timestamp: Range<Timestamp>, path: Range<Path>, subspace: Range<S>) -> Self {
        Self {
            timestamp: Some(timestamp),
            path: Some(path),
            subspace: Some(subspace),
        }
    }
}

/// A region of the (subspace, path, timestamp) space.
///
/// Either every dimension is empty (the empty product) or none is. Values
/// built through [`Self::with_box`], [`Self::intersect`] and
/// [`Self::merge`] keep that invariant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThreeDimensionalProduct<S> {
    pub timestamp: DisjointInterval<Timestamp>,
    pub path: DisjointInterval<Path>,
    pub subspace: DisjointInterval<S>,
}

impl<S> Default for ThreeDimensionalProduct<S> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<S> ThreeDimensionalProduct<S> {
    /// The product covering nothing.
    pub fn empty() -> Self {
        Self {
            timestamp: DisjointInterval::new(),
            path: DisjointInterval::new(),
            subspace: DisjointInterval::new(),
        }
    }

    /// Whether the product covers nothing. Any empty dimension counts.
    pub fn is_empty(&self) -> bool {
        self.timestamp.is_empty() || self.path.is_empty() || self.subspace.is_empty()
    }

    /// Whether the dimensions agree on emptiness.
    pub fn is_well_formed(&self) -> bool {
        let empties = [
            self.timestamp.is_empty(),
            self.path.is_empty(),
            self.subspace.is_empty(),
        ];
        empties.iter().all(|e| *e) || empties.iter().all(|e| !*e)
    }
}

impl<S: Clone + Eq> ThreeDimensionalProduct<S> {
    /// Every subspace, every path, every time.
    pub fn full<O: OrderScheme<Value = S>>(dims: &Dimensions<O>) -> Self {
        Self {
            timestamp: DisjointInterval::from_canonical_unchecked(Range::open(dims.timestamp.minimum())),
            path: DisjointInterval::from_canonical_unchecked(Range::open(dims.path.minimum())),
            subspace: DisjointInterval::from_canonical_unchecked(Range::open(dims.subspace.minimum())),
        }
    }

    /// One subspace, every path, every time.
    pub fn single_subspace<O: OrderScheme<Value = S>>(subspace: S, dims: &Dimensions<O>) -> Self {
        let range = Range::closed_inclusive(subspace.clone(), subspace).canonical(&dims.subspace);
        Self {
            subspace: DisjointInterval::from_canonical_unchecked(range),
            ..Self::full(dims)
        }
    }

    /// Add a box, dimension by dimension.
    ///
    /// Fails with [`ProductError::MalformedProduct`] when the result would
    /// have both empty and non-empty dimensions.
    pub fn with_box<O: OrderScheme<Value = S>>(
        &self,
        sparse: Sparse3dInterval<S>,
        dims: &Dimensions<O>,
    ) -> Result<Self> {
        let mut next = self.clone();
        next.add(sparse, dims)?;
        Ok(next)
    }

    /// In-place form of [`Self::with_box`].
    pub fn add<O: OrderScheme<Value = S>>(&mut self, sparse: Sparse3dInterval<S>, dims: &Dimensions<O>) -> Result<()> {
        let mut next = self.clone();
        if let Some(range) = sparse.timestamp {
            next.timestamp.insert(range, &dims.timestamp)?;
        }
        if let Some(range) = sparse.path {
            next.path.insert(range, &dims.path)?;
        }
        if let Some(range) = sparse.subspace {
            next.subspace.insert(range, &dims.subspace)?;
        }
        if !next.is_well_formed() {
            return Err(ProductError::MalformedProduct);
        }
        *self = next;
        Ok(())
    }

    /// The region covered by both products.
    pub fn intersect<O: OrderScheme<Value = S>>(&self, other: &Self, dims: &Dimensions<O>) -> Self {
        let timestamp = self.timestamp.intersect(&other.timestamp, &dims.timestamp);
        if timestamp.is_empty() {
            return Self::empty();
        }
        let path = self.path.intersect(&other.path, &dims.path);
        if path.is_empty() {
            return Self::empty();
        }
        let subspace = self.subspace.intersect(&other.subspace, &dims.subspace);
        if subspace.is_empty() {
            return Self::empty();
        }
        Self {
            timestamp,
            path,
            subspace,
        }
    }

    /// Union of products that differ in at most one dimension.
    ///
    /// Two dimensions must be identical across every input; the third is
    /// merged. Returns `None` when no such pair exists or `products` is
    /// empty.
    pub fn merge<O: OrderScheme<Value = S>>(products: &[Self], dims: &Dimensions<O>) -> Option<Self> {
        let (first, rest) = products.split_first()?;

        let same_timestamp = rest
            .iter()
            .all(|p| p.timestamp.is_equal(&first.timestamp, &dims.timestamp));
        let same_path = rest.iter().all(|p| p.path.is_equal(&first.path, &dims.path));
        let same_subspace = rest
            .iter()
            .all(|p| p.subspace.is_equal(&first.subspace, &dims.subspace));

        match (same_timestamp, same_path, same_subspace) {
            (true, true, _) => {
                let sets: Vec<_> = products.iter().map(|p| p.subspace.clone()).collect();
                Some(Self {
                    timestamp: first.timestamp.clone(),
                    path: first.path.clone(),
                    subspace: DisjointInterval::merge(&sets, &dims.subspace).ok()?,
                })
            }
            (true, false, true) => {
                let sets: Vec<_> = products.iter().map(|p| p.path.clone()).collect();
                Some(Self {
                    timestamp: first.timestamp.clone(),
                    path: DisjointInterval::merge(&sets, &dims.path).ok()?,
                    subspace: first.subspace.clone(),
                })
            }
            (false, true, true) => {
                let sets: Vec<_> = products.iter().map(|p| p.timestamp.clone()).collect();
                Some(Self {
                    timestamp: DisjointInterval::merge(&sets, &dims.timestamp).ok()?,
                    path: first.path.clone(),
                    subspace: first.subspace.clone(),
                })
            }
            _ => None,
        }
    }

    /// Every dimension in canonical form; any empty dimension yields the
    /// empty product.
    pub fn canonical<O: OrderScheme<Value = S>>(&self, dims: &Dimensions<O>) -> Result<Self> {
        if self.is_empty() {
            return Ok(Self::empty());
        }
        Ok(Self {
            timestamp: self.timestamp.canonical(&dims.timestamp)?,
            path: self.path.canonical(&dims.path)?,
            subspace: self.subspace.canonical(&dims.subspace)?,
        })
    }

    /// Whether every range is valid under `dims`. A product built under a
    /// larger maximum path length can hold paths this one cannot encode.
    pub fn fits<O: OrderScheme<Value = S>>(&self, dims: &Dimensions<O>) -> bool {
        self.timestamp.iter().all(|r| r.is_valid(&dims.timestamp))
            && self.path.iter().all(|r| r.is_valid(&dims.path))
            && self.subspace.iter().all(|r| r.is_valid(&dims.subspace))
    }

    /// Whether the point lies in the region.
    pub fn includes<O: OrderScheme<Value = S>>(
        &self,
        subspace: &S,
        path: &Path,
        timestamp: Timestamp,
        dims: &Dimensions<O>,
    ) -> bool {
        self.timestamp.includes(&timestamp, &dims.timestamp)
            && self.path.includes(path, &dims.path)
            && self.subspace.includes(subspace, &dims.subspace)
    }

    /// Whether every point of this product lies in `other`.
    pub fn is_subset_of<O: OrderScheme<Value = S>>(&self, other: &Self, dims: &Dimensions<O>) -> bool {
        if self.is_empty() {
            return true;
        }
        self.timestamp.is_subset_of(&other.timestamp, &dims.timestamp)
            && self.path.is_subset_of(&other.path, &dims.path)
            && self.subspace.is_subset_of(&other.subspace, &dims.subspace)
    }

    /// Whether both products cover the same region.
    pub fn is_equal<O: OrderScheme<Value = S>>(&self, other: &Self, dims: &Dimensions<O>) -> bool {
        if self.is_empty() || other.is_empty() {
            return self.is_empty() && other.is_empty();
        }
        self.timestamp.is_equal(&other.timestamp, &dims.timestamp)
            && self.path.is_equal(&other.path, &dims.path)
            && self.subspace.is_equal(&other.subspace, &dims.subspace)
    }

    /// Number of ranges per dimension, as (timestamp, path, subspace).
    pub fn range_counts(&self) -> (usize, usize, usize) {
        (self.timestamp.len(), self.path.len(), self.subspace.len())
    }
}
