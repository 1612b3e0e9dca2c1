//! Closed integer intervals and hyper-rectangular boxes over the query's
//! attribute universe.

use std::fmt;

use crate::error::{Result, SampleError};
use crate::relation::Query;

/// A closed interval `[lo, hi]` with `lo <= hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    lo: i64,
    hi: i64,
}

impl Interval {
    /// Create `[lo, hi]`, failing with [`SampleError::MalformedBox`] if `lo > hi`.
    pub fn new(lo: i64, hi: i64) -> Result<Self> {
        if lo > hi {
            return Err(SampleError::MalformedBox { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    /// The single-point interval `[v, v]`.
    pub fn point(v: i64) -> Self {
        Self { lo: v, hi: v }
    }

    pub fn lo(&self) -> i64 {
        self.lo
    }

    pub fn hi(&self) -> i64 {
        self.hi
    }

    #[inline]
    pub fn contains(&self, v: i64) -> bool {
        self.lo <= v && v <= self.hi
    }

    pub fn is_point(&self) -> bool {
        self.lo == self.hi
    }

    /// Number of integers in the interval.
    pub fn width(&self) -> u128 {
        (self.hi as i128 - self.lo as i128 + 1) as u128
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

/// One interval per entry of the query's `box_attributes`.
///
/// Boxes are values: [`DomainBox::replace`] returns a fresh box and leaves
/// `self` untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainBox {
    intervals: Vec<Interval>,
}

impl DomainBox {
    pub fn new(intervals: Vec<Interval>) -> Self {
        Self { intervals }
    }

    /// Build a box from raw `(lo, hi)` pairs, validating each one.
    pub fn from_bounds(bounds: &[(i64, i64)]) -> Result<Self> {
        let intervals = bounds
            .iter()
            .map(|&(lo, hi)| Interval::new(lo, hi))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { intervals })
    }

    /// The same bounds on every one of `dims` dimensions.
    pub fn uniform(dims: usize, lo: i64, hi: i64) -> Result<Self> {
        let interval = Interval::new(lo, hi)?;
        Ok(Self {
            intervals: vec![interval; dims],
        })
    }

    /// Tightest box containing every value the query's relations hold.
    ///
    /// Fails with [`SampleError::EmptyDomain`] for an attribute whose
    /// relations are all empty.
    pub fn covering(query: &Query) -> Result<Self> {
        let attributes = query.attributes();
        let mut bounds: Vec<Option<(i64, i64)>> = vec![None; attributes.len()];

        for (r, relation) in query.relations().iter().enumerate() {
            let positions = query.positions(r);
            for tuple in relation.tuples() {
                for (&dim, &v) in positions.iter().zip(tuple) {
                    bounds[dim] = Some(match bounds[dim] {
                        None => (v, v),
                        Some((lo, hi)) => (lo.min(v), hi.max(v)),
                    });
                }
            }
        }

        let intervals = bounds
            .into_iter()
            .zip(attributes)
            .map(|(b, attr)| match b {
                Some((lo, hi)) => Ok(Interval { lo, hi }),
                None => Err(SampleError::EmptyDomain(attr.clone())),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { intervals })
    }

    pub fn dims(&self) -> usize {
        self.intervals.len()
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Interval on dimension `dim`.
    ///
    /// # Panics
    ///
    /// Panics if `dim >= self.dims()`.
    pub fn interval(&self, dim: usize) -> Interval {
        self.intervals[dim]
    }

    /// Copy of `self` with dimension `dim` set to `interval`.
    ///
    /// # Panics
    ///
    /// Panics if `dim >= self.dims()`.
    pub fn replace(&self, dim: usize, interval: Interval) -> Self {
        let mut intervals = self.intervals.clone();
        intervals[dim] = interval;
        Self { intervals }
    }

    /// Whether the projection of `tuple` lies inside the box, where
    /// `positions[j]` is the box dimension of the tuple's `j`-th value.
    #[inline]
    pub fn contains_projection(&self, tuple: &[i64], positions: &[usize]) -> bool {
        positions
            .iter()
            .zip(tuple)
            .all(|(&dim, &v)| self.intervals[dim].contains(v))
    }

    /// Whether a full row (one value per dimension) lies inside the box.
    pub fn contains_row(&self, row: &[i64]) -> bool {
        row.len() == self.intervals.len()
            && self.intervals.iter().zip(row).all(|(iv, &v)| iv.contains(v))
    }

    /// Number of lattice points in the box, saturating at `u128::MAX`.
    pub fn volume(&self) -> u128 {
        self.intervals
            .iter()
            .fold(1u128, |acc, iv| acc.saturating_mul(iv.width()))
    }
}

impl fmt::Display for DomainBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, iv) in self.intervals.iter().enumerate() {
            if i > 0 {
                write!(f, " x ")?;
            }
            write!(f, "{iv}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::Relation;

    #[test]
    fn interval_rejects_inverted_bounds() {
        assert_eq!(
            Interval::new(5, 4),
            Err(SampleError::MalformedBox { lo: 5, hi: 4 })
        );
        assert!(Interval::new(4, 4).expect("point").is_point());
    }

    #[test]
    fn replace_is_copy_on_write() {
        let b = DomainBox::uniform(3, 1, 100).expect("box");
        let c = b.replace(1, Interval::point(7));
        assert_eq!(b.interval(1), Interval::new(1, 100).expect("iv"));
        assert_eq!(c.interval(1), Interval::point(7));
        assert_eq!(c.interval(0), b.interval(0));
    }

    #[test]
    fn covering_spans_data() {
        let r1 = Relation::new("R1", &["A", "B"], vec![vec![1, 2], vec![5, 6]]).expect("r1");
        let r2 = Relation::new("R2", &["B", "C"], vec![vec![0, 3], vec![4, 9]]).expect("r2");
        let q = Query::new(vec![r1, r2], vec![1.0, 1.0]).expect("query");
        let b = DomainBox::covering(&q).expect("covering");
        assert_eq!(b, DomainBox::from_bounds(&[(1, 5), (0, 6), (3, 9)]).expect("box"));
    }

    #[test]
    fn volume_counts_lattice_points() {
        let b = DomainBox::from_bounds(&[(1, 2), (0, 9)]).expect("box");
        assert_eq!(b.volume(), 20);
    }
}
