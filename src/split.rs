//! Recursive box splitting.
//!
//! Splitting box `B` on dimension `i` with interval `[x, y]` picks a split
//! point `z` from the active domain of attribute `i` and produces
//!
//! ```text
//! left  = B[i := [x, z-1]]      (omitted when z == x)
//! mid   = B[i := [z, z]]        (split again on dimension i+1, unless last)
//! right = B[i := [z+1, y]]      (omitted when z == y)
//! ```
//!
//! `z` is the largest active-domain value whose left box has a bound of at
//! most half of `B`'s. Since the bound is monotone in the left box's upper
//! end and superadditive across the three pieces, the right box is then also
//! below half. Only the final all-point box of the midpoint chain can exceed
//! half, and a single point has a bound of at most one.
//!
//! The midpoint chain is unrolled into a loop: at most `2d + 1` boxes come
//! back for `d` dimensions.

use tracing::trace;

use crate::agm::AgmEvaluator;
use crate::count::{LinearScan, RangeCounter};
use crate::domain::{DomainBox, Interval};
use crate::error::{Result, SampleError};
use crate::median::MedianOracle;
use crate::relation::Query;

/// Splits boxes of one query.
#[derive(Debug, Clone, Copy)]
pub struct BoxSplitter<'a, C = LinearScan> {
    query: &'a Query,
    agm: &'a AgmEvaluator<C>,
    medians: MedianOracle,
}

impl<'a, C: RangeCounter> BoxSplitter<'a, C> {
    pub fn new(query: &'a Query, agm: &'a AgmEvaluator<C>) -> Self {
        Self {
            query,
            agm,
            medians: MedianOracle,
        }
    }

    /// Partition `region` starting at dimension `dim`.
    ///
    /// The returned boxes are pairwise disjoint, their union is `region`, and
    /// they are ordered left pieces first, then the midpoint box, then right
    /// pieces (innermost dimension first). A box with a zero bound comes back
    /// unsplit.
    pub fn split(&self, dim: usize, region: &DomainBox) -> Result<Vec<DomainBox>> {
        self.query.check_box(region)?;
        let dims = self.query.dims();
        if dim >= dims {
            return Err(SampleError::DimensionMismatch {
                expected: dims,
                found: dim + 1,
            });
        }

        let mut out = Vec::with_capacity(2 * (dims - dim) + 1);
        let mut rights = Vec::with_capacity(dims - dim);
        let mut mid = region.clone();

        for i in dim..dims {
            let total = self.agm.bound_unchecked(self.query, &mid);
            if total == 0.0 {
                trace!(dim = i, "zero bound, not splitting");
                break;
            }

            let iv = mid.interval(i);
            let z = self.split_point(i, &mid, total)?;
            trace!(dim = i, lo = iv.lo(), hi = iv.hi(), z, total, "split");

            if z > iv.lo() {
                out.push(mid.replace(i, Interval::new(iv.lo(), z - 1)?));
            }
            if z < iv.hi() {
                rights.push(mid.replace(i, Interval::new(z + 1, iv.hi())?));
            }
            mid = mid.replace(i, Interval::point(z));
        }

        out.push(mid);
        out.extend(rights.into_iter().rev());
        Ok(out)
    }

    /// Largest active-domain value `z` of dimension `dim` inside `region` with
    /// `bound(region[dim := [x, z-1]]) <= total / 2`.
    ///
    /// Bisects the active domain with median queries: a failing candidate
    /// lowers the working upper end to `z - 1`, a passing one raises the
    /// working lower end to `z + 1`.
    fn split_point(&self, dim: usize, region: &DomainBox, total: f64) -> Result<i64> {
        let half = total / 2.0;
        let x = region.interval(dim).lo();
        let (mut lo, mut hi) = (x, region.interval(dim).hi());
        let mut best = None;
        let mut probed = false;

        loop {
            let window = region.replace(dim, Interval::new(lo, hi)?);
            let Some(z) = self.medians.median_at(self.query, dim, &window) else {
                break;
            };
            probed = true;

            let left = if z > x {
                self.agm
                    .bound_unchecked(self.query, &region.replace(dim, Interval::new(x, z - 1)?))
            } else {
                0.0
            };
            trace!(dim, lo, hi, z, left, half, "split candidate");

            if left <= half {
                best = Some(z);
                if z == hi {
                    break;
                }
                lo = z + 1;
            } else {
                if z == lo {
                    break;
                }
                hi = z - 1;
            }
        }

        let attr = &self.query.attributes()[dim];
        match (best, probed) {
            (Some(z), _) => Ok(z),
            (None, false) => Err(SampleError::EmptyDomain(attr.clone())),
            // Only reachable with weights that leave `attr` uncovered.
            (None, true) => Err(SampleError::NotEdgeCover(attr.clone())),
        }
    }
}
