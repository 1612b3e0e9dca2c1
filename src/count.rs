//! Range counting: how many tuples of a relation project into a box.
//!
//! Two oracles return identical counts:
//! - [`LinearScan`]: scan every tuple, no state.
//! - [`SortedIndex`]: tuples pre-sorted on their first attribute; a binary
//!   search narrows to the matching run on that attribute before filtering
//!   the remaining ones.

use crate::domain::DomainBox;
use crate::error::{Result, SampleError};
use crate::relation::{Query, Relation};

/// Count the tuples of `relation` whose values lie in `region`, where
/// `region`'s dimensions are named by `box_attributes`.
pub fn count_in_box<S: AsRef<str>>(
    relation: &Relation,
    region: &DomainBox,
    box_attributes: &[S],
) -> Result<u64> {
    if region.dims() != box_attributes.len() {
        return Err(SampleError::DimensionMismatch {
            expected: box_attributes.len(),
            found: region.dims(),
        });
    }
    let positions = relation
        .attributes()
        .iter()
        .map(|attr| {
            box_attributes
                .iter()
                .position(|b| b.as_ref() == attr)
                .ok_or_else(|| SampleError::InvalidAttribute(attr.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(relation
        .tuples()
        .filter(|t| region.contains_projection(t, &positions))
        .count() as u64)
}

/// Pluggable range-count oracle over the relations of one query.
///
/// Implementations may assume `region` has one interval per query attribute;
/// [`crate::agm::AgmEvaluator`] checks this before calling in.
pub trait RangeCounter {
    /// Tuples of relation `relation` (an index into `query.relations()`) that
    /// lie inside `region`.
    fn count(&self, query: &Query, relation: usize, region: &DomainBox) -> u64;
}

/// Baseline oracle: linear scan per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearScan;

impl RangeCounter for LinearScan {
    fn count(&self, query: &Query, relation: usize, region: &DomainBox) -> u64 {
        query.tuples_within(relation, region).count() as u64
    }
}

/// Per-relation copy of the tuples sorted on the relation's first attribute.
///
/// Built for one query; counting against a different query is a logic error.
#[derive(Debug, Clone)]
pub struct SortedIndex {
    sorted: Vec<Vec<Vec<i64>>>,
}

impl SortedIndex {
    pub fn build(query: &Query) -> Self {
        let sorted = query
            .relations()
            .iter()
            .map(|relation| {
                let mut tuples: Vec<Vec<i64>> = relation.tuples().map(<[i64]>::to_vec).collect();
                tuples.sort_unstable();
                tuples
            })
            .collect();
        Self { sorted }
    }
}

impl RangeCounter for SortedIndex {
    fn count(&self, query: &Query, relation: usize, region: &DomainBox) -> u64 {
        let positions = query.positions(relation);
        let tuples = &self.sorted[relation];

        let first = region.interval(positions[0]);
        let start = tuples.partition_point(|t| t[0] < first.lo());
        let end = tuples.partition_point(|t| t[0] <= first.hi());

        tuples[start..end]
            .iter()
            .filter(|t| {
                positions[1..]
                    .iter()
                    .zip(&t[1..])
                    .all(|(&dim, &v)| region.interval(dim).contains(v))
            })
            .count() as u64
    }
}
