//! Median of an attribute's active domain inside a box.

use std::collections::HashSet;

use crate::domain::DomainBox;
use crate::error::{Result, SampleError};
use crate::order_stat::OrderStatisticStore;
use crate::relation::Query;

/// Distinct values of dimension `dim` over the tuples inside `region`, across
/// every relation that has the attribute.
pub fn active_domain(query: &Query, dim: usize, region: &DomainBox) -> HashSet<i64> {
    let mut domain = HashSet::new();
    for r in 0..query.relations().len() {
        let Some(j) = query.positions(r).iter().position(|&d| d == dim) else {
            continue;
        };
        domain.extend(query.tuples_within(r, region).map(|t| t[j]));
    }
    domain
}

/// Median oracle. Stateless; a fresh [`OrderStatisticStore`] backs every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct MedianOracle;

impl MedianOracle {
    /// Median (see [`OrderStatisticStore::median`]) of `attribute`'s active
    /// domain inside `region`.
    ///
    /// An attribute outside the query's universe is
    /// [`SampleError::InvalidAttribute`]; a known attribute with no values in
    /// `region` is [`SampleError::EmptyDomain`].
    pub fn median(&self, query: &Query, attribute: &str, region: &DomainBox) -> Result<i64> {
        let dim = query.attribute_dim(attribute)?;
        query.check_box(region)?;
        self.median_at(query, dim, region)
            .ok_or_else(|| SampleError::EmptyDomain(attribute.to_string()))
    }

    /// Median by dimension index; `None` for an empty active domain.
    pub(crate) fn median_at(&self, query: &Query, dim: usize, region: &DomainBox) -> Option<i64> {
        let store: OrderStatisticStore = active_domain(query, dim, region).into_iter().collect();
        store.median().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::Relation;

    fn fixture() -> Query {
        let r1 = Relation::new("R1", &["A", "B"], vec![vec![1, 2], vec![3, 4], vec![5, 6]]).expect("r1");
        let r2 = Relation::new("R2", &["B", "C"], vec![vec![2, 3], vec![4, 5], vec![6, 7]]).expect("r2");
        Query::new(vec![r1, r2], vec![1.0, 1.0]).expect("query")
    }

    #[test]
    fn median_over_active_domain() {
        let q = fixture();
        let region = DomainBox::from_bounds(&[(1, 5), (2, 6), (3, 7)]).expect("box");
        assert_eq!(MedianOracle.median(&q, "A", &region), Ok(3));
        assert_eq!(MedianOracle.median(&q, "B", &region), Ok(4));
        assert_eq!(MedianOracle.median(&q, "C", &region), Ok(5));
    }

    #[test]
    fn duplicates_collapse() {
        // B = 2 appears in both relations but counts once.
        let q = fixture();
        let region = DomainBox::from_bounds(&[(1, 3), (1, 100), (1, 100)]).expect("box");
        let domain = active_domain(&q, 1, &region);
        assert_eq!(domain, HashSet::from([2, 4, 6]));
        assert_eq!(MedianOracle.median(&q, "B", &region), Ok(4));
    }

    #[test]
    fn even_domain_takes_upper_median() {
        let q = fixture();
        // active domain of A is {1, 3}
        let region = DomainBox::from_bounds(&[(1, 3), (1, 100), (1, 100)]).expect("box");
        assert_eq!(MedianOracle.median(&q, "A", &region), Ok(3));
    }

    #[test]
    fn empty_and_unknown() {
        let q = fixture();
        let region = DomainBox::from_bounds(&[(50, 60), (1, 100), (1, 100)]).expect("box");
        assert_eq!(
            MedianOracle.median(&q, "A", &region),
            Err(SampleError::EmptyDomain("A".into()))
        );
        assert_eq!(
            MedianOracle.median(&q, "Z", &region),
            Err(SampleError::InvalidAttribute("Z".into()))
        );
    }
}
