//! AGM-style output-size bounds restricted to a box.
//!
//! For a box `B`, the bound is a product over the query's relations of the
//! number of tuples inside `B`:
//!
//! - [`BoundStrategy::Unweighted`]: \( \prod_R |R \cap B| \)
//! - [`BoundStrategy::Weighted`]: \( \prod_R |R \cap B|^{w_R} \), the AGM bound
//!   for a fractional edge cover `w`.
//!
//! Both upper-bound the number of join rows inside `B`, and both are
//! superadditive under splitting one attribute's interval, which is what makes
//! the sampler's descent probabilities sum to at most one.

use serde::Deserialize;

use crate::count::{LinearScan, RangeCounter};
use crate::domain::DomainBox;
use crate::error::{Result, SampleError};
use crate::relation::Query;

/// How per-relation counts combine into a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundStrategy {
    /// Plain product of counts; the query's weights are ignored.
    #[default]
    Unweighted,
    /// Each count raised to its relation's weight.
    Weighted,
}

impl BoundStrategy {
    /// Check that this strategy can be used with `query`.
    ///
    /// The weighted bound is only an upper bound when the weights cover every
    /// attribute.
    pub fn validate(&self, query: &Query) -> Result<()> {
        match self {
            BoundStrategy::Unweighted => Ok(()),
            BoundStrategy::Weighted => match query.uncovered_attribute() {
                Some(attr) => Err(SampleError::NotEdgeCover(attr.to_string())),
                None => Ok(()),
            },
        }
    }
}

/// Evaluates the bound of a query on arbitrary boxes.
///
/// Nothing is cached: every call recounts.
#[derive(Debug, Clone, Default)]
pub struct AgmEvaluator<C = LinearScan> {
    counter: C,
    strategy: BoundStrategy,
}

impl AgmEvaluator<LinearScan> {
    pub fn new(strategy: BoundStrategy) -> Self {
        Self {
            counter: LinearScan,
            strategy,
        }
    }
}

impl<C: RangeCounter> AgmEvaluator<C> {
    pub fn with_counter(counter: C, strategy: BoundStrategy) -> Self {
        Self { counter, strategy }
    }

    pub fn strategy(&self) -> BoundStrategy {
        self.strategy
    }

    pub fn counter(&self) -> &C {
        &self.counter
    }

    /// Bound on the number of join rows of `query` inside `region`.
    pub fn bound(&self, query: &Query, region: &DomainBox) -> Result<f64> {
        query.check_box(region)?;
        Ok(self.bound_unchecked(query, region))
    }

    /// [`Self::bound`] for a box already known to match the query.
    pub(crate) fn bound_unchecked(&self, query: &Query, region: &DomainBox) -> f64 {
        let mut bound = 1.0f64;
        for (r, &weight) in query.weights().iter().enumerate() {
            let count = self.counter.count(query, r, region) as f64;
            let factor = match self.strategy {
                BoundStrategy::Unweighted => count,
                BoundStrategy::Weighted => count.powf(weight),
            };
            bound *= factor;
            if bound == 0.0 {
                break;
            }
        }
        bound
    }
}
