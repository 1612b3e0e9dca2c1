//! Uniform join sampling by randomized descent through box splits.
//!
//! One trial:
//!
//! 1. Start from the domain box `B`.
//! 2. While `bound(B) >= 2`: split `B` into children `C_1..C_m`, pick `C_j`
//!    with probability `bound(C_j) / bound(B)` and reject with the leftover
//!    probability `1 - Σ bound(C_j) / bound(B)`.
//! 3. Join the relations restricted to the final box; reject if empty.
//! 4. Accept with probability `1 / bound(B)`.
//!
//! The descent probabilities telescope, so every join row inside the domain is
//! returned with probability exactly `1 / bound(domain)`. A trial therefore
//! accepts with probability `OUT / AGM`, and accepted rows are uniform.
//!
//! Notes:
//! - `*_with_rng` entrypoints take the random source explicitly. Parallel
//!   callers should give each worker its own generator.

use rand::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::agm::{AgmEvaluator, BoundStrategy};
use crate::count::{LinearScan, RangeCounter};
use crate::domain::DomainBox;
use crate::error::Result;
use crate::relation::Query;
use crate::split::BoxSplitter;

/// One sampled join row, values in the query's attribute order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SampledRow {
    pub attributes: Vec<String>,
    pub values: Vec<i64>,
}

impl SampledRow {
    /// Value of `attr`, if it is one of the row's attributes.
    pub fn get(&self, attr: &str) -> Option<i64> {
        self.attributes
            .iter()
            .position(|a| a == attr)
            .map(|i| self.values[i])
    }
}

/// Why a trial produced no row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The descent drew the leftover ("null") branch.
    NullBranch,
    /// The final box contains no join row.
    EmptySubJoin,
    /// The final `1 / bound` coin came up tails.
    CoinFlip,
}

/// Outcome of one sampling trial. Rejection is an expected outcome, not an
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trial {
    Accepted(SampledRow),
    Rejected(Rejection),
}

impl Trial {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Trial::Accepted(_))
    }

    pub fn accepted(self) -> Option<SampledRow> {
        match self {
            Trial::Accepted(row) => Some(row),
            Trial::Rejected(_) => None,
        }
    }
}

/// Uniform sampler over the join of one query, restricted to a domain box.
///
/// Holds only shared references to immutable data.
#[derive(Debug, Clone)]
pub struct Sampler<'q, C = LinearScan> {
    query: &'q Query,
    domain: DomainBox,
    agm: AgmEvaluator<C>,
}

impl<'q> Sampler<'q, LinearScan> {
    /// Sampler with the unweighted bound and the linear-scan count oracle.
    pub fn new(query: &'q Query, domain: DomainBox) -> Result<Self> {
        Self::with_evaluator(query, domain, AgmEvaluator::new(BoundStrategy::Unweighted))
    }

    /// Sampler with the linear-scan count oracle and the given bound.
    pub fn with_strategy(query: &'q Query, domain: DomainBox, strategy: BoundStrategy) -> Result<Self> {
        Self::with_evaluator(query, domain, AgmEvaluator::new(strategy))
    }
}

impl<'q, C: RangeCounter> Sampler<'q, C> {
    /// Sampler with a caller-built evaluator (e.g. backed by
    /// [`crate::count::SortedIndex`]).
    pub fn with_evaluator(query: &'q Query, domain: DomainBox, agm: AgmEvaluator<C>) -> Result<Self> {
        query.check_box(&domain)?;
        agm.strategy().validate(query)?;
        Ok(Self { query, domain, agm })
    }

    pub fn query(&self) -> &'q Query {
        self.query
    }

    pub fn domain(&self) -> &DomainBox {
        &self.domain
    }

    pub fn evaluator(&self) -> &AgmEvaluator<C> {
        &self.agm
    }

    /// Bound of the whole domain; a trial accepts with probability
    /// `OUT / domain_bound()`.
    pub fn domain_bound(&self) -> f64 {
        self.agm.bound_unchecked(self.query, &self.domain)
    }

    /// Exact acceptance probability, `OUT / AGM`, from a full join.
    ///
    /// Materializes the join; meant for tests and small inputs.
    pub fn expected_acceptance(&self) -> Result<f64> {
        let bound = self.domain_bound();
        if bound == 0.0 {
            return Ok(0.0);
        }
        let out = self.query.join_within(&self.domain)?.len();
        Ok(out as f64 / bound)
    }

    /// Run one trial with the thread-local RNG.
    pub fn sample(&self) -> Result<Trial> {
        let mut rng = rand::rng();
        self.sample_with_rng(&mut rng)
    }

    /// Run one trial with a caller-supplied RNG.
    pub fn sample_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Trial> {
        let splitter = BoxSplitter::new(self.query, &self.agm);
        let mut current = self.domain.clone();
        let mut bound = self.domain_bound();
        let mut depth = 0usize;

        // Descending
        while bound >= 2.0 {
            let children = splitter.split(0, &current)?;
            let u = rng.random::<f64>() * bound;

            let mut acc = 0.0;
            let mut chosen = None;
            for child in children {
                let child_bound = self.agm.bound_unchecked(self.query, &child);
                acc += child_bound;
                if u < acc {
                    chosen = Some((child, child_bound));
                    break;
                }
            }

            let Some((child, child_bound)) = chosen else {
                debug!(depth, bound, "rejected: null branch");
                return Ok(Trial::Rejected(Rejection::NullBranch));
            };
            current = child;
            bound = child_bound;
            depth += 1;
        }

        let rows = self.query.join_within(&current)?;
        let Some(values) = rows.into_iter().next() else {
            debug!(depth, bound, "rejected: empty sub-join");
            return Ok(Trial::Rejected(Rejection::EmptySubJoin));
        };

        if rng.random::<f64>() >= 1.0 / bound {
            debug!(depth, bound, "rejected: coin flip");
            return Ok(Trial::Rejected(Rejection::CoinFlip));
        }

        debug!(depth, ?values, "accepted");
        Ok(Trial::Accepted(SampledRow {
            attributes: self.query.attributes().to_vec(),
            values,
        }))
    }
}
