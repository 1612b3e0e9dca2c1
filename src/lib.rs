//! `joinsample`: uniform sampling from natural joins without computing them.
//!
//! Given relations joined on shared attribute names, draws join rows
//! uniformly at random in time governed by the AGM bound rather than by the
//! join size. Each trial descends through recursive box splits of the
//! attribute domain and ends in a rejection test; accepted rows are uniform
//! over the join and a trial accepts with probability `OUT / AGM`.
//!
//! Exposed modules:
//! - `relation`: relations, queries, and a brute-force natural join.
//! - `domain`: intervals and boxes over the attribute universe.
//! - `order_stat`: balanced order-statistics tree (median queries).
//! - `count`: range-count oracles (linear scan, sorted index).
//! - `agm`: AGM-style bounds on boxes (unweighted / weighted).
//! - `median`: active-domain median oracle.
//! - `split`: recursive box splitting.
//! - `sampler`: one sampling trial.
//! - `driver`: retry loops and acceptance estimates on top of the sampler.
//! - `config`: TOML configuration (domain bounds, strategy, seed, budget).

#![forbid(unsafe_code)]

pub mod agm;
pub mod config;
pub mod count;
pub mod domain;
pub mod driver;
pub mod error;
pub mod median;
pub mod order_stat;
pub mod relation;
pub mod sampler;
pub mod split;

pub use agm::{AgmEvaluator, BoundStrategy};
pub use config::SamplerConfig;
pub use count::{count_in_box, LinearScan, RangeCounter, SortedIndex};
pub use domain::{DomainBox, Interval};
pub use driver::{collect_samples, estimate_acceptance, AcceptanceEstimate, SampleRun, TrialBudget};
pub use error::{Result, SampleError};
pub use median::MedianOracle;
pub use order_stat::OrderStatisticStore;
pub use relation::{Query, Relation};
pub use sampler::{Rejection, SampledRow, Sampler, Trial};
pub use split::BoxSplitter;
