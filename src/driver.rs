//! Repeated trials: the caller-side retry policy around [`Sampler`].
//!
//! The sampler itself never retries. These helpers run trials until enough
//! rows are accepted, optionally capped by a trial budget, and estimate the
//! acceptance rate.

use rand::prelude::*;
use tracing::debug;

use crate::count::RangeCounter;
use crate::error::Result;
use crate::sampler::{Sampler, SampledRow, Trial};

/// Upper limit on the number of trials a run may spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrialBudget {
    pub max_trials: Option<u64>,
}

impl TrialBudget {
    pub fn unlimited() -> Self {
        Self { max_trials: None }
    }

    pub fn trials(max_trials: u64) -> Self {
        Self {
            max_trials: Some(max_trials),
        }
    }

    fn allows(&self, spent: u64) -> bool {
        self.max_trials.map_or(true, |max| spent < max)
    }
}

/// Result of [`collect_samples`].
#[derive(Debug, Clone, Default)]
pub struct SampleRun {
    pub samples: Vec<SampledRow>,
    pub trials: u64,
    /// The budget ran out before the target was reached.
    pub exhausted: bool,
}

/// Run trials until `target` rows are accepted or `budget` is spent.
///
/// With an unlimited budget and an empty join this never returns; pass a
/// budget unless the join is known to be non-empty.
pub fn collect_samples<C, R>(
    sampler: &Sampler<'_, C>,
    target: usize,
    budget: TrialBudget,
    rng: &mut R,
) -> Result<SampleRun>
where
    C: RangeCounter,
    R: Rng + ?Sized,
{
    let mut run = SampleRun {
        samples: Vec::with_capacity(target),
        ..SampleRun::default()
    };

    while run.samples.len() < target {
        if !budget.allows(run.trials) {
            run.exhausted = true;
            debug!(trials = run.trials, accepted = run.samples.len(), "trial budget exhausted");
            break;
        }
        run.trials += 1;
        if let Trial::Accepted(row) = sampler.sample_with_rng(rng)? {
            run.samples.push(row);
            debug!(accepted = run.samples.len(), target, trials = run.trials, "sample accepted");
        }
    }

    Ok(run)
}

/// Empirical acceptance over a fixed number of trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AcceptanceEstimate {
    pub accepted: u64,
    pub trials: u64,
}

impl AcceptanceEstimate {
    /// Fraction of accepted trials (0 when no trials ran).
    pub fn rate(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.accepted as f64 / self.trials as f64
    }

    /// Binomial standard error of the rate if the true probability is `p`.
    pub fn std_error(&self, p: f64) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        (p * (1.0 - p) / self.trials as f64).sqrt()
    }

    /// Whether the rate is within `k` standard errors of `p`.
    pub fn within_sigmas(&self, p: f64, k: f64) -> bool {
        (self.rate() - p).abs() <= k * self.std_error(p)
    }
}

/// Run `trials` independent trials and count acceptances.
pub fn estimate_acceptance<C, R>(
    sampler: &Sampler<'_, C>,
    trials: u64,
    rng: &mut R,
) -> Result<AcceptanceEstimate>
where
    C: RangeCounter,
    R: Rng + ?Sized,
{
    let mut estimate = AcceptanceEstimate {
        accepted: 0,
        trials,
    };
    for _ in 0..trials {
        if sampler.sample_with_rng(rng)?.is_accepted() {
            estimate.accepted += 1;
        }
    }
    Ok(estimate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainBox;
    use crate::relation::{Query, Relation};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn chain() -> Query {
        let r3 = Relation::new("R3", &["A", "B"], vec![vec![1, 7], vec![2, 8], vec![3, 9], vec![4, 10]]).expect("r3");
        let r4 = Relation::new("R4", &["B", "C"], vec![vec![7, 11], vec![8, 12], vec![9, 13], vec![10, 14]]).expect("r4");
        let r5 = Relation::new("R5", &["C", "D"], vec![vec![11, 15], vec![12, 16], vec![13, 17], vec![14, 18]]).expect("r5");
        Query::new(vec![r3, r4, r5], vec![1.5, 1.0, 1.5]).expect("query")
    }

    #[test]
    fn collects_target_samples() {
        let q = chain();
        let sampler = Sampler::new(&q, DomainBox::uniform(4, 0, 20).expect("box")).expect("sampler");
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let run = collect_samples(&sampler, 20, TrialBudget::unlimited(), &mut rng).expect("run");
        assert_eq!(run.samples.len(), 20);
        assert!(!run.exhausted);
        assert!(run.trials >= 20);
        let join = q.join_within(sampler.domain()).expect("join");
        assert!(run.samples.iter().all(|s| join.contains(&s.values)));
    }

    #[test]
    fn budget_stops_empty_join() {
        let r1 = Relation::new("R1", &["A", "B"], vec![vec![1, 2]]).expect("r1");
        let r2 = Relation::new("R2", &["B", "C"], vec![vec![3, 4]]).expect("r2");
        let q = Query::new(vec![r1, r2], vec![1.0, 1.0]).expect("query");
        let sampler = Sampler::new(&q, DomainBox::uniform(3, 0, 10).expect("box")).expect("sampler");
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let run = collect_samples(&sampler, 1, TrialBudget::trials(50), &mut rng).expect("run");
        assert!(run.samples.is_empty());
        assert_eq!(run.trials, 50);
        assert!(run.exhausted);
    }

    #[test]
    fn estimate_helpers() {
        let e = AcceptanceEstimate {
            accepted: 25,
            trials: 100,
        };
        assert_eq!(e.rate(), 0.25);
        assert!((e.std_error(0.25) - (0.25f64 * 0.75 / 100.0).sqrt()).abs() < 1e-12);
        assert!(e.within_sigmas(0.3, 3.0));
        assert!(!e.within_sigmas(0.9, 3.0));
        assert_eq!(AcceptanceEstimate::default().rate(), 0.0);
    }
}
