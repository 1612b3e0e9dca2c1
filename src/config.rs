//! Sampler configuration.
//!
//! The domain box is part of the configuration: it depends on the data's value
//! range, so it is never baked into the sampler.
//!
//! ```toml
//! bound = "unweighted"   # or "weighted"
//! seed = 42              # optional; random when absent
//! max_trials = 100000    # optional
//!
//! [domain]
//! A = [1, 100]
//! B = [1, 100]
//! ```

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use crate::agm::BoundStrategy;
use crate::domain::{DomainBox, Interval};
use crate::driver::TrialBudget;
use crate::error::{Result, SampleError};
use crate::relation::Query;
use crate::sampler::Sampler;

/// Everything a run needs besides the relations themselves.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SamplerConfig {
    /// Attribute name to inclusive `[lo, hi]` bounds.
    #[serde(default)]
    pub domain: BTreeMap<String, [i64; 2]>,
    #[serde(default)]
    pub bound: BoundStrategy,
    pub seed: Option<u64>,
    pub max_trials: Option<u64>,
}

impl SamplerConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Domain box in `query`'s attribute order.
    ///
    /// Every query attribute needs an entry, and every entry must name a query
    /// attribute.
    pub fn domain_box(&self, query: &Query) -> Result<DomainBox> {
        if let Some(unknown) = self
            .domain
            .keys()
            .find(|k| !query.attributes().contains(*k))
        {
            return Err(SampleError::InvalidAttribute(unknown.clone()));
        }

        let intervals = query
            .attributes()
            .iter()
            .map(|attr| {
                let [lo, hi] = self
                    .domain
                    .get(attr)
                    .ok_or_else(|| SampleError::InvalidAttribute(attr.clone()))?;
                Interval::new(*lo, *hi)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(DomainBox::new(intervals))
    }

    pub fn budget(&self) -> TrialBudget {
        TrialBudget {
            max_trials: self.max_trials,
        }
    }

    /// Seeded generator when `seed` is set, seeded from the thread RNG otherwise.
    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }

    /// Build a sampler for `query` from this configuration.
    pub fn sampler<'q>(&self, query: &'q Query) -> Result<Sampler<'q>> {
        Sampler::with_strategy(query, self.domain_box(query)?, self.bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::Relation;
    use rand::Rng;

    fn fixture() -> Query {
        let r1 = Relation::new("R1", &["A", "B"], vec![vec![1, 2], vec![3, 4], vec![5, 6]]).expect("r1");
        let r2 = Relation::new("R2", &["B", "C"], vec![vec![2, 3], vec![4, 5], vec![6, 7]]).expect("r2");
        Query::new(vec![r1, r2], vec![1.0, 1.0]).expect("query")
    }

    #[test]
    fn parses_full_config() {
        let cfg = SamplerConfig::from_toml_str(
            r#"
            bound = "weighted"
            seed = 9
            max_trials = 500

            [domain]
            C = [3, 7]
            A = [1, 5]
            B = [2, 6]
            "#,
        )
        .expect("config");

        assert_eq!(cfg.bound, BoundStrategy::Weighted);
        assert_eq!(cfg.budget(), TrialBudget::trials(500));
        let q = fixture();
        assert_eq!(
            cfg.domain_box(&q),
            DomainBox::from_bounds(&[(1, 5), (2, 6), (3, 7)])
        );
        let sampler = cfg.sampler(&q).expect("sampler");
        assert_eq!(sampler.domain_bound(), 9.0);
    }

    #[test]
    fn seed_makes_rng_reproducible() {
        let cfg = SamplerConfig {
            seed: Some(5),
            ..SamplerConfig::default()
        };
        let a: u64 = cfg.rng().random();
        let b: u64 = cfg.rng().random();
        assert_eq!(a, b);
    }

    #[test]
    fn domain_errors() {
        let q = fixture();
        let missing = SamplerConfig::from_toml_str("[domain]\nA = [1, 5]\nB = [1, 5]").expect("config");
        assert_eq!(missing.domain_box(&q), Err(SampleError::InvalidAttribute("C".into())));

        let extra = SamplerConfig::from_toml_str("[domain]\nA = [1, 5]\nB = [1, 5]\nC = [1, 5]\nZ = [0, 1]")
            .expect("config");
        assert_eq!(extra.domain_box(&q), Err(SampleError::InvalidAttribute("Z".into())));

        let inverted = SamplerConfig::from_toml_str("[domain]\nA = [5, 1]\nB = [1, 5]\nC = [1, 5]").expect("config");
        assert_eq!(inverted.domain_box(&q), Err(SampleError::MalformedBox { lo: 5, hi: 1 }));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = SamplerConfig::from_toml_str("bogus = 1").expect_err("unknown key");
        assert!(matches!(err, SampleError::Config(_)));
        let err = SamplerConfig::from_toml_str("bound = \"cubic\"").expect_err("bad strategy");
        assert!(matches!(err, SampleError::Config(_)));
    }
}
