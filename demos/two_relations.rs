//! Theoretical vs empirical acceptance for small join queries.
//!
//! A trial accepts with probability `OUT / AGM`; accepted rows are uniform
//! over the join. Run with `RUST_LOG=joinsample=debug` to watch the descent.

use joinsample::{
    collect_samples, estimate_acceptance, BoundStrategy, DomainBox, Query, Relation, Sampler, SamplerConfig,
    TrialBudget,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

fn report(label: &str, sampler: &Sampler<'_>, trials: u64, rng: &mut ChaCha8Rng) -> Result<(), Box<dyn std::error::Error>> {
    let p = sampler.expected_acceptance()?;
    let estimate = estimate_acceptance(sampler, trials, rng)?;
    println!("{label}:");
    println!("  domain:               {}", sampler.domain());
    println!("  AGM bound:            {}", sampler.domain_bound());
    println!("  theoretical accept:   {p:.4}");
    println!(
        "  empirical accept:     {:.4}  ({} / {} trials, se {:.4})",
        estimate.rate(),
        estimate.accepted,
        estimate.trials,
        estimate.std_error(p)
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    // R1(A, B) ⋈ R2(B, C), domain from configuration.
    let r1 = Relation::new("R1", &["A", "B"], vec![vec![1, 2], vec![3, 4], vec![5, 6]])?;
    let r2 = Relation::new("R2", &["B", "C"], vec![vec![2, 3], vec![4, 5], vec![6, 7]])?;
    let q2 = Query::new(vec![r1, r2], vec![1.0, 1.0])?;

    let cfg = SamplerConfig::from_toml_str(
        r#"
        seed = 7
        [domain]
        A = [1, 100]
        B = [1, 100]
        C = [1, 100]
        "#,
    )?;
    let mut rng = cfg.rng();
    report("two relations", &cfg.sampler(&q2)?, 1000, &mut rng)?;

    // R3(A, B) ⋈ R4(B, C) ⋈ R5(C, D), domain covering the data.
    let r3 = Relation::new("R3", &["A", "B"], vec![vec![1, 7], vec![2, 8], vec![3, 9], vec![4, 10]])?;
    let r4 = Relation::new("R4", &["B", "C"], vec![vec![7, 11], vec![8, 12], vec![9, 13], vec![10, 14]])?;
    let r5 = Relation::new("R5", &["C", "D"], vec![vec![11, 15], vec![12, 16], vec![13, 17], vec![14, 18]])?;
    let q3 = Query::new(vec![r3, r4, r5], vec![1.5, 1.0, 1.5])?;

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let unweighted = Sampler::new(&q3, DomainBox::covering(&q3)?)?;
    report("three relations (unweighted)", &unweighted, 1000, &mut rng)?;
    let weighted = Sampler::with_strategy(&q3, DomainBox::covering(&q3)?, BoundStrategy::Weighted)?;
    report("three relations (weighted)", &weighted, 1000, &mut rng)?;

    let run = collect_samples(&unweighted, 10, TrialBudget::trials(10_000), &mut rng)?;
    println!();
    println!("{} samples in {} trials:", run.samples.len(), run.trials);
    for s in &run.samples {
        println!("  {:?} = {:?}", s.attributes, s.values);
    }

    Ok(())
}
