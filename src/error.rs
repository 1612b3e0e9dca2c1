//! Error type shared by every module.
//!
//! A rejected sampling trial is *not* an error: see [`crate::sampler::Trial`].

/// Errors surfaced by query construction, the oracles and the sampler.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SampleError {
    #[error("unknown attribute: {0}")]
    InvalidAttribute(String),

    #[error("malformed interval [{lo}, {hi}]: lo must be <= hi")]
    MalformedBox { lo: i64, hi: i64 },

    #[error("empty active domain for attribute {0}")]
    EmptyDomain(String),

    #[error("median of an empty order-statistics store")]
    EmptyStore,

    #[error("rank {k} out of range for {len} stored values")]
    OutOfRange { k: usize, len: usize },

    #[error("expected {expected} dimensions, got {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("relation {relation}: tuple has {found} values, schema has {expected}")]
    ArityMismatch {
        relation: String,
        expected: usize,
        found: usize,
    },

    #[error("relation {relation}: schema has no attributes")]
    EmptySchema { relation: String },

    #[error("relation {relation}: attribute {attribute} declared twice")]
    DuplicateAttribute { relation: String, attribute: String },

    #[error("invalid weight {weight} for relation {relation}")]
    InvalidWeight { relation: String, weight: f64 },

    #[error("weights do not cover attribute {0} (sum of weights < 1)")]
    NotEdgeCover(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<toml::de::Error> for SampleError {
    fn from(err: toml::de::Error) -> Self {
        SampleError::Config(err.to_string())
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SampleError>;
