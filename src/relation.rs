//! Relations, queries, and the brute-force natural join used at the leaves of
//! the sampler and as a reference in tests.

use std::collections::{HashMap, HashSet};

use crate::domain::DomainBox;
use crate::error::{Result, SampleError};

/// A named relation over integer attributes, with set semantics.
///
/// Tuples are stored row-major in one flat buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    name: String,
    attributes: Vec<String>,
    values: Vec<i64>,
}

impl Relation {
    /// Build a relation, collapsing duplicate tuples (first occurrence wins).
    pub fn new<S: AsRef<str>>(name: &str, attributes: &[S], tuples: Vec<Vec<i64>>) -> Result<Self> {
        let attributes: Vec<String> = attributes.iter().map(|a| a.as_ref().to_string()).collect();
        if attributes.is_empty() {
            return Err(SampleError::EmptySchema {
                relation: name.to_string(),
            });
        }
        let mut seen_attrs = HashSet::with_capacity(attributes.len());
        for attr in &attributes {
            if !seen_attrs.insert(attr.as_str()) {
                return Err(SampleError::DuplicateAttribute {
                    relation: name.to_string(),
                    attribute: attr.clone(),
                });
            }
        }

        let arity = attributes.len();
        let mut seen = HashSet::with_capacity(tuples.len());
        let mut values = Vec::with_capacity(tuples.len() * arity);
        for tuple in tuples {
            if tuple.len() != arity {
                return Err(SampleError::ArityMismatch {
                    relation: name.to_string(),
                    expected: arity,
                    found: tuple.len(),
                });
            }
            if seen.contains(&tuple) {
                continue;
            }
            values.extend_from_slice(&tuple);
            seen.insert(tuple);
        }

        Ok(Self {
            name: name.to_string(),
            attributes,
            values,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn arity(&self) -> usize {
        self.attributes.len()
    }

    /// Number of (distinct) tuples.
    pub fn len(&self) -> usize {
        self.values.len() / self.arity()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn attribute_index(&self, attr: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a == attr)
    }

    /// Iterate tuples in insertion order.
    pub fn tuples(&self) -> std::slice::ChunksExact<'_, i64> {
        self.values.chunks_exact(self.arity())
    }
}

/// A natural-join query: relations, the attribute universe, and one
/// fractional edge-cover weight per relation.
#[derive(Debug, Clone)]
pub struct Query {
    relations: Vec<Relation>,
    attributes: Vec<String>,
    weights: Vec<f64>,
    // positions[r][j]: box dimension of relation r's j-th attribute
    positions: Vec<Vec<usize>>,
}

impl Query {
    /// Build a query whose attribute universe is the union of the relations'
    /// attributes, in order of first appearance.
    pub fn new(relations: Vec<Relation>, weights: Vec<f64>) -> Result<Self> {
        let mut attributes: Vec<String> = Vec::new();
        for relation in &relations {
            for attr in relation.attributes() {
                if !attributes.contains(attr) {
                    attributes.push(attr.clone());
                }
            }
        }
        Self::with_attributes(relations, attributes, weights)
    }

    /// Build a query with an explicit attribute order.
    ///
    /// `attributes` must be exactly the union of the relations' attributes.
    pub fn with_attributes<S: AsRef<str>>(
        relations: Vec<Relation>,
        attributes: impl IntoIterator<Item = S>,
        weights: Vec<f64>,
    ) -> Result<Self> {
        let attributes: Vec<String> = attributes
            .into_iter()
            .map(|a| a.as_ref().to_string())
            .collect();

        if weights.len() != relations.len() {
            return Err(SampleError::DimensionMismatch {
                expected: relations.len(),
                found: weights.len(),
            });
        }
        for (relation, &weight) in relations.iter().zip(&weights) {
            if !weight.is_finite() || weight < 0.0 {
                return Err(SampleError::InvalidWeight {
                    relation: relation.name().to_string(),
                    weight,
                });
            }
        }

        let index: HashMap<&str, usize> = attributes
            .iter()
            .enumerate()
            .map(|(i, a)| (a.as_str(), i))
            .collect();
        if index.len() != attributes.len() {
            let dup = attributes
                .iter()
                .enumerate()
                .find(|(i, a)| index.get(a.as_str()) != Some(i))
                .map(|(_, a)| a.clone())
                .unwrap_or_default();
            return Err(SampleError::DuplicateAttribute {
                relation: "<query>".to_string(),
                attribute: dup,
            });
        }

        let mut used = vec![false; attributes.len()];
        let mut positions = Vec::with_capacity(relations.len());
        for relation in &relations {
            let mut pos = Vec::with_capacity(relation.arity());
            for attr in relation.attributes() {
                let dim = *index
                    .get(attr.as_str())
                    .ok_or_else(|| SampleError::InvalidAttribute(attr.clone()))?;
                used[dim] = true;
                pos.push(dim);
            }
            positions.push(pos);
        }
        if let Some(dim) = used.iter().position(|u| !u) {
            return Err(SampleError::InvalidAttribute(attributes[dim].clone()));
        }

        Ok(Self {
            relations,
            attributes,
            weights,
            positions,
        })
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// The attribute universe (`box_attributes`).
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn dims(&self) -> usize {
        self.attributes.len()
    }

    /// Box dimensions of relation `r`'s attributes, in schema order.
    pub fn positions(&self, r: usize) -> &[usize] {
        &self.positions[r]
    }

    pub fn attribute_dim(&self, attr: &str) -> Result<usize> {
        self.attributes
            .iter()
            .position(|a| a == attr)
            .ok_or_else(|| SampleError::InvalidAttribute(attr.to_string()))
    }

    /// Fail unless `region` has one interval per query attribute.
    pub fn check_box(&self, region: &DomainBox) -> Result<()> {
        if region.dims() != self.dims() {
            return Err(SampleError::DimensionMismatch {
                expected: self.dims(),
                found: region.dims(),
            });
        }
        Ok(())
    }

    /// Tuples of relation `r` inside `region`.
    pub fn tuples_within<'a>(
        &'a self,
        r: usize,
        region: &'a DomainBox,
    ) -> impl Iterator<Item = &'a [i64]> + 'a {
        let positions = &self.positions[r];
        self.relations[r]
            .tuples()
            .filter(move |t| region.contains_projection(t, positions))
    }

    /// Whether the weights form a fractional edge cover; returns the first
    /// uncovered attribute otherwise.
    pub fn uncovered_attribute(&self) -> Option<&str> {
        let mut cover = vec![0.0f64; self.dims()];
        for (pos, &w) in self.positions.iter().zip(&self.weights) {
            for &dim in pos {
                cover[dim] += w;
            }
        }
        // tolerate rounding in weights like 1/3 + 2/3
        cover
            .iter()
            .position(|&c| c < 1.0 - 1e-9)
            .map(|dim| self.attributes[dim].as_str())
    }

    /// Every row of the natural join whose attribute values lie in `region`,
    /// in `box_attributes` order.
    ///
    /// Relations are joined left to right, each against the partial rows
    /// built so far, probing on the attributes already bound.
    pub fn join_within(&self, region: &DomainBox) -> Result<Vec<Vec<i64>>> {
        self.check_box(region)?;

        let dims = self.dims();
        let mut bound = vec![false; dims];
        let mut rows: Vec<Vec<i64>> = vec![vec![0; dims]];

        for r in 0..self.relations.len() {
            let positions = &self.positions[r];
            let shared: Vec<usize> = (0..positions.len()).filter(|&j| bound[positions[j]]).collect();

            let mut probe: HashMap<Vec<i64>, Vec<&[i64]>> = HashMap::new();
            for t in self.tuples_within(r, region) {
                let key = shared.iter().map(|&j| t[j]).collect();
                probe.entry(key).or_default().push(t);
            }

            let mut next = Vec::new();
            for row in &rows {
                let key: Vec<i64> = shared.iter().map(|&j| row[positions[j]]).collect();
                if let Some(matches) = probe.get(&key) {
                    for t in matches {
                        let mut out = row.clone();
                        for (&dim, &v) in positions.iter().zip(t.iter()) {
                            out[dim] = v;
                        }
                        next.push(out);
                    }
                }
            }
            rows = next;
            if rows.is_empty() {
                break;
            }
            for &dim in positions {
                bound[dim] = true;
            }
        }

        if self.relations.is_empty() {
            rows.clear();
        }
        Ok(rows)
    }
}
