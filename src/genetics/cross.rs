//! Cross operator — the full offspring distribution of two parents
//!
//! Each locus mixes independently following Mendelian inheritance; the
//! offspring distribution is the product of the per-locus distributions.

use super::genotype::Genotype;
use super::species::MAX_LOCI;

/// Outcomes of mixing two parent gene values at one locus.
///
/// Symmetric in its arguments; each outcome list has distinct child values
/// and sums to 1.
pub fn mix(a: u8, b: u8) -> &'static [(u8, f64)] {
    match (a.min(b), a.max(b)) {
        (0, 0) => &[(0, 1.0)],
        (0, 1) => &[(0, 0.5), (1, 0.5)],
        (0, _) => &[(1, 1.0)],
        (1, 1) => &[(0, 0.25), (1, 0.5), (2, 0.25)],
        (1, _) => &[(1, 0.5), (2, 0.5)],
        _ => &[(2, 1.0)],
    }
}

/// Cross two genotypes.
///
/// Returns every possible offspring with its probability. Parents of
/// different species cannot be crossed and yield no offspring.
pub fn cross(a: &Genotype, b: &Genotype) -> Vec<(Genotype, f64)> {
    if a.species() != b.species() {
        return Vec::new();
    }

    let mut partial: Vec<([u8; MAX_LOCI], f64)> = vec![([0; MAX_LOCI], 1.0)];
    for (locus, (&ga, &gb)) in a.genes().iter().zip(b.genes()).enumerate() {
        let outcomes = mix(ga, gb);
        partial = partial
            .into_iter()
            .flat_map(|(genes, p)| {
                outcomes.iter().map(move |&(child, q)| {
                    let mut next = genes;
                    next[locus] = child;
                    (next, p * q)
                })
            })
            .collect();
    }

    let n = a.species().locus_count();
    partial
        .into_iter()
        .filter_map(|(genes, p)| Genotype::new(a.species(), &genes[..n]).ok().map(|g| (g, p)))
        .collect()
}

impl Genotype {
    /// Offspring distribution of `self` crossed with `other`
    pub fn cross(&self, other: &Genotype) -> Vec<(Genotype, f64)> {
        cross(self, other)
    }

    /// Probability that crossing `self` with `other` yields `child`
    pub fn cross_probability(&self, other: &Genotype, child: &Genotype) -> f64 {
        cross(self, other)
            .into_iter()
            .find(|(g, _)| g == child)
            .map(|(_, p)| p)
            .unwrap_or(0.0)
    }
}
