//! Genotype — the identity of a flower
//!
//! A genotype is a species plus one gene value per active locus. Values are
//! allele dosages in {0, 1, 2}. Equality and hashing are structural so a
//! genotype can key every table in the crate.

use super::species::{Locus, Species, MAX_LOCI};
use crate::error::{FloraError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest gene value (homozygous dominant)
pub const MAX_GENE: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Genotype {
    species: Species,
    /// Gene values for the active loci; unused trailing slots stay zero.
    genes: [u8; MAX_LOCI],
}

impl Genotype {
    /// Build a genotype from gene values listed in active-locus order
    pub fn new(species: Species, genes: &[u8]) -> Result<Self> {
        let expected = species.locus_count();
        if genes.len() != expected {
            return Err(FloraError::GeneCount {
                species: species.to_string(),
                expected,
                got: genes.len(),
            });
        }
        let mut packed = [0u8; MAX_LOCI];
        for (i, &value) in genes.iter().enumerate() {
            if value > MAX_GENE {
                return Err(FloraError::InvalidGene { locus: i, value });
            }
            packed[i] = value;
        }
        Ok(Self { species, genes: packed })
    }

    /// Parse an allele field such as `RRyyWWSs`.
    ///
    /// One two-letter pair per active locus; uppercase letters are dominant
    /// alleles. The White locus stores its recessive count instead.
    pub fn from_alleles(species: Species, field: &str) -> Result<Self> {
        let chars: Vec<char> = field.trim().chars().collect();
        let loci = species.loci();
        if chars.len() % 2 != 0 || chars.len() / 2 != loci.len() {
            return Err(FloraError::GeneCount {
                species: species.to_string(),
                expected: loci.len(),
                got: chars.len() / 2,
            });
        }

        let mut genes = Vec::with_capacity(loci.len());
        for (pair, &locus) in chars.chunks(2).zip(loci) {
            let letter = species.allele_letter(locus);
            if pair.iter().any(|c| c.to_ascii_lowercase() != letter) {
                return Err(FloraError::InvalidAllele {
                    pair: pair.iter().collect(),
                    locus: locus.to_string(),
                });
            }
            let dominant = pair.iter().filter(|c| c.is_ascii_uppercase()).count() as u8;
            genes.push(if locus.inverted() { MAX_GENE - dominant } else { dominant });
        }
        Self::new(species, &genes)
    }

    /// Every genotype of a species, in lexicographic gene order
    pub fn all(species: Species) -> Vec<Genotype> {
        let n = species.locus_count();
        let total = 3usize.pow(n as u32);
        (0..total)
            .map(|mut k| {
                let mut genes = [0u8; MAX_LOCI];
                for slot in genes[..n].iter_mut().rev() {
                    *slot = (k % 3) as u8;
                    k /= 3;
                }
                Genotype { species, genes }
            })
            .collect()
    }

    pub fn species(&self) -> Species {
        self.species
    }

    /// Gene values for the active loci
    pub fn genes(&self) -> &[u8] {
        &self.genes[..self.species.locus_count()]
    }

    /// Gene value at a canonical locus, if the species uses it
    pub fn gene(&self, locus: Locus) -> Option<u8> {
        self.species
            .loci()
            .iter()
            .position(|l| *l == locus)
            .map(|i| self.genes[i])
    }

    /// Human-readable code, e.g. `RR yy WW Ss`
    pub fn code(&self) -> String {
        self.species
            .loci()
            .iter()
            .zip(self.genes())
            .map(|(&locus, &value)| locus_symbol(self.species, locus, value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Two-letter symbol for one locus: recessive, heterozygous, dominant.
fn locus_symbol(species: Species, locus: Locus, value: u8) -> String {
    let lower = species.allele_letter(locus);
    let upper = lower.to_ascii_uppercase();
    let dominant = if locus.inverted() { MAX_GENE - value } else { value };
    match dominant {
        0 => format!("{}{}", lower, lower),
        1 => format!("{}{}", upper, lower),
        _ => format!("{}{}", upper, upper),
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.species, self.code())
    }
}
