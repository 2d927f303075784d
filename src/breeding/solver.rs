//! Breeding graph solver
//!
//! Discovers every genotype reachable from a set of base genotypes by
//! repeated crossing, and the highest-probability way to obtain each one.
//! The graph is implicit: nodes appear as crosses discover them, and the
//! solver relaxes every pair of known genotypes until a full pass changes
//! nothing.

use super::ancestry::AncestorSet;
use super::resolver::{AmbiguityResolver, NoTest};
use crate::config::SolverConfig;
use crate::error::{FloraError, Result};
use crate::genetics::{cross, Color, Genotype};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Best known derivation of one genotype
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreedingRecord {
    /// Table indices of the two parents; `None` for base genotypes
    pub parents: Option<(usize, usize)>,
    /// Every genotype used along the derivation
    pub ancestors: AncestorSet,
    /// Probability of this genotype from the final cross alone
    pub cross_probability: f64,
    /// Probability of obtaining this genotype along the whole derivation
    pub probability: f64,
    /// `probability` scaled by the cost of confirming it with a test cross
    pub tested_probability: f64,
    /// Test cross partner and the color that confirms the result
    pub test: Option<(Genotype, Color)>,
}

impl BreedingRecord {
    fn base() -> Self {
        Self {
            parents: None,
            ancestors: AncestorSet::new(),
            cross_probability: 1.0,
            probability: 1.0,
            tested_probability: 1.0,
            test: None,
        }
    }

    pub fn is_base(&self) -> bool {
        self.parents.is_none()
    }
}

#[derive(Serialize, Deserialize)]
struct TableRepr {
    genotypes: Vec<Genotype>,
    records: Vec<BreedingRecord>,
}

/// Solver output: every discovered genotype and its best derivation.
///
/// Genotypes are numbered in discovery order; bases come first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "TableRepr", into = "TableRepr")]
pub struct BreedingTable {
    genotypes: Vec<Genotype>,
    records: Vec<BreedingRecord>,
    index: HashMap<Genotype, usize>,
}

impl TryFrom<TableRepr> for BreedingTable {
    type Error = FloraError;

    /// Rebuild the index, rejecting tables whose links point nowhere
    fn try_from(repr: TableRepr) -> Result<Self> {
        let len = repr.genotypes.len();
        if repr.records.len() != len {
            return Err(FloraError::CorruptTable(format!(
                "{} genotypes but {} records",
                len,
                repr.records.len()
            )));
        }
        for (genotype, record) in repr.genotypes.iter().zip(&repr.records) {
            let parents_ok = record.parents.map_or(true, |(a, b)| a < len && b < len);
            if !parents_ok || record.ancestors.iter().any(|id| id >= len) {
                return Err(FloraError::CorruptTable(format!(
                    "{} links outside the table",
                    genotype
                )));
            }
        }
        let mut index = HashMap::with_capacity(len);
        for (i, g) in repr.genotypes.iter().enumerate() {
            if index.insert(*g, i).is_some() {
                return Err(FloraError::CorruptTable(format!("{} listed twice", g)));
            }
        }
        Ok(Self {
            genotypes: repr.genotypes,
            records: repr.records,
            index,
        })
    }
}

impl From<BreedingTable> for TableRepr {
    fn from(table: BreedingTable) -> Self {
        Self {
            genotypes: table.genotypes,
            records: table.records,
        }
    }
}

impl BreedingTable {
    fn seeded(bases: &[Genotype]) -> Self {
        let mut table = Self::default();
        for base in bases {
            if !table.index.contains_key(base) {
                table.push(*base, BreedingRecord::base());
            }
        }
        table
    }

    fn push(&mut self, genotype: Genotype, record: BreedingRecord) -> usize {
        let id = self.genotypes.len();
        self.genotypes.push(genotype);
        self.records.push(record);
        self.index.insert(genotype, id);
        id
    }

    pub fn len(&self) -> usize {
        self.genotypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genotypes.is_empty()
    }

    pub fn contains(&self, genotype: &Genotype) -> bool {
        self.index.contains_key(genotype)
    }

    pub fn id_of(&self, genotype: &Genotype) -> Option<usize> {
        self.index.get(genotype).copied()
    }

    pub fn genotype(&self, id: usize) -> Option<&Genotype> {
        self.genotypes.get(id)
    }

    /// Known genotypes in discovery order
    pub fn genotypes(&self) -> &[Genotype] {
        &self.genotypes
    }

    pub fn get(&self, genotype: &Genotype) -> Option<&BreedingRecord> {
        self.id_of(genotype).and_then(|id| self.records.get(id))
    }

    /// Parent pair of the best derivation, `None` for bases and unknowns
    pub fn parents(&self, genotype: &Genotype) -> Option<(Genotype, Genotype)> {
        let (a, b) = self.get(genotype)?.parents?;
        Some((*self.genotypes.get(a)?, *self.genotypes.get(b)?))
    }

    /// Genotypes used along the best derivation
    pub fn ancestors(&self, genotype: &Genotype) -> Vec<Genotype> {
        self.get(genotype)
            .map(|r| r.ancestors.iter().filter_map(|id| self.genotypes.get(id).copied()).collect())
            .unwrap_or_default()
    }

    /// Test-adjusted probability of obtaining a genotype
    pub fn probability(&self, genotype: &Genotype) -> Option<f64> {
        self.get(genotype).map(|r| r.tested_probability)
    }

    pub fn is_base(&self, genotype: &Genotype) -> bool {
        self.get(genotype).map_or(false, BreedingRecord::is_base)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Genotype, &BreedingRecord)> {
        self.genotypes.iter().zip(&self.records)
    }
}

/// Fixed-point relaxation over the breeding graph
pub struct BreedingSolver<'r> {
    table: BreedingTable,
    resolver: &'r dyn AmbiguityResolver,
    max_passes: usize,
    passes: usize,
}

impl<'r> BreedingSolver<'r> {
    pub fn new(bases: &[Genotype], resolver: &'r dyn AmbiguityResolver) -> Self {
        Self {
            table: BreedingTable::seeded(bases),
            resolver,
            max_passes: SolverConfig::default().max_passes,
            passes: 0,
        }
    }

    pub fn with_config(mut self, config: &SolverConfig) -> Self {
        self.max_passes = config.max_passes;
        self
    }

    pub fn table(&self) -> &BreedingTable {
        &self.table
    }

    /// Passes run so far
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Relax every unordered pair of known genotypes once.
    ///
    /// Genotypes discovered during the pass join it immediately. Returns the
    /// number of records created or improved.
    pub fn pass(&mut self) -> usize {
        let mut modified = 0;
        let mut i = 0;
        while i < self.table.len() {
            let mut j = i;
            while j < self.table.len() {
                modified += self.relax_pair(i, j);
                j += 1;
            }
            i += 1;
        }
        self.passes += 1;
        modified
    }

    /// Run passes until one changes nothing or the pass ceiling is reached.
    ///
    /// Returns whether a fixed point was reached.
    pub fn run(&mut self) -> bool {
        let bases = self.table.len();
        let converged = loop {
            if self.passes >= self.max_passes {
                warn!(
                    "Stopped after {} passes without reaching a fixed point ({} genotypes known)",
                    self.passes,
                    self.table.len()
                );
                break false;
            }
            let modified = self.pass();
            debug!(
                "Pass {}: {} updates, {} genotypes known",
                self.passes,
                modified,
                self.table.len()
            );
            if modified == 0 {
                break true;
            }
        };
        info!(
            "Explored {} genotypes from {} bases in {} passes",
            self.table.len(),
            bases,
            self.passes
        );
        converged
    }

    /// Run to a fixed point and hand over the table
    pub fn solve(mut self) -> BreedingTable {
        self.run();
        self.table
    }

    /// Probability of holding both genotypes at once.
    ///
    /// Ancestors shared by both derivations are only bred once, so their
    /// probabilities are divided back out of the product.
    fn joint_probability(&self, i: usize, j: usize) -> f64 {
        let records = &self.table.records;
        let (a, b) = (&records[i], &records[j]);
        let shared: f64 = a
            .ancestors
            .intersection(&b.ancestors)
            .map(|k| records[k].probability)
            .product();
        (a.probability * b.probability / shared).min(1.0)
    }

    /// Whether `ancestor` appears in the current derivation of `id`
    fn derives_from(&self, id: usize, ancestor: usize) -> bool {
        let mut seen = vec![false; self.table.len()];
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if current == ancestor {
                return true;
            }
            if std::mem::replace(&mut seen[current], true) {
                continue;
            }
            if let Some((a, b)) = self.table.records[current].parents {
                stack.push(a);
                stack.push(b);
            }
        }
        false
    }

    fn relax_pair(&mut self, i: usize, j: usize) -> usize {
        let f1 = self.table.genotypes[i];
        let f2 = self.table.genotypes[j];
        if f1.species() != f2.species() {
            return 0;
        }
        let joint = self.joint_probability(i, j);
        if joint <= 0.0 {
            return 0;
        }

        let mut modified = 0;
        for (child, raw) in cross(&f1, &f2) {
            if child == f1 || child == f2 {
                continue;
            }
            let existing = self.table.id_of(&child);
            let current = existing.map(|id| self.table.records[id].tested_probability);
            let untested = joint * raw;
            // Tests only lower the probability; skip the resolver when the
            // untested figure already loses.
            if current.map_or(false, |c| untested <= c) {
                continue;
            }

            let outcome = self.resolver.resolve(&f1, &f2, &child, &self.table.genotypes);
            let tested = untested * outcome.success_probability;
            if tested <= 0.0 || current.map_or(false, |c| tested <= c) {
                continue;
            }

            let mut ancestors = self.table.records[i].ancestors.clone();
            ancestors.union_with(&self.table.records[j].ancestors);
            ancestors.insert(i);
            ancestors.insert(j);
            // A genotype can never be bred from its own descendants.
            if let Some(id) = existing {
                if ancestors.contains(id) || self.derives_from(i, id) || self.derives_from(j, id) {
                    continue;
                }
            }
            let record = BreedingRecord {
                parents: Some((i, j)),
                ancestors,
                cross_probability: raw,
                probability: untested,
                tested_probability: tested,
                test: outcome.tester.zip(outcome.color),
            };
            match existing {
                Some(id) => self.table.records[id] = record,
                None => {
                    self.table.push(child, record);
                }
            }
            modified += 1;
        }
        modified
    }
}

/// Explore from `bases` with color taken as proof of identity
pub fn explore(bases: &[Genotype]) -> BreedingTable {
    BreedingSolver::new(bases, &NoTest).solve()
}

/// Explore with a chosen resolver and configuration
pub fn explore_with(
    bases: &[Genotype],
    resolver: &dyn AmbiguityResolver,
    config: &SolverConfig,
) -> BreedingTable {
    BreedingSolver::new(bases, resolver).with_config(config).solve()
}
