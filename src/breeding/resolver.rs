//! Ambiguity resolution — confirming an offspring by a test cross
//!
//! Two offspring of the same cross can share a display color, in which case
//! the breeder cannot tell by looking which one they got. A resolver decides
//! whether a further test cross is needed and how likely it is to confirm the
//! candidate. The solver scales a candidate's probability by the reported
//! success probability before admitting it.
//!
//! [`NoTest`] is the standard behavior: color is always taken as proof.
//! [`ColorTestResolver`] is an opt-in extension that searches the known
//! genotypes for a tester.

use crate::colors::ColorTable;
use crate::genetics::{cross, Color, Genotype};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Verdict on how to confirm a candidate offspring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    /// Genotype to cross the candidate with, if a test is needed
    pub tester: Option<Genotype>,
    /// Probability the test confirms the candidate (1.0 when untested)
    pub success_probability: f64,
    /// Offspring color that proves the candidate's identity
    pub color: Option<Color>,
}

impl TestOutcome {
    /// No test required
    pub fn untested() -> Self {
        Self {
            tester: None,
            success_probability: 1.0,
            color: None,
        }
    }

    pub fn requires_test(&self) -> bool {
        self.tester.is_some()
    }
}

pub trait AmbiguityResolver {
    /// Decide how `candidate`, bred from `f1` x `f2`, is confirmed given the
    /// genotypes already known to be obtainable.
    fn resolve(
        &self,
        f1: &Genotype,
        f2: &Genotype,
        candidate: &Genotype,
        known: &[Genotype],
    ) -> TestOutcome;
}

/// Never asks for a test cross
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTest;

impl AmbiguityResolver for NoTest {
    fn resolve(&self, _: &Genotype, _: &Genotype, _: &Genotype, _: &[Genotype]) -> TestOutcome {
        TestOutcome::untested()
    }
}

/// Looks for a known tester whose cross with the candidate can show a color
/// that none of the candidate's look-alike siblings could produce with the
/// same tester.
#[derive(Debug, Clone, Copy)]
pub struct ColorTestResolver<'a> {
    colors: &'a ColorTable,
}

impl<'a> ColorTestResolver<'a> {
    pub fn new(colors: &'a ColorTable) -> Self {
        Self { colors }
    }

    /// Colors `a` x `b` can produce, with their total probabilities
    fn color_distribution(&self, a: &Genotype, b: &Genotype) -> BTreeMap<Color, f64> {
        let mut dist = BTreeMap::new();
        for (child, p) in cross(a, b) {
            if let Some(color) = self.colors.color(&child) {
                *dist.entry(color).or_insert(0.0) += p;
            }
        }
        dist
    }
}

impl AmbiguityResolver for ColorTestResolver<'_> {
    fn resolve(
        &self,
        f1: &Genotype,
        f2: &Genotype,
        candidate: &Genotype,
        known: &[Genotype],
    ) -> TestOutcome {
        let Some(color) = self.colors.color(candidate) else {
            return TestOutcome::untested();
        };

        let siblings: Vec<Genotype> = cross(f1, f2)
            .into_iter()
            .map(|(g, _)| g)
            .filter(|g| g != candidate && self.colors.color(g) == Some(color))
            .collect();
        if siblings.is_empty() {
            return TestOutcome::untested();
        }

        let mut best: Option<TestOutcome> = None;
        for tester in known.iter().filter(|t| t.species() == candidate.species()) {
            let rivals: HashSet<Color> = siblings
                .iter()
                .flat_map(|s| self.color_distribution(s, tester).into_keys())
                .collect();
            for (shown, p) in self.color_distribution(candidate, tester) {
                if rivals.contains(&shown) {
                    continue;
                }
                if best.map_or(true, |b| p > b.success_probability) {
                    best = Some(TestOutcome {
                        tester: Some(*tester),
                        success_probability: p,
                        color: Some(shown),
                    });
                }
            }
        }

        // TODO: charge the tester's own breeding probability once the cost
        // model for test crosses is settled.
        best.unwrap_or_else(TestOutcome::untested)
    }
}
