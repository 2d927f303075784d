//! Breeding planner — answers "how do I get a blue rose?"
//!
//! Ties the color table, solver configuration and table store together:
//! seeds of a species are the base genotypes, one solved table is cached per
//! species, and lineages are reconstructed against that table.

use crate::breeding::{
    ancestors, explore_with, AmbiguityResolver, BreedingTable, ColorTestResolver, LineageMemo,
    LineageNode, NoTest,
};
use crate::colors::ColorTable;
use crate::config::{ResolverKind, SolverConfig};
use crate::error::Result;
use crate::genetics::{Color, Genotype, Species};
use crate::storage::TableStore;
use log::info;
use std::sync::Arc;

pub struct BreedingPlanner {
    colors: ColorTable,
    config: SolverConfig,
    store: TableStore,
}

impl BreedingPlanner {
    pub fn new(colors: ColorTable, config: SolverConfig) -> Self {
        Self {
            colors,
            config,
            store: TableStore::new(),
        }
    }

    /// Use an existing (possibly persisted) table store
    pub fn with_store(mut self, store: TableStore) -> Self {
        self.store = store;
        self
    }

    pub fn colors(&self) -> &ColorTable {
        &self.colors
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    /// Seed-packet genotypes of a species
    pub fn seeds(&self, species: Species) -> Vec<Genotype> {
        self.colors.filter(Some(species), None, Some(true))
    }

    /// Solved table for a species, bred from its seeds
    pub fn table(&mut self, species: Species) -> &BreedingTable {
        solve_species(&mut self.store, &self.colors, &self.config, species)
    }

    /// Reachable genotype matching the filters with the best probability
    pub fn best_match(
        &mut self,
        species: Species,
        color: Option<Color>,
        seed: Option<bool>,
    ) -> Option<(Genotype, f64)> {
        let candidates = self.colors.filter(Some(species), color, seed);
        let table = solve_species(&mut self.store, &self.colors, &self.config, species);
        candidates
            .into_iter()
            .filter_map(|g| table.probability(&g).map(|p| (g, p)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Breeding tree for a genotype
    pub fn lineage(&mut self, target: &Genotype) -> Result<Arc<LineageNode>> {
        let table = solve_species(&mut self.store, &self.colors, &self.config, target.species());
        let mut memo = LineageMemo::new();
        ancestors(target, table, &self.colors, &mut memo)
    }
}

fn solve_species<'s>(
    store: &'s mut TableStore,
    colors: &ColorTable,
    config: &SolverConfig,
    species: Species,
) -> &'s BreedingTable {
    let bases = colors.filter(Some(species), None, Some(true));
    store.get_or_solve(&bases, config, colors, || {
        info!(
            "Solving {} from {} seeds (resolver: {})",
            species,
            bases.len(),
            config.resolver.name()
        );
        let color_test;
        let resolver: &dyn AmbiguityResolver = match config.resolver {
            ResolverKind::None => &NoTest,
            ResolverKind::ColorTest => {
                color_test = ColorTestResolver::new(colors);
                &color_test
            }
        };
        explore_with(&bases, resolver, config)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FloraError;

    const COSMOS: &str = "\
RRyySs\tRed (seed)
rrYYss\tYellow (seed)
rryySs\tWhite (seed)
RrYyss\tOrange
RrYySs\tPink
RRYYss\tOrange
rryyss\tWhite
RRYYSS\tBlack
";

    fn planner(resolver: ResolverKind) -> BreedingPlanner {
        let colors = ColorTable::parse(Species::Cosmos, COSMOS).unwrap();
        let config = SolverConfig {
            resolver,
            ..SolverConfig::default()
        };
        BreedingPlanner::new(colors, config)
    }

    fn cosmos(genes: &[u8]) -> Genotype {
        Genotype::new(Species::Cosmos, genes).unwrap()
    }

    #[test]
    fn test_seeds() {
        let p = planner(ResolverKind::None);
        let mut seeds = p.seeds(Species::Cosmos);
        seeds.sort();
        assert_eq!(seeds.len(), 3);
        assert!(seeds.contains(&cosmos(&[0, 0, 1])));
        assert!(p.seeds(Species::Rose).is_empty());
    }

    #[test]
    fn test_best_match_prefers_highest_probability() {
        let mut p = planner(ResolverKind::None);
        let (g, prob) = p.best_match(Species::Cosmos, Some(Color::Orange), None).unwrap();
        assert_eq!(g, cosmos(&[1, 1, 0]));
        assert!((prob - 0.5).abs() < 1e-12);
        let (black, black_prob) = p.best_match(Species::Cosmos, Some(Color::Black), None).unwrap();
        assert_eq!(black, cosmos(&[2, 2, 2]));
        assert!(black_prob < prob);
        assert!(p.best_match(Species::Cosmos, Some(Color::Blue), None).is_none());
    }

    #[test]
    fn test_species_without_seeds() {
        let mut p = planner(ResolverKind::None);
        assert!(p.table(Species::Tulip).is_empty());
        assert!(p.best_match(Species::Tulip, None, None).is_none());
    }

    #[test]
    fn test_lineage_and_cache() {
        let mut p = planner(ResolverKind::None);
        let node = p.lineage(&cosmos(&[2, 2, 2])).unwrap();
        assert!(!node.is_seed());
        assert_eq!(node.color(), Some(Color::Black));
        p.lineage(&cosmos(&[1, 1, 0])).unwrap();
        assert_eq!(p.store().len(), 1);
        assert_eq!(p.store().metadata.total_solves, 1);
    }

    #[test]
    fn test_lineage_of_unknown_species() {
        let mut p = planner(ResolverKind::None);
        let tulip = Genotype::new(Species::Tulip, &[0, 0, 0]).unwrap();
        assert!(matches!(p.lineage(&tulip), Err(FloraError::Unreachable(_))));
    }

    #[test]
    fn test_color_test_resolver_never_beats_plain() {
        let mut plain = planner(ResolverKind::None);
        let mut tested = planner(ResolverKind::ColorTest);
        let plain_table = plain.table(Species::Cosmos).clone();
        let tested_table = tested.table(Species::Cosmos);
        assert_eq!(plain_table.len(), tested_table.len());
        for (g, record) in tested_table.iter() {
            assert!(record.tested_probability <= record.probability + 1e-15);
            assert!(plain_table.probability(g).is_some());
        }
    }
}
