//! Breeding — from base genotypes to the best lineage for any target
//!
//! - **Solver**: fixed-point relaxation discovering every reachable genotype
//!   and its highest-probability derivation
//! - **Resolver**: test-cross cost of confirming a look-alike offspring
//! - **Lineage**: memoized reconstruction of the breeding tree for a target

mod ancestry;
mod resolver;
mod solver;
mod lineage;

pub use ancestry::AncestorSet;
pub use resolver::{AmbiguityResolver, ColorTestResolver, NoTest, TestOutcome};
pub use solver::{explore, explore_with, BreedingRecord, BreedingSolver, BreedingTable};
pub use lineage::{ancestors, LineageMemo, LineageNode};
