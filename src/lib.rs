//! Flora — flower breeding planner
//!
//! Finds the highest-probability way to breed every reachable flower
//! genotype from seed-packet flowers, and reconstructs the breeding tree
//! behind any target.

pub mod error;
pub mod genetics;
pub mod colors;
pub mod breeding;
pub mod config;
pub mod storage;
pub mod planner;

pub use error::{FloraError, Result};
pub use genetics::{cross, Color, Genotype, Locus, Species};
pub use colors::{ColorRecord, ColorTable};
pub use breeding::{ancestors, explore, BreedingSolver, BreedingTable, LineageMemo, LineageNode};
pub use config::{ResolverKind, SolverConfig};
pub use storage::TableStore;
pub use planner::BreedingPlanner;
