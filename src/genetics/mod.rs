//! Flower genetics — species, genotypes and the cross operator
//!
//! A genotype is an immutable (species, gene dosages) value; crossing two
//! genotypes of the same species yields a discrete offspring distribution.

mod species;
mod genotype;
mod cross;

pub use species::{Color, Locus, Species, MAX_LOCI};
pub use genotype::{Genotype, MAX_GENE};
pub use cross::{cross, mix};
