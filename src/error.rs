//! Errors raised while loading color tables, configuring the solver,
//! persisting solved tables, and reconstructing lineages.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FloraError {
    #[error("Unknown species: {0}")]
    UnknownSpecies(String),

    #[error("Unknown color: {0}")]
    UnknownColor(String),

    #[error("Gene value {value} out of range at locus {locus} (expected 0, 1 or 2)")]
    InvalidGene { locus: usize, value: u8 },

    #[error("{species} genotypes have {expected} loci, got {got}")]
    GeneCount {
        species: String,
        expected: usize,
        got: usize,
    },

    #[error("Invalid allele pair '{pair}' for the {locus} locus")]
    InvalidAllele { pair: String, locus: String },

    #[error("Malformed color record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Genotype {0} is not reachable from the base genotypes")]
    Unreachable(String),

    #[error("Lineage of {0} loops back on itself")]
    CyclicLineage(String),

    #[error("Corrupt breeding table: {0}")]
    CorruptTable(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FloraError>;
