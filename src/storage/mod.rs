//! Solved-table store
//!
//! Solving is pure, so a table computed once for a base set can be reused
//! for every later request. Tables are keyed by a fingerprint of the base
//! genotypes and solver settings, and the store persists as JSON.

use crate::breeding::BreedingTable;
use crate::colors::ColorTable;
use crate::config::{ResolverKind, SolverConfig};
use crate::error::{FloraError, Result};
use crate::genetics::Genotype;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A solved table with the inputs that produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTable {
    pub bases: Vec<Genotype>,
    pub config: SolverConfig,
    pub table: BreedingTable,
    pub solved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMetadata {
    pub created_at: DateTime<Utc>,
    pub total_solves: u64,
    pub total_hits: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TableStore {
    tables: HashMap<String, StoredTable>,
    #[serde(skip)]
    path: Option<PathBuf>,
    pub metadata: StoreMetadata,
}

impl TableStore {
    /// In-memory store with no backing file
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
            path: None,
            metadata: StoreMetadata {
                created_at: Utc::now(),
                total_solves: 0,
                total_hits: 0,
            },
        }
    }

    /// Open a store backed by `path`, starting empty if it cannot be read
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            match std::fs::read_to_string(&path)
                .map_err(FloraError::from)
                .and_then(|data| Ok(serde_json::from_str::<TableStore>(&data)?))
            {
                Ok(mut store) => {
                    info!("Loaded {} solved tables from {}", store.tables.len(), path.display());
                    store.path = Some(path);
                    return store;
                }
                Err(e) => warn!("Ignoring unreadable table store {}: {}", path.display(), e),
            }
        }
        let mut store = Self::new();
        store.path = Some(path);
        store
    }

    /// Write the store to its backing file, if it has one
    pub fn save(&self) -> Result<()> {
        if let Some(path) = &self.path {
            let json = serde_json::to_string(self)?;
            std::fs::write(path, json)?;
            info!("Saved {} solved tables to {}", self.tables.len(), path.display());
        }
        Ok(())
    }

    /// Key for a solve request; base order and repeats don't matter.
    ///
    /// Covers the solver settings, and for the color-test resolver also the
    /// color records of the bases' species, since those steer its tests.
    pub fn fingerprint(bases: &[Genotype], config: &SolverConfig, colors: &ColorTable) -> String {
        let mut sorted = bases.to_vec();
        sorted.sort();
        sorted.dedup();
        let mut hasher = Sha256::new();
        hasher.update(config.resolver.name().as_bytes());
        hasher.update((config.max_passes as u64).to_le_bytes());
        for g in &sorted {
            hasher.update(g.species().name().as_bytes());
            hasher.update(g.genes());
            hasher.update(b";");
        }
        if config.resolver == ResolverKind::ColorTest {
            hasher.update(b"colors");
            let records = colors
                .iter()
                .filter(|(g, _)| sorted.iter().any(|b| b.species() == g.species()));
            for (g, record) in records {
                hasher.update(g.species().name().as_bytes());
                hasher.update(g.genes());
                hasher.update(record.color.name().as_bytes());
                hasher.update([record.seed as u8]);
            }
        }
        hex::encode(hasher.finalize())
    }

    pub fn get(
        &self,
        bases: &[Genotype],
        config: &SolverConfig,
        colors: &ColorTable,
    ) -> Option<&BreedingTable> {
        self.tables
            .get(&Self::fingerprint(bases, config, colors))
            .map(|s| &s.table)
    }

    pub fn insert(
        &mut self,
        bases: &[Genotype],
        config: &SolverConfig,
        colors: &ColorTable,
        table: BreedingTable,
    ) -> String {
        let key = Self::fingerprint(bases, config, colors);
        self.metadata.total_solves += 1;
        self.tables.insert(
            key.clone(),
            StoredTable {
                bases: bases.to_vec(),
                config: config.clone(),
                table,
                solved_at: Utc::now(),
            },
        );
        key
    }

    /// Cached table for the inputs, solving with `solve` on a miss
    pub fn get_or_solve<F>(
        &mut self,
        bases: &[Genotype],
        config: &SolverConfig,
        colors: &ColorTable,
        solve: F,
    ) -> &BreedingTable
    where
        F: FnOnce() -> BreedingTable,
    {
        let key = Self::fingerprint(bases, config, colors);
        if self.tables.contains_key(&key) {
            self.metadata.total_hits += 1;
        } else {
            let table = solve();
            self.insert(bases, config, colors, table);
        }
        &self.tables[&key].table
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn summary(&self) -> String {
        let genotypes: usize = self.tables.values().map(|s| s.table.len()).sum();
        format!(
            "TableStore | {} tables | {} genotypes | {} solves | {} cache hits",
            self.tables.len(),
            genotypes,
            self.metadata.total_solves,
            self.metadata.total_hits
        )
    }
}

impl Default for TableStore {
    fn default() -> Self {
        Self::new()
    }
}
