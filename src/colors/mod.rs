//! Genotype color table
//!
//! Static reference data: for every valid genotype of a species, its display
//! color and whether it can be bought as a seed. Built once and read-only
//! afterwards. Records come from a tab-separated file, one genotype per line:
//!
//! ```text
//! RRyyWWSs	...	Red (seed)
//! rryywwss	...	White
//! ```

use crate::error::{FloraError, Result};
use crate::genetics::{Color, Genotype, Species};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Marker that flags a genotype as available from seed packets
pub const SEED_MARKER: &str = "(seed)";

/// Display color and seed origin of one genotype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRecord {
    pub color: Color,
    pub seed: bool,
}

/// Read-only lookup from genotype to its color record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorTable {
    records: BTreeMap<Genotype, ColorRecord>,
}

impl ColorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the records of one species from tab-separated text
    pub fn parse(species: Species, text: &str) -> Result<Self> {
        let mut table = Self::new();
        for (i, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (genotype, record) = parse_line(species, line).map_err(|reason| {
                FloraError::MalformedRecord { line: i + 1, reason }
            })?;
            table.insert(genotype, record);
        }
        Ok(table)
    }

    /// Load the records of one species from a file
    pub fn load(species: Species, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let table = Self::parse(species, &text)?;
        info!(
            "Loaded {} {} genotypes ({} seeds) from {}",
            table.len(),
            species,
            table.filter(Some(species), None, Some(true)).len(),
            path.display()
        );
        Ok(table)
    }

    pub fn insert(&mut self, genotype: Genotype, record: ColorRecord) {
        self.records.insert(genotype, record);
    }

    /// Absorb another table; its records win on conflict
    pub fn merge(&mut self, other: ColorTable) {
        self.records.extend(other.records);
    }

    pub fn lookup(&self, genotype: &Genotype) -> Option<&ColorRecord> {
        self.records.get(genotype)
    }

    pub fn color(&self, genotype: &Genotype) -> Option<Color> {
        self.lookup(genotype).map(|r| r.color)
    }

    /// All genotypes matching every filter that is set; `None` matches anything.
    pub fn filter(
        &self,
        species: Option<Species>,
        color: Option<Color>,
        seed: Option<bool>,
    ) -> Vec<Genotype> {
        self.records
            .iter()
            .filter(|(g, r)| {
                species.map_or(true, |s| g.species() == s)
                    && color.map_or(true, |c| r.color == c)
                    && seed.map_or(true, |s| r.seed == s)
            })
            .map(|(g, _)| *g)
            .collect()
    }

    /// Records in genotype order
    pub fn iter(&self) -> impl Iterator<Item = (&Genotype, &ColorRecord)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Split one record into its genotype and color record.
///
/// The first field holds the alleles, the last holds the color, optionally
/// followed by the seed marker (same field or a trailing one).
fn parse_line(species: Species, line: &str) -> std::result::Result<(Genotype, ColorRecord), String> {
    let mut fields: Vec<&str> = line
        .split('\t')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();
    if fields.len() < 2 {
        return Err(format!("expected at least 2 fields, got {}", fields.len()));
    }

    let mut seed = false;
    if fields.len() > 2 && is_seed_marker(fields[fields.len() - 1]) {
        seed = true;
        fields.pop();
    }

    let mut color_field = fields[fields.len() - 1];
    let lowered = color_field.to_ascii_lowercase();
    if let Some(stripped) = lowered.strip_suffix(SEED_MARKER) {
        seed = true;
        color_field = &color_field[..stripped.len()];
    }

    let genotype = Genotype::from_alleles(species, fields[0]).map_err(|e| e.to_string())?;
    let color = color_field.trim().parse::<Color>().map_err(|e| e.to_string())?;
    Ok((genotype, ColorRecord { color, seed }))
}

fn is_seed_marker(field: &str) -> bool {
    field.eq_ignore_ascii_case(SEED_MARKER)
}
