//! Species, loci and display colors
//!
//! Every species draws its genome from the same four canonical locus
//! positions (Red, Yellow, White, Shade) but only some species use all four.

use crate::error::FloraError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of locus positions any species uses
pub const MAX_LOCI: usize = 4;

/// Canonical locus positions, in genome order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Locus {
    Red,
    Yellow,
    White,
    Shade,
}

impl Locus {
    /// The White locus counts recessive `w` alleles instead of dominant ones.
    pub fn inverted(self) -> bool {
        matches!(self, Locus::White)
    }
}

impl fmt::Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Locus::Red => "red",
            Locus::Yellow => "yellow",
            Locus::White => "white",
            Locus::Shade => "shade",
        };
        f.write_str(name)
    }
}

/// Flower species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    Rose,
    Cosmos,
    Lily,
    Pansy,
    Hyacinth,
    Tulip,
    Mum,
    Windflower,
    Carnation,
}

impl Species {
    pub const ALL: [Species; 9] = [
        Species::Rose,
        Species::Cosmos,
        Species::Lily,
        Species::Pansy,
        Species::Hyacinth,
        Species::Tulip,
        Species::Mum,
        Species::Windflower,
        Species::Carnation,
    ];

    /// Active locus positions, in genome order
    pub fn loci(self) -> &'static [Locus] {
        use Locus::*;
        match self {
            Species::Rose => &[Red, Yellow, White, Shade],
            Species::Cosmos | Species::Lily | Species::Tulip | Species::Carnation => {
                &[Red, Yellow, Shade]
            }
            Species::Pansy | Species::Hyacinth | Species::Mum | Species::Windflower => {
                &[Red, Yellow, White]
            }
        }
    }

    pub fn locus_count(self) -> usize {
        self.loci().len()
    }

    /// Allele letter used for a locus when writing genotype codes.
    ///
    /// Windflowers carry an orange gene where other species carry yellow.
    pub fn allele_letter(self, locus: Locus) -> char {
        match (self, locus) {
            (_, Locus::Red) => 'r',
            (Species::Windflower, Locus::Yellow) => 'o',
            (_, Locus::Yellow) => 'y',
            (_, Locus::White) => 'w',
            (_, Locus::Shade) => 's',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Species::Rose => "rose",
            Species::Cosmos => "cosmos",
            Species::Lily => "lily",
            Species::Pansy => "pansy",
            Species::Hyacinth => "hyacinth",
            Species::Tulip => "tulip",
            Species::Mum => "mum",
            Species::Windflower => "windflower",
            Species::Carnation => "carnation",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Species {
    type Err = FloraError;

    /// Accepts singular or plural names in any case ("Roses", "rose")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let candidates = [
            Some(lower.clone()),
            lower.strip_suffix("ies").map(|stem| format!("{}y", stem)),
            lower.strip_suffix("es").map(str::to_string),
            lower.strip_suffix('s').map(str::to_string),
        ];
        Species::ALL
            .iter()
            .copied()
            .find(|sp| candidates.iter().flatten().any(|c| c == sp.name()))
            .ok_or_else(|| FloraError::UnknownSpecies(s.to_string()))
    }
}

/// Display color of a flower
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    Red,
    White,
    Yellow,
    Pink,
    Orange,
    Purple,
    Black,
    Blue,
    Green,
}

impl Color {
    pub const ALL: [Color; 9] = [
        Color::Red,
        Color::White,
        Color::Yellow,
        Color::Pink,
        Color::Orange,
        Color::Purple,
        Color::Black,
        Color::Blue,
        Color::Green,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::White => "white",
            Color::Yellow => "yellow",
            Color::Pink => "pink",
            Color::Orange => "orange",
            Color::Purple => "purple",
            Color::Black => "black",
            Color::Blue => "blue",
            Color::Green => "green",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Color {
    type Err = FloraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Color::ALL
            .iter()
            .copied()
            .find(|c| c.name() == lower)
            .ok_or_else(|| FloraError::UnknownColor(s.to_string()))
    }
}
