//! Dense ancestor sets
//!
//! Genotypes in a breeding table are numbered densely, so the set of
//! ancestors along a derivation is a bitset over those indices.

use serde::{Deserialize, Serialize};

const WORD_BITS: usize = 64;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AncestorSet {
    words: Vec<u64>,
}

impl AncestorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: usize) {
        let word = id / WORD_BITS;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << (id % WORD_BITS);
    }

    pub fn contains(&self, id: usize) -> bool {
        self.words
            .get(id / WORD_BITS)
            .map_or(false, |w| w & (1u64 << (id % WORD_BITS)) != 0)
    }

    pub fn union_with(&mut self, other: &AncestorSet) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            *mine |= theirs;
        }
    }

    /// Indices present in both sets
    pub fn intersection<'a>(&'a self, other: &'a AncestorSet) -> impl Iterator<Item = usize> + 'a {
        self.words
            .iter()
            .zip(&other.words)
            .enumerate()
            .flat_map(|(i, (a, b))| bits(i, a & b))
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words
            .iter()
            .enumerate()
            .flat_map(|(i, &w)| bits(i, w))
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }
}

fn bits(word_index: usize, mut word: u64) -> impl Iterator<Item = usize> {
    std::iter::from_fn(move || {
        if word == 0 {
            return None;
        }
        let bit = word.trailing_zeros() as usize;
        word &= word - 1;
        Some(word_index * WORD_BITS + bit)
    })
}
