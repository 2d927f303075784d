//! Lineage reconstruction — the breeding tree behind a genotype
//!
//! Walks a solved [`BreedingTable`] from a target down to base genotypes.
//! Every genotype is expanded once per memo; a genotype reached along
//! several paths shares one subtree.

use super::solver::BreedingTable;
use crate::colors::ColorTable;
use crate::error::{FloraError, Result};
use crate::genetics::{Color, Genotype};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// One node of a breeding tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineageNode {
    /// A base genotype, obtained without crossing
    Seed {
        code: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<Color>,
    },
    /// Cross `a` x `b`, which yields this genotype with `probability`
    Cross {
        code: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<Color>,
        probability: f64,
        a: Arc<LineageNode>,
        b: Arc<LineageNode>,
    },
}

impl LineageNode {
    pub fn code(&self) -> &str {
        match self {
            LineageNode::Seed { code, .. } | LineageNode::Cross { code, .. } => code,
        }
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            LineageNode::Seed { color, .. } | LineageNode::Cross { color, .. } => *color,
        }
    }

    pub fn is_seed(&self) -> bool {
        matches!(self, LineageNode::Seed { .. })
    }

    /// Number of crosses in the tree, counting shared subtrees once
    pub fn cross_count(&self) -> usize {
        let mut seen: Vec<*const LineageNode> = Vec::new();
        let mut stack = vec![self];
        let mut count = 0;
        while let Some(node) = stack.pop() {
            if let LineageNode::Cross { a, b, .. } = node {
                let ptr = node as *const LineageNode;
                if seen.contains(&ptr) {
                    continue;
                }
                seen.push(ptr);
                count += 1;
                stack.push(a);
                stack.push(b);
            }
        }
        count
    }
}

/// Reconstructed subtrees, keyed by genotype
pub type LineageMemo = HashMap<Genotype, Arc<LineageNode>>;

/// Build the breeding tree for `target`.
///
/// `memo` may be reused across calls against the same table. Fails with
/// [`FloraError::Unreachable`] if the table never discovered `target`, and
/// with [`FloraError::CyclicLineage`] if parent links loop, which only a
/// hand-edited table can contain.
pub fn ancestors(
    target: &Genotype,
    table: &BreedingTable,
    colors: &ColorTable,
    memo: &mut LineageMemo,
) -> Result<Arc<LineageNode>> {
    if let Some(node) = memo.get(target) {
        return Ok(Arc::clone(node));
    }
    if !table.contains(target) {
        return Err(FloraError::Unreachable(target.to_string()));
    }

    // (genotype, parents already pushed)
    let mut stack = vec![(*target, false)];
    // Genotypes expanded but not yet built; these form the current path.
    let mut in_progress: HashSet<Genotype> = HashSet::new();
    while let Some((genotype, expanded)) = stack.pop() {
        if memo.contains_key(&genotype) {
            continue;
        }
        let node = match table.parents(&genotype) {
            None => LineageNode::Seed {
                code: genotype.code(),
                color: colors.color(&genotype),
            },
            Some((p1, p2)) if !expanded => {
                in_progress.insert(genotype);
                stack.push((genotype, true));
                for parent in [p2, p1] {
                    if memo.contains_key(&parent) {
                        continue;
                    }
                    if in_progress.contains(&parent) {
                        return Err(FloraError::CyclicLineage(genotype.to_string()));
                    }
                    stack.push((parent, false));
                }
                continue;
            }
            Some((p1, p2)) => {
                let (Some(a), Some(b)) = (memo.get(&p1), memo.get(&p2)) else {
                    return Err(FloraError::CyclicLineage(genotype.to_string()));
                };
                in_progress.remove(&genotype);
                LineageNode::Cross {
                    code: genotype.code(),
                    color: colors.color(&genotype),
                    probability: p1.cross_probability(&p2, &genotype),
                    a: Arc::clone(a),
                    b: Arc::clone(b),
                }
            }
        };
        memo.insert(genotype, Arc::new(node));
    }

    memo.get(target)
        .cloned()
        .ok_or_else(|| FloraError::Unreachable(target.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breeding::explore;
    use crate::colors::ColorRecord;
    use crate::genetics::Species;

    fn cosmos(genes: &[u8]) -> Genotype {
        Genotype::new(Species::Cosmos, genes).unwrap()
    }

    fn rose(genes: &[u8]) -> Genotype {
        Genotype::new(Species::Rose, genes).unwrap()
    }

    fn cosmos_colors() -> ColorTable {
        let mut colors = ColorTable::new();
        colors.insert(cosmos(&[2, 0, 1]), ColorRecord { color: Color::Red, seed: true });
        colors.insert(cosmos(&[0, 2, 0]), ColorRecord { color: Color::Yellow, seed: true });
        colors.insert(cosmos(&[0, 0, 0]), ColorRecord { color: Color::White, seed: true });
        colors.insert(cosmos(&[1, 1, 0]), ColorRecord { color: Color::Orange, seed: false });
        colors
    }

    fn rose_bases() -> Vec<Genotype> {
        vec![rose(&[2, 0, 0, 1]), rose(&[0, 2, 0, 0]), rose(&[0, 0, 1, 0])]
    }

    /// Every node of the tree, visiting shared subtrees once per reference
    fn walk(node: &Arc<LineageNode>, out: &mut Vec<Arc<LineageNode>>) {
        out.push(Arc::clone(node));
        if let LineageNode::Cross { a, b, .. } = node.as_ref() {
            walk(a, out);
            walk(b, out);
        }
    }

    #[test]
    fn test_seed_is_leaf() {
        let colors = cosmos_colors();
        let table = explore(&colors.filter(None, None, Some(true)));
        let mut memo = LineageMemo::new();
        let node = ancestors(&cosmos(&[2, 0, 1]), &table, &colors, &mut memo).unwrap();
        assert_eq!(
            *node,
            LineageNode::Seed { code: "RR yy Ss".into(), color: Some(Color::Red) }
        );
    }

    #[test]
    fn test_red_yellow_lineage() {
        let colors = cosmos_colors();
        let table = explore(&colors.filter(None, None, Some(true)));
        let mut memo = LineageMemo::new();
        let node = ancestors(&cosmos(&[1, 1, 0]), &table, &colors, &mut memo).unwrap();

        let LineageNode::Cross { code, color, probability, a, b } = node.as_ref() else {
            panic!("expected a cross, got {:?}", node);
        };
        assert_eq!(code, "Rr Yy ss");
        assert_eq!(*color, Some(Color::Orange));
        assert!((probability - 0.5).abs() < 1e-12);
        let mut leaves = vec![a.color(), b.color()];
        leaves.sort();
        assert_eq!(leaves, vec![Some(Color::Red), Some(Color::Yellow)]);
        assert!(a.is_seed() && b.is_seed());
    }

    #[test]
    fn test_node_probability_matches_cross() {
        let table = explore(&rose_bases());
        let colors = ColorTable::new();
        let mut memo = LineageMemo::new();
        for g in table.genotypes() {
            let node = ancestors(g, &table, &colors, &mut memo).unwrap();
            match (node.as_ref(), table.parents(g)) {
                (LineageNode::Cross { probability, .. }, Some((p1, p2))) => {
                    let expected = p1.cross_probability(&p2, g);
                    assert!((probability - expected).abs() < 1e-12);
                    assert!(*probability > 0.0);
                }
                (LineageNode::Seed { .. }, None) => assert!(table.is_base(g)),
                (node, parents) => panic!("{} mismatched: {:?} vs {:?}", g, node, parents),
            }
        }
        assert_eq!(memo.len(), table.len());
    }

    #[test]
    fn test_shared_ancestors_are_not_duplicated() {
        let table = explore(&rose_bases());
        let colors = ColorTable::new();
        let mut memo = LineageMemo::new();
        let blue = rose(&[2, 2, 2, 0]);
        let tree = ancestors(&blue, &table, &colors, &mut memo).unwrap();

        let mut nodes = Vec::new();
        walk(&tree, &mut nodes);
        assert!(tree.cross_count() >= 3);
        // More references than distinct genotypes means some subtree recurs.
        let mut by_code: HashMap<String, Arc<LineageNode>> = HashMap::new();
        let mut repeats = 0;
        for node in &nodes {
            match by_code.get(node.code()) {
                Some(first) => {
                    assert!(Arc::ptr_eq(first, node), "{} expanded twice", node.code());
                    repeats += 1;
                }
                None => {
                    by_code.insert(node.code().to_string(), Arc::clone(node));
                }
            }
        }
        assert!(repeats > 0);
    }

    #[test]
    fn test_memo_is_reused_across_targets() {
        let table = explore(&rose_bases());
        let colors = ColorTable::new();
        let mut memo = LineageMemo::new();
        let first = ancestors(&rose(&[2, 2, 2, 0]), &table, &colors, &mut memo).unwrap();
        let cached = memo.len();
        let again = ancestors(&rose(&[2, 2, 2, 0]), &table, &colors, &mut memo).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(memo.len(), cached);
    }

    #[test]
    fn test_unreachable_target() {
        let colors = cosmos_colors();
        let table = explore(&[cosmos(&[0, 0, 0])]);
        let mut memo = LineageMemo::new();
        let err = ancestors(&cosmos(&[2, 2, 2]), &table, &colors, &mut memo).unwrap_err();
        assert!(matches!(err, FloraError::Unreachable(_)));
    }

    /// Solved cosmos table pushed through JSON with some parent links replaced
    fn rewired(table: &BreedingTable, links: &[(usize, serde_json::Value)]) -> serde_json::Value {
        let mut json = serde_json::to_value(table).unwrap();
        for (id, parents) in links {
            json["records"][*id]["parents"] = parents.clone();
        }
        json
    }

    #[test]
    fn test_cyclic_table_fails() {
        let colors = cosmos_colors();
        let table = explore(&colors.filter(None, None, Some(true)));
        let x = table.id_of(&cosmos(&[1, 1, 0])).unwrap();
        let y = table.id_of(&cosmos(&[2, 2, 0])).unwrap();
        let json = rewired(
            &table,
            &[(x, serde_json::json!([y, y])), (y, serde_json::json!([x, 0]))],
        );
        let cyclic: BreedingTable = serde_json::from_value(json).unwrap();

        let mut memo = LineageMemo::new();
        let err = ancestors(&cosmos(&[2, 2, 0]), &cyclic, &colors, &mut memo).unwrap_err();
        assert!(matches!(err, FloraError::CyclicLineage(_)));
        let err = ancestors(&cosmos(&[1, 1, 0]), &cyclic, &colors, &mut memo).unwrap_err();
        assert!(matches!(err, FloraError::CyclicLineage(_)));
        // Seeds outside the loop still resolve.
        assert!(ancestors(&cosmos(&[2, 0, 1]), &cyclic, &colors, &mut memo)
            .unwrap()
            .is_seed());
    }

    #[test]
    fn test_self_parent_fails() {
        let colors = cosmos_colors();
        let table = explore(&colors.filter(None, None, Some(true)));
        let x = table.id_of(&cosmos(&[1, 1, 0])).unwrap();
        let json = rewired(&table, &[(x, serde_json::json!([x, 0]))]);
        let looped: BreedingTable = serde_json::from_value(json).unwrap();

        let mut memo = LineageMemo::new();
        let err = ancestors(&cosmos(&[1, 1, 0]), &looped, &colors, &mut memo).unwrap_err();
        assert!(matches!(err, FloraError::CyclicLineage(_)));
    }

    #[test]
    fn test_dangling_parent_rejected_on_load() {
        let colors = cosmos_colors();
        let table = explore(&colors.filter(None, None, Some(true)));
        let x = table.id_of(&cosmos(&[1, 1, 0])).unwrap();
        let json = rewired(&table, &[(x, serde_json::json!([table.len() + 5, 0]))]);
        let err = serde_json::from_value::<BreedingTable>(json).unwrap_err();
        assert!(err.to_string().contains("links outside the table"));
    }

    #[test]
    fn test_serializes_nested_json() {
        let colors = cosmos_colors();
        let table = explore(&colors.filter(None, None, Some(true)));
        let mut memo = LineageMemo::new();
        let node = ancestors(&cosmos(&[1, 1, 0]), &table, &colors, &mut memo).unwrap();
        let json = serde_json::to_value(node.as_ref()).unwrap();
        assert_eq!(json["kind"], "cross");
        assert_eq!(json["color"], "Orange");
        assert_eq!(json["a"]["kind"], "seed");
        let back: LineageNode = serde_json::from_value(json).unwrap();
        assert_eq!(&back, node.as_ref());
    }
}
