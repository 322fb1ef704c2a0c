//! The adaptive code tree.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Besides the
//! parent/child links every node carries an `order` rank: rank 0 is the root and
//! ranks grow away from it, so listing nodes by rank gives non-increasing weights
//! with siblings adjacent (the sibling property). Equal-weight nodes therefore form
//! a contiguous "block" in rank order, and the first node of a block is its leader.
//!
//! Updating for an occurrence walks from the symbol's leaf to the root. At each
//! step the node is first swapped with the leader of its block (never with its own
//! parent), then its weight is incremented. Swapping first keeps the rank order
//! valid after the increment.

use bitvec::prelude::*;

use crate::cs::hashing::ChainedHashMap;

/// Index of a node in the tree's arena.
///
/// Ids are only handed out by the [`AdaptiveTree`] that owns the node and are
/// meaningless for any other tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Inner node; `children[0]` is the 0-branch, `children[1]` the 1-branch.
    Internal { children: [NodeId; 2] },
    /// A symbol that has occurred at least once.
    Leaf(u8),
    /// The not-yet-transmitted leaf.
    Nyt,
}

/// A single tree node.
#[derive(Debug, Clone)]
pub struct Node {
    weight: u64,
    kind: NodeKind,
    parent: Option<NodeId>,
    order: usize,
}

impl Node {
    /// Occurrence count of a leaf, or the sum of the children's weights.
    pub fn weight(&self) -> u64 {
        self.weight
    }

    /// Internal node, symbol leaf or NYT.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// `None` only for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Rank in the sibling ordering; the root has rank 0.
    pub fn order(&self) -> usize {
        self.order
    }

    /// `[0-branch, 1-branch]` of an internal node.
    pub fn children(&self) -> Option<[NodeId; 2]> {
        match self.kind {
            NodeKind::Internal { children } => Some(children),
            _ => None,
        }
    }

    /// Symbol of a leaf; `None` for internal nodes and the NYT.
    pub fn symbol(&self) -> Option<u8> {
        match self.kind {
            NodeKind::Leaf(symbol) => Some(symbol),
            _ => None,
        }
    }

    /// True for symbol leaves and the NYT.
    pub fn is_leaf(&self) -> bool {
        !matches!(self.kind, NodeKind::Internal { .. })
    }
}

/// Adaptive Huffman tree over the byte alphabet.
///
/// The tree starts as a single NYT node and only grows: every first occurrence of a
/// byte splits the NYT node into an internal node with a fresh NYT on the 0-branch
/// and the new symbol's leaf on the 1-branch.
#[derive(Debug, Clone)]
pub struct AdaptiveTree {
    nodes: Vec<Node>,
    /// `ranks[k]` is the node whose order is `k`.
    ranks: Vec<NodeId>,
    root: NodeId,
    nyt: NodeId,
    leaves: ChainedHashMap<u8, NodeId>,
}

impl Default for AdaptiveTree {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveTree {
    /// Creates a tree holding only the NYT node.
    pub fn new() -> Self {
        let root = NodeId(0);
        Self {
            nodes: vec![Node {
                weight: 0,
                kind: NodeKind::Nyt,
                parent: None,
                order: 0,
            }],
            ranks: vec![root],
            root,
            nyt: root,
            leaves: ChainedHashMap::new(),
        }
    }

    /// The root; equal to [`AdaptiveTree::nyt`] until the first symbol.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The current not-yet-transmitted leaf.
    pub fn nyt(&self) -> NodeId {
        self.nyt
    }

    /// The node behind `id`.
    ///
    /// Panics if `id` was not produced by this tree; see [`AdaptiveTree::get`].
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// The node behind `id`, or `None` if this tree has no such node.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Total number of nodes, NYT included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds at least the NYT node.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of distinct symbols seen so far.
    pub fn symbol_count(&self) -> usize {
        self.leaves.len()
    }

    /// Leaf of `symbol`, or `None` if it has not occurred yet.
    pub fn leaf_of(&self, symbol: u8) -> Option<NodeId> {
        self.leaves.get(&symbol).copied()
    }

    /// Follows the `bit` branch of an internal node. `None` for leaves and for
    /// ids this tree does not know.
    pub fn child(&self, id: NodeId, bit: bool) -> Option<NodeId> {
        self.get(id)?
            .children()
            .map(|children| children[bit as usize])
    }

    /// Prefix code of `id`, root-to-node, `false` for the 0-branch.
    pub fn path_of(&self, id: NodeId) -> BitVec<u8, Msb0> {
        let mut path = BitVec::new();
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            path.push(self.child_slot(parent, current) == 1);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Records one occurrence of `symbol` and returns its leaf.
    pub fn apply_occurrence(&mut self, symbol: u8) -> NodeId {
        let leaf = match self.leaf_of(symbol) {
            Some(leaf) => leaf,
            None => self.split_nyt(symbol),
        };

        let mut current = Some(leaf);
        while let Some(id) = current {
            let leader = self.block_leader(id);
            if leader != id {
                log::trace!("swapping {:?} with block leader {:?}", id, leader);
                self.swap(id, leader);
            }
            self.nodes[id.0].weight += 1;
            current = self.node(id).parent;
        }
        leaf
    }

    /// Turns the NYT node into an internal node with a new NYT and a new leaf for
    /// `symbol` below it. Weights are left at zero for the increment pass.
    fn split_nyt(&mut self, symbol: u8) -> NodeId {
        let parent = self.nyt;
        let base = self.nodes.len();
        let leaf = NodeId(base);
        let nyt = NodeId(base + 1);

        self.nodes.push(Node {
            weight: 0,
            kind: NodeKind::Leaf(symbol),
            parent: Some(parent),
            order: base,
        });
        self.nodes.push(Node {
            weight: 0,
            kind: NodeKind::Nyt,
            parent: Some(parent),
            order: base + 1,
        });
        self.ranks.push(leaf);
        self.ranks.push(nyt);

        self.nodes[parent.0].kind = NodeKind::Internal {
            children: [nyt, leaf],
        };
        self.nyt = nyt;
        self.leaves.insert(symbol, leaf);
        log::trace!("first occurrence of {:#04x}: leaf {:?}", symbol, leaf);
        leaf
    }

    /// First node in `id`'s equal-weight block, skipping `id`'s parent.
    ///
    /// A parent can only share its child's weight when the other child is the NYT,
    /// in which case the next node in rank order still belongs to the block.
    fn block_leader(&self, id: NodeId) -> NodeId {
        let node = self.node(id);
        let mut k = node.order;
        while k > 0 && self.node(self.ranks[k - 1]).weight == node.weight {
            k -= 1;
        }
        let leader = self.ranks[k];
        if Some(leader) == node.parent {
            self.ranks[k + 1]
        } else {
            leader
        }
    }

    fn child_slot(&self, parent: NodeId, child: NodeId) -> usize {
        match self.node(parent).children() {
            Some([zero, _]) if zero == child => 0,
            _ => 1,
        }
    }

    fn set_child(&mut self, parent: NodeId, slot: usize, child: NodeId) {
        if let NodeKind::Internal { children } = &mut self.nodes[parent.0].kind {
            children[slot] = child;
        }
    }

    /// Exchanges the tree positions of `a` and `b`. Weight and kind stay with the
    /// moving node. Neither may be an ancestor of the other.
    fn swap(&mut self, a: NodeId, b: NodeId) {
        debug_assert!(!self.is_ancestor(a, b) && !self.is_ancestor(b, a));
        let (Some(pa), Some(pb)) = (self.node(a).parent, self.node(b).parent) else {
            return;
        };
        let slot_a = self.child_slot(pa, a);
        let slot_b = self.child_slot(pb, b);
        self.set_child(pa, slot_a, b);
        self.set_child(pb, slot_b, a);
        self.nodes[a.0].parent = Some(pb);
        self.nodes[b.0].parent = Some(pa);

        let (oa, ob) = (self.node(a).order, self.node(b).order);
        self.nodes[a.0].order = ob;
        self.nodes[b.0].order = oa;
        self.ranks[oa] = b;
        self.ranks[ob] = a;
    }

    fn is_ancestor(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        while let Some(parent) = self.node(id).parent {
            if parent == ancestor {
                return true;
            }
            id = parent;
        }
        false
    }

    /// Verifies every structural invariant of the tree.
    ///
    /// Checks the sibling property (weights non-increasing in rank order, siblings
    /// adjacent, parents ranked before children), weight sums, link consistency,
    /// the symbol index, and that the single NYT node has weight 0 and the highest
    /// rank of all weight-0 nodes.
    pub fn check_invariants(&self) -> bool {
        let root = self.node(self.root);
        if root.parent.is_some() || root.order != 0 {
            return false;
        }
        if self.ranks.len() != self.nodes.len() {
            return false;
        }

        for (k, &id) in self.ranks.iter().enumerate() {
            if self.node(id).order != k {
                return false;
            }
            if k > 0 && self.node(self.ranks[k - 1]).weight < self.node(id).weight {
                return false;
            }
        }

        let mut nyt_count = 0;
        for (i, node) in self.nodes.iter().enumerate() {
            let id = NodeId(i);
            if let Some(parent) = node.parent {
                let p = self.node(parent);
                if p.weight < node.weight || p.order >= node.order {
                    return false;
                }
                if !matches!(p.children(), Some(children) if children.contains(&id)) {
                    return false;
                }
            } else if id != self.root {
                return false;
            }
            match node.kind {
                NodeKind::Internal { children: [zero, one] } => {
                    let (z, o) = (self.node(zero), self.node(one));
                    if z.parent != Some(id) || o.parent != Some(id) {
                        return false;
                    }
                    if z.weight + o.weight != node.weight || z.order.abs_diff(o.order) != 1 {
                        return false;
                    }
                }
                NodeKind::Leaf(symbol) => {
                    if self.leaf_of(symbol) != Some(id) {
                        return false;
                    }
                }
                NodeKind::Nyt => {
                    nyt_count += 1;
                    if id != self.nyt || node.weight != 0 {
                        return false;
                    }
                }
            }
        }

        // NYT is the only weight-0 node once any symbol has been seen, so it ranks last
        let nyt_last = self.ranks.last() == Some(&self.nyt);
        nyt_count == 1 && nyt_last && self.leaves.len() == (self.nodes.len() - 1) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    fn bits(path: &BitSlice<u8, Msb0>) -> String {
        path.iter().map(|b| if *b { '1' } else { '0' }).collect()
    }

    #[test]
    fn test_initial_tree_is_single_nyt() {
        let tree = AdaptiveTree::new();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), tree.nyt());
        assert_eq!(tree.node(tree.root()).kind(), NodeKind::Nyt);
        assert!(tree.path_of(tree.nyt()).is_empty());
        assert_eq!(tree.symbol_count(), 0);
        assert!(tree.check_invariants());
    }

    #[test]
    fn test_first_occurrence_splits_root() {
        let mut tree = AdaptiveTree::new();
        let leaf = tree.apply_occurrence(b'A');

        assert_eq!(tree.len(), 3);
        let root = tree.node(tree.root());
        assert_eq!(root.weight(), 1);
        assert_eq!(root.children(), Some([tree.nyt(), leaf]));
        assert_eq!(tree.node(leaf).weight(), 1);
        assert_eq!(tree.node(leaf).symbol(), Some(b'A'));
        assert_eq!(tree.node(tree.nyt()).weight(), 0);
        assert_eq!(bits(&tree.path_of(leaf)), "1");
        assert_eq!(bits(&tree.path_of(tree.nyt())), "0");
        assert!(tree.check_invariants());
    }

    #[test]
    fn test_repeat_occurrence_reuses_leaf() {
        let mut tree = AdaptiveTree::new();
        let first = tree.apply_occurrence(7);
        let second = tree.apply_occurrence(7);
        assert_eq!(first, second);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.node(first).weight(), 2);
        assert_eq!(tree.node(tree.root()).weight(), 2);
        assert!(tree.check_invariants());
    }

    #[test]
    fn test_paths_for_aaba() {
        let mut tree = AdaptiveTree::new();
        let a = tree.apply_occurrence(b'A');
        tree.apply_occurrence(b'A');
        let b = tree.apply_occurrence(b'B');

        assert_eq!(bits(&tree.path_of(a)), "1");
        assert_eq!(bits(&tree.path_of(b)), "01");
        assert_eq!(bits(&tree.path_of(tree.nyt())), "00");

        tree.apply_occurrence(b'A');
        assert_eq!(tree.node(a).weight(), 3);
        assert_eq!(tree.node(tree.root()).weight(), 4);
        assert!(tree.check_invariants());
    }

    #[test]
    fn test_swap_promotes_frequent_symbol() {
        let mut tree = AdaptiveTree::new();
        for &s in b"abc" {
            tree.apply_occurrence(s);
        }
        let c = tree.leaf_of(b'c').unwrap();
        let depth_before = tree.path_of(c).len();
        for _ in 0..5 {
            tree.apply_occurrence(b'c');
            assert!(tree.check_invariants());
        }
        assert!(tree.path_of(c).len() < depth_before);
        assert_eq!(tree.path_of(c).len(), 1);
    }

    #[test]
    fn test_walk_from_root_reaches_leaf() {
        let mut tree = AdaptiveTree::new();
        for &s in b"mississippi river" {
            tree.apply_occurrence(s);
        }
        for &s in b"misp rve" {
            let leaf = tree.leaf_of(s).unwrap();
            let mut node = tree.root();
            for bit in tree.path_of(leaf).iter() {
                node = tree.child(node, *bit).unwrap();
            }
            assert_eq!(node, leaf);
        }
        assert_eq!(tree.leaf_of(b'z'), None);
    }

    #[test]
    fn test_invariants_hold_after_every_update() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
        let mut tree = AdaptiveTree::new();
        for _ in 0..3000 {
            // skewed alphabet so blocks of equal weight keep forming
            let symbol = if rng.gen_bool(0.7) {
                rng.gen_range(0..8u8)
            } else {
                rng.gen()
            };
            tree.apply_occurrence(symbol);
            assert!(tree.check_invariants());
        }
        assert_eq!(tree.node(tree.root()).weight(), 3000);
        assert_eq!(tree.len(), 2 * tree.symbol_count() + 1);
    }

    #[test]
    fn test_foreign_ids_are_rejected() {
        let mut big = AdaptiveTree::new();
        for &s in b"abcdef" {
            big.apply_occurrence(s);
        }
        let far = big.leaf_of(b'f').unwrap();
        let mut small = AdaptiveTree::new();
        small.apply_occurrence(b'a');

        assert!(far.index() >= small.len());
        assert!(small.get(far).is_none());
        assert_eq!(small.child(far, true), None);
        assert_eq!(small.child(small.root(), true), small.leaf_of(b'a'));
        assert_eq!(small.child(small.leaf_of(b'a').unwrap(), false), None);
    }

    #[test]
    fn test_all_bytes() {
        let mut tree = AdaptiveTree::new();
        for s in 0..=255u8 {
            tree.apply_occurrence(s);
        }
        assert_eq!(tree.symbol_count(), 256);
        assert_eq!(tree.len(), 513);
        assert!(tree.check_invariants());
        let nyt_count = (0..tree.len())
            .filter(|&i| tree.node(NodeId(i)).kind() == NodeKind::Nyt)
            .count();
        assert_eq!(nyt_count, 1);
    }
}
