// OrderingGenerator: all valid total orders of a sentence's slots.
//
// Input is a dependency graph over slot indices (edge `u -> v`: slot `u`
// attaches beneath slot `v`) and a list of coordinate groups (slots that
// are mutually interchangeable). The generator
//
// 1. compresses every coordinate group into one node (its anchor),
// 2. collects the terminal nodes of the reduced graph,
// 3. walks backward from each terminal to get every maximal route,
// 4. merges routes into total orders, permuting at every branch point,
// 5. expands each group node into the permutations of its members,
// 6. reverses each order so dependents come before their heads.

mod permute;
mod routes;

pub use permute::{Permutations, factorial, next_permutation};

use hashbrown::HashSet;

use crate::ArrangeError;

// ---------------------------------------------------------------------------
// DependencyGraph
// ---------------------------------------------------------------------------

/// Directed attachment edges over the slots of one sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGraph {
    matrix: Vec<Vec<bool>>,
}

impl DependencyGraph {
    /// A graph over `len` slots with no edges.
    pub fn new(len: usize) -> Self {
        Self {
            matrix: vec![vec![false; len]; len],
        }
    }

    /// A graph over `len` slots with the given `(from, to)` edges.
    pub fn from_edges(len: usize, edges: &[(usize, usize)]) -> Result<Self, ArrangeError> {
        let mut graph = Self::new(len);
        for &(from, to) in edges {
            graph.add_edge(from, to)?;
        }
        Ok(graph)
    }

    /// A graph from a square adjacency matrix.
    pub fn from_matrix(matrix: Vec<Vec<bool>>) -> Result<Self, ArrangeError> {
        let len = matrix.len();
        if let Some(bad) = matrix.iter().position(|row| row.len() != len) {
            return Err(ArrangeError::NotSquare {
                row: bad,
                len: matrix[bad].len(),
                expected: len,
            });
        }
        Ok(Self { matrix })
    }

    /// Record that slot `from` attaches beneath slot `to`.
    pub fn add_edge(&mut self, from: usize, to: usize) -> Result<(), ArrangeError> {
        let len = self.len();
        for slot in [from, to] {
            if slot >= len {
                return Err(ArrangeError::SlotOutOfRange { slot, len });
            }
        }
        self.matrix[from][to] = true;
        Ok(())
    }

    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.matrix
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(false)
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    /// All edges as `(from, to)` pairs, in row-major order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.matrix.iter().enumerate().flat_map(|(u, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &e)| e)
                .map(move |(v, _)| (u, v))
        })
    }
}

// ---------------------------------------------------------------------------
// CoordinateGroup
// ---------------------------------------------------------------------------

/// One member of a coordinate group: a slot, or a nested group that moves
/// as a single block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupMember {
    Slot(usize),
    Group(CoordinateGroup),
}

/// Slots that may appear in any relative order, always as one contiguous
/// block at the group's position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinateGroup {
    members: Vec<GroupMember>,
}

impl CoordinateGroup {
    /// A flat group of slots.
    pub fn new(slots: impl IntoIterator<Item = usize>) -> Self {
        Self {
            members: slots.into_iter().map(GroupMember::Slot).collect(),
        }
    }

    /// A group whose members may themselves be groups.
    pub fn nested(members: Vec<GroupMember>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[GroupMember] {
        &self.members
    }

    /// Every slot in the group, nested members included, in member order.
    pub fn slots(&self) -> Vec<usize> {
        let mut out = Vec::new();
        self.collect_slots(&mut out);
        out
    }

    fn collect_slots(&self, out: &mut Vec<usize>) {
        for m in &self.members {
            match m {
                GroupMember::Slot(s) => out.push(*s),
                GroupMember::Group(g) => g.collect_slots(out),
            }
        }
    }

    /// The slot that stands for the whole group in the reduced graph.
    pub fn anchor(&self) -> Option<usize> {
        self.slots().first().copied()
    }

    /// Every order the group's block can take.
    pub fn expansions(&self) -> Vec<Vec<usize>> {
        let member_orders: Vec<Vec<Vec<usize>>> = self
            .members
            .iter()
            .map(|m| match m {
                GroupMember::Slot(s) => vec![vec![*s]],
                GroupMember::Group(g) => g.expansions(),
            })
            .collect();
        let mut out = Vec::new();
        for perm in Permutations::new(self.members.len()) {
            out.extend(append_each(vec![Vec::new()], &perm, &member_orders));
        }
        out
    }
}

fn append_each(
    mut partials: Vec<Vec<usize>>,
    perm: &[usize],
    member_orders: &[Vec<Vec<usize>>],
) -> Vec<Vec<usize>> {
    for &mi in perm {
        partials = append_pattern(&partials, &member_orders[mi]);
    }
    partials
}

/// Ordered cartesian expansion: every `src` order followed by every `pat`
/// order.
///
/// `[[1, 0]]` with `[[2, 4], [4, 2]]` gives `[[1, 0, 2, 4], [1, 0, 4, 2]]`.
pub fn append_pattern(src: &[Vec<usize>], pat: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut out = Vec::with_capacity(src.len() * pat.len());
    for s in src {
        for p in pat {
            let mut t = Vec::with_capacity(s.len() + p.len());
            t.extend_from_slice(s);
            t.extend_from_slice(p);
            out.push(t);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// SlotOrdering
// ---------------------------------------------------------------------------

/// A total order of a sentence's slots: `as_slice()[i]` is the slot placed
/// at position `i`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotOrdering(Vec<usize>);

impl SlotOrdering {
    pub fn new(order: Vec<usize>) -> Self {
        Self(order)
    }

    /// The literal input order `0..len`.
    pub fn identity(len: usize) -> Self {
        Self((0..len).collect())
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(i, &s)| i == s)
    }

    /// Position of `slot` in this order.
    pub fn position_of(&self, slot: usize) -> Option<usize> {
        self.0.iter().position(|&s| s == slot)
    }

    /// Whether `slot_a` is placed before `slot_b`.
    pub fn precedes(&self, slot_a: usize, slot_b: usize) -> bool {
        match (self.position_of(slot_a), self.position_of(slot_b)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        }
    }
}

impl From<Vec<usize>> for SlotOrdering {
    fn from(order: Vec<usize>) -> Self {
        Self(order)
    }
}

// ---------------------------------------------------------------------------
// OrderingGenerator
// ---------------------------------------------------------------------------

/// Generates the valid total orders of one sentence's slots.
#[derive(Debug)]
pub struct OrderingGenerator<'a> {
    graph: &'a DependencyGraph,
    groups: &'a [CoordinateGroup],
}

/// Result of compressing coordinate groups.
struct Compressed {
    /// Slot standing for each reduced node.
    roots: Vec<usize>,
    /// Group compressed into each reduced node, if any.
    root_group: Vec<Option<usize>>,
    /// Reduced node of each slot.
    root_of: Vec<usize>,
    /// Group of each slot, if any.
    group_of: Vec<Option<usize>>,
}

impl<'a> OrderingGenerator<'a> {
    pub fn new(graph: &'a DependencyGraph, groups: &'a [CoordinateGroup]) -> Self {
        Self { graph, groups }
    }

    /// Compute every valid order, head-last.
    ///
    /// Every returned order is a permutation of `0..len`; for every edge
    /// `u -> v` between slots not in the same group, `u` precedes `v`; the
    /// members of a group form one contiguous block.
    pub fn generate(&self) -> Result<Vec<SlotOrdering>, ArrangeError> {
        let len = self.graph.len();
        if len == 0 {
            return Ok(vec![SlotOrdering::identity(0)]);
        }
        let compressed = self.compress()?;
        let reduced = self.reduce(&compressed);

        let terminals = routes::terminals(&reduced);
        if terminals.is_empty() {
            return Err(ArrangeError::MissingTerminal);
        }
        let found = routes::collect(&reduced, &terminals);
        let root_orders = routes::merge(&reduced, &found.paths, compressed.roots.len());

        let mut seen: HashSet<Vec<usize>> = HashSet::new();
        let mut orders = Vec::new();
        for root_order in root_orders {
            for mut order in self.expand(&compressed, &root_order) {
                order.reverse();
                if self.is_valid(&compressed, &order) && seen.insert(order.clone()) {
                    orders.push(SlotOrdering(order));
                }
            }
        }

        if orders.is_empty() {
            return Err(match found.cycle_at {
                Some(node) => ArrangeError::CycleDetected {
                    slot: compressed.roots[node],
                },
                None => ArrangeError::NoOrderings,
            });
        }
        Ok(orders)
    }

    fn compress(&self) -> Result<Compressed, ArrangeError> {
        let len = self.graph.len();
        let mut group_of: Vec<Option<usize>> = vec![None; len];
        for (gi, group) in self.groups.iter().enumerate() {
            for slot in group.slots() {
                if slot >= len {
                    return Err(ArrangeError::SlotOutOfRange { slot, len });
                }
                if group_of[slot].is_some() {
                    return Err(ArrangeError::OverlappingGroup { slot });
                }
                group_of[slot] = Some(gi);
            }
        }

        let mut roots = Vec::new();
        let mut root_group = Vec::new();
        let mut group_root: Vec<Option<usize>> = vec![None; self.groups.len()];
        let mut root_of = vec![0; len];
        for slot in 0..len {
            match group_of[slot] {
                Some(gi) => {
                    let root = match group_root[gi] {
                        Some(root) => root,
                        None => {
                            let anchor = self.groups[gi].anchor().unwrap_or(slot);
                            roots.push(anchor);
                            root_group.push(Some(gi));
                            group_root[gi] = Some(roots.len() - 1);
                            roots.len() - 1
                        }
                    };
                    root_of[slot] = root;
                }
                None => {
                    roots.push(slot);
                    root_group.push(None);
                    root_of[slot] = roots.len() - 1;
                }
            }
        }
        Ok(Compressed {
            roots,
            root_group,
            root_of,
            group_of,
        })
    }

    /// Adjacency over reduced nodes; edges inside a group disappear.
    fn reduce(&self, c: &Compressed) -> routes::Reduced {
        let n = c.roots.len();
        let mut reduced = vec![vec![false; n]; n];
        for (u, v) in self.graph.edges() {
            let (ru, rv) = (c.root_of[u], c.root_of[v]);
            if ru != rv {
                reduced[ru][rv] = true;
            }
        }
        reduced
    }

    /// Replace group nodes of a reduced order by their member blocks.
    fn expand(&self, c: &Compressed, root_order: &[usize]) -> Vec<Vec<usize>> {
        let mut out: Vec<Vec<usize>> = vec![Vec::new()];
        for &root in root_order {
            match c.root_group[root] {
                Some(gi) => out = append_pattern(&out, &self.groups[gi].expansions()),
                None => {
                    for o in &mut out {
                        o.push(c.roots[root]);
                    }
                }
            }
        }
        out
    }

    fn is_valid(&self, c: &Compressed, order: &[usize]) -> bool {
        let len = self.graph.len();
        if order.len() != len {
            return false;
        }
        let mut position = vec![usize::MAX; len];
        for (i, &slot) in order.iter().enumerate() {
            if slot >= len || position[slot] != usize::MAX {
                return false;
            }
            position[slot] = i;
        }
        self.graph.edges().all(|(u, v)| {
            let same_group = c.group_of[u].is_some() && c.group_of[u] == c.group_of[v];
            same_group || u == v || position[u] < position[v]
        })
    }
}

/// Convenience wrapper around [`OrderingGenerator::generate`].
pub fn generate_orderings(
    graph: &DependencyGraph,
    groups: &[CoordinateGroup],
) -> Result<Vec<SlotOrdering>, ArrangeError> {
    OrderingGenerator::new(graph, groups).generate()
}
