// Backward traversal routes and their merge into total orders.
//
// Operates on the reduced graph, where every coordinate group has been
// compressed into one node. Construction runs end-to-start: a route begins
// at a terminal node (a head with nothing above it) and walks backward to
// the nodes that depend on it.

use hashbrown::HashSet;

use super::permute::Permutations;

/// Adjacency of the reduced graph: `reduced[u][v]` means `u` depends on `v`.
pub(crate) type Reduced = Vec<Vec<bool>>;

/// All maximal backward paths from the terminal nodes.
#[derive(Debug, Default)]
pub(crate) struct Routes {
    pub paths: Vec<Vec<usize>>,
    /// First node found revisited within a single path.
    pub cycle_at: Option<usize>,
}

/// Nodes with no outgoing edge.
pub(crate) fn terminals(reduced: &Reduced) -> Vec<usize> {
    (0..reduced.len())
        .filter(|&u| !(0..reduced.len()).any(|v| v != u && reduced[u][v]))
        .collect()
}

/// Extend every terminal backward along incoming edges.
///
/// A node already on the current path is not re-entered; the branch stops
/// there and the revisit is recorded in `cycle_at`.
pub(crate) fn collect(reduced: &Reduced, terminals: &[usize]) -> Routes {
    let mut routes = Routes::default();
    for &end in terminals {
        let mut path = vec![end];
        extend(reduced, &mut path, &mut routes);
    }
    routes
}

fn extend(reduced: &Reduced, path: &mut Vec<usize>, routes: &mut Routes) {
    let last = path[path.len() - 1];
    let mut extended = false;
    for i in 0..reduced.len() {
        if i == last || !reduced[i][last] {
            continue;
        }
        if path.contains(&i) {
            routes.cycle_at.get_or_insert(i);
            continue;
        }
        path.push(i);
        extend(reduced, path, routes);
        path.pop();
        extended = true;
    }
    if !extended {
        routes.paths.push(path.clone());
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct TrieNode {
    node: usize,
    children: Vec<usize>,
}

/// Prefix tree of routes: routes sharing the same node at the same depth
/// share a trie node, and siblings are the branch points to permute.
struct RouteTrie<'a> {
    reduced: &'a Reduced,
    nodes: Vec<TrieNode>,
    roots: Vec<usize>,
}

impl<'a> RouteTrie<'a> {
    fn build(reduced: &'a Reduced, paths: &[Vec<usize>]) -> Self {
        let mut trie = Self {
            reduced,
            nodes: Vec::new(),
            roots: Vec::new(),
        };
        for path in paths {
            let mut level: Option<usize> = None;
            for &node in path {
                let siblings = match level {
                    None => &trie.roots,
                    Some(parent) => &trie.nodes[parent].children,
                };
                let found = siblings
                    .iter()
                    .copied()
                    .find(|&id| trie.nodes[id].node == node);
                let id = match found {
                    Some(id) => id,
                    None => {
                        let id = trie.nodes.len();
                        trie.nodes.push(TrieNode {
                            node,
                            children: Vec::new(),
                        });
                        match level {
                            None => trie.roots.push(id),
                            Some(parent) => trie.nodes[parent].children.push(id),
                        }
                        id
                    }
                };
                level = Some(id);
            }
        }
        trie
    }

    /// A node can be placed once all of its heads are placed.
    fn placeable(&self, partial: &[usize], node: usize) -> bool {
        !partial.contains(&node)
            && (0..self.reduced.len())
                .filter(|&h| h != node && self.reduced[node][h])
                .all(|h| partial.contains(&h))
    }

    fn orders_from(&self, mut partial: Vec<usize>, id: usize) -> Vec<Vec<usize>> {
        let node = self.nodes[id].node;
        if self.placeable(&partial, node) {
            partial.push(node);
        }
        self.orders_under(partial, &self.nodes[id].children)
    }

    /// Every order of the subtrees in `children`, appended to `base`.
    fn orders_under(&self, base: Vec<usize>, children: &[usize]) -> Vec<Vec<usize>> {
        if children.is_empty() {
            return vec![base];
        }
        let mut out = Vec::new();
        for perm in Permutations::new(children.len()) {
            let mut partials = vec![base.clone()];
            for ci in perm {
                partials = partials
                    .into_iter()
                    .flat_map(|p| self.orders_from(p, children[ci]))
                    .collect();
            }
            out.extend(partials);
        }
        out
    }
}

/// Merge routes into complete head-first orders over `node_count` nodes,
/// deduplicated, in discovery order.
pub(crate) fn merge(reduced: &Reduced, paths: &[Vec<usize>], node_count: usize) -> Vec<Vec<usize>> {
    let trie = RouteTrie::build(reduced, paths);
    let mut seen: HashSet<Vec<usize>> = HashSet::new();
    trie.orders_under(Vec::new(), &trie.roots)
        .into_iter()
        .filter(|order| order.len() == node_count)
        .filter(|order| seen.insert(order.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(n: usize, edges: &[(usize, usize)]) -> Reduced {
        let mut m = vec![vec![false; n]; n];
        for &(u, v) in edges {
            m[u][v] = true;
        }
        m
    }

    #[test]
    fn star_routes_from_single_terminal() {
        let m = matrix(4, &[(0, 3), (1, 3), (2, 3)]);
        assert_eq!(terminals(&m), vec![3]);
        let routes = collect(&m, &[3]);
        assert_eq!(routes.paths, vec![vec![3, 0], vec![3, 1], vec![3, 2]]);
        assert!(routes.cycle_at.is_none());
    }

    #[test]
    fn star_merges_into_all_sibling_orders() {
        let m = matrix(4, &[(0, 3), (1, 3), (2, 3)]);
        let routes = collect(&m, &[3]);
        let orders = merge(&m, &routes.paths, 4);
        assert_eq!(orders.len(), 6);
        assert!(orders.iter().all(|o| o[0] == 3));
    }

    #[test]
    fn chain_has_one_order() {
        let m = matrix(3, &[(0, 1), (1, 2)]);
        let routes = collect(&m, &terminals(&m));
        assert_eq!(routes.paths, vec![vec![2, 1, 0]]);
        assert_eq!(merge(&m, &routes.paths, 3), vec![vec![2, 1, 0]]);
    }

    #[test]
    fn subtrees_stay_contiguous() {
        // 0 -> 1 -> 3, 2 -> 3
        let m = matrix(4, &[(0, 1), (1, 3), (2, 3)]);
        let routes = collect(&m, &terminals(&m));
        let orders = merge(&m, &routes.paths, 4);
        assert_eq!(orders, vec![vec![3, 1, 0, 2], vec![3, 2, 1, 0]]);
    }

    #[test]
    fn shared_dependent_waits_for_all_heads() {
        // 0 depends on both 1 and 2; 1 and 2 depend on 3.
        let m = matrix(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        let routes = collect(&m, &terminals(&m));
        let orders = merge(&m, &routes.paths, 4);
        assert!(!orders.is_empty());
        for o in &orders {
            let pos = |x: usize| o.iter().position(|&y| y == x).unwrap();
            assert!(pos(0) > pos(1));
            assert!(pos(0) > pos(2));
        }
    }

    #[test]
    fn cycle_is_recorded() {
        let m = matrix(3, &[(0, 2), (1, 0), (0, 1)]);
        let routes = collect(&m, &terminals(&m));
        assert!(routes.cycle_at.is_some());
    }

    #[test]
    fn forest_roots_are_permuted() {
        let m = matrix(3, &[]);
        let t = terminals(&m);
        assert_eq!(t, vec![0, 1, 2]);
        let routes = collect(&m, &t);
        assert_eq!(merge(&m, &routes.paths, 3).len(), 6);
    }
}
