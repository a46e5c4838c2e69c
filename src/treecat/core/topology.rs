//! Tree topology over feature vertices: adjacency, edge indexing, centering.
//!
//! Purpose
//! -------
//! Own the edge list of the unrooted spanning tree that couples the latent
//! variables of a tabular model, and derive from it everything directed
//! traversals need: a flat adjacency structure, a bidirectional edge-index
//! map, and a centrally chosen root. All derived structures are rebuilt
//! whenever the edge set changes; no cached direction survives a structure
//! update.
//!
//! Key behaviors
//! -------------
//! - [`TreeTopology::new`] canonicalizes each edge to `(lo, hi)` order,
//!   builds a CSR-style neighbor layout (offsets + sorted neighbor list),
//!   indexes every edge under both endpoint orders, and computes a center
//!   vertex via iterative leaf pruning.
//! - [`TreeTopology::pretty_print`] renders a deterministic, depth-indented
//!   listing of the tree for human inspection.
//!
//! Invariants & assumptions
//! ------------------------
//! - Exactly `V - 1` edges over `V = edges.len() + 1` vertices; the caller
//!   guarantees connectedness and acyclicity. Malformed (cyclic or
//!   disconnected) input is a **documented precondition**, not a validated
//!   error: per-edge range and self-loop checks are performed, but no
//!   connectivity check, and traversal behavior on non-tree input is
//!   undefined.
//! - The stored `(lo, hi)` order of each edge defines the orientation of the
//!   corresponding `M×M` joint probability block elsewhere in the stack.
//!
//! Conventions
//! -----------
//! - The center carries no statistical meaning; it is chosen purely to
//!   balance traversal depth so independent subtrees can advance in
//!   parallel. Any vertex remaining after full leaf-stripping satisfies the
//!   contract; ties are broken deterministically by ascending vertex id.
use crate::treecat::errors::{TreeCatError, TreeCatResult};
use std::collections::{HashMap, VecDeque};

/// Undirected spanning tree over `V` vertices with derived traversal
/// structures.
///
/// Fields are rebuilt as a whole on every (re)construction; the topology is
/// immutable afterwards. Mutation happens by installing a fresh
/// `TreeTopology` (see `TreeCat::set_edges`).
#[derive(Debug, Clone)]
pub struct TreeTopology {
    /// Canonicalized edges, `edges[e] = (lo, hi)` with `lo < hi`.
    edges: Vec<(usize, usize)>,
    num_vertices: usize,
    /// CSR layout: neighbors of `v` are
    /// `neighbor_list[neighbor_offsets[v]..neighbor_offsets[v + 1]]`,
    /// sorted ascending; `neighbor_edge_list` holds the scalar index of the
    /// joining edge at the same position.
    neighbor_offsets: Vec<usize>,
    neighbor_list: Vec<usize>,
    neighbor_edge_list: Vec<usize>,
    /// Maps both `(v1, v2)` and `(v2, v1)` to the edge's scalar index.
    edge_index: HashMap<(usize, usize), usize>,
    root: usize,
}

impl TreeTopology {
    /// Build a topology from a list of undirected edges.
    ///
    /// The vertex count is derived as `edges.len() + 1`; an empty edge list
    /// describes the single-vertex tree.
    ///
    /// # Errors
    /// - [`TreeCatError::SelfLoopEdge`] if any edge joins a vertex to itself.
    /// - [`TreeCatError::VertexOutOfRange`] if any endpoint is `>= V`.
    ///
    /// # Preconditions
    /// The edges must form a tree (connected, acyclic). This is guaranteed by
    /// construction at the call sites (default chain edges, or a spanning
    /// tree returned by structure search) and is not re-checked here.
    pub fn new(edges: Vec<(usize, usize)>) -> TreeCatResult<Self> {
        let num_vertices = edges.len() + 1;

        let mut canonical = Vec::with_capacity(edges.len());
        for &(v1, v2) in &edges {
            if v1 == v2 {
                return Err(TreeCatError::SelfLoopEdge { vertex: v1 });
            }
            for v in [v1, v2] {
                if v >= num_vertices {
                    return Err(TreeCatError::VertexOutOfRange { vertex: v, num_vertices });
                }
            }
            canonical.push((v1.min(v2), v1.max(v2)));
        }

        // Degree counts, then a packed neighbor list filled per vertex.
        let mut degrees = vec![0usize; num_vertices];
        for &(lo, hi) in &canonical {
            degrees[lo] += 1;
            degrees[hi] += 1;
        }
        let mut neighbor_offsets = vec![0usize; num_vertices + 1];
        for v in 0..num_vertices {
            neighbor_offsets[v + 1] = neighbor_offsets[v] + degrees[v];
        }
        let mut cursor = neighbor_offsets[..num_vertices].to_vec();
        let mut neighbor_list = vec![0usize; 2 * canonical.len()];
        let mut neighbor_edge_list = vec![0usize; 2 * canonical.len()];
        for (e, &(lo, hi)) in canonical.iter().enumerate() {
            neighbor_list[cursor[lo]] = hi;
            neighbor_edge_list[cursor[lo]] = e;
            cursor[lo] += 1;
            neighbor_list[cursor[hi]] = lo;
            neighbor_edge_list[cursor[hi]] = e;
            cursor[hi] += 1;
        }
        // Sort each vertex's slice by neighbor id, carrying the edge index
        // along so the two lists stay aligned.
        for v in 0..num_vertices {
            let range = neighbor_offsets[v]..neighbor_offsets[v + 1];
            let mut pairs: Vec<(usize, usize)> = neighbor_list[range.clone()]
                .iter()
                .copied()
                .zip(neighbor_edge_list[range.clone()].iter().copied())
                .collect();
            pairs.sort_unstable();
            for (i, (neighbor, e)) in pairs.into_iter().enumerate() {
                neighbor_list[neighbor_offsets[v] + i] = neighbor;
                neighbor_edge_list[neighbor_offsets[v] + i] = e;
            }
        }

        let mut edge_index = HashMap::with_capacity(2 * canonical.len());
        for (e, &(lo, hi)) in canonical.iter().enumerate() {
            edge_index.insert((lo, hi), e);
            edge_index.insert((hi, lo), e);
        }

        let root = find_center_of_tree(&canonical, num_vertices);

        Ok(TreeTopology {
            edges: canonical,
            num_vertices,
            neighbor_offsets,
            neighbor_list,
            neighbor_edge_list,
            edge_index,
            root,
        })
    }

    /// Default chain topology `0-1, 1-2, ..., (V-2)-(V-1)`.
    pub fn chain(num_vertices: usize) -> TreeCatResult<Self> {
        let edges = (1..num_vertices).map(|v| (v - 1, v)).collect();
        TreeTopology::new(edges)
    }

    /// Canonicalized edge list, `edges()[e] = (lo, hi)` with `lo < hi`.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Neighbors of `v`, sorted ascending.
    ///
    /// # Panics
    /// Panics if `v >= num_vertices` (programming error).
    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.neighbor_list[self.neighbor_offsets[v]..self.neighbor_offsets[v + 1]]
    }

    /// Neighbors of `v` paired with the scalar index of the joining edge,
    /// sorted ascending by neighbor id. Directed traversals use this to
    /// address the per-edge posterior block without a map lookup.
    ///
    /// # Panics
    /// Panics if `v >= num_vertices` (programming error).
    pub fn adjacency(&self, v: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let range = self.neighbor_offsets[v]..self.neighbor_offsets[v + 1];
        self.neighbor_list[range.clone()]
            .iter()
            .copied()
            .zip(self.neighbor_edge_list[range].iter().copied())
    }

    /// Scalar index of the edge joining `v1` and `v2`, in either direction,
    /// or `None` if the pair is not a tree edge.
    pub fn edge_index(&self, v1: usize, v2: usize) -> Option<usize> {
        self.edge_index.get(&(v1, v2)).copied()
    }

    /// The maximally central vertex chosen as traversal root.
    pub fn center(&self) -> usize {
        self.root
    }

    /// Render a depth-indented listing of the tree for diagnostics.
    ///
    /// Starting from `root` (by name) or from [`TreeTopology::center`] when
    /// unspecified, each line holds one feature name indented two spaces per
    /// tree depth. Children are visited in reverse-lexicographic name order
    /// so the output is deterministic.
    ///
    /// # Errors
    /// - [`TreeCatError::NameCountMismatch`] if `names.len() != V`.
    /// - [`TreeCatError::UnknownRoot`] if `root` names no feature.
    pub fn pretty_print(&self, names: &[&str], root: Option<&str>) -> TreeCatResult<String> {
        if names.len() != self.num_vertices {
            return Err(TreeCatError::NameCountMismatch {
                expected: self.num_vertices,
                actual: names.len(),
            });
        }
        let start = match root {
            None => self.root,
            Some(name) => names
                .iter()
                .position(|n| *n == name)
                .ok_or_else(|| TreeCatError::UnknownRoot { name: name.to_string() })?,
        };

        // Iterative DFS with explicit backtracking; lines are emitted on
        // backtrack and reversed so parents print before children.
        let mut stack = vec![start];
        let mut seen = vec![false; self.num_vertices];
        seen[start] = true;
        let mut lines: Vec<(usize, &str)> = Vec::with_capacity(self.num_vertices);
        while let Some(&top) = stack.last() {
            let mut candidates: Vec<usize> =
                self.neighbors(top).iter().copied().filter(|&v| !seen[v]).collect();
            candidates.sort_by(|&a, &b| names[b].cmp(names[a]));
            match candidates.first() {
                Some(&next) => {
                    seen[next] = true;
                    stack.push(next);
                }
                None => {
                    stack.pop();
                    lines.push((stack.len(), names[top]));
                }
            }
        }
        lines.reverse();
        Ok(lines
            .into_iter()
            .map(|(depth, name)| format!("{}{}", "  ".repeat(depth), name))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Find a maximally central vertex of a tree by iterative leaf pruning.
///
/// Current leaves (degree ≤ 1) are stripped in waves, in ascending vertex-id
/// order among ties, until every vertex has been processed; the last vertex
/// processed is returned. Runs in O(V) with a queue of degree-1 vertices.
pub fn find_center_of_tree(edges: &[(usize, usize)], num_vertices: usize) -> usize {
    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); num_vertices];
    for &(v1, v2) in edges {
        neighbors[v1].push(v2);
        neighbors[v2].push(v1);
    }
    for adj in &mut neighbors {
        adj.sort_unstable();
    }
    let mut degree: Vec<usize> = neighbors.iter().map(Vec::len).collect();
    let mut removed = vec![false; num_vertices];
    let mut queue: VecDeque<usize> = (0..num_vertices).filter(|&v| degree[v] <= 1).collect();
    let mut last = 0;
    while let Some(v) = queue.pop_front() {
        removed[v] = true;
        last = v;
        for &v2 in &neighbors[v] {
            if !removed[v2] {
                degree[v2] -= 1;
                if degree[v2] == 1 {
                    queue.push_back(v2);
                }
            }
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction: canonicalization, adjacency, edge indexing, validation.
    // - Centering: path graphs, the 3-vertex scenario, stars, single vertex.
    // - Deterministic pretty-printing with default and named roots.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that edges given in arbitrary endpoint order are canonicalized,
    // adjacency is symmetric and sorted, and the edge index answers in both
    // directions.
    //
    // Given
    // -----
    // - Edges `[(1, 0), (1, 2), (3, 1)]` (a star centered at 1, mixed order).
    //
    // Expect
    // ------
    // - `edges()` stores `(0, 1), (1, 2), (1, 3)`.
    // - `neighbors(1) == [0, 2, 3]`, leaves see only vertex 1.
    // - `edge_index(a, b) == edge_index(b, a)` for every edge; non-edges are
    //   `None`.
    // - `adjacency(v)` pairs every neighbor with the edge index `edge_index`
    //   reports for that pair.
    fn construction_builds_symmetric_indexed_adjacency() {
        let topo = TreeTopology::new(vec![(1, 0), (1, 2), (3, 1)]).unwrap();

        assert_eq!(topo.edges(), &[(0, 1), (1, 2), (1, 3)]);
        assert_eq!(topo.num_vertices(), 4);
        assert_eq!(topo.neighbors(1), &[0, 2, 3]);
        assert_eq!(topo.neighbors(0), &[1]);
        assert_eq!(topo.neighbors(3), &[1]);
        for &(v1, v2) in topo.edges() {
            assert_eq!(topo.edge_index(v1, v2), topo.edge_index(v2, v1));
            assert!(topo.edge_index(v1, v2).is_some());
        }
        assert_eq!(topo.edge_index(0, 3), None);

        for v in 0..topo.num_vertices() {
            let pairs: Vec<(usize, usize)> = topo.adjacency(v).collect();
            assert_eq!(
                pairs.iter().map(|&(n, _)| n).collect::<Vec<_>>(),
                topo.neighbors(v)
            );
            for (neighbor, e) in pairs {
                assert_eq!(topo.edge_index(v, neighbor), Some(e));
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Ensure self-loops and out-of-range endpoints are rejected.
    //
    // Given
    // -----
    // - `[(0, 0)]` and `[(0, 5)]` as candidate edge lists.
    //
    // Expect
    // ------
    // - `SelfLoopEdge { vertex: 0 }` and `VertexOutOfRange { vertex: 5, .. }`.
    fn construction_rejects_self_loops_and_range_violations() {
        assert_eq!(
            TreeTopology::new(vec![(0, 0)]).unwrap_err(),
            TreeCatError::SelfLoopEdge { vertex: 0 }
        );
        assert_eq!(
            TreeTopology::new(vec![(0, 5)]).unwrap_err(),
            TreeCatError::VertexOutOfRange { vertex: 5, num_vertices: 2 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Check the worked scenario: for the path `0-1-2`, the only degree-2
    // vertex must be the center.
    //
    // Given
    // -----
    // - Edges `[(0, 1), (1, 2)]`.
    //
    // Expect
    // ------
    // - `center() == 1`.
    fn center_of_three_vertex_path_is_middle_vertex() {
        let topo = TreeTopology::new(vec![(0, 1), (1, 2)]).unwrap();
        assert_eq!(topo.center(), 1);
    }

    #[test]
    // Purpose
    // -------
    // Verify that path graphs of every length up to 9 center at one of the
    // two middle positions.
    //
    // Given
    // -----
    // - Chain topologies over `V = 1..=9` vertices.
    //
    // Expect
    // ------
    // - `center()` is `(V - 1) / 2` or `V / 2`.
    fn center_of_path_graph_is_a_middle_vertex() {
        for v in 1..=9usize {
            let topo = TreeTopology::chain(v).unwrap();
            let center = topo.center();
            assert!(
                center == (v - 1) / 2 || center == v / 2,
                "path of {v} vertices centered at {center}"
            );
        }
    }

    #[test]
    // Purpose
    // -------
    // Ensure leaf-stripping visits all vertices exactly once: the hub of a
    // star survives every pruning wave and becomes the center.
    //
    // Given
    // -----
    // - A star with hub 3 and leaves 0, 1, 2, 4, 5.
    //
    // Expect
    // ------
    // - `center() == 3`.
    fn center_of_star_is_hub() {
        let topo = TreeTopology::new(vec![(3, 0), (3, 1), (3, 2), (3, 4), (3, 5)]).unwrap();
        assert_eq!(topo.center(), 3);
    }

    #[test]
    // Purpose
    // -------
    // Check the degenerate single-vertex tree.
    //
    // Given
    // -----
    // - An empty edge list.
    //
    // Expect
    // ------
    // - One vertex, no neighbors, center 0.
    fn single_vertex_tree_is_supported() {
        let topo = TreeTopology::new(vec![]).unwrap();
        assert_eq!(topo.num_vertices(), 1);
        assert!(topo.neighbors(0).is_empty());
        assert_eq!(topo.center(), 0);
    }

    #[test]
    // Purpose
    // -------
    // Verify the deterministic depth-indented rendering, including
    // reverse-lexicographic ordering among siblings and an explicit root.
    //
    // Given
    // -----
    // - Star with hub `b` (vertex 1) and leaves `a`, `c`, `d`.
    //
    // Expect
    // ------
    // - Default rendering roots at the hub; siblings are explored in reverse
    //   name order, which after the post-order reversal lists them
    //   ascending, each leaf indented one level.
    // - Rooting at leaf `a` puts `b` at depth 1 and the other leaves at 2.
    // - An unknown root name errors.
    fn pretty_print_is_deterministic_and_indented() {
        let topo = TreeTopology::new(vec![(1, 0), (1, 2), (1, 3)]).unwrap();
        let names = ["a", "b", "c", "d"];

        let rendered = topo.pretty_print(&names, None).unwrap();
        assert_eq!(rendered, "b\n  a\n  c\n  d");

        let rendered = topo.pretty_print(&names, Some("a")).unwrap();
        assert_eq!(rendered, "a\n  b\n    c\n    d");

        assert_eq!(
            topo.pretty_print(&names, Some("nope")).unwrap_err(),
            TreeCatError::UnknownRoot { name: "nope".to_string() }
        );
        assert_eq!(
            topo.pretty_print(&names[..2], None).unwrap_err(),
            TreeCatError::NameCountMismatch { expected: 4, actual: 2 }
        );
    }
}
