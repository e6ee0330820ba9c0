//! Read-only node/edge projection of the sort lattice for visualization.
//!
//! Nodes are the sorts in index order. Each node carries a `group`: the
//! 1-based id of its connected component under subsumption, so a front end
//! can colour separate hierarchies apart. Edges are the *asserted* edges,
//! not the closure:
//!
//! - one directed `subsumption` edge per `a ⊑ b`, weight `1.0`;
//! - one `similarity` edge per undirected pair, source = lower sort index.
//!
//! Edges whose weight is below the threshold are omitted.

use crate::lattice::SortLattice;

/// Kind of an exported edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum EdgeKind {
    /// Crisp `source ⊑ target`.
    Subsumption,
    /// Symmetric fuzzy resemblance.
    Similarity,
}

/// An exported sort.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphNode {
    /// Sort name.
    pub id: String,
    /// Subsumption component id, starting at 1.
    pub group: usize,
}

/// An exported edge.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphEdge {
    /// Source sort.
    pub source: String,
    /// Target sort.
    pub target: String,
    /// Edge kind.
    pub kind: EdgeKind,
    /// Edge degree.
    pub weight: f64,
}

/// The full projection.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphData {
    /// All sorts.
    pub nodes: Vec<GraphNode>,
    /// Edges at or above the threshold.
    pub edges: Vec<GraphEdge>,
}

/// Projects `lattice` into nodes and edges, dropping edges below `threshold`.
#[must_use]
pub fn export_graph(lattice: &SortLattice, threshold: f64) -> GraphData {
    let groups = subsumption_components(lattice);
    let nodes = lattice
        .sorts()
        .iter()
        .zip(groups)
        .map(|(id, group)| GraphNode {
            id: id.clone(),
            group,
        })
        .collect();

    let crisp = lattice
        .subsumptions()
        .filter(|_| 1.0 >= threshold)
        .map(|(a, b)| edge(a, b, EdgeKind::Subsumption, 1.0));

    let fuzzy = lattice
        .similarities()
        .filter(|&(a, b, d)| {
            lattice.index_of(a) < lattice.index_of(b) && d >= threshold
        })
        .map(|(a, b, d)| edge(a, b, EdgeKind::Similarity, d));

    GraphData {
        nodes,
        edges: crisp.chain(fuzzy).collect(),
    }
}

fn edge(source: &str, target: &str, kind: EdgeKind, weight: f64) -> GraphEdge {
    GraphEdge {
        source: source.to_owned(),
        target: target.to_owned(),
        kind,
        weight,
    }
}

/// Union-find over subsumption edges, relabelled 1.. in first-seen order.
fn subsumption_components(lattice: &SortLattice) -> Vec<usize> {
    fn find(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    let n = lattice.len();
    let mut parent: Vec<usize> = (0..n).collect();
    for (a, b) in lattice.subsumption_indices() {
        let (ra, rb) = (find(&mut parent, a), find(&mut parent, b));
        if ra != rb {
            parent[ra.max(rb)] = ra.min(rb);
        }
    }

    let mut labels = vec![0usize; n];
    let mut next = 0;
    (0..n)
        .map(|i| {
            let root = find(&mut parent, i);
            if labels[root] == 0 {
                next += 1;
                labels[root] = next;
            }
            labels[root]
        })
        .collect()
}
