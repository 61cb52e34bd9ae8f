//! Single-source shortest path with a front set.
//!
//! A Dijkstra variant tuned for large implicit graphs: vertices enter
//! the priority queue lazily, as they are first reached, instead of all
//! being pushed up front. Search state lives in a sparse map keyed by
//! touched vertex id, so memory scales with the region the search
//! actually explores rather than the full vertex count.
//!
//! The heap is a binary min-heap over (distance, vertex id) with a
//! deterministic tie-break: equal distances pop the lowest vertex id
//! first. Decrease-key is realized as lazy deletion: an improved
//! relaxation pushes a fresh entry and stale entries are skipped on
//! pop, which has the same observable semantics.
//!
//! The solver is generic over [`GraphAdjacency`] and [`CostModel`]; it
//! knows nothing about images.

use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};

use crate::cost::CostModel;
use crate::grid::GridGraph;
use crate::types::{GeodesicError, VertexId};

/// Neighbor source for the solver.
pub trait GraphAdjacency {
    /// Total number of vertices; ids range over `0..vertex_count()`.
    fn vertex_count(&self) -> usize;

    /// The neighbors of `u`. Order must be deterministic: the solver's
    /// tie-breaking (and therefore its output) depends on it.
    fn neighbors(&self, u: VertexId) -> &[VertexId];
}

impl GraphAdjacency for GridGraph {
    fn vertex_count(&self) -> usize {
        Self::vertex_count(self)
    }

    fn neighbors(&self, u: VertexId) -> &[VertexId] {
        Self::neighbors(self, u)
    }
}

/// Per-vertex search state, allocated only for touched vertices.
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    dist: f64,
    predecessor: Option<VertexId>,
    finalized: bool,
}

/// Heap entry ordered min-by-distance, then min-by-vertex-id.
#[derive(Debug, Clone, Copy)]
struct FrontEntry {
    dist: f64,
    vertex: VertexId,
}

impl PartialEq for FrontEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for FrontEntry {}

impl Ord for FrontEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reversed so the max-heap pops the smallest distance; ties go
        // to the lowest vertex id for deterministic output.
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for FrontEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Counters describing the work a search performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Vertices extracted from the front and finalized.
    pub vertices_finalized: usize,
    /// Relaxation attempts across all finalized vertices.
    pub edges_relaxed: usize,
    /// Peak heap size, counting superseded entries awaiting lazy
    /// deletion.
    pub front_peak: usize,
}

/// State of a finished search: distances and predecessors for every
/// touched vertex.
#[derive(Debug, Clone)]
pub struct SearchResult {
    reached: bool,
    nodes: HashMap<VertexId, SearchNode>,
    stats: SearchStats,
}

impl SearchResult {
    /// Whether the end vertex was finalized.
    #[must_use]
    pub const fn reached_end(&self) -> bool {
        self.reached
    }

    /// Final distance of a vertex, when it was touched by the search.
    #[must_use]
    pub fn distance(&self, vertex: VertexId) -> Option<f64> {
        self.nodes.get(&vertex).map(|n| n.dist)
    }

    /// Predecessor of a vertex on its current-best path, when one was
    /// assigned.
    #[must_use]
    pub fn predecessor(&self, vertex: VertexId) -> Option<VertexId> {
        self.nodes.get(&vertex).and_then(|n| n.predecessor)
    }

    /// Number of vertices the search touched.
    #[must_use]
    pub fn touched(&self) -> usize {
        self.nodes.len()
    }

    /// Work counters.
    #[must_use]
    pub const fn stats(&self) -> &SearchStats {
        &self.stats
    }
}

/// Run a single-source search from `start` until `end` is finalized or
/// the front set empties.
///
/// Edge cost during relaxation is `costs.static_cost(u, v) +
/// costs.dynamic_cost(predecessor(u), u, v)`. A non-finite edge cost is
/// treated as no edge. An exhausted front is a normal result, not an
/// error; check [`SearchResult::reached_end`].
///
/// # Errors
///
/// Returns [`GeodesicError::VertexOutOfRange`] when `start` or `end`
/// is not a vertex of the graph. This is checked before any search
/// work happens.
pub fn shortest_path<G, C>(
    graph: &G,
    costs: &C,
    start: VertexId,
    end: VertexId,
) -> Result<SearchResult, GeodesicError>
where
    G: GraphAdjacency + ?Sized,
    C: CostModel + ?Sized,
{
    let vertex_count = graph.vertex_count();
    for vertex in [start, end] {
        if vertex >= vertex_count {
            return Err(GeodesicError::VertexOutOfRange {
                vertex,
                vertex_count,
            });
        }
    }

    let mut nodes: HashMap<VertexId, SearchNode> = HashMap::new();
    let mut heap: BinaryHeap<FrontEntry> = BinaryHeap::new();
    let mut stats = SearchStats::default();

    nodes.insert(
        start,
        SearchNode {
            dist: 0.0,
            predecessor: None,
            finalized: false,
        },
    );
    heap.push(FrontEntry {
        dist: 0.0,
        vertex: start,
    });
    stats.front_peak = 1;

    let mut reached = false;
    while let Some(FrontEntry { dist, vertex: u }) = heap.pop() {
        let Some(&node) = nodes.get(&u) else {
            continue;
        };
        if node.finalized || dist > node.dist {
            // Superseded by an earlier finalization or a cheaper entry.
            continue;
        }
        if let Some(n) = nodes.get_mut(&u) {
            n.finalized = true;
        }
        stats.vertices_finalized += 1;

        if u == end {
            reached = true;
            break;
        }

        for &v in graph.neighbors(u) {
            if nodes.get(&v).is_some_and(|n| n.finalized) {
                continue;
            }
            let cost = costs.static_cost(u, v) + costs.dynamic_cost(node.predecessor, u, v);
            stats.edges_relaxed += 1;
            if !cost.is_finite() {
                continue;
            }
            let candidate = dist + cost;
            match nodes.entry(v) {
                Entry::Occupied(mut occupied) => {
                    let n = occupied.get_mut();
                    if candidate < n.dist {
                        n.dist = candidate;
                        n.predecessor = Some(u);
                        heap.push(FrontEntry {
                            dist: candidate,
                            vertex: v,
                        });
                    }
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(SearchNode {
                        dist: candidate,
                        predecessor: Some(u),
                        finalized: false,
                    });
                    heap.push(FrontEntry {
                        dist: candidate,
                        vertex: v,
                    });
                }
            }
        }
        stats.front_peak = stats.front_peak.max(heap.len());
    }

    Ok(SearchResult {
        reached,
        nodes,
        stats,
    })
}

/// Assemble a `SearchResult` from raw `(vertex, distance, predecessor)`
/// rows, for exercising reconstruction against states a correct search
/// cannot produce.
#[cfg(test)]
pub(crate) fn fabricated_result(
    reached: bool,
    entries: &[(VertexId, f64, Option<VertexId>)],
) -> SearchResult {
    let nodes = entries
        .iter()
        .map(|&(vertex, dist, predecessor)| {
            (
                vertex,
                SearchNode {
                    dist,
                    predecessor,
                    finalized: true,
                },
            )
        })
        .collect();
    SearchResult {
        reached,
        nodes,
        stats: SearchStats::default(),
    }
}
