//! Grid adjacency: the implicit pixel graph and its static-cost cache.
//!
//! Each passable pixel of a planar [`CostImage`] is a vertex; edges run
//! to its in-plane neighbors (8-connected by default, 4-connected
//! selectable). Adjacency is stored in compressed sparse rows with one
//! cached static cost per edge.
//!
//! The cache carries a [`revision stamp`](CacheUpdate) instead of a
//! dirty flag: the image's version counter plus the bit patterns of the
//! two static weights and the connectivity. [`GridGraph::ensure`]
//! compares stamps and does the least work that restores validity:
//! nothing, an in-place cost refresh (static weights changed, topology
//! intact), or a full rebuild (image or connectivity changed, since a
//! mutation may flip pixels between passable and impassable).

use serde::{Deserialize, Serialize};

use crate::cost::{ScalarNormalizer, static_edge_cost};
use crate::image::CostImage;
use crate::types::{Connectivity, CostWeights, GeodesicError, VertexId};

/// In-plane neighbor offsets `(da, db)`, emitted in scan order so
/// adjacency rows are deterministic.
const OFFSETS_8: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];
const OFFSETS_4: [(isize, isize); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

/// Stamp identifying the inputs the static-cost cache was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CostRevision {
    image_version: u64,
    image_weight_bits: u64,
    edge_length_weight_bits: u64,
    connectivity: Connectivity,
}

impl CostRevision {
    fn current(image: &CostImage, weights: &CostWeights, connectivity: Connectivity) -> Self {
        Self {
            image_version: image.version(),
            image_weight_bits: weights.image_weight.to_bits(),
            edge_length_weight_bits: weights.edge_length_weight.to_bits(),
            connectivity,
        }
    }

    /// Whether only the static weights differ between the stamps.
    fn same_topology(&self, other: &Self) -> bool {
        self.image_version == other.image_version && self.connectivity == other.connectivity
    }
}

/// What [`GridGraph::ensure`] had to do to restore cache validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheUpdate {
    /// Stamp matched; adjacency and static costs reused as-is.
    Reused,
    /// Static weights changed; costs recomputed over unchanged topology.
    RefreshedCosts,
    /// Image data or connectivity changed; adjacency rebuilt from scratch.
    Rebuilt,
}

/// The implicit pixel graph with its per-edge static-cost cache.
#[derive(Debug, Clone)]
pub struct GridGraph {
    vertex_count: usize,
    /// CSR row boundaries; the edges of vertex `u` are
    /// `targets[offsets[u]..offsets[u + 1]]`.
    offsets: Vec<usize>,
    targets: Vec<VertexId>,
    static_costs: Vec<f64>,
    normalizer: ScalarNormalizer,
    pixel_size: f64,
    revision: CostRevision,
}

impl GridGraph {
    /// Build the adjacency and populate the static-cost cache.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::NotPlanar`] unless the image is a
    /// single 2D slice. Zero-point images are rejected when the
    /// [`CostImage`] is constructed.
    pub fn build(
        image: &CostImage,
        weights: &CostWeights,
        connectivity: Connectivity,
    ) -> Result<Self, GeodesicError> {
        let plane = image.slice_plane()?;
        let pixel_size = image.pixel_size()?;
        let normalizer = ScalarNormalizer::new(image.scalar_range());
        let vertex_count = image.vertex_count();

        let neighbor_offsets: &[(isize, isize)] = match connectivity {
            Connectivity::Four => &OFFSETS_4,
            Connectivity::Eight => &OFFSETS_8,
        };

        let mut offsets = Vec::with_capacity(vertex_count + 1);
        offsets.push(0);
        let mut targets = Vec::new();
        let mut static_costs = Vec::new();

        for u in 0..vertex_count {
            if image.is_passable(u) {
                let ia = (u / plane.stride_a) % plane.extent_a;
                let ib = (u / plane.stride_b) % plane.extent_b;
                for &(da, db) in neighbor_offsets {
                    let Some(ja) = ia.checked_add_signed(da).filter(|&j| j < plane.extent_a)
                    else {
                        continue;
                    };
                    let Some(jb) = ib.checked_add_signed(db).filter(|&j| j < plane.extent_b)
                    else {
                        continue;
                    };
                    let v = ja * plane.stride_a + jb * plane.stride_b;
                    if image.is_passable(v) {
                        targets.push(v);
                        static_costs.push(static_edge_cost(
                            image, &normalizer, pixel_size, weights, u, v,
                        ));
                    }
                }
            }
            offsets.push(targets.len());
        }

        Ok(Self {
            vertex_count,
            offsets,
            targets,
            static_costs,
            normalizer,
            pixel_size,
            revision: CostRevision::current(image, weights, connectivity),
        })
    }

    /// Bring the cache up to date with the image and weights, doing the
    /// least work that restores validity.
    ///
    /// Changing only the curvature weight leaves the stamp untouched
    /// (curvature is never cached), so repeated traces with varying
    /// curvature reuse the cache wholesale.
    ///
    /// # Errors
    ///
    /// Same conditions as [`GridGraph::build`].
    pub(crate) fn ensure(
        &mut self,
        image: &CostImage,
        weights: &CostWeights,
        connectivity: Connectivity,
    ) -> Result<CacheUpdate, GeodesicError> {
        let current = CostRevision::current(image, weights, connectivity);
        if self.revision == current {
            return Ok(CacheUpdate::Reused);
        }
        if self.revision.same_topology(&current) {
            self.refresh_costs(image, weights);
            self.revision = current;
            return Ok(CacheUpdate::RefreshedCosts);
        }
        *self = Self::build(image, weights, connectivity)?;
        Ok(CacheUpdate::Rebuilt)
    }

    /// Recompute every cached static cost over the existing topology.
    fn refresh_costs(&mut self, image: &CostImage, weights: &CostWeights) {
        for u in 0..self.vertex_count {
            let row = self.offsets[u]..self.offsets[u + 1];
            for e in row {
                self.static_costs[e] = static_edge_cost(
                    image,
                    &self.normalizer,
                    self.pixel_size,
                    weights,
                    u,
                    self.targets[e],
                );
            }
        }
    }

    /// Number of vertices, passable or not.
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of directed edges.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.targets.len()
    }

    /// The neighbors of `u`, in deterministic scan order.
    ///
    /// `u` must be a valid vertex id of the image the graph was built
    /// from.
    #[must_use]
    pub fn neighbors(&self, u: VertexId) -> &[VertexId] {
        &self.targets[self.offsets[u]..self.offsets[u + 1]]
    }

    /// Cached static cost of the edge (u, v). `u` must be a valid
    /// vertex id.
    ///
    /// Returns infinity for a pair that is not an edge, which no
    /// relaxation can improve on.
    #[must_use]
    pub fn static_cost(&self, u: VertexId, v: VertexId) -> f64 {
        let row = self.offsets[u]..self.offsets[u + 1];
        for e in row {
            if self.targets[e] == v {
                return self.static_costs[e];
            }
        }
        f64::INFINITY
    }
}
