//! The composite edge-cost model.
//!
//! Traversal cost is a weighted sum of three terms, each normalized to
//! [0, 1] before weighting:
//!
//! - **image term** `f(I)`: the scalar at the edge's head vertex,
//!   min-max normalized over the image's finite scalars. Cost images
//!   are typically inverted gradient magnitudes, so strong edges are
//!   cheap to follow (see [`crate::raster`]).
//! - **edge-length term** `f(u,v)`: Euclidean distance between the two
//!   vertices divided by the in-plane pixel diagonal, so a diagonal
//!   step normalizes to exactly 1.
//! - **curvature term** `f(t,u,v)`: the turning angle between the path
//!   segment t→u and the candidate segment u→v, normalized by π.
//!   Straight continuation costs 0, a full reversal costs 1.
//!
//! The first two terms form the *static* cost, computed once per cache
//! build and stored on the edge. The curvature term is *dynamic*: it
//! depends on u's predecessor at the moment of relaxation, which
//! changes as the search progresses, so it is recomputed every time.
//!
//! # Strategy
//!
//! The solver is decoupled from images through the [`CostModel`] trait;
//! [`ImageCostModel`] is the image-backed implementation. Alternative
//! models (unit costs, precomputed tables) plug into the same solver.

use crate::grid::GridGraph;
use crate::image::CostImage;
use crate::types::{CostWeights, Point3, VertexId};

/// Cost hooks invoked by the solver during relaxation.
pub trait CostModel {
    /// Path-independent cost of traversing (u, v).
    fn static_cost(&self, u: VertexId, v: VertexId) -> f64;

    /// Path-dependent cost of traversing (u, v) while `t` is u's
    /// current predecessor. `t` is `None` when u is the source.
    fn dynamic_cost(&self, t: Option<VertexId>, u: VertexId, v: VertexId) -> f64;
}

/// Min-max normalization of image scalars into [0, 1].
///
/// A degenerate range (uniform image, or no finite scalars at all)
/// normalizes everything to 0 so that a flat image contributes no
/// intensity preference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScalarNormalizer {
    lo: f64,
    inv_span: f64,
}

impl ScalarNormalizer {
    pub(crate) fn new(range: Option<(f64, f64)>) -> Self {
        match range {
            Some((lo, hi)) if hi > lo => Self {
                lo,
                inv_span: 1.0 / (hi - lo),
            },
            Some((lo, _)) => Self { lo, inv_span: 0.0 },
            None => Self {
                lo: 0.0,
                inv_span: 0.0,
            },
        }
    }

    pub(crate) fn normalize(&self, scalar: f64) -> f64 {
        (scalar - self.lo) * self.inv_span
    }
}

/// Static cost of the edge (u, v): weighted image term plus weighted
/// edge-length term.
///
/// Callers guarantee u and v are in-range, passable vertices.
pub(crate) fn static_edge_cost(
    image: &CostImage,
    normalizer: &ScalarNormalizer,
    pixel_size: f64,
    weights: &CostWeights,
    u: VertexId,
    v: VertexId,
) -> f64 {
    let mut cost = weights.image_weight * normalizer.normalize(image.scalar_at(v));
    if weights.edge_length_weight > 0.0 {
        let length = image.point_at(u).distance(image.point_at(v));
        cost += weights.edge_length_weight * (length / pixel_size);
    }
    cost
}

/// Turning angle at `b` between segments a→b and b→c, as a fraction of
/// π. Degenerate (zero-length) segments turn by 0.
fn turning_fraction(a: Point3, b: Point3, c: Point3) -> f64 {
    let (ux, uy, uz) = (b.x - a.x, b.y - a.y, b.z - a.z);
    let (vx, vy, vz) = (c.x - b.x, c.y - b.y, c.z - b.z);
    let len_u = ux.hypot(uy).hypot(uz);
    let len_v = vx.hypot(vy).hypot(vz);
    if len_u <= 0.0 || len_v <= 0.0 {
        return 0.0;
    }
    let dot = uz.mul_add(vz, ux.mul_add(vx, uy * vy));
    let cos = (dot / (len_u * len_v)).clamp(-1.0, 1.0);
    cos.acos() / std::f64::consts::PI
}

/// The image-backed cost model: cached static costs from the grid,
/// curvature recomputed from world coordinates.
#[derive(Debug, Clone, Copy)]
pub struct ImageCostModel<'a> {
    image: &'a CostImage,
    graph: &'a GridGraph,
    curvature_weight: f64,
}

impl<'a> ImageCostModel<'a> {
    /// Bind the model to an image and its built adjacency.
    ///
    /// The curvature weight is clamped to [0, 1] here, per the
    /// [`CostWeights`] contract.
    #[must_use]
    pub fn new(image: &'a CostImage, graph: &'a GridGraph, weights: &CostWeights) -> Self {
        Self {
            image,
            graph,
            curvature_weight: weights.curvature_weight.clamp(0.0, 1.0),
        }
    }
}

impl CostModel for ImageCostModel<'_> {
    fn static_cost(&self, u: VertexId, v: VertexId) -> f64 {
        self.graph.static_cost(u, v)
    }

    fn dynamic_cost(&self, t: Option<VertexId>, u: VertexId, v: VertexId) -> f64 {
        if self.curvature_weight <= 0.0 {
            return 0.0;
        }
        let Some(t) = t else {
            // The source has no incoming segment to turn against.
            return 0.0;
        };
        self.curvature_weight
            * turning_fraction(
                self.image.point_at(t),
                self.image.point_at(u),
                self.image.point_at(v),
            )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Connectivity;

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    // --- turning_fraction ---

    #[test]
    fn straight_continuation_turns_zero() {
        let f = turning_fraction(p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0));
        assert!(f.abs() < 1e-12);
    }

    #[test]
    fn right_angle_turns_half() {
        let f = turning_fraction(p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0));
        assert!((f - 0.5).abs() < 1e-12);
    }

    #[test]
    fn reversal_turns_one() {
        let f = turning_fraction(p(0.0, 0.0), p(1.0, 0.0), p(0.0, 0.0));
        assert!((f - 1.0).abs() < 1e-12);
    }

    #[test]
    fn forty_five_degree_turn() {
        let f = turning_fraction(p(0.0, 0.0), p(1.0, 0.0), p(2.0, 1.0));
        assert!((f - 0.25).abs() < 1e-12);
    }

    #[test]
    fn degenerate_segment_turns_zero() {
        let f = turning_fraction(p(1.0, 1.0), p(1.0, 1.0), p(2.0, 2.0));
        assert!(f.abs() < 1e-12);
    }

    // --- ScalarNormalizer ---

    #[test]
    fn normalizer_maps_range_to_unit_interval() {
        let n = ScalarNormalizer::new(Some((10.0, 30.0)));
        assert!(n.normalize(10.0).abs() < 1e-12);
        assert!((n.normalize(20.0) - 0.5).abs() < 1e-12);
        assert!((n.normalize(30.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_range_normalizes_to_zero() {
        let n = ScalarNormalizer::new(Some((5.0, 5.0)));
        assert!(n.normalize(5.0).abs() < 1e-12);
        let n = ScalarNormalizer::new(None);
        assert!(n.normalize(123.0).abs() < 1e-12);
    }

    // --- static_edge_cost ---

    #[test]
    fn static_cost_combines_weighted_terms() {
        // Scalars 0..=3 over a 2x2 image: range (0, 3).
        let image = CostImage::from_scalars_2d(2, 2, vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let normalizer = ScalarNormalizer::new(image.scalar_range());
        let pixel_size = image.pixel_size().unwrap();
        let weights = CostWeights {
            image_weight: 0.5,
            edge_length_weight: 0.5,
            curvature_weight: 0.0,
        };
        // Diagonal edge 0 -> 3: image term 3/3 = 1, length term 1.
        let cost = static_edge_cost(&image, &normalizer, pixel_size, &weights, 0, 3);
        assert!((cost - 1.0).abs() < 1e-12);
        // Axis edge 0 -> 1: image term 1/3, length term 1/sqrt(2).
        let cost = static_edge_cost(&image, &normalizer, pixel_size, &weights, 0, 1);
        let expected = 0.5_f64.mul_add(1.0 / 3.0, 0.5 / 2.0_f64.sqrt());
        assert!((cost - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_edge_length_weight_skips_length_term() {
        let image = CostImage::from_scalars_2d(2, 2, vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let normalizer = ScalarNormalizer::new(image.scalar_range());
        let pixel_size = image.pixel_size().unwrap();
        let weights = CostWeights::default();
        let cost = static_edge_cost(&image, &normalizer, pixel_size, &weights, 0, 3);
        assert!((cost - 1.0).abs() < 1e-12);
    }

    // --- ImageCostModel ---

    #[test]
    fn source_vertex_has_no_dynamic_cost() {
        let image = CostImage::from_scalars_2d(3, 3, vec![0.0; 9]).unwrap();
        let graph = GridGraph::build(&image, &CostWeights::default(), Connectivity::Eight).unwrap();
        let weights = CostWeights {
            curvature_weight: 1.0,
            ..CostWeights::default()
        };
        let model = ImageCostModel::new(&image, &graph, &weights);
        assert!(model.dynamic_cost(None, 0, 1).abs() < 1e-12);
    }

    #[test]
    fn dynamic_cost_scales_turning_angle() {
        let image = CostImage::from_scalars_2d(3, 3, vec![0.0; 9]).unwrap();
        let graph = GridGraph::build(&image, &CostWeights::default(), Connectivity::Eight).unwrap();
        let weights = CostWeights {
            curvature_weight: 0.5,
            ..CostWeights::default()
        };
        let model = ImageCostModel::new(&image, &graph, &weights);
        // Straight along the top row: 0 -> 1 -> 2.
        assert!(model.dynamic_cost(Some(0), 1, 2).abs() < 1e-12);
        // Right-angle turn 0 -> 1 -> 4: half of the clamped weight.
        let cost = model.dynamic_cost(Some(0), 1, 4);
        assert!((cost - 0.25).abs() < 1e-12);
    }

    #[test]
    fn curvature_weight_clamped_to_unit_interval() {
        let image = CostImage::from_scalars_2d(3, 3, vec![0.0; 9]).unwrap();
        let graph = GridGraph::build(&image, &CostWeights::default(), Connectivity::Eight).unwrap();
        let weights = CostWeights {
            curvature_weight: 7.5,
            ..CostWeights::default()
        };
        let model = ImageCostModel::new(&image, &graph, &weights);
        // Reversal 0 -> 1 -> 0 with an over-range weight still costs at
        // most the clamped maximum of 1.
        let cost = model.dynamic_cost(Some(0), 1, 0);
        assert!((cost - 1.0).abs() < 1e-12);
    }

    #[test]
    fn static_cost_reads_cache() {
        let image = CostImage::from_scalars_2d(3, 3, vec![0.0; 9]).unwrap();
        let weights = CostWeights {
            image_weight: 0.0,
            edge_length_weight: 1.0,
            curvature_weight: 0.0,
        };
        let graph = GridGraph::build(&image, &weights, Connectivity::Eight).unwrap();
        let model = ImageCostModel::new(&image, &graph, &weights);
        assert!((model.static_cost(4, 0) - 1.0).abs() < 1e-12);
        assert!((model.static_cost(4, 1) - 1.0 / 2.0_f64.sqrt()).abs() < 1e-12);
    }
}
