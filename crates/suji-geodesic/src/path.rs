//! Path reconstruction: predecessor chain to ordered polyline.

use crate::image::CostImage;
use crate::solver::SearchResult;
use crate::types::{GeodesicError, GeodesicPath, Polyline, VertexId};

/// Walk the predecessor chain from `end` back to `start` and emit the
/// start-to-end path.
///
/// Callers must only reconstruct after a search that reached `end`;
/// [`crate::trace`] and [`crate::GeodesicTracer`] report an unreachable
/// end as [`crate::TraceOutcome::Unreachable`] instead of calling this.
///
/// The walk is defensively bounded by the vertex count. A correct
/// relaxation cannot produce a cycle or a gap in the chain, so hitting
/// either is reported as an internal-consistency error rather than
/// looping forever on corrupted state.
///
/// # Errors
///
/// Returns [`GeodesicError::CorruptPredecessorChain`] when the chain
/// has a missing link before reaching `start` or exceeds the vertex
/// count.
pub fn reconstruct(
    search: &SearchResult,
    image: &CostImage,
    start: VertexId,
    end: VertexId,
) -> Result<GeodesicPath, GeodesicError> {
    let bound = image.vertex_count();
    let mut vertices = vec![end];
    let mut current = end;
    while current != start {
        let Some(predecessor) = search.predecessor(current) else {
            return Err(GeodesicError::CorruptPredecessorChain { vertex: current });
        };
        vertices.push(predecessor);
        if vertices.len() > bound {
            return Err(GeodesicError::CorruptPredecessorChain {
                vertex: predecessor,
            });
        }
        current = predecessor;
    }
    vertices.reverse();

    let total_cost = search
        .distance(end)
        .ok_or(GeodesicError::CorruptPredecessorChain { vertex: end })?;
    let points = vertices.iter().map(|&v| image.point_at(v)).collect();
    Ok(GeodesicPath {
        vertices,
        points: Polyline::new(points),
        total_cost,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cost::ImageCostModel;
    use crate::grid::GridGraph;
    use crate::solver::{fabricated_result, shortest_path};
    use crate::types::{Connectivity, CostWeights, Point3};

    fn uniform(width: usize, height: usize) -> CostImage {
        CostImage::from_scalars_2d(width, height, vec![0.0; width * height]).unwrap()
    }

    #[test]
    fn reconstructs_a_row() {
        let image = uniform(5, 2);
        let weights = CostWeights {
            image_weight: 0.0,
            edge_length_weight: 1.0,
            curvature_weight: 0.0,
        };
        let graph = GridGraph::build(&image, &weights, Connectivity::Eight).unwrap();
        let model = ImageCostModel::new(&image, &graph, &weights);
        let search = shortest_path(&graph, &model, 0, 4).unwrap();
        assert!(search.reached_end());

        let path = reconstruct(&search, &image, 0, 4).unwrap();
        assert_eq!(path.vertices, vec![0, 1, 2, 3, 4]);
        assert_eq!(path.points.len(), 5);
        assert_eq!(path.points.first(), Some(&Point3::new(0.0, 0.0, 0.0)));
        assert_eq!(path.points.last(), Some(&Point3::new(4.0, 0.0, 0.0)));
        // Four axis steps at 1/sqrt(2) each.
        let expected = 4.0 / 2.0_f64.sqrt();
        assert!((path.total_cost - expected).abs() < 1e-12);
    }

    #[test]
    fn start_equals_end_is_a_single_point() {
        let image = uniform(3, 3);
        let weights = CostWeights::default();
        let graph = GridGraph::build(&image, &weights, Connectivity::Eight).unwrap();
        let model = ImageCostModel::new(&image, &graph, &weights);
        let search = shortest_path(&graph, &model, 4, 4).unwrap();

        let path = reconstruct(&search, &image, 4, 4).unwrap();
        assert_eq!(path.vertices, vec![4]);
        assert_eq!(path.points.len(), 1);
        assert!(path.total_cost.abs() < f64::EPSILON);
    }

    #[test]
    fn cyclic_chain_is_rejected() {
        let image = uniform(3, 3);
        // 3 and 4 point at each other; start 0 is never reached.
        let search = fabricated_result(true, &[(4, 2.0, Some(3)), (3, 1.0, Some(4))]);
        let err = reconstruct(&search, &image, 0, 4).unwrap_err();
        assert!(matches!(
            err,
            GeodesicError::CorruptPredecessorChain { .. }
        ));
    }

    #[test]
    fn missing_link_is_rejected() {
        let image = uniform(3, 3);
        // 4's predecessor 2 was never assigned one, and 2 != start.
        let search = fabricated_result(true, &[(4, 2.0, Some(2)), (2, 1.0, None)]);
        let err = reconstruct(&search, &image, 0, 4).unwrap_err();
        assert!(matches!(
            err,
            GeodesicError::CorruptPredecessorChain { vertex: 2 }
        ));
    }
}
