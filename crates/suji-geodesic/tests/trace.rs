//! Integration tests: geodesic properties checked against independent
//! oracles and across weight configurations.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use suji_geodesic::{
    Connectivity, CostImage, CostWeights, GeodesicTracer, GridGraph, TraceConfig, trace,
};

fn uniform(width: usize, height: usize) -> CostImage {
    CostImage::from_scalars_2d(width, height, vec![0.5; width * height]).unwrap()
}

fn length_only() -> CostWeights {
    CostWeights {
        image_weight: 0.0,
        edge_length_weight: 1.0,
        curvature_weight: 0.0,
    }
}

/// A 6x6 image with irregular but deterministic scalars in [0, 1].
fn patterned() -> CostImage {
    let scalars: Vec<f64> = (0..36_i32)
        .map(|i| f64::from((i * 13 + 5) % 17) / 16.0)
        .collect();
    CostImage::from_scalars_2d(6, 6, scalars).unwrap()
}

// ---------------------------------------------------------------------------
// The canonical 5x5 diagonal property
// ---------------------------------------------------------------------------

#[test]
fn uniform_image_diagonal_is_four_normalized_diagonal_steps() {
    let image = uniform(5, 5);
    let config = TraceConfig {
        start_vertex: image.vertex_id(0, 0, 0).unwrap(),
        end_vertex: image.vertex_id(4, 4, 0).unwrap(),
        weights: length_only(),
        ..TraceConfig::default()
    };
    let outcome = trace(&image, &config).unwrap();
    let path = outcome.path().expect("diagonal must be reachable");

    // Four diagonal edges, each normalized to exactly 1.
    assert_eq!(path.vertices.len(), 5);
    assert!((path.total_cost - 4.0).abs() < 1e-12);
    for (step, &vertex) in path.vertices.iter().enumerate() {
        assert_eq!(vertex, image.vertex_id(step, step, 0).unwrap());
    }
}

// ---------------------------------------------------------------------------
// Oracle agreement (curvature 0, where Dijkstra is exact)
// ---------------------------------------------------------------------------

/// Mirror the grid's static costs into a petgraph graph and ask its
/// Dijkstra for the end-vertex distance.
fn petgraph_distance(
    image: &CostImage,
    weights: &CostWeights,
    start: usize,
    end: usize,
) -> Option<f64> {
    let graph = GridGraph::build(image, weights, Connectivity::Eight).unwrap();
    let mut mirror = petgraph::graph::DiGraph::<(), f64>::new();
    let nodes: Vec<_> = (0..graph.vertex_count()).map(|_| mirror.add_node(())).collect();
    for u in 0..graph.vertex_count() {
        for &v in graph.neighbors(u) {
            mirror.add_edge(nodes[u], nodes[v], graph.static_cost(u, v));
        }
    }
    let distances = petgraph::algo::dijkstra(&mirror, nodes[start], Some(nodes[end]), |e| {
        *e.weight()
    });
    distances.get(&nodes[end]).copied()
}

#[test]
fn matches_petgraph_dijkstra_on_static_costs() {
    let image = patterned();
    let weight_sets = [
        CostWeights::default(),
        length_only(),
        CostWeights {
            image_weight: 0.7,
            edge_length_weight: 0.3,
            curvature_weight: 0.0,
        },
    ];
    for weights in weight_sets {
        for (start, end) in [(0, 35), (5, 30), (14, 21)] {
            let config = TraceConfig {
                start_vertex: start,
                end_vertex: end,
                weights,
                ..TraceConfig::default()
            };
            let path = trace(&image, &config).unwrap();
            let path = path.path().expect("patterned image is fully connected");
            let oracle = petgraph_distance(&image, &weights, start, end)
                .expect("oracle must also reach the end");
            assert!(
                (path.total_cost - oracle).abs() < 1e-9,
                "weights {weights:?} ({start} -> {end}): got {}, oracle {oracle}",
                path.total_cost,
            );
        }
    }
}

/// Exhaustive minimum over all simple paths on a tiny grid.
fn brute_force_min_cost(
    image: &CostImage,
    weights: &CostWeights,
    start: usize,
    end: usize,
) -> Option<f64> {
    let graph = GridGraph::build(image, weights, Connectivity::Eight).unwrap();

    fn visit(
        graph: &GridGraph,
        end: usize,
        current: usize,
        cost_so_far: f64,
        visited: &mut Vec<bool>,
        best: &mut Option<f64>,
    ) {
        if current == end {
            *best = Some(best.map_or(cost_so_far, |b: f64| b.min(cost_so_far)));
            return;
        }
        for &v in graph.neighbors(current) {
            if visited[v] {
                continue;
            }
            visited[v] = true;
            visit(
                graph,
                end,
                v,
                cost_so_far + graph.static_cost(current, v),
                visited,
                best,
            );
            visited[v] = false;
        }
    }

    let mut visited = vec![false; graph.vertex_count()];
    visited[start] = true;
    let mut best = None;
    visit(&graph, end, start, 0.0, &mut visited, &mut best);
    best
}

#[test]
fn never_beaten_by_exhaustive_search() {
    let scalars = vec![0.9, 0.1, 0.8, 0.2, 0.7, 0.3, 0.6, 0.4, 0.5];
    let image = CostImage::from_scalars_2d(3, 3, scalars).unwrap();
    let weights = CostWeights {
        image_weight: 0.5,
        edge_length_weight: 0.5,
        curvature_weight: 0.0,
    };
    let config = TraceConfig {
        start_vertex: 0,
        end_vertex: 8,
        weights,
        ..TraceConfig::default()
    };
    let path = trace(&image, &config).unwrap();
    let path = path.path().unwrap();
    let brute = brute_force_min_cost(&image, &weights, 0, 8).unwrap();
    assert!(
        (path.total_cost - brute).abs() < 1e-9,
        "solver found {}, exhaustive minimum is {brute}",
        path.total_cost,
    );
}

// ---------------------------------------------------------------------------
// Weight monotonicity: image weight pulls the path into cheap corridors
// ---------------------------------------------------------------------------

/// 5x5 image with a zero-cost L-shaped corridor along the top row and
/// right column; everything else costs 1.
fn corridor_image() -> CostImage {
    let mut scalars = vec![1.0; 25];
    for x in 0..5 {
        scalars[x] = 0.0; // top row (y = 0)
    }
    for y in 0..5 {
        scalars[4 + 5 * y] = 0.0; // right column (x = 4)
    }
    CostImage::from_scalars_2d(5, 5, scalars).unwrap()
}

#[test]
fn image_weight_pulls_path_into_corridor() {
    let image = corridor_image();
    let start = image.vertex_id(0, 0, 0).unwrap();
    let end = image.vertex_id(4, 4, 0).unwrap();

    // Intensity-dominated: the long way through the free corridor wins.
    let config = TraceConfig {
        start_vertex: start,
        end_vertex: end,
        weights: CostWeights {
            image_weight: 0.9,
            edge_length_weight: 0.1,
            curvature_weight: 0.0,
        },
        ..TraceConfig::default()
    };
    let corridor_path = trace(&image, &config).unwrap();
    let corridor_path = corridor_path.path().unwrap();
    let mid_corridor = image.vertex_id(2, 0, 0).unwrap();
    assert!(
        corridor_path.vertices.contains(&mid_corridor),
        "expected the top-row corridor in {:?}",
        corridor_path.vertices,
    );

    // Length-dominated (same weight total): the direct diagonal wins.
    let config = TraceConfig {
        start_vertex: start,
        end_vertex: end,
        weights: CostWeights {
            image_weight: 0.1,
            edge_length_weight: 0.9,
            curvature_weight: 0.0,
        },
        ..TraceConfig::default()
    };
    let direct_path = trace(&image, &config).unwrap();
    let direct_path = direct_path.path().unwrap();
    assert!(
        !direct_path.vertices.contains(&mid_corridor),
        "expected the diagonal, not the corridor, in {:?}",
        direct_path.vertices,
    );
    assert!(direct_path.vertices.len() < corridor_path.vertices.len());
}

// ---------------------------------------------------------------------------
// Curvature: changes the path without touching the static cache
// ---------------------------------------------------------------------------

/// 5x3 image where a zero-cost zigzag detour through the top row
/// competes with a mildly-priced straight middle row.
fn zigzag_image() -> CostImage {
    let mut scalars = vec![1.0; 15];
    for x in 1..=3 {
        scalars[x] = 0.0; // top-row detour cells (1,0), (2,0), (3,0)
        scalars[x + 5] = 0.1; // straight-row cells (1,1), (2,1), (3,1)
    }
    scalars[4 + 5] = 0.0; // end vertex (4,1)
    CostImage::from_scalars_2d(5, 3, scalars).unwrap()
}

#[test]
fn curvature_weight_straightens_the_path_without_rebuilding() {
    let image = zigzag_image();
    let start = image.vertex_id(0, 1, 0).unwrap();
    let end = image.vertex_id(4, 1, 0).unwrap();
    let mut tracer = GeodesicTracer::new(image).unwrap();
    tracer.set_endpoints(start, end);

    // Curvature off: the statically-free zigzag through the top row.
    let bendy = tracer.trace().unwrap();
    let bendy = bendy.path().unwrap().clone();
    let detour_cell = tracer.image().vertex_id(2, 0, 0).unwrap();
    assert!(
        bendy.vertices.contains(&detour_cell),
        "expected the zigzag detour in {:?}",
        bendy.vertices,
    );

    // Curvature on: the straight row becomes cheaper in total.
    tracer.config_mut().weights.curvature_weight = 1.0;
    let (straight, diagnostics) = tracer.trace_with_diagnostics().unwrap();
    let straight = straight.path().unwrap();
    assert!(
        diagnostics.adjacency.is_none(),
        "curvature-only change must reuse the static cache"
    );
    let straight_row: Vec<usize> = (0..5)
        .map(|x| tracer.image().vertex_id(x, 1, 0).unwrap())
        .collect();
    assert_eq!(straight.vertices, straight_row);
    assert_ne!(straight.vertices, bendy.vertices);
}

// ---------------------------------------------------------------------------
// Determinism across repeated runs
// ---------------------------------------------------------------------------

#[test]
fn identical_inputs_give_identical_paths() {
    let image = patterned();
    let config = TraceConfig {
        start_vertex: 0,
        end_vertex: 35,
        weights: CostWeights {
            image_weight: 0.5,
            edge_length_weight: 0.3,
            curvature_weight: 0.2,
        },
        ..TraceConfig::default()
    };
    let runs: Vec<_> = (0..3).map(|_| trace(&image, &config).unwrap()).collect();
    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[1], runs[2]);

    // A cached tracer agrees with the one-shot entry point.
    let mut tracer = GeodesicTracer::with_config(patterned(), config).unwrap();
    assert_eq!(tracer.trace().unwrap(), runs[0]);
    assert_eq!(tracer.trace().unwrap(), runs[0]);
}

// ---------------------------------------------------------------------------
// Unreachable targets stay well-defined under the tracer cache
// ---------------------------------------------------------------------------

#[test]
fn masking_and_unmasking_a_wall_flips_reachability() {
    let mut tracer = GeodesicTracer::new(uniform(5, 5)).unwrap();
    tracer.set_endpoints(0, 24);
    tracer.set_weights(length_only());
    assert!(tracer.trace().unwrap().path().is_some());

    // Wall off the middle column.
    for y in 0..5 {
        let wall = tracer.image().vertex_id(2, y, 0).unwrap();
        tracer.set_scalar(wall, f64::INFINITY).unwrap();
    }
    assert!(tracer.trace().unwrap().is_unreachable());

    // Open a gap: reachable again, through the gap.
    let gap = tracer.image().vertex_id(2, 2, 0).unwrap();
    tracer.set_scalar(gap, 0.5).unwrap();
    let outcome = tracer.trace().unwrap();
    let path = outcome.path().expect("gap restores connectivity");
    assert!(path.vertices.contains(&gap));
}
