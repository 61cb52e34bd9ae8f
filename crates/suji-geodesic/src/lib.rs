//! suji-geodesic: minimum-cost paths over 2D cost images (sans-IO).
//!
//! Computes the geodesic (the minimum-total-cost path) between two
//! pixels of a scalar cost image, using a single-source Dijkstra
//! variant with a lazily-populated front set. Edge costs combine three
//! normalized terms (image intensity, edge length, path curvature)
//! split into a cached static part and a per-relaxation dynamic part.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! scalar buffers (or decoded raster images via [`raster`]) and
//! returns structured data.
//!
//! # Usage
//!
//! One-shot, building the adjacency fresh:
//!
//! ```
//! use suji_geodesic::{CostImage, CostWeights, TraceConfig, trace};
//!
//! let image = CostImage::from_scalars_2d(5, 5, vec![0.5; 25])?;
//! let config = TraceConfig {
//!     start_vertex: 0,
//!     end_vertex: 24,
//!     weights: CostWeights {
//!         edge_length_weight: 1.0,
//!         ..CostWeights::default()
//!     },
//!     ..TraceConfig::default()
//! };
//! let outcome = trace(&image, &config)?;
//! assert!(outcome.path().is_some());
//! # Ok::<(), suji_geodesic::GeodesicError>(())
//! ```
//!
//! Repeated traces over one image should use [`GeodesicTracer`], which
//! caches the adjacency and its static costs between calls. Changing
//! only the curvature weight reuses the cache wholesale; changing a
//! static weight refreshes cached costs in place; mutating the image
//! rebuilds.

pub mod cost;
pub mod diagnostics;
pub mod grid;
pub mod image;
pub mod path;
pub mod raster;
pub mod solver;
pub mod types;

use web_time::Instant;

pub use crate::cost::{CostModel, ImageCostModel};
pub use crate::diagnostics::{StageDiagnostics, StageMetrics, TraceDiagnostics, TraceSummary};
pub use crate::grid::{CacheUpdate, GridGraph};
pub use crate::image::CostImage;
pub use crate::solver::{GraphAdjacency, SearchResult, SearchStats, shortest_path};
pub use crate::types::{
    Connectivity, CostWeights, GeodesicError, GeodesicPath, Point3, Polyline, TraceConfig,
    TraceOutcome, VertexId,
};

/// Run a single geodesic trace, building the adjacency fresh.
///
/// Validates the configuration, builds the pixel graph with its
/// static-cost cache, searches, and reconstructs the path.
///
/// # Errors
///
/// Returns [`GeodesicError::InvalidConfig`] for non-finite or negative
/// weights, [`GeodesicError::NotPlanar`] if the image is not a single
/// 2D slice, and [`GeodesicError::VertexOutOfRange`] for endpoint
/// indices outside the image. An unreachable end vertex is not an
/// error; it is [`TraceOutcome::Unreachable`].
pub fn trace(image: &CostImage, config: &TraceConfig) -> Result<TraceOutcome, GeodesicError> {
    config.weights.validate()?;
    let graph = GridGraph::build(image, &config.weights, config.connectivity)?;
    let model = ImageCostModel::new(image, &graph, &config.weights);
    let search = shortest_path(&graph, &model, config.start_vertex, config.end_vertex)?;
    finish(&search, image, config)
}

/// Turn a finished search into the public outcome.
fn finish(
    search: &SearchResult,
    image: &CostImage,
    config: &TraceConfig,
) -> Result<TraceOutcome, GeodesicError> {
    if search.reached_end() {
        let geodesic = path::reconstruct(search, image, config.start_vertex, config.end_vertex)?;
        Ok(TraceOutcome::Found(geodesic))
    } else {
        Ok(TraceOutcome::Unreachable)
    }
}

/// A reusable tracer that owns the cost image and caches the adjacency
/// and its static costs across traces.
///
/// The cache is validated against the image's version counter and the
/// static weights before every trace, so mutate freely through
/// [`set_scalar`](Self::set_scalar), [`set_weights`](Self::set_weights)
/// or [`config_mut`](Self::config_mut); the next trace does the least
/// recomputation that restores validity.
///
/// The tracer is synchronous and single-threaded; a trace runs to
/// completion within the call.
#[derive(Debug, Clone)]
pub struct GeodesicTracer {
    image: CostImage,
    config: TraceConfig,
    graph: GridGraph,
}

impl GeodesicTracer {
    /// Create a tracer with the default configuration, building the
    /// adjacency eagerly.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::NotPlanar`] if the image is not a
    /// single 2D slice.
    pub fn new(image: CostImage) -> Result<Self, GeodesicError> {
        Self::with_config(image, TraceConfig::default())
    }

    /// Create a tracer with an explicit configuration.
    ///
    /// # Errors
    ///
    /// As [`GeodesicTracer::new`], plus [`GeodesicError::InvalidConfig`]
    /// for invalid weights.
    pub fn with_config(image: CostImage, config: TraceConfig) -> Result<Self, GeodesicError> {
        config.weights.validate()?;
        let graph = GridGraph::build(&image, &config.weights, config.connectivity)?;
        Ok(Self {
            image,
            config,
            graph,
        })
    }

    /// The owned cost image.
    #[must_use]
    pub const fn image(&self) -> &CostImage {
        &self.image
    }

    /// Consume the tracer and return the image.
    #[must_use]
    pub fn into_image(self) -> CostImage {
        self.image
    }

    /// The current configuration.
    #[must_use]
    pub const fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Mutable access to the configuration.
    ///
    /// Weight changes are picked up by the next trace through the
    /// cache-revision check; invalid weights are rejected then.
    pub fn config_mut(&mut self) -> &mut TraceConfig {
        &mut self.config
    }

    /// Set the start and end vertices of subsequent traces.
    pub fn set_endpoints(&mut self, start: VertexId, end: VertexId) {
        self.config.start_vertex = start;
        self.config.end_vertex = end;
    }

    /// Set the cost weights of subsequent traces.
    pub fn set_weights(&mut self, weights: CostWeights) {
        self.config.weights = weights;
    }

    /// Overwrite one scalar of the owned image.
    ///
    /// Bumps the image version; the next trace rebuilds the adjacency.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::VertexOutOfRange`] for an index outside
    /// the image.
    pub fn set_scalar(&mut self, vertex: VertexId, value: f64) -> Result<(), GeodesicError> {
        self.image.set_scalar(vertex, value)
    }

    /// Replace the cost image, rebuilding the adjacency eagerly.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::NotPlanar`] if the new image is not a
    /// single 2D slice; on error the tracer keeps its previous image.
    pub fn set_image(&mut self, image: CostImage) -> Result<(), GeodesicError> {
        let graph = GridGraph::build(&image, &self.config.weights, self.config.connectivity)?;
        self.image = image;
        self.graph = graph;
        Ok(())
    }

    /// Run a trace with the current image and configuration.
    ///
    /// # Errors
    ///
    /// As [`trace`].
    pub fn trace(&mut self) -> Result<TraceOutcome, GeodesicError> {
        self.config.weights.validate()?;
        self.graph
            .ensure(&self.image, &self.config.weights, self.config.connectivity)?;
        let model = ImageCostModel::new(&self.image, &self.graph, &self.config.weights);
        let search = shortest_path(
            &self.graph,
            &model,
            self.config.start_vertex,
            self.config.end_vertex,
        )?;
        finish(&search, &self.image, &self.config)
    }

    /// Run a trace, collecting per-stage diagnostics.
    ///
    /// The adjacency stage is `None` when the cached graph was reused
    /// untouched; the reconstruction stage is `None` when the end
    /// vertex was unreachable.
    ///
    /// # Errors
    ///
    /// As [`trace`].
    pub fn trace_with_diagnostics(
        &mut self,
    ) -> Result<(TraceOutcome, TraceDiagnostics), GeodesicError> {
        self.config.weights.validate()?;
        let total_start = Instant::now();

        let adjacency_start = Instant::now();
        let update = self
            .graph
            .ensure(&self.image, &self.config.weights, self.config.connectivity)?;
        let adjacency = (update != CacheUpdate::Reused).then(|| StageDiagnostics {
            duration: adjacency_start.elapsed(),
            metrics: StageMetrics::Adjacency {
                update,
                vertex_count: self.graph.vertex_count(),
                edge_count: self.graph.edge_count(),
            },
        });

        let search_start = Instant::now();
        let model = ImageCostModel::new(&self.image, &self.graph, &self.config.weights);
        let search = shortest_path(
            &self.graph,
            &model,
            self.config.start_vertex,
            self.config.end_vertex,
        )?;
        let stats = *search.stats();
        let search_stage = StageDiagnostics {
            duration: search_start.elapsed(),
            metrics: StageMetrics::Search {
                vertices_finalized: stats.vertices_finalized,
                edges_relaxed: stats.edges_relaxed,
                front_peak: stats.front_peak,
                vertices_touched: search.touched(),
                reached: search.reached_end(),
            },
        };

        let reconstruction_start = Instant::now();
        let outcome = finish(&search, &self.image, &self.config)?;
        let reconstruction = outcome.path().map(|geodesic| StageDiagnostics {
            duration: reconstruction_start.elapsed(),
            metrics: StageMetrics::Reconstruction {
                path_points: geodesic.points.len(),
            },
        });

        let diagnostics = TraceDiagnostics {
            adjacency,
            search: search_stage,
            reconstruction,
            total_duration: total_start.elapsed(),
            summary: TraceSummary {
                vertex_count: self.graph.vertex_count(),
                edge_count: self.graph.edge_count(),
                vertices_touched: search.touched(),
                reached: search.reached_end(),
                path_points: outcome.path().map(|geodesic| geodesic.points.len()),
            },
        };
        Ok((outcome, diagnostics))
    }
}
