//! Shared types for the suji geodesic tracing crate.

use serde::{Deserialize, Serialize};

/// Identifies one pixel vertex by its flat point index.
///
/// For an image with dimensions `(nx, ny, nz)` the vertex at structured
/// coordinates `(i, j, k)` has id `i + j*nx + k*nx*ny`.
pub type VertexId = usize;

/// A 3D point in world coordinates.
///
/// Cost images are planar, but a slice of a volume may sit anywhere in
/// space, so path output carries all three coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    /// Position along the image's first axis.
    pub x: f64,
    /// Position along the image's second axis.
    pub y: f64,
    /// Position along the image's third axis.
    pub z: f64,
}

impl Point3 {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx.mul_add(dx, dy.mul_add(dy, dz * dz))
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// A sequence of connected points forming a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point3>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point3>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point3> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point3> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.0
    }

    /// Consumes the polyline and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point3> {
        self.0
    }
}

/// In-plane neighborhood used when building the pixel graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Connectivity {
    /// Axis-aligned neighbors only.
    Four,
    /// Axis-aligned and diagonal neighbors.
    #[default]
    Eight,
}

/// Weights of the three edge-cost terms.
///
/// Total traversal cost for an edge (u, v) relaxed while u's predecessor
/// is t:
///
/// ```text
/// cost = image_weight * f(I) + edge_length_weight * f(u,v)
///      + curvature_weight * f(t,u,v)
/// ```
///
/// where each term is independently normalized to [0, 1] before
/// weighting. The first two form the cached static cost; the curvature
/// term is recomputed at every relaxation.
///
/// # Invariants
///
/// All weights must be finite and non-negative; [`crate::trace`] and
/// [`crate::GeodesicTracer`] reject violations as
/// [`GeodesicError::InvalidConfig`] before searching. `curvature_weight`
/// is additionally clamped to [0, 1] at the point of use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostWeights {
    /// Weight of the normalized image-intensity term.
    pub image_weight: f64,
    /// Weight of the normalized edge-length term.
    pub edge_length_weight: f64,
    /// Weight of the normalized path-curvature term. Clamped to [0, 1].
    pub curvature_weight: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            image_weight: 1.0,
            edge_length_weight: 0.0,
            curvature_weight: 0.0,
        }
    }
}

impl CostWeights {
    /// Check the finiteness and sign invariants.
    ///
    /// Negative weights would produce negative edge costs, which break
    /// the shortest-path invariant; non-finite weights poison every
    /// distance they touch.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::InvalidConfig`] naming the offending
    /// weight.
    pub fn validate(&self) -> Result<(), GeodesicError> {
        for (name, value) in [
            ("image_weight", self.image_weight),
            ("edge_length_weight", self.edge_length_weight),
            ("curvature_weight", self.curvature_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(GeodesicError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Configuration for a geodesic trace.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Flat point index of the path start.
    pub start_vertex: VertexId,
    /// Flat point index of the path end.
    pub end_vertex: VertexId,
    /// Edge-cost term weights.
    pub weights: CostWeights,
    /// Pixel neighborhood of the implicit graph.
    pub connectivity: Connectivity,
}

/// A geodesic path from the start vertex to the end vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeodesicPath {
    /// Visited vertices in start-to-end order.
    pub vertices: Vec<VertexId>,
    /// World-space coordinates of the visited vertices, same order.
    pub points: Polyline,
    /// Total traversal cost accumulated at the end vertex.
    pub total_cost: f64,
}

/// Result of a completed search.
///
/// An unreachable end vertex is a normal outcome of searching a masked
/// or disconnected image, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TraceOutcome {
    /// The end vertex was finalized and the path reconstructed.
    Found(GeodesicPath),
    /// The front set emptied before the end vertex was reached.
    Unreachable,
}

impl TraceOutcome {
    /// Returns the path when one was found.
    #[must_use]
    pub const fn path(&self) -> Option<&GeodesicPath> {
        match self {
            Self::Found(path) => Some(path),
            Self::Unreachable => None,
        }
    }

    /// Returns `true` when the end vertex could not be reached.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable)
    }
}

/// Errors that can occur while building or tracing a cost image.
///
/// "Unreachable end vertex" is deliberately absent: it is reported as
/// [`TraceOutcome::Unreachable`], not as an error.
#[derive(Debug, thiserror::Error)]
pub enum GeodesicError {
    /// Failed to decode raster input bytes.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The raster input bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The cost image has no points.
    #[error("cost image has no points")]
    EmptyImage,

    /// The scalar buffer does not match the declared dimensions.
    #[error(
        "scalar buffer holds {actual} values but dimensions {dims:?} describe {expected} points"
    )]
    ScalarLengthMismatch {
        /// Declared image dimensions.
        dims: [usize; 3],
        /// Point count implied by the dimensions.
        expected: usize,
        /// Length of the supplied scalar buffer.
        actual: usize,
    },

    /// The image is not a single 2D slice.
    ///
    /// Exactly one axis must have extent 1 and the two in-plane axes
    /// must have extent at least 2.
    #[error("dimensions {dims:?} do not describe a single 2D slice")]
    NotPlanar {
        /// Declared image dimensions.
        dims: [usize; 3],
    },

    /// Image spacing is non-finite or non-positive.
    #[error("malformed image geometry: {0}")]
    MalformedGeometry(String),

    /// Trace configuration is invalid.
    #[error("invalid trace configuration: {0}")]
    InvalidConfig(String),

    /// A start or end vertex index is outside the image.
    #[error("vertex {vertex} is out of range for an image with {vertex_count} points")]
    VertexOutOfRange {
        /// The offending vertex index.
        vertex: VertexId,
        /// Number of points in the image.
        vertex_count: usize,
    },

    /// Path reconstruction hit a broken or cyclic predecessor chain.
    ///
    /// This indicates an internal bug, not bad input: a correct
    /// relaxation can never produce a chain longer than the vertex
    /// count or a finalized vertex without a predecessor.
    #[error("predecessor chain corrupt at vertex {vertex}")]
    CorruptPredecessorChain {
        /// Vertex at which the walk stalled or exceeded the bound.
        vertex: VertexId,
    },
}
