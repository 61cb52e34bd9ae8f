//! The scalar cost image the pixel graph is built from.
//!
//! A [`CostImage`] is a dense scalar field over a structured grid:
//! dimensions, per-axis spacing, a world-space origin, and one `f64`
//! scalar per point. Point ids are flat indices in `i + j*nx + k*nx*ny`
//! order. The image itself may be declared with any dimensions; the
//! adjacency builder accepts only images describing a single 2D slice
//! (exactly one axis of extent 1).
//!
//! Scalars are the traversal cost surface: lower values are cheaper to
//! follow. A non-finite scalar marks its pixel impassable: such pixels
//! are excluded from the graph entirely, which is how callers mask
//! regions off.
//!
//! Every mutation bumps a version counter. The adjacency builder stamps
//! its static-cost cache with the version it was built from and rebuilds
//! when the two disagree.

use crate::types::{GeodesicError, Point3, VertexId};

/// A 2D (or single-slice-of-3D) scalar cost image.
#[derive(Debug, Clone)]
pub struct CostImage {
    dims: [usize; 3],
    spacing: [f64; 3],
    origin: [f64; 3],
    scalars: Vec<f64>,
    version: u64,
}

/// The two in-plane axes of a planar image, with precomputed extents
/// and flat-index strides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SlicePlane {
    /// First in-plane axis (0, 1, or 2).
    pub axis_a: usize,
    /// Second in-plane axis, always greater than `axis_a`.
    pub axis_b: usize,
    /// Extent along `axis_a`.
    pub extent_a: usize,
    /// Extent along `axis_b`.
    pub extent_b: usize,
    /// Flat-index stride of one step along `axis_a`.
    pub stride_a: usize,
    /// Flat-index stride of one step along `axis_b`.
    pub stride_b: usize,
}

impl CostImage {
    /// Create a cost image from explicit geometry and a scalar buffer.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::EmptyImage`] if any dimension is zero,
    /// [`GeodesicError::ScalarLengthMismatch`] if `scalars` does not
    /// hold exactly one value per point, and
    /// [`GeodesicError::MalformedGeometry`] if any spacing is
    /// non-finite or non-positive or any origin component is
    /// non-finite.
    pub fn new(
        dims: [usize; 3],
        spacing: [f64; 3],
        origin: [f64; 3],
        scalars: Vec<f64>,
    ) -> Result<Self, GeodesicError> {
        if dims.iter().any(|&d| d == 0) {
            return Err(GeodesicError::EmptyImage);
        }
        let expected = dims[0] * dims[1] * dims[2];
        if scalars.len() != expected {
            return Err(GeodesicError::ScalarLengthMismatch {
                dims,
                expected,
                actual: scalars.len(),
            });
        }
        if spacing.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(GeodesicError::MalformedGeometry(format!(
                "spacing must be finite and positive, got {spacing:?}"
            )));
        }
        if origin.iter().any(|o| !o.is_finite()) {
            return Err(GeodesicError::MalformedGeometry(format!(
                "origin must be finite, got {origin:?}"
            )));
        }
        Ok(Self {
            dims,
            spacing,
            origin,
            scalars,
            version: 0,
        })
    }

    /// Create an XY-plane image with unit spacing and a zero origin.
    ///
    /// `scalars` is row-major: index `x + y*width`.
    ///
    /// # Errors
    ///
    /// Same validation as [`CostImage::new`].
    pub fn from_scalars_2d(
        width: usize,
        height: usize,
        scalars: Vec<f64>,
    ) -> Result<Self, GeodesicError> {
        Self::new(
            [width, height, 1],
            [1.0, 1.0, 1.0],
            [0.0, 0.0, 0.0],
            scalars,
        )
    }

    /// Image dimensions `(nx, ny, nz)`.
    #[must_use]
    pub const fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Per-axis spacing.
    #[must_use]
    pub const fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// World-space origin of point (0, 0, 0).
    #[must_use]
    pub const fn origin(&self) -> [f64; 3] {
        self.origin
    }

    /// Total number of points.
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Mutation counter; incremented by every scalar mutation.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Scalar value at a vertex, or `None` when out of range.
    #[must_use]
    pub fn scalar(&self, vertex: VertexId) -> Option<f64> {
        self.scalars.get(vertex).copied()
    }

    /// Whether the vertex carries a finite scalar.
    ///
    /// Non-finite scalars mark impassable pixels.
    #[must_use]
    pub fn is_passable(&self, vertex: VertexId) -> bool {
        self.scalar(vertex).is_some_and(f64::is_finite)
    }

    /// Overwrite the scalar at a vertex, bumping the version counter.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::VertexOutOfRange`] when `vertex` is not
    /// a point of this image.
    pub fn set_scalar(&mut self, vertex: VertexId, value: f64) -> Result<(), GeodesicError> {
        let vertex_count = self.vertex_count();
        let slot = self
            .scalars
            .get_mut(vertex)
            .ok_or(GeodesicError::VertexOutOfRange {
                vertex,
                vertex_count,
            })?;
        *slot = value;
        self.version += 1;
        Ok(())
    }

    /// Overwrite every scalar, bumping the version counter.
    pub fn fill(&mut self, value: f64) {
        self.scalars.fill(value);
        self.version += 1;
    }

    /// Structured coordinates `(i, j, k)` of a flat point id.
    #[must_use]
    pub const fn ijk(&self, vertex: VertexId) -> [usize; 3] {
        let nx = self.dims[0];
        let ny = self.dims[1];
        [vertex % nx, (vertex / nx) % ny, vertex / (nx * ny)]
    }

    /// Flat point id of structured coordinates, or `None` when outside
    /// the image.
    #[must_use]
    pub fn vertex_id(&self, i: usize, j: usize, k: usize) -> Option<VertexId> {
        if i < self.dims[0] && j < self.dims[1] && k < self.dims[2] {
            Some(i + j * self.dims[0] + k * self.dims[0] * self.dims[1])
        } else {
            None
        }
    }

    /// World-space coordinates of a vertex, or `None` when out of range.
    #[must_use]
    pub fn point(&self, vertex: VertexId) -> Option<Point3> {
        if vertex < self.vertex_count() {
            Some(self.point_at(vertex))
        } else {
            None
        }
    }

    /// World-space coordinates of a trusted in-range vertex.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) const fn point_at(&self, vertex: VertexId) -> Point3 {
        let [i, j, k] = self.ijk(vertex);
        Point3::new(
            self.origin[0] + i as f64 * self.spacing[0],
            self.origin[1] + j as f64 * self.spacing[1],
            self.origin[2] + k as f64 * self.spacing[2],
        )
    }

    /// Scalar at a trusted in-range vertex.
    pub(crate) fn scalar_at(&self, vertex: VertexId) -> f64 {
        self.scalars[vertex]
    }

    /// Minimum and maximum over the finite scalars, or `None` when
    /// every pixel is impassable.
    #[must_use]
    pub fn scalar_range(&self) -> Option<(f64, f64)> {
        let mut range: Option<(f64, f64)> = None;
        for &s in &self.scalars {
            if !s.is_finite() {
                continue;
            }
            range = Some(match range {
                None => (s, s),
                Some((lo, hi)) => (lo.min(s), hi.max(s)),
            });
        }
        range
    }

    /// Identify the two in-plane axes of a planar image.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::NotPlanar`] unless exactly one axis has
    /// extent 1 and the two remaining axes have extent at least 2.
    pub(crate) fn slice_plane(&self) -> Result<SlicePlane, GeodesicError> {
        let strides = [1, self.dims[0], self.dims[0] * self.dims[1]];
        let planar: Vec<usize> = (0..3).filter(|&axis| self.dims[axis] != 1).collect();
        match planar[..] {
            [a, b] if self.dims[a] >= 2 && self.dims[b] >= 2 => Ok(SlicePlane {
                axis_a: a,
                axis_b: b,
                extent_a: self.dims[a],
                extent_b: self.dims[b],
                stride_a: strides[a],
                stride_b: strides[b],
            }),
            _ => Err(GeodesicError::NotPlanar { dims: self.dims }),
        }
    }

    /// In-plane pixel diagonal, the edge-length normalizer.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::NotPlanar`] for non-planar images.
    pub(crate) fn pixel_size(&self) -> Result<f64, GeodesicError> {
        let plane = self.slice_plane()?;
        Ok(self.spacing[plane.axis_a].hypot(self.spacing[plane.axis_b]))
    }
}
