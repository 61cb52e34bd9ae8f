//! Trace diagnostics: timing and counts for each stage.
//!
//! These diagnostics are permanent instrumentation intended for cost
//! weight tuning and cache-policy verification. Every call to
//! [`GeodesicTracer::trace_with_diagnostics`](crate::GeodesicTracer::trace_with_diagnostics)
//! collects diagnostics alongside the trace result.
//!
//! Duration measurements use [`std::time::Duration`]. Timestamps are
//! captured internally via the `web-time` crate, which uses
//! `performance.now()` on WASM and `std::time::Instant` on native.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::grid::CacheUpdate;

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceDiagnostics {
    /// Adjacency build / static-cost cache stage. `None` when the
    /// cached graph was reused untouched (the curvature-only-change
    /// fast path).
    pub adjacency: Option<StageDiagnostics>,
    /// Front-set shortest-path search stage.
    pub search: StageDiagnostics,
    /// Predecessor-chain reconstruction stage. `None` when the end
    /// vertex was unreachable and there was nothing to reconstruct.
    pub reconstruction: Option<StageDiagnostics>,
    /// Wall-clock duration of the entire trace (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: TraceSummary,
}

/// Diagnostics for a single trace stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by trace stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Adjacency construction / static-cost cache metrics.
    Adjacency {
        /// What the cache had to do: full rebuild or cost refresh.
        update: CacheUpdate,
        /// Vertices in the image.
        vertex_count: usize,
        /// Directed edges in the adjacency.
        edge_count: usize,
    },
    /// Shortest-path search metrics.
    Search {
        /// Vertices extracted from the front and finalized.
        vertices_finalized: usize,
        /// Relaxation attempts.
        edges_relaxed: usize,
        /// Peak heap size during the search.
        front_peak: usize,
        /// Vertices the sparse search state touched.
        vertices_touched: usize,
        /// Whether the end vertex was finalized.
        reached: bool,
    },
    /// Path reconstruction metrics.
    Reconstruction {
        /// Points in the emitted polyline.
        path_points: usize,
    },
}

/// Summary counts of a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceSummary {
    /// Vertices in the image, passable or not.
    pub vertex_count: usize,
    /// Directed edges in the adjacency.
    pub edge_count: usize,
    /// Vertices the search touched; the front-set design keeps this
    /// proportional to the explored region, not the image size.
    pub vertices_touched: usize,
    /// Whether the end vertex was reached.
    pub reached: bool,
    /// Points in the output path, when one was found.
    pub path_points: Option<usize>,
}
