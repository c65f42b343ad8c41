//! Point sampling of an orbit's outline, for drawing.
//!
//! Samples are spaced evenly in true anomaly rather than in time, so a
//! highly eccentric orbit gets the same angular resolution near apoapsis
//! as near periapsis.

use core::f64::consts::TAU;

use glam::{DVec2, DVec3};
use log::debug;

use crate::{elements::check_sample_count, OrbitError, OrbitModel};

/// Samples the orbit outline in world space.
///
/// Returns `samples + 1` points: `samples` points evenly spaced in true
/// anomaly starting at periapsis, followed by the first point again to
/// close the loop.
///
/// # Errors
/// Fails with [`OrbitError::TooFewSamples`] when `samples < 3`.
///
/// # Example
/// ```
/// use keplerian_orbit::{sampling, OrbitModel};
///
/// let orbit = OrbitModel::default();
/// let points = sampling::boundary_3d(&orbit, 8).unwrap();
///
/// assert_eq!(points.len(), 9);
/// assert_eq!(points.first(), points.last());
/// assert!(sampling::boundary_3d(&orbit, 2).is_err());
/// ```
pub fn boundary_3d(orbit: &OrbitModel, samples: usize) -> Result<Vec<DVec3>, OrbitError> {
    check_sample_count(samples)?;

    let step = TAU / samples as f64;
    let mut points: Vec<DVec3> = Vec::with_capacity(samples + 1);

    for i in 0..samples {
        points.push(orbit.position_at_true_anomaly_rad(i as f64 * step));
    }
    points.push(points[0]);

    Ok(points)
}

/// Projects world-space points onto the reference plane.
///
/// The reference plane is world XZ, so a point `(x, y, z)` becomes `(x, z)`.
pub fn project_to_reference_plane(points: &[DVec3]) -> Vec<DVec2> {
    points.iter().map(|p| DVec2::new(p.x, p.z)).collect()
}

/// Builds a triangle fan from a centre point to a closed boundary.
///
/// Each consecutive pair of boundary points forms one triangle with the
/// centre, emitted as `[center, boundary[i], boundary[i + 1]]`. A closed
/// boundary of `n + 1` points therefore gives `3n` points.
pub fn triangle_fan(center: DVec3, boundary: &[DVec3]) -> Vec<DVec3> {
    let mut triangles = Vec::with_capacity(boundary.len().saturating_sub(1) * 3);

    for pair in boundary.windows(2) {
        triangles.push(center);
        triangles.push(pair[0]);
        triangles.push(pair[1]);
    }

    triangles
}

/// The last outline sampled by an [`OrbitModel`].
///
/// This is a snapshot: it is replaced by the next sampling request, and is
/// *not* updated when the orbit's elements change afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampledBoundary {
    samples: usize,
    points_3d: Vec<DVec3>,
    points_2d: Vec<DVec2>,
}

impl SampledBoundary {
    pub(crate) fn sample(orbit: &OrbitModel, samples: usize) -> Result<Self, OrbitError> {
        let points_3d = boundary_3d(orbit, samples)?;
        let points_2d = project_to_reference_plane(&points_3d);

        debug!("Sampled orbit boundary with {samples} samples");

        Ok(Self {
            samples,
            points_3d,
            points_2d,
        })
    }

    pub(crate) fn clear(&mut self) {
        self.samples = 0;
        self.points_3d.clear();
        self.points_2d.clear();
    }

    /// The sample count the snapshot was taken with, or zero if empty.
    pub fn sample_count(&self) -> usize {
        self.samples
    }

    /// Whether nothing has been sampled yet (or the cache was cleared).
    pub fn is_empty(&self) -> bool {
        self.points_3d.is_empty()
    }

    /// The sampled world-space points, closed.
    pub fn points_3d(&self) -> &[DVec3] {
        &self.points_3d
    }

    /// The sampled points projected onto the reference plane, closed.
    pub fn points_2d(&self) -> &[DVec2] {
        &self.points_2d
    }
}
