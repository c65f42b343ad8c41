//! # Keplerian Orbit Model
//! This library crate models a body travelling on a closed Keplerian orbit
//! around a central body, and predicts where that body is at any given time.
//!
//! Unlike a Newtonian simulation, nothing here steps through time. Each query
//! goes straight from the orbital elements to an answer through the anomaly
//! pipeline:
//!
//! time → mean longitude → mean anomaly → eccentric anomaly → true anomaly → position
//!
//! The only numerical step is solving Kepler's equation for the eccentric
//! anomaly, which converges within a handful of Newton iterations for every
//! supported eccentricity.
//!
//! ## Getting started
//! This crate is built around [`OrbitModel`]. It owns the nine canonical
//! orbital elements, validates every change to them, and derives all the
//! geometry (foci, apsides, nodes) on demand.
//!
//! Visualization front ends can ask the model for a sampled outline of the
//! ellipse through [`OrbitModel::sample_boundary_3d`] and friends, and turn
//! those point sequences into lines or meshes.
//!
//! ## Units
//! Angles at the public boundary are in degrees. Every angle-producing query
//! also has a `_rad` variant for callers that work in radians. Distances, masses
//! and times can be in any unit system, as long as it is consistent with the
//! gravitational constant in [`ModelConfig`].
//!
//! ## Frame
//! The reference plane is the world XZ plane and +Y is its normal. A prograde
//! orbit turns positively (counterclockwise seen from +Y) about that normal.
//!
//! ## Example
//!
//! ```rust
//! use glam::DVec3;
//!
//! use keplerian_orbit::OrbitModel;
//!
//! # fn main() -> Result<(), keplerian_orbit::OrbitError> {
//! let orbit = OrbitModel::create(
//!     DVec3::ZERO, // major focus
//!     300.0,       // semi-major axis
//!     0.75,        // eccentricity
//!     0.0,         // inclination, degrees
//!     25.0,        // longitude of ascending node, degrees
//!     0.0,         // argument of periapsis, degrees
//!     10.0,        // central body mass
//!     0.0,         // epoch
//!     0.0,         // mean longitude at epoch, degrees
//! )?;
//!
//! assert!((orbit.periapsis() - 75.0).abs() < 1e-9);
//! assert!((orbit.apoapsis() - 525.0).abs() < 1e-9);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod anomaly;
mod config;
mod elements;
mod error;
pub mod math;
mod observer;
mod orbit;
pub mod sampling;

use glam::{DVec2, DVec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use config::ModelConfig;
pub use elements::OrbitalElements;
pub use error::OrbitError;
pub use observer::{ElementChange, ElementKind, ObserverId};
pub use orbit::OrbitModel;
pub use sampling::SampledBoundary;

/// The sign of the body-frame Z axis.
///
/// A body-frame point at true anomaly `v` sits at
/// `(r cos v, 0, AXIS_Z * r sin v)`. The negative sign makes prograde
/// motion a positive, right-handed rotation about the +Y plane normal.
pub const AXIS_Z: f64 = -1.0;

/// The maximum number of Newton iterations spent on Kepler's equation.
///
/// Starting from `E = M`, this converges to double precision for
/// eccentricities up to about 0.95. Past that, the iteration can still be
/// far from the root near periapsis when the cap is hit, and the last
/// iterate is returned as is.
pub const KEPLER_MAX_ITERS: u32 = 10;

/// The step size below which the Kepler solver stops iterating early.
pub const KEPLER_TOLERANCE: f64 = 1e-10;

/// The smallest number of boundary samples accepted by the sampling methods.
pub const MIN_SAMPLES: usize = 3;

/// A struct representing a 3x2 matrix.
///
/// This struct is used to store the transformation matrix
/// for transforming an in-plane 2D vector into a 3D world vector.
///
/// The first column is the direction of periapsis (P), and the second
/// column is the direction of motion at periapsis (Q), both in world space.
///
/// Each element is named `eXY`, where `X` is the row and `Y` is the column.
///
/// # Example
/// ```
/// use glam::{DVec2, DVec3};
///
/// use keplerian_orbit::Matrix3x2;
///
/// let matrix = Matrix3x2 {
///    e11: 1.0, e12: 0.0,
///    e21: 0.0, e22: 0.0,
///    e31: 0.0, e32: -1.0,
/// };
///
/// let result = matrix.dot_vec(DVec2::new(1.0, 2.0));
///
/// assert_eq!(result, DVec3::new(1.0, 0.0, -2.0));
/// ```
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Matrix3x2 {
    // Element XY
    pub e11: f64,
    pub e12: f64,
    pub e21: f64,
    pub e22: f64,
    pub e31: f64,
    pub e32: f64,
}

impl Matrix3x2 {
    /// The transformation of an untilted orbit with no rotations applied.
    pub const IDENTITY: Self = Self {
        e11: 1.0,
        e12: 0.0,
        e21: 0.0,
        e22: 0.0,
        e31: 0.0,
        e32: AXIS_Z,
    };

    /// Builds a matrix from its two columns.
    pub fn from_cols(p: DVec3, q: DVec3) -> Self {
        Self {
            e11: p.x,
            e12: q.x,
            e21: p.y,
            e22: q.y,
            e31: p.z,
            e32: q.z,
        }
    }

    /// Computes a dot product between this matrix and a 2D vector.
    pub fn dot_vec(&self, vec: DVec2) -> DVec3 {
        DVec3::new(
            vec.x * self.e11 + vec.y * self.e12,
            vec.x * self.e21 + vec.y * self.e22,
            vec.x * self.e31 + vec.y * self.e32,
        )
    }
}

/// A struct representing a position and velocity at a point in the orbit.
///
/// The position is in world space, so it includes the offset of the
/// major focus. The velocity is relative to the central body.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StateVectors {
    /// The 3D position at a point in the orbit.
    pub position: DVec3,
    /// The 3D velocity at a point in the orbit.
    pub velocity: DVec3,
}

#[cfg(test)]
mod tests;
