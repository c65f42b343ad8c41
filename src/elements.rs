use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{ModelConfig, OrbitError, MIN_SAMPLES};

/// The full set of canonical elements of an elliptic orbit.
///
/// This is a plain value with public fields, so any combination can be
/// written into it. Use [`validate`][Self::validate] (or hand it to
/// [`OrbitModel::new`][crate::OrbitModel::new], which does so) before
/// trusting it.
///
/// Angles are stored in degrees.
///
/// # Example
/// ```
/// use glam::DVec3;
/// use keplerian_orbit::{OrbitalElements, OrbitError};
///
/// let mut elements = OrbitalElements {
///     major_focus: DVec3::new(450.0, 150.0, 0.0),
///     semi_major_axis: 300.0,
///     eccentricity: 0.75,
///     central_body_mass: 10.0,
///     ..OrbitalElements::default()
/// };
/// assert!(elements.validate().is_ok());
///
/// elements.semi_major_axis = -5.0;
/// assert_eq!(
///     elements.validate(),
///     Err(OrbitError::NonPositiveSemiMajorAxis(-5.0)),
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrbitalElements {
    /// The world-space position of the central body.
    pub major_focus: DVec3,

    /// Half the length of the ellipse's major axis.
    pub semi_major_axis: f64,

    /// The shape of the ellipse, within `[0, 1)`.
    /// 0 is a circle; values approaching 1 are increasingly elongated.
    ///
    /// See more: <https://en.wikipedia.org/wiki/Orbital_eccentricity>
    pub eccentricity: f64,

    /// The tilt of the orbital plane against the reference plane, in degrees.
    ///
    /// A negative inclination swaps which node is the ascending one.
    pub inclination: f64,

    /// The rotation of the line of nodes about the plane normal, in degrees.
    pub long_asc_node: f64,

    /// The rotation locating periapsis within the orbital plane, in degrees.
    pub arg_pe: f64,

    /// The (scaled) mass of the central body.
    pub central_body_mass: f64,

    /// The time at which [`mean_longitude_at_epoch`][Self::mean_longitude_at_epoch]
    /// is measured.
    pub epoch: f64,

    /// The mean longitude at the epoch, in degrees.
    pub mean_longitude_at_epoch: f64,
}

impl OrbitalElements {
    /// Checks every element against its constraint.
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), OrbitError> {
        check_vector("major focus", self.major_focus)?;
        check_semi_major_axis(self.semi_major_axis)?;
        check_eccentricity(self.eccentricity)?;
        check_finite("inclination", self.inclination)?;
        check_finite("longitude of ascending node", self.long_asc_node)?;
        check_finite("argument of periapsis", self.arg_pe)?;
        check_mass(self.central_body_mass)?;
        check_finite("epoch", self.epoch)?;
        check_finite("mean longitude at epoch", self.mean_longitude_at_epoch)?;
        Ok(())
    }
}

impl Default for OrbitalElements {
    /// A unit circle around the origin with no tilt.
    fn default() -> Self {
        Self {
            major_focus: DVec3::ZERO,
            semi_major_axis: 1.0,
            eccentricity: 0.0,
            inclination: 0.0,
            long_asc_node: 0.0,
            arg_pe: 0.0,
            central_body_mass: 1.0,
            epoch: 0.0,
            mean_longitude_at_epoch: 0.0,
        }
    }
}

pub(crate) fn check_finite(element: &'static str, value: f64) -> Result<(), OrbitError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(OrbitError::NonFiniteValue { element, value })
    }
}

pub(crate) fn check_vector(element: &'static str, value: DVec3) -> Result<(), OrbitError> {
    check_finite(element, value.x)?;
    check_finite(element, value.y)?;
    check_finite(element, value.z)
}

pub(crate) fn check_semi_major_axis(value: f64) -> Result<(), OrbitError> {
    check_finite("semi-major axis", value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(OrbitError::NonPositiveSemiMajorAxis(value))
    }
}

pub(crate) fn check_eccentricity(value: f64) -> Result<(), OrbitError> {
    check_finite("eccentricity", value)?;
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(OrbitError::EccentricityOutOfRange(value))
    }
}

pub(crate) fn check_mass(value: f64) -> Result<(), OrbitError> {
    check_finite("central body mass", value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(OrbitError::NonPositiveMass(value))
    }
}

pub(crate) fn check_sample_count(requested: usize) -> Result<(), OrbitError> {
    if requested < MIN_SAMPLES {
        Err(OrbitError::TooFewSamples {
            requested,
            min: MIN_SAMPLES,
        })
    } else {
        Ok(())
    }
}

pub(crate) fn check_config(config: &ModelConfig) -> Result<(), OrbitError> {
    let g = config.gravitational_constant;
    check_finite("gravitational constant", g)?;
    if g <= 0.0 {
        return Err(OrbitError::NonPositiveGravitationalConstant(g));
    }
    check_sample_count(config.default_sample_count)
}
