//! Conversions between the mean, eccentric, and true anomalies of an
//! elliptic orbit.
//!
//! Every function here is pure and works in radians. The results are
//! wrapped into `[0, TAU)`.
//!
//! The mean anomaly is the fraction of the period elapsed since periapsis,
//! expressed as an angle. The eccentric anomaly is the angle of the body's
//! projection onto the ellipse's auxiliary circle, seen from the centre.
//! The true anomaly is the actual geometric angle between periapsis and the
//! body, seen from the focus.
//!
//! — [Wikipedia](https://en.wikipedia.org/wiki/Mean_anomaly)

use log::trace;

use crate::{math::normalize_radians, KEPLER_MAX_ITERS, KEPLER_TOLERANCE};

#[inline]
fn keplers_equation(mean_anomaly: f64, eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    eccentric_anomaly - (eccentricity * eccentric_anomaly.sin()) - mean_anomaly
}

#[inline]
fn keplers_equation_derivative(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    1.0 - (eccentricity * eccentric_anomaly.cos())
}

/// Gets the mean motion, the average angular speed over one revolution.
///
/// `n = sqrt(mu / a^3)`
#[inline]
pub fn mean_motion(gravitational_parameter: f64, semi_major_axis: f64) -> f64 {
    (gravitational_parameter / semi_major_axis.powi(3)).sqrt()
}

/// Solves Kepler's equation `M = E - e sin(E)` for the eccentric anomaly.
///
/// Newton-Raphson iteration starting at `E = M`, for at most
/// [`KEPLER_MAX_ITERS`] steps, stopping early once a step is smaller
/// than [`KEPLER_TOLERANCE`].
///
/// The eccentricity must be within `[0, 1)`. The result is only fully
/// converged up to about `e = 0.95`; see [`KEPLER_MAX_ITERS`].
///
/// # Example
/// ```
/// use keplerian_orbit::anomaly::eccentric_anomaly_at_mean_anomaly;
///
/// let e = 0.3;
/// let ecc_anom = eccentric_anomaly_at_mean_anomaly(1.2, e);
/// assert!((ecc_anom - e * ecc_anom.sin() - 1.2).abs() < 1e-12);
/// ```
pub fn eccentric_anomaly_at_mean_anomaly(mean_anomaly: f64, eccentricity: f64) -> f64 {
    let mean_anomaly = normalize_radians(mean_anomaly);
    let mut eccentric_anomaly = mean_anomaly;

    for _ in 0..KEPLER_MAX_ITERS {
        let step = -keplers_equation(mean_anomaly, eccentric_anomaly, eccentricity)
            / keplers_equation_derivative(eccentric_anomaly, eccentricity);
        eccentric_anomaly += step;

        if step.abs() < KEPLER_TOLERANCE {
            return normalize_radians(eccentric_anomaly);
        }
    }

    trace!(
        "Kepler solver hit {KEPLER_MAX_ITERS} iterations (M = {mean_anomaly}, e = {eccentricity})"
    );

    normalize_radians(eccentric_anomaly)
}

/// Gets the true anomaly at a given eccentric anomaly.
///
/// `atan2` keeps the quadrant right over the whole orbit.
pub fn true_anomaly_at_eccentric_anomaly(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    let (sin, cos) = eccentric_anomaly.sin_cos();
    let y = (1.0 - eccentricity * eccentricity).sqrt() * sin;
    let x = cos - eccentricity;

    normalize_radians(y.atan2(x))
}

/// Gets the eccentric anomaly at a given true anomaly.
///
/// This is the inverse of [`true_anomaly_at_eccentric_anomaly`].
pub fn eccentric_anomaly_at_true_anomaly(true_anomaly: f64, eccentricity: f64) -> f64 {
    let (sin, cos) = true_anomaly.sin_cos();
    let y = (1.0 - eccentricity * eccentricity).sqrt() * sin;
    let x = eccentricity + cos;

    normalize_radians(y.atan2(x))
}

/// Gets the mean anomaly at a given eccentric anomaly, straight from
/// Kepler's equation.
pub fn mean_anomaly_at_eccentric_anomaly(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    normalize_radians(eccentric_anomaly - eccentricity * eccentric_anomaly.sin())
}

/// Gets the true anomaly at a given mean anomaly.
///
/// This goes through the Kepler solver.
pub fn true_anomaly_at_mean_anomaly(mean_anomaly: f64, eccentricity: f64) -> f64 {
    true_anomaly_at_eccentric_anomaly(
        eccentric_anomaly_at_mean_anomaly(mean_anomaly, eccentricity),
        eccentricity,
    )
}

/// Gets the mean anomaly at a given true anomaly.
pub fn mean_anomaly_at_true_anomaly(true_anomaly: f64, eccentricity: f64) -> f64 {
    mean_anomaly_at_eccentric_anomaly(
        eccentric_anomaly_at_true_anomaly(true_anomaly, eccentricity),
        eccentricity,
    )
}

/// Gets the distance from the focus at a given true anomaly.
///
/// `r = p / (1 + e cos(v))`, where `p` is the semi-latus rectum.
#[inline]
pub fn radius_at_true_anomaly(semi_latus_rectum: f64, eccentricity: f64, true_anomaly: f64) -> f64 {
    semi_latus_rectum / (1.0 + eccentricity * true_anomaly.cos())
}
