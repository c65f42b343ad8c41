//! Angle and rotation helpers shared by the orbit model.
//!
//! The reference plane is the world XZ plane, with +Y as its normal.

use core::f64::consts::TAU;

use glam::{DQuat, DVec3};

use crate::AXIS_Z;

/// The normal of the reference plane.
pub const PLANE_NORMAL: DVec3 = DVec3::Y;

/// The body-frame axis the inclination tilt happens about.
///
/// This is the direction of true anomaly 90° before any rotation is applied,
/// so it is also the line of nodes in the periapsis-rotated frame.
pub const TILT_AXIS: DVec3 = DVec3::new(0.0, 0.0, AXIS_Z);

/// Wraps an angle in radians into `[0, TAU)`.
///
/// `rem_euclid` can round a tiny negative input up to exactly `TAU`,
/// which is folded back to zero here.
#[inline]
pub fn normalize_radians(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Wraps an angle in degrees into `[0, 360)`.
#[inline]
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Builds the rotation carrying body-frame vectors into world space.
///
/// The rotations are applied in this order, which must not change:
/// 1. argument of periapsis, about the plane normal
/// 2. inclination, about [`TILT_AXIS`]
/// 3. longitude of ascending node, about the plane normal
///
/// All angles are in radians.
pub fn orbital_rotation(inclination: f64, arg_pe: f64, long_asc_node: f64) -> DQuat {
    let periapsis = DQuat::from_axis_angle(PLANE_NORMAL, arg_pe);
    let tilt = DQuat::from_axis_angle(TILT_AXIS, inclination);
    let node = DQuat::from_axis_angle(PLANE_NORMAL, long_asc_node);

    node * tilt * periapsis
}

/// Places an in-plane point at a radius and true anomaly into the
/// (unrotated) body frame.
#[inline]
pub fn body_frame_point(radius: f64, true_anomaly: f64) -> DVec3 {
    let (sin, cos) = true_anomaly.sin_cos();
    DVec3::new(radius * cos, 0.0, AXIS_Z * radius * sin)
}
