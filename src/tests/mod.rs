#![cfg(test)]

use core::f64::consts::{PI, TAU};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use glam::{DVec2, DVec3};

use crate::{
    ElementKind, ModelConfig, OrbitError, OrbitModel, OrbitalElements, AXIS_Z, MIN_SAMPLES,
};

const ORBIT_POLL_POINTS: usize = 512;
const RANDOM_ORBITS: usize = 200;


use assertions::*;
use polling::*;
use seeders::*;

fn scenario_orbit() -> OrbitModel {
    OrbitModel::create(
        DVec3::new(450.0, 150.0, 0.0),
        300.0,
        0.75,
        0.0,
        25.0,
        0.0,
        10.0,
        0.0,
        0.0,
    )
    .unwrap()
}

fn tilted(inclination: f64) -> OrbitModel {
    OrbitModel::with_config(
        OrbitalElements {
            major_focus: DVec3::new(-3.0, 7.0, 2.0),
            semi_major_axis: 10.0,
            eccentricity: 0.4,
            inclination,
            long_asc_node: 40.0,
            arg_pe: 70.0,
            central_body_mass: 5.0,
            epoch: 0.0,
            mean_longitude_at_epoch: 0.0,
        },
        unit_config(),
    )
    .unwrap()
}

#[test]
fn unit_orbit_positions() {
    let orbit = OrbitModel::default();

    let tests = [
        ("unit orbit 1", 0.0 * PI, DVec3::new(1.0, 0.0, 0.0)),
        ("unit orbit 2", 0.5 * PI, DVec3::new(0.0, 0.0, -1.0)),
        ("unit orbit 3", 1.0 * PI, DVec3::new(-1.0, 0.0, 0.0)),
        ("unit orbit 4", 1.5 * PI, DVec3::new(0.0, 0.0, 1.0)),
        ("unit orbit 5", 2.0 * PI, DVec3::new(1.0, 0.0, 0.0)),
    ];

    for (what, angle, expected) in tests {
        assert_almost_eq_vec3(orbit.position_at_true_anomaly_rad(angle), expected, what);
        // mu = 1 and a = 1, so time and angle match
        assert_almost_eq_vec3(orbit.position_at(angle), expected, what);
    }
}

#[test]
fn shape_identities() {
    for _ in 0..RANDOM_ORBITS {
        let orbit = random_any();
        let a = orbit.semi_major_axis();
        let e = orbit.eccentricity();

        assert_almost_eq_within(
            orbit.semi_minor_axis(),
            a * (1.0 - e * e).sqrt(),
            1e-9 * a,
            "semi-minor axis",
        );
        assert_almost_eq_within(
            orbit.semi_latus_rectum(),
            a * (1.0 - e * e),
            1e-9 * a,
            "semi-latus rectum",
        );
        assert_almost_eq_within(
            orbit.apoapsis() + orbit.periapsis(),
            2.0 * a,
            1e-9 * a,
            "apoapsis + periapsis",
        );
        assert_almost_eq_within(
            orbit.orbital_period(),
            TAU / (orbit.gravitational_parameter() / a.powi(3)).sqrt(),
            1e-9 * orbit.orbital_period(),
            "orbital period",
        );
    }
}

#[test]
fn position_round_trips_through_inverse_rotation() {
    for _ in 0..RANDOM_ORBITS {
        let orbit = random_any();
        let scale = orbit.apoapsis();

        for t in poll_times(&orbit).into_iter().step_by(16) {
            let true_anomaly = orbit.true_anomaly_at_rad(t);
            let body = orbit.world_to_body_frame(orbit.position_at(t));

            assert_almost_eq_scaled(body.y, 0.0, scale, "out-of-plane body coordinate");
            assert_almost_eq_scaled(
                body.length(),
                orbit.radius_at_true_anomaly_rad(true_anomaly),
                scale,
                "radius",
            );
            assert_almost_eq_angle(
                (AXIS_Z * body.z).atan2(body.x),
                true_anomaly,
                "true anomaly from body position",
            );
        }
    }
}

#[test]
fn position_is_periodic() {
    for _ in 0..RANDOM_ORBITS {
        let orbit = random_any();
        let period = orbit.orbital_period();
        let scale = orbit.apoapsis() + orbit.major_focus().length();

        for t in poll_times(&orbit).into_iter().step_by(32) {
            assert_almost_eq_vec3_scaled(
                orbit.position_at(t),
                orbit.position_at(t + period),
                scale,
                &format!("position at t = {t} and one period later"),
            );
        }
    }
}

#[test]
fn apsides_positions() {
    for _ in 0..RANDOM_ORBITS {
        let orbit = random_any();
        let scale = orbit.apoapsis() + orbit.major_focus().length();

        assert_eq!(
            orbit.position_at_true_anomaly_rad(0.0),
            orbit.periapsis_position()
        );
        assert_almost_eq_vec3_scaled(
            orbit.position_at_true_anomaly_rad(PI),
            orbit.apoapsis_position(),
            scale,
            "apoapsis",
        );
        assert_almost_eq_vec3_scaled(
            orbit.position_at(orbit.time_of_periapsis_passage()),
            orbit.periapsis_position(),
            scale,
            "position at periapsis passage",
        );
        assert_almost_eq_scaled(
            orbit.periapsis_position().distance(orbit.major_focus()),
            orbit.periapsis(),
            scale,
            "periapsis distance",
        );
        assert_almost_eq_scaled(
            orbit.apoapsis_position().distance(orbit.major_focus()),
            orbit.apoapsis(),
            scale,
            "apoapsis distance",
        );
        assert_almost_eq_vec3_scaled(
            orbit.center(),
            (orbit.periapsis_position() + orbit.apoapsis_position()) * 0.5,
            scale,
            "centre between apsides",
        );
        assert_almost_eq_vec3_scaled(
            orbit.center(),
            (orbit.major_focus() + orbit.minor_focus()) * 0.5,
            scale,
            "centre between foci",
        );
    }
}

#[test]
fn circular_orbit_is_degenerate() {
    for _ in 0..RANDOM_ORBITS {
        let orbit = random_circular();
        let a = orbit.semi_major_axis();

        assert_eq!(orbit.minor_focus(), orbit.major_focus());
        assert_eq!(orbit.center(), orbit.major_focus());
        assert_eq!(orbit.semi_minor_axis(), a);

        for point in poll_orbit(&orbit) {
            assert_almost_eq_scaled(
                point.distance(orbit.major_focus()),
                a,
                a + orbit.major_focus().length(),
                "circular radius",
            );
        }
    }
}

#[test]
fn true_anomaly_increases_over_one_period() {
    let orbit = scenario_orbit();
    let anomalies = poll_true_anomaly(&orbit);

    // Polling starts at epoch, where the mean anomaly is 335°, so the
    // anomaly wraps around exactly once.
    let wraps = anomalies.windows(2).filter(|w| w[1] < w[0]).count();
    assert_eq!(wraps, 1);
}

#[test]
fn scenario_apsides_and_period() {
    let orbit = scenario_orbit();
    let focus = orbit.major_focus();
    let direction = orbit.basis_p();

    let (sin, cos) = 25f64.to_radians().sin_cos();
    assert_almost_eq_vec3(direction, DVec3::new(cos, 0.0, -sin), "periapsis direction");

    assert_almost_eq(orbit.periapsis(), 75.0, "periapsis");
    assert_almost_eq(orbit.apoapsis(), 525.0, "apoapsis");
    assert_almost_eq_vec3(
        orbit.periapsis_position(),
        focus + direction * 75.0,
        "periapsis position",
    );
    assert_almost_eq_vec3(
        orbit.apoapsis_position(),
        focus - direction * 525.0,
        "apoapsis position",
    );

    let mu = ModelConfig::SI_GRAVITATIONAL_CONSTANT * 10.0;
    let expected = TAU / (mu / 300f64.powi(3)).sqrt();
    let relative = (orbit.orbital_period() - expected).abs() / expected;
    assert!(relative < 1e-6, "period off by {relative}");

    // Untilted, so the orbit stays on the focus' plane
    assert_eq!(orbit.periapsis_position_projected(), orbit.periapsis_position());
    assert_eq!(orbit.apoapsis_position_projected(), orbit.apoapsis_position());
}

#[test]
fn invalid_construction_is_rejected() {
    let result = OrbitModel::create(DVec3::ZERO, -5.0, 0.1, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    assert_eq!(result.unwrap_err(), OrbitError::NonPositiveSemiMajorAxis(-5.0));

    let result = OrbitModel::create(DVec3::ZERO, 5.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    assert_eq!(result.unwrap_err(), OrbitError::EccentricityOutOfRange(1.0));

    let result = OrbitModel::create(DVec3::ZERO, 5.0, -0.1, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    assert_eq!(result.unwrap_err(), OrbitError::EccentricityOutOfRange(-0.1));

    let result = OrbitModel::create(DVec3::ZERO, 5.0, 0.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    assert_eq!(result.unwrap_err(), OrbitError::NonPositiveMass(0.0));

    let result = OrbitModel::create(DVec3::ZERO, 5.0, 0.1, f64::NAN, 0.0, 0.0, 1.0, 0.0, 0.0);
    assert!(matches!(
        result.unwrap_err(),
        OrbitError::NonFiniteValue {
            element: "inclination",
            ..
        }
    ));

    let result = OrbitModel::with_config(
        OrbitalElements::default(),
        ModelConfig {
            gravitational_constant: -1.0,
            ..ModelConfig::default()
        },
    );
    assert_eq!(
        result.unwrap_err(),
        OrbitError::NonPositiveGravitationalConstant(-1.0)
    );
}

#[test]
fn rejected_setters_keep_previous_value() {
    let mut orbit = scenario_orbit();
    let before = orbit.elements();

    assert!(orbit.set_semi_major_axis(0.0).is_err());
    assert!(orbit.set_semi_major_axis(-1.0).is_err());
    assert!(orbit.set_eccentricity(1.0).is_err());
    assert!(orbit.set_eccentricity(f64::INFINITY).is_err());
    assert!(orbit.set_central_body_mass(-3.0).is_err());
    assert!(orbit.set_inclination(f64::NAN).is_err());
    assert!(orbit.set_major_focus(DVec3::new(0.0, f64::NAN, 0.0)).is_err());
    assert!(orbit
        .set_config(ModelConfig {
            default_sample_count: 2,
            ..ModelConfig::default()
        })
        .is_err());

    assert_eq!(orbit.elements(), before);
    assert_eq!(*orbit.config(), ModelConfig::default());
    assert!(orbit.validate().is_ok());
}

#[test]
fn accepted_setters_apply_one_element() {
    let mut orbit = scenario_orbit();

    orbit.set_semi_major_axis(120.0).unwrap();
    orbit.set_eccentricity(0.0).unwrap();
    orbit.set_inclination(-35.0).unwrap();
    orbit.set_long_asc_node(400.0).unwrap();
    orbit.set_arg_pe(-10.0).unwrap();
    orbit.set_central_body_mass(2.0).unwrap();
    orbit.set_epoch(5.0).unwrap();
    orbit.set_mean_longitude_at_epoch(12.0).unwrap();
    orbit.set_major_focus(DVec3::ONE).unwrap();

    let elements = orbit.elements();
    assert_eq!(elements.semi_major_axis, 120.0);
    assert_eq!(elements.eccentricity, 0.0);
    assert_eq!(elements.inclination, -35.0);
    assert_eq!(elements.long_asc_node, 400.0);
    assert_eq!(elements.arg_pe, -10.0);
    assert_eq!(elements.central_body_mass, 2.0);
    assert_eq!(elements.epoch, 5.0);
    assert_eq!(elements.mean_longitude_at_epoch, 12.0);
    assert_eq!(elements.major_focus, DVec3::ONE);

    // The radian views follow the stored degrees
    assert_eq!(orbit.inclination_rad(), (-35f64).to_radians());
    assert_eq!(orbit.long_asc_node_rad(), 400f64.to_radians());
    assert_eq!(orbit.arg_pe_rad(), (-10f64).to_radians());
    assert_eq!(orbit.mean_longitude_at_epoch_rad(), 12f64.to_radians());

    // Derived geometry follows immediately
    assert_eq!(orbit.periapsis(), 120.0);
    assert_eq!(orbit.center(), DVec3::ONE);
}

#[test]
fn observers_fire_once_per_accepted_mutation() {
    let mut orbit = scenario_orbit();
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);

    let id = orbit.observe(move |change| {
        seen.fetch_add(1, Ordering::SeqCst);
        if change.kind == ElementKind::SemiMajorAxis {
            assert_eq!(change.elements.semi_major_axis, 42.0);
        }
    });
    assert_eq!(orbit.observer_count(), 1);

    orbit.set_semi_major_axis(42.0).unwrap();
    orbit.set_arg_pe(15.0).unwrap();
    let _ = orbit.set_eccentricity(3.0);
    let _ = orbit.set_central_body_mass(0.0);
    assert_eq!(count.load(Ordering::SeqCst), 2);

    // Clones start without observers
    let mut clone = orbit.clone();
    assert_eq!(clone.observer_count(), 0);
    clone.set_epoch(1.0).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 2);

    assert!(orbit.unobserve(id));
    assert!(!orbit.unobserve(id));
    orbit.set_epoch(1.0).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn nodes_lie_on_reference_plane() {
    for inclination in [5.0, 30.0, 89.0, 135.0, -20.0, -100.0, 200.0, 330.0, -200.0] {
        let orbit = tilted(inclination);
        let focus = orbit.major_focus();
        let scale = orbit.apoapsis() + focus.length();

        let ascending = orbit.ascending_node_position();
        let descending = orbit.descending_node_position();
        assert_almost_eq_scaled(ascending.y, focus.y, scale, "ascending node height");
        assert_almost_eq_scaled(descending.y, focus.y, scale, "descending node height");

        // The line of nodes passes through the focus
        let to_ascending = (ascending - focus).normalize();
        let to_descending = (descending - focus).normalize();
        assert_almost_eq_vec3(to_ascending, -to_descending, "line of nodes");

        let anomaly_of = |point: DVec3| {
            let body = orbit.world_to_body_frame(point);
            (AXIS_Z * body.z).atan2(body.x)
        };
        let rising = orbit.velocity_at_true_anomaly_rad(anomaly_of(ascending));
        let falling = orbit.velocity_at_true_anomaly_rad(anomaly_of(descending));
        assert!(rising.y > 0.0, "ascending node moving down at i = {inclination}");
        assert!(falling.y < 0.0, "descending node moving up at i = {inclination}");
    }
}

#[test]
fn wrapped_inclination_keeps_nodes() {
    for (wrapped, plain) in [(200.0, -160.0), (330.0, -30.0), (-200.0, 160.0), (390.0, 30.0)] {
        let a = tilted(wrapped);
        let b = tilted(plain);

        assert_almost_eq_vec3(
            a.ascending_node_position(),
            b.ascending_node_position(),
            &format!("ascending node at i = {wrapped} vs {plain}"),
        );
        assert_almost_eq_vec3(
            a.descending_node_position(),
            b.descending_node_position(),
            &format!("descending node at i = {wrapped} vs {plain}"),
        );
    }
}

#[test]
fn negative_inclination_swaps_nodes() {
    let prograde = tilted(30.0);
    let retrograde = tilted(-30.0);

    assert_almost_eq_vec3(
        prograde.ascending_node_position(),
        retrograde.descending_node_position(),
        "prograde ascending vs retrograde descending",
    );
    assert_almost_eq_vec3(
        prograde.descending_node_position(),
        retrograde.ascending_node_position(),
        "prograde descending vs retrograde ascending",
    );
}

#[test]
fn untilted_orbit_stays_in_plane() {
    let orbit = tilted(0.0);

    assert_almost_eq_vec3(orbit.plane_normal(), DVec3::Y, "plane normal");
    for point in poll_orbit(&orbit) {
        assert_almost_eq(point.y, orbit.major_focus().y, "height of untilted orbit");
    }
}

#[test]
fn velocity_matches_finite_differences() {
    for _ in 0..RANDOM_ORBITS {
        let mut orbit = random_elliptic();
        orbit.set_major_focus(DVec3::ZERO).unwrap();
        let h = orbit.orbital_period() * 1e-7;

        for t in poll_times(&orbit).into_iter().step_by(64) {
            let velocity = orbit.velocity_at(t);
            let speed = orbit.speed_at(t);
            let estimate = (orbit.position_at(t + h) - orbit.position_at(t - h)) / (2.0 * h);

            assert_almost_eq_scaled(velocity.length(), speed, speed, "speed");
            assert_almost_eq_vec3_scaled(
                estimate,
                velocity,
                speed * 10.0,
                "finite-difference velocity",
            );

            let state = orbit.state_vectors_at(t);
            assert_eq!(state.position, orbit.position_at(t));
            assert_eq!(state.velocity, velocity);
        }
    }
}

#[test]
fn angular_momentum_is_conserved() {
    for _ in 0..RANDOM_ORBITS {
        let orbit = random_any();
        let expected = orbit.specific_angular_momentum();

        for t in poll_times(&orbit).into_iter().step_by(64) {
            let state = orbit.state_vectors_at(t);
            let h = (state.position - orbit.major_focus()).cross(state.velocity);

            assert_almost_eq_scaled(h.length(), expected, expected, "angular momentum");
            assert_almost_eq_vec3(h.normalize(), orbit.plane_normal(), "angular momentum axis");
        }
    }
}

#[test]
fn derived_angles_are_consistent() {
    for _ in 0..RANDOM_ORBITS {
        let orbit = random_any();
        let arg_pe = orbit.arg_pe_rad();
        let lan = orbit.long_asc_node_rad();

        for t in poll_times(&orbit).into_iter().step_by(32) {
            let t = t - 3.0 * orbit.orbital_period();
            let mean = orbit.mean_anomaly_at_rad(t);
            let true_anomaly = orbit.true_anomaly_at_rad(t);

            assert!((0.0..TAU).contains(&mean));
            assert!((0.0..360.0).contains(&orbit.mean_anomaly_at(t)));
            assert!((0.0..360.0).contains(&orbit.mean_longitude_at(t)));
            assert!((0.0..360.0).contains(&orbit.true_anomaly_at(t)));
            assert!((0.0..360.0).contains(&orbit.eccentric_anomaly_at(t)));

            assert_almost_eq_angle(
                orbit.mean_longitude_at_rad(t),
                mean + arg_pe + lan,
                "mean longitude",
            );
            assert_almost_eq_angle(
                orbit.true_longitude_at_rad(t),
                true_anomaly + arg_pe + lan,
                "true longitude",
            );
            assert_almost_eq_angle(
                orbit.mean_argument_of_latitude_at_rad(t),
                mean + arg_pe,
                "mean argument of latitude",
            );
            assert_almost_eq_angle(
                orbit.true_argument_of_latitude_at_rad(t),
                true_anomaly + arg_pe,
                "true argument of latitude",
            );
            assert_almost_eq_angle(
                orbit.true_anomaly_at(t).to_radians(),
                true_anomaly,
                "true anomaly in degrees",
            );
        }
    }
}

#[test]
fn time_at_true_anomaly_inverts_propagation() {
    for _ in 0..RANDOM_ORBITS {
        let orbit = random_any();
        let period = orbit.orbital_period();
        let passage = orbit.time_of_periapsis_passage();

        assert!(passage <= orbit.epoch());
        assert!(orbit.epoch() - passage < period);

        for degrees in [0.0, 45.0, 90.0, 180.0, 270.0, 359.0] {
            let t = orbit.time_at_true_anomaly(degrees);
            assert!(t >= passage && t < passage + period);
            assert_almost_eq_angle(
                orbit.true_anomaly_at_rad(t),
                f64::to_radians(degrees),
                &format!("true anomaly at the time of {degrees}°"),
            );
        }
    }
}

#[test]
fn anomaly_conversions_in_degrees() {
    let orbit = tilted(10.0);

    assert_eq!(orbit.eccentric_anomaly_at_true_anomaly(0.0), 0.0);
    assert_almost_eq(orbit.eccentric_anomaly_at_true_anomaly(180.0), 180.0, "E at 180°");
    assert_almost_eq(orbit.mean_anomaly_at_true_anomaly(180.0), 180.0, "M at 180°");

    // The body lingers near apoapsis, so the mean anomaly leads the true
    // anomaly in the first half of the orbit.
    assert!(orbit.mean_anomaly_at_true_anomaly(90.0) < 90.0);
    assert!(orbit.eccentric_anomaly_at_true_anomaly(90.0) < 90.0);
    assert_almost_eq(
        orbit.radius_at_true_anomaly(90.0),
        orbit.semi_latus_rectum(),
        "radius at 90°",
    );
}

#[test]
fn sampled_boundary_is_closed() {
    let mut orbit = scenario_orbit();

    for n in MIN_SAMPLES..64 {
        let points = orbit.sample_boundary_3d(n).unwrap().to_vec();
        assert_eq!(points.len(), n + 1);
        assert_eq!(points.first(), points.last());
        assert_eq!(points[0], orbit.periapsis_position());

        let projected = orbit.sampled_boundary().points_2d();
        assert_eq!(projected.len(), n + 1);
        for (flat, full) in projected.iter().zip(points.iter()) {
            assert_eq!(*flat, DVec2::new(full.x, full.z));
        }
    }

    assert_eq!(
        orbit.sample_boundary_3d(2).unwrap_err(),
        OrbitError::TooFewSamples {
            requested: 2,
            min: MIN_SAMPLES,
        }
    );
    assert!(orbit.sample_boundary_2d(0).is_err());
    assert!(orbit.triangulate_plane(1).is_err());

    // The failed requests left the last good sample in place
    assert_eq!(orbit.sampled_boundary().sample_count(), 63);
}

#[test]
fn sampled_points_are_spaced_in_true_anomaly() {
    let mut orbit = tilted(25.0);
    let n = 24;
    let points = orbit.sample_boundary_3d(n).unwrap().to_vec();

    for (i, point) in points.iter().enumerate() {
        let body = orbit.world_to_body_frame(*point);
        let expected = i as f64 * TAU / n as f64;
        assert_almost_eq_angle(
            (AXIS_Z * body.z).atan2(body.x),
            expected,
            &format!("true anomaly of sample {i}"),
        );
    }
}

#[test]
fn sample_cache_is_a_snapshot() {
    let mut orbit = scenario_orbit();
    assert!(orbit.sampled_boundary().is_empty());

    let before = orbit.sample_boundary_2d(16).unwrap().to_vec();
    orbit.set_semi_major_axis(50.0).unwrap();

    // Mutation does not touch the cache...
    assert_eq!(orbit.sampled_boundary().points_2d(), before.as_slice());

    // ...until the next request replaces it.
    let after = orbit.sample_boundary_2d(16).unwrap().to_vec();
    assert_ne!(before, after);
    assert_vec2_on_focus_plane(&after, &orbit);

    let periapsis = orbit.periapsis_position();
    assert_almost_eq_vec2_scaled(
        after[0],
        DVec2::new(periapsis.x, periapsis.z),
        orbit.major_focus().length(),
        "first projected sample",
    );

    orbit.clear_sample_cache();
    assert!(orbit.sampled_boundary().is_empty());
    assert_eq!(orbit.sampled_boundary().sample_count(), 0);

    let defaults = orbit.sample_default_boundary_3d().unwrap().len();
    assert_eq!(defaults, orbit.config().default_sample_count + 1);
}

fn assert_vec2_on_focus_plane(points: &[DVec2], orbit: &OrbitModel) {
    for point in points {
        let flat_focus = DVec2::new(orbit.major_focus().x, orbit.major_focus().z);
        let distance = point.distance(flat_focus);
        assert!(distance >= orbit.periapsis() - 1e-9);
        assert!(distance <= orbit.apoapsis() + 1e-9);
    }
}

#[test]
fn triangulated_plane_is_a_fan() {
    let orbit = tilted(60.0);
    let n = 12;
    let triangles = orbit.triangulate_plane(n).unwrap();
    let boundary = crate::sampling::boundary_3d(&orbit, n).unwrap();

    assert_eq!(triangles.len(), 3 * n);
    for (i, triangle) in triangles.chunks(3).enumerate() {
        assert_eq!(triangle[0], orbit.center());
        assert_eq!(triangle[1], boundary[i]);
        assert_eq!(triangle[2], boundary[i + 1]);

        // Every triangle lies in the orbital plane
        let normal = (triangle[1] - triangle[0]).cross(triangle[2] - triangle[0]);
        assert_almost_eq_vec3(normal.normalize(), orbit.plane_normal(), "fan winding");
    }
}

#[test]
fn pqw_transform_matches_rotation() {
    for _ in 0..RANDOM_ORBITS {
        let orbit = random_any();
        let matrix = orbit.transformation_matrix();

        for (x, y) in [(1.0, 0.0), (0.0, 1.0), (0.3, -2.0)] {
            let by_matrix = matrix.dot_vec(DVec2::new(x, y));
            let by_rotation = orbit.transform_body_vector(DVec3::new(x, 0.0, AXIS_Z * y));
            assert_almost_eq_vec3(by_matrix, by_rotation, "pqw transform");
            assert_eq!(orbit.transform_pqw_vector(DVec2::new(x, y)), by_matrix);
        }

        assert_almost_eq_vec3(
            orbit.basis_p().cross(orbit.basis_q()),
            orbit.plane_normal(),
            "P x Q",
        );
    }
}

#[test]
fn energy_matches_vis_viva() {
    for _ in 0..RANDOM_ORBITS {
        let orbit = random_any();
        let mu = orbit.gravitational_parameter();
        let energy = orbit.specific_orbital_energy();

        for t in poll_times(&orbit).into_iter().step_by(128) {
            let speed = orbit.speed_at(t);
            let radius = orbit.radius_at(t);
            assert_almost_eq_scaled(
                speed * speed / 2.0 - mu / radius,
                energy,
                energy,
                "specific orbital energy",
            );
        }
    }
}

#[test]
fn model_is_shareable_between_readers() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OrbitModel>();

    let orbit = scenario_orbit();
    let period = orbit.orbital_period();

    let (first, second) = std::thread::scope(|scope| {
        let a = scope.spawn(|| orbit.position_at(0.25 * period));
        let b = scope.spawn(|| orbit.position_at(1.25 * period));
        (a.join().unwrap(), b.join().unwrap())
    });

    assert_almost_eq_vec3_scaled(first, second, orbit.apoapsis(), "positions across threads");
}

#[test]
fn error_classes() {
    assert!(OrbitError::TooFewSamples {
        requested: 1,
        min: MIN_SAMPLES
    }
    .is_validation());
    assert!(!OrbitError::DegenerateGeometry("test").is_validation());
    assert_eq!(
        OrbitError::EccentricityOutOfRange(1.5).to_string(),
        "eccentricity must be within [0, 1), got 1.5"
    );
}

#[test]
fn try_from_elements() {
    let orbit = OrbitModel::try_from(OrbitalElements::default()).unwrap();
    assert_eq!(orbit.elements(), OrbitalElements::default());

    let bad = OrbitalElements {
        central_body_mass: -1.0,
        ..OrbitalElements::default()
    };
    assert_eq!(
        OrbitModel::try_from(bad).unwrap_err(),
        OrbitError::NonPositiveMass(-1.0)
    );
}

#[cfg(feature = "serde")]
#[test]
fn deserialization_validates() {
    let orbit = scenario_orbit();
    let json = serde_json::to_string(&orbit).unwrap();
    let back: OrbitModel = serde_json::from_str(&json).unwrap();
    assert_eq!(back.elements(), orbit.elements());
    assert_eq!(back.config(), orbit.config());

    let mut elements = serde_json::to_value(orbit.elements()).unwrap();
    elements["semi_major_axis"] = serde_json::json!(-5.0);
    elements["eccentricity"] = serde_json::json!(1.5);
    elements["central_body_mass"] = serde_json::json!(0.0);
    let data = serde_json::json!({ "elements": elements, "config": {} });

    let err = serde_json::from_value::<OrbitModel>(data).unwrap_err();
    assert!(
        err.to_string().contains("degenerate"),
        "unexpected error: {err}"
    );

    let mut elements = serde_json::to_value(orbit.elements()).unwrap();
    elements["central_body_mass"] = serde_json::json!(-1.0);
    let data = serde_json::json!({ "elements": elements });
    assert!(serde_json::from_value::<OrbitModel>(data).is_err());

    let data = serde_json::json!({
        "elements": serde_json::to_value(orbit.elements()).unwrap(),
        "config": { "gravitational_constant": 0.0 },
    });
    assert!(serde_json::from_value::<OrbitModel>(data).is_err());
}
