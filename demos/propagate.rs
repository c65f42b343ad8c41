use glam::DVec3;
use keplerian_orbit::{OrbitError, OrbitModel};
use std::io::{self, Write};

const STEPS: usize = 24;
const OUTLINE_SAMPLES: usize = 12;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut orbit = OrbitModel::create(
        DVec3::new(450.0, 150.0, 0.0),
        300.0,
        0.75,
        20.0,
        25.0,
        40.0,
        10.0,
        0.0,
        0.0,
    )?;

    let id = orbit.observe(|change| {
        eprintln!("Changed {:?}: {:?}", change.kind, change.elements);
    });

    let mut lock = io::stdout().lock();
    describe_orbit(&mut lock, &orbit)?;

    let period = orbit.orbital_period();
    writeln!(&mut lock, "=== One revolution in {STEPS} steps ===")?;
    for step in 0..=STEPS {
        let t = orbit.epoch() + period * step as f64 / STEPS as f64;
        let state = orbit.state_vectors_at(t);
        writeln!(
            &mut lock,
            "t = {t:>14.1}  ν = {:>7.2}°  r = {:>7.2}  pos = {:.2}  |v| = {:.3e}",
            orbit.true_anomaly_at(t),
            orbit.radius_at(t),
            state.position,
            state.velocity.length(),
        )?;
    }

    writeln!(&mut lock, "=== Outline ({OUTLINE_SAMPLES} samples) ===")?;
    for point in orbit.sample_boundary_2d(OUTLINE_SAMPLES)? {
        writeln!(&mut lock, "{point:.2}")?;
    }

    orbit.set_eccentricity(0.25)?;
    match orbit.set_eccentricity(1.5) {
        Err(err @ OrbitError::EccentricityOutOfRange(_)) => {
            writeln!(&mut lock, "Rejected as expected: {err}")?;
        }
        other => writeln!(&mut lock, "Unexpected result: {other:?}")?,
    }
    orbit.unobserve(id);

    describe_orbit(&mut lock, &orbit)?;
    Ok(())
}

fn describe_orbit(out: &mut impl Write, orbit: &OrbitModel) -> io::Result<()> {
    writeln!(out, "=== Orbit ===")?;
    writeln!(out, "semi-major axis:    {}", orbit.semi_major_axis())?;
    writeln!(out, "eccentricity:       {}", orbit.eccentricity())?;
    writeln!(out, "period:             {:.3e}", orbit.orbital_period())?;
    writeln!(out, "periapsis:          {:.2}", orbit.periapsis_position())?;
    writeln!(out, "apoapsis:           {:.2}", orbit.apoapsis_position())?;
    writeln!(out, "ascending node:     {:.2}", orbit.ascending_node_position())?;
    writeln!(out, "descending node:    {:.2}", orbit.descending_node_position())?;
    writeln!(out, "centre:             {:.2}", orbit.center())?;
    writeln!(out, "minor focus:        {:.2}", orbit.minor_focus())
}
