use core::f64::consts::{FRAC_PI_2, PI, TAU};

use glam::{DQuat, DVec2, DVec3};
use log::{debug, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    anomaly,
    elements::{
        check_config, check_eccentricity, check_finite, check_mass, check_semi_major_axis,
        check_vector,
    },
    math::{self, normalize_degrees, normalize_radians},
    observer::ObserverRegistry,
    sampling::{self, SampledBoundary},
    ElementChange, ElementKind, Matrix3x2, ModelConfig, ObserverId, OrbitError, OrbitalElements,
    StateVectors,
};

/// A Keplerian elliptic orbit around a central body.
///
/// The model owns the nine canonical elements (see [`OrbitalElements`]) and
/// derives everything else from them on every call. Nothing derived is
/// stored, so a change to an element is visible immediately in every query.
///
/// Every constructor and setter validates its input. A rejected value leaves
/// the model untouched and is reported through [`OrbitError`].
///
/// Angles going in and out of the model are in degrees, unless the method
/// name ends in `_rad`.
///
/// # Example
/// ```
/// use glam::DVec3;
/// use keplerian_orbit::{OrbitError, OrbitModel};
///
/// let mut orbit = OrbitModel::create(
///     DVec3::new(450.0, 150.0, 0.0),
///     300.0,
///     0.75,
///     0.0,
///     25.0,
///     0.0,
///     10.0,
///     0.0,
///     0.0,
/// ).unwrap();
///
/// // The distance from the focus to periapsis
/// let distance = orbit.periapsis_position().distance(orbit.major_focus());
/// assert!((distance - 75.0).abs() < 1e-9);
///
/// // Invalid values are rejected and the old one kept
/// assert_eq!(
///     orbit.set_eccentricity(1.0),
///     Err(OrbitError::EccentricityOutOfRange(1.0)),
/// );
/// assert_eq!(orbit.eccentricity(), 0.75);
/// ```
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "SerializedOrbit"))]
pub struct OrbitModel {
    elements: OrbitalElements,
    config: ModelConfig,
    #[cfg_attr(feature = "serde", serde(skip))]
    sampled: SampledBoundary,
    #[cfg_attr(feature = "serde", serde(skip))]
    observers: ObserverRegistry,
}

/// The stored part of an [`OrbitModel`]. Deserialization goes through
/// this, so a model read back from data is validated like a new one.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct SerializedOrbit {
    elements: OrbitalElements,
    #[serde(default)]
    config: ModelConfig,
}

#[cfg(feature = "serde")]
impl TryFrom<SerializedOrbit> for OrbitModel {
    type Error = OrbitError;

    fn try_from(data: SerializedOrbit) -> Result<Self, Self::Error> {
        let model = Self {
            elements: data.elements,
            config: data.config,
            sampled: SampledBoundary::default(),
            observers: ObserverRegistry::default(),
        };
        model.validate().map_err(rejected)?;

        debug!("Deserialized orbit: {:?}", model.elements);
        Ok(model)
    }
}

fn rejected(err: OrbitError) -> OrbitError {
    warn!("Rejected orbit mutation: {err}");
    err
}

/// Radians to degrees, wrapped into `[0, 360)`.
#[inline]
fn wrapped_degrees(radians: f64) -> f64 {
    normalize_degrees(radians.to_degrees())
}

// Initialization and validation
impl OrbitModel {
    /// Creates a new orbit from a full element set, using the default
    /// [`ModelConfig`].
    ///
    /// # Errors
    /// Fails if any element breaks its constraint: a non-positive
    /// semi-major axis or mass, an eccentricity outside `[0, 1)`, or a
    /// non-finite value.
    pub fn new(elements: OrbitalElements) -> Result<Self, OrbitError> {
        Self::with_config(elements, ModelConfig::default())
    }

    /// Creates a new orbit from a full element set and a model configuration.
    ///
    /// # Errors
    /// Fails if any element breaks its constraint, or if the configuration
    /// has a non-positive gravitational constant or a default sample count
    /// below [`MIN_SAMPLES`][crate::MIN_SAMPLES].
    pub fn with_config(elements: OrbitalElements, config: ModelConfig) -> Result<Self, OrbitError> {
        elements.validate()?;
        check_config(&config)?;

        debug!(
            "Created orbit: a = {}, e = {}, i = {}°, Ω = {}°, ω = {}°, M = {}",
            elements.semi_major_axis,
            elements.eccentricity,
            elements.inclination,
            elements.long_asc_node,
            elements.arg_pe,
            elements.central_body_mass,
        );

        Ok(Self {
            elements,
            config,
            sampled: SampledBoundary::default(),
            observers: ObserverRegistry::default(),
        })
    }

    /// Creates a new orbit from its individual elements.
    ///
    /// # Parameters
    /// - `major_focus`: The world-space position of the central body.
    /// - `semi_major_axis`: Half the major axis of the ellipse. Must be positive.
    /// - `eccentricity`: The shape of the ellipse. Must be within `[0, 1)`.
    /// - `inclination`: The tilt of the orbital plane, in degrees.
    /// - `long_asc_node`: The longitude of ascending node, in degrees.
    /// - `arg_pe`: The argument of periapsis, in degrees.
    /// - `central_body_mass`: The mass of the central body. Must be positive.
    /// - `epoch`: The time the mean longitude is given at.
    /// - `mean_longitude_at_epoch`: The mean longitude at epoch, in degrees.
    ///
    /// # Example
    /// ```
    /// use glam::DVec3;
    /// use keplerian_orbit::{OrbitError, OrbitModel};
    ///
    /// let result = OrbitModel::create(DVec3::ZERO, -5.0, 0.1, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    ///
    /// assert_eq!(result.unwrap_err(), OrbitError::NonPositiveSemiMajorAxis(-5.0));
    /// ```
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        major_focus: DVec3,
        semi_major_axis: f64,
        eccentricity: f64,
        inclination: f64,
        long_asc_node: f64,
        arg_pe: f64,
        central_body_mass: f64,
        epoch: f64,
        mean_longitude_at_epoch: f64,
    ) -> Result<Self, OrbitError> {
        Self::new(OrbitalElements {
            major_focus,
            semi_major_axis,
            eccentricity,
            inclination,
            long_asc_node,
            arg_pe,
            central_body_mass,
            epoch,
            mean_longitude_at_epoch,
        })
    }

    /// Checks that the model describes an ellipse.
    ///
    /// Models built through the constructors, or deserialized, always pass.
    ///
    /// # Errors
    /// Returns [`OrbitError::DegenerateGeometry`] for element sets that
    /// cannot describe an ellipse, or the plain validation error for
    /// anything else out of range.
    pub fn validate(&self) -> Result<(), OrbitError> {
        self.elements.validate().map_err(|err| match err {
            OrbitError::NonPositiveSemiMajorAxis(_) => {
                OrbitError::DegenerateGeometry("semi-major axis is not positive")
            }
            OrbitError::EccentricityOutOfRange(_) => {
                OrbitError::DegenerateGeometry("eccentricity is outside [0, 1)")
            }
            OrbitError::NonPositiveMass(_) => {
                OrbitError::DegenerateGeometry("central body mass is not positive")
            }
            other => other,
        })?;
        check_config(&self.config)
    }
}

// Canonical elements
impl OrbitModel {
    fn notify(&mut self, kind: ElementKind) {
        let change = ElementChange {
            kind,
            elements: self.elements,
        };
        self.observers.notify(&change);
    }

    /// Gets a copy of the full element set.
    #[inline]
    pub fn elements(&self) -> OrbitalElements {
        self.elements
    }

    /// Gets the model configuration.
    #[inline]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Replaces the model configuration.
    ///
    /// # Errors
    /// Fails if the gravitational constant is not positive or the default
    /// sample count is too low. The old configuration is kept.
    pub fn set_config(&mut self, config: ModelConfig) -> Result<(), OrbitError> {
        check_config(&config).map_err(rejected)?;
        self.config = config;
        self.notify(ElementKind::Config);
        Ok(())
    }

    /// Gets the world-space position of the central body.
    #[inline]
    pub fn major_focus(&self) -> DVec3 {
        self.elements.major_focus
    }

    /// Moves the central body, carrying the whole orbit with it.
    pub fn set_major_focus(&mut self, value: DVec3) -> Result<(), OrbitError> {
        check_vector("major focus", value).map_err(rejected)?;
        self.elements.major_focus = value;
        self.notify(ElementKind::MajorFocus);
        Ok(())
    }

    /// Gets the semi-major axis of the orbit.
    ///
    /// Learn more: <https://en.wikipedia.org/wiki/Semi-major_and_semi-minor_axes>
    #[inline]
    pub fn semi_major_axis(&self) -> f64 {
        self.elements.semi_major_axis
    }

    /// Sets the semi-major axis of the orbit.
    ///
    /// # Errors
    /// Fails if the value is not positive. The old value is kept.
    pub fn set_semi_major_axis(&mut self, value: f64) -> Result<(), OrbitError> {
        check_semi_major_axis(value).map_err(rejected)?;
        self.elements.semi_major_axis = value;
        self.notify(ElementKind::SemiMajorAxis);
        Ok(())
    }

    /// Gets the eccentricity of the orbit.
    #[inline]
    pub fn eccentricity(&self) -> f64 {
        self.elements.eccentricity
    }

    /// Sets the eccentricity of the orbit.
    ///
    /// # Errors
    /// Fails if the value is outside `[0, 1)`. The old value is kept.
    pub fn set_eccentricity(&mut self, value: f64) -> Result<(), OrbitError> {
        check_eccentricity(value).map_err(rejected)?;
        self.elements.eccentricity = value;
        self.notify(ElementKind::Eccentricity);
        Ok(())
    }

    /// Gets the inclination of the orbit, in degrees.
    #[inline]
    pub fn inclination(&self) -> f64 {
        self.elements.inclination
    }

    /// Gets the inclination of the orbit, in radians.
    #[inline]
    pub fn inclination_rad(&self) -> f64 {
        self.elements.inclination.to_radians()
    }

    /// Sets the inclination of the orbit, in degrees.
    ///
    /// A negative inclination describes a plane tilted the other way,
    /// which swaps the ascending and descending nodes.
    pub fn set_inclination(&mut self, value: f64) -> Result<(), OrbitError> {
        check_finite("inclination", value).map_err(rejected)?;
        self.elements.inclination = value;
        self.notify(ElementKind::Inclination);
        Ok(())
    }

    /// Gets the longitude of ascending node, in degrees.
    #[inline]
    pub fn long_asc_node(&self) -> f64 {
        self.elements.long_asc_node
    }

    /// Gets the longitude of ascending node, in radians.
    #[inline]
    pub fn long_asc_node_rad(&self) -> f64 {
        self.elements.long_asc_node.to_radians()
    }

    /// Sets the longitude of ascending node, in degrees.
    pub fn set_long_asc_node(&mut self, value: f64) -> Result<(), OrbitError> {
        check_finite("longitude of ascending node", value).map_err(rejected)?;
        self.elements.long_asc_node = value;
        self.notify(ElementKind::LongAscNode);
        Ok(())
    }

    /// Gets the argument of periapsis, in degrees.
    #[inline]
    pub fn arg_pe(&self) -> f64 {
        self.elements.arg_pe
    }

    /// Gets the argument of periapsis, in radians.
    #[inline]
    pub fn arg_pe_rad(&self) -> f64 {
        self.elements.arg_pe.to_radians()
    }

    /// Sets the argument of periapsis, in degrees.
    pub fn set_arg_pe(&mut self, value: f64) -> Result<(), OrbitError> {
        check_finite("argument of periapsis", value).map_err(rejected)?;
        self.elements.arg_pe = value;
        self.notify(ElementKind::ArgPe);
        Ok(())
    }

    /// Gets the mass of the central body.
    #[inline]
    pub fn central_body_mass(&self) -> f64 {
        self.elements.central_body_mass
    }

    /// Sets the mass of the central body.
    ///
    /// # Errors
    /// Fails if the value is not positive. The old value is kept.
    pub fn set_central_body_mass(&mut self, value: f64) -> Result<(), OrbitError> {
        check_mass(value).map_err(rejected)?;
        self.elements.central_body_mass = value;
        self.notify(ElementKind::CentralBodyMass);
        Ok(())
    }

    /// Gets the epoch.
    #[inline]
    pub fn epoch(&self) -> f64 {
        self.elements.epoch
    }

    /// Sets the epoch.
    pub fn set_epoch(&mut self, value: f64) -> Result<(), OrbitError> {
        check_finite("epoch", value).map_err(rejected)?;
        self.elements.epoch = value;
        self.notify(ElementKind::Epoch);
        Ok(())
    }

    /// Gets the mean longitude at epoch, in degrees.
    #[inline]
    pub fn mean_longitude_at_epoch(&self) -> f64 {
        self.elements.mean_longitude_at_epoch
    }

    /// Gets the mean longitude at epoch, in radians.
    #[inline]
    pub fn mean_longitude_at_epoch_rad(&self) -> f64 {
        self.elements.mean_longitude_at_epoch.to_radians()
    }

    /// Sets the mean longitude at epoch, in degrees.
    pub fn set_mean_longitude_at_epoch(&mut self, value: f64) -> Result<(), OrbitError> {
        check_finite("mean longitude at epoch", value).map_err(rejected)?;
        self.elements.mean_longitude_at_epoch = value;
        self.notify(ElementKind::MeanLongitudeAtEpoch);
        Ok(())
    }

    /// Registers a callback that runs after every accepted mutation.
    ///
    /// Rejected mutations do not notify. Clones of this model do not
    /// inherit the registration.
    ///
    /// # Example
    /// ```
    /// use std::sync::{
    ///     atomic::{AtomicUsize, Ordering},
    ///     Arc,
    /// };
    ///
    /// use keplerian_orbit::{ElementKind, OrbitModel};
    ///
    /// let mut orbit = OrbitModel::default();
    /// let count = Arc::new(AtomicUsize::new(0));
    /// let seen = Arc::clone(&count);
    ///
    /// orbit.observe(move |change| {
    ///     assert_eq!(change.kind, ElementKind::Eccentricity);
    ///     seen.fetch_add(1, Ordering::SeqCst);
    /// });
    ///
    /// orbit.set_eccentricity(0.5).unwrap();
    /// assert!(orbit.set_eccentricity(2.0).is_err());
    ///
    /// assert_eq!(count.load(Ordering::SeqCst), 1);
    /// ```
    pub fn observe<F>(&mut self, callback: F) -> ObserverId
    where
        F: FnMut(&ElementChange) + Send + Sync + 'static,
    {
        self.observers.register(Box::new(callback))
    }

    /// Removes a callback registered with [`observe`][Self::observe].
    ///
    /// Returns whether a callback was removed.
    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        self.observers.unregister(id)
    }

    /// Gets the number of registered callbacks.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

// Derived shape and kinematics
impl OrbitModel {
    /// Gets the semi-minor axis of the orbit.
    ///
    /// In an elliptic orbit, the semi-minor axis is half of the maximum "width"
    /// of the orbit.
    ///
    /// `b = a * sqrt(1 - e^2)`
    pub fn semi_minor_axis(&self) -> f64 {
        let e = self.eccentricity();
        self.semi_major_axis() * (1.0 - e * e).sqrt()
    }

    /// Gets the semi-latus rectum (semi-parameter) of the orbit.
    ///
    /// `p = a * (1 - e^2)`
    ///
    /// Learn more: <https://en.wikipedia.org/wiki/Ellipse#Semi-latus_rectum>
    #[doc(alias = "semi_parameter")]
    pub fn semi_latus_rectum(&self) -> f64 {
        let e = self.eccentricity();
        self.semi_major_axis() * (1.0 - e * e)
    }

    /// Gets the linear eccentricity of the orbit.
    ///
    /// In an elliptic orbit, the linear eccentricity is the distance
    /// between its center and either of its two foci.
    pub fn linear_eccentricity(&self) -> f64 {
        self.semi_major_axis() * self.eccentricity()
    }

    /// Gets the distance between the two foci.
    pub fn focal_distance(&self) -> f64 {
        2.0 * self.linear_eccentricity()
    }

    /// Gets the periapsis distance, measured from the major focus.
    ///
    /// `p / (1 + e)`
    pub fn periapsis(&self) -> f64 {
        self.semi_latus_rectum() / (1.0 + self.eccentricity())
    }

    /// Gets the apoapsis distance, measured from the major focus.
    ///
    /// `p / (1 - e)`
    pub fn apoapsis(&self) -> f64 {
        self.semi_latus_rectum() / (1.0 - self.eccentricity())
    }

    /// Gets the standard gravitational parameter of the central body.
    ///
    /// The gravitational parameter mu of the parent body equals a certain
    /// gravitational constant G times the mass of the parent body M.
    ///
    /// In other words, mu = GM.
    #[doc(alias = "mu")]
    pub fn gravitational_parameter(&self) -> f64 {
        self.config.gravitational_constant * self.central_body_mass()
    }

    /// Gets the mean motion, in radians per unit time.
    ///
    /// `n = sqrt(mu / a^3)`
    pub fn mean_motion_rad(&self) -> f64 {
        anomaly::mean_motion(self.gravitational_parameter(), self.semi_major_axis())
    }

    /// Gets the mean motion, in degrees per unit time.
    pub fn mean_motion(&self) -> f64 {
        self.mean_motion_rad().to_degrees()
    }

    /// Gets the time it takes to complete one revolution of the orbit.
    ///
    /// `T = 2pi / n = 2pi * sqrt(a^3 / mu)`
    pub fn orbital_period(&self) -> f64 {
        TAU / self.mean_motion_rad()
    }

    /// Gets the specific orbital energy, `-mu / 2a`.
    pub fn specific_orbital_energy(&self) -> f64 {
        -self.gravitational_parameter() / (2.0 * self.semi_major_axis())
    }

    /// Gets the magnitude of the specific angular momentum, `sqrt(mu * p)`.
    pub fn specific_angular_momentum(&self) -> f64 {
        (self.gravitational_parameter() * self.semi_latus_rectum()).sqrt()
    }

    /// Gets the time of the last periapsis passage at or before the epoch.
    ///
    /// Add whole multiples of the [orbital period][Self::orbital_period]
    /// to get the other passages.
    pub fn time_of_periapsis_passage(&self) -> f64 {
        self.epoch() - self.mean_anomaly_at_rad(self.epoch()) / self.mean_motion_rad()
    }
}

// Orientation and geometry
impl OrbitModel {
    /// Gets the rotation carrying body-frame vectors into world space.
    ///
    /// This is the argument of periapsis, then the inclination, then the
    /// longitude of ascending node, in that order.
    /// See [`math::orbital_rotation`].
    pub fn rotation(&self) -> DQuat {
        math::orbital_rotation(
            self.inclination_rad(),
            self.arg_pe_rad(),
            self.long_asc_node_rad(),
        )
    }

    /// Gets the transformation matrix needed to tilt an in-plane 2D vector
    /// into world space.
    ///
    /// The first column is [`basis_p`][Self::basis_p] and the second is
    /// [`basis_q`][Self::basis_q].
    pub fn transformation_matrix(&self) -> Matrix3x2 {
        Matrix3x2::from_cols(self.basis_p(), self.basis_q())
    }

    /// Gets the unit vector pointing from the major focus towards periapsis.
    pub fn basis_p(&self) -> DVec3 {
        self.rotation() * DVec3::X
    }

    /// Gets the unit vector along the direction of motion at periapsis.
    pub fn basis_q(&self) -> DVec3 {
        self.rotation() * math::TILT_AXIS
    }

    /// Gets the unit normal of the orbital plane.
    ///
    /// For a prograde, untilted orbit this is +Y.
    #[doc(alias = "basis_w")]
    pub fn plane_normal(&self) -> DVec3 {
        self.rotation() * math::PLANE_NORMAL
    }

    /// Rotates a body-frame vector into world space, without translating it.
    pub fn transform_body_vector(&self, vector: DVec3) -> DVec3 {
        self.rotation() * vector
    }

    /// Tilts an in-plane 2D vector into world space, without translating it.
    ///
    /// The X axis of the input points to periapsis; the Y axis points along
    /// the direction of motion at periapsis.
    pub fn transform_pqw_vector(&self, vector: DVec2) -> DVec3 {
        self.transformation_matrix().dot_vec(vector)
    }

    /// Brings a world-space point back into the body frame.
    ///
    /// This undoes the translation by the major focus and the rotation.
    pub fn world_to_body_frame(&self, point: DVec3) -> DVec3 {
        self.rotation().inverse() * (point - self.major_focus())
    }

    fn world_point(&self, body_point: DVec3) -> DVec3 {
        self.major_focus() + self.rotation() * body_point
    }

    /// Gets the geometric centre of the ellipse.
    pub fn center(&self) -> DVec3 {
        self.world_point(DVec3::new(-self.linear_eccentricity(), 0.0, 0.0))
    }

    /// Gets the second focus of the ellipse, the one opposite the central body.
    ///
    /// For a circular orbit, this equals the major focus.
    pub fn minor_focus(&self) -> DVec3 {
        self.world_point(DVec3::new(-self.focal_distance(), 0.0, 0.0))
    }

    /// Gets the world-space position of periapsis.
    pub fn periapsis_position(&self) -> DVec3 {
        self.position_at_true_anomaly_rad(0.0)
    }

    /// Gets the world-space position of apoapsis.
    pub fn apoapsis_position(&self) -> DVec3 {
        self.world_point(DVec3::new(-self.apoapsis(), 0.0, 0.0))
    }

    /// Projects a world-space point onto the reference plane passing
    /// through the major focus.
    pub fn project_to_reference_plane(&self, point: DVec3) -> DVec3 {
        DVec3::new(point.x, self.major_focus().y, point.z)
    }

    /// Gets periapsis projected onto the reference plane.
    pub fn periapsis_position_projected(&self) -> DVec3 {
        self.project_to_reference_plane(self.periapsis_position())
    }

    /// Gets apoapsis projected onto the reference plane.
    pub fn apoapsis_position_projected(&self) -> DVec3 {
        self.project_to_reference_plane(self.apoapsis_position())
    }

    /// The true anomaly of the ascending node, in radians.
    ///
    /// The nodes sit at ±90° in the periapsis-rotated frame; the direction
    /// of the tilt picks which one the orbit crosses going up.
    fn ascending_node_true_anomaly(&self) -> f64 {
        // Any finite inclination is accepted, so the tilt direction comes
        // from sin(i) rather than the sign of i.
        let crossing = if self.inclination_rad().sin() < 0.0 {
            -FRAC_PI_2
        } else {
            FRAC_PI_2
        };
        crossing - self.arg_pe_rad()
    }

    /// Gets the world-space position where the orbit crosses the reference
    /// plane going towards +Y.
    ///
    /// For an untilted orbit there is no such crossing, and this returns
    /// the point the line of nodes would pass through.
    pub fn ascending_node_position(&self) -> DVec3 {
        self.position_at_true_anomaly_rad(self.ascending_node_true_anomaly())
    }

    /// Gets the world-space position where the orbit crosses the reference
    /// plane going towards -Y.
    pub fn descending_node_position(&self) -> DVec3 {
        self.position_at_true_anomaly_rad(self.ascending_node_true_anomaly() + PI)
    }
}

// The actual orbit position calculations
impl OrbitModel {
    fn mean_longitude_unwrapped(&self, t: f64) -> f64 {
        self.mean_longitude_at_epoch_rad() + self.mean_motion_rad() * (t - self.epoch())
    }

    /// Gets the mean longitude at a given time, in radians.
    ///
    /// `L(t) = L0 + n (t - t0)`, wrapped into `[0, TAU)`.
    pub fn mean_longitude_at_rad(&self, t: f64) -> f64 {
        normalize_radians(self.mean_longitude_unwrapped(t))
    }

    /// Gets the mean longitude at a given time, in degrees.
    pub fn mean_longitude_at(&self, t: f64) -> f64 {
        wrapped_degrees(self.mean_longitude_at_rad(t))
    }

    /// Gets the mean anomaly at a given time, in radians.
    ///
    /// The mean anomaly is the fraction of an elliptical orbit's period
    /// that has elapsed since the orbiting body passed periapsis,
    /// expressed as an angle.
    ///
    /// `M(t) = (L(t) - ω - Ω) mod 2pi`
    pub fn mean_anomaly_at_rad(&self, t: f64) -> f64 {
        normalize_radians(
            self.mean_longitude_unwrapped(t) - self.arg_pe_rad() - self.long_asc_node_rad(),
        )
    }

    /// Gets the mean anomaly at a given time, in degrees.
    pub fn mean_anomaly_at(&self, t: f64) -> f64 {
        wrapped_degrees(self.mean_anomaly_at_rad(t))
    }

    /// Gets the eccentric anomaly at a given time, in radians.
    ///
    /// # Performance
    /// This solves Kepler's equation numerically. It is the most expensive
    /// step of the pipeline; cache the value if you need it repeatedly.
    pub fn eccentric_anomaly_at_rad(&self, t: f64) -> f64 {
        anomaly::eccentric_anomaly_at_mean_anomaly(self.mean_anomaly_at_rad(t), self.eccentricity())
    }

    /// Gets the eccentric anomaly at a given time, in degrees.
    pub fn eccentric_anomaly_at(&self, t: f64) -> f64 {
        wrapped_degrees(self.eccentric_anomaly_at_rad(t))
    }

    /// Gets the true anomaly at a given time, in radians.
    ///
    /// The true anomaly is the angle between the direction of periapsis
    /// and the current position of the body, as seen from the main focus
    /// of the ellipse.
    ///
    /// — [Wikipedia](https://en.wikipedia.org/wiki/True_anomaly)
    pub fn true_anomaly_at_rad(&self, t: f64) -> f64 {
        anomaly::true_anomaly_at_eccentric_anomaly(
            self.eccentric_anomaly_at_rad(t),
            self.eccentricity(),
        )
    }

    /// Gets the true anomaly at a given time, in degrees.
    pub fn true_anomaly_at(&self, t: f64) -> f64 {
        wrapped_degrees(self.true_anomaly_at_rad(t))
    }

    /// Gets the true longitude at a given time, in radians.
    ///
    /// `ν + ω + Ω`
    pub fn true_longitude_at_rad(&self, t: f64) -> f64 {
        normalize_radians(
            self.true_anomaly_at_rad(t) + self.arg_pe_rad() + self.long_asc_node_rad(),
        )
    }

    /// Gets the true longitude at a given time, in degrees.
    pub fn true_longitude_at(&self, t: f64) -> f64 {
        wrapped_degrees(self.true_longitude_at_rad(t))
    }

    /// Gets the mean argument of latitude at a given time, in radians.
    ///
    /// `M + ω`
    pub fn mean_argument_of_latitude_at_rad(&self, t: f64) -> f64 {
        normalize_radians(self.mean_anomaly_at_rad(t) + self.arg_pe_rad())
    }

    /// Gets the mean argument of latitude at a given time, in degrees.
    pub fn mean_argument_of_latitude_at(&self, t: f64) -> f64 {
        wrapped_degrees(self.mean_argument_of_latitude_at_rad(t))
    }

    /// Gets the true argument of latitude at a given time, in radians.
    ///
    /// `ν + ω`
    pub fn true_argument_of_latitude_at_rad(&self, t: f64) -> f64 {
        normalize_radians(self.true_anomaly_at_rad(t) + self.arg_pe_rad())
    }

    /// Gets the true argument of latitude at a given time, in degrees.
    pub fn true_argument_of_latitude_at(&self, t: f64) -> f64 {
        wrapped_degrees(self.true_argument_of_latitude_at_rad(t))
    }

    /// Gets the eccentric anomaly at a given true anomaly, both in degrees.
    pub fn eccentric_anomaly_at_true_anomaly(&self, true_anomaly: f64) -> f64 {
        wrapped_degrees(anomaly::eccentric_anomaly_at_true_anomaly(
            true_anomaly.to_radians(),
            self.eccentricity(),
        ))
    }

    /// Gets the mean anomaly at a given true anomaly, both in degrees.
    pub fn mean_anomaly_at_true_anomaly(&self, true_anomaly: f64) -> f64 {
        wrapped_degrees(anomaly::mean_anomaly_at_true_anomaly(
            true_anomaly.to_radians(),
            self.eccentricity(),
        ))
    }

    /// Gets the time at which the body reaches a given true anomaly
    /// (in degrees).
    ///
    /// The result lies within the revolution that starts at
    /// [`time_of_periapsis_passage`][Self::time_of_periapsis_passage].
    pub fn time_at_true_anomaly(&self, true_anomaly: f64) -> f64 {
        let mean_anomaly =
            anomaly::mean_anomaly_at_true_anomaly(true_anomaly.to_radians(), self.eccentricity());
        self.time_of_periapsis_passage() + mean_anomaly / self.mean_motion_rad()
    }

    /// Gets the distance from the major focus at a given true anomaly
    /// (in radians).
    ///
    /// `r = p / (1 + e cos(ν))`
    pub fn radius_at_true_anomaly_rad(&self, true_anomaly: f64) -> f64 {
        anomaly::radius_at_true_anomaly(
            self.semi_latus_rectum(),
            self.eccentricity(),
            true_anomaly,
        )
    }

    /// Gets the distance from the major focus at a given true anomaly
    /// (in degrees).
    pub fn radius_at_true_anomaly(&self, true_anomaly: f64) -> f64 {
        self.radius_at_true_anomaly_rad(true_anomaly.to_radians())
    }

    /// Gets the distance from the major focus at a given time.
    pub fn radius_at(&self, t: f64) -> f64 {
        self.radius_at_true_anomaly_rad(self.true_anomaly_at_rad(t))
    }

    /// Gets the world-space position at a given true anomaly (in radians).
    pub fn position_at_true_anomaly_rad(&self, true_anomaly: f64) -> DVec3 {
        let radius = self.radius_at_true_anomaly_rad(true_anomaly);
        self.world_point(math::body_frame_point(radius, true_anomaly))
    }

    /// Gets the world-space position at a given true anomaly (in degrees).
    pub fn position_at_true_anomaly(&self, true_anomaly: f64) -> DVec3 {
        self.position_at_true_anomaly_rad(true_anomaly.to_radians())
    }

    /// Gets the world-space position of the body at a given time.
    ///
    /// # Example
    /// ```
    /// use keplerian_orbit::OrbitModel;
    ///
    /// let orbit = OrbitModel::default();
    /// let period = orbit.orbital_period();
    ///
    /// let a = orbit.position_at(12.0);
    /// let b = orbit.position_at(12.0 + period);
    /// assert!((a - b).length() < 1e-9);
    /// ```
    pub fn position_at(&self, t: f64) -> DVec3 {
        self.position_at_true_anomaly_rad(self.true_anomaly_at_rad(t))
    }

    /// Gets the velocity at a given true anomaly (in radians).
    ///
    /// In the orbital plane, `v = sqrt(mu / p) * (-sin ν, e + cos ν)`.
    pub fn velocity_at_true_anomaly_rad(&self, true_anomaly: f64) -> DVec3 {
        let (sin, cos) = true_anomaly.sin_cos();
        let scale = (self.gravitational_parameter() / self.semi_latus_rectum()).sqrt();
        let pqw = DVec2::new(-sin, self.eccentricity() + cos) * scale;

        self.transform_pqw_vector(pqw)
    }

    /// Gets the velocity of the body at a given time.
    pub fn velocity_at(&self, t: f64) -> DVec3 {
        self.velocity_at_true_anomaly_rad(self.true_anomaly_at_rad(t))
    }

    /// Gets the speed of the body at a given time.
    ///
    /// Uses the vis-viva equation, `v = sqrt(mu (2/r - 1/a))`.
    pub fn speed_at(&self, t: f64) -> f64 {
        let radius = self.radius_at(t);
        (self.gravitational_parameter() * (2.0 / radius - 1.0 / self.semi_major_axis())).sqrt()
    }

    /// Gets the position and velocity of the body at a given time.
    pub fn state_vectors_at(&self, t: f64) -> StateVectors {
        let true_anomaly = self.true_anomaly_at_rad(t);
        StateVectors {
            position: self.position_at_true_anomaly_rad(true_anomaly),
            velocity: self.velocity_at_true_anomaly_rad(true_anomaly),
        }
    }
}

// Visualization sampling
impl OrbitModel {
    /// Samples the orbit outline in world space, and keeps the result in
    /// this model's sample cache.
    ///
    /// See [`sampling::boundary_3d`] for the layout of the points.
    ///
    /// # Errors
    /// Fails with [`OrbitError::TooFewSamples`] when `samples < 3`; the
    /// previous cache is kept.
    pub fn sample_boundary_3d(&mut self, samples: usize) -> Result<&[DVec3], OrbitError> {
        self.sampled = SampledBoundary::sample(self, samples).map_err(rejected)?;
        Ok(self.sampled.points_3d())
    }

    /// Samples the orbit outline projected onto the reference plane, and
    /// keeps the result in this model's sample cache.
    ///
    /// # Errors
    /// Fails with [`OrbitError::TooFewSamples`] when `samples < 3`; the
    /// previous cache is kept.
    pub fn sample_boundary_2d(&mut self, samples: usize) -> Result<&[DVec2], OrbitError> {
        self.sampled = SampledBoundary::sample(self, samples).map_err(rejected)?;
        Ok(self.sampled.points_2d())
    }

    /// Samples the orbit outline with the configured default sample count.
    pub fn sample_default_boundary_3d(&mut self) -> Result<&[DVec3], OrbitError> {
        self.sample_boundary_3d(self.config.default_sample_count)
    }

    /// Builds a triangle fan covering the orbital plane inside the orbit.
    ///
    /// Returns `3 * samples` points, three per triangle, each triangle
    /// joining the centre to two consecutive boundary points.
    ///
    /// This does not touch the sample cache.
    ///
    /// # Errors
    /// Fails with [`OrbitError::TooFewSamples`] when `samples < 3`.
    pub fn triangulate_plane(&self, samples: usize) -> Result<Vec<DVec3>, OrbitError> {
        let boundary = sampling::boundary_3d(self, samples)?;
        Ok(sampling::triangle_fan(self.center(), &boundary))
    }

    /// Gets the most recently sampled outline.
    ///
    /// This is not updated when elements change; sample again to refresh it.
    pub fn sampled_boundary(&self) -> &SampledBoundary {
        &self.sampled
    }

    /// Drops the sampled outline.
    pub fn clear_sample_cache(&mut self) {
        self.sampled.clear();
    }
}

impl Default for OrbitModel {
    /// Creates a unit orbit.
    ///
    /// The unit orbit is a perfect circle of radius 1 around the origin,
    /// with no tilt, and a gravitational parameter of 1.
    fn default() -> OrbitModel {
        Self {
            elements: OrbitalElements::default(),
            config: ModelConfig {
                gravitational_constant: 1.0,
                ..ModelConfig::default()
            },
            sampled: SampledBoundary::default(),
            observers: ObserverRegistry::default(),
        }
    }
}

impl TryFrom<OrbitalElements> for OrbitModel {
    type Error = OrbitError;

    fn try_from(elements: OrbitalElements) -> Result<Self, Self::Error> {
        Self::new(elements)
    }
}
