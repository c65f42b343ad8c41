/// An error describing why an orbit could not be created or modified.
///
/// Every validating operation in this crate reports failures through this
/// type. A failed operation never leaves the model partially updated.
#[non_exhaustive]
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum OrbitError {
    /// ### Attempt to use a semi-major axis that is zero or negative.
    /// An ellipse has a strictly positive size.
    #[error("semi-major axis must be positive, got {0}")]
    NonPositiveSemiMajorAxis(f64),

    /// ### Attempt to use an eccentricity outside of `[0, 1)`.
    /// Only closed (elliptic or circular) orbits are supported.
    #[error("eccentricity must be within [0, 1), got {0}")]
    EccentricityOutOfRange(f64),

    /// ### Attempt to use a central body mass that is zero or negative.
    /// The gravitational parameter is derived from the mass, and
    /// a non-positive one has no meaningful mean motion.
    #[error("central body mass must be positive, got {0}")]
    NonPositiveMass(f64),

    /// ### Attempt to use a gravitational constant that is zero or negative.
    #[error("gravitational constant must be positive, got {0}")]
    NonPositiveGravitationalConstant(f64),

    /// ### Attempt to assign NaN or an infinity to an element.
    #[error("{element} must be finite, got {value}")]
    NonFiniteValue {
        /// The name of the element the value was meant for.
        element: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// ### Attempt to sample an orbit boundary with fewer than three points.
    /// A closed polygon needs at least three distinct vertices.
    #[error("at least {min} samples are required, got {requested}")]
    TooFewSamples {
        /// The number of samples that was requested.
        requested: usize,
        /// The minimum number of samples accepted.
        min: usize,
    },

    /// ### Attempt to evaluate a model that does not describe an ellipse.
    /// Reported for data read back through deserialization that
    /// cannot describe an ellipse.
    #[error("orbit geometry is degenerate: {0}")]
    DegenerateGeometry(&'static str),
}

impl OrbitError {
    /// Whether this error was caused by an invalid argument, as opposed
    /// to an operation on a model that is not fully specified.
    ///
    /// # Example
    /// ```
    /// use keplerian_orbit::OrbitError;
    ///
    /// assert!(OrbitError::NonPositiveMass(0.0).is_validation());
    /// assert!(!OrbitError::DegenerateGeometry("zero axis").is_validation());
    /// ```
    pub fn is_validation(&self) -> bool {
        !matches!(self, OrbitError::DegenerateGeometry(_))
    }
}
