#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Model-wide settings that are not orbital elements.
///
/// # Example
/// ```
/// use keplerian_orbit::ModelConfig;
///
/// let config = ModelConfig {
///     gravitational_constant: 1.0,
///     ..ModelConfig::default()
/// };
///
/// assert_eq!(config.default_sample_count, 64);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ModelConfig {
    /// The gravitational constant `G`, used to get the gravitational
    /// parameter `mu = G * M` from the central body mass.
    ///
    /// Defaults to the SI value, in m^3 kg^-1 s^-2.
    pub gravitational_constant: f64,

    /// The number of boundary samples used by
    /// [`OrbitModel::sample_default_boundary_3d`][crate::OrbitModel::sample_default_boundary_3d].
    pub default_sample_count: usize,
}

impl ModelConfig {
    /// The SI gravitational constant, in m^3 kg^-1 s^-2.
    pub const SI_GRAVITATIONAL_CONSTANT: f64 = 6.67430e-11;
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: Self::SI_GRAVITATIONAL_CONSTANT,
            default_sample_count: 64,
        }
    }
}
