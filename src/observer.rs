//! Opt-in change notification for [`OrbitModel`][crate::OrbitModel].
//!
//! The model works the same with or without observers. They exist for
//! callers (editors, renderers) that want to react to element changes
//! instead of polling.

use core::fmt;

use crate::OrbitalElements;

/// Which element of an orbit was changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// The world-space position of the central body.
    MajorFocus,
    /// The semi-major axis.
    SemiMajorAxis,
    /// The eccentricity.
    Eccentricity,
    /// The inclination.
    Inclination,
    /// The longitude of ascending node.
    LongAscNode,
    /// The argument of periapsis.
    ArgPe,
    /// The mass of the central body.
    CentralBodyMass,
    /// The epoch.
    Epoch,
    /// The mean longitude at epoch.
    MeanLongitudeAtEpoch,
    /// The model configuration (for example the gravitational constant).
    Config,
}

/// A notification sent to observers after an accepted mutation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementChange {
    /// The element that changed.
    pub kind: ElementKind,
    /// The full element set after the change.
    pub elements: OrbitalElements,
}

/// A handle returned when registering an observer, used to remove it again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

type Callback = Box<dyn FnMut(&ElementChange) + Send + Sync>;

/// The list of observers attached to a model.
///
/// Registrations belong to one model instance: cloning a model
/// yields a clone with no observers.
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    callbacks: Vec<(ObserverId, Callback)>,
    next_id: u64,
}

impl ObserverRegistry {
    pub(crate) fn register(&mut self, callback: Callback) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.callbacks.push((id, callback));
        id
    }

    pub(crate) fn unregister(&mut self, id: ObserverId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(other, _)| *other != id);
        self.callbacks.len() != before
    }

    pub(crate) fn notify(&mut self, change: &ElementChange) {
        for (_, callback) in self.callbacks.iter_mut() {
            callback(change);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks.len()
    }
}

impl Clone for ObserverRegistry {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.callbacks.len())
            .finish()
    }
}
