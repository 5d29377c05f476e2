//! The runtime photon. A `Ray` doubles as the in-flight state inside
//! the kernel and as the recorded event snapshot; positions are world
//! coordinates while tracing and element coordinates inside a
//! behaviour call.

// others
use strum_macros::{Display, EnumIter, EnumString};
// rayx
use crate::core::efield::ElectricField;
use crate::core::geometry::Vector3;
use crate::core::rayx::Float;
use crate::core::rng::Rng;

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum EventType {
    /// This ray has just hit the element named by `object_id` and will
    /// continue tracing afterwards.
    HitElement,
    /// The storage space for this path's events was insufficient for
    /// the events the trace produced.
    TooManyEvents,
    /// This ray was absorbed by the element named by `object_id`.
    Absorbed,
    /// An output slot that was never written.
    Uninitialized,
    /// Refraction pushed the ray past total reflection, there is no
    /// outgoing direction.
    BeyondHorizon,
    /// Some numerical assertion failed while tracing this ray.
    FatalError,
    /// This ray has just been emitted and had no other event yet.
    Emitted,
    /// This ray passed through an element without terminating.
    Transmitted,
}

impl EventType {
    /// An active ray keeps tracing; every other event type freezes it.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            EventType::Emitted | EventType::HitElement | EventType::Transmitted
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub position: Vector3,
    pub direction: Vector3,

    /// photon energy in eV
    pub energy: Float,
    /// accumulated path length in mm
    pub optical_path_length: Float,

    pub field: ElectricField,

    pub rng: Rng,

    pub path_id: i32,
    pub path_event_id: i32,
    pub order: i32,
    pub object_id: i32,
    pub source_id: i32,
    pub event_type: EventType,
}

impl Ray {
    /// A freshly emitted ray, before any element interaction.
    #[allow(clippy::too_many_arguments)]
    pub fn emitted(
        position: Vector3,
        direction: Vector3,
        energy: Float,
        field: ElectricField,
        rng: Rng,
        path_id: i32,
        source_id: i32,
    ) -> Self {
        Ray {
            position,
            direction,
            energy,
            optical_path_length: 0.0,
            field,
            rng,
            path_id,
            path_event_id: 0,
            order: 0,
            object_id: source_id,
            source_id,
            event_type: EventType::Emitted,
        }
    }

    pub fn is_active(&self) -> bool {
        self.event_type.is_active()
    }

    /// NaN or infinity anywhere in the numerical state disqualifies the
    /// ray from being recorded.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.direction.is_finite()
            && self.energy.is_finite()
            && self.optical_path_length.is_finite()
            && self.field.is_finite()
    }

    #[must_use]
    pub fn terminated(mut self, event_type: EventType) -> Self {
        self.event_type = event_type;
        self
    }

    /// Applies a homogeneous transform to the ray: the position as a
    /// point, the direction as a vector and the field through the
    /// rotational part.
    #[must_use]
    pub fn transformed(&self, m: &crate::core::transform::Matrix4) -> Ray {
        let mut r = *self;
        r.position = m.transform_point(&self.position);
        r.direction = m.transform_vector(&self.direction);
        r.field = self.field.rotate(&m.basis());
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_event_type_activity() {
        assert!(EventType::Emitted.is_active());
        assert!(EventType::HitElement.is_active());
        assert!(EventType::Transmitted.is_active());
        assert!(!EventType::Absorbed.is_active());
        assert!(!EventType::BeyondHorizon.is_active());
        assert!(!EventType::TooManyEvents.is_active());
        assert!(!EventType::FatalError.is_active());
        assert!(!EventType::Uninitialized.is_active());
    }

    #[test]
    fn test_event_type_strings_round_trip() {
        use strum::IntoEnumIterator;
        for ev in EventType::iter() {
            let s = ev.to_string();
            assert_eq!(EventType::from_str(&s).unwrap(), ev);
        }
    }
}
