//! Compiled optical elements. An `OpticalElement` is immutable during
//! tracing and carries everything the kernel needs: the transforms
//! between world and element coordinates, the surface, its cutout, the
//! per-hit behaviour and the material.

pub mod cutout;
pub mod slope_error;

pub use cutout::Cutout;
pub use slope_error::{SlopeError, SlopeErrorType};

// rayx
use crate::behaviours::Behaviour;
use crate::core::geometry::Vector3;
use crate::core::rayx::Float;
use crate::core::transform::{calc_transformation_matrices, DesignPlane, Matrix3, Matrix4};
use crate::surfaces::Surface;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpticalElement {
    /// Converts a point from world coordinates to element coordinates.
    pub in_trans: Matrix4,
    /// Converts a point from element coordinates back to world
    /// coordinates.
    pub out_trans: Matrix4,
    /// Describes what happens to a ray once it collides with this
    /// element.
    pub behaviour: Behaviour,
    /// Describes how the element's surface is curved.
    pub surface: Surface,
    /// Limits the surface to the dimensions of the actual element.
    pub cutout: Cutout,
    /// Random noise on the surface normal.
    pub slope_error: SlopeError,
    /// Angle at which this element is rotated around the main beam.
    pub azimuthal_angle: Float,
    /// Material key; -1 vacuum, -2 ideally reflective, 1..=92 the
    /// atomic number.
    pub material: i32,
}

impl OpticalElement {
    /// Builds an element at `position` with the given `orientation`
    /// (columns are the element axes in world coordinates). Slits and
    /// image planes pass `DesignPlane::Xy`, everything else `Xz`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        position: Vector3,
        orientation: Matrix3,
        surface: Surface,
        cutout: Cutout,
        behaviour: Behaviour,
        slope_error: SlopeError,
        azimuthal_angle: Float,
        material: i32,
        plane: DesignPlane,
    ) -> Self {
        let in_trans = calc_transformation_matrices(position, orientation, true, plane);
        let out_trans = calc_transformation_matrices(position, orientation, false, plane);
        OpticalElement {
            in_trans,
            out_trans,
            behaviour,
            surface,
            cutout,
            slope_error,
            azimuthal_angle,
            material,
        }
    }

    /// The design plane a behaviour implies. Slits and image planes are
    /// specified in XY and pre-rotated into the XZ tracing frame.
    pub fn design_plane_for(behaviour: &Behaviour) -> DesignPlane {
        match behaviour {
            Behaviour::Slit { .. } | Behaviour::ImagePlane => DesignPlane::Xy,
            _ => DesignPlane::Xz,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::material::MATERIAL_REFLECTIVE;
    use approx::assert_relative_eq;

    #[test]
    fn test_transforms_are_mutually_inverse() {
        let e = OpticalElement::new(
            Vector3::new(3.0, -1.0, 25.0),
            Matrix3::rotation_x(0.7),
            Surface::Plane,
            Cutout::Unlimited,
            Behaviour::Mirror,
            SlopeError::default(),
            0.0,
            MATERIAL_REFLECTIVE,
            DesignPlane::Xz,
        );
        let p = Vector3::new(0.1, 0.2, 0.3);
        let q = e.out_trans.transform_point(&e.in_trans.transform_point(&p));
        assert_relative_eq!(p.x, q.x, epsilon = 1e-10);
        assert_relative_eq!(p.y, q.y, epsilon = 1e-10);
        assert_relative_eq!(p.z, q.z, epsilon = 1e-10);
    }
}
