// others
use num::complex::Complex64;
// rayx
use crate::behaviours::BehaveContext;
use crate::core::efield::ComplexMatrix3;
use crate::core::fresnel::{
    angle_between_unit_vectors, calc_film_transmittance, calc_polarization_matrix,
};
use crate::core::material::get_refractive_index;
use crate::core::rayx::{energy_to_wave_length, Float};
use crate::elements::OpticalElement;
use crate::ray::{EventType, Ray};
use crate::surfaces::Collision;

/// Transmission through a thin foil. The single-film Fresnel
/// transmittances for s and p polarisation, including internal
/// interference, scale the field; the direction is unchanged and the
/// ray leaves as `Transmitted`.
pub fn behave_foil(
    mut ray: Ray,
    element: &OpticalElement,
    col: &Collision,
    ctx: &BehaveContext,
    thickness_substrate: Float,
) -> Ray {
    let ior = match get_refractive_index(
        ray.energy,
        element.material,
        ctx.material_indices,
        ctx.material_table,
    ) {
        Some(ior) => ior,
        None => return ray.terminated(EventType::FatalError),
    };

    let wave_length: Float = energy_to_wave_length(ray.energy);
    let theta0 = Complex64::new(
        angle_between_unit_vectors(&ray.direction, &-col.normal),
        0.0,
    );

    let transmittance = calc_film_transmittance(
        wave_length,
        theta0,
        Complex64::new(1.0, 0.0),
        ior,
        thickness_substrate,
    );

    // the foil does not bend the ray, so the outgoing frame of the
    // transfer matrix is the incoming one and the s/p amplitudes apply
    // in place
    let is_normal_incidence = ray.direction == -col.normal;
    let matrix = if is_normal_incidence {
        ComplexMatrix3::diagonal(transmittance.s, transmittance.s, transmittance.s)
    } else {
        calc_polarization_matrix(&ray.direction, &ray.direction, &col.normal, &transmittance)
    };
    ray.field = matrix.mul_field(&ray.field);

    if !ray.field.is_finite() {
        return ray.terminated(EventType::FatalError);
    }

    ray.order = 0;
    ray.event_type = EventType::Transmitted;
    ray
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviours::{Behaviour, BraggFailurePolicy};
    use crate::core::efield::{rotation_matrix, stokes_to_field, Stokes};
    use crate::core::geometry::Vector3;
    use crate::core::material::{MaterialTablesBuilder, PalikEntry};
    use crate::core::rng::Rng;
    use crate::core::transform::{DesignPlane, Matrix3};
    use crate::elements::{Cutout, SlopeError};
    use crate::surfaces::Surface;

    fn foil_element(material: i32) -> OpticalElement {
        OpticalElement::new(
            Vector3::default(),
            Matrix3::identity(),
            Surface::Plane,
            Cutout::Unlimited,
            Behaviour::Foil {
                thickness_substrate: 200.0,
                roughness_substrate: 0.0,
            },
            SlopeError::default(),
            0.0,
            material,
            DesignPlane::Xz,
        )
    }

    #[test]
    fn test_foil_transmits_and_attenuates() {
        let al = crate::core::material::material_from_symbol("Al").unwrap();
        let tables = MaterialTablesBuilder::new()
            .palik(
                al,
                vec![
                    PalikEntry { energy: 10.0, n: 0.99, k: 0.01 },
                    PalikEntry { energy: 10000.0, n: 0.9999, k: 1e-6 },
                ],
            )
            .build();
        let ctx = BehaveContext {
            material_indices: &tables.indices,
            material_table: &tables.table,
            bragg_failure: BraggFailurePolicy::Absorb,
        };

        let direction = Vector3::new(0.0, -1.0, 0.0);
        let field =
            stokes_to_field(&Stokes::new(1.0, 0.0, 0.0, 0.0)).rotate(&rotation_matrix(direction));
        let ray = Ray::emitted(
            Vector3::default(),
            direction,
            1000.0,
            field,
            Rng::from_counter(1),
            0,
            0,
        );
        let before = ray.field.intensity();

        let element = foil_element(al);
        let col = Collision {
            hitpoint: Vector3::default(),
            normal: Vector3::new(0.0, 1.0, 0.0),
        };
        let out = behave_foil(ray, &element, &col, &ctx, 200.0);

        assert_eq!(out.event_type, EventType::Transmitted);
        assert_eq!(out.direction, direction);
        assert!(out.field.intensity() > 0.0);
        assert!(out.field.intensity() <= before * 1.05);
    }

    #[test]
    fn test_foil_without_material_data_fails() {
        let tables = crate::core::material::MaterialTables::empty();
        let ctx = BehaveContext {
            material_indices: &tables.indices,
            material_table: &tables.table,
            bragg_failure: BraggFailurePolicy::Absorb,
        };
        let element = foil_element(13);
        let ray = Ray::emitted(
            Vector3::default(),
            Vector3::new(0.0, -1.0, 0.0),
            1000.0,
            crate::core::efield::ElectricField::default(),
            Rng::from_counter(1),
            0,
            0,
        );
        let col = Collision {
            hitpoint: Vector3::default(),
            normal: Vector3::new(0.0, 1.0, 0.0),
        };
        let out = behave_foil(ray, &element, &col, &ctx, 200.0);
        assert_eq!(out.event_type, EventType::FatalError);
    }
}
