// others
use num::complex::Complex64;
// rayx
use crate::behaviours::BehaveContext;
use crate::core::fresnel::intercept_reflect;
use crate::core::geometry::reflect;
use crate::core::material::{get_refractive_index, MATERIAL_REFLECTIVE};
use crate::core::rayx::Float;
use crate::elements::OpticalElement;
use crate::ray::{EventType, Ray};
use crate::surfaces::Collision;

/// Specular reflection. For real coatings the complex refractive index
/// drives a Fresnel update of the electric field, and the lost
/// intensity translates into a chance for the ray to be absorbed
/// outright, so a bundle of traced rays reproduces the reflectance on
/// average without carrying weights.
pub fn behave_mirror(
    mut ray: Ray,
    element: &OpticalElement,
    col: &Collision,
    ctx: &BehaveContext,
) -> Ray {
    let incident = ray.direction;
    ray.direction = reflect(&ray.direction, &col.normal);
    ray.order = 0;

    if element.material == MATERIAL_REFLECTIVE {
        return ray;
    }

    let ior = match get_refractive_index(
        ray.energy,
        element.material,
        ctx.material_indices,
        ctx.material_table,
    ) {
        Some(ior) => ior,
        None => return ray.terminated(EventType::FatalError),
    };

    let old_intensity: Float = ray.field.intensity();
    ray.field = intercept_reflect(
        &ray.field,
        &incident,
        &ray.direction,
        &col.normal,
        Complex64::new(1.0, 0.0),
        ior,
    );
    let new_intensity: Float = ray.field.intensity();

    // throw the ray away with the probability of the lost intensity
    let rn: Float = ray.rng.uniform();
    if new_intensity / old_intensity - rn <= 0.0 {
        return ray.terminated(EventType::Absorbed);
    }

    ray
}
