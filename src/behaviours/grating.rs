// rayx
use crate::behaviours::refrac::refrac;
use crate::core::geometry::Vector3;
use crate::core::rayx::{energy_to_wave_length, Float};
use crate::ray::{EventType, Ray};
use crate::surfaces::Collision;

/**
variable line spacing for gratings
@params
    line_density: nominal line density in lines per mm
    normal: surface normal at the hitpoint, whose z component tilts the
            effective groove spacing on curved substrates
    z: z-coordinate of the ray position
    vls: 6 polynomial coefficients given by the user
@returns the line density at this z-coordinate
*/
pub fn vls_grating(line_density: Float, normal: &Vector3, z: Float, vls: &[Float; 6]) -> Float {
    // line density is smaller on convex surfaces
    let del1: Float = normal.z.asin();
    let cos_d: Float = (-del1).cos();

    let z2: Float = z * z;
    let z3: Float = z2 * z;
    let z4: Float = z3 * z;
    let z5: Float = z4 * z;
    let z6: Float = z5 * z;
    let a: Float = line_density
        * (1.0
            + 2.0 * vls[0] * z
            + 3.0 * vls[1] * z2
            + 4.0 * vls[2] * z3
            + 5.0 * vls[3] * z4
            + 6.0 * vls[4] * z5
            + 7.0 * vls[5] * z6);
    a * cos_d
}

/// Diffraction off a line grating. The groove density at the hitpoint
/// feeds the refraction kernel; evanescent orders terminate the ray as
/// beyond the horizon.
pub fn behave_grating(
    mut ray: Ray,
    col: &Collision,
    vls: &[Float; 6],
    line_density: Float,
    order_of_diffraction: Float,
) -> Ray {
    let wave_length: Float = energy_to_wave_length(ray.energy);

    // a = WL * linedensity * order * 1e-06
    let linedensity: Float = vls_grating(line_density, &col.normal, ray.position.z, vls)
        * wave_length
        * order_of_diffraction
        * 1e-06;
    ray.order = order_of_diffraction as i32;

    match refrac(&ray.direction, &col.normal, linedensity) {
        Some(direction) => {
            ray.direction = direction;
            ray
        }
        None => ray.terminated(EventType::BeyondHorizon),
    }
}
