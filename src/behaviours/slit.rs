// rayx
use crate::core::geometry::{direction_to_spherical_coords, spherical_coords_to_direction};
use crate::core::rayx::{energy_to_wave_length, Float};
use crate::core::sampling::{bessel_diff, fraun_diff};
use crate::elements::cutout::{in_cutout, Cutout};
use crate::ray::{EventType, Ray};

/// A slit blocks everything outside its opening and everything inside
/// its beamstop; rays that pass gain the angular spread of Fraunhofer
/// diffraction at the opening.
pub fn behave_slit(mut ray: Ray, opening_cutout: &Cutout, beamstop_cutout: &Cutout) -> Ray {
    // like all elements the slit is traced in its XZ plane, so the
    // opening is checked against the x and z of the hitpoint
    let within_opening: bool = in_cutout(opening_cutout, ray.position.x, ray.position.z);
    let within_beamstop: bool = in_cutout(beamstop_cutout, ray.position.x, ray.position.z);

    if !within_opening || within_beamstop {
        return ray.terminated(EventType::Absorbed);
    }

    let (mut phi, mut psi) = direction_to_spherical_coords(&ray.direction);

    let mut d_phi: Float = 0.0;
    let mut d_psi: Float = 0.0;
    let wave_length: Float = energy_to_wave_length(ray.energy);

    if wave_length > 0.0 {
        match opening_cutout {
            Cutout::Rect { width, length } => {
                d_phi = fraun_diff(*width, wave_length, &mut ray.rng);
                d_psi = fraun_diff(*length, wave_length, &mut ray.rng);
            }
            Cutout::Elliptical { diameter_z, .. } => {
                let (p, q) = bessel_diff(*diameter_z, wave_length, &mut ray.rng);
                d_phi = p;
                d_psi = q;
            }
            _ => return ray.terminated(EventType::FatalError),
        }
    }

    phi += d_phi;
    psi += d_psi;

    ray.direction = spherical_coords_to_direction(phi, psi);
    ray.order = 0;
    ray
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::efield::ElectricField;
    use crate::core::geometry::Vector3;
    use crate::core::rng::Rng;

    fn slit_ray(x: Float, z: Float) -> Ray {
        Ray::emitted(
            Vector3::new(x, 0.0, z),
            Vector3::new(0.0, 1.0, 0.0),
            124.0,
            ElectricField::default(),
            Rng::from_counter(77),
            0,
            0,
        )
    }

    fn open_slit() -> (Cutout, Cutout) {
        (
            Cutout::Rect {
                width: 1.0,
                length: 1.0,
            },
            // an empty beamstop
            Cutout::Rect {
                width: 0.0,
                length: 0.0,
            },
        )
    }

    #[test]
    fn test_central_ray_passes() {
        let (opening, beamstop) = open_slit();
        let out = behave_slit(slit_ray(0.0, 0.0), &opening, &beamstop);
        assert_eq!(out.event_type, EventType::Emitted);
        // the perturbed direction stays close to the optical axis for
        // a macroscopic opening
        assert!(out.direction.y > 0.999);
    }

    #[test]
    fn test_ray_outside_opening_is_absorbed() {
        let (opening, beamstop) = open_slit();
        let out = behave_slit(slit_ray(2.0, 0.0), &opening, &beamstop);
        assert_eq!(out.event_type, EventType::Absorbed);
    }

    #[test]
    fn test_ray_on_beamstop_is_absorbed() {
        let opening = Cutout::Rect {
            width: 4.0,
            length: 4.0,
        };
        let beamstop = Cutout::Rect {
            width: 1.0,
            length: 1.0,
        };
        let out = behave_slit(slit_ray(0.0, 0.0), &opening, &beamstop);
        assert_eq!(out.event_type, EventType::Absorbed);
    }

    #[test]
    fn test_elliptical_opening_diffracts() {
        let opening = Cutout::Elliptical {
            diameter_x: 1.0,
            diameter_z: 1.0,
        };
        let beamstop = Cutout::Rect {
            width: 0.0,
            length: 0.0,
        };
        let out = behave_slit(slit_ray(0.0, 0.0), &opening, &beamstop);
        assert_eq!(out.event_type, EventType::Emitted);
        assert!(out.direction.y > 0.999);
    }
}
