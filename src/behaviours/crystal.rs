//! Dynamical X-ray diffraction on a perfect crystal, following the
//! treatment of Batterman & Cole (1964).

// others
use num::complex::Complex64;
// rayx
use crate::behaviours::BehaveContext;
use crate::core::fresnel::{calc_polarization_matrix, ComplexFresnelCoeffs};
use crate::core::geometry::{reflect, Vector3};
use crate::core::rayx::{clamp_t, energy_to_wave_length, Float, ELECTRON_RADIUS, PI};
use crate::ray::{EventType, Ray};
use crate::surfaces::Collision;

/// What to do with a ray whose wavelength cannot satisfy the Bragg
/// condition on this crystal.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum BraggFailurePolicy {
    /// terminate the ray as absorbed
    Absorb,
    /// terminate the ray as a fatal error
    Fatal,
}

impl Default for BraggFailurePolicy {
    fn default() -> Self {
        BraggFailurePolicy::Absorb
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrystalBehaviour {
    /// twice the lattice spacing in nm
    pub d_spacing_2: Float,
    /// unit cell volume in nm^3
    pub unit_cell_volume: Float,
    /// tilt between surface and diffraction planes in rad
    pub offset_angle: Float,

    pub structure_factor_re_f0: Float,
    pub structure_factor_im_f0: Float,
    pub structure_factor_re_fh: Float,
    pub structure_factor_im_fh: Float,
    pub structure_factor_re_fhc: Float,
    pub structure_factor_im_fhc: Float,
}

/// The local grazing angle between the ray and the diffraction planes,
/// derived from the direction cosines of ray and surface normal plus
/// the crystal's offset angle.
pub fn get_theta(direction: &Vector3, normal: &Vector3, offset_angle: Float) -> Float {
    let d: Vector3 = direction.normalize();
    let ar: Float = clamp_t(
        d.x * normal.x + d.y * normal.y + d.z * normal.z,
        -1.0,
        1.0,
    );
    let theta: Float = ar.acos() - PI / 2.0;
    theta + offset_angle
}

/// The Bragg angle for a photon of `energy` (eV), or `None` when the
/// wavelength is too long for this lattice.
pub fn get_bragg_angle(energy: Float, d_spacing_2: Float) -> Option<Float> {
    let order: Float = 1.0;
    let wave_length: Float = energy_to_wave_length(energy);
    let theta_factor: Float = order * wave_length / d_spacing_2;

    // no reflection possible
    if theta_factor > 1.0 {
        return None;
    }

    Some(theta_factor.asin())
}

/// Asymmetry factor b between the incident and the diffracted beam
/// direction cosines.
pub fn get_asymmetry_factor(bragg_angle: Float, alpha: Float) -> Float {
    let numerator: Float = (bragg_angle - alpha).sin();
    let denominator: Float = (bragg_angle + alpha).sin();

    if denominator == 0.0 {
        return 0.0;
    }
    numerator / denominator
}

/// The diffraction prefactor Gamma, Batterman & Cole p. 685. The
/// wavelength is in nm and the unit cell volume in nm^3, matching the
/// nm-valued electron radius.
pub fn get_diffraction_prefactor(wave_length: Float, unit_cell_volume: Float) -> Float {
    if wave_length <= 0.0 || unit_cell_volume <= 0.0 {
        return 0.0;
    }
    (ELECTRON_RADIUS * wave_length * wave_length) / PI / unit_cell_volume
}

/// The normalized angular deviation parameter eta, equation (32) of
/// Batterman & Cole p. 690.
pub fn compute_eta(
    theta: Float,
    bragg: Float,
    asymmetry: Float,
    b: &CrystalBehaviour,
    pol_factor: Float,
    gamma: Float,
) -> Complex64 {
    let top_term1: Complex64 =
        Complex64::new(asymmetry * (theta - bragg) * (2.0 * theta).sin(), 0.0);
    let top_term2: Complex64 = 0.5
        * gamma
        * Complex64::new(b.structure_factor_re_f0, b.structure_factor_im_f0)
        * (1.0 - asymmetry);
    let top: Complex64 = top_term1 + top_term2;

    let bottom_term1: Float = gamma * pol_factor;
    let bottom_term2: Float = asymmetry.abs().sqrt();
    let fh = Complex64::new(b.structure_factor_re_fh, b.structure_factor_im_fh);
    let fhc = Complex64::new(b.structure_factor_re_fhc, b.structure_factor_im_fhc);
    let bottom_term3: Complex64 = (fh * fhc).sqrt();

    let bottom: Complex64 = bottom_term1 * bottom_term2 * bottom_term3;

    top / bottom
}

/// The complex reflection coefficient R from eta, equation (103) of
/// Batterman & Cole p. 706.
pub fn compute_r(eta: Complex64, b: &CrystalBehaviour) -> Complex64 {
    let one = Complex64::new(1.0, 0.0);
    let fh = Complex64::new(b.structure_factor_re_fh, b.structure_factor_im_fh);
    let fhc = Complex64::new(b.structure_factor_re_fhc, b.structure_factor_im_fhc);

    if eta.re > 0.0 {
        (eta - (eta * eta - one).sqrt()) * (fh / fhc).sqrt()
    } else {
        (eta + (eta * eta - one).sqrt()) * (fh / fhc).sqrt()
    }
}

/// Bragg reflection. The complex reflection coefficients for s and p
/// polarisation rotate the field exactly like Fresnel amplitudes on a
/// mirror, then the direction is reflected about the surface normal.
pub fn behave_crystal(
    mut ray: Ray,
    col: &Collision,
    b: &CrystalBehaviour,
    ctx: &BehaveContext,
) -> Ray {
    let theta: Float = get_theta(&ray.direction, &col.normal, b.offset_angle);

    let bragg: Float = match get_bragg_angle(ray.energy, b.d_spacing_2) {
        Some(bragg) => bragg,
        None => {
            return match ctx.bragg_failure {
                BraggFailurePolicy::Absorb => ray.terminated(EventType::Absorbed),
                BraggFailurePolicy::Fatal => ray.terminated(EventType::FatalError),
            }
        }
    };

    let asymmetry: Float = get_asymmetry_factor(bragg, b.offset_angle);
    let wave_length: Float = energy_to_wave_length(ray.energy);
    let gamma: Float = get_diffraction_prefactor(wave_length, b.unit_cell_volume);

    // s polarisation sees the full structure factor, p is reduced by
    // the polarisation factor |cos 2 theta_B|
    let pol_factor_s: Float = 1.0;
    let pol_factor_p: Float = (2.0 * bragg).cos().abs();

    let eta_s = compute_eta(theta, bragg, asymmetry, b, pol_factor_s, gamma);
    let eta_p = compute_eta(theta, bragg, asymmetry, b, pol_factor_p, gamma);

    let amplitude = ComplexFresnelCoeffs {
        s: compute_r(eta_s, b),
        p: compute_r(eta_p, b),
    };

    let incident = ray.direction;
    ray.direction = reflect(&ray.direction, &col.normal);
    ray.order = 0;

    let polarization_matrix =
        calc_polarization_matrix(&incident, &ray.direction, &col.normal, &amplitude);
    ray.field = polarization_matrix.mul_field(&ray.field);

    if !ray.field.is_finite() {
        return ray.terminated(EventType::FatalError);
    }

    ray
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // silicon (111) in nm units
    fn si_111() -> CrystalBehaviour {
        CrystalBehaviour {
            d_spacing_2: 2.0 * 0.31356,
            unit_cell_volume: 0.160103,
            offset_angle: 0.0,
            structure_factor_re_f0: 113.842,
            structure_factor_im_f0: 1.5292,
            structure_factor_re_fh: 43.814,
            structure_factor_im_fh: 1.0593,
            structure_factor_re_fhc: 43.814,
            structure_factor_im_fhc: 1.0593,
        }
    }

    #[test]
    fn test_bragg_angle_silicon() {
        // 8.048 keV (Cu K-alpha) on Si(111) diffracts near 14.2 deg
        let bragg = get_bragg_angle(8048.0, si_111().d_spacing_2).unwrap();
        assert_relative_eq!(bragg.to_degrees(), 14.2, epsilon = 0.2);
    }

    #[test]
    fn test_bragg_angle_unrealisable() {
        // 100 eV photons have a 12 nm wavelength, far beyond 2d
        assert!(get_bragg_angle(100.0, si_111().d_spacing_2).is_none());
    }

    #[test]
    fn test_symmetric_crystal_has_unit_asymmetry() {
        let bragg: Float = 0.3;
        assert_relative_eq!(get_asymmetry_factor(bragg, 0.0), 1.0);
    }

    #[test]
    fn test_reflection_peaks_at_bragg_angle() {
        let b = si_111();
        let bragg = get_bragg_angle(8048.0, b.d_spacing_2).unwrap();
        let gamma = get_diffraction_prefactor(energy_to_wave_length(8048.0), b.unit_cell_volume);

        let eta_centre = compute_eta(bragg, bragg, 1.0, &b, 1.0, gamma);
        let r_centre = compute_r(eta_centre, &b).norm_sqr();

        // far off the rocking curve the reflectivity collapses
        let eta_off = compute_eta(bragg + 1e-3, bragg, 1.0, &b, 1.0, gamma);
        let r_off = compute_r(eta_off, &b).norm_sqr();

        assert!(r_centre > 0.5);
        assert!(r_off < 0.1);
        assert!(r_centre <= 1.0 + 1e-9);
    }
}
