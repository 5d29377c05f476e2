//! Complex Fresnel coefficients and the polarisation transfer matrices
//! built from them. Everything here works on complex angles so total
//! reflection and absorbing media fall out of the same formulas.

// others
use num::complex::Complex64;
// rayx
use crate::core::efield::{ComplexMatrix3, ElectricField};
use crate::core::geometry::{vec3_cross_vec3, vec3_dot_vec3, Vector3};
use crate::core::rayx::{clamp_t, Float, PI};
use crate::core::transform::Matrix3;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ComplexFresnelCoeffs {
    pub s: Complex64,
    pub p: Complex64,
}

pub fn angle_between_unit_vectors(a: &Vector3, b: &Vector3) -> Float {
    clamp_t(vec3_dot_vec3(a, b), -1.0, 1.0).acos()
}

/// Snell's law for complex indices of refraction.
pub fn calc_refract_angle(
    incident_angle: Complex64,
    ior_i: Complex64,
    ior_t: Complex64,
) -> Complex64 {
    ((ior_i / ior_t) * incident_angle.sin()).asin()
}

pub fn calc_reflect_amplitude(
    incident_angle: Complex64,
    refract_angle: Complex64,
    ior_i: Complex64,
    ior_t: Complex64,
) -> ComplexFresnelCoeffs {
    let cos_i: Complex64 = incident_angle.cos();
    let cos_t: Complex64 = refract_angle.cos();

    let s = (ior_i * cos_i - ior_t * cos_t) / (ior_i * cos_i + ior_t * cos_t);
    let p = (ior_t * cos_i - ior_i * cos_t) / (ior_t * cos_i + ior_i * cos_t);

    ComplexFresnelCoeffs { s, p }
}

/// Intensity reflectance for both polarisation components.
pub fn calc_reflect_intensity(amplitude: &ComplexFresnelCoeffs) -> (Float, Float) {
    (amplitude.s.norm_sqr(), amplitude.p.norm_sqr())
}

fn calc_jones_matrix(amplitude: &ComplexFresnelCoeffs) -> ComplexMatrix3 {
    ComplexMatrix3::diagonal(amplitude.s, amplitude.p, Complex64::new(1.0, 0.0))
}

/// The 3x3 matrix that takes the incident field to the outgoing field.
/// It rotates into the s/p frame of the plane of incidence, applies the
/// Fresnel amplitudes and rotates into the outgoing frame.
pub fn calc_polarization_matrix(
    incident_vec: &Vector3,
    out_vec: &Vector3,
    normal_vec: &Vector3,
    amplitude: &ComplexFresnelCoeffs,
) -> ComplexMatrix3 {
    let s0: Vector3 = vec3_cross_vec3(incident_vec, &-*normal_vec).normalize();
    let s1: Vector3 = s0;
    let p0: Vector3 = vec3_cross_vec3(incident_vec, &s0);
    let p1: Vector3 = vec3_cross_vec3(out_vec, &s0);

    let out = Matrix3::from_columns(s1, p1, *out_vec);
    // the inverse of the orthonormal in-basis is its transpose
    let inv_in = Matrix3::from_columns(s0, p0, *incident_vec).transpose();

    let jones = calc_jones_matrix(amplitude);

    ComplexMatrix3::from_real(&out)
        .mul_mat(&jones)
        .mul_mat(&ComplexMatrix3::from_real(&inv_in))
}

/// At normal incidence no plane of incidence exists; s and p agree and
/// only the base reflectivity plus its phase shift remain, applied to
/// all components alike.
pub fn calc_reflect_polarization_matrix_at_normal_incidence(
    amplitude: &ComplexFresnelCoeffs,
) -> ComplexMatrix3 {
    ComplexMatrix3::diagonal(amplitude.s, amplitude.s, amplitude.s)
}

/// Updates the electric field across a reflection off a surface with
/// refractive index `ior_t`, seen from a medium with `ior_i`.
pub fn intercept_reflect(
    incident_field: &ElectricField,
    incident_vec: &Vector3,
    reflect_vec: &Vector3,
    normal_vec: &Vector3,
    ior_i: Complex64,
    ior_t: Complex64,
) -> ElectricField {
    let incident_angle =
        Complex64::new(angle_between_unit_vectors(incident_vec, &-*normal_vec), 0.0);
    let refract_angle = calc_refract_angle(incident_angle, ior_i, ior_t);

    let reflect_amplitude = calc_reflect_amplitude(incident_angle, refract_angle, ior_i, ior_t);

    let is_normal_incidence = *incident_vec == -*normal_vec;
    let polarization_matrix = if is_normal_incidence {
        calc_reflect_polarization_matrix_at_normal_incidence(&reflect_amplitude)
    } else {
        calc_polarization_matrix(incident_vec, reflect_vec, normal_vec, &reflect_amplitude)
    };

    polarization_matrix.mul_field(incident_field)
}

/// Amplitude transmittance of a single thin film between vacuum on both
/// sides, including the interference of the internal reflections.
///
/// * `wave_length` - wavelength in nm
/// * `theta0` - complex angle of incidence, from the film normal
/// * `ior_vacuum`, `ior_material` - complex refractive indices
/// * `thickness` - film thickness in nm
pub fn calc_film_transmittance(
    wave_length: Float,
    theta0: Complex64,
    ior_vacuum: Complex64,
    ior_material: Complex64,
    thickness: Float,
) -> ComplexFresnelCoeffs {
    let sin_theta1: Complex64 = (ior_vacuum / ior_material) * theta0.sin();
    let theta1: Complex64 = sin_theta1.asin();
    // exit back into vacuum, same angle as entry
    let theta2: Complex64 = theta0;

    let rs = |ni: Complex64, nt: Complex64, thetai: Complex64, thetat: Complex64| {
        (ni * thetai.cos() - nt * thetat.cos()) / (ni * thetai.cos() + nt * thetat.cos())
    };
    let ts = |ni: Complex64, nt: Complex64, thetai: Complex64, thetat: Complex64| {
        (2.0 * ni * thetai.cos()) / (ni * thetai.cos() + nt * thetat.cos())
    };
    let rp = |ni: Complex64, nt: Complex64, thetai: Complex64, thetat: Complex64| {
        (nt * thetai.cos() - ni * thetat.cos()) / (nt * thetai.cos() + ni * thetat.cos())
    };
    let tp = |ni: Complex64, nt: Complex64, thetai: Complex64, thetat: Complex64| {
        (2.0 * ni * thetai.cos()) / (nt * thetai.cos() + ni * thetat.cos())
    };

    let r01s = rs(ior_vacuum, ior_material, theta0, theta1);
    let t01s = ts(ior_vacuum, ior_material, theta0, theta1);
    let r12s = rs(ior_material, ior_vacuum, theta1, theta2);
    let t12s = ts(ior_material, ior_vacuum, theta1, theta2);

    let r01p = rp(ior_vacuum, ior_material, theta0, theta1);
    let t01p = tp(ior_vacuum, ior_material, theta0, theta1);
    let r12p = rp(ior_material, ior_vacuum, theta1, theta2);
    let t12p = tp(ior_material, ior_vacuum, theta1, theta2);

    // phase picked up by one pass through the film
    let delta: Complex64 = (2.0 * PI / wave_length) * ior_material * thickness * theta1.cos();
    let phase: Complex64 = (Complex64::new(0.0, 1.0) * delta).exp();

    let ts_total = (t01s * t12s * phase) / (Complex64::new(1.0, 0.0) + r01s * r12s * phase * phase);
    let tp_total = (t01p * t12p * phase) / (Complex64::new(1.0, 0.0) + r01p * r12p * phase * phase);

    ComplexFresnelCoeffs {
        s: ts_total,
        p: tp_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::efield::{field_to_stokes, stokes_to_field, Stokes};
    use approx::assert_relative_eq;
    use num::Zero;

    #[test]
    fn test_perfect_conductor_keeps_intensity() {
        // a huge imaginary index approximates an ideal metal
        let ior = Complex64::new(1.0, 1e6);
        let incident_angle = Complex64::new(0.3, 0.0);
        let refract_angle = calc_refract_angle(incident_angle, Complex64::new(1.0, 0.0), ior);
        let amp = calc_reflect_amplitude(
            incident_angle,
            refract_angle,
            Complex64::new(1.0, 0.0),
            ior,
        );
        let (rs, rp) = calc_reflect_intensity(&amp);
        assert_relative_eq!(rs, 1.0, epsilon = 1e-4);
        assert_relative_eq!(rp, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_normal_incidence_reflectance() {
        // R = |(n1 - n2) / (n1 + n2)|^2 at normal incidence
        let n1 = Complex64::new(1.0, 0.0);
        let n2 = Complex64::new(0.9, 0.05);
        let theta = Complex64::zero();
        let amp = calc_reflect_amplitude(theta, calc_refract_angle(theta, n1, n2), n1, n2);
        let expected = ((n1 - n2) / (n1 + n2)).norm_sqr();
        let (rs, rp) = calc_reflect_intensity(&amp);
        assert_relative_eq!(rs, expected, epsilon = 1e-12);
        assert_relative_eq!(rp, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_intercept_reflect_scales_field() {
        let n1 = Complex64::new(1.0, 0.0);
        let n2 = Complex64::new(0.8, 0.1);
        let incident = Vector3::new(0.0, -1.0, 0.0);
        let reflected = Vector3::new(0.0, 1.0, 0.0);
        let normal = Vector3::new(0.0, 1.0, 0.0);

        let field = stokes_to_field(&Stokes::new(1.0, 1.0, 0.0, 0.0))
            .rotate(&crate::core::efield::rotation_matrix(incident));
        let out = intercept_reflect(&field, &incident, &reflected, &normal, n1, n2);

        let theta = Complex64::zero();
        let amp = calc_reflect_amplitude(theta, calc_refract_angle(theta, n1, n2), n1, n2);
        let expected = amp.s.norm_sqr() * field.intensity();
        assert_relative_eq!(out.intensity(), expected, epsilon = 1e-10);
        // the state stays fully polarised
        let stokes = field_to_stokes(&out);
        assert!(stokes.x > 0.0);
    }

    #[test]
    fn test_thin_film_transmittance_bounded() {
        let t = calc_film_transmittance(
            0.124,
            Complex64::new(0.2, 0.0),
            Complex64::new(1.0, 0.0),
            Complex64::new(1.0 - 1e-5, 1e-6),
            200.0,
        );
        assert!(t.s.norm_sqr() <= 1.0 + 1e-9);
        assert!(t.p.norm_sqr() <= 1.0 + 1e-9);
        assert!(t.s.norm_sqr() > 0.0);
    }
}
