//! Random surface figure errors, modelled as a per-hit perturbation of
//! the surface normal.

// rayx
use crate::core::geometry::Vector3;
use crate::core::rayx::{radians, Float};
use crate::core::rng::Rng;

/// The surface error description of an element. The sagittal and
/// meridional slopes are RMS values in arc seconds; the thermal and
/// bowing parameters describe systematic distortions.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlopeError {
    pub sag: Float,
    pub mer: Float,
    pub thermal_distortion_amp: Float,
    pub thermal_distortion_sigma_x: Float,
    pub thermal_distortion_sigma_z: Float,
    pub cylindrical_bowing_amp: Float,
    pub cylindrical_bowing_radius: Float,
}

/// How the two angle errors are applied to the normal.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum SlopeErrorType {
    Cartesian,
    Cylindrical,
}

/**
turn the normal vector through x_rad and z_rad
@params:    normal: the normal vector
            x_rad: angle in rad for x-axis
            z_rad: angle in rad for z-axis
returns modified normal vector
*/
pub fn normal_cartesian(normal: Vector3, x_rad: Float, z_rad: Float) -> Vector3 {
    let fx: Float = normal.x;
    let fy: Float = normal.y;
    let fz: Float = normal.z;

    let cosx: Float = x_rad.cos();
    let sinx: Float = x_rad.sin();
    let cosz: Float = z_rad.cos();
    let sinz: Float = z_rad.sin();

    let fy2: Float = fy * cosz + fz * sinz;
    Vector3 {
        x: fx * cosx + fy2 * sinx,
        y: fy2 * cosx - fx * sinx,
        z: fz * cosz - fy * sinz,
    }
}

/**
turn the normal vector through x_rad and z_rad
@params:    normal: the normal vector
            x_rad: angle in rad for x-axis
            z_rad: angle in rad for z-axis
returns modified normal vector
*/
pub fn normal_cylindrical(normal: Vector3, x_rad: Float, z_rad: Float) -> Vector3 {
    let norm_fx_fy: Float = (normal.x * normal.x + normal.y * normal.y).sqrt();
    let arc_tan_fx_fy: Float = normal.y.atan2(normal.x);
    let sinz: Float = z_rad.sin();
    let cosz: Float = z_rad.cos();

    Vector3 {
        x: (x_rad + arc_tan_fx_fy).cos() * (norm_fx_fy * cosz + normal.z * sinz),
        y: (x_rad + arc_tan_fx_fy).sin() * (norm_fx_fy * cosz + normal.z * sinz),
        z: normal.z * cosz - norm_fx_fy * sinz,
    }
}

/// Adds the slope error to the normal. Returns the unmodified normal
/// when both RMS slopes are zero, so the random number stream is only
/// consumed when the element actually has a figure error.
pub fn apply_slope_error(
    normal: Vector3,
    error: &SlopeError,
    error_type: SlopeErrorType,
    rng: &mut Rng,
) -> Vector3 {
    let slope_x: Float = error.sag;
    let slope_z: Float = error.mer;

    if slope_x == 0.0 && slope_z == 0.0 {
        return normal;
    }

    let random_x: Float = rng.normal(0.0, slope_x);
    let random_z: Float = rng.normal(0.0, slope_z);

    // slopes are RMS values in arc seconds
    let x_rad: Float = radians(random_x / 3600.0);
    let z_rad: Float = radians(random_z / 3600.0);

    match error_type {
        SlopeErrorType::Cartesian => normal_cartesian(normal, x_rad, z_rad),
        SlopeErrorType::Cylindrical => normal_cylindrical(normal, x_rad, z_rad),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_slope_error_is_identity() {
        let mut rng = Rng::from_counter(7);
        let n = Vector3::new(0.0, 1.0, 0.0);
        let e = SlopeError::default();
        let out = apply_slope_error(n, &e, SlopeErrorType::Cartesian, &mut rng);
        assert_eq!(out, n);
        // the stream must not have been advanced
        assert_eq!(rng, Rng::from_counter(7));
    }

    #[test]
    fn test_normal_cartesian_zero_angles() {
        let n = Vector3::new(0.3, 0.8, -0.1);
        let out = normal_cartesian(n, 0.0, 0.0);
        assert_relative_eq!(out.x, n.x);
        assert_relative_eq!(out.y, n.y);
        assert_relative_eq!(out.z, n.z);
    }

    #[test]
    fn test_perturbation_preserves_length() {
        let mut rng = Rng::from_counter(3);
        let n = Vector3::new(0.0, 1.0, 0.0);
        let e = SlopeError {
            sag: 10.0,
            mer: 5.0,
            ..SlopeError::default()
        };
        for ty in [SlopeErrorType::Cartesian, SlopeErrorType::Cylindrical].iter() {
            let out = apply_slope_error(n, &e, *ty, &mut rng);
            assert_relative_eq!(out.length(), 1.0, epsilon = 1e-12);
            // ten arcsec stays a small perturbation
            assert!(out.y > 0.99);
        }
    }
}
