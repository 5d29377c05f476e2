//! The refraction kernel shared by gratings and zone plates. It works
//! in a frame rotated so the surface normal points along -y, adjusts
//! the tangential direction components by the line density terms and
//! rotates back. When the adjusted direction has no real y component
//! left the ray is beyond the horizon and there is no outgoing ray.

// rayx
use crate::core::geometry::Vector3;
use crate::core::rayx::Float;
use crate::core::transform::Matrix3;

/**
calculates the refracted direction for a line density acting along both
tangential axes
@params:    direction: ray direction at the hitpoint
            normal: normal at the intersection point
            az: line spacing in z direction
            ax: line spacing in x direction
@returns: refracted direction, or None if the ray is beyond the horizon
*/
pub fn refrac2d(direction: &Vector3, normal: &Vector3, az: Float, ax: Float) -> Option<Vector3> {
    let eps1: Float = -(normal.x / normal.y).atan();
    let del1: Float = normal.z.asin();

    let cos_d: Float = (-del1).cos();
    let sin_d: Float = (-del1).sin();
    let cos_e: Float = (-eps1).cos();
    let sin_e: Float = (-eps1).sin();

    let rot = Matrix3::from_columns(
        Vector3::new(cos_e, cos_d * sin_e, sin_d * sin_e),
        Vector3::new(-sin_e, cos_d * cos_e, sin_d * cos_e),
        Vector3::new(0.0, -sin_d, cos_d),
    );
    let inv_rot = Matrix3::from_columns(
        Vector3::new(cos_e, -sin_e, 0.0),
        Vector3::new(cos_d * sin_e, cos_d * cos_e, -sin_d),
        Vector3::new(sin_d * sin_e, sin_d * cos_e, cos_d),
    );

    let d: Vector3 = rot.mul_vec(direction);

    let x1: Float = d.x - ax;
    let z1: Float = d.z - az;
    let y1: Float = 1.0 - x1 * x1 - z1 * z1;

    if y1 > 0.0 {
        let out = Vector3::new(x1, y1.sqrt(), z1);
        Some(inv_rot.mul_vec(&out))
    } else {
        // beyond horizon - when divergence too large
        None
    }
}

/// refraction function used for gratings
pub fn refrac(direction: &Vector3, normal: &Vector3, linedensity: Float) -> Option<Vector3> {
    let xy: Float = normal.x / normal.y;
    let zy: Float = normal.z / normal.y;
    let sqq: Float = (1.0 + zy * zy + xy * xy).sqrt();
    let an_x: Float = xy / sqq;
    let an_y: Float = -1.0 / sqq;
    let an_z: Float = zy / sqq;

    let eps1: Float = (an_x / an_y).atan();
    let del1: Float = an_z.asin();

    let cos_d: Float = del1.cos();
    let a1: Float = linedensity * cos_d;
    let sin_d: Float = (-del1).sin();
    let cos_e: Float = (-eps1).cos();
    let sin_e: Float = (-eps1).sin();

    let rot = Matrix3::from_columns(
        Vector3::new(cos_e, cos_d * sin_e, sin_d * sin_e),
        Vector3::new(-sin_e, cos_d * cos_e, sin_d * cos_e),
        Vector3::new(0.0, -sin_d, cos_d),
    );
    let inv_rot = Matrix3::from_columns(
        Vector3::new(cos_e, -sin_e, 0.0),
        Vector3::new(cos_d * sin_e, cos_d * cos_e, -sin_d),
        Vector3::new(sin_d * sin_e, sin_d * cos_e, cos_d),
    );

    let d: Vector3 = rot.mul_vec(direction);

    let y1: Float = d.y * d.y + d.z * d.z - (d.z - a1) * (d.z - a1);
    if y1 > 0.0 {
        let out = Vector3::new(d.x, y1.sqrt(), d.z - a1);
        Some(inv_rot.mul_vec(&out))
    } else {
        None
    }
}

/*
 * simplified refraction function for plane gratings. the normal is
 * always (0, 1, 0), so no rotation and no trigonometric functions are
 * necessary
 * @param direction   direction at the hitpoint
 * @param a           a = WL * D0 * ORD * 1.e-6  with D0: line density
 *                    (l/mm); WL: wavelength (nm); ORD: order of
 *                    diffraction
 */
pub fn refrac_plane(direction: &Vector3, a: Float) -> Option<Vector3> {
    let y1: Float = direction.y * direction.y + direction.z * direction.z
        - (direction.z - a) * (direction.z - a);
    if y1 > 0.0 {
        Some(Vector3::new(direction.x, y1.sqrt(), direction.z - a))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_refrac_plane_zero_density_reflects_up() {
        // with a = 0 the tangential components stay, y flips positive
        let d = Vector3::new(0.0, -0.99, 0.14).normalize();
        let out = refrac_plane(&d, 0.0).unwrap();
        assert_relative_eq!(out.y, -d.y, epsilon = 1e-12);
        assert_relative_eq!(out.z, d.z, epsilon = 1e-12);
    }

    #[test]
    fn test_refrac_plane_shifts_tangential_component() {
        let d = Vector3::new(0.0, -0.8, 0.6);
        let a: Float = 0.01239852;
        let out = refrac_plane(&d, a).unwrap();
        assert_relative_eq!(out.z, 0.6 - a, epsilon = 1e-12);
        // direction stays unit length
        assert_relative_eq!(out.length(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_refrac_plane_beyond_horizon() {
        // an absurd line density pushes z past the unit sphere
        let d = Vector3::new(0.0, -0.1, 0.994987);
        assert!(refrac_plane(&d, 1.5).is_none());
    }

    #[test]
    fn test_refrac_matches_refrac_plane_for_flat_normal() {
        let d = Vector3::new(0.01, -0.95, 0.31).normalize();
        let n = Vector3::new(0.0, 1.0, 0.0);
        let a: Float = 0.002;
        let full = refrac(&d, &n, a).unwrap();
        let flat = refrac_plane(&d, a).unwrap();
        assert_relative_eq!(full.x, flat.x, epsilon = 1e-10);
        assert_relative_eq!(full.y, flat.y, epsilon = 1e-10);
        assert_relative_eq!(full.z, flat.z, epsilon = 1e-10);
    }

    #[test]
    fn test_refrac2d_zero_densities_reflect() {
        let d = Vector3::new(0.05, -0.9, 0.2).normalize();
        let n = Vector3::new(0.0, 1.0, 0.0);
        let out = refrac2d(&d, &n, 0.0, 0.0).unwrap();
        assert_relative_eq!(out.x, d.x, epsilon = 1e-12);
        assert_relative_eq!(out.y, -d.y, epsilon = 1e-12);
        assert_relative_eq!(out.z, d.z, epsilon = 1e-12);
    }
}
