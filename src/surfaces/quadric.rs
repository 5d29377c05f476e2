// rayx
use crate::core::geometry::{sign, Vector3};
use crate::core::rayx::Float;
use crate::surfaces::Collision;

/// A general quadric surface a11 x^2 + 2 a12 xy + ... + a44 = 0,
/// described by the ten independent coefficients of its symmetric
/// matrix. `icurv` picks the wanted sheet, +1 for the concave and -1
/// for the convex solution of the quadratic.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadricSurface {
    pub icurv: i32,
    pub a11: Float,
    pub a12: Float,
    pub a13: Float,
    pub a14: Float,
    pub a22: Float,
    pub a23: Float,
    pub a24: Float,
    pub a33: Float,
    pub a34: Float,
    pub a44: Float,
}

impl QuadricSurface {
    /// A sphere of the given radius touching the origin from above,
    /// i.e. centered at (0, radius, 0).
    pub fn sphere(radius: Float) -> Self {
        QuadricSurface {
            icurv: 1,
            a11: 1.0,
            a12: 0.0,
            a13: 0.0,
            a14: 0.0,
            a22: 1.0,
            a23: 0.0,
            a24: -radius,
            a33: 1.0,
            a34: 0.0,
            a44: 0.0,
        }
    }
}

/// Solves the quadratic the ray parameter fulfils on the surface. The
/// parametrisation runs along the axis with the largest direction
/// component so grazing geometry stays well conditioned; the sheet is
/// chosen by `icurv` together with the sign of that component.
pub fn intersect(q: &QuadricSurface, position: &Vector3, direction: &Vector3) -> Option<Collision> {
    let mut cs: i32 = 1;
    if direction.y.abs() >= direction.x.abs() && direction.y.abs() >= direction.z.abs() {
        cs = 2;
    } else if direction.z.abs() >= direction.x.abs() && direction.z.abs() >= direction.y.abs() {
        cs = 3;
    }

    let mut x: Float;
    let mut y: Float;
    let mut z: Float;
    let mut found: bool = true;

    if cs == 1 {
        let aml: Float = direction.y / direction.x;
        let anl: Float = direction.z / direction.x;
        y = position.y - aml * position.x;
        z = position.z - anl * position.x;
        let d_sign: Float = sign(direction.x) * q.icurv as Float;

        let a: Float = q.a11
            + 2.0 * q.a12 * aml
            + q.a22 * aml * aml
            + 2.0 * q.a13 * anl
            + 2.0 * q.a23 * aml * anl
            + q.a33 * anl * anl;
        let b: Float = q.a14
            + q.a24 * aml
            + q.a34 * anl
            + (q.a12 + q.a22 * aml + q.a23 * anl) * y
            + (q.a13 + q.a23 * aml + q.a33 * anl) * z;
        let c: Float = q.a44
            + q.a22 * y * y
            + 2.0 * q.a34 * z
            + q.a33 * z * z
            + 2.0 * y * (q.a24 + q.a23 * z);

        let bbac: Float = b * b - a * c;
        if bbac < 0.0 {
            found = false;
            x = 0.0;
        } else if a.abs() > c.abs() * 1e-10 {
            x = (-b + d_sign * bbac.sqrt()) / a;
        } else {
            x = (-c / 2.0) / b;
        }
        y += aml * x;
        z += anl * x;
    } else if cs == 2 {
        let alm: Float = direction.x / direction.y;
        let anm: Float = direction.z / direction.y;
        x = position.x - alm * position.y;
        z = position.z - anm * position.y;
        let d_sign: Float = sign(direction.y) * q.icurv as Float;

        let a: Float = q.a22
            + 2.0 * q.a12 * alm
            + q.a11 * alm * alm
            + 2.0 * q.a23 * anm
            + 2.0 * q.a13 * alm * anm
            + q.a33 * anm * anm;
        let b: Float = q.a24
            + q.a14 * alm
            + q.a34 * anm
            + (q.a12 + q.a11 * alm + q.a13 * anm) * x
            + (q.a23 + q.a13 * alm + q.a33 * anm) * z;
        let c: Float = q.a44
            + q.a11 * x * x
            + 2.0 * q.a34 * z
            + q.a33 * z * z
            + 2.0 * x * (q.a14 + q.a13 * z);

        let bbac: Float = b * b - a * c;
        if bbac < 0.0 {
            found = false;
            y = 0.0;
        } else if a.abs() > c.abs() * 1e-10 {
            y = (-b + d_sign * bbac.sqrt()) / a;
        } else {
            y = (-c / 2.0) / b;
        }
        x += alm * y;
        z += anm * y;
    } else {
        let aln: Float = direction.x / direction.z;
        let amn: Float = direction.y / direction.z;
        x = position.x - aln * position.z;
        y = position.y - amn * position.z;
        let d_sign: Float = sign(direction.z) * q.icurv as Float;

        let a: Float = q.a33
            + 2.0 * q.a13 * aln
            + q.a11 * aln * aln
            + 2.0 * q.a23 * amn
            + 2.0 * q.a12 * aln * amn
            + q.a22 * amn * amn;
        let b: Float = q.a34
            + q.a14 * aln
            + q.a24 * amn
            + (q.a13 + q.a11 * aln + q.a12 * amn) * x
            + (q.a23 + q.a12 * aln + q.a22 * amn) * y;
        let c: Float = q.a44
            + q.a11 * x * x
            + 2.0 * q.a24 * y
            + q.a22 * y * y
            + 2.0 * x * (q.a14 + q.a12 * y);

        let bbac: Float = b * b - a * c;
        if bbac < 0.0 {
            found = false;
            z = 0.0;
        } else if a.abs() > c.abs() * 1e-10 {
            z = (-b + d_sign * bbac.sqrt()) / a;
        } else {
            z = (-c / 2.0) / b;
        }
        x += aln * z;
        y += amn * z;
    }

    // a hitpoint behind the ray origin along any axis is not a hit
    if (x - position.x) / direction.x < 0.0
        || (y - position.y) / direction.y < 0.0
        || (z - position.z) / direction.z < 0.0
    {
        found = false;
    }

    if !found {
        return None;
    }

    // the normal is the gradient of the quadric form at the hitpoint
    let fx: Float = 2.0 * q.a14 + 2.0 * q.a11 * x + 2.0 * q.a12 * y + 2.0 * q.a13 * z;
    let fy: Float = 2.0 * q.a24 + 2.0 * q.a12 * x + 2.0 * q.a22 * y + 2.0 * q.a23 * z;
    let fz: Float = 2.0 * q.a34 + 2.0 * q.a13 * x + 2.0 * q.a23 * y + 2.0 * q.a33 * z;

    Some(Collision {
        hitpoint: Vector3::new(x, y, z),
        normal: Vector3::new(fx, fy, fz).normalize(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_hit_at_origin() {
        // the sphere touches the origin, shoot straight down onto it
        let q = QuadricSurface::sphere(10.0);
        let col = intersect(&q, &Vector3::new(0.0, 5.0, 0.0), &Vector3::new(0.0, -1.0, 0.0));
        let col = col.unwrap();
        assert_relative_eq!(col.hitpoint.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(col.hitpoint.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(col.hitpoint.z, 0.0, epsilon = 1e-12);
        // gradient at the origin points along -y
        assert_relative_eq!(col.normal.y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sphere_oblique_hit_lies_on_sphere() {
        let r: Float = 7.0;
        let q = QuadricSurface::sphere(r);
        let col = intersect(
            &q,
            &Vector3::new(0.5, 3.0, -0.25),
            &Vector3::new(0.05, -1.0, 0.02).normalize(),
        )
        .unwrap();
        let center = Vector3::new(0.0, r, 0.0);
        assert_relative_eq!((col.hitpoint - center).length(), r, epsilon = 1e-9);
    }

    #[test]
    fn test_miss_reports_none() {
        let q = QuadricSurface::sphere(1.0);
        // ray passes far away from the sphere
        assert!(intersect(
            &q,
            &Vector3::new(100.0, 5.0, 0.0),
            &Vector3::new(0.0, -1.0, 0.0)
        )
        .is_none());
    }

    #[test]
    fn test_hit_behind_origin_is_a_miss() {
        let q = QuadricSurface::sphere(1.0);
        // moving away from the sphere
        assert!(intersect(
            &q,
            &Vector3::new(0.0, 5.0, 0.0),
            &Vector3::new(0.0, 1.0, 0.0)
        )
        .is_none());
    }
}
