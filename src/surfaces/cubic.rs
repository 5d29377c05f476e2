// rayx
use crate::core::geometry::Vector3;
use crate::core::rayx::Float;
use crate::surfaces::quadric::{self, QuadricSurface};
use crate::surfaces::Collision;

/// A quadric with third-order correction coefficients, as used by RZP
/// substrates. The correction is folded into a rotation of the frame by
/// `psi` in the YZ plane; the collision itself then runs on the plain
/// quadric part.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubicSurface {
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

    pub b12: Float,
    pub b13: Float,
    pub b21: Float,
    pub b23: Float,
    pub b31: Float,
    pub b32: Float,

    pub psi: Float,
}

// rotates position or direction for the cubic collision by angle alpha
fn rotate_yz(v: &Vector3, alpha: Float) -> Vector3 {
    let y: Float = v.y * alpha.cos() - v.z * alpha.sin();
    let z: Float = v.z * alpha.cos() + v.y * alpha.sin();
    Vector3::new(v.x, y, z)
}

pub fn intersect(c: &CubicSurface, position: &Vector3, direction: &Vector3) -> Option<Collision> {
    let q = QuadricSurface {
        icurv: c.icurv,
        a11: c.a11,
        a12: c.a12,
        a13: c.a13,
        a14: c.a14,
        a22: c.a22,
        a23: c.a23,
        a24: c.a24,
        a33: c.a33,
        a34: c.a34,
        a44: c.a44,
    };

    let rotated_position: Vector3 = rotate_yz(position, c.psi);
    let rotated_direction: Vector3 = rotate_yz(direction, c.psi);

    let col = quadric::intersect(&q, &rotated_position, &rotated_direction)?;

    // carry hitpoint and normal back into the unrotated element frame
    Some(Collision {
        hitpoint: rotate_yz(&col.hitpoint, -c.psi),
        normal: rotate_yz(&col.normal, -c.psi),
    })
}
