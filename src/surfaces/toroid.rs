// rayx
use crate::core::geometry::{sign, vec3_dot_vec3, Vector3};
use crate::core::rayx::Float;
use crate::surfaces::Collision;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum ToroidType {
    Convex,
    Concave,
}

/// A toroidal surface tangent to the origin, with the long radius
/// bending in the YZ plane and the short radius in the XY plane.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToroidSurface {
    pub long_radius: Float,
    pub short_radius: Float,
    pub toroid_type: ToroidType,
}

const NEWTON_TOLERANCE: Float = 1e-4;
const NEWTON_MAX_ITERATIONS: i32 = 50;

/// Walks a Newton iteration along z towards the surface. There is no
/// closed form for the quartic that stays stable at grazing incidence,
/// so the search runs on the implicit form directly; not converging
/// within the iteration budget counts as a miss.
pub fn intersect(
    toroid: &ToroidSurface,
    position: &Vector3,
    direction: &Vector3,
) -> Option<Collision> {
    let long_rad: Float = toroid.long_radius;
    let short_rad: Float = match toroid.toroid_type {
        ToroidType::Convex => -toroid.short_radius,
        ToroidType::Concave => toroid.short_radius,
    };

    // sign radius: +1 = concave, -1 = convex
    let isigro: Float = sign(short_rad);

    let normalized_dir: Vector3 = *direction / direction.z;

    let mut normal = Vector3::default();
    let mut xx: Float = 0.0;
    let mut yy: Float;
    let mut zz: Float = 0.0;
    let mut dz: Float = 0.0;

    let mut n: i32 = 0;
    loop {
        zz += dz;
        xx = position.x + normalized_dir.x * (zz - position.z);
        if xx * xx > short_rad * short_rad {
            xx = xx / xx.abs() * 0.95 * short_rad;
        }
        yy = position.y + normalized_dir.y * (zz - position.z);
        let sq: Float = (short_rad * short_rad - xx * xx).sqrt();
        let rx: Float = long_rad - short_rad + isigro * sq;

        normal.x = (-2.0 * xx * isigro / sq) * rx;
        normal.y = -2.0 * (yy - long_rad);
        normal.z = -2.0 * zz;

        let func: Float = -rx * rx + (yy - long_rad) * (yy - long_rad) + zz * zz;
        let df: Float = normalized_dir.x * normal.x + normalized_dir.y * normal.y + normal.z;
        dz = func / df;
        n += 1;
        if n >= NEWTON_MAX_ITERATIONS {
            return None;
        }
        if dz.abs() <= NEWTON_TOLERANCE {
            break;
        }
    }

    let hitpoint = Vector3::new(xx, yy, zz);

    // the iteration ignores the sign of the direction, so reject
    // hitpoints the ray is pointing away from
    let ray_to_hitpoint: Vector3 = hitpoint - position;
    if vec3_dot_vec3(&ray_to_hitpoint, direction) <= 0.0 {
        return None;
    }

    Some(Collision {
        hitpoint,
        normal: normal.normalize(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn toroid() -> ToroidSurface {
        ToroidSurface {
            long_radius: 1000.0,
            short_radius: 100.0,
            toroid_type: ToroidType::Concave,
        }
    }

    #[test]
    fn test_grazing_hit_lies_on_surface() {
        // shallow incidence close to the tangent point
        let pos = Vector3::new(0.0, 1.0, -50.0);
        let dir = Vector3::new(0.0, -0.02, 1.0).normalize();
        let col = intersect(&toroid(), &pos, &dir).unwrap();

        // the implicit toroid equation must vanish at the hitpoint
        let t = toroid();
        let sq = (t.short_radius * t.short_radius - col.hitpoint.x * col.hitpoint.x).sqrt();
        let rx = t.long_radius - t.short_radius + sq;
        let func = -rx * rx
            + (col.hitpoint.y - t.long_radius) * (col.hitpoint.y - t.long_radius)
            + col.hitpoint.z * col.hitpoint.z;
        assert!(func.abs() < 1.0);
        assert_relative_eq!(col.normal.length(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ray_pointing_away_misses() {
        let pos = Vector3::new(0.0, 1.0, -50.0);
        let dir = Vector3::new(0.0, 0.9, -1.0).normalize();
        assert!(intersect(&toroid(), &pos, &dir).is_none());
    }

    #[test]
    fn test_near_tangent_normal_points_up() {
        let pos = Vector3::new(0.0, 5.0, -5.0);
        let dir = Vector3::new(0.0, -1.0, 1.0).normalize();
        let col = intersect(&toroid(), &pos, &dir).unwrap();
        // close to the origin the concave toroid is nearly the XZ
        // plane with its normal along y
        assert!(col.normal.y.abs() > 0.99);
    }
}
