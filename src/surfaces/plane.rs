// rayx
use crate::core::geometry::{sign, Vector3};
use crate::core::rayx::Float;
use crate::surfaces::Collision;

/// Intersect with the XZ plane. The ray parameter is the `time` it
/// takes to reach y = 0 when the direction is read as a velocity; a
/// negative time means the ray moves away from the plane.
pub fn intersect(position: &Vector3, direction: &Vector3) -> Option<Collision> {
    let time: Float = -position.y / direction.y;
    if !(time >= 0.0) {
        return None;
    }

    Some(Collision {
        hitpoint: Vector3 {
            x: position.x + direction.x * time,
            y: 0.0,
            z: position.z + direction.z * time,
        },
        normal: Vector3::new(0.0, -sign(direction.y), 0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_from_above() {
        let col = intersect(&Vector3::new(1.0, 5.0, 2.0), &Vector3::new(0.0, -1.0, 0.0)).unwrap();
        assert_eq!(col.hitpoint, Vector3::new(1.0, 0.0, 2.0));
        assert_eq!(col.normal, Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_miss_moving_away() {
        assert!(intersect(&Vector3::new(0.0, 1.0, 0.0), &Vector3::new(0.0, 1.0, 0.0)).is_none());
    }

    #[test]
    fn test_oblique_hit() {
        let col = intersect(
            &Vector3::new(0.0, 2.0, 0.0),
            &Vector3::new(0.0, -1.0, 1.0).normalize(),
        )
        .unwrap();
        assert!((col.hitpoint.z - 2.0).abs() < 1e-12);
        // normal faces against the falling ray
        assert_eq!(col.normal.y, 1.0);
    }

    #[test]
    fn test_parallel_ray_does_not_hit() {
        // direction.y == 0 gives a non-finite time, which must not
        // count as a hit
        assert!(intersect(&Vector3::new(0.0, 1.0, 0.0), &Vector3::new(0.0, 0.0, 1.0)).is_none());
    }
}
