//! Finding the next element a ray hits. Surfaces are intersected in
//! element coordinates; the winner over a whole beamline is the
//! element with the smallest positive distance in world coordinates.

// rayx
use crate::core::geometry::{vec3_dot_vec3, Vector3};
use crate::core::rayx::{Float, COLLISION_EPSILON};
use crate::core::rng::Rng;
use crate::elements::cutout::{in_cutout, Cutout};
use crate::elements::slope_error::{apply_slope_error, SlopeErrorType};
use crate::elements::OpticalElement;
use crate::ray::Ray;
use crate::surfaces::{Collision, Surface};

/// Intersects the ray with a surface bounded by a cutout, both in
/// element coordinates. The returned normal always faces the incoming
/// ray.
pub fn find_collision_in_element_coords(
    position: &Vector3,
    direction: &Vector3,
    surface: &Surface,
    cutout: &Cutout,
) -> Option<Collision> {
    let mut col = surface.intersect(position, direction)?;

    // the cutout is applied in the XZ plane
    if !in_cutout(cutout, col.hitpoint.x, col.hitpoint.z) {
        return None;
    }

    // the collision normal should point out of the surface, i.e. in
    // the direction the ray came from
    if vec3_dot_vec3(direction, &col.normal) > 0.0 {
        col.normal = col.normal * -1.0;
    }
    Some(col)
}

/// Checks whether the ray collides with the given element, including
/// the element's slope error on the returned normal.
pub fn find_collision_with(
    ray: &Ray,
    element: &OpticalElement,
    rng: &mut Rng,
) -> Option<Collision> {
    let position = element.in_trans.transform_point(&ray.position);
    let direction = element.in_trans.transform_vector(&ray.direction);

    let mut col =
        find_collision_in_element_coords(&position, &direction, &element.surface, &element.cutout)?;

    col.normal = apply_slope_error(
        col.normal,
        &element.slope_error,
        SlopeErrorType::Cartesian,
        rng,
    );
    Some(col)
}

/// Returns the next collision for a ray in non-sequential mode, as the
/// element index together with the collision. The ray is nudged
/// forward slightly so it cannot re-hit the surface it just left.
pub fn find_collision(
    ray: &Ray,
    elements: &[OpticalElement],
    rng: &mut Rng,
) -> Option<(usize, Collision)> {
    let mut nudged = *ray;
    nudged.position = ray.position + ray.direction * COLLISION_EPSILON;

    let mut best: Option<(usize, Collision)> = None;
    let mut best_dist: Float = Float::INFINITY;

    for (element_index, element) in elements.iter().enumerate() {
        let current = match find_collision_with(&nudged, element, rng) {
            Some(col) => col,
            None => continue,
        };

        let global_hitpoint: Vector3 = element.out_trans.transform_point(&current.hitpoint);
        let current_dist: Float = (global_hitpoint - ray.position).length();

        // ties go to the earlier element
        if current_dist < best_dist {
            best = Some((element_index, current));
            best_dist = current_dist;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviours::Behaviour;
    use crate::core::efield::ElectricField;
    use crate::core::material::MATERIAL_REFLECTIVE;
    use crate::core::transform::{DesignPlane, Matrix3};
    use crate::elements::SlopeError;
    use approx::assert_relative_eq;

    fn plane_mirror_at(y: Float) -> OpticalElement {
        OpticalElement::new(
            Vector3::new(0.0, y, 0.0),
            Matrix3::identity(),
            Surface::Plane,
            Cutout::Rect {
                width: 50.0,
                length: 50.0,
            },
            Behaviour::Mirror,
            SlopeError::default(),
            0.0,
            MATERIAL_REFLECTIVE,
            DesignPlane::Xz,
        )
    }

    fn downward_ray(y: Float) -> Ray {
        Ray::emitted(
            Vector3::new(0.0, y, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
            100.0,
            ElectricField::default(),
            Rng::from_counter(0),
            0,
            0,
        )
    }

    #[test]
    fn test_normal_faces_incoming_ray() {
        let col = find_collision_in_element_coords(
            &Vector3::new(0.0, 5.0, 0.0),
            &Vector3::new(0.0, -1.0, 0.0),
            &Surface::Plane,
            &Cutout::Unlimited,
        )
        .unwrap();
        assert!(vec3_dot_vec3(&Vector3::new(0.0, -1.0, 0.0), &col.normal) < 0.0);
    }

    #[test]
    fn test_cutout_rejects_hit() {
        let col = find_collision_in_element_coords(
            &Vector3::new(10.0, 5.0, 0.0),
            &Vector3::new(0.0, -1.0, 0.0),
            &Surface::Plane,
            &Cutout::Rect {
                width: 1.0,
                length: 1.0,
            },
        );
        assert!(col.is_none());
    }

    #[test]
    fn test_nearest_element_wins() {
        let near = plane_mirror_at(-10.0);
        let far = plane_mirror_at(-20.0);
        let elements = vec![far, near];

        let ray = downward_ray(0.0);
        let mut rng = Rng::from_counter(0);
        let (index, col) = find_collision(&ray, &elements, &mut rng).unwrap();
        assert_eq!(index, 1);
        assert_relative_eq!(col.hitpoint.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_epsilon_nudge_skips_current_surface() {
        let mirror = plane_mirror_at(0.0);
        let elements = vec![mirror];

        // a ray sitting exactly on the mirror and moving away must not
        // see it again
        let mut ray = downward_ray(0.0);
        ray.direction = Vector3::new(0.0, 1.0, 0.0);
        let mut rng = Rng::from_counter(0);
        assert!(find_collision(&ray, &elements, &mut rng).is_none());
    }

    #[test]
    fn test_miss_when_no_element_ahead() {
        let mirror = plane_mirror_at(-10.0);
        let elements = vec![mirror];
        let mut ray = downward_ray(0.0);
        ray.direction = Vector3::new(0.0, 1.0, 0.0);
        let mut rng = Rng::from_counter(0);
        assert!(find_collision(&ray, &elements, &mut rng).is_none());
    }
}
