// rayx
use crate::ray::Ray;

/// An image plane only records where rays arrive; it neither bends the
/// ray nor touches the field.
pub fn behave_image_plane(ray: Ray) -> Ray {
    ray
}
