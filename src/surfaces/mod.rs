//! Surface shapes in element coordinates. A surface is a potentially
//! infinite curved sheet; the finite extent of the real optical element
//! comes from pairing it with a cutout.

pub mod cubic;
pub mod plane;
pub mod quadric;
pub mod toroid;

pub use cubic::CubicSurface;
pub use quadric::QuadricSurface;
pub use toroid::{ToroidSurface, ToroidType};

// rayx
use crate::core::geometry::Vector3;

/// A ray-surface intersection in element coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Collision {
    /// The point where the ray meets the surface.
    pub hitpoint: Vector3,
    /// The surface normal at the hitpoint.
    pub normal: Vector3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Surface {
    /// The XZ plane, y = 0.
    Plane,
    Quadric(QuadricSurface),
    Toroid(ToroidSurface),
    Cubic(CubicSurface),
}

impl Surface {
    /// Intersect a ray, given in element coordinates, with this
    /// surface. Misses (including numerically failed searches) return
    /// `None`. The returned normal is not yet oriented towards the
    /// incoming ray.
    pub fn intersect(&self, position: &Vector3, direction: &Vector3) -> Option<Collision> {
        match self {
            Surface::Plane => plane::intersect(position, direction),
            Surface::Quadric(q) => quadric::intersect(q, position, direction),
            Surface::Toroid(t) => toroid::intersect(t, position, direction),
            Surface::Cubic(c) => cubic::intersect(c, position, direction),
        }
    }
}
