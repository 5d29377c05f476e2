//! What happens to a ray when it hits an element. Each behaviour gets
//! the ray in element coordinates, already moved to the hitpoint with
//! its path length advanced and `event_type` set to `HitElement`, plus
//! the collision normal. It returns the mutated ray; terminating
//! behaviours switch the event type to a non-active value.

pub mod crystal;
pub mod foil;
pub mod grating;
pub mod image_plane;
pub mod mirror;
pub mod refrac;
pub mod rzp;
pub mod slit;

pub use crystal::{BraggFailurePolicy, CrystalBehaviour};
pub use rzp::{RzpBehaviour, RzpImageType, RzpType};

// rayx
use crate::core::rayx::Float;
use crate::elements::{Cutout, OpticalElement};
use crate::ray::Ray;
use crate::surfaces::Collision;

/// Read-only state every behaviour may consult.
pub struct BehaveContext<'a> {
    pub material_indices: &'a [i32],
    pub material_table: &'a [Float],
    pub bragg_failure: BraggFailurePolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Behaviour {
    Mirror,
    Grating {
        /// polynomial coefficients of the variable line spacing
        vls: [Float; 6],
        /// lines per mm
        line_density: Float,
        /// the diffraction order, usually 1
        order_of_diffraction: Float,
    },
    Slit {
        /// the cutout of the small opening in the slit
        opening_cutout: Cutout,
        /// the cutout of the beamstop inside the opening
        beamstop_cutout: Cutout,
    },
    Rzp(RzpBehaviour),
    ImagePlane,
    Crystal(CrystalBehaviour),
    Foil {
        /// substrate thickness in nm
        thickness_substrate: Float,
        /// RMS roughness of the substrate in nm
        roughness_substrate: Float,
    },
}

/// Dispatches on the element's behaviour type.
pub fn behave(
    ray: Ray,
    element: &OpticalElement,
    col: &Collision,
    ctx: &BehaveContext,
) -> Ray {
    match &element.behaviour {
        Behaviour::Mirror => mirror::behave_mirror(ray, element, col, ctx),
        Behaviour::Grating {
            vls,
            line_density,
            order_of_diffraction,
        } => grating::behave_grating(ray, col, vls, *line_density, *order_of_diffraction),
        Behaviour::Slit {
            opening_cutout,
            beamstop_cutout,
        } => slit::behave_slit(ray, opening_cutout, beamstop_cutout),
        Behaviour::Rzp(b) => rzp::behave_rzp(ray, col, b),
        Behaviour::ImagePlane => image_plane::behave_image_plane(ray),
        Behaviour::Crystal(b) => crystal::behave_crystal(ray, col, b, ctx),
        Behaviour::Foil {
            thickness_substrate,
            roughness_substrate: _,
        } => foil::behave_foil(ray, element, col, ctx, *thickness_substrate),
    }
}
