//! A beamline is an ordered chain of light sources followed by an
//! ordered chain of optical elements, plus the material tables the
//! elements refer to.

// rayx
use crate::core::material::MaterialTables;
use crate::elements::OpticalElement;
use crate::sources::Source;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beamline {
    pub sources: Vec<Source>,
    pub elements: Vec<OpticalElement>,
    pub material_tables: MaterialTables,
}

impl Beamline {
    pub fn num_rays_total(&self) -> usize {
        self.sources.iter().map(|s| s.num_rays()).sum()
    }

    /// Object ids address sources first, then elements.
    pub fn num_objects(&self) -> usize {
        self.sources.len() + self.elements.len()
    }

    /// The object id of element `element_index`.
    pub fn element_object_id(&self, element_index: usize) -> i32 {
        (self.sources.len() + element_index) as i32
    }
}
