// rayx
use crate::core::efield::Stokes;
use crate::core::geometry::{direction_from_angles, Vector3};
use crate::core::rayx::Float;
use crate::core::rng::Rng;
use crate::core::transform::Matrix3;
use crate::ray::Ray;
use crate::sources::{assemble_ray, distribute, EnergyDistribution, SourceDist};

/// A point-like source with independently distributed size and
/// divergence per axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSource {
    pub num_rays: usize,
    pub position: Vector3,
    pub orientation: Matrix3,

    /// extent in x (mm); hard edge width or Gaussian sigma
    pub source_width: Float,
    /// extent in y (mm)
    pub source_height: Float,
    /// extent along the beam (mm), always uniform
    pub source_depth: Float,
    pub width_dist: SourceDist,
    pub height_dist: SourceDist,

    /// divergence extent in phi (rad)
    pub hor_divergence: Float,
    /// divergence extent in psi (rad)
    pub ver_divergence: Float,
    pub hor_dist: SourceDist,
    pub ver_dist: SourceDist,

    pub energy_distribution: EnergyDistribution,
    pub polarization: Stokes,
}

impl PointSource {
    pub fn gen_ray(&self, path_id: i32, source_id: i32, mut rng: Rng) -> Ray {
        let x: Float = distribute(self.width_dist, self.source_width, &mut rng);
        let y: Float = distribute(self.height_dist, self.source_height, &mut rng);
        let z: Float = distribute(SourceDist::HardEdge, self.source_depth, &mut rng);

        let phi: Float = distribute(self.hor_dist, self.hor_divergence, &mut rng);
        let psi: Float = distribute(self.ver_dist, self.ver_divergence, &mut rng);

        let energy: Float = self.energy_distribution.select_energy(&mut rng);

        assemble_ray(
            self.position,
            &self.orientation,
            Vector3::new(x, y, z),
            direction_from_angles(phi, psi),
            energy,
            &self.polarization,
            rng,
            path_id,
            source_id,
        )
    }
}
