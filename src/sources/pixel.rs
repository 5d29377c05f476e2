// rayx
use crate::core::efield::Stokes;
use crate::core::geometry::{direction_from_angles, Vector3};
use crate::core::rayx::Float;
use crate::core::rng::Rng;
use crate::core::transform::Matrix3;
use crate::ray::Ray;
use crate::sources::{assemble_ray, EnergyDistribution};

/// A pixelated source: the emitting area is divided into a grid of
/// equal cells, each ray picks a random cell and a uniform position
/// inside it. With one cell per axis this degenerates into a hard-edge
/// area source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelSource {
    pub num_rays: usize,
    pub position: Vector3,
    pub orientation: Matrix3,

    pub source_width: Float,
    pub source_height: Float,
    pub source_depth: Float,
    /// cell count along x and y
    pub pixels_x: u32,
    pub pixels_y: u32,

    /// full divergence in rad, uniform
    pub hor_divergence: Float,
    pub ver_divergence: Float,

    pub energy_distribution: EnergyDistribution,
    pub polarization: Stokes,
}

impl PixelSource {
    fn sample_axis(extent: Float, pixels: u32, rng: &mut Rng) -> Float {
        let pixels = pixels.max(1);
        let cell: Float = extent / pixels as Float;
        let index: u32 = ((rng.uniform() * pixels as Float) as u32).min(pixels - 1);
        let origin: Float = -extent / 2.0 + cell * index as Float;
        origin + rng.uniform() * cell
    }

    pub fn gen_ray(&self, path_id: i32, source_id: i32, mut rng: Rng) -> Ray {
        let x: Float = PixelSource::sample_axis(self.source_width, self.pixels_x, &mut rng);
        let y: Float = PixelSource::sample_axis(self.source_height, self.pixels_y, &mut rng);
        let z: Float = (rng.uniform() - 0.5) * self.source_depth;

        let phi: Float = (rng.uniform() - 0.5) * self.hor_divergence;
        let psi: Float = (rng.uniform() - 0.5) * self.ver_divergence;

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
