// rayx
use crate::core::efield::Stokes;
use crate::core::geometry::{direction_from_angles, Vector3};
use crate::core::rayx::Float;
use crate::core::rng::Rng;
use crate::core::transform::Matrix3;
use crate::ray::Ray;
use crate::sources::{assemble_ray, EnergyDistribution};

/// A deterministic source: rays sit on an even four dimensional grid
/// over transverse position and divergence angles, so downstream
/// distributions can be inspected without Monte Carlo noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixSource {
    pub num_rays: usize,
    pub position: Vector3,
    pub orientation: Matrix3,

    pub source_width: Float,
    pub source_height: Float,
    pub source_depth: Float,

    pub hor_divergence: Float,
    pub ver_divergence: Float,

    pub energy_distribution: EnergyDistribution,
    pub polarization: Stokes,
}

/// evenly places `index` of `count` samples over [-extent/2, extent/2]
fn grid_coordinate(index: usize, count: usize, extent: Float) -> Float {
    if count <= 1 {
        return 0.0;
    }
    -extent / 2.0 + extent * index as Float / (count - 1) as Float
}

impl MatrixSource {
    /// the grid has the same number of steps along every axis; the
    /// trailing rays of a non-power count wrap around to the start of
    /// the grid
    fn side_length(&self) -> usize {
        let mut side: usize = 1;
        while side * side * side * side < self.num_rays {
            side += 1;
        }
        side
    }

    pub fn gen_ray(&self, ray_index: usize, path_id: i32, source_id: i32, mut rng: Rng) -> Ray {
        let side = self.side_length();
        let i_x = ray_index % side;
        let i_y = (ray_index / side) % side;
        let i_phi = (ray_index / (side * side)) % side;
        let i_psi = (ray_index / (side * side * side)) % side;

        let x: Float = grid_coordinate(i_x, side, self.source_width);
        let y: Float = grid_coordinate(i_y, side, self.source_height);
        let phi: Float = grid_coordinate(i_phi, side, self.hor_divergence);
        let psi: Float = grid_coordinate(i_psi, side, self.ver_divergence);

        let energy: Float = self.energy_distribution.select_energy(&mut rng);

        assemble_ray(
            self.position,
            &self.orientation,
            // the grid axes span the transverse plane of the source
            Vector3::new(x, y, 0.0),
            direction_from_angles(phi, psi),
            energy,
            &self.polarization,
            rng,
            path_id,
            source_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_source(n: usize) -> MatrixSource {
        MatrixSource {
            num_rays: n,
            position: Vector3::default(),
            orientation: Matrix3::identity(),
            source_width: 1.0,
            source_height: 1.0,
            source_depth: 0.0,
            hor_divergence: 0.0,
            ver_divergence: 0.0,
            energy_distribution: EnergyDistribution::SoftEdge {
                center: 124.0,
                sigma: 0.0,
            },
            polarization: Stokes::new(1.0, 1.0, 0.0, 0.0),
        }
    }

    #[test]
    fn test_grid_is_deterministic() {
        let src = grid_source(16);
        let a = src.gen_ray(3, 3, 0, Rng::new(3, 16, 7));
        let b = src.gen_ray(3, 3, 0, Rng::new(3, 16, 7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_grid_covers_extent() {
        let src = grid_source(16); // side = 2
        let mut xs: Vec<Float> = (0..16usize)
            .map(|i| src.gen_ray(i, i as i32, 0, Rng::new(i as u64, 16, 7)).position.x)
            .collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(xs.first().copied().unwrap(), -0.5);
        assert_eq!(xs.last().copied().unwrap(), 0.5);
    }

    #[test]
    fn test_single_ray_sits_in_the_center() {
        let src = grid_source(1);
        let ray = src.gen_ray(0, 0, 0, Rng::new(0, 1, 7));
        assert_eq!(ray.position, Vector3::default());
        assert!((ray.direction.z - 1.0).abs() < 1e-12);
    }
}
