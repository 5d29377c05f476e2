//! Light sources. Every source can produce its rays one at a time,
//! addressed by the ray's global path index, so ray generation is as
//! data-parallel as the tracing itself.

pub mod circle;
pub mod dipole;
pub mod matrix;
pub mod pixel;
pub mod point;
pub mod undulator;

pub use circle::CircleSource;
pub use dipole::DipoleSource;
pub use matrix::MatrixSource;
pub use pixel::PixelSource;
pub use point::PointSource;
pub use undulator::SimpleUndulatorSource;

// rayx
use crate::core::efield::{rotation_matrix, stokes_to_field, ElectricField, Stokes};
use crate::core::geometry::Vector3;
use crate::core::rayx::Float;
use crate::core::rng::Rng;
use crate::core::transform::Matrix3;
use crate::ray::Ray;

/// How a single source axis (a size or a divergence) is distributed.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum SourceDist {
    /// uniform over the full extent
    HardEdge,
    /// Gaussian with the extent as standard deviation
    SoftEdge,
}

/// draws one sample from a source axis distribution
pub fn distribute(dist: SourceDist, extent: Float, rng: &mut Rng) -> Float {
    if extent == 0.0 {
        return 0.0;
    }
    match dist {
        SourceDist::HardEdge => (rng.uniform() - 0.5) * extent,
        SourceDist::SoftEdge => rng.normal(0.0, extent),
    }
}

/// How photon energies are drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnergyDistribution {
    /// uniform within center +- spread / 2
    HardEdge { center: Float, spread: Float },
    /// Gaussian around the center
    SoftEdge { center: Float, sigma: Float },
    /// discrete lines spread evenly across the band
    SeparateEnergies {
        center: Float,
        spread: Float,
        number_of_energies: u32,
    },
    /// a tabulated spectrum, e.g. loaded from a measurement file
    List {
        energies: Vec<Float>,
        /// prefix sums of the line weights
        prefix_weights: Vec<Float>,
        weight_sum: Float,
        /// interpolate within the chosen bin instead of emitting the
        /// bin energy itself
        continuous: bool,
    },
}

impl EnergyDistribution {
    pub fn list_from_lines(lines: &[(Float, Float)], continuous: bool) -> Self {
        assert!(!lines.is_empty());
        let mut prefix_weights: Vec<Float> = Vec::with_capacity(lines.len());
        let mut sum: Float = 0.0;
        for (_, weight) in lines {
            prefix_weights.push(sum);
            sum += weight;
        }
        EnergyDistribution::List {
            energies: lines.iter().map(|(e, _)| *e).collect(),
            prefix_weights,
            weight_sum: sum,
            continuous,
        }
    }

    pub fn select_energy(&self, rng: &mut Rng) -> Float {
        match self {
            EnergyDistribution::HardEdge { center, spread } => {
                center + (rng.uniform() - 0.5) * spread
            }
            EnergyDistribution::SoftEdge { center, sigma } => {
                if *sigma == 0.0 {
                    *center
                } else {
                    rng.normal(*center, *sigma)
                }
            }
            EnergyDistribution::SeparateEnergies {
                center,
                spread,
                number_of_energies,
            } => {
                let n = (*number_of_energies).max(1);
                let index = (rng.uniform() * n as Float) as u32;
                let index = index.min(n - 1);
                if n == 1 {
                    *center
                } else {
                    center - spread / 2.0
                        + spread * index as Float / (n - 1) as Float
                }
            }
            EnergyDistribution::List {
                energies,
                prefix_weights,
                weight_sum,
                continuous,
            } => {
                let target: Float = rng.uniform() * weight_sum;
                // last bin whose prefix weight does not exceed the target
                let mut low: usize = 0;
                let mut high: usize = energies.len() - 1;
                while high - low > 1 {
                    let center = (low + high) / 2;
                    if target < prefix_weights[center] {
                        high = center;
                    } else {
                        low = center;
                    }
                }
                let index = if target < prefix_weights[high] { low } else { high };
                if *continuous && index + 1 < energies.len() {
                    let t: Float = rng.uniform();
                    energies[index] * (1.0 - t) + energies[index + 1] * t
                } else {
                    energies[index]
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Source {
    Point(PointSource),
    Matrix(MatrixSource),
    Dipole(DipoleSource),
    Pixel(PixelSource),
    Circle(CircleSource),
    Undulator(SimpleUndulatorSource),
}

impl Source {
    pub fn num_rays(&self) -> usize {
        match self {
            Source::Point(s) => s.num_rays,
            Source::Matrix(s) => s.num_rays,
            Source::Dipole(s) => s.num_rays,
            Source::Pixel(s) => s.num_rays,
            Source::Circle(s) => s.num_rays,
            Source::Undulator(s) => s.num_rays,
        }
    }

    /// Emits the ray with the given global path index. `ray_index` is
    /// the index local to this source, i.e. already reduced by the
    /// rays of all preceding sources.
    pub fn gen_ray(&self, ray_index: usize, path_id: i32, source_id: i32, rng: Rng) -> Ray {
        match self {
            Source::Point(s) => s.gen_ray(path_id, source_id, rng),
            Source::Matrix(s) => s.gen_ray(ray_index, path_id, source_id, rng),
            Source::Dipole(s) => s.gen_ray(path_id, source_id, rng),
            Source::Pixel(s) => s.gen_ray(path_id, source_id, rng),
            Source::Circle(s) => s.gen_ray(path_id, source_id, rng),
            Source::Undulator(s) => s.gen_ray(path_id, source_id, rng),
        }
    }
}

/// Shared tail of every `gen_ray`: map the source-local offsets into
/// the world frame and seed the field from the polarisation.
#[allow(clippy::too_many_arguments)]
pub(crate) fn assemble_ray(
    position: Vector3,
    orientation: &Matrix3,
    local_offset: Vector3,
    local_direction: Vector3,
    energy: Float,
    polarization: &Stokes,
    rng: Rng,
    path_id: i32,
    source_id: i32,
) -> Ray {
    let world_position: Vector3 = position + orientation.mul_vec(&local_offset);
    let world_direction: Vector3 = orientation.mul_vec(&local_direction).normalize();

    let field: ElectricField =
        stokes_to_field(polarization).rotate(&rotation_matrix(world_direction));

    Ray::emitted(
        world_position,
        world_direction,
        energy,
        field,
        rng,
        path_id,
        source_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_edge_energy_range() {
        let dist = EnergyDistribution::HardEdge {
            center: 100.0,
            spread: 10.0,
        };
        let mut rng = Rng::from_counter(3);
        for _ in 0..100 {
            let e = dist.select_energy(&mut rng);
            assert!((95.0..105.0).contains(&e));
        }
    }

    #[test]
    fn test_zero_sigma_soft_edge_is_monochromatic() {
        let dist = EnergyDistribution::SoftEdge {
            center: 640.0,
            sigma: 0.0,
        };
        let mut rng = Rng::from_counter(3);
        assert_eq!(dist.select_energy(&mut rng), 640.0);
    }

    #[test]
    fn test_separate_energies_hits_lines_only() {
        let dist = EnergyDistribution::SeparateEnergies {
            center: 100.0,
            spread: 20.0,
            number_of_energies: 3,
        };
        let mut rng = Rng::from_counter(3);
        for _ in 0..100 {
            let e = dist.select_energy(&mut rng);
            assert!(
                (e - 90.0).abs() < 1e-9 || (e - 100.0).abs() < 1e-9 || (e - 110.0).abs() < 1e-9
            );
        }
    }

    #[test]
    fn test_list_respects_weights() {
        let dist = EnergyDistribution::list_from_lines(&[(10.0, 0.0), (20.0, 1.0)], false);
        let mut rng = Rng::from_counter(3);
        for _ in 0..50 {
            assert_eq!(dist.select_energy(&mut rng), 20.0);
        }
    }
}
