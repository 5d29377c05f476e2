// rayx
use crate::core::efield::Stokes;
use crate::core::geometry::{direction_from_angles, Vector3};
use crate::core::rayx::{energy_to_wave_length, Float, PI};
use crate::core::rng::Rng;
use crate::core::transform::Matrix3;
use crate::ray::Ray;
use crate::sources::{assemble_ray, EnergyDistribution};

/// A simple undulator model: Gaussian source size and divergence,
/// convolved from the electron beam moments and the diffraction limit
/// of the undulator length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleUndulatorSource {
    pub num_rays: usize,
    pub position: Vector3,
    pub orientation: Matrix3,

    /// undulator length in m
    pub undulator_length: Float,
    /// RMS electron beam size in mm
    pub sigma_x: Float,
    pub sigma_y: Float,
    /// RMS electron beam divergence in rad
    pub sigma_xp: Float,
    pub sigma_yp: Float,
    pub source_depth: Float,

    pub energy_distribution: EnergyDistribution,
    pub polarization: Stokes,
}

impl SimpleUndulatorSource {
    /// diffraction limited photon beam size in mm for `energy` in eV
    pub fn diffraction_sigma(&self, energy: Float) -> Float {
        // sigma_r = sqrt(2 lambda L) / (4 pi), lambda in m, L in m
        let lambda_m: Float = energy_to_wave_length(energy) * 1e-9;
        (2.0 * lambda_m * self.undulator_length).sqrt() / (4.0 * PI) * 1e3
    }

    /// diffraction limited divergence in rad
    pub fn diffraction_sigma_prime(&self, energy: Float) -> Float {
        let lambda_m: Float = energy_to_wave_length(energy) * 1e-9;
        (lambda_m / (2.0 * self.undulator_length)).sqrt()
    }

    pub fn gen_ray(&self, path_id: i32, source_id: i32, mut rng: Rng) -> Ray {
        let energy: Float = self.energy_distribution.select_energy(&mut rng);

        let sigma_r: Float = self.diffraction_sigma(energy);
        let sigma_rp: Float = self.diffraction_sigma_prime(energy);

        // photon beam = electron beam (+) diffraction, in quadrature
        let sx: Float = (self.sigma_x * self.sigma_x + sigma_r * sigma_r).sqrt();
        let sy: Float = (self.sigma_y * self.sigma_y + sigma_r * sigma_r).sqrt();
        let sxp: Float = (self.sigma_xp * self.sigma_xp + sigma_rp * sigma_rp).sqrt();
        let syp: Float = (self.sigma_yp * self.sigma_yp + sigma_rp * sigma_rp).sqrt();

        let x: Float = rng.normal(0.0, sx);
        let y: Float = rng.normal(0.0, sy);
        let z: Float = (rng.uniform() - 0.5) * self.source_depth;

        let phi: Float = rng.normal(0.0, sxp);
        let psi: Float = rng.normal(0.0, syp);

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convolved_sigma_dominates_components() {
        let src = SimpleUndulatorSource {
            num_rays: 10,
            position: Vector3::default(),
            orientation: Matrix3::identity(),
            undulator_length: 4.0,
            sigma_x: 0.1,
            sigma_y: 0.01,
            sigma_xp: 1e-5,
            sigma_yp: 1e-5,
            source_depth: 0.0,
            energy_distribution: EnergyDistribution::SoftEdge {
                center: 100.0,
                sigma: 0.0,
            },
            polarization: Stokes::new(1.0, 1.0, 0.0, 0.0),
        };
        let sr = src.diffraction_sigma(100.0);
        let srp = src.diffraction_sigma_prime(100.0);
        assert!(sr > 0.0 && srp > 0.0);

        // the convolution can only widen the beam
        let mut max_x: Float = 0.0;
        for i in 0..200u64 {
            let ray = src.gen_ray(i as i32, 0, Rng::new(i, 200, 4));
            max_x = max_x.max(ray.position.x.abs());
        }
        assert!(max_x > src.sigma_x);
    }
}
