//! Bending magnet emission. Energies follow the Schwinger spectrum of
//! the dipole field, the vertical divergence follows the analytic
//! modified-Bessel distribution of synchrotron radiation.

// rayx
use crate::core::efield::Stokes;
use crate::core::geometry::{direction_from_angles, Vector3};
use crate::core::rayx::{Float, FACTOR_SCHWINGER_RAY};
use crate::core::rng::Rng;
use crate::core::sampling::bessel_k;
use crate::core::transform::Matrix3;
use crate::ray::Ray;
use crate::sources::{assemble_ray, distribute, SourceDist};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DipoleSource {
    pub num_rays: usize,
    pub position: Vector3,
    pub orientation: Matrix3,

    /// electron beam energy in GeV
    pub electron_energy: Float,
    /// bending radius in m
    pub bending_radius: Float,

    /// emitted band, eV
    pub energy_low: Float,
    pub energy_high: Float,

    /// horizontal fan opening in rad, sampled uniformly
    pub hor_divergence: Float,
    /// RMS vertical divergence of the electron beam in rad, convolved
    /// onto the photon distribution
    pub ver_ebeam_divergence: Float,

    pub source_width: Float,
    pub source_height: Float,
    pub width_dist: SourceDist,
    pub height_dist: SourceDist,

    pub polarization: Stokes,
}

impl DipoleSource {
    /// critical energy of the bend in eV
    pub fn critical_energy(&self) -> Float {
        // e_c[keV] = 2.2183 E[GeV]^3 / R[m]
        2.2183 * self.electron_energy.powi(3) / self.bending_radius * 1e3
    }

    /// On-axis Schwinger flux density at `energy`, in the reduced form
    /// used for rejection sampling. y is the photon energy in units of
    /// the critical energy.
    pub fn schwinger(&self, energy: Float) -> Float {
        let y: Float = energy / self.critical_energy();
        let k23: Float = bessel_k(2.0 / 3.0, y / 2.0);
        FACTOR_SCHWINGER_RAY * self.electron_energy * self.electron_energy * y * y * k23 * k23
    }

    /// The angular intensity of synchrotron radiation at the reduced
    /// vertical angle `gpsi = gamma * psi` for photon energy fraction
    /// `y = E / E_c`, Bessel form with both polarisation components.
    pub fn vertical_intensity(&self, y: Float, gpsi: Float) -> Float {
        let one_plus: Float = 1.0 + gpsi * gpsi;
        let xi: Float = 0.5 * y * one_plus.powf(1.5);
        let k23: Float = bessel_k(2.0 / 3.0, xi);
        let k13: Float = bessel_k(1.0 / 3.0, xi);
        one_plus * one_plus * (k23 * k23 + (gpsi * gpsi / one_plus) * k13 * k13)
    }

    /// Lorentz factor of the stored electrons.
    fn gamma(&self) -> Float {
        // m_e c^2 = 0.51099895 MeV
        self.electron_energy * 1e3 / 0.51099895
    }

    fn sample_energy(&self, rng: &mut Rng) -> Float {
        if self.energy_high <= self.energy_low {
            return self.energy_low;
        }
        // rejection sample the Schwinger spectrum over the band; the
        // maximum is estimated on a coarse scan once per draw band
        let mut peak: Float = 0.0;
        for i in 0..=16 {
            let e: Float =
                self.energy_low + (self.energy_high - self.energy_low) * i as Float / 16.0;
            peak = peak.max(self.schwinger(e));
        }
        loop {
            let e: Float = self.energy_low + (self.energy_high - self.energy_low) * rng.uniform();
            if self.schwinger(e) >= rng.uniform() * peak {
                return e;
            }
        }
    }

    fn sample_vertical_angle(&self, energy: Float, rng: &mut Rng) -> Float {
        let y: Float = energy / self.critical_energy();
        let gamma: Float = self.gamma();

        // the distribution dies off within a few 1/gamma; five is
        // enough even well below the critical energy
        let gpsi_max: Float = 5.0 / y.cbrt().max(0.3);
        let peak: Float = self.vertical_intensity(y, 0.0);
        let gpsi: Float = loop {
            let candidate: Float = (rng.uniform() * 2.0 - 1.0) * gpsi_max;
            if self.vertical_intensity(y, candidate) >= rng.uniform() * peak {
                break candidate;
            }
        };

        let psi: Float = gpsi / gamma;
        // convolve with the vertical spread of the electron beam
        if self.ver_ebeam_divergence > 0.0 {
            psi + rng.normal(0.0, self.ver_ebeam_divergence)
        } else {
            psi
        }
    }

    pub fn gen_ray(&self, path_id: i32, source_id: i32, mut rng: Rng) -> Ray {
        let x: Float = distribute(self.width_dist, self.source_width, &mut rng);
        let y: Float = distribute(self.height_dist, self.source_height, &mut rng);

        let energy: Float = self.sample_energy(&mut rng);

        let phi: Float = (rng.uniform() - 0.5) * self.hor_divergence;
        let psi: Float = self.sample_vertical_angle(energy, &mut rng);

        assemble_ray(
            self.position,
            &self.orientation,
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
