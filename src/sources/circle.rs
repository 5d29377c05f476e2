// rayx
use crate::core::efield::Stokes;
use crate::core::geometry::Vector3;
use crate::core::rayx::{Float, PI};
use crate::core::rng::Rng;
use crate::core::transform::Matrix3;
use crate::ray::Ray;
use crate::sources::{assemble_ray, distribute, EnergyDistribution, SourceDist};

/// A source emitting onto concentric cones: directions sit on
/// `num_circles` rings equally spaced between the minimum and maximum
/// opening angle, with uniform azimuth on each ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleSource {
    pub num_rays: usize,
    pub position: Vector3,
    pub orientation: Matrix3,

    pub source_width: Float,
    pub source_height: Float,
    pub source_depth: Float,
    pub width_dist: SourceDist,
    pub height_dist: SourceDist,

    pub num_circles: u32,
    /// opening angle of the innermost ring, rad
    pub min_opening_angle: Float,
    /// opening angle of the outermost ring, rad
    pub max_opening_angle: Float,
    /// wobble added to each ring's opening angle, rad
    pub delta_opening_angle: Float,

    pub energy_distribution: EnergyDistribution,
    pub polarization: Stokes,
}

impl CircleSource {
    /// direction on one of the cones, picked uniformly over the rings
    pub fn get_direction(&self, rng: &mut Rng) -> Vector3 {
        let circles = self.num_circles.max(1);
        let ring: u32 = ((rng.uniform() * circles as Float) as u32).min(circles - 1);

        let theta: Float = if circles == 1 {
            (self.min_opening_angle + self.max_opening_angle) / 2.0
        } else {
            self.min_opening_angle
                + (self.max_opening_angle - self.min_opening_angle) * ring as Float
                    / (circles - 1) as Float
        };
        let theta: Float = theta + (rng.uniform() - 0.5) * self.delta_opening_angle;

        let azimuth: Float = 2.0 * PI * rng.uniform();
        Vector3 {
            x: theta.sin() * azimuth.cos(),
            y: theta.sin() * azimuth.sin(),
            z: theta.cos(),
        }
    }

    pub fn gen_ray(&self, path_id: i32, source_id: i32, mut rng: Rng) -> Ray {
        let x: Float = distribute(self.width_dist, self.source_width, &mut rng);
        let y: Float = distribute(self.height_dist, self.source_height, &mut rng);
        let z: Float = (rng.uniform() - 0.5) * self.source_depth;

        let direction = self.get_direction(&mut rng);
        let energy: Float = self.energy_distribution.select_energy(&mut rng);

        assemble_ray(
            self.position,
            &self.orientation,
            Vector3::new(x, y, z),
            direction,
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
    use approx::assert_relative_eq;

    fn ring_source() -> CircleSource {
        CircleSource {
            num_rays: 100,
            position: Vector3::default(),
            orientation: Matrix3::identity(),
            source_width: 0.0,
            source_height: 0.0,
            source_depth: 0.0,
            width_dist: SourceDist::HardEdge,
            height_dist: SourceDist::HardEdge,
            num_circles: 3,
            min_opening_angle: 0.01,
            max_opening_angle: 0.03,
            delta_opening_angle: 0.0,
            energy_distribution: EnergyDistribution::SoftEdge {
                center: 100.0,
                sigma: 0.0,
            },
            polarization: Stokes::new(1.0, 1.0, 0.0, 0.0),
        }
    }

    #[test]
    fn test_directions_sit_on_rings() {
        let src = ring_source();
        for i in 0..200u64 {
            let mut rng = Rng::new(i, 200, 9);
            let d = src.get_direction(&mut rng);
            assert_relative_eq!(d.length(), 1.0, epsilon = 1e-12);
            let theta = d.z.acos();
            let on_a_ring = [0.01, 0.02, 0.03]
                .iter()
                .any(|t| (theta - t).abs() < 1e-9);
            assert!(on_a_ring, "theta {} is not on a ring", theta);
        }
    }
}
