// rayx
use crate::behaviours::refrac::refrac2d;
use crate::core::geometry::{sign, Vector3};
use crate::core::rayx::{energy_to_wave_length, Float};
use crate::ray::{EventType, Ray};
use crate::surfaces::Collision;

/// The imaging configuration of a reflection zone plate, i.e. what the
/// zone pattern was designed to map onto what.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum RzpImageType {
    Point2Point,
    Astigmatic2Astigmatic,
    Point2HorizontalLine,
    Point2HorizontalDivergentLine,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum RzpType {
    Elliptical,
    /// like a VLS grating; the pattern only varies along z
    Meridional,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RzpBehaviour {
    pub image_type: RzpImageType,
    pub rzp_type: RzpType,
    pub design_order_of_diffraction: Float,
    pub order_of_diffraction: Float,
    /// half of the rays take the zero order when set
    pub additional_order: bool,
    /// design wavelength in nm
    pub design_wavelength: Float,
    pub fresnel_z_offset: Float,
    pub design_sagittal_entrance_arm_length: Float,
    pub design_sagittal_exit_arm_length: Float,
    pub design_meridional_entrance_arm_length: Float,
    pub design_meridional_exit_arm_length: Float,
    /// design incidence angle in rad
    pub design_alpha_angle: Float,
    /// design exit angle in rad
    pub design_beta_angle: Float,
}

/**
calculates DX and DZ (line spacing in x and z direction) at a given
point for a given direction on the zone plate
@returns (DX, DZ)
*/
pub fn rzp_line_density(r: &Ray, normal: &Vector3, b: &RzpBehaviour) -> (Float, Float) {
    let risag: Float = b.design_sagittal_entrance_arm_length;
    let rosag: Float = b.design_sagittal_exit_arm_length;
    let rimer: Float = b.design_meridional_entrance_arm_length;
    let romer: Float = b.design_meridional_exit_arm_length;
    let alpha: Float = b.design_alpha_angle;
    let beta: Float = b.design_beta_angle;
    let wl: Float = 1e-06 * b.design_wavelength; // source energy/design energy
    let ord: Float = b.order_of_diffraction;

    let fx: Float = normal.x;
    let fy: Float = normal.y;
    let fz: Float = normal.z;
    let x: Float = match b.rzp_type {
        // meridional patterns do not vary along x
        RzpType::Meridional => 0.0,
        RzpType::Elliptical => r.position.x,
    };
    let y: Float = r.position.y;
    let z: Float = r.position.z;

    // avoid calculating the same sines and cosines multiple times
    let s_beta: Float = beta.sin();
    let c_beta: Float = beta.cos();
    let s_alpha: Float = alpha.sin();
    let c_alpha: Float = alpha.cos();

    let xi: Float;
    let yi: Float;
    let zi: Float;
    let xm: Float;
    let ym: Float;
    let zm: Float;

    match b.image_type {
        RzpImageType::Point2Point => {
            if fx == 0.0 && fz == 0.0 {
                // plane
                zi = -(risag * c_alpha + z);
                xi = x;
                yi = risag * s_alpha;
                zm = rosag * c_beta - z;
                xm = x;
                ym = rosag * s_beta;
            } else {
                // the general case reduces to the plane with normal
                // (0, 1, 0) and y = 0
                zi = fx * fz * x - (fx * fx + fy * fy) * (z + risag * c_alpha)
                    + fy * fz * (y - risag * s_alpha);
                xi = fy * x - fx * y + fx * risag * s_alpha;
                yi = -(fx * x) - fy * y - fz * z - fz * risag * c_alpha + fy * risag * s_alpha;
                zm = fx * fz * x
                    + (fx * fx + fy * fy) * (-z + rosag * c_beta)
                    + fy * fz * (y - rosag * s_beta);
                xm = fy * x - fx * y + fx * rosag * s_beta;
                ym = -(fx * x) - fy * y - fz * z + fz * rosag * c_beta + fy * rosag * s_beta;
            }
        }
        RzpImageType::Astigmatic2Astigmatic => {
            let s_rim: Float = sign(rimer);
            let s_rom: Float = sign(romer);
            let c_2alpha: Float = (2.0 * alpha).cos();
            let c_2beta: Float = (2.0 * beta).cos();
            if fx == 0.0 && fz == 0.0 {
                // plane
                zi = s_rim * (rimer * c_alpha + z);
                xi = (s_rim * x * (c_alpha * z - 2.0 * s_alpha * s_alpha * rimer + s_alpha * y + rimer))
                    / (c_alpha * z - 2.0 * s_alpha * s_alpha * risag + s_alpha * y + risag);
                yi = s_rim * (-rimer * s_alpha + y);
                zm = s_rom * (romer * c_beta - z);
                xm = (s_rom * x * (-c_beta * z - 2.0 * s_beta * s_beta * romer + s_beta * y + romer))
                    / (c_beta * z + 2.0 * s_beta * s_beta * rosag - s_beta * y - rosag);
                ym = s_rom * (romer * s_beta - y);
            } else {
                let denominator: Float = z * c_alpha + risag * c_2alpha + y * s_alpha;
                let nominator: Float = x * (z * c_alpha + rimer * c_2alpha + y * s_alpha);
                zi = s_rim
                    * ((fx * fx + fy * fy) * (z + rimer * c_alpha)
                        - fy * fz * (y - rimer * s_alpha)
                        - (fx * fz * nominator) / denominator);
                xi = s_rim * (-(fx * y) + fx * rimer * s_alpha + (fy * nominator) / denominator);
                yi = s_rim
                    * (fz * (z + rimer * c_alpha)
                        + fy * (y - rimer * s_alpha)
                        + (fx * nominator) / denominator);

                let denominator: Float = -(z * c_beta) + rosag * c_2beta + y * s_beta;
                let nominator: Float = x * (-(z * c_beta) + romer * c_2beta + y * s_beta);
                zm = s_rom
                    * ((fx * fx + fy * fy) * (-z + romer * c_beta)
                        + fy * fz * (y - romer * s_beta)
                        + (fx * fz * nominator) / denominator);
                xm = s_rom * (fx * (y - romer * s_beta) - (fy * nominator) / denominator);
                ym = s_rom
                    * (fz * (-z + romer * c_beta) + fy * (-y + romer * s_beta)
                        - (fx * nominator) / denominator);
            }
            let ris: Float = (zi * zi + xi * xi + yi * yi).sqrt();
            let rms: Float = (zm * zm + xm * xm + ym * ym).sqrt();

            let ai: Float = zi / ris;
            let bi: Float = -xi / ris;
            let am: Float = -zm / rms;
            let bm: Float = xm / rms;

            let dz: Float = (ai + am) / (wl * ord);
            let dx: Float = (-bi - bm) / (wl * ord);
            return (dx, dz);
        }
        RzpImageType::Point2HorizontalLine => {
            if fx == 0.0 && fz == 0.0 {
                // plane
                zi = -(risag * c_alpha + z);
                xi = x;
                yi = risag * s_alpha;
                zm = rosag * c_beta - z;
                xm = 0.0;
                ym = rosag * s_beta;
            } else {
                zi = fx * fz * x - (fx * fx + fy * fy) * (z + risag * c_alpha)
                    + fy * fz * (y - risag * s_alpha);
                xi = fy * x - fx * y + fx * risag * s_alpha;
                yi = -(fx * x) - fy * y - fz * z - fz * risag * c_alpha + fy * risag * s_alpha;
                zm = (fx * fx + fy * fy) * (-z + rosag * c_beta) + fy * fz * (y - rosag * s_beta);
                xm = fx * (-y + rosag * s_beta);
                ym = -(fy * y) - fz * z + fz * rosag * c_beta + fy * rosag * s_beta;
            }
        }
        RzpImageType::Point2HorizontalDivergentLine => {
            if fx == 0.0 && fz == 0.0 {
                zi = -(risag * c_alpha + z);
                xi = x;
                yi = risag * s_alpha;
                zm = rosag * c_beta - z;
                // not negative anymore, zi is negative already
                xm = x / zi * zm;
                ym = rosag * s_beta;
            } else {
                zi = fx * fz * x - (fx * fx + fy * fy) * (z + risag * c_alpha)
                    + fy * fz * (y - risag * s_alpha);
                xi = fy * x - fx * y + fx * risag * s_alpha;
                yi = -(fx * x) - fy * y - fz * z - fz * risag * c_alpha + fy * risag * s_alpha;
                zm = (fx * fz * x * (z - rosag * c_beta)) / (z + risag * c_alpha)
                    + (fx * fx + fy * fy) * (-z + rosag * c_beta)
                    + fy * fz * (y - rosag * s_beta);
                xm = (fy * x * (z - rosag * c_beta)) / (z + risag * c_alpha)
                    + fx * (-y + rosag * s_beta);
                ym = -((fx * x * (z - rosag * c_beta)) / (z + risag * c_alpha))
                    + fz * (-z + rosag * c_beta)
                    + fy * (-y + rosag * s_beta);
            }
        }
    }

    let ris: Float = (zi * zi + xi * xi + yi * yi).sqrt();
    let rms: Float = (zm * zm + xm * xm + ym * ym).sqrt();

    let ai: Float = xi / ris;
    let am: Float = xm / rms;
    let bi: Float = zi / ris;
    let bm: Float = zm / rms;

    let dx: Float = (ai + am) / (wl * ord);
    let dz: Float = (-bi - bm) / (wl * ord);
    (dx, dz)
}

/// Diffraction off the zone pattern. The local line densities along x
/// and z feed a two dimensional refraction; with `additional_order`
/// half of the rays take the ordinary reflection instead.
pub fn behave_rzp(mut ray: Ray, col: &Collision, b: &RzpBehaviour) -> Ray {
    let wl: Float = energy_to_wave_length(ray.energy);
    let mut ord: Float = b.order_of_diffraction;

    let (dx, dz) = rzp_line_density(&ray, &col.normal, b);

    // if the additional zero order is traced, approximately half of
    // the rays are randomly chosen to take order 0, an ordinary
    // reflection
    if b.additional_order && ray.rng.uniform() > 0.5 {
        ord = 0.0;
    }

    let az: Float = wl * dz * ord * 1e-6;
    let ax: Float = wl * dx * ord * 1e-6;
    ray.order = ord as i32;

    match refrac2d(&ray.direction, &col.normal, az, ax) {
        Some(direction) => {
            ray.direction = direction;
            ray
        }
        None => ray.terminated(EventType::BeyondHorizon),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::efield::ElectricField;
    use crate::core::rayx::radians;
    use crate::core::rng::Rng;
    use approx::assert_relative_eq;

    fn default_rzp() -> RzpBehaviour {
        RzpBehaviour {
            image_type: RzpImageType::Point2Point,
            rzp_type: RzpType::Elliptical,
            design_order_of_diffraction: -1.0,
            order_of_diffraction: -1.0,
            additional_order: false,
            design_wavelength: 1.239852e-05 * 1e6,
            fresnel_z_offset: 0.0,
            design_sagittal_entrance_arm_length: 100.0,
            design_sagittal_exit_arm_length: 500.0,
            design_meridional_entrance_arm_length: 100.0,
            design_meridional_exit_arm_length: 500.0,
            design_alpha_angle: radians(1.0),
            design_beta_angle: radians(1.0),
        }
    }

    fn rzp_ray(position: Vector3, direction: Vector3) -> Ray {
        Ray::emitted(
            position,
            direction,
            640.0,
            ElectricField::default(),
            Rng::from_counter(0),
            0,
            0,
        )
    }

    #[test]
    fn test_line_density_default_params() {
        let b = default_rzp();

        let flat = rzp_ray(
            Vector3::new(-5.0805095016939532, 0.0, 96.032788311782269),
            Vector3::new(0.0, 1.0, 0.0),
        );
        let normal = Vector3::new(0.0, 1.0, 0.0);
        let (dx, dz) = rzp_line_density(&flat, &normal, &b);
        assert_relative_eq!(dx, 3103.9106911246749, max_relative = 1e-10);
        assert_relative_eq!(dz, 5.0771666330055218, max_relative = 1e-10);

        let flat2 = rzp_ray(
            Vector3::new(-1.6935030407867075, 0.0, 96.032777495754004),
            Vector3::new(0.0, 1.0, 0.0),
        );
        let (dx, dz) = rzp_line_density(&flat2, &normal, &b);
        assert_relative_eq!(dx, 1034.8685185321938, max_relative = 1e-10);
        assert_relative_eq!(dz, -13.320120179862876, max_relative = 1e-10);

        let tilted = rzp_ray(
            Vector3::new(-5.047050067282087, 4.4859372100394515, 29.182033770349552),
            Vector3::new(0.05047050067282087, 0.95514062789960552, -0.29182033770349552),
        );
        let tilted_normal = Vector3::new(
            0.05047050067282087,
            0.95514062789960552,
            -0.29182033770349552,
        );
        let (dx, dz) = rzp_line_density(&tilted, &tilted_normal, &b);
        assert_relative_eq!(dx, 4045.0989844091882, max_relative = 1e-10);
        assert_relative_eq!(dz, -174.2085626048659, max_relative = 1e-10);
    }

    #[test]
    fn test_meridional_ignores_x() {
        let normal = Vector3::new(0.0, 1.0, 0.0);
        let mut b = default_rzp();
        b.rzp_type = RzpType::Meridional;
        let off_axis = rzp_ray(Vector3::new(3.0, 0.0, -2.0), Vector3::new(0.0, -1.0, 0.0));
        let on_axis = rzp_ray(Vector3::new(0.0, 0.0, -2.0), Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(
            rzp_line_density(&off_axis, &normal, &b),
            rzp_line_density(&on_axis, &normal, &b)
        );
    }

    #[test]
    fn test_additional_order_splits_rays() {
        let mut b = default_rzp();
        b.additional_order = true;
        let col = Collision {
            hitpoint: Vector3::default(),
            normal: Vector3::new(0.0, 1.0, 0.0),
        };

        let mut zero_order: usize = 0;
        for i in 0..1000u64 {
            let mut ray = rzp_ray(
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(0.0, -1.0, 0.0),
            );
            ray.rng = Rng::from_counter(i * 1000);
            let out = behave_rzp(ray, &col, &b);
            if out.order == 0 {
                zero_order += 1;
            }
        }
        // roughly half, this is a coin flip per ray
        assert!(zero_order > 333 && zero_order < 667);
    }
}
