//! Draw random samples from the distributions used by slit diffraction
//! and dipole emission, plus the small special functions they need.

// rayx
use crate::core::rayx::{Float, PI};
use crate::core::rng::Rng;

/// this function returns the factorial of the given number; negative
/// arguments are passed through unchanged
pub fn fact(a: i32) -> Float {
    if a < 0 {
        return a as Float;
    }
    let mut f: Float = 1.0;
    for i in 2..=a {
        f *= i as Float;
    }
    f
}

/// calculates the Bessel function of the first kind J1 by its series
/// expansion. Outside of [0, 20] the series is numerically useless and
/// 0 is returned instead.
pub fn bessel1(v: Float) -> Float {
    if !(0.0..=20.0).contains(&v) {
        return 0.0;
    }

    let mut sum: Float = 0.0;
    for small in 0..=30_i32 {
        let sign: Float = if small % 2 == 0 { 1.0 } else { -1.0 };
        sum += sign * (v / 2.0).powi(2 * small + 1) / (fact(small) * fact(small + 1));
    }
    sum
}

/// Modified Bessel function of the second kind K_nu, evaluated with the
/// integral representation K_nu(x) = int_0^inf exp(-x cosh t) cosh(nu t) dt.
/// The integrand decays like exp(-x cosh t), so a fixed upper limit is
/// plenty for the synchrotron use case (x well above 1e-3).
pub fn bessel_k(nu: Float, x: Float) -> Float {
    let n: usize = 2000;
    let t_max: Float = 30.0;
    let h: Float = t_max / n as Float;

    let mut sum: Float = 0.5 * (-x).exp();
    for i in 1..n {
        let t: Float = i as Float * h;
        sum += (-x * t.cosh()).exp() * (nu * t).cosh();
    }
    sum * h
}

/// Samples the Fraunhofer diffraction angle behind a rectangular slit
/// opening of size `dim` (mm) for light of wavelength `wl` (nm). The
/// intensity follows sinc^2 of the reduced angle, so candidates drawn
/// uniformly from the central ten side lobes are rejection sampled
/// against it. A zero `dim` means no diffraction along this axis.
pub fn fraun_diff(dim: Float, wl: Float, rng: &mut Rng) -> Float {
    if dim == 0.0 {
        return 0.0;
    }
    let b: Float = dim * 1e6; // slit opening in nm
    let div: Float = wl / b; // angular half width of the central lobe

    let mut d_angle: Float;
    loop {
        let rn0: Float = rng.uniform();
        let rn1: Float = rng.uniform();
        d_angle = (rn0 - 0.5) * 20.0 * div;
        let u: Float = PI * b * d_angle.sin() / wl;
        let c: Float = if u == 0.0 {
            1.0
        } else {
            (u.sin() / u) * (u.sin() / u)
        };
        if c >= rn1 {
            break;
        }
    }
    d_angle
}

/// Samples the two diffraction angles behind a circular slit opening of
/// diameter `diameter` (mm), rejection sampled against the Airy pattern
/// (2 J1(u) / u)^2.
pub fn bessel_diff(diameter: Float, wl: Float, rng: &mut Rng) -> (Float, Float) {
    let b: Float = 0.5 * diameter * 1e6; // radius in nm
    let ximax: Float = 5.0 * wl / b;

    let mut dphi: Float;
    let mut dpsi: Float;
    loop {
        let rn0: Float = rng.uniform();
        let rn1: Float = rng.uniform();
        let rn2: Float = rng.uniform();

        dphi = rn0 * ximax;
        dpsi = rn1 * ximax;
        let xi: Float = (0.5 * (dphi * dphi + dpsi * dpsi)).sqrt();
        let u: Float = 2.0 * PI * b * xi.sin() / wl;
        let c: Float = if u == 0.0 {
            1.0
        } else {
            4.0 * (bessel1(u) / u) * (bessel1(u) / u)
        };
        if c >= rn2 {
            break;
        }
    }

    // the pattern is symmetric, the sampler above only covers one
    // quadrant
    if rng.uniform() > 0.5 {
        dphi = -dphi;
    }
    if rng.uniform() > 0.5 {
        dpsi = -dpsi;
    }
    (dphi, dpsi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fact() {
        let inouts: Vec<(i32, Float)> = vec![
            (2, 2.0),
            (1, 1.0),
            (0, 1.0),
            (17, 355687428096000.0),
            (4, 24.0),
            (-1, -1.0),
            (-2, -2.0),
            (12, 479001600.0),
            (-4, -4.0),
            (10, 3628800.0),
        ];
        for (input, out) in inouts {
            assert_eq!(fact(input), out);
        }
    }

    #[test]
    fn test_bessel1() {
        let inouts: Vec<(Float, Float)> = vec![
            (100.0, 0.0),
            (20.100000000000001, 0.0),
            (-12.122999999999999, 0.0),
            (23.100000000000001, 0.0),
            (0.0, 0.0),
            (20.0, 0.066833545658411236),
            (-0.10000000000000001, 0.0),
            (1e-08, 5.0000000000000001e-09),
            (2.0, 0.57672480775687363),
            (12.122999999999999, -0.21368198451302897),
            (3.1415926535897931, 0.28461534317975273),
            (10.199999999999999, -0.0066157432977083167),
            (19.989999999999998, 0.065192988349741909),
            (4.0, -0.06604332802354923),
        ];
        for (input, out) in inouts {
            assert_relative_eq!(bessel1(input), out, epsilon = 1e-6, max_relative = 1e-5);
        }
    }

    #[test]
    fn test_bessel_k_against_asymptotics() {
        // for large x, K_nu(x) approaches sqrt(pi / 2x) exp(-x)
        for &x in &[5.0, 10.0, 20.0] {
            let asympt: Float = (PI / (2.0 * x)).sqrt() * (-x).exp();
            let k13 = bessel_k(1.0 / 3.0, x);
            assert!((k13 - asympt).abs() / asympt < 0.05);
        }
    }

    #[test]
    fn test_fraun_diff_width() {
        // the sampled angles concentrate around the central sinc lobe,
        // whose half width is wl / b
        let mut rng = Rng::from_counter(99);
        let dim: Float = 1.0; // 1 mm
        let wl: Float = 10.0; // 10 nm
        let div: Float = wl / (dim * 1e6);

        let n = 10_000;
        let mut sq_sum: Float = 0.0;
        for _ in 0..n {
            let a = fraun_diff(dim, wl, &mut rng);
            sq_sum += a * a;
        }
        let rms = (sq_sum / n as Float).sqrt();
        assert!(rms > 0.1 * div && rms < 5.0 * div);
    }

    #[test]
    fn test_fraun_diff_zero_dim() {
        let mut rng = Rng::from_counter(1);
        assert_eq!(fraun_diff(0.0, 10.0, &mut rng), 0.0);
    }
}
