//! The photon's polarisation state. A ray carries a complex electric
//! field 3-vector which holds amplitude, phase and polarisation at
//! once; the real Stokes 4-vector view of the same state is derivable
//! and used for source setup and output.

// others
use num::complex::Complex64;
use num::Zero;
// rayx
use crate::core::geometry::{vec3_cross_vec3, vec3_dot_vec3, Vector3, Vector4};
use crate::core::rayx::{Float, PI};
use crate::core::transform::Matrix3;

pub type Stokes = Vector4;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricField {
    pub x: Complex64,
    pub y: Complex64,
    pub z: Complex64,
}

impl Default for ElectricField {
    fn default() -> Self {
        ElectricField {
            x: Complex64::zero(),
            y: Complex64::zero(),
            z: Complex64::zero(),
        }
    }
}

impl ElectricField {
    pub fn new(x: Complex64, y: Complex64, z: Complex64) -> Self {
        ElectricField { x, y, z }
    }

    pub fn intensity(&self) -> Float {
        self.x.norm_sqr() + self.y.norm_sqr() + self.z.norm_sqr()
    }

    pub fn is_finite(&self) -> bool {
        let finite = |c: &Complex64| c.re.is_finite() && c.im.is_finite();
        finite(&self.x) && finite(&self.y) && finite(&self.z)
    }

    /// Advance the phase for a distance `path_length` (mm) travelled at
    /// wavelength `wave_length` (nm).
    pub fn advance(&self, wave_length: Float, path_length: Float) -> ElectricField {
        if wave_length == 0.0 {
            return *self;
        }
        let phase: Float = 2.0 * PI * (path_length * 1e6) / wave_length;
        let factor: Complex64 = Complex64::new(0.0, phase).exp();
        ElectricField {
            x: self.x * factor,
            y: self.y * factor,
            z: self.z * factor,
        }
    }

    /// Rotate by a real 3x3 matrix, component phases are untouched.
    pub fn rotate(&self, m: &Matrix3) -> ElectricField {
        let re = m.mul_vec(&Vector3::new(self.x.re, self.y.re, self.z.re));
        let im = m.mul_vec(&Vector3::new(self.x.im, self.y.im, self.z.im));
        ElectricField {
            x: Complex64::new(re.x, im.x),
            y: Complex64::new(re.y, im.y),
            z: Complex64::new(re.z, im.z),
        }
    }
}

/// The two-component field in the local s/p frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LocalElectricField {
    pub x: Complex64,
    pub y: Complex64,
}

impl LocalElectricField {
    pub fn intensity(&self) -> Float {
        self.x.norm_sqr() + self.y.norm_sqr()
    }
}

pub fn intensity_stokes(stokes: &Stokes) -> Float {
    stokes.x
}

pub fn degree_of_polarization(stokes: &Stokes) -> Float {
    (stokes.y * stokes.y + stokes.z * stokes.z + stokes.w * stokes.w).sqrt() / stokes.x
}

pub fn local_field_to_stokes(field: &LocalElectricField) -> Stokes {
    let mag_x: Float = field.x.norm();
    let mag_y: Float = field.y.norm();
    let theta_x: Float = field.x.arg();
    let theta_y: Float = field.y.arg();

    Stokes::new(
        mag_x * mag_x + mag_y * mag_y,
        mag_x * mag_x - mag_y * mag_y,
        2.0 * mag_x * mag_y * (theta_x - theta_y).cos(),
        2.0 * mag_x * mag_y * (theta_x - theta_y).sin(),
    )
}

pub fn field_to_stokes(field: &ElectricField) -> Stokes {
    local_field_to_stokes(&LocalElectricField {
        x: field.x,
        y: field.y,
    })
}

pub fn stokes_to_local_field(stokes: &Stokes) -> LocalElectricField {
    let x_real: Float = ((stokes.x + stokes.y) / 2.0).sqrt();

    let y_mag: Float = ((stokes.x - stokes.y) / 2.0).sqrt();
    let y_theta: Float = -1.0 * stokes.w.atan2(stokes.z);
    let y: Complex64 = Complex64::from_polar(y_mag, y_theta);

    LocalElectricField {
        x: Complex64::new(x_real, 0.0),
        y,
    }
}

pub fn stokes_to_field(stokes: &Stokes) -> ElectricField {
    let local = stokes_to_local_field(stokes);
    ElectricField::new(local.x, local.y, Complex64::zero())
}

/// Builds an orthonormal basis whose third column is `forward`; used to
/// carry a freshly emitted field into the ray frame.
pub fn rotation_matrix(forward: Vector3) -> Matrix3 {
    let mut up = Vector3::new(0.0, 1.0, 0.0);
    let right: Vector3;

    if vec3_dot_vec3(&forward, &up).abs() < 0.5 {
        right = vec3_cross_vec3(&forward, &up).normalize();
        up = vec3_cross_vec3(&right, &forward).normalize();
    } else {
        let seed = Vector3::new(1.0, 0.0, 0.0);
        up = vec3_cross_vec3(&forward, &seed).normalize();
        right = vec3_cross_vec3(&forward, &up).normalize();
    }

    Matrix3::from_columns(right, up, forward)
}

/// A complex 3x3 matrix, row-major like `Matrix3`. This is the shape of
/// the polarisation transfer matrices built from Fresnel amplitudes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ComplexMatrix3 {
    pub m: [[Complex64; 3]; 3],
}

impl ComplexMatrix3 {
    pub fn diagonal(a: Complex64, b: Complex64, c: Complex64) -> Self {
        let zero = Complex64::zero();
        ComplexMatrix3 {
            m: [[a, zero, zero], [zero, b, zero], [zero, zero, c]],
        }
    }
    pub fn from_real(r: &Matrix3) -> Self {
        let mut m = [[Complex64::zero(); 3]; 3];
        for (i, row) in r.m.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                m[i][j] = Complex64::new(*v, 0.0);
            }
        }
        ComplexMatrix3 { m }
    }
    pub fn mul_mat(&self, other: &ComplexMatrix3) -> ComplexMatrix3 {
        let mut r = [[Complex64::zero(); 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                for (k, row) in other.m.iter().enumerate() {
                    r[i][j] += self.m[i][k] * row[j];
                }
            }
        }
        ComplexMatrix3 { m: r }
    }
    pub fn mul_field(&self, f: &ElectricField) -> ElectricField {
        ElectricField {
            x: self.m[0][0] * f.x + self.m[0][1] * f.y + self.m[0][2] * f.z,
            y: self.m[1][0] * f.x + self.m[1][1] * f.y + self.m[1][2] * f.z,
            z: self.m[2][0] * f.x + self.m[2][1] * f.y + self.m[2][2] * f.z,
        }
    }
}
