//! Homogeneous 4x4 transforms between world and element coordinates,
//! plus the 3x3 rotations used for directions and electric fields.
//! Matrices are stored row-major and applied as `m * v`.

// rayx
use crate::core::geometry::{Vector3, Vector4};
use crate::core::rayx::Float;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix3 {
    pub m: [[Float; 3]; 3],
}

impl Default for Matrix3 {
    fn default() -> Self {
        Matrix3::identity()
    }
}

impl Matrix3 {
    pub fn identity() -> Self {
        Matrix3 {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }
    /// Build from three column vectors, i.e. the images of the basis.
    pub fn from_columns(c0: Vector3, c1: Vector3, c2: Vector3) -> Self {
        Matrix3 {
            m: [
                [c0.x, c1.x, c2.x],
                [c0.y, c1.y, c2.y],
                [c0.z, c1.z, c2.z],
            ],
        }
    }
    pub fn transpose(&self) -> Matrix3 {
        let mut t: [[Float; 3]; 3] = [[0.0; 3]; 3];
        for (i, row) in self.m.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                t[j][i] = *v;
            }
        }
        Matrix3 { m: t }
    }
    pub fn mul_vec(&self, v: &Vector3) -> Vector3 {
        Vector3 {
            x: self.m[0][0] * v.x + self.m[0][1] * v.y + self.m[0][2] * v.z,
            y: self.m[1][0] * v.x + self.m[1][1] * v.y + self.m[1][2] * v.z,
            z: self.m[2][0] * v.x + self.m[2][1] * v.y + self.m[2][2] * v.z,
        }
    }
    pub fn mul_mat(&self, other: &Matrix3) -> Matrix3 {
        let mut r: [[Float; 3]; 3] = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                for (k, row) in other.m.iter().enumerate() {
                    r[i][j] += self.m[i][k] * row[j];
                }
            }
        }
        Matrix3 { m: r }
    }
    pub fn rotation_x(angle: Float) -> Matrix3 {
        let c: Float = angle.cos();
        let s: Float = angle.sin();
        Matrix3 {
            m: [[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]],
        }
    }
    pub fn rotation_y(angle: Float) -> Matrix3 {
        let c: Float = angle.cos();
        let s: Float = angle.sin();
        Matrix3 {
            m: [[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]],
        }
    }
    pub fn rotation_z(angle: Float) -> Matrix3 {
        let c: Float = angle.cos();
        let s: Float = angle.sin();
        Matrix3 {
            m: [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]],
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix4 {
    pub m: [[Float; 4]; 4],
}

impl Default for Matrix4 {
    fn default() -> Self {
        Matrix4::identity()
    }
}

impl Matrix4 {
    pub fn identity() -> Self {
        Matrix4 {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }
    pub fn translation(t: Vector3) -> Self {
        Matrix4 {
            m: [
                [1.0, 0.0, 0.0, t.x],
                [0.0, 1.0, 0.0, t.y],
                [0.0, 0.0, 1.0, t.z],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }
    pub fn from_rotation(r: &Matrix3) -> Self {
        let mut m: [[Float; 4]; 4] = [[0.0; 4]; 4];
        for (i, row) in r.m.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                m[i][j] = *v;
            }
        }
        m[3][3] = 1.0;
        Matrix4 { m }
    }
    /// The rotational part, used to carry directions and fields along.
    pub fn basis(&self) -> Matrix3 {
        let mut r: [[Float; 3]; 3] = [[0.0; 3]; 3];
        for i in 0..3 {
            r[i][..3].copy_from_slice(&self.m[i][..3]);
        }
        Matrix3 { m: r }
    }
    pub fn mul_mat(&self, other: &Matrix4) -> Matrix4 {
        let mut r: [[Float; 4]; 4] = [[0.0; 4]; 4];
        for i in 0..4 {
            for j in 0..4 {
                for (k, row) in other.m.iter().enumerate() {
                    r[i][j] += self.m[i][k] * row[j];
                }
            }
        }
        Matrix4 { m: r }
    }
    pub fn mul_vec4(&self, v: &Vector4) -> Vector4 {
        Vector4 {
            x: self.m[0][0] * v.x + self.m[0][1] * v.y + self.m[0][2] * v.z + self.m[0][3] * v.w,
            y: self.m[1][0] * v.x + self.m[1][1] * v.y + self.m[1][2] * v.z + self.m[1][3] * v.w,
            z: self.m[2][0] * v.x + self.m[2][1] * v.y + self.m[2][2] * v.z + self.m[2][3] * v.w,
            w: self.m[3][0] * v.x + self.m[3][1] * v.y + self.m[3][2] * v.z + self.m[3][3] * v.w,
        }
    }
    /// Apply to a position, i.e. with homogeneous w = 1.
    pub fn transform_point(&self, p: &Vector3) -> Vector3 {
        let v: Vector4 = self.mul_vec4(&Vector4::new(p.x, p.y, p.z, 1.0));
        Vector3::new(v.x, v.y, v.z)
    }
    /// Apply to a direction, i.e. with homogeneous w = 0.
    pub fn transform_vector(&self, d: &Vector3) -> Vector3 {
        let v: Vector4 = self.mul_vec4(&Vector4::new(d.x, d.y, d.z, 0.0));
        Vector3::new(v.x, v.y, v.z)
    }
}

/// The plane an element is designed in. Surfaces are always traced in
/// the XZ plane; elements designed in XY (slits, image planes) get a
/// fixed y-z swap folded into their transforms.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum DesignPlane {
    Xy,
    Xz,
}

// the y-z swap is involutory, so it serves both directions
fn yz_swap() -> Matrix4 {
    Matrix4 {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    }
}

/// calculates the world to element coordinates transformation matrix
/// and its inverse
///
/// * `position` - position of the element in world coordinates
/// * `orientation` - columns are the element axes in world coordinates
/// * `calc_in_matrix` - whether to calculate the in matrix (world to
///   element) or the out matrix (element to world)
pub fn calc_transformation_matrices(
    position: Vector3,
    orientation: Matrix3,
    calc_in_matrix: bool,
    plane: DesignPlane,
) -> Matrix4 {
    let rotation: Matrix4 = Matrix4::from_rotation(&orientation);
    let inv_rotation: Matrix4 = Matrix4::from_rotation(&orientation.transpose());

    if calc_in_matrix {
        let translation: Matrix4 = Matrix4::translation(-position);
        // ray = swap * rot^T * tran * ray
        let g2e: Matrix4 = inv_rotation.mul_mat(&translation);
        match plane {
            DesignPlane::Xy => yz_swap().mul_mat(&g2e),
            DesignPlane::Xz => g2e,
        }
    } else {
        let inv_translation: Matrix4 = Matrix4::translation(position);
        // inverse of the in matrix
        let e2g: Matrix4 = inv_translation.mul_mat(&rotation);
        match plane {
            DesignPlane::Xy => e2g.mul_mat(&yz_swap()),
            DesignPlane::Xz => e2g,
        }
    }
}
