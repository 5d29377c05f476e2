//! Cutouts restrict a potentially infinite surface to the finite shape
//! of the actual optical element. They are a subset of points of the
//! element's XZ plane.

// rayx
use crate::core::rayx::Float;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cutout {
    /// Every point (x, z) is within this cutout, it's unlimited after all.
    Unlimited,
    /// A rectangle specified by width/length centered at (x=0, z=0).
    Rect { width: Float, length: Float },
    /// An elliptical shape given by two diameters, centered at (x=0, z=0).
    Elliptical { diameter_x: Float, diameter_z: Float },
    /// Two lines of lengths `width_a` and `width_b`, both parallel to
    /// the X axis at distance `length`, centered at (x=0, z=0).
    Trapezoid {
        width_a: Float,
        width_b: Float,
        length: Float,
    },
}

impl Default for Cutout {
    fn default() -> Self {
        Cutout::Unlimited
    }
}

/// checks whether the point (x, z) is within the cutout
pub fn in_cutout(cutout: &Cutout, x: Float, z: Float) -> bool {
    match cutout {
        Cutout::Unlimited => true,
        Cutout::Rect { width, length } => {
            let x_min = -width / 2.0;
            let x_max = width / 2.0;
            let z_min = -length / 2.0;
            let z_max = length / 2.0;

            !(x <= x_min || x >= x_max || z <= z_min || z >= z_max)
        }
        Cutout::Trapezoid {
            width_a,
            width_b,
            length,
        } => {
            // A, B, C, D are the four corner points.
            //
            //    A--B    //
            //   /    \   //
            //  C------D  //
            let a = (-width_a / 2.0, -length / 2.0);
            let b = (width_a / 2.0, -length / 2.0);
            let c = (width_b / 2.0, length / 2.0);
            let d = (-width_b / 2.0, length / 2.0);

            let cross =
                |(px, pz): (Float, Float), (qx, qz): (Float, Float)| px * qz - pz * qx;
            let sub = |(px, pz): (Float, Float), (qx, qz): (Float, Float)| (px - qx, pz - qz);

            let p = (x, z);
            let l1 = cross(sub(p, a), sub(b, a)) * cross(sub(p, d), sub(c, d));
            let l2 = cross(sub(p, a), sub(d, a)) * cross(sub(p, b), sub(c, b));
            l1 < 0.0 && l2 < 0.0
        }
        Cutout::Elliptical {
            diameter_x,
            diameter_z,
        } => {
            let val1 = x / (diameter_x / 2.0);
            let val2 = z / (diameter_z / 2.0);
            val1 * val1 + val2 * val2 <= 1.0
        }
    }
}

/// returns the key points of the cutout, typically points on its
/// boundary, as (x, z) pairs
pub fn key_cutout_points(cutout: &Cutout) -> [(Float, Float); 4] {
    match cutout {
        Cutout::Unlimited => {
            let inf: Float = 1e100;
            [(inf, inf), (-inf, -inf), (-inf, inf), (inf, -inf)]
        }
        Cutout::Rect { width, length } => {
            let w = width / 2.0;
            let l = length / 2.0;
            [(w, l), (-w, -l), (-w, l), (w, -l)]
        }
        Cutout::Trapezoid {
            width_a,
            width_b,
            length,
        } => [
            (width_a / 2.0, -length / 2.0),
            (-width_a / 2.0, -length / 2.0),
            (-width_b / 2.0, length / 2.0),
            (width_b / 2.0, length / 2.0),
        ],
        Cutout::Elliptical {
            diameter_x,
            diameter_z,
        } => [
            (diameter_x / 2.0, 0.0),
            (0.0, diameter_z / 2.0),
            (-diameter_x / 2.0, 0.0),
            (0.0, -diameter_z / 2.0),
        ],
    }
}

/// returns width and length of the bounding box
pub fn cutout_bounding_box(cutout: &Cutout) -> (Float, Float) {
    let mut ret: (Float, Float) = (0.0, 0.0);
    for (x, z) in key_cutout_points(cutout).iter() {
        let x = x.abs() * 2.0;
        let z = z.abs() * 2.0;
        if x > ret.0 {
            ret.0 = x;
        }
        if z > ret.1 {
            ret.1 = z;
        }
    }
    ret
}

/// checks whether `c1` is a subset of `c2` by testing the key points.
/// might not find all subset violations, but finds most of them.
pub fn cutout_subset(c1: &Cutout, c2: &Cutout) -> bool {
    key_cutout_points(c1)
        .iter()
        .all(|(x, z)| in_cutout(c2, *x, *z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect() {
        let c = Cutout::Rect {
            width: 2.0,
            length: 4.0,
        };
        assert!(in_cutout(&c, 0.0, 0.0));
        assert!(in_cutout(&c, 0.9, 1.9));
        assert!(!in_cutout(&c, 1.0, 0.0));
        assert!(!in_cutout(&c, 0.0, 2.0));
        assert!(!in_cutout(&c, -1.5, 0.0));
    }

    #[test]
    fn test_elliptical() {
        let c = Cutout::Elliptical {
            diameter_x: 2.0,
            diameter_z: 4.0,
        };
        assert!(in_cutout(&c, 0.0, 0.0));
        assert!(in_cutout(&c, 1.0, 0.0));
        assert!(in_cutout(&c, 0.0, -2.0));
        assert!(!in_cutout(&c, 1.0, 2.0));
        assert!(!in_cutout(&c, 1.1, 0.0));
    }

    #[test]
    fn test_trapezoid() {
        let c = Cutout::Trapezoid {
            width_a: 2.0,
            width_b: 4.0,
            length: 2.0,
        };
        assert!(in_cutout(&c, 0.0, 0.0));
        assert!(in_cutout(&c, 0.9, -0.9));
        assert!(in_cutout(&c, 1.8, 0.9));
        assert!(!in_cutout(&c, 1.8, -0.9));
        assert!(!in_cutout(&c, 0.0, 1.5));
    }

    #[test]
    fn test_unlimited() {
        assert!(in_cutout(&Cutout::Unlimited, 1e60, -1e60));
    }

    #[test]
    fn test_bounding_box_contains_cutout() {
        let cutouts = vec![
            Cutout::Rect {
                width: 2.0,
                length: 4.0,
            },
            Cutout::Elliptical {
                diameter_x: 3.0,
                diameter_z: 1.0,
            },
            Cutout::Trapezoid {
                width_a: 1.0,
                width_b: 5.0,
                length: 2.0,
            },
        ];
        for c in cutouts {
            let (w, l) = cutout_bounding_box(&c);
            let bbox = Cutout::Rect {
                // grow a hair so boundary points of the cutout stay
                // inside the open rectangle
                width: w + 1e-9,
                length: l + 1e-9,
            };
            // probe a grid of points
            for i in -20..=20 {
                for j in -20..=20 {
                    let x = i as Float * 0.2;
                    let z = j as Float * 0.2;
                    if in_cutout(&c, x, z) {
                        assert!(in_cutout(&bbox, x, z), "({}, {}) escaped the bbox", x, z);
                    }
                }
            }
        }
    }

    #[test]
    fn test_cutout_subset() {
        let small = Cutout::Rect {
            width: 1.0,
            length: 1.0,
        };
        let big = Cutout::Rect {
            width: 4.0,
            length: 4.0,
        };
        assert!(cutout_subset(&small, &big));
        assert!(!cutout_subset(&big, &small));
    }
}
