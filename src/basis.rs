//! Coordinate conversion between the host's axes and XSI's.
//!
//! Matrices are cgmath `Matrix4<f64>`: column-major storage, column-vector
//! convention. The first three columns are the right/up/front basis vectors
//! and the last column is the position. Host matrices use the same layout;
//! only the meaning of the axes differs.

use crate::xsi::Srt;
use cgmath::{Deg, InnerSpace, Matrix, Matrix3, Matrix4, One, Quaternion, Rad, SquareMatrix, Vector3, vec3};

/// Convert a host matrix to the target basis.
///
/// Rows are remapped (y, z) <- (z, -y), then columns likewise. Each
/// coordinate hop applies this exactly once; applying it twice is not the
/// identity.
pub fn to_target_basis(m: &Matrix4<f64>) -> Matrix4<f64> {
    let mut m = *m;
    for c in 0..4 {
        let (y, z) = (m[c][1], m[c][2]);
        m[c][1] = z;
        m[c][2] = -y;
    }
    let (y, z) = (m.y, m.z);
    m.y = z;
    m.z = -y;
    m
}

/// Roll a bone-convention matrix (front = Y+) into front = X+.
///
/// The first and third basis vectors swap with a negation, then the first
/// and second do, and the position's x/y swap with a negation. This is not
/// the same remap as `to_target_basis`: bones and objects arrive in different
/// conventions.
pub fn bone_axis_roll(m: &Matrix4<f64>) -> Matrix4<f64> {
    let mut m = *m;
    for r in 0..3 {
        let (x, z) = (m[0][r], m[2][r]);
        m[0][r] = z;
        m[2][r] = -x;
    }
    let (x, y) = (m.x, m.y);
    m.x = y;
    m.y = -x;
    let (tx, ty) = (m.w.x, m.w.y);
    m.w.x = ty;
    m.w.y = -tx;
    m
}

/// Inverse of `m`, or of a slightly perturbed `m` when it's singular.
///
/// For example, if an object is scaled to zero (to eg. hide it for some
/// portion of an animation) this still returns something usable as the
/// inverse of a parent matrix.
pub fn inverted_safe(m: &Matrix4<f64>) -> Matrix4<f64> {
    if let Some(inv) = m.invert() {
        return inv;
    }

    // Try making the matrix invertible by bumping it slightly along the
    // diagonal.
    for &epsilon in &[0.000001, 0.00001, 0.0001, 0.001f64] {
        let m2 = m + Matrix4::from_scale(epsilon);
        if let Some(inv) = m2.invert() {
            return inv;
        }
    }

    warn!("found singular parent matrix; proceeding with the identity");
    debug!("namely, the matrix {:#?}", m);
    Matrix4::one()
}

/// How rotations are decomposed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RotationMode {
    Euler,
    Quaternion,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Rotation {
    /// XYZ Euler angles in degrees.
    EulerDegrees(Vector3<f64>),
    Quaternion(Quaternion<f64>),
}

impl Rotation {
    /// Components in file order: XYZ, or WXYZ for quaternions.
    pub fn to_vec(&self) -> Vec<f64> {
        match *self {
            Rotation::EulerDegrees(v) => vec![v.x, v.y, v.z],
            Rotation::Quaternion(q) => vec![q.s, q.v.x, q.v.y, q.v.z],
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Decomposed {
    pub scale: Vector3<f64>,
    pub rotation: Rotation,
    pub translation: Vector3<f64>,
}

/// Split an affine matrix into scale, rotation and translation.
pub fn decompose(m: &Matrix4<f64>, mode: RotationMode) -> Decomposed {
    let scale = to_scale(m);
    let rot = normalized_rotation(m);
    let rotation = match mode {
        RotationMode::Euler => Rotation::EulerDegrees(euler_degrees(&rot)),
        // The quaternion is taken from the transposed rotation.
        RotationMode::Quaternion => Rotation::Quaternion(Quaternion::from(rot.transpose())),
    };
    Decomposed { scale, rotation, translation: to_translation(m) }
}

/// Scale, Euler rotation and translation of `m` as an `Srt`.
pub fn to_srt(m: &Matrix4<f64>) -> Srt {
    let rot = normalized_rotation(m);
    Srt {
        scale: to_scale(m),
        rotation: euler_degrees(&rot),
        translation: to_translation(m),
    }
}

pub fn to_scale(m: &Matrix4<f64>) -> Vector3<f64> {
    vec3(
        m.x.truncate().magnitude(),
        m.y.truncate().magnitude(),
        m.z.truncate().magnitude(),
    )
}

pub fn to_translation(m: &Matrix4<f64>) -> Vector3<f64> {
    m.w.truncate()
}

/// Upper 3x3 of `m` with the scale divided out of each basis vector.
fn normalized_rotation(m: &Matrix4<f64>) -> Matrix3<f64> {
    let normalize = |v: Vector3<f64>| {
        let len = v.magnitude();
        if len != 0.0 { v / len } else { v }
    };
    Matrix3::from_cols(
        normalize(m.x.truncate()),
        normalize(m.y.truncate()),
        normalize(m.z.truncate()),
    )
}

/// XYZ Euler angles (R = Rz Ry Rx) of a rotation matrix, in degrees.
///
/// There are two solutions away from gimbal lock; the one with the smaller
/// total angle is picked.
fn euler_degrees(m: &Matrix3<f64>) -> Vector3<f64> {
    let cy = m[0][0].hypot(m[0][1]);

    let (e1, e2) = if cy > 16.0 * ::std::f32::EPSILON as f64 {
        let e1 = vec3(
            m[1][2].atan2(m[2][2]),
            (-m[0][2]).atan2(cy),
            m[0][1].atan2(m[0][0]),
        );
        let e2 = vec3(
            (-m[1][2]).atan2(-m[2][2]),
            (-m[0][2]).atan2(-cy),
            (-m[0][1]).atan2(-m[0][0]),
        );
        (e1, e2)
    } else {
        let e1 = vec3(
            (-m[2][1]).atan2(m[1][1]),
            (-m[0][2]).atan2(cy),
            0.0,
        );
        (e1, e1)
    };

    let total = |e: Vector3<f64>| e.x.abs() + e.y.abs() + e.z.abs();
    let e = if total(e1) > total(e2) { e2 } else { e1 };

    let deg = |r: f64| Deg::from(Rad(r)).0;
    vec3(deg(e.x), deg(e.y), deg(e.z))
}

#[cfg(test)]
fn assert_close(a: &Matrix4<f64>, b: &Matrix4<f64>) {
    let a: &[f64; 16] = a.as_ref();
    let b: &[f64; 16] = b.as_ref();
    for i in 0..16 {
        assert!((a[i] - b[i]).abs() < 1e-9, "{:?} != {:?}", a, b);
    }
}

#[cfg(test)]
fn assert_vec_close(a: Vector3<f64>, b: Vector3<f64>) {
    assert!((a - b).magnitude() < 1e-6, "{:?} != {:?}", a, b);
}

#[test]
fn test_target_basis_maps_axes() {
    // A translation along +Z (up) ends up along +Y.
    let m = to_target_basis(&Matrix4::from_translation(vec3(0.0, 0.0, 1.0)));
    assert_vec_close(to_translation(&m), vec3(0.0, 1.0, 0.0));
    // +Y goes to -Z.
    let m = to_target_basis(&Matrix4::from_translation(vec3(0.0, 1.0, 0.0)));
    assert_vec_close(to_translation(&m), vec3(0.0, 0.0, -1.0));
    // It's a change of basis, so the identity is preserved.
    assert_close(&to_target_basis(&Matrix4::one()), &Matrix4::one());
}

#[test]
fn test_target_basis_is_not_an_involution() {
    let m = Matrix4::from_translation(vec3(1.0, 2.0, 3.0))
        * Matrix4::from_angle_x(Rad(0.3))
        * Matrix4::from_angle_z(Rad(1.1));
    let once = to_target_basis(&m);
    let twice = to_target_basis(&once);
    assert_vec_close(to_translation(&twice), vec3(1.0, -2.0, -3.0));
    let diff = twice - m;
    let d: &[f64; 16] = diff.as_ref();
    assert!(d.iter().any(|x| x.abs() > 1e-3));
}

#[test]
fn test_conversion_commutes_with_composition() {
    // Converting each matrix once and composing equals converting the
    // composition once, which is what the traversal relies on.
    let parent = Matrix4::from_translation(vec3(1.0, 0.0, 2.0)) * Matrix4::from_angle_z(Rad(0.7));
    let child = Matrix4::from_translation(vec3(0.0, 3.0, 0.0)) * Matrix4::from_angle_y(Rad(-0.4));
    let relative = inverted_safe(&parent) * child;
    let a = to_target_basis(&relative);
    let b = inverted_safe(&to_target_basis(&parent)) * to_target_basis(&child);
    assert_close(&a, &b);
}

#[test]
fn test_bone_axis_roll() {
    let m = bone_axis_roll(&Matrix4::one());
    assert_vec_close(m.x.truncate(), vec3(0.0, 1.0, 0.0));
    assert_vec_close(m.y.truncate(), vec3(0.0, 0.0, -1.0));
    assert_vec_close(m.z.truncate(), vec3(-1.0, 0.0, 0.0));

    let m = bone_axis_roll(&Matrix4::from_translation(vec3(1.0, 2.0, 3.0)));
    assert_vec_close(to_translation(&m), vec3(2.0, -1.0, 3.0));
    assert!(bone_axis_roll(&Matrix4::one()) != to_target_basis(&Matrix4::one()));
}

#[test]
fn test_inverted_safe_singular() {
    let m = Matrix4::from_scale(0.0);
    let inv = inverted_safe(&m);
    assert!(inv.x.x.is_finite());
}

#[test]
fn test_decompose() {
    let m = Matrix4::from_translation(vec3(1.0, 2.0, 3.0))
        * Matrix4::from_angle_z(Rad(::std::f64::consts::FRAC_PI_2))
        * Matrix4::from_nonuniform_scale(2.0, 3.0, 4.0);

    let srt = to_srt(&m);
    assert_vec_close(srt.scale, vec3(2.0, 3.0, 4.0));
    assert_vec_close(srt.rotation, vec3(0.0, 0.0, 90.0));
    assert_vec_close(srt.translation, vec3(1.0, 2.0, 3.0));

    let d = decompose(&m, RotationMode::Euler);
    assert_eq!(d.rotation.to_vec().len(), 3);

    let d = decompose(&m, RotationMode::Quaternion);
    let q = match d.rotation {
        Rotation::Quaternion(q) => q,
        _ => panic!(),
    };
    // Transposed rotation: -90 degrees about Z.
    let half = ::std::f64::consts::FRAC_PI_4;
    let sign = q.s.signum();
    assert!((q.s * sign - half.cos()).abs() < 1e-9);
    assert!((q.v.z * sign + half.sin()).abs() < 1e-9);
    assert_eq!(d.rotation.to_vec().len(), 4);
}

#[test]
fn test_euler_round_trip() {
    let angles = vec3(20.0, -35.0, 110.0f64);
    let m = Matrix4::from_angle_z(Deg(angles.z))
        * Matrix4::from_angle_y(Deg(angles.y))
        * Matrix4::from_angle_x(Deg(angles.x));
    assert_vec_close(to_srt(&m).rotation, angles);
}
