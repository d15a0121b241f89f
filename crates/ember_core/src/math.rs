//! TRS helpers shared by the transform hierarchy and skeletons.
//!
//! Matrices are glam's column-major `Mat4`; composition order is always
//! `T * R * S`.

use glam::{Mat3, Mat4, Quat, Vec3};

/// Builds `translate(t) * rotate(r) * scale(s)`.
#[inline]
#[must_use]
pub fn trs_matrix(translation: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, rotation, translation)
}

/// Splits an affine matrix into translation, rotation and scale.
///
/// Translation is the last column, scale the length of each basis column, and
/// rotation is read from the basis after dividing the scale out. Shear and
/// negative determinants are not recovered; a zero-length basis column yields
/// non-finite output.
#[must_use]
pub fn decompose_trs(m: &Mat4) -> (Vec3, Quat, Vec3) {
    let translation = m.w_axis.truncate();

    let c0 = m.x_axis.truncate();
    let c1 = m.y_axis.truncate();
    let c2 = m.z_axis.truncate();
    let scale = Vec3::new(c0.length(), c1.length(), c2.length());

    let basis = Mat3::from_cols(c0 / scale.x, c1 / scale.y, c2 / scale.z);
    let rotation = Quat::from_mat3(&basis);

    (translation, rotation, scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_3;

    #[test]
    fn trs_applies_scale_then_rotation_then_translation() {
        let m = trs_matrix(
            Vec3::new(1.0, 0.0, 0.0),
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            Vec3::splat(2.0),
        );
        // (1,0,0) -> scale (2,0,0) -> rotate (0,2,0) -> translate (1,2,0)
        let p = m.transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-5));
    }

    #[test]
    fn decompose_recovers_components() {
        let t = Vec3::new(3.0, -1.0, 0.5);
        let r = Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0).normalize(), FRAC_PI_3);
        let s = Vec3::new(1.5, 2.0, 0.5);

        let (dt, dr, ds) = decompose_trs(&trs_matrix(t, r, s));
        assert!(dt.abs_diff_eq(t, 1e-5));
        assert!(ds.abs_diff_eq(s, 1e-5));
        assert!(dr.angle_between(r) < 1e-3);
    }
}
