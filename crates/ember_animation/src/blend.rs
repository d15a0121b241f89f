use crate::joint::JointTransform;

/// Weighted blend of two poses into `out`.
///
/// Translation and scale are plain weighted sums, `a * a_weight +
/// b * b_weight * mask[i]`. Weights need not sum to one, which allows fades and
/// additive layering. Rotations are summed the same way with `b`'s weight
/// negated whenever the two quaternions lie in opposite hemispheres, then
/// normalized.
///
/// `mask` scales `b`'s influence per joint; missing entries count as `1.0`.
/// Only `min(a.len(), b.len(), out.len())` joints are written.
///
/// A joint whose total rotation weight is zero normalizes a zero quaternion;
/// the result is not finite.
pub fn blend_poses(
    a: &[JointTransform],
    a_weight: f32,
    b: &[JointTransform],
    b_weight: f32,
    mask: Option<&[f32]>,
    out: &mut [JointTransform],
) {
    for (i, ((ja, jb), o)) in a.iter().zip(b).zip(out.iter_mut()).enumerate() {
        let mask_weight = mask.and_then(|m| m.get(i)).copied().unwrap_or(1.0);
        let wb = b_weight * mask_weight;

        let sign = if ja.rotation.dot(jb.rotation) >= 0.0 { 1.0 } else { -1.0 };
        let rotation = ja.rotation * a_weight + jb.rotation * (wb * sign);

        *o = JointTransform {
            translation: ja.translation * a_weight + jb.translation * wb,
            rotation: rotation.normalize(),
            scale: ja.scale * a_weight + jb.scale * wb,
        };
    }
}
