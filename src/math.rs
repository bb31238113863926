use glam::{Vec2, Vec3};

/// Normalize with a fallback for zero-length input (degenerate normals
/// resolve to +Z rather than NaN).
pub fn safe_normalize(v: Vec3) -> Vec3 {
    let len2 = v.dot(v);
    if len2 < 1e-20 {
        return Vec3::Z;
    }
    v / len2.sqrt()
}

/// Flat normal of a triangle, edges taken from the first corner.
pub fn flat_normal(p0: Vec3, p1: Vec3, p2: Vec3) -> Vec3 {
    safe_normalize((p1 - p0).cross(p2 - p0))
}

/// Tangent/bitangent pair for a triangle with UVs, solved from the 2x2
/// UV-edge system. Displacing along the tangent follows increasing U on the
/// triangle plane, the bitangent increasing V. Degenerate UVs (determinant
/// under 1e-20) fall back to the world +X/+Y basis so mesh construction
/// never fails on bad UVs. Not orthogonalized against the normal.
pub fn tangent_basis(
    p0: Vec3,
    p1: Vec3,
    p2: Vec3,
    uv0: Vec2,
    uv1: Vec2,
    uv2: Vec2,
) -> (Vec3, Vec3) {
    let e1 = p1 - p0;
    let e2 = p2 - p0;
    let d_uv1 = uv1 - uv0;
    let d_uv2 = uv2 - uv0;

    let det = d_uv1.x * d_uv2.y - d_uv2.x * d_uv1.y;
    if det.abs() < 1e-20 {
        return (Vec3::X, Vec3::Y);
    }

    let f = 1.0 / det;
    let tangent = (e1 * d_uv2.y - e2 * d_uv1.y) * f;
    let bitangent = (-e1 * d_uv2.x + e2 * d_uv1.x) * f;

    (safe_normalize(tangent), safe_normalize(bitangent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_normalize_zero_falls_back_to_z() {
        assert_eq!(safe_normalize(Vec3::ZERO), Vec3::Z);
    }

    #[test]
    fn flat_normal_of_xy_triangle_points_up() {
        let n = flat_normal(Vec3::ZERO, Vec3::X, Vec3::Y);
        assert!((n - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn tangent_follows_u_direction() {
        // Triangle in the XZ plane, U mapped along +X, V along +Z.
        let p0 = Vec3::new(0.0, 0.0, 0.0);
        let p1 = Vec3::new(2.0, 0.0, 0.0);
        let p2 = Vec3::new(2.0, 0.0, 2.0);
        let (t, b) = tangent_basis(
            p0,
            p1,
            p2,
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
        );
        assert!((t - Vec3::X).length() < 1e-6);
        assert!((b - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn tangent_reproduces_world_edge_for_uv_aligned_edge() {
        // The edge p1-p0 carries a pure (1, 0) UV delta, so the tangent must
        // reproduce that edge direction up to normalization.
        let p0 = Vec3::new(1.0, 3.0, -2.0);
        let p1 = Vec3::new(4.0, 5.0, 0.5);
        let p2 = Vec3::new(0.0, 7.0, 1.0);
        let (t, _) = tangent_basis(
            p0,
            p1,
            p2,
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        );
        let edge = (p1 - p0).normalize();
        assert!((t - edge).length() < 1e-5);
    }

    #[test]
    fn degenerate_uvs_fall_back_to_world_axes() {
        let (t, b) = tangent_basis(
            Vec3::ZERO,
            Vec3::X,
            Vec3::Y,
            Vec2::ZERO,
            Vec2::ZERO,
            Vec2::ZERO,
        );
        assert_eq!(t, Vec3::X);
        assert_eq!(b, Vec3::Y);
    }
}
