//! Parametric quad emitters for the alley scene. Every generator is a pure
//! function over its parameters and the shared output stream; callers control
//! draw-range bookkeeping purely through emission order.

use glam::{Vec2, Vec3};

use crate::math::tangent_basis;
use crate::scene::vertex::{SceneVertex, TEX_STEAM};

const QUAD_UVS: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
];

pub fn push_tri(
    out: &mut Vec<SceneVertex>,
    p: [Vec3; 3],
    n: Vec3,
    col: Vec3,
    uv: [Vec2; 3],
    tex_id: f32,
    tangent: Vec3,
    bitangent: Vec3,
) {
    for i in 0..3 {
        out.push(SceneVertex {
            position: [p[i].x, p[i].y, p[i].z, 1.0],
            color: col.to_array(),
            normal: n.to_array(),
            uv: uv[i].to_array(),
            tex_id,
            tangent: tangent.to_array(),
            bitangent: bitangent.to_array(),
        });
    }
}

/// Two triangles (p0,p1,p2) and (p0,p2,p3), each with its own tangent basis
/// derived from its UVs.
pub fn append_quad(
    out: &mut Vec<SceneVertex>,
    p0: Vec3,
    p1: Vec3,
    p2: Vec3,
    p3: Vec3,
    n: Vec3,
    col: Vec3,
    uv: [Vec2; 4],
    tex_id: f32,
) {
    let (t1, b1) = tangent_basis(p0, p1, p2, uv[0], uv[1], uv[2]);
    push_tri(out, [p0, p1, p2], n, col, [uv[0], uv[1], uv[2]], tex_id, t1, b1);

    let (t2, b2) = tangent_basis(p0, p2, p3, uv[0], uv[2], uv[3]);
    push_tri(out, [p0, p2, p3], n, col, [uv[0], uv[2], uv[3]], tex_id, t2, b2);
}

// Six outward faces of an axis-aligned box spanning [x0,x1]x[y0,y1]x[z0,z1],
// in a fixed emission order shared by boxes, pipe prisms and ladder rungs.
fn append_box_faces(
    out: &mut Vec<SceneVertex>,
    x0: f32,
    x1: f32,
    y0: f32,
    y1: f32,
    z0: f32,
    z1: f32,
    col: Vec3,
    tex_id: f32,
) {
    let a = Vec3::new(x0, y0, z0);
    let b = Vec3::new(x0, y1, z0);
    let c = Vec3::new(x0, y1, z1);
    let d = Vec3::new(x0, y0, z1);

    let e = Vec3::new(x1, y0, z0);
    let f = Vec3::new(x1, y1, z0);
    let g = Vec3::new(x1, y1, z1);
    let h = Vec3::new(x1, y0, z1);

    append_quad(out, a, b, c, d, Vec3::new(-1.0, 0.0, 0.0), col, QUAD_UVS, tex_id);
    append_quad(out, e, h, g, f, Vec3::new(1.0, 0.0, 0.0), col, QUAD_UVS, tex_id);

    append_quad(out, a, d, h, e, Vec3::new(0.0, -1.0, 0.0), col, QUAD_UVS, tex_id);
    append_quad(out, b, f, g, c, Vec3::new(0.0, 1.0, 0.0), col, QUAD_UVS, tex_id);

    append_quad(out, a, e, f, b, Vec3::new(0.0, 0.0, -1.0), col, QUAD_UVS, tex_id);
    append_quad(out, d, c, g, h, Vec3::new(0.0, 0.0, 1.0), col, QUAD_UVS, tex_id);
}

/// Thin vertical pipe segment mounted on a wall plane at `x_plane`, nudged
/// 0.01 toward the alley interior. `on_left_wall` flips which side the body
/// extends to.
pub fn append_thin_pipe(
    out: &mut Vec<SceneVertex>,
    x_plane: f32,
    y_center: f32,
    z0: f32,
    z1: f32,
    r: f32,
    on_left_wall: bool,
    col: Vec3,
    tex_id: f32,
) {
    let x_in = x_plane + if on_left_wall { 0.01 } else { -0.01 };
    let x0 = x_in - if on_left_wall { 0.0 } else { r };
    let x1 = x_in + if on_left_wall { r } else { 0.0 };

    append_box_faces(out, x0, x1, y_center - r, y_center + r, z0, z1, col, tex_id);
}

/// Wall-mounted box with half-extents (sx, sy, sz), nudged 0.03 off the wall
/// plane to avoid z-fighting.
pub fn append_wall_box(
    out: &mut Vec<SceneVertex>,
    x_plane: f32,
    y_center: f32,
    z_center: f32,
    sx: f32,
    sy: f32,
    sz: f32,
    on_left_wall: bool,
    col: Vec3,
    tex_id: f32,
) {
    let x_in = x_plane + if on_left_wall { 0.03 } else { -0.03 };
    let x0 = x_in - if on_left_wall { 0.0 } else { sx };
    let x1 = x_in + if on_left_wall { sx } else { 0.0 };

    append_box_faces(
        out,
        x0,
        x1,
        y_center - sy,
        y_center + sy,
        z_center - sz,
        z_center + sz,
        col,
        tex_id,
    );
}

/// Two vertical rails plus evenly spaced rungs. Rung count scales with height
/// at one rung per 0.35 units, never fewer than 3.
pub fn append_wall_ladder(
    out: &mut Vec<SceneVertex>,
    x_plane: f32,
    y_center: f32,
    z0: f32,
    height: f32,
    width: f32,
    on_left_wall: bool,
    col: Vec3,
    tex_id: f32,
) {
    let rail_r = 0.02;
    let step_r = 0.015;

    let y_left = y_center - width * 0.5;
    let y_right = y_center + width * 0.5;

    append_thin_pipe(out, x_plane, y_left, z0, z0 + height, rail_r, on_left_wall, col, tex_id);
    append_thin_pipe(out, x_plane, y_right, z0, z0 + height, rail_r, on_left_wall, col, tex_id);

    let steps = ((height / 0.35) as i32).max(3);

    let x_in = x_plane + if on_left_wall { 0.03 } else { -0.03 };
    let x0 = x_in - if on_left_wall { 0.0 } else { step_r };
    let x1 = x_in + if on_left_wall { step_r } else { 0.0 };

    for i in 0..=steps {
        let z = z0 + height * i as f32 / steps as f32;
        append_box_faces(out, x0, x1, y_left, y_right, z - step_r, z + step_r, col, tex_id);
    }
}

/// Flat vent panel with two thin fastener pipes along its vertical edges.
pub fn append_wall_vent(
    out: &mut Vec<SceneVertex>,
    x_plane: f32,
    y_center: f32,
    z_center: f32,
    w: f32,
    h: f32,
    on_left_wall: bool,
    col: Vec3,
    tex_id: f32,
) {
    let x = x_plane + if on_left_wall { 0.02 } else { -0.02 };
    let n = if on_left_wall { Vec3::X } else { -Vec3::X };

    let p0 = Vec3::new(x, y_center - w * 0.5, z_center - h * 0.5);
    let p1 = Vec3::new(x, y_center + w * 0.5, z_center - h * 0.5);
    let p2 = Vec3::new(x, y_center + w * 0.5, z_center + h * 0.5);
    let p3 = Vec3::new(x, y_center - w * 0.5, z_center + h * 0.5);
    append_quad(out, p0, p1, p2, p3, n, col, QUAD_UVS, tex_id);

    let r = 0.015;
    let z_lo = z_center - h * 0.5;
    let z_hi = z_center + h * 0.5;
    append_thin_pipe(out, x_plane, y_center - w * 0.5, z_lo, z_hi, r, on_left_wall, col, tex_id);
    append_thin_pipe(out, x_plane, y_center + w * 0.5, z_lo, z_hi, r, on_left_wall, col, tex_id);
}

/// Sagging cable from `a` to `b` with a parabolic profile `z -= sag * 4t(1-t)`,
/// sampled at `segments` steps. Each segment is two perpendicular quads so the
/// cable reads as solid from any angle. Near-zero-length segments are skipped.
pub fn append_cable(
    out: &mut Vec<SceneVertex>,
    a: Vec3,
    b: Vec3,
    sag: f32,
    segments: u32,
    half_width: f32,
    col: Vec3,
    tex_id: f32,
) {
    let point_at = |t: f32| -> Vec3 {
        let mut p = a.lerp(b, t);
        p.z -= sag * 4.0 * t * (1.0 - t);
        p
    };

    let up = Vec3::Z;

    for i in 0..segments {
        let t0 = i as f32 / segments as f32;
        let t1 = (i + 1) as f32 / segments as f32;

        let pa = point_at(t0);
        let pb = point_at(t1);

        let dir = pb - pa;
        if dir.dot(dir) < 1e-10 {
            continue;
        }
        let dir = dir.normalize();

        let side = dir.cross(up);
        let side = if side.dot(side) < 1e-10 { Vec3::X } else { side.normalize() };

        let o = side * half_width;
        let p0 = pa - o;
        let p1 = pa + o;
        let p2 = pb + o;
        let p3 = pb - o;

        let n = (p1 - p0).cross(p3 - p0);
        let n = if n.dot(n) < 1e-10 { Vec3::Y } else { n.normalize() };
        append_quad(out, p0, p1, p2, p3, n, col, QUAD_UVS, tex_id);

        let side2 = dir.cross(side).normalize();
        let o2 = side2 * half_width;
        let q0 = pa - o2;
        let q1 = pa + o2;
        let q2 = pb + o2;
        let q3 = pb - o2;

        let n2 = (q1 - q0).cross(q3 - q0);
        let n2 = if n2.dot(n2) < 1e-10 { Vec3::X } else { n2.normalize() };
        append_quad(out, q0, q1, q2, q3, n2, col, QUAD_UVS, tex_id);
    }
}

/// Three fixed-rotation billboards forming one steam puff. The scalar
/// intensity rides in the color channel; the shader animates the rest.
pub fn append_steam_puff(
    out: &mut Vec<SceneVertex>,
    center: Vec3,
    height: f32,
    radius: f32,
    intensity: f32,
) {
    let col = Vec3::splat(intensity);

    let mut add_billboard = |ang: f32| {
        let right = Vec3::new(ang.cos(), ang.sin(), 0.0) * radius;
        let up = Vec3::new(0.0, 0.0, height);

        let p0 = center - right;
        let p1 = center + right;
        let p2 = center + right + up;
        let p3 = center - right + up;

        let n = Vec3::Y;
        let tangent = Vec3::X;
        let bitangent = Vec3::Z;

        push_tri(
            out,
            [p0, p1, p2],
            n,
            col,
            [QUAD_UVS[0], QUAD_UVS[1], QUAD_UVS[2]],
            TEX_STEAM,
            tangent,
            bitangent,
        );
        push_tri(
            out,
            [p0, p2, p3],
            n,
            col,
            [QUAD_UVS[0], QUAD_UVS[2], QUAD_UVS[3]],
            TEX_STEAM,
            tangent,
            bitangent,
        );
    };

    add_billboard(0.0);
    add_billboard(std::f32::consts::FRAC_PI_2);
    add_billboard(std::f32::consts::FRAC_PI_4);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::vertex::TEX_WALL;

    #[test]
    fn quad_emits_two_triangles() {
        let mut out = Vec::new();
        append_quad(
            &mut out,
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::Y,
            Vec3::Z,
            Vec3::ONE,
            QUAD_UVS,
            TEX_WALL,
        );
        assert_eq!(out.len(), 6);
        assert!(out.iter().all(|v| v.position[3] == 1.0));
    }

    #[test]
    fn wall_box_emits_six_faces() {
        let mut out = Vec::new();
        append_wall_box(&mut out, -2.2, 0.0, 1.0, 0.1, 0.1, 0.1, true, Vec3::ONE, TEX_WALL);
        assert_eq!(out.len(), 6 * 6);
    }

    #[test]
    fn ladder_rung_count_has_a_floor_of_three() {
        let mut short = Vec::new();
        append_wall_ladder(&mut short, -2.2, 0.0, 0.0, 0.2, 0.5, true, Vec3::ONE, TEX_WALL);
        // 2 rails + 4 rungs (steps=3 is inclusive of the top rung), 36 verts each
        assert_eq!(short.len(), (2 + 4) * 36);

        let mut tall = Vec::new();
        append_wall_ladder(&mut tall, -2.2, 0.0, 0.0, 3.5, 0.5, true, Vec3::ONE, TEX_WALL);
        // floor(3.5 / 0.35) = 10 steps -> 11 rungs
        assert_eq!(tall.len(), (2 + 11) * 36);
    }

    #[test]
    fn vent_is_one_panel_plus_two_fasteners() {
        let mut out = Vec::new();
        append_wall_vent(&mut out, 2.2, 0.0, 1.0, 0.8, 0.4, false, Vec3::ONE, TEX_WALL);
        assert_eq!(out.len(), 6 + 2 * 36);
    }

    #[test]
    fn zero_sag_cable_midpoint_lies_on_the_chord() {
        let a = Vec3::new(-2.0, -1.0, 3.0);
        let b = Vec3::new(2.0, 1.0, 3.4);
        let mut out = Vec::new();
        append_cable(&mut out, a, b, 0.0, 8, 0.02, Vec3::ONE, TEX_WALL);
        assert_eq!(out.len(), 8 * 12);

        // Segment 4 starts at t = 0.5; its leading edge midpoint must sit on
        // the straight A-B line.
        let seg = &out[4 * 12..5 * 12];
        let p0 = Vec3::from_slice(&seg[0].position[..3]);
        let p1 = Vec3::from_slice(&seg[1].position[..3]);
        let mid = (p0 + p1) * 0.5;
        let expect = a.lerp(b, 0.5);
        assert!((mid - expect).length() < 1e-5);
    }

    #[test]
    fn degenerate_cable_emits_nothing() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        let mut out = Vec::new();
        append_cable(&mut out, p, p, 0.0, 6, 0.02, Vec3::ONE, TEX_WALL);
        assert!(out.is_empty());
    }

    #[test]
    fn steam_puff_is_three_billboards_with_intensity_color() {
        let mut out = Vec::new();
        append_steam_puff(&mut out, Vec3::new(0.2, -2.6, 0.03), 2.2, 0.28, 0.9);
        assert_eq!(out.len(), 3 * 6);
        assert!(out.iter().all(|v| v.tex_id == TEX_STEAM));
        assert!(out.iter().all(|v| v.color == [0.9, 0.9, 0.9]));
    }
}
