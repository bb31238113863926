//! Assembles the whole alley into one flat vertex stream. Emission order is
//! the contract here: it is what defines the draw-range boundaries, so the
//! steps below must not be reordered.

use glam::{Mat3, Mat4, Vec2, Vec3};

use crate::obj::ObjMesh;
use crate::scene::shapes::*;
use crate::scene::vertex::{SceneVertex, TEX_ASPHALT, TEX_SIGN, TEX_WALL};

pub const ALLEY_HALF_WIDTH: f32 = 2.2;
pub const ALLEY_LENGTH: f32 = 10.0;
pub const WALL_HEIGHT: f32 = 6.0;

const QUAD_UVS: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
];

/// Named sub-ranges of the built stream, in vertices. The partition is the
/// load-bearing invariant of the builder:
/// ground | shadow casters | steam, each contiguous and in that order, with
/// `casters_count` spanning both casters and steam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneRanges {
    pub ground_first: u32,
    pub ground_count: u32,
    pub casters_first: u32,
    /// Casters only; excludes steam.
    pub shadow_casters_count: u32,
    pub steam_first: u32,
    pub steam_count: u32,
    /// Casters plus steam.
    pub casters_count: u32,
}

/// External props placed by the builder. A `None` slot means the asset was
/// missing at load time; its placements are skipped and the scene continues
/// with a gap.
#[derive(Default)]
pub struct PropSet {
    pub trashcan: Option<ObjMesh>,
    pub manhole: Option<ObjMesh>,
}

impl PropSet {
    /// Load the alley props from next to the executable. Failures are logged
    /// and degrade to an empty slot, never an error.
    pub fn load() -> Self {
        Self {
            trashcan: load_prop("trashcan.obj"),
            manhole: load_prop("manhole.obj"),
        }
    }
}

fn load_prop(path: &str) -> Option<ObjMesh> {
    match ObjMesh::load(path, true) {
        Ok(mesh) => Some(mesh),
        Err(e) => {
            log::warn!("prop unavailable: {}", e);
            None
        }
    }
}

pub struct BuiltScene {
    pub vertices: Vec<SceneVertex>,
    pub ranges: SceneRanges,
}

/// Append a loaded OBJ mesh under a rigid transform. Normals, tangents and
/// bitangents go through the inverse-transpose; tangent data is taken from
/// each triangle's first corner, matching the flat per-triangle bases the
/// loader produces. `force_up_normals` flattens shading for ground-decal
/// props like manholes.
pub fn append_obj_mesh(
    out: &mut Vec<SceneVertex>,
    mesh: &ObjMesh,
    model: Mat4,
    col: Vec3,
    tex_id: f32,
    force_up_normals: bool,
) {
    let normal_mat = Mat3::from_mat4(model).inverse().transpose();

    let tri_count = mesh.positions.len() / 3;
    for i in 0..tri_count {
        let p0 = model.transform_point3(mesh.positions[i * 3]);
        let p1 = model.transform_point3(mesh.positions[i * 3 + 1]);
        let p2 = model.transform_point3(mesh.positions[i * 3 + 2]);

        let n = if force_up_normals {
            Vec3::Z
        } else {
            (normal_mat * mesh.normals[i * 3]).normalize()
        };

        let mut uvs = [Vec2::ZERO; 3];
        if mesh.uvs.len() == mesh.positions.len() {
            uvs = [mesh.uvs[i * 3], mesh.uvs[i * 3 + 1], mesh.uvs[i * 3 + 2]];
        }

        let (mut tangent, mut bitangent) = (Vec3::X, Vec3::Y);
        if mesh.tangents.len() == mesh.positions.len()
            && mesh.bitangents.len() == mesh.positions.len()
        {
            tangent = (normal_mat * mesh.tangents[i * 3]).normalize();
            bitangent = (normal_mat * mesh.bitangents[i * 3]).normalize();
        }

        push_tri(out, [p0, p1, p2], n, col, uvs, tex_id, tangent, bitangent);
    }
}

/// Build the alley. Deterministic and idempotent: identical props yield a
/// bit-identical stream. The output buffer starts empty every call; there is
/// no incremental append mode.
pub fn build_scene(props: &PropSet) -> BuiltScene {
    let mut v: Vec<SceneVertex> = Vec::with_capacity(200_000);

    let half_w = ALLEY_HALF_WIDTH;
    let len = ALLEY_LENGTH;
    let wall_h = WALL_HEIGHT;

    let tint = Vec3::ONE;

    // 1) ground
    let ground_first = v.len() as u32;
    append_quad(
        &mut v,
        Vec3::new(-half_w, -len * 0.5, 0.0),
        Vec3::new(half_w, -len * 0.5, 0.0),
        Vec3::new(half_w, len * 0.5, 0.0),
        Vec3::new(-half_w, len * 0.5, 0.0),
        Vec3::Z,
        tint,
        QUAD_UVS,
        TEX_ASPHALT,
    );
    let ground_count = v.len() as u32 - ground_first;

    // 2) everything from here on is a caster
    let casters_first = v.len() as u32;

    // walls + end wall
    append_quad(
        &mut v,
        Vec3::new(-half_w, -len * 0.5, 0.0),
        Vec3::new(-half_w, len * 0.5, 0.0),
        Vec3::new(-half_w, len * 0.5, wall_h),
        Vec3::new(-half_w, -len * 0.5, wall_h),
        Vec3::X,
        tint,
        QUAD_UVS,
        TEX_WALL,
    );
    append_quad(
        &mut v,
        Vec3::new(half_w, len * 0.5, 0.0),
        Vec3::new(half_w, -len * 0.5, 0.0),
        Vec3::new(half_w, -len * 0.5, wall_h),
        Vec3::new(half_w, len * 0.5, wall_h),
        -Vec3::X,
        tint,
        QUAD_UVS,
        TEX_WALL,
    );
    append_quad(
        &mut v,
        Vec3::new(-half_w, len * 0.5, 0.0),
        Vec3::new(half_w, len * 0.5, 0.0),
        Vec3::new(half_w, len * 0.5, wall_h),
        Vec3::new(-half_w, len * 0.5, wall_h),
        -Vec3::Y,
        tint,
        QUAD_UVS,
        TEX_WALL,
    );

    // signage
    add_sign_left(&mut v, half_w, -2.0, 2.6, 1.6, 0.7);
    add_sign_left(&mut v, half_w, 1.5, 1.8, 1.2, 0.6);
    add_sign_right(&mut v, half_w, 0.5, 2.2, 1.8, 0.8);

    // props
    const TRASH_SCALE: f32 = 1.8;
    if let Some(ref trash) = props.trashcan {
        let mut place = |pos: Vec3, rot_z: f32| {
            let m = Mat4::from_translation(pos)
                * Mat4::from_rotation_z(rot_z)
                * Mat4::from_scale(Vec3::splat(TRASH_SCALE));
            append_obj_mesh(&mut v, trash, m, Vec3::splat(0.95), TEX_ASPHALT, false);
        };
        place(Vec3::new(-1.35, -3.2, 0.0), 0.6);
        place(Vec3::new(1.25, 1.3, 0.0), 2.9);
    }
    if let Some(ref manhole) = props.manhole {
        let mut place = |pos: Vec3, rot_z: f32| {
            // lifted 0.002 off the asphalt so the decal never z-fights
            let m = Mat4::from_translation(Vec3::new(0.0, 0.0, 0.002))
                * Mat4::from_translation(pos)
                * Mat4::from_rotation_z(rot_z);
            append_obj_mesh(&mut v, manhole, m, tint, TEX_ASPHALT, true);
        };
        place(Vec3::new(0.2, -2.6, 0.0), 0.4);
        place(Vec3::new(-0.6, 0.2, 0.0), 1.0);
    }

    // wall pipes
    {
        let pipe_col = Vec3::new(0.82, 0.88, 0.95);
        let r_thin = 0.03;
        let r_med = 0.05;

        append_thin_pipe(&mut v, -half_w, -3.8, 0.0, 3.7, r_thin, true, pipe_col, TEX_WALL);
        append_thin_pipe(&mut v, -half_w, -0.5, 0.0, 4.0, r_thin, true, pipe_col, TEX_WALL);
        append_thin_pipe(&mut v, -half_w, 2.2, 0.2, 3.2, r_thin, true, pipe_col, TEX_WALL);

        append_thin_pipe(&mut v, half_w, -2.4, 0.0, 3.6, r_thin, false, pipe_col, TEX_WALL);
        append_thin_pipe(&mut v, half_w, 0.8, 0.0, 4.1, r_thin, false, pipe_col, TEX_WALL);

        let box_col = Vec3::new(0.65, 0.7, 0.75);
        for i in 0..6 {
            append_wall_box(
                &mut v,
                -half_w,
                -1.5 + i as f32 * 0.35,
                3.2,
                0.04,
                0.12,
                0.04,
                true,
                box_col,
                TEX_WALL,
            );
        }
        append_wall_box(&mut v, -half_w, 0.7, 3.2, 0.06, 0.10, 0.06, true, box_col, TEX_WALL);

        append_thin_pipe(&mut v, half_w, -0.8, 0.3, 3.9, r_med, false, pipe_col, TEX_WALL);
    }

    // junction boxes
    {
        let box_col = Vec3::new(0.40, 0.42, 0.45);
        append_wall_box(&mut v, -half_w, -3.0, 2.8, 0.10, 0.18, 0.16, true, box_col, TEX_WALL);
        append_wall_box(&mut v, -half_w, 1.1, 2.2, 0.09, 0.15, 0.14, true, box_col, TEX_WALL);

        append_wall_box(&mut v, half_w, -1.7, 2.6, 0.10, 0.16, 0.16, false, box_col, TEX_WALL);
        append_wall_box(&mut v, half_w, 2.0, 2.9, 0.08, 0.14, 0.12, false, box_col, TEX_WALL);
    }

    // vents
    {
        let vent_col = Vec3::new(0.55, 0.55, 0.58);
        append_wall_vent(&mut v, -half_w, -0.2, 1.1, 0.9, 0.45, true, vent_col, TEX_WALL);
        append_wall_vent(&mut v, half_w, 1.5, 1.4, 0.7, 0.35, false, vent_col, TEX_WALL);
    }

    // ladder
    {
        let ladder_col = Vec3::new(0.35, 0.37, 0.40);
        append_wall_ladder(&mut v, -half_w, 3.4, 0.4, 3.3, 0.55, true, ladder_col, TEX_WALL);
    }

    // mounting brackets
    {
        let metal_col = Vec3::new(0.30, 0.32, 0.35);
        append_wall_box(&mut v, half_w, 0.25, 1.75, 0.05, 0.08, 0.03, false, metal_col, TEX_WALL);
        append_wall_box(&mut v, half_w, 0.75, 1.75, 0.05, 0.08, 0.03, false, metal_col, TEX_WALL);
        append_wall_box(&mut v, half_w, 0.50, 1.65, 0.05, 0.18, 0.03, false, metal_col, TEX_WALL);
    }

    // overhead + drooping cables
    {
        let cable_col = Vec3::new(0.22, 0.22, 0.25);
        let x_l = -half_w + 0.08;
        let x_r = half_w - 0.08;
        let hw = 0.022;

        append_cable(&mut v, Vec3::new(x_l, -1.8, 3.3), Vec3::new(x_r, -1.2, 3.1), 0.55, 18, hw, cable_col, TEX_WALL);
        append_cable(&mut v, Vec3::new(x_l, 0.4, 3.8), Vec3::new(x_r, 0.9, 3.7), 0.45, 18, hw, cable_col, TEX_WALL);
        append_cable(&mut v, Vec3::new(x_l, 2.6, 3.0), Vec3::new(x_r, 2.2, 3.2), 0.40, 16, hw, cable_col, TEX_WALL);

        append_cable(&mut v, Vec3::new(x_l, -3.2, 3.9), Vec3::new(x_r, -2.8, 3.8), 0.35, 16, hw, cable_col, TEX_WALL);
        append_cable(&mut v, Vec3::new(x_l, 1.8, 3.95), Vec3::new(x_r, 1.5, 3.9), 0.30, 14, hw, cable_col, TEX_WALL);

        append_cable(&mut v, Vec3::new(x_l, -3.0, 2.8), Vec3::new(x_l + 0.4, -3.2, 0.6), 0.25, 12, hw * 0.9, cable_col, TEX_WALL);
        append_cable(&mut v, Vec3::new(x_r, -1.7, 2.6), Vec3::new(x_r - 0.35, -1.9, 0.7), 0.25, 12, hw * 0.9, cable_col, TEX_WALL);
    }

    // 3) close the shadow-caster range before any steam goes in
    let shadow_casters_count = v.len() as u32 - casters_first;

    // 4) steam, excluded from shadow casting
    let steam_first = v.len() as u32;
    append_steam_puff(&mut v, Vec3::new(0.2, -2.6, 0.03), 2.2, 0.28, 1.0);
    append_steam_puff(&mut v, Vec3::new(-0.6, 0.2, 0.03), 1.8, 0.34, 0.9);
    let steam_count = v.len() as u32 - steam_first;

    // 5) full caster span (casters + steam)
    let casters_count = v.len() as u32 - casters_first;

    let ranges = SceneRanges {
        ground_first,
        ground_count,
        casters_first,
        shadow_casters_count,
        steam_first,
        steam_count,
        casters_count,
    };
    log::debug!("scene built: {} vertices, ranges {:?}", v.len(), ranges);

    BuiltScene { vertices: v, ranges }
}

fn add_sign_left(v: &mut Vec<SceneVertex>, half_w: f32, y: f32, z: f32, w: f32, h: f32) {
    let x = -half_w + 0.02;
    append_quad(
        v,
        Vec3::new(x, y - w * 0.5, z - h * 0.5),
        Vec3::new(x, y + w * 0.5, z - h * 0.5),
        Vec3::new(x, y + w * 0.5, z + h * 0.5),
        Vec3::new(x, y - w * 0.5, z + h * 0.5),
        Vec3::X,
        Vec3::ONE,
        QUAD_UVS,
        TEX_SIGN,
    );
}

fn add_sign_right(v: &mut Vec<SceneVertex>, half_w: f32, y: f32, z: f32, w: f32, h: f32) {
    let x = half_w - 0.02;
    append_quad(
        v,
        Vec3::new(x, y + w * 0.5, z - h * 0.5),
        Vec3::new(x, y - w * 0.5, z - h * 0.5),
        Vec3::new(x, y - w * 0.5, z + h * 0.5),
        Vec3::new(x, y + w * 0.5, z + h * 0.5),
        -Vec3::X,
        Vec3::ONE,
        QUAD_UVS,
        TEX_SIGN,
    );
}
