//! Scene builder properties: range partitioning, determinism, and resilience
//! to missing props.

use glam::{Mat4, Vec3};
use neon_alley::obj::parse_obj;
use neon_alley::scene::builder::append_obj_mesh;
use neon_alley::scene::vertex::TEX_ASPHALT;
use neon_alley::scene::{build_scene, PropSet};

fn no_props() -> PropSet {
    PropSet::default()
}

#[test]
fn stream_is_whole_triangles() {
    let built = build_scene(&no_props());
    assert_eq!(built.vertices.len() % 3, 0);
}

#[test]
fn ranges_partition_the_stream() {
    let built = build_scene(&no_props());
    let r = built.ranges;

    // ground leads and is immediately followed by the casters
    assert_eq!(r.ground_first, 0);
    assert_eq!(r.casters_first, r.ground_first + r.ground_count);

    // steam sits after the shadow casters and inside the caster span
    assert_eq!(r.steam_first, r.casters_first + r.shadow_casters_count);
    assert!(r.shadow_casters_count <= r.casters_count);
    assert_eq!(r.casters_count, r.shadow_casters_count + r.steam_count);

    // the three ranges cover the whole stream exactly
    assert_eq!(
        (r.casters_first + r.casters_count) as usize,
        built.vertices.len()
    );
}

#[test]
fn rebuild_is_bit_identical() {
    let a = build_scene(&no_props());
    let b = build_scene(&no_props());
    assert_eq!(a.ranges, b.ranges);
    assert_eq!(a.vertices.len(), b.vertices.len());
    for (va, vb) in a.vertices.iter().zip(b.vertices.iter()) {
        assert_eq!(va, vb);
    }
}

#[test]
fn missing_props_still_yield_ground_and_casters() {
    let built = build_scene(&no_props());
    assert!(built.ranges.ground_count > 0);
    assert!(built.ranges.shadow_casters_count > 0);
    assert!(built.ranges.steam_count > 0);
}

#[test]
fn ground_quad_is_asphalt_at_z_zero() {
    let built = build_scene(&no_props());
    let r = built.ranges;
    let ground = &built.vertices[r.ground_first as usize..(r.ground_first + r.ground_count) as usize];
    assert_eq!(ground.len(), 6);
    for v in ground {
        assert_eq!(v.tex_id, TEX_ASPHALT);
        assert_eq!(v.position[2], 0.0);
        assert_eq!(v.position[3], 1.0);
    }
}

#[test]
fn steam_never_enters_the_shadow_caster_range() {
    let built = build_scene(&no_props());
    let r = built.ranges;
    let casters =
        &built.vertices[r.casters_first as usize..(r.casters_first + r.shadow_casters_count) as usize];
    assert!(casters.iter().all(|v| v.tex_id != 3.0));

    let steam = &built.vertices[r.steam_first as usize..(r.steam_first + r.steam_count) as usize];
    assert!(!steam.is_empty());
    assert!(steam.iter().all(|v| v.tex_id == 3.0));
}

#[test]
fn props_grow_only_the_caster_range() {
    let base = build_scene(&no_props());

    let tri = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n", true);
    let props = PropSet {
        trashcan: Some(tri),
        manhole: None,
    };
    let with_prop = build_scene(&props);

    assert_eq!(with_prop.ranges.ground_count, base.ranges.ground_count);
    assert_eq!(with_prop.ranges.steam_count, base.ranges.steam_count);
    // two trashcan placements, one triangle each
    assert_eq!(
        with_prop.ranges.shadow_casters_count,
        base.ranges.shadow_casters_count + 6
    );
}

#[test]
fn obj_placement_applies_the_rigid_transform() {
    let tri = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n", true);
    let mut out = Vec::new();
    let m = Mat4::from_translation(Vec3::new(10.0, -2.0, 5.0));
    append_obj_mesh(&mut out, &tri, m, Vec3::ONE, TEX_ASPHALT, false);

    assert_eq!(out.len(), 3);
    assert_eq!(out[0].position[..3], [10.0, -2.0, 5.0]);
    assert_eq!(out[1].position[..3], [11.0, -2.0, 5.0]);
    // translation leaves normals untouched
    assert!((Vec3::from_array(out[0].normal) - Vec3::Z).length() < 1e-6);
}

#[test]
fn forced_up_normals_flatten_prop_shading() {
    // A vertical triangle would normally shade sideways; ground decals force +Z.
    let tri = parse_obj("v 0 0 0\nv 1 0 0\nv 1 0 1\nf 1 2 3\n", true);
    let mut out = Vec::new();
    append_obj_mesh(&mut out, &tri, Mat4::IDENTITY, Vec3::ONE, TEX_ASPHALT, true);
    for v in &out {
        assert_eq!(v.normal, [0.0, 0.0, 1.0]);
    }
}
