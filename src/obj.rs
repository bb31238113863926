use std::path::Path;

use glam::{Vec2, Vec3};

use crate::math::{flat_normal, safe_normalize, tangent_basis};

/// Triangulated OBJ contents, one entry per triangle corner (all arrays share
/// the same length, always a multiple of 3). `indices` is a plain 0..N ramp
/// for callers that want an indexed draw; the scene builder consumes the flat
/// arrays directly.
#[derive(Debug, Clone, Default)]
pub struct ObjMesh {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub tangents: Vec<Vec3>,
    pub bitangents: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl ObjMesh {
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn load<P: AsRef<Path>>(path: P, compute_tangents: bool) -> Result<Self, String> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to open {}: {}", path.display(), e))?;

        let mesh = parse_obj(&text, compute_tangents);
        if mesh.positions.is_empty() {
            return Err(format!("{} produced 0 triangles", path.display()));
        }

        log::info!(
            "loaded {} ({} corners, {} tris)",
            path.display(),
            mesh.positions.len(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }
}

// One corner reference out of a face line. 0 means "not given".
#[derive(Clone, Copy)]
struct FaceVert {
    v: i32,
    vt: i32,
    vn: i32,
}

// OBJ: 1-based positive indices, negative indices relative to the end.
// Returns None for 0 or anything resolving outside the array.
fn resolve_index(idx: i32, count: usize) -> Option<usize> {
    let resolved = if idx > 0 {
        idx as i64 - 1
    } else if idx < 0 {
        count as i64 + idx as i64
    } else {
        return None;
    };
    if resolved < 0 || resolved >= count as i64 {
        return None;
    }
    Some(resolved as usize)
}

// Formats: v, v/vt, v//vn, v/vt/vn. A missing or unparseable position index
// leaves v at 0, which later invalidates every fan triangle touching this
// corner (the corner stays in the fan; it is not removed from the face).
fn parse_face_vert(token: &str) -> FaceVert {
    let mut parts = token.splitn(3, '/');
    let v = parts.next().and_then(|s| s.parse::<i32>().ok()).unwrap_or(0);
    let vt = parts
        .next()
        .and_then(|s| if s.is_empty() { None } else { s.parse::<i32>().ok() })
        .unwrap_or(0);
    let vn = parts
        .next()
        .and_then(|s| if s.is_empty() { None } else { s.parse::<i32>().ok() })
        .unwrap_or(0);

    FaceVert { v, vt, vn }
}

fn parse_floats(rest: &str, out: &mut [f32]) -> bool {
    let mut it = rest.split_whitespace();
    for slot in out.iter_mut() {
        match it.next().and_then(|s| s.parse::<f32>().ok()) {
            Some(f) => *slot = f,
            None => return false,
        }
    }
    true
}

/// Parse OBJ text into flat corner arrays. Malformed lines are skipped, not
/// fatal; unknown directives (o/g/s/usemtl/mtllib) are ignored. N-gon faces
/// are fan-triangulated from the first corner. The V texture coordinate is
/// negated on ingestion to match the renderer's UV orientation.
pub fn parse_obj(text: &str, compute_tangents: bool) -> ObjMesh {
    let mut temp_pos: Vec<Vec3> = Vec::new();
    let mut temp_uv: Vec<Vec2> = Vec::new();
    let mut temp_nrm: Vec<Vec3> = Vec::new();

    let mut mesh = ObjMesh::default();

    for raw_line in text.lines() {
        let line = raw_line.trim_start_matches([' ', '\t']);
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("v ").or_else(|| line.strip_prefix("v\t")) {
            let mut f = [0.0f32; 3];
            if parse_floats(rest, &mut f) {
                temp_pos.push(Vec3::from_array(f));
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("vt ").or_else(|| line.strip_prefix("vt\t")) {
            let mut f = [0.0f32; 2];
            if parse_floats(rest, &mut f) {
                // invert V, matching the renderer's texture orientation
                temp_uv.push(Vec2::new(f[0], -f[1]));
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("vn ").or_else(|| line.strip_prefix("vn\t")) {
            let mut f = [0.0f32; 3];
            if parse_floats(rest, &mut f) {
                temp_nrm.push(safe_normalize(Vec3::from_array(f)));
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("f ").or_else(|| line.strip_prefix("f\t")) {
            let mut face: Vec<FaceVert> = Vec::new();
            for token in rest.split_whitespace() {
                if token.starts_with('#') {
                    break;
                }
                face.push(parse_face_vert(token));
            }
            if face.len() < 3 {
                continue;
            }

            // Fan triangulation: (0, i, i+1).
            for i in 1..face.len() - 1 {
                emit_triangle(
                    &mut mesh,
                    [face[0], face[i], face[i + 1]],
                    &temp_pos,
                    &temp_uv,
                    &temp_nrm,
                    compute_tangents,
                );
            }
            continue;
        }

        // anything else: o, g, s, usemtl, mtllib, ...
    }

    mesh
}

fn emit_triangle(
    mesh: &mut ObjMesh,
    corners: [FaceVert; 3],
    temp_pos: &[Vec3],
    temp_uv: &[Vec2],
    temp_nrm: &[Vec3],
    compute_tangents: bool,
) {
    let mut pos = [Vec3::ZERO; 3];
    for (slot, fv) in pos.iter_mut().zip(corners.iter()) {
        match resolve_index(fv.v, temp_pos.len()) {
            Some(i) => *slot = temp_pos[i],
            None => return,
        }
    }

    let mut uvs = [Vec2::ZERO; 3];
    let mut has_uv = !temp_uv.is_empty() && corners.iter().all(|fv| fv.vt != 0);
    if has_uv {
        for (slot, fv) in uvs.iter_mut().zip(corners.iter()) {
            match resolve_index(fv.vt, temp_uv.len()) {
                Some(i) => *slot = temp_uv[i],
                None => {
                    has_uv = false;
                    break;
                }
            }
        }
    }
    if !has_uv {
        uvs = [Vec2::ZERO; 3];
    }

    // All-or-nothing per triangle: any missing normal reference replaces all
    // three corners with one flat normal.
    let mut normals = [Vec3::ZERO; 3];
    let mut has_vn = !temp_nrm.is_empty() && corners.iter().all(|fv| fv.vn != 0);
    if has_vn {
        for (slot, fv) in normals.iter_mut().zip(corners.iter()) {
            match resolve_index(fv.vn, temp_nrm.len()) {
                Some(i) => *slot = temp_nrm[i],
                None => {
                    has_vn = false;
                    break;
                }
            }
        }
    }
    if !has_vn {
        let n = flat_normal(pos[0], pos[1], pos[2]);
        normals = [n; 3];
    }

    let (tangent, bitangent) = if compute_tangents && has_uv {
        tangent_basis(pos[0], pos[1], pos[2], uvs[0], uvs[1], uvs[2])
    } else {
        (Vec3::X, Vec3::Y)
    };

    let base = mesh.positions.len() as u32;
    mesh.positions.extend_from_slice(&pos);
    mesh.uvs.extend_from_slice(&uvs);
    mesh.normals.extend_from_slice(&normals);
    mesh.tangents.extend_from_slice(&[tangent; 3]);
    mesh.bitangents.extend_from_slice(&[bitangent; 3]);
    mesh.indices.extend_from_slice(&[base, base + 1, base + 2]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_without_normals_gets_flat_normal() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = parse_obj(src, false);
        assert_eq!(mesh.triangle_count(), 1);
        let expected = flat_normal(mesh.positions[0], mesh.positions[1], mesh.positions[2]);
        for n in &mesh.normals {
            assert!((*n - expected).length() < 1e-6);
        }
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn quad_fans_into_two_triangles() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mesh = parse_obj(src, false);
        assert_eq!(mesh.triangle_count(), 2);
        // (1,2,3) then (1,3,4)
        assert_eq!(mesh.positions[0], Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(mesh.positions[1], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(mesh.positions[2], Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(mesh.positions[3], Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(mesh.positions[4], Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(mesh.positions[5], Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn face_with_zero_index_is_dropped() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 2 3\n";
        let mesh = parse_obj(src, false);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn negative_index_resolves_from_end() {
        let src = "v 0 0 0\nv 1 0 0\nv 5 6 7\nf 1 2 -1\n";
        let mesh = parse_obj(src, false);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.positions[2], Vec3::new(5.0, 6.0, 7.0));
    }

    #[test]
    fn out_of_range_index_drops_triangle() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n";
        let mesh = parse_obj(src, false);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn texture_v_is_negated() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0.25\nvt 1 0.5\nvt 0 1\nf 1/1 2/2 3/3\n";
        let mesh = parse_obj(src, false);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.uvs[0], Vec2::new(0.0, -0.25));
        assert_eq!(mesh.uvs[1], Vec2::new(1.0, -0.5));
    }

    #[test]
    fn declared_normals_are_normalized_and_kept() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 4\nf 1//1 2//1 3//1\n";
        let mesh = parse_obj(src, false);
        assert_eq!(mesh.normals[0], Vec3::Z);
    }

    #[test]
    fn partial_normal_refs_replace_whole_triangle_with_flat() {
        // One corner lacks a normal: the flat fallback wins for all three.
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 1 0 0\nf 1//1 2//1 3\n";
        let mesh = parse_obj(src, false);
        assert_eq!(mesh.triangle_count(), 1);
        for n in &mesh.normals {
            assert!((*n - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn tangents_computed_when_requested_and_uvs_present() {
        let src = "v 0 0 0\nv 2 0 0\nv 2 0 2\nvt 0 0\nvt 1 0\nvt 1 -1\nf 1/1 2/2 3/3\n";
        let mesh = parse_obj(src, true);
        // V negated on parse turns the ramp into increasing V along +Z.
        assert!((mesh.tangents[0] - Vec3::X).length() < 1e-6);
        assert!((mesh.bitangents[0] - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn comments_blank_lines_and_unknown_directives_are_ignored() {
        let src = "# header\n\no thing\ns off\nusemtl m\nv 0 0 0\n v 1 0 0\n\tv 0 1 0\nf 1 2 3\n";
        let mesh = parse_obj(src, false);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn malformed_vertex_line_is_skipped() {
        // "v 9 9" has too few fields and must not consume an index slot.
        let src = "v 9 9\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = parse_obj(src, false);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.positions[0], Vec3::ZERO);
    }

    #[test]
    fn invalid_corner_poisons_only_its_fan_triangles() {
        // Quad with a dead middle corner: fan (1,0,2) drops, (1,2,3) survives.
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 0 2 3\n";
        let mesh = parse_obj(src, false);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.positions[1], Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(ObjMesh::load("does_not_exist.obj", true).is_err());
    }

    #[test]
    fn five_sided_face_fans_into_three_triangles() {
        let src = "v 0 0 0\nv 1 0 0\nv 2 1 0\nv 1 2 0\nv 0 1 0\nf 1 2 3 4 5\n";
        let mesh = parse_obj(src, false);
        assert_eq!(mesh.triangle_count(), 3);
        // Every fan triangle shares the first corner.
        assert_eq!(mesh.positions[0], mesh.positions[3]);
        assert_eq!(mesh.positions[3], mesh.positions[6]);
    }
}
