//! Stand-in meshes so empties and bones are visible in a viewer.

use crate::host::Bone;
use crate::xsi::{Face, Material, Mesh, DEFAULT_DIFFUSE};
use smallvec::SmallVec;

fn faces(list: &[&[u32]]) -> Vec<Face> {
    list.iter().map(|f| SmallVec::from_slice(f)).collect()
}

/// A small square pyramid pointing up the Z axis, for hardpoints and other
/// empties.
pub fn pointer_mesh(name: &str) -> Mesh {
    let s = 0.05;
    let mut mesh = Mesh::new(Some(name.to_string()));

    mesh.vertices = vec![
        [-s, -s, 0.0],
        [s, -s, 0.0],
        [-s, s, 0.0],
        [s, s, 0.0],
        [0.0, 0.0, 7.0 * s],
    ];
    mesh.faces = faces(&[&[0, 2, 3, 1], &[3, 2, 4], &[0, 1, 4], &[1, 3, 4], &[2, 0, 4]]);

    mesh.normal_vertices = mesh.vertices.clone();
    mesh.normal_faces = mesh.faces.clone();

    let white = Material::with_diffuse([1.0, 1.0, 1.0, 1.0]);
    mesh.face_materials = vec![white; mesh.faces.len()];

    mesh
}

/// The usual octahedral bone shape, pointing along the bone (Y+). Tinted with
/// the bone's color and slightly transparent.
pub fn bone_mesh(name: &str, bone: &Bone) -> Mesh {
    let radius = bone.length * 0.125;
    let base = bone.length * 0.20;
    let tip = bone.length;

    let rgb = bone.color.unwrap_or([DEFAULT_DIFFUSE[0], DEFAULT_DIFFUSE[1], DEFAULT_DIFFUSE[2]]);
    let material = Material::with_diffuse([rgb[0], rgb[1], rgb[2], 0.80]);

    let mut mesh = Mesh::new(Some(name.to_string()));

    mesh.vertices = vec![
        [-radius, base, -radius],
        [0.0, 0.0, 0.0],
        [radius, base, -radius],
        [-radius, base, radius],
        [radius, base, radius],
        [0.0, tip, 0.0],
    ];
    mesh.faces = faces(&[
        &[2, 4, 1],
        &[1, 3, 0],
        &[1, 4, 3],
        &[2, 1, 0],
        &[5, 3, 4],
        &[5, 2, 0],
        &[5, 0, 3],
        &[5, 4, 2],
    ]);

    // Flat normals, three corners per face.
    let face_normals = [
        [0.8, -0.6, 0.0],
        [-0.8, -0.6, 0.0],
        [0.0, -0.6, 0.8],
        [0.0, -0.6, -0.8],
        [0.0, 0.184289, 0.982872],
        [0.0, 0.184289, -0.982872],
        [-0.982872, 0.184289, 0.0],
        [0.982872, 0.184289, 0.0],
    ];
    mesh.normal_vertices = face_normals.iter()
        .flat_map(|&n| vec![n; 3])
        .collect();
    mesh.normal_faces = (0..8u32)
        .map(|i| SmallVec::from_slice(&[3 * i, 3 * i + 1, 3 * i + 2]))
        .collect();

    mesh.face_materials = vec![material; mesh.faces.len()];

    mesh
}

#[test]
fn test_pointer_mesh() {
    let mesh = pointer_mesh("hp_gun");
    assert_eq!(mesh.name.as_ref().map(|s| &s[..]), Some("hp_gun"));
    assert_eq!(mesh.vertices.len(), 5);
    assert_eq!(mesh.faces.len(), 5);
    assert_eq!(&mesh.faces[0][..], &[0, 2, 3, 1]);
    assert!((mesh.vertices[4][2] - 0.35).abs() < 1e-12);
    assert_eq!(mesh.face_materials.len(), 5);
    assert_eq!(mesh.face_materials[0].diffuse, [1.0, 1.0, 1.0, 1.0]);
}

#[test]
fn test_bone_mesh() {
    use cgmath::{Matrix4, One};

    let bone = Bone {
        name: "arm".to_string(),
        parent: None,
        children: vec![],
        matrix_local: Matrix4::one(),
        length: 2.0,
        color: Some([0.2, 0.4, 0.6]),
    };
    let mesh = bone_mesh("arm", &bone);
    assert_eq!(mesh.vertices[0], [-0.25, 0.4, -0.25]);
    assert_eq!(mesh.vertices[5], [0.0, 2.0, 0.0]);
    assert_eq!(mesh.normal_vertices.len(), 24);
    assert_eq!(mesh.normal_vertices[3], [-0.8, -0.6, 0.0]);
    assert_eq!(&mesh.normal_faces[7][..], &[21, 22, 23]);
    assert_eq!(mesh.face_materials[0].diffuse, [0.2, 0.4, 0.6, 0.8]);

    let plain = Bone { color: None, ..bone };
    assert_eq!(bone_mesh("arm", &plain).face_materials[0].diffuse, [0.7, 0.7, 0.7, 0.8]);
}
