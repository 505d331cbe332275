//! Host mesh data to XSI meshes.

use crate::config::ExportOptions;
use crate::host::{HostMaterial, MeshData, Property};
use crate::xsi::{Face, Material, Mesh, ShadingType};
use smallvec::SmallVec;

fn swap_axes(v: [f64; 3]) -> [f64; 3] {
    [v[0], v[2], -v[1]]
}

pub fn convert_mesh(data: &MeshData, name: String, opts: &ExportOptions) -> Mesh {
    let swap = |v: [f64; 3]| if opts.swap_mesh_axes { swap_axes(v) } else { v };

    let mut mesh = Mesh::new(Some(name));

    mesh.vertices = data.vertices.iter().cloned().map(swap).collect();
    mesh.faces = data.polygons.iter()
        .map(|p| SmallVec::from_slice(&p.vertices))
        .collect();

    // Everything per-loop goes in polygon order, so the loop faces just count
    // up from zero.
    let loops: Vec<usize> = data.polygons.iter()
        .flat_map(|p| p.loop_indices())
        .collect();
    let mut next = 0;
    let loop_faces: Vec<Face> = data.polygons.iter()
        .map(|p| {
            let n = p.vertices.len() as u32;
            let face: Face = (next..next + n).collect();
            next += n;
            face
        })
        .collect();

    mesh.normal_vertices = loops.iter()
        .map(|&l| swap(data.loop_normals.get(l).cloned().unwrap_or_default()))
        .collect();
    mesh.normal_faces = loop_faces.clone();

    match data.uv_layer {
        Some(ref uvs) if opts.export_mesh_uvmap => {
            mesh.uv_vertices = loops.iter()
                .map(|&l| uvs.get(l).cloned().unwrap_or_default())
                .collect();
            mesh.uv_faces = loop_faces.clone();
        }
        _ => (),
    }

    match data.color_layer {
        Some(ref colors) if opts.export_mesh_vertcolor => {
            mesh.vertex_colors = loops.iter()
                .map(|&l| colors.get(l).cloned().unwrap_or([1.0; 4]))
                .collect();
            mesh.vertex_color_faces = loop_faces.clone();
        }
        _ => (),
    }

    let materials: Vec<Material> = if opts.export_mesh_materials {
        data.materials.iter().map(convert_material).collect()
    } else {
        vec![]
    };
    if !materials.is_empty() {
        mesh.face_materials = data.polygons.iter()
            .map(|p| match materials.get(p.material_index) {
                Some(m) => m.clone(),
                None => {
                    warn!("polygon of mesh {:?} uses material slot {}, but there are only {}",
                        data.name, p.material_index, materials.len());
                    Material::default()
                }
            })
            .collect();
    } else if !opts.allow_mesh_with_no_material {
        warn!("mesh {:?} has no materials, adding default material", data.name);
        mesh.face_materials = vec![Material::default(); mesh.faces.len()];
    }

    mesh
}

/// Custom attributes on the host material override the defaults. A texture
/// that isn't given explicitly is taken from the first image node.
pub fn convert_material(host: &HostMaterial) -> Material {
    let mut mat = Material::default();

    let malformed = |key: &str, p: &Property| {
        warn!("material {:?}: ignoring malformed {:?} property {:?}", host.name, key, p);
    };

    for (key, p) in &host.properties {
        match (key.as_str(), p) {
            ("diffuse", &Property::Array(ref xs)) if xs.len() == 3 => {
                mat.diffuse = [xs[0], xs[1], xs[2], 1.0];
            }
            ("diffuse", &Property::Array(ref xs)) if xs.len() == 4 => {
                mat.diffuse = [xs[0], xs[1], xs[2], xs[3]];
            }
            ("specular", &Property::Array(ref xs)) if xs.len() == 3 => {
                mat.specular = [xs[0], xs[1], xs[2]];
            }
            ("ambient", &Property::Array(ref xs)) if xs.len() == 3 => {
                mat.ambient = [xs[0], xs[1], xs[2]];
            }
            ("emissive", &Property::Array(ref xs)) if xs.len() == 3 => {
                mat.emissive = [xs[0], xs[1], xs[2]];
            }
            ("hardness", &Property::Number(x)) => {
                mat.hardness = x;
            }
            ("shading_type", &Property::Number(x)) if x.fract() == 0.0 => {
                match ShadingType::from_index(x as i64) {
                    Some(ty) => mat.shading_type = ty,
                    None => malformed(key, p),
                }
            }
            ("texture", &Property::Str(ref path)) => {
                mat.texture = Some(path.clone());
            }
            ("diffuse", _) | ("specular", _) | ("ambient", _) | ("emissive", _) |
            ("hardness", _) | ("shading_type", _) | ("texture", _) => {
                malformed(key, p);
            }
            _ => (),
        }
    }

    if mat.texture.is_none() && host.use_nodes {
        mat.texture = host.image_textures.first().cloned();
    }

    mat
}

#[cfg(test)]
fn quad_mesh() -> MeshData {
    let mut data = MeshData {
        name: "Plane".to_string(),
        vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 2.0], [0.0, 1.0, 0.0], [2.0, 0.0, 0.0]],
        ..MeshData::default()
    };
    data.push_polygon(&[0, 1, 2, 3], 0);
    data.push_polygon(&[1, 4, 2], 1);
    data.loop_normals = vec![[0.0, 1.0, 0.0]; 7];
    data.uv_layer = Some((0..7).map(|i| [i as f64, 0.5]).collect());
    data
}

#[test]
fn test_convert_mesh() {
    let opts = ExportOptions::default();
    let mesh = convert_mesh(&quad_mesh(), "Plane".to_string(), &opts);

    // new y = old z, new z = -old y
    assert_eq!(mesh.vertices[2], [1.0, 2.0, -1.0]);
    assert_eq!(mesh.normal_vertices[0], [0.0, 0.0, -1.0]);
    assert_eq!(mesh.faces.len(), 2);
    assert_eq!(&mesh.faces[1][..], &[1, 4, 2]);
    assert_eq!(&mesh.normal_faces[1][..], &[4, 5, 6]);
    assert_eq!(mesh.uv_faces, mesh.normal_faces);
    assert_eq!(mesh.uv_vertices[5], [5.0, 0.5]);
    assert!(!mesh.has_colors());

    // No materials: one default per face.
    assert_eq!(mesh.face_materials, vec![Material::default(); 2]);

    let opts = ExportOptions {
        swap_mesh_axes: false,
        export_mesh_uvmap: false,
        allow_mesh_with_no_material: true,
        ..ExportOptions::default()
    };
    let mesh = convert_mesh(&quad_mesh(), "Plane".to_string(), &opts);
    assert_eq!(mesh.vertices[2], [1.0, 1.0, 2.0]);
    assert!(!mesh.has_uvs());
    assert!(mesh.face_materials.is_empty());
}

#[test]
fn test_face_materials_follow_slots() {
    let mut data = quad_mesh();
    let mut red = HostMaterial::default();
    red.properties.insert("diffuse".to_string(), Property::Array(vec![1.0, 0.0, 0.0]));
    data.materials = vec![HostMaterial::default(), red];

    let mesh = convert_mesh(&data, "Plane".to_string(), &ExportOptions::default());
    assert_eq!(mesh.face_materials[0], Material::default());
    assert_eq!(mesh.face_materials[1].diffuse, [1.0, 0.0, 0.0, 1.0]);

    // Slot out of range
    data.materials.truncate(1);
    let mesh = convert_mesh(&data, "Plane".to_string(), &ExportOptions::default());
    assert_eq!(mesh.face_materials.len(), 2);
}

#[test]
fn test_convert_material() {
    let mut host = HostMaterial::default();
    host.properties.insert("hardness".to_string(), Property::Number(50.0));
    host.properties.insert("shading_type".to_string(), Property::Number(1.0));
    host.properties.insert("specular".to_string(), Property::Array(vec![1.0, 1.0]));
    host.properties.insert("emissive".to_string(), Property::Array(vec![0.1, 0.2, 0.3]));
    host.properties.insert("unrelated".to_string(), Property::Str("x".to_string()));
    host.use_nodes = true;
    host.image_textures = vec!["C:\\game\\base\\tex\\hull.tga".to_string(), "other.tga".to_string()];

    let mat = convert_material(&host);
    assert_eq!(mat.hardness, 50.0);
    assert_eq!(mat.shading_type, ShadingType::Lambert);
    assert_eq!(mat.specular, Material::default().specular);
    assert_eq!(mat.emissive, [0.1, 0.2, 0.3]);
    assert_eq!(mat.texture.as_ref().map(|s| &s[..]), Some("C:\\game\\base\\tex\\hull.tga"));

    // An explicit texture wins over the node tree
    host.properties.insert("texture".to_string(), Property::Str("explicit.tga".to_string()));
    assert_eq!(convert_material(&host).texture.as_ref().map(|s| &s[..]), Some("explicit.tga"));

    host.properties.remove("texture");
    host.use_nodes = false;
    assert_eq!(convert_material(&host).texture, None);
}

#[test]
fn test_shading_type_must_be_whole() {
    let mut host = HostMaterial::default();
    host.properties.insert("shading_type".to_string(), Property::Number(1.5));
    assert_eq!(convert_material(&host).shading_type, Material::default().shading_type);

    host.properties.insert("shading_type".to_string(), Property::Number(9.0));
    assert_eq!(convert_material(&host).shading_type, Material::default().shading_type);

    host.properties.insert("shading_type".to_string(), Property::Number(3.0));
    assert_eq!(convert_material(&host).shading_type, ShadingType::Blinn);
}
