//! Writes a `Document` as an XSI 0300txt file.
//!
//! Output is deterministic: frames come out in depth-first pre-order with
//! siblings in the order they were added, and every number is printed with
//! a fixed six decimals.

mod text;

use self::text::Text;
use crate::config::ExportOptions;
use crate::errors::Result;
use crate::util::SafeName;
use crate::xsi::{AnimationKey, Document, Envelope, Face, FrameId, Material, MaterialLibrary, Mesh, Srt};
use std::io::Write;

macro_rules! ln {
    ($t:expr, $($args:tt)*) => { $t.line(format_args!($($args)*))? };
}

macro_rules! open {
    ($t:expr, $($args:tt)*) => { $t.open(format_args!($($args)*))? };
}

pub fn write_document<W: Write>(doc: &Document, opts: &ExportOptions, w: W) -> Result<W> {
    let library = material_library(doc);
    let mut s = XsiWriter {
        t: Text::new(w),
        doc,
        library: &library,
        texture_root: opts.texture_root.as_ref().map(|s| s.as_str()),
    };
    s.write_xsi()?;
    Ok(s.t.into_inner())
}

/// Every material used in the document, in order of first use.
pub fn material_library(doc: &Document) -> MaterialLibrary {
    let mut library = MaterialLibrary::new();
    for mesh in doc.meshes() {
        for material in &mesh.face_materials {
            library.insert(material);
        }
    }
    library
}

/// Split a polygon into a triangle fan around its first corner.
fn fan(face: &Face) -> impl Iterator<Item = [u32; 3]> + '_ {
    (1..face.len().saturating_sub(1)).map(move |i| [face[0], face[i], face[i + 1]])
}

struct XsiWriter<'a, W: Write> {
    t: Text<W>,
    doc: &'a Document,
    library: &'a MaterialLibrary,
    texture_root: Option<&'a str>,
}

impl<'a, W: Write> XsiWriter<'a, W> {
    fn write_xsi(&mut self) -> Result<()> {
        let info = &self.doc.info;
        let t = &mut self.t;

        ln!(t, "xsi 0300txt 0032");
        t.blank()?;

        open!(t, "SI_FileInfo");
        ln!(t, "\"{}\",", info.source_name);
        ln!(t, "\"{}\",", info.user);
        ln!(t, "\"{}\",", info.date);
        ln!(t, "\"{}\",", info.application);
        t.close()?;
        t.blank()?;

        open!(t, "SI_Scene {}", SafeName(&info.scene_name));
        ln!(t, "\"FRAMES\",");
        ln!(t, "{:.6},", info.frame_start);
        ln!(t, "{:.6},", info.frame_end);
        ln!(t, "{:.6},", info.fps);
        t.close()?;
        t.blank()?;

        open!(t, "SI_CoordinateSystem coord");
        for x in &[1, 0, 1, 0, 2, 5] {
            ln!(t, "{},", x);
        }
        t.close()?;
        t.blank()?;

        open!(t, "SI_Angle");
        ln!(t, "0,");
        t.close()?;
        t.blank()?;

        open!(t, "SI_Ambience");
        for _ in 0..3 {
            ln!(t, "{:.6},", 0.0);
        }
        t.close()?;

        self.write_material_library()?;
        self.write_lights_and_cameras()?;

        for &root in self.doc.roots() {
            self.t.blank()?;
            self.write_model(root)?;
        }

        self.write_envelope_list()?;

        Ok(())
    }

    fn write_material_library(&mut self) -> Result<()> {
        let t = &mut self.t;

        open!(t, "SI_MaterialLibrary MATLIB-{}", SafeName(&self.doc.info.source_name));
        ln!(t, "{},", self.library.materials.len());
        for (i, material) in self.library.materials.iter().enumerate() {
            open!(t, "SI_Material {}", self.library.name(i));
            write_material_fields(t, material)?;
            t.close()?;
            t.blank()?;
        }
        t.close()?;

        Ok(())
    }

    fn write_lights_and_cameras(&mut self) -> Result<()> {
        let t = &mut self.t;

        for light in &self.doc.lights {
            t.blank()?;
            open!(t, "SI_Light {}", SafeName(&light.name));
            // Point light
            ln!(t, "0,");
            for x in &light.rgb {
                ln!(t, "{:.6},", x);
            }
            ln!(t, "{:.6},", light.position.x);
            ln!(t, "{:.6},", light.position.y);
            ln!(t, "{:.6},", light.position.z);
            t.close()?;
        }

        for camera in &self.doc.cameras {
            t.blank()?;
            open!(t, "SI_Camera {}", SafeName(&camera.name));
            for v in &[camera.position, camera.target] {
                ln!(t, "{:.6},", v.x);
                ln!(t, "{:.6},", v.y);
                ln!(t, "{:.6},", v.z);
            }
            ln!(t, "{:.6},", camera.roll);
            ln!(t, "{:.6},", camera.near_plane);
            ln!(t, "{:.6},", camera.far_plane);
            t.close()?;
        }

        Ok(())
    }

    fn write_model(&mut self, id: FrameId) -> Result<()> {
        let doc = self.doc;
        let frame = doc.frame(id);
        let name = SafeName(frame.name());

        open!(self.t, "SI_Model MDL-{}", name);

        if let Some(ref basepose) = frame.basepose {
            write_transform(&mut self.t, &format!("BASEPOSE-{}", name), basepose)?;
        }
        if let Some(ref srt) = frame.srt {
            write_transform(&mut self.t, &format!("SRT-{}", name), srt)?;
        }
        for key in &frame.animation_keys {
            write_animation_key(&mut self.t, key)?;
        }

        open!(self.t, "SI_Visibility");
        ln!(self.t, "1,");
        self.t.close()?;
        self.t.blank()?;

        if frame.is_bone {
            open!(self.t, "SI_Null {}", name);
            self.t.close()?;
            self.t.blank()?;
        }

        if let Some(ref mesh) = frame.mesh {
            self.write_texture_refs(frame.name(), mesh)?;
            let mesh_name = mesh.name.as_ref().map(|s| s.as_str()).unwrap_or(frame.name());
            self.write_mesh(mesh_name, mesh)?;
        }

        for &child in frame.children() {
            self.write_model(child)?;
        }

        self.t.close()?;
        self.t.blank()?;

        Ok(())
    }

    /// Global material and shader text for each textured material of the
    /// mesh.
    fn write_texture_refs(&mut self, frame_name: &str, mesh: &Mesh) -> Result<()> {
        if mesh.faces.is_empty() {
            return Ok(());
        }
        let (_, materials) = mesh.material_indices();
        for material in materials {
            let texture = match material.texture {
                Some(ref texture) => texture,
                None => continue,
            };
            let material_name = match self.library.name_of(material) {
                Some(name) => name,
                None => continue,
            };

            open!(self.t, "SI_GlobalMaterial");
            ln!(self.t, "\"{}\",", material_name);
            ln!(self.t, "\"NODE\",");
            self.t.close()?;
            self.t.blank()?;

            open!(self.t, "XSI_CustomPSet {}", SafeName(frame_name));
            ln!(self.t, "\"NODE\",");
            ln!(self.t, "1,");
            let path = self.relative_texture_path(texture);
            ln!(self.t, "\"Shader\",\"Text\",\"{}\",", path);
            self.t.close()?;
            self.t.blank()?;
        }
        Ok(())
    }

    /// The part of `path` after the texture root, when there is one.
    fn relative_texture_path<'p>(&self, path: &'p str) -> &'p str {
        let path = path.trim_start();
        let root = match self.texture_root {
            Some(root) if !root.is_empty() => root,
            _ => return path,
        };
        match path.find(root) {
            Some(i) => &path[i + root.len()..],
            None => {
                warn!("texture {:?} is not under {:?}, writing the full path", path, root);
                path
            }
        }
    }

    fn write_mesh(&mut self, name: &str, mesh: &Mesh) -> Result<()> {
        let t = &mut self.t;

        open!(t, "SI_Mesh MSH-{}", SafeName(name));

        if !mesh.vertices.is_empty() {
            open!(t, "SI_Shape SHP-{}-ORG", SafeName(name));
            let array_count = 1 +
                mesh.has_normals() as usize +
                mesh.has_colors() as usize +
                mesh.has_uvs() as usize;
            ln!(t, "{},", array_count);
            ln!(t, "\"ORDERED\",");
            t.blank()?;

            ln!(t, "{},", mesh.vertices.len());
            ln!(t, "\"POSITION\",");
            t.rows(&mesh.vertices, |w, v| write!(w, "{:.6},{:.6},{:.6}", v[0], v[1], v[2]))?;
            if mesh.has_normals() {
                ln!(t, "{},", mesh.normal_vertices.len());
                ln!(t, "\"NORMAL\",");
                t.rows(&mesh.normal_vertices, |w, v| write!(w, "{:.6},{:.6},{:.6}", v[0], v[1], v[2]))?;
            }
            if mesh.has_colors() {
                ln!(t, "{},", mesh.vertex_colors.len());
                ln!(t, "\"COLOR\",");
                t.rows(&mesh.vertex_colors, |w, c| write!(w, "{:.6},{:.6},{:.6},{:.6}", c[0], c[1], c[2], c[3]))?;
            }
            if mesh.has_uvs() {
                ln!(t, "{},", mesh.uv_vertices.len());
                ln!(t, "\"TEX_COORD_UV\",");
                t.rows(&mesh.uv_vertices, |w, uv| write!(w, "{:.6},{:.6}", uv[0], uv[1]))?;
            }
            t.close()?;
            t.blank()?;

            self.write_triangle_lists(name, mesh)?;
        }

        self.t.close()?;
        self.t.blank()?;

        Ok(())
    }

    /// One triangle list per material the mesh uses.
    fn write_triangle_lists(&mut self, name: &str, mesh: &Mesh) -> Result<()> {
        if mesh.faces.is_empty() {
            return Ok(());
        }

        let mut elements = vec![];
        if mesh.has_normals() { elements.push("NORMAL"); }
        if mesh.has_colors() { elements.push("COLOR"); }
        if mesh.has_uvs() { elements.push("TEX_COORD_UV"); }
        let elements = elements.join("|");

        // Faces without materials all go in one list.
        let (face_material, materials) = if mesh.face_materials.len() == mesh.faces.len() {
            mesh.material_indices()
        } else {
            (vec![0; mesh.faces.len()], vec![])
        };
        let list_count = materials.len().max(1);

        for m in 0..list_count {
            let faces: Vec<usize> = (0..mesh.faces.len())
                .filter(|&f| face_material[f] == m)
                .collect();
            let tris = |lane: &[Face]| -> Vec<[u32; 3]> {
                faces.iter()
                    .filter_map(|&f| lane.get(f))
                    .flat_map(|face| fan(face))
                    .collect()
            };

            let positions = tris(&mesh.faces);
            let t = &mut self.t;

            open!(t, "SI_TriangleList {}", SafeName(name));
            ln!(t, "{},", positions.len());
            ln!(t, "\"{}\",", elements);
            if let Some(material) = materials.get(m) {
                if let Some(material_name) = self.library.name_of(material) {
                    ln!(t, "\"{}\",", material_name);
                }
            }
            t.blank()?;

            let write_tri = |w: &mut Vec<u8>, tri: &[u32; 3]| write!(w, "{},{},{}", tri[0], tri[1], tri[2]);
            t.rows(&positions, write_tri)?;
            if mesh.has_normals() {
                t.rows(&tris(&mesh.normal_faces), write_tri)?;
            }
            if mesh.has_colors() {
                t.rows(&tris(&mesh.vertex_color_faces), write_tri)?;
            }
            if mesh.has_uvs() {
                t.rows(&tris(&mesh.uv_faces), write_tri)?;
            }

            t.close()?;
            t.blank()?;
        }

        Ok(())
    }

    fn write_envelope_list(&mut self) -> Result<()> {
        if !self.doc.is_skinned() {
            return Ok(());
        }
        let doc = self.doc;
        let t = &mut self.t;

        t.blank()?;
        open!(t, "SI_EnvelopeList {}", SafeName(&doc.info.scene_name));
        ln!(t, "{},", doc.envelope_count());
        for frame in doc.skinned_frames() {
            for envelope in &doc.frame(frame).envelopes {
                write_envelope(t, doc, frame, envelope)?;
            }
        }
        t.close()?;

        Ok(())
    }
}

fn write_material_fields<W: Write>(t: &mut Text<W>, m: &Material) -> Result<()> {
    for x in &m.diffuse {
        ln!(t, "{:.6},", x);
    }
    ln!(t, "{:.6},", m.hardness);
    for x in &m.specular {
        ln!(t, "{:.6},", x);
    }
    for x in &m.emissive {
        ln!(t, "{:.6},", x);
    }
    ln!(t, "{},", m.shading_type.index());
    for x in &m.ambient {
        ln!(t, "{:.6},", x);
    }

    if let Some(ref texture) = m.texture {
        open!(t, "SI_Texture2D");
        ln!(t, "\"{}\",", texture);
        for _ in 0..12 {
            ln!(t, "0,");
        }
        for _ in 0..20 {
            ln!(t, "{:.6},", 0.0);
        }
        ln!(t, "0,");
        for _ in 0..7 {
            ln!(t, "{:.6},", 0.0);
        }
        t.close()?;
        t.blank()?;
    }

    Ok(())
}

fn write_transform<W: Write>(t: &mut Text<W>, name: &str, srt: &Srt) -> Result<()> {
    open!(t, "SI_Transform {}", name);
    for v in &[srt.scale, srt.rotation, srt.translation] {
        ln!(t, "{:.6},", v.x);
        ln!(t, "{:.6},", v.y);
        ln!(t, "{:.6},", v.z);
    }
    t.close()?;
    t.blank()?;
    Ok(())
}

/// Key rows are `frame; size; v, v, v;;,` and the last row ends `;;;`.
fn write_animation_key<W: Write>(t: &mut Text<W>, key: &AnimationKey) -> Result<()> {
    open!(t, "SI_AnimationKey");
    ln!(t, "{},", key.key_type().index());
    ln!(t, "{},", key.keys().len());
    let last = key.keys().len().saturating_sub(1);
    for (i, &(frame, ref v)) in key.keys().iter().enumerate() {
        let values: Vec<String> = v.iter().map(|x| format!("{:.6}", x)).collect();
        let end = if i == last { ";" } else { "," };
        ln!(t, "{}; {}; {};;{}", frame, v.len(), values.join(", "), end);
    }
    t.close()?;
    t.blank()?;
    Ok(())
}

fn write_envelope<W: Write>(t: &mut Text<W>, doc: &Document, frame: FrameId, envelope: &Envelope) -> Result<()> {
    let name = SafeName(doc.frame(frame).name());
    open!(t, "SI_Envelope {}", name);
    ln!(t, "\"MDL-{}\",", name);
    ln!(t, "\"MDL-{}\",", SafeName(doc.frame(envelope.bone).name()));
    ln!(t, "{},", envelope.vertices.len());
    t.rows(&envelope.vertices, |w, &(vertex, weight)| write!(w, "{},{:.6}", vertex, weight))?;
    t.close()?;
    Ok(())
}

#[cfg(test)]
fn to_string(doc: &Document, opts: &ExportOptions) -> String {
    let out = write_document(doc, opts, vec![]).unwrap();
    String::from_utf8(out).unwrap()
}

#[cfg(test)]
fn cube() -> Mesh {
    use smallvec::SmallVec;

    let mut mesh = Mesh::new(Some("Box".to_string()));
    for &x in &[-1.0, 1.0] {
        for &y in &[-1.0, 1.0] {
            for &z in &[-1.0, 1.0] {
                mesh.vertices.push([x, y, z]);
            }
        }
    }
    let quads: [[u32; 4]; 6] = [
        [0, 1, 3, 2], [4, 6, 7, 5], [0, 4, 5, 1],
        [2, 3, 7, 6], [0, 2, 6, 4], [1, 5, 7, 3],
    ];
    mesh.faces = quads.iter().map(|q| SmallVec::from_slice(q)).collect();
    mesh.face_materials = vec![Material::default(); 6];
    mesh
}

#[test]
fn test_header() {
    let doc = Document::new(Default::default(), crate::config::DuplicateNames::Reject);
    let s = to_string(&doc, &ExportOptions::default());
    assert!(s.starts_with("xsi 0300txt 0032\n\nSI_FileInfo {\n\t\"scene\",\n\t\"unknown\",\n"));
    assert!(s.contains("SI_Scene Scene {\n\t\"FRAMES\",\n\t1.000000,\n\t1.000000,\n\t24.000000,\n}\n\n"));
    assert!(s.contains("SI_CoordinateSystem coord {\n\t1,\n\t0,\n\t1,\n\t0,\n\t2,\n\t5,\n}\n\n"));
    assert!(s.contains("SI_Angle {\n\t0,\n}\n\n"));
    assert!(s.contains("SI_Ambience {\n\t0.000000,\n\t0.000000,\n\t0.000000,\n}\n"));
    assert!(s.contains("SI_MaterialLibrary MATLIB-scene {\n\t0,\n}"));
    assert!(!s.contains("SI_EnvelopeList"));
}

#[test]
fn test_box_document() {
    let mut doc = Document::new(Default::default(), crate::config::DuplicateNames::Reject);
    let root = doc.add_frame(None, "Root").unwrap();
    doc.frame_mut(root).srt = Some(Srt::identity());
    let b = doc.add_frame(Some(root), "Box").unwrap();
    doc.frame_mut(b).srt = Some(Srt::identity());
    doc.frame_mut(b).mesh = Some(cube());

    let s = to_string(&doc, &ExportOptions::default());

    let order = [
        "\nSI_Model MDL-Root {\n",
        "\tSI_Transform SRT-Root {\n\t\t1.000000,",
        "\tSI_Model MDL-Box {\n",
        "\t\tSI_Mesh MSH-Box {\n",
        "\t\t\tSI_Shape SHP-Box-ORG {\n\t\t\t\t1,\n\t\t\t\t\"ORDERED\",\n\n\t\t\t\t8,\n\t\t\t\t\"POSITION\",\n",
        "\t\t\tSI_TriangleList Box {\n\t\t\t\t12,\n\t\t\t\t\"\",\n\t\t\t\t\"material0\",\n\n\t\t\t\t0,1,3,\n\t\t\t\t0,3,2,\n",
    ];
    let mut at = 0;
    for needle in &order {
        match s[at..].find(needle) {
            Some(i) => at += i + needle.len(),
            None => panic!("missing {:?} after byte {} in\n{}", needle, at, s),
        }
    }
    assert!(s.contains("SI_MaterialLibrary MATLIB-scene {\n\t1,\n\tSI_Material material0 {\n\t\t0.700000,"));
    assert_eq!(s.matches("SI_TriangleList").count(), 1);
    assert!(s.ends_with("\t}\n\n}\n\n"));
}

#[test]
fn test_names_are_sanitized() {
    let mut doc = Document::new(Default::default(), crate::config::DuplicateNames::Reject);
    let id = doc.add_frame(None, "My Object!").unwrap();
    doc.frame_mut(id).srt = Some(Srt::identity());
    doc.frame_mut(id).mesh = Some(Mesh { name: None, ..cube() });

    let s = to_string(&doc, &ExportOptions::default());
    assert!(s.contains("SI_Model MDL-My_Object_ {"));
    assert!(s.contains("SI_Transform SRT-My_Object_ {"));
    assert!(s.contains("SI_Mesh MSH-My_Object_ {"));
    assert!(s.contains("SI_Shape SHP-My_Object_-ORG {"));
    assert!(s.contains("SI_TriangleList My_Object_ {"));
    assert!(!s.contains("My Object!"));
}

#[test]
fn test_envelope_list() {
    let mut doc = Document::new(Default::default(), crate::config::DuplicateNames::Reject);
    let arm = doc.add_frame(None, "Armature").unwrap();
    let a = doc.add_frame(Some(arm), "A").unwrap();
    let b = doc.add_frame(Some(a), "B").unwrap();
    doc.frame_mut(a).is_bone = true;
    doc.frame_mut(b).is_bone = true;
    let body = doc.add_frame(Some(arm), "Body").unwrap();
    doc.frame_mut(body).mesh = Some(cube());

    let mut env = Envelope::new(a);
    env.add_weight(0, 50.0);
    env.add_weight(1, 100.0);
    doc.frame_mut(body).envelopes.push(env);
    let mut env = Envelope::new(b);
    env.add_weight(2, 75.0);
    doc.frame_mut(body).envelopes.push(env);

    let s = to_string(&doc, &ExportOptions::default());
    assert!(s.contains("SI_Null A {\n"));
    assert!(s.contains("\nSI_EnvelopeList Scene {\n\t2,\n"));
    assert!(s.contains(
        "\tSI_Envelope Body {\n\t\t\"MDL-Body\",\n\t\t\"MDL-A\",\n\t\t2,\n\t\t0,50.000000,\n\t\t1,100.000000,\n\n\t}\n"));
    assert!(s.contains("\t\t\"MDL-B\",\n\t\t1,\n\t\t2,75.000000,\n"));
    assert!(s.ends_with("\t}\n}\n"));
}

#[test]
fn test_animation_key_rows() {
    use crate::xsi::KeyType;

    let mut key = AnimationKey::new(KeyType::Translation);
    key.add_key(1, &[0.0, 1.0, 2.0]).unwrap();
    key.add_key(2, &[0.5, 1.0, 2.0]).unwrap();
    let mut t = Text::new(vec![]);
    write_animation_key(&mut t, &key).unwrap();
    let s = String::from_utf8(t.into_inner()).unwrap();
    assert_eq!(s, "SI_AnimationKey {\n\
        \t2,\n\
        \t2,\n\
        \t1; 3; 0.000000, 1.000000, 2.000000;;,\n\
        \t2; 3; 0.500000, 1.000000, 2.000000;;;\n\
        }\n\n");
}

#[test]
fn test_fan() {
    use smallvec::smallvec;

    let pentagon: Face = smallvec![4, 5, 6, 7, 8];
    let tris: Vec<[u32; 3]> = fan(&pentagon).collect();
    assert_eq!(tris, vec![[4, 5, 6], [4, 6, 7], [4, 7, 8]]);
    let tri: Face = smallvec![1, 2, 3];
    assert_eq!(fan(&tri).count(), 1);
    let line: Face = smallvec![1, 2];
    assert_eq!(fan(&line).count(), 0);
}

#[test]
fn test_texture_refs() {
    let mut doc = Document::new(Default::default(), crate::config::DuplicateNames::Reject);
    let id = doc.add_frame(None, "hull").unwrap();
    let mut mesh = cube();
    let textured = Material {
        texture: Some("C:\\game\\data\\tex\\hull.tga".to_string()),
        ..Material::default()
    };
    mesh.face_materials = vec![textured; 6];
    doc.frame_mut(id).mesh = Some(mesh);

    let opts = ExportOptions { texture_root: Some("data\\".to_string()), ..ExportOptions::default() };
    let s = to_string(&doc, &opts);
    assert!(s.contains("SI_Texture2D {\n\t\t\t\"C:\\game\\data\\tex\\hull.tga\",\n\t\t\t0,\n"));
    assert!(s.contains("SI_GlobalMaterial {\n\t\t\"material0\",\n\t\t\"NODE\",\n\t}\n\n"));
    assert!(s.contains("XSI_CustomPSet hull {\n\t\t\"NODE\",\n\t\t1,\n\t\t\"Shader\",\"Text\",\"tex\\hull.tga\",\n\t}\n\n"));

    // Not under the root: full path
    let opts = ExportOptions { texture_root: Some("other\\".to_string()), ..ExportOptions::default() };
    let s = to_string(&doc, &opts);
    assert!(s.contains("\"Shader\",\"Text\",\"C:\\game\\data\\tex\\hull.tga\","));
}
