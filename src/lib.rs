//! Exports a 3-D scene (object hierarchy, meshes, armatures, skin weights
//! and sampled animation) as an XSI 0300txt file.
//!
//! The host application is reached through the traits in `host`. A scene is
//! first built into an `xsi::Document`, then serialized.

#![recursion_limit = "1024"] // for error_chain

#[macro_use]
extern crate log;
#[macro_use]
extern crate error_chain;

#[macro_use]
pub mod errors;
pub mod util;
pub mod xsi;
pub mod basis;
pub mod config;
pub mod host;
pub mod builder;
pub mod write;

use crate::config::ExportOptions;
use crate::errors::Result;
use crate::host::HostScene;
use std::io::Write;

/// Build the document for `scene` and write it to `out`.
pub fn export<S, W>(scene: &mut S, opts: &ExportOptions, out: W) -> Result<W>
where S: HostScene + ?Sized, W: Write {
    let doc = builder::build_document(scene, opts)?;
    write::write_document(&doc, opts, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportMode;
    use crate::host::snapshot::SceneSnapshot;
    use crate::host::*;
    use crate::xsi::{Document, Frame, KeyType, Srt};
    use cgmath::{InnerSpace, Matrix4, One, Rad, Vector3};

    fn export_to_string(scene: &mut SceneSnapshot, opts: &ExportOptions) -> String {
        let out = export(scene, opts, vec![]).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn build(scene: &mut SceneSnapshot, opts: &ExportOptions) -> Document {
        builder::build_document(scene, opts).unwrap()
    }

    fn frame<'a>(doc: &'a Document, name: &str) -> &'a Frame {
        doc.frame(doc.find_frame(name).unwrap())
    }

    fn srt(doc: &Document, name: &str) -> Srt {
        frame(doc, name).srt.unwrap()
    }

    fn bone(name: &str, parent: Option<BoneId>, matrix_local: Matrix4<f64>) -> Bone {
        Bone {
            name: name.to_string(),
            parent,
            children: vec![],
            matrix_local,
            length: 1.0,
            color: None,
        }
    }

    fn cube_data() -> MeshData {
        let mut data = MeshData { name: "Cube".to_string(), ..MeshData::default() };
        for &x in &[-1.0, 1.0] {
            for &y in &[-1.0, 1.0] {
                for &z in &[-1.0, 1.0] {
                    data.vertices.push([x, y, z]);
                }
            }
        }
        let quads: [[u32; 4]; 6] = [[0, 1, 3, 2], [4, 6, 7, 5], [0, 4, 5, 1], [2, 3, 7, 6], [0, 2, 6, 4], [1, 5, 7, 3]];
        for quad in &quads {
            data.push_polygon(quad, 0);
        }
        data.loop_normals = vec![[0.0, 0.0, 1.0]; 24];
        data
    }

    #[test]
    fn test_root_and_box() {
        let mut s = SceneSnapshot::new(SceneInfo {
            file_name: "/home/user/ships/fighter.blend".to_string(),
            frame_start: 1,
            frame_end: 1,
            ..SceneInfo::default()
        });
        let root = s.add_object("Root", ObjectKind::Empty, None, Matrix4::one());
        let bx = s.add_object("Box", ObjectKind::Mesh, Some(root), Matrix4::from_translation(Vector3::new(0.0, 2.0, 0.0)));
        s.set_mesh(bx, cube_data());
        s.current_frame = 7;

        // No roll, so only the basis change shows in the SRT.
        let opts = ExportOptions { axis_roll: false, ..ExportOptions::default() };
        let out = export_to_string(&mut s, &opts);

        assert!(out.starts_with("xsi 0300txt 0032\n\nSI_FileInfo {\n\t\"fighter\",\n"));
        assert!(out.contains("SI_MaterialLibrary MATLIB-fighter {\n\t1,\n\tSI_Material material0 {\n"));
        assert!(out.contains("\nSI_Model MDL-Root {\n\tSI_Transform SRT-Root {\n"));
        assert!(out.contains("\tSI_Model MDL-Box {\n"));
        assert!(out.contains("\t\tSI_Mesh MSH-Box {\n\t\t\tSI_Shape SHP-Box-ORG {\n\t\t\t\t2,\n"));
        assert!(out.contains("\t\t\t\t24,\n\t\t\t\t\"NORMAL\",\n"));
        assert!(out.contains("\t\t\tSI_TriangleList Box {\n\t\t\t\t12,\n\t\t\t\t\"NORMAL\",\n\t\t\t\t\"material0\",\n\n"));
        assert!(!out.contains("SI_EnvelopeList"));
        assert!(!out.contains("SI_AnimationKey"));

        // (0, 2, 0) is (0, 0, -2) after the basis change.
        let srt_box = out.find("SI_Transform SRT-Box {").unwrap();
        let block: Vec<&str> = out[srt_box..].lines().skip(1).take(9).map(|l| l.trim()).collect();
        assert_eq!(&block[..3], &["1.000000,", "1.000000,", "1.000000,"]);
        assert_eq!(&block[6..], &["0.000000,", "0.000000,", "-2.000000,"]);

        // The clock is back where it was.
        assert_eq!(s.current_frame, 7);
    }

    #[test]
    fn test_selected_export_mode() {
        let mut s = SceneSnapshot::new(SceneInfo::default());
        let a = s.add_object("A", ObjectKind::Empty, None, Matrix4::one());
        let b = s.add_object("B", ObjectKind::Empty, Some(a), Matrix4::one());
        s.add_object("C", ObjectKind::Empty, None, Matrix4::one());
        s.set_selected(a, true);
        s.set_selected(b, true);

        let opts = ExportOptions { export_mode: ExportMode::SelectedObjects, ..ExportOptions::default() };
        let out = export_to_string(&mut s, &opts);
        assert_eq!(out.matches("SI_Model MDL-A {").count(), 1);
        assert_eq!(out.matches("SI_Model MDL-B {").count(), 1);
        assert!(!out.contains("MDL-C"));
    }

    #[test]
    fn test_skinned_export() {
        let mut s = SceneSnapshot::new(SceneInfo::default());
        let rig = s.add_object("Rig", ObjectKind::Armature, None, Matrix4::one());
        let mut arm = Armature::default();
        let a = arm.add_bone(Bone {
            name: "A".to_string(),
            parent: None,
            children: vec![],
            matrix_local: Matrix4::one(),
            length: 1.0,
            color: None,
        });
        arm.add_bone(Bone {
            name: "B".to_string(),
            parent: Some(a),
            children: vec![],
            matrix_local: Matrix4::from_translation(Vector3::new(0.0, 1.0, 0.0)),
            length: 1.0,
            color: None,
        });
        s.set_armature(rig, arm);

        let body = s.add_object("Body", ObjectKind::Mesh, Some(rig), Matrix4::one());
        s.set_mesh(body, cube_data());
        s.add_armature_modifier(body, rig);
        s.set_vertex_groups(body, vec![
            VertexGroup { name: "A".to_string(), weights: vec![(0, 1.0), (1, 0.5)] },
            VertexGroup { name: "B".to_string(), weights: vec![(1, 0.5)] },
        ]);

        let out = export_to_string(&mut s, &ExportOptions::default());
        assert!(out.contains("SI_Null A {"));
        assert!(out.contains("SI_Null B {"));
        assert!(out.contains("SI_Transform BASEPOSE-Body {"));
        assert!(out.contains("SI_Transform BASEPOSE-B {"));
        assert!(out.contains("\nSI_EnvelopeList Scene {\n\t2,\n"));
        assert!(out.contains("\t\t\"MDL-Body\",\n\t\t\"MDL-A\",\n\t\t2,\n\t\t0,100.000000,\n\t\t1,50.000000,\n"));
        assert!(out.contains("\t\t\"MDL-Body\",\n\t\t\"MDL-B\",\n\t\t1,\n\t\t1,50.000000,\n"));
    }

    #[test]
    fn test_animated_export() {
        let mut s = SceneSnapshot::new(SceneInfo { frame_start: 1, frame_end: 3, ..SceneInfo::default() });
        let root = s.add_object("Root", ObjectKind::Empty, None, Matrix4::one());
        let mover = s.add_object("Mover", ObjectKind::Empty, Some(root), Matrix4::one());
        s.set_action(mover, Action {
            frame_range: (1.0, 3.0),
            fcurves: vec![FCurve { data_path: "location".to_string(), keyframes: vec![1.0, 3.0] }],
        });
        s.add_matrix_sample(mover, 2, Matrix4::from_translation(Vector3::new(1.0, 0.0, 0.0)));
        s.add_matrix_sample(mover, 3, Matrix4::from_translation(Vector3::new(2.0, 0.0, 0.0)));

        let out = export_to_string(&mut s, &ExportOptions::default());
        let start = out.find("\t\tSI_AnimationKey {\n").unwrap();
        let lines: Vec<&str> = out[start..].lines().skip(1).take(6).map(|l| l.trim()).collect();
        assert_eq!(&lines[..2], &["2,", "3,"]);
        assert!(lines[2].starts_with("1; 3; ") && lines[2].ends_with(";;,"));
        assert!(lines[3].starts_with("2; 3; ") && lines[3].ends_with(";;,"));
        assert!(lines[4].starts_with("3; 3; ") && lines[4].ends_with(";;;"));
        assert_eq!(lines[5], "}");

        // Rolled to X-front relative to the (rolled) root, then rebased.
        let last: Vec<f64> = lines[4]["3; 3; ".len()..lines[4].len() - 3]
            .split(", ")
            .map(|x| x.parse().unwrap())
            .collect();
        let expected = [-2.0, 0.0, 0.0];
        for i in 0..3 {
            assert!((last[i] - expected[i]).abs() < 1e-9, "{:?}", last);
        }
        assert_eq!(s.current_frame, 1);
    }

    #[test]
    fn test_duplicate_names_fail_export() {
        let mut s = SceneSnapshot::new(SceneInfo::default());
        let root = s.add_object("Root", ObjectKind::Empty, None, Matrix4::one());
        let rig = s.add_object("Rig", ObjectKind::Armature, Some(root), Matrix4::one());
        let mut arm = Armature::default();
        arm.add_bone(Bone {
            name: "Root".to_string(),
            parent: None,
            children: vec![],
            matrix_local: Matrix4::one(),
            length: 1.0,
            color: None,
        });
        s.set_armature(rig, arm);
        s.current_frame = 5;

        assert!(export(&mut s, &ExportOptions::default(), vec![]).is_err());
        assert_eq!(s.current_frame, 5);

        let opts = ExportOptions { duplicate_names: config::DuplicateNames::Rename, ..ExportOptions::default() };
        let out = export_to_string(&mut s, &opts);
        assert!(out.contains("SI_Model MDL-Root1 {"));
    }

    #[test]
    fn test_placement_helpers_get_identity() {
        let mut s = SceneSnapshot::new(SceneInfo::default());
        let root = s.add_object("Root", ObjectKind::Empty, None, Matrix4::one());
        let moved = Matrix4::from_translation(Vector3::new(3.0, 0.0, 0.0));
        s.add_object("mesh_root", ObjectKind::Empty, Some(root), moved);
        s.add_object("skeleton_root", ObjectKind::Empty, Some(root), moved);
        s.add_object("Other", ObjectKind::Empty, Some(root), moved);

        let doc = build(&mut s, &ExportOptions::default());
        assert_eq!(srt(&doc, "mesh_root"), Srt::identity());
        assert_eq!(srt(&doc, "skeleton_root"), Srt::identity());
        assert_ne!(srt(&doc, "Other"), Srt::identity());
    }

    #[test]
    fn test_root_transforms() {
        let mut s = SceneSnapshot::new(SceneInfo::default());
        s.add_object("Root", ObjectKind::Empty, None, Matrix4::from_translation(Vector3::new(0.0, 2.0, 0.0)));

        let doc = build(&mut s, &ExportOptions { axis_roll: false, ..ExportOptions::default() });
        assert_eq!(srt(&doc, "Root"), Srt::identity());

        let opts = ExportOptions { axis_roll: false, zero_root_transforms: false, ..ExportOptions::default() };
        let doc = build(&mut s, &opts);
        let t = srt(&doc, "Root").translation;
        assert!((t - Vector3::new(0.0, 0.0, -2.0)).magnitude() < 1e-9, "{:?}", t);
    }

    #[test]
    fn test_root_animation() {
        let mut s = SceneSnapshot::new(SceneInfo { frame_start: 1, frame_end: 3, ..SceneInfo::default() });
        let root = s.add_object("Root", ObjectKind::Empty, None, Matrix4::one());
        s.set_action(root, Action {
            frame_range: (1.0, 3.0),
            fcurves: vec![FCurve { data_path: "location".to_string(), keyframes: vec![1.0, 3.0] }],
        });
        s.add_matrix_sample(root, 3, Matrix4::from_translation(Vector3::new(1.0, 0.0, 0.0)));

        let doc = build(&mut s, &ExportOptions::default());
        let keys = &frame(&doc, "Root").animation_keys;
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].key_type(), KeyType::Translation);
        assert_eq!(keys[0].keys().len(), 3);

        let opts = ExportOptions { allow_root_animation: false, ..ExportOptions::default() };
        let out = export_to_string(&mut s, &opts);
        assert!(!out.contains("SI_AnimationKey"));
        assert_eq!(s.current_frame, 1);
    }

    #[test]
    fn test_mesh_without_faces() {
        let mut s = SceneSnapshot::new(SceneInfo::default());
        let root = s.add_object("Root", ObjectKind::Empty, None, Matrix4::one());
        let points = s.add_object("Points", ObjectKind::Mesh, Some(root), Matrix4::one());
        s.set_mesh(points, MeshData {
            name: "Points".to_string(),
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            ..MeshData::default()
        });

        let doc = build(&mut s, &ExportOptions::default());
        assert!(frame(&doc, "Points").mesh.is_none());

        let opts = ExportOptions { allow_mesh_with_no_faces: true, ..ExportOptions::default() };
        let doc = build(&mut s, &opts);
        let mesh = frame(&doc, "Points").mesh.as_ref().unwrap();
        assert_eq!(mesh.vertices.len(), 2);
        assert!(mesh.faces.is_empty());
    }

    #[test]
    fn test_face_bone_scale_fix() {
        let mut s = SceneSnapshot::new(SceneInfo::default());
        let rig = s.add_object("Rig", ObjectKind::Armature, None, Matrix4::one());
        let mut arm = Armature::default();
        let up = Matrix4::from_translation(Vector3::new(0.0, 1.0, 0.0));
        let head = arm.add_bone(bone("head", None, Matrix4::one()));
        let face = arm.add_bone(bone("face", Some(head), up));
        arm.add_bone(bone("jaw", Some(face), up * up));
        arm.add_bone(bone("neck", Some(head), up));
        s.set_armature(rig, arm);

        let doc = build(&mut s, &ExportOptions::default());
        for name in &["face", "jaw", "neck"] {
            assert!((srt(&doc, name).scale.x - 1.0).abs() < 1e-9, "{}", name);
        }

        let opts = ExportOptions { face_bone_scale_fix: true, ..ExportOptions::default() };
        let doc = build(&mut s, &opts);
        let jaw = srt(&doc, "jaw").scale;
        for &x in &[jaw.x, jaw.y, jaw.z] {
            assert!((x - config::FACE_BONE_SCALE).abs() < 1e-9, "{:?}", jaw);
        }
        // Only children of the face bone
        assert!((srt(&doc, "face").scale.x - 1.0).abs() < 1e-9);
        assert!((srt(&doc, "neck").scale.x - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_placeholder_meshes() {
        let mut s = SceneSnapshot::new(SceneInfo::default());
        let root = s.add_object("Root", ObjectKind::Empty, None, Matrix4::one());
        s.add_object("Hardpoint", ObjectKind::Empty, Some(root), Matrix4::one());
        let rig = s.add_object("Rig", ObjectKind::Armature, Some(root), Matrix4::one());
        let mut arm = Armature::default();
        arm.add_bone(bone("Spine", None, Matrix4::one()));
        s.set_armature(rig, arm);

        let doc = build(&mut s, &ExportOptions::default());
        assert!(frame(&doc, "Hardpoint").mesh.is_none());
        assert!(frame(&doc, "Spine").mesh.is_none());

        let opts = ExportOptions {
            generate_empty_mesh: true,
            generate_bone_mesh: true,
            ..ExportOptions::default()
        };
        let doc = build(&mut s, &opts);
        let pointer = frame(&doc, "Hardpoint").mesh.as_ref().unwrap();
        assert_eq!((pointer.vertices.len(), pointer.faces.len()), (5, 5));
        let spine = frame(&doc, "Spine").mesh.as_ref().unwrap();
        assert_eq!((spine.vertices.len(), spine.faces.len()), (6, 8));
        // The armature object itself gets bones, not a pointer
        assert!(frame(&doc, "Rig").mesh.is_none());

        let out = export_to_string(&mut s, &opts);
        assert!(out.contains("SI_Mesh MSH-Hardpoint {"));
        assert!(out.contains("SI_Mesh MSH-Spine {"));
    }

    #[test]
    fn test_rotation_key_type() {
        let mut s = SceneSnapshot::new(SceneInfo { frame_start: 1, frame_end: 2, ..SceneInfo::default() });
        let root = s.add_object("Root", ObjectKind::Empty, None, Matrix4::one());
        let spinner = s.add_object("Spinner", ObjectKind::Empty, Some(root), Matrix4::one());
        s.set_action(spinner, Action {
            frame_range: (1.0, 2.0),
            fcurves: vec![FCurve { data_path: "rotation_euler".to_string(), keyframes: vec![1.0, 2.0] }],
        });
        s.add_matrix_sample(spinner, 2, Matrix4::from_angle_z(Rad(0.5)));

        let doc = build(&mut s, &ExportOptions::default());
        let keys = &frame(&doc, "Spinner").animation_keys;
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].key_type(), KeyType::EulerRotation);
        assert!(keys[0].keys().iter().all(|k| k.1.len() == 3));

        let opts = ExportOptions { export_euler: false, ..ExportOptions::default() };
        let doc = build(&mut s, &opts);
        let keys = &frame(&doc, "Spinner").animation_keys;
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].key_type(), KeyType::QuaternionRotation);
        assert!(keys[0].keys().iter().all(|k| k.1.len() == 4));

        let out = export_to_string(&mut s, &opts);
        assert!(out.contains("\t\tSI_AnimationKey {\n\t\t\t0,\n\t\t\t2,\n"));
    }

    #[test]
    fn test_skin_binds_to_own_armature() {
        let mut s = SceneSnapshot::new(SceneInfo::default());
        let root = s.add_object("Root", ObjectKind::Empty, None, Matrix4::one());
        for rig_name in &["RigA", "RigB"] {
            let rig = s.add_object(rig_name, ObjectKind::Armature, Some(root), Matrix4::one());
            let mut arm = Armature::default();
            arm.add_bone(bone("Spine", None, Matrix4::one()));
            s.set_armature(rig, arm);
        }
        let rig_b = s.find_object("RigB").unwrap();
        let body = s.add_object("Body", ObjectKind::Mesh, Some(rig_b), Matrix4::one());
        s.set_mesh(body, cube_data());
        s.add_armature_modifier(body, rig_b);
        s.set_vertex_groups(body, vec![
            VertexGroup { name: "Spine".to_string(), weights: vec![(3, 1.0)] },
        ]);

        let opts = ExportOptions { duplicate_names: config::DuplicateNames::Rename, ..ExportOptions::default() };
        let doc = build(&mut s, &opts);
        let envelopes = &frame(&doc, "Body").envelopes;
        assert_eq!(envelopes.len(), 1);
        assert_eq!(doc.frame(envelopes[0].bone).name(), "Spine1");
        assert_eq!(doc.chained_name(envelopes[0].bone, "/"), "Root/RigB/Spine1");

        let out = export_to_string(&mut s, &opts);
        assert!(out.contains("\nSI_EnvelopeList Scene {\n\t1,\n"));
        assert!(out.contains("\t\t\"MDL-Body\",\n\t\t\"MDL-Spine1\",\n\t\t1,\n\t\t3,100.000000,\n"));
    }
}
