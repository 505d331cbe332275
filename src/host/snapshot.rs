//! A frozen copy of a host scene.
//!
//! Evaluated state is stored as time samples: asking for a matrix at frame t
//! gives the latest sample at or before t, or the rest value if there is
//! none. That's enough to drive an export outside the host (from a JSON dump
//! of the scene) and to test the exporter.

use super::*;
use crate::errors::{ErrorKind, Result};
use cgmath::{Matrix4, One};
use json::JsonValue;
use std::collections::{BTreeMap, HashMap};

pub struct SceneSnapshot {
    pub info: SceneInfo,
    pub current_frame: i32,
    entries: Vec<Entry>,
}

struct Entry {
    object: Object,
    in_active_collection: bool,
    selected: bool,
    mesh: Option<MeshData>,
    armature: Option<Armature>,
    action: Option<Action>,
    vertex_groups: Vec<VertexGroup>,
    matrix_samples: BTreeMap<i32, Matrix4<f64>>,
    pose_samples: HashMap<BoneId, BTreeMap<i32, Matrix4<f64>>>,
}

fn sample_at(samples: Option<&BTreeMap<i32, Matrix4<f64>>>, t: i32) -> Option<Matrix4<f64>> {
    samples?.range(..=t).next_back().map(|(_, m)| *m)
}

impl SceneSnapshot {
    pub fn new(info: SceneInfo) -> SceneSnapshot {
        let current_frame = info.frame_start;
        SceneSnapshot { info, current_frame, entries: vec![] }
    }

    /// Add an object as the last child of `parent`. Objects start out in the
    /// active collection, visible and unselected.
    pub fn add_object(
        &mut self,
        name: &str,
        kind: ObjectKind,
        parent: Option<ObjectId>,
        matrix_local: Matrix4<f64>,
    ) -> ObjectId {
        let id = ObjectId(self.entries.len());
        if let Some(p) = parent {
            self.entries[p.0].object.children.push(id);
        }
        self.entries.push(Entry {
            object: Object {
                name: name.to_string(),
                kind,
                parent,
                children: vec![],
                matrix_local,
                hidden: false,
                armature_modifiers: vec![],
            },
            in_active_collection: true,
            selected: false,
            mesh: None,
            armature: None,
            action: None,
            vertex_groups: vec![],
            matrix_samples: BTreeMap::new(),
            pose_samples: HashMap::new(),
        });
        id
    }

    pub fn find_object(&self, name: &str) -> Option<ObjectId> {
        self.entries.iter().position(|e| e.object.name == name).map(ObjectId)
    }

    pub fn set_selected(&mut self, id: ObjectId, selected: bool) {
        self.entries[id.0].selected = selected;
    }

    pub fn set_hidden(&mut self, id: ObjectId, hidden: bool) {
        self.entries[id.0].object.hidden = hidden;
    }

    pub fn set_in_active_collection(&mut self, id: ObjectId, in_collection: bool) {
        self.entries[id.0].in_active_collection = in_collection;
    }

    pub fn set_mesh(&mut self, id: ObjectId, mesh: MeshData) {
        self.entries[id.0].mesh = Some(mesh);
    }

    pub fn set_armature(&mut self, id: ObjectId, armature: Armature) {
        self.entries[id.0].armature = Some(armature);
    }

    pub fn set_action(&mut self, id: ObjectId, action: Action) {
        self.entries[id.0].action = Some(action);
    }

    pub fn add_armature_modifier(&mut self, id: ObjectId, target: ObjectId) {
        self.entries[id.0].object.armature_modifiers.push(target);
    }

    pub fn set_vertex_groups(&mut self, id: ObjectId, groups: Vec<VertexGroup>) {
        self.entries[id.0].vertex_groups = groups;
    }

    /// The evaluated local matrix of `id` from `frame` on.
    pub fn add_matrix_sample(&mut self, id: ObjectId, frame: i32, m: Matrix4<f64>) {
        self.entries[id.0].matrix_samples.insert(frame, m);
    }

    /// The pose matrix of `bone` from `frame` on.
    pub fn add_pose_sample(&mut self, armature: ObjectId, bone: BoneId, frame: i32, m: Matrix4<f64>) {
        self.entries[armature.0].pose_samples
            .entry(bone)
            .or_insert_with(BTreeMap::new)
            .insert(frame, m);
    }
}

impl RestState for SceneSnapshot {
    fn info(&self) -> &SceneInfo {
        &self.info
    }

    fn active_collection(&self) -> Vec<ObjectId> {
        self.entries.iter().enumerate()
            .filter(|&(_, e)| e.in_active_collection)
            .map(|(i, _)| ObjectId(i))
            .collect()
    }

    fn selected(&self) -> Vec<ObjectId> {
        self.entries.iter().enumerate()
            .filter(|&(_, e)| e.selected)
            .map(|(i, _)| ObjectId(i))
            .collect()
    }

    fn object(&self, id: ObjectId) -> &Object {
        &self.entries[id.0].object
    }

    fn mesh(&self, id: ObjectId) -> Option<&MeshData> {
        self.entries[id.0].mesh.as_ref()
    }

    fn armature(&self, id: ObjectId) -> Option<&Armature> {
        self.entries[id.0].armature.as_ref()
    }

    fn action(&self, id: ObjectId) -> Option<&Action> {
        self.entries[id.0].action.as_ref()
    }
}

impl EvaluatedState for SceneSnapshot {
    fn matrix_local(&self, id: ObjectId) -> Matrix4<f64> {
        let entry = &self.entries[id.0];
        sample_at(Some(&entry.matrix_samples), self.current_frame)
            .unwrap_or(entry.object.matrix_local)
    }

    fn pose_matrix(&self, armature: ObjectId, bone: BoneId) -> Matrix4<f64> {
        let entry = &self.entries[armature.0];
        if let Some(m) = sample_at(entry.pose_samples.get(&bone), self.current_frame) {
            return m;
        }
        entry.armature.as_ref()
            .map(|arm| arm.bone(bone).matrix_local)
            .unwrap_or_else(Matrix4::one)
    }

    fn vertex_groups(&self, id: ObjectId) -> &[VertexGroup] {
        &self.entries[id.0].vertex_groups
    }
}

impl SceneClock for SceneSnapshot {
    fn current_frame(&self) -> i32 {
        self.current_frame
    }

    fn set_current_frame(&mut self, frame: i32) {
        self.current_frame = frame;
    }
}


// JSON scene dumps.
//
// {
//   "file": "ship.blend", "scene": "Scene", "frame_start": 1, "frame_end": 20,
//   "objects": [
//     { "name": "Root", "type": "EMPTY", "parent": null,
//       "matrix_local": [[1,0,0,0],[0,1,0,0],[0,0,1,0],[0,0,0,1]], ... }
//   ]
// }
//
// Objects, parents, bones and modifier targets are referred to by name.
// Matrices are written row by row.

fn bad<T>(msg: String) -> Result<T> {
    Err(ErrorKind::BadSnapshot(msg).into())
}

fn number(v: &JsonValue, what: &str) -> Result<f64> {
    match v.as_f64() {
        Some(x) => Ok(x),
        None => bad(format!("{} should be a number, got {}", what, v.dump())),
    }
}

fn numbers(v: &JsonValue, what: &str) -> Result<Vec<f64>> {
    check!(v.is_array())?;
    v.members().map(|x| number(x, what)).collect()
}

fn fixed<A: Default + AsMut<[f64]>>(v: &JsonValue, what: &str) -> Result<A> {
    let xs = numbers(v, what)?;
    let mut a = A::default();
    if xs.len() != a.as_mut().len() {
        return bad(format!("{} should have {} components, got {}", what, a.as_mut().len(), xs.len()));
    }
    a.as_mut().copy_from_slice(&xs);
    Ok(a)
}

fn fixed_list<A: Default + AsMut<[f64]>>(v: &JsonValue, what: &str) -> Result<Vec<A>> {
    check!(v.is_array())?;
    v.members().map(|x| fixed(x, what)).collect()
}

fn string(v: &JsonValue, what: &str) -> Result<String> {
    match v.as_str() {
        Some(s) => Ok(s.to_string()),
        None => bad(format!("{} should be a string, got {}", what, v.dump())),
    }
}

fn string_or(v: &JsonValue, default: &str) -> String {
    v.as_str().unwrap_or(default).to_string()
}

/// Row-major nested arrays to a cgmath (column-major) matrix. A missing
/// matrix is the identity.
fn matrix(v: &JsonValue) -> Result<Matrix4<f64>> {
    if v.is_null() {
        return Ok(Matrix4::one());
    }
    check!(v.is_array() && v.len() == 4)?;
    let mut m = Matrix4::one();
    for (i, row) in v.members().enumerate() {
        let row: [f64; 4] = fixed(row, "matrix row")?;
        for j in 0..4 {
            m[j][i] = row[j];
        }
    }
    Ok(m)
}

fn property(v: &JsonValue) -> Result<Property> {
    if let Some(x) = v.as_f64() {
        Ok(Property::Number(x))
    } else if let Some(s) = v.as_str() {
        Ok(Property::Str(s.to_string()))
    } else if v.is_array() {
        Ok(Property::Array(numbers(v, "property component")?))
    } else {
        bad(format!("unsupported material property {}", v.dump()))
    }
}

fn material(v: &JsonValue) -> Result<HostMaterial> {
    let mut properties = HashMap::new();
    for (key, value) in v["properties"].entries() {
        properties.insert(key.to_string(), property(value)?);
    }
    let image_textures = v["image_textures"].members()
        .map(|p| string(p, "image texture path"))
        .collect::<Result<Vec<_>>>()?;
    Ok(HostMaterial {
        name: string_or(&v["name"], ""),
        properties,
        use_nodes: v["use_nodes"].as_bool().unwrap_or(false),
        image_textures,
    })
}

fn mesh(v: &JsonValue, object_name: &str) -> Result<MeshData> {
    let mut mesh = MeshData {
        name: string_or(&v["name"], object_name),
        vertices: fixed_list(&v["vertices"], "vertex position")?,
        ..MeshData::default()
    };

    for p in v["polygons"].members() {
        let vertices = numbers(&p["vertices"], "polygon vertex index")?;
        check!(vertices.len() >= 3)?;
        let mut indices = Vec::with_capacity(vertices.len());
        for x in vertices {
            indices.push(vertex_index(x, mesh.vertices.len(), "polygon vertex")?);
        }
        let material_index = p["material_index"].as_usize().unwrap_or(0);
        mesh.push_polygon(&indices, material_index);
    }
    let loop_count = mesh.loop_count();

    mesh.loop_normals = if v["normals"].is_null() {
        vec![[0.0, 0.0, 1.0]; loop_count]
    } else {
        fixed_list(&v["normals"], "loop normal")?
    };
    check!(mesh.loop_normals.len() == loop_count)?;

    if !v["uv_layer"].is_null() {
        let uvs: Vec<[f64; 2]> = fixed_list(&v["uv_layer"], "uv")?;
        check!(uvs.len() == loop_count)?;
        mesh.uv_layer = Some(uvs);
    }
    if !v["color_layer"].is_null() {
        let colors: Vec<[f64; 4]> = fixed_list(&v["color_layer"], "vertex color")?;
        check!(colors.len() == loop_count)?;
        mesh.color_layer = Some(colors);
    }

    mesh.materials = v["materials"].members()
        .map(material)
        .collect::<Result<Vec<_>>>()?;

    Ok(mesh)
}

fn armature(v: &JsonValue) -> Result<Armature> {
    let mut arm = Armature::default();
    for b in v["bones"].members() {
        let name = string(&b["name"], "bone name")?;
        let parent = match b["parent"].as_str() {
            None => None,
            // Parents have to come first.
            Some(p) => match arm.find_bone(p) {
                Some(id) => Some(id),
                None => return bad(format!("bone {:?} has unknown parent {:?}", name, p)),
            },
        };
        let color = if b["color"].is_null() { None } else { Some(fixed(&b["color"], "bone color")?) };
        arm.add_bone(Bone {
            name,
            parent,
            children: vec![],
            matrix_local: matrix(&b["matrix_local"])?,
            length: number(&b["length"], "bone length")?,
            color,
        });
    }
    Ok(arm)
}

fn action(v: &JsonValue) -> Result<Action> {
    let fcurves = v["fcurves"].members()
        .map(|c| Ok(FCurve {
            data_path: string(&c["data_path"], "fcurve data path")?,
            keyframes: numbers(&c["keyframes"], "keyframe")?,
        }))
        .collect::<Result<Vec<_>>>()?;
    let frame_range: [f64; 2] = fixed(&v["frame_range"], "action frame range")?;
    Ok(Action { frame_range: (frame_range[0], frame_range[1]), fcurves })
}

/// A vertex index: a whole number below `vertex_count`.
fn vertex_index(x: f64, vertex_count: usize, what: &str) -> Result<u32> {
    if x >= 0.0 && x.fract() == 0.0 && x < vertex_count as f64 {
        Ok(x as u32)
    } else {
        bad(format!("{} {} is not a vertex index below {}", what, x, vertex_count))
    }
}

/// Weights refer to the vertices of the object's own mesh.
fn vertex_group(v: &JsonValue, vertex_count: usize) -> Result<VertexGroup> {
    let name = string(&v["name"], "vertex group name")?;
    let pairs: Vec<[f64; 2]> = fixed_list(&v["weights"], "vertex weight")?;
    let mut weights = Vec::with_capacity(pairs.len());
    for w in &pairs {
        weights.push((vertex_index(w[0], vertex_count, "vertex group index")?, w[1]));
    }
    Ok(VertexGroup { name, weights })
}

fn frame_number(v: &JsonValue) -> Result<i32> {
    match v.as_i32() {
        Some(t) => Ok(t),
        None => bad(format!("frame should be an integer, got {}", v.dump())),
    }
}

/// Every chain of parents has to end at a root.
fn check_parent_cycles(snapshot: &SceneSnapshot) -> Result<()> {
    let n = snapshot.entries.len();
    for i in 0..n {
        let mut cur = snapshot.entries[i].object.parent;
        let mut steps = 0;
        while let Some(p) = cur {
            steps += 1;
            if steps > n {
                let name = &snapshot.entries[i].object.name;
                return bad(format!("{:?} is its own ancestor", name));
            }
            cur = snapshot.entries[p.0].object.parent;
        }
    }
    Ok(())
}

impl SceneSnapshot {
    pub fn from_json(s: &str) -> Result<SceneSnapshot> {
        let root = json::parse(s)?;
        check!(root["objects"].is_array())?;

        let defaults = SceneInfo::default();
        let info = SceneInfo {
            file_name: string_or(&root["file"], &defaults.file_name),
            user: string_or(&root["user"], &defaults.user),
            application: string_or(&root["application"], &defaults.application),
            scene_name: string_or(&root["scene"], &defaults.scene_name),
            frame_start: root["frame_start"].as_i32().unwrap_or(defaults.frame_start),
            frame_end: root["frame_end"].as_i32().unwrap_or(defaults.frame_end),
            fps: root["fps"].as_f64().unwrap_or(defaults.fps),
        };
        let mut snapshot = SceneSnapshot::new(info);
        if let Some(t) = root["current_frame"].as_i32() {
            snapshot.current_frame = t;
        }

        // Objects first, then the links between them, which may point
        // forward.
        let mut ids: HashMap<String, ObjectId> = HashMap::new();
        for o in root["objects"].members() {
            let name = string(&o["name"], "object name")?;
            if ids.contains_key(&name) {
                return bad(format!("two objects named {:?}", name));
            }
            let kind = ObjectKind::from_tag(&string_or(&o["type"], "EMPTY"));
            let id = snapshot.add_object(&name, kind, None, matrix(&o["matrix_local"])?);
            ids.insert(name, id);
        }
        let lookup = |name: &str| -> Result<ObjectId> {
            match ids.get(name) {
                Some(&id) => Ok(id),
                None => bad(format!("no object named {:?}", name)),
            }
        };

        for (i, o) in root["objects"].members().enumerate() {
            let id = ObjectId(i);
            let name = snapshot.object(id).name.clone();

            if let Some(parent) = o["parent"].as_str() {
                let parent = lookup(parent)?;
                snapshot.entries[id.0].object.parent = Some(parent);
                snapshot.entries[parent.0].object.children.push(id);
            }
            snapshot.set_hidden(id, o["hidden"].as_bool().unwrap_or(false));
            snapshot.set_selected(id, o["selected"].as_bool().unwrap_or(false));
            if let Some(b) = o["in_active_collection"].as_bool() {
                snapshot.set_in_active_collection(id, b);
            }
            for target in o["armature_modifiers"].members() {
                let target = lookup(&string(target, "modifier target")?)?;
                snapshot.add_armature_modifier(id, target);
            }

            if !o["mesh"].is_null() {
                snapshot.set_mesh(id, mesh(&o["mesh"], &name)?);
            }
            if !o["armature"].is_null() {
                snapshot.set_armature(id, armature(&o["armature"])?);
            }
            if !o["action"].is_null() {
                snapshot.set_action(id, action(&o["action"])?);
            }
            let vertex_count = snapshot.mesh(id).map(|m| m.vertices.len()).unwrap_or(0);
            let groups = o["vertex_groups"].members()
                .map(|g| vertex_group(g, vertex_count))
                .collect::<Result<Vec<_>>>()?;
            snapshot.set_vertex_groups(id, groups);

            for s in o["matrix_samples"].members() {
                snapshot.add_matrix_sample(id, frame_number(&s["frame"])?, matrix(&s["matrix"])?);
            }
            for s in o["pose_samples"].members() {
                let bone_name = string(&s["bone"], "pose sample bone")?;
                let bone = match snapshot.armature(id).and_then(|arm| arm.find_bone(&bone_name)) {
                    Some(b) => b,
                    None => return bad(format!("{:?} has no bone {:?}", name, bone_name)),
                };
                snapshot.add_pose_sample(id, bone, frame_number(&s["frame"])?, matrix(&s["matrix"])?);
            }
        }

        check_parent_cycles(&snapshot)?;

        debug!("loaded scene snapshot with {} objects", snapshot.entries.len());
        Ok(snapshot)
    }
}

#[test]
fn test_samples_hold_until_next() {
    use cgmath::vec3;

    let mut s = SceneSnapshot::new(SceneInfo::default());
    let rest = Matrix4::from_translation(vec3(0.0, 0.0, 1.0));
    let id = s.add_object("Cube", ObjectKind::Mesh, None, rest);
    s.add_matrix_sample(id, 5, Matrix4::from_scale(2.0));
    s.add_matrix_sample(id, 10, Matrix4::from_scale(3.0));

    s.set_current_frame(1);
    assert_eq!(s.matrix_local(id), rest);
    s.set_current_frame(5);
    assert_eq!(s.matrix_local(id), Matrix4::from_scale(2.0));
    s.set_current_frame(9);
    assert_eq!(s.matrix_local(id), Matrix4::from_scale(2.0));
    s.set_current_frame(100);
    assert_eq!(s.matrix_local(id), Matrix4::from_scale(3.0));
    // Rest state doesn't move with the clock
    assert_eq!(s.object(id).matrix_local, rest);
}

#[test]
fn test_from_json() {
    let s = SceneSnapshot::from_json(r#"{
        "file": "C:\\ships\\my ship.blend",
        "frame_start": 2, "frame_end": 8, "fps": 30,
        "objects": [
            { "name": "Cube", "type": "MESH", "parent": "Root",
              "matrix_local": [[1,0,0,5],[0,1,0,6],[0,0,1,7],[0,0,0,1]],
              "armature_modifiers": ["Rig"],
              "mesh": {
                "vertices": [[0,0,0],[1,0,0],[1,1,0],[0,1,0]],
                "polygons": [{ "vertices": [0,1,2,3] }],
                "uv_layer": [[0,0],[1,0],[1,1],[0,1]],
                "materials": [{ "name": "Hull", "properties": { "hardness": 50, "diffuse": [1,0,0] } }]
              },
              "vertex_groups": [{ "name": "Spine", "weights": [[0, 0.5], [1, 1.0]] }]
            },
            { "name": "Root", "type": "EMPTY" },
            { "name": "Rig", "type": "ARMATURE", "parent": "Root",
              "armature": { "bones": [
                { "name": "Spine", "length": 2.0 },
                { "name": "Head", "parent": "Spine", "length": 0.5, "color": [1, 0, 0] }
              ] },
              "pose_samples": [{ "bone": "Head", "frame": 4, "matrix": null }]
            }
        ]
    }"#).unwrap();

    assert_eq!(s.info.frame_start, 2);
    assert_eq!(s.current_frame, 2);
    assert_eq!(s.info.fps, 30.0);

    let cube = s.find_object("Cube").unwrap();
    let root = s.find_object("Root").unwrap();
    let rig = s.find_object("Rig").unwrap();
    assert_eq!(s.object(cube).parent, Some(root));
    assert_eq!(s.object(root).children, vec![cube, rig]);
    assert_eq!(s.object(cube).armature_modifiers, vec![rig]);
    assert_eq!(s.object(cube).kind, ObjectKind::Mesh);
    // Row-major in, translation lands in the last column
    assert_eq!(s.object(cube).matrix_local.w.x, 5.0);
    assert_eq!(s.object(cube).matrix_local.w.z, 7.0);

    let mesh = s.mesh(cube).unwrap();
    assert_eq!(mesh.name, "Cube");
    assert_eq!(mesh.polygons[0].loop_indices(), 0..4);
    assert_eq!(mesh.loop_normals.len(), 4);
    assert_eq!(mesh.materials[0].properties["hardness"], Property::Number(50.0));
    assert_eq!(mesh.materials[0].properties["diffuse"], Property::Array(vec![1.0, 0.0, 0.0]));
    assert_eq!(s.vertex_groups(cube)[0].weights, vec![(0, 0.5), (1, 1.0)]);

    let arm = s.armature(rig).unwrap();
    assert_eq!(arm.bones[1].parent, Some(BoneId(0)));
    assert_eq!(arm.bones[1].color, Some([1.0, 0.0, 0.0]));
}

#[test]
fn test_from_json_rejects_bad_input() {
    let bad_inputs = [
        r#"{}"#,
        r#"{ "objects": [{ "name": "A" }, { "name": "A" }] }"#,
        r#"{ "objects": [{ "name": "A", "parent": "B" }] }"#,
        r#"{ "objects": [{ "name": "A", "matrix_local": [[1,0,0],[0,1,0],[0,0,1]] }] }"#,
        r#"{ "objects": [{ "name": "A", "mesh": { "vertices": [[0,0,0]], "polygons": [{ "vertices": [0,1,2] }] } }] }"#,
        r#"{ "objects": [{ "name": "A", "armature": { "bones": [{ "name": "b", "parent": "c", "length": 1 }] } }] }"#,
        r#"{ "objects": [{ "name": "A", "mesh": { "vertices": [[0,0,0],[1,0,0],[0,1,0]], "polygons": [{ "vertices": [0,1.5,2] }] } }] }"#,
        r#"{ "objects": [{ "name": "A", "parent": "A" }] }"#,
        r#"{ "objects": [{ "name": "A", "parent": "B", "selected": true }, { "name": "B", "parent": "A" }] }"#,
        r#"{ "objects": [{ "name": "R" }, { "name": "A", "parent": "C" }, { "name": "B", "parent": "A" }, { "name": "C", "parent": "B" }] }"#,
    ];
    for input in &bad_inputs {
        match SceneSnapshot::from_json(input) {
            Err(e) => match *e.kind() {
                ErrorKind::BadSnapshot(_) => (),
                ref k => panic!("unexpected error {:?} for {}", k, input),
            },
            Ok(_) => panic!("accepted {}", input),
        }
    }
    assert!(SceneSnapshot::from_json("{ not json").is_err());
}

#[test]
fn test_from_json_checks_vertex_group_indices() {
    let scene = |weights: &str| format!(r#"{{ "objects": [
        {{ "name": "Tri", "type": "MESH",
          "mesh": {{ "vertices": [[0,0,0],[1,0,0],[0,1,0]], "polygons": [{{ "vertices": [0,1,2] }}] }},
          "vertex_groups": [{{ "name": "Bone", "weights": {} }}] }}
    ] }}"#, weights);

    let s = SceneSnapshot::from_json(&scene("[[0, 1.0], [2, 0.5]]")).unwrap();
    let tri = s.find_object("Tri").unwrap();
    assert_eq!(s.vertex_groups(tri)[0].weights, vec![(0, 1.0), (2, 0.5)]);

    for weights in &["[[-1, 1.0]]", "[[1.7, 0.25]]", "[[3, 0.5]]", "[[99, 0.5]]"] {
        match SceneSnapshot::from_json(&scene(weights)) {
            Err(e) => match *e.kind() {
                ErrorKind::BadSnapshot(_) => (),
                ref k => panic!("unexpected error {:?} for {}", k, weights),
            },
            Ok(_) => panic!("accepted weights {}", weights),
        }
    }

    // No mesh, no vertices to weight
    let no_mesh = r#"{ "objects": [{ "name": "E", "vertex_groups": [{ "name": "Bone", "weights": [[0, 1.0]] }] }] }"#;
    assert!(SceneSnapshot::from_json(no_mesh).is_err());
}
