//! What the exporter needs from the host 3D application.
//!
//! Reads are split by what they see: `RestState` is authoring-time data
//! (rest matrices, mesh topology, bone rest poses, actions) and never depends
//! on the current frame; `EvaluatedState` is post-modifier data sampled at
//! the scene's current frame. The current frame itself is a `SceneClock`, and
//! the exporter only moves it through a `PinnedClock`.

pub mod snapshot;

use cgmath::Matrix4;
use std::collections::HashMap;
use std::ops::Deref;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

/// Index of a bone in its armature's bone list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoneId(pub usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Mesh,
    Empty,
    Armature,
    /// Cameras, lights, curves... Anything the exporter doesn't descend into.
    Other,
}

impl ObjectKind {
    pub fn from_tag(tag: &str) -> ObjectKind {
        match tag {
            "MESH" => ObjectKind::Mesh,
            "EMPTY" => ObjectKind::Empty,
            "ARMATURE" => ObjectKind::Armature,
            _ => ObjectKind::Other,
        }
    }

    /// Kinds that become frames.
    pub fn is_exportable(self) -> bool {
        self != ObjectKind::Other
    }
}

#[derive(Clone, Debug)]
pub struct Object {
    pub name: String,
    pub kind: ObjectKind,
    pub parent: Option<ObjectId>,
    pub children: Vec<ObjectId>,
    /// Rest transform relative to the parent.
    pub matrix_local: Matrix4<f64>,
    pub hidden: bool,
    /// Targets of the object's armature modifiers, in stack order.
    pub armature_modifiers: Vec<ObjectId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<u32>,
    /// Index of the polygon's first loop; its loops are consecutive.
    pub loop_start: usize,
    pub material_index: usize,
}

impl Polygon {
    pub fn loop_indices(&self) -> ::std::ops::Range<usize> {
        self.loop_start..self.loop_start + self.vertices.len()
    }
}

/// Value of a custom material attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum Property {
    Number(f64),
    Str(String),
    Array(Vec<f64>),
}

#[derive(Clone, Debug, Default)]
pub struct HostMaterial {
    pub name: String,
    /// Custom attributes, possibly overriding material settings.
    pub properties: HashMap<String, Property>,
    pub use_nodes: bool,
    /// File paths of the image texture nodes of the shader graph, in node
    /// order.
    pub image_textures: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<[f64; 3]>,
    pub polygons: Vec<Polygon>,
    /// One normal per loop.
    pub loop_normals: Vec<[f64; 3]>,
    /// Active UV layer, one entry per loop.
    pub uv_layer: Option<Vec<[f64; 2]>>,
    /// Active vertex color layer, one entry per loop.
    pub color_layer: Option<Vec<[f64; 4]>>,
    pub materials: Vec<HostMaterial>,
}

impl MeshData {
    /// Append a polygon whose loops follow the last polygon's.
    pub fn push_polygon(&mut self, vertices: &[u32], material_index: usize) {
        let loop_start = self.loop_count();
        self.polygons.push(Polygon {
            vertices: vertices.to_vec(),
            loop_start,
            material_index,
        });
    }

    pub fn loop_count(&self) -> usize {
        self.polygons.last()
            .map(|p| p.loop_start + p.vertices.len())
            .unwrap_or(0)
    }
}

/// Skin weights of one vertex group. Weights are in [0, 1].
#[derive(Clone, Debug, PartialEq)]
pub struct VertexGroup {
    pub name: String,
    pub weights: Vec<(u32, f64)>,
}

#[derive(Clone, Debug)]
pub struct Bone {
    pub name: String,
    pub parent: Option<BoneId>,
    pub children: Vec<BoneId>,
    /// Rest matrix in armature space.
    pub matrix_local: Matrix4<f64>,
    pub length: f64,
    /// Color of the bone's group, if it has one.
    pub color: Option<[f64; 3]>,
}

#[derive(Clone, Debug, Default)]
pub struct Armature {
    pub bones: Vec<Bone>,
}

impl Armature {
    pub fn bone(&self, id: BoneId) -> &Bone {
        &self.bones[id.0]
    }

    pub fn root_bones<'a>(&'a self) -> impl Iterator<Item = BoneId> + 'a {
        self.bones.iter().enumerate()
            .filter(|&(_, bone)| bone.parent.is_none())
            .map(|(i, _)| BoneId(i))
    }

    pub fn find_bone(&self, name: &str) -> Option<BoneId> {
        self.bones.iter().position(|b| b.name == name).map(BoneId)
    }

    /// Add a bone as the last child of `parent`.
    pub fn add_bone(&mut self, bone: Bone) -> BoneId {
        let id = BoneId(self.bones.len());
        if let Some(parent) = bone.parent {
            self.bones[parent.0].children.push(id);
        }
        self.bones.push(bone);
        id
    }
}

/// An animation curve. Only the keyframe times matter to the exporter; the
/// values are sampled from the evaluated scene.
#[derive(Clone, Debug)]
pub struct FCurve {
    /// eg. `location` or `pose.bones["Arm"].rotation_quaternion`
    pub data_path: String,
    pub keyframes: Vec<f64>,
}

#[derive(Clone, Debug)]
pub struct Action {
    pub frame_range: (f64, f64),
    pub fcurves: Vec<FCurve>,
}

#[derive(Clone, Debug)]
pub struct SceneInfo {
    /// Path of the file the scene was loaded from.
    pub file_name: String,
    pub user: String,
    pub application: String,
    pub scene_name: String,
    pub frame_start: i32,
    pub frame_end: i32,
    pub fps: f64,
}

impl Default for SceneInfo {
    fn default() -> SceneInfo {
        SceneInfo {
            file_name: "untitled.blend".to_string(),
            user: "Blender User".to_string(),
            application: "dotxsi".to_string(),
            scene_name: "Scene".to_string(),
            frame_start: 1,
            frame_end: 250,
            fps: 24.0,
        }
    }
}

/// Authoring-time view of the scene.
pub trait RestState {
    fn info(&self) -> &SceneInfo;
    /// Objects of the active collection, in collection order.
    fn active_collection(&self) -> Vec<ObjectId>;
    /// Selected objects, in scene order.
    fn selected(&self) -> Vec<ObjectId>;
    fn object(&self, id: ObjectId) -> &Object;
    fn mesh(&self, id: ObjectId) -> Option<&MeshData>;
    fn armature(&self, id: ObjectId) -> Option<&Armature>;
    fn action(&self, id: ObjectId) -> Option<&Action>;
}

/// View of the scene at its current frame, after modifiers and animation.
pub trait EvaluatedState {
    fn matrix_local(&self, id: ObjectId) -> Matrix4<f64>;
    /// Posed matrix of a bone, in armature space.
    fn pose_matrix(&self, armature: ObjectId, bone: BoneId) -> Matrix4<f64>;
    fn vertex_groups(&self, id: ObjectId) -> &[VertexGroup];
}

/// The scene's playback cursor, shared by everything in the host.
pub trait SceneClock {
    fn current_frame(&self) -> i32;
    fn set_current_frame(&mut self, frame: i32);
}

pub trait HostScene: RestState + EvaluatedState + SceneClock {}

impl<T: RestState + EvaluatedState + SceneClock + ?Sized> HostScene for T {}

/// Exclusive hold on a scene's clock.
///
/// The frame current when the clock was pinned is put back when the guard
/// drops, including when an export bails out with an error.
pub struct PinnedClock<'a, S: SceneClock + ?Sized> {
    scene: &'a mut S,
    saved_frame: i32,
}

impl<'a, S: SceneClock + ?Sized> PinnedClock<'a, S> {
    pub fn pin(scene: &'a mut S) -> PinnedClock<'a, S> {
        let saved_frame = scene.current_frame();
        PinnedClock { scene, saved_frame }
    }

    /// Move the clock to `frame` and look at the scene there.
    pub fn with_time<R, F>(&mut self, frame: i32, f: F) -> R
    where F: FnOnce(&S) -> R {
        if self.scene.current_frame() != frame {
            self.scene.set_current_frame(frame);
        }
        f(&*self.scene)
    }

    pub fn saved_frame(&self) -> i32 {
        self.saved_frame
    }
}

impl<'a, S: SceneClock + ?Sized> Deref for PinnedClock<'a, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &*self.scene
    }
}

impl<'a, S: SceneClock + ?Sized> Drop for PinnedClock<'a, S> {
    fn drop(&mut self) {
        if self.scene.current_frame() != self.saved_frame {
            trace!("restoring scene clock to frame {}", self.saved_frame);
            self.scene.set_current_frame(self.saved_frame);
        }
    }
}

#[test]
fn test_pinned_clock_restores() {
    struct Clock { frame: i32, sets: u32 }
    impl SceneClock for Clock {
        fn current_frame(&self) -> i32 { self.frame }
        fn set_current_frame(&mut self, frame: i32) {
            self.frame = frame;
            self.sets += 1;
        }
    }

    let mut clock = Clock { frame: 12, sets: 0 };
    {
        let mut pinned = PinnedClock::pin(&mut clock);
        let seen: Vec<i32> = (1..4).map(|t| pinned.with_time(t, |c| c.current_frame())).collect();
        assert_eq!(seen, vec![1, 2, 3]);
        // Already there; no set.
        pinned.with_time(3, |_| ());
        assert_eq!(pinned.saved_frame(), 12);
    }
    assert_eq!(clock.frame, 12);
    assert_eq!(clock.sets, 4);

    // Unwinding out of an early return still restores.
    fn bail_early(clock: &mut Clock) -> Result<(), ()> {
        let mut pinned = PinnedClock::pin(clock);
        pinned.with_time(40, |_| Ok::<(), ()>(()))?;
        Err(())
    }
    assert!(bail_early(&mut clock).is_err());
    assert_eq!(clock.frame, 12);
}

#[test]
fn test_armature_tree() {
    use cgmath::One;

    let bone = |name: &str, parent| Bone {
        name: name.to_string(),
        parent,
        children: vec![],
        matrix_local: Matrix4::one(),
        length: 1.0,
        color: None,
    };
    let mut arm = Armature::default();
    let root = arm.add_bone(bone("root", None));
    let a = arm.add_bone(bone("a", Some(root)));
    let b = arm.add_bone(bone("b", Some(root)));
    arm.add_bone(bone("other_root", None));
    assert_eq!(arm.bone(root).children, vec![a, b]);
    assert_eq!(arm.root_bones().collect::<Vec<_>>(), vec![root, BoneId(3)]);
    assert_eq!(arm.find_bone("b"), Some(b));
    assert_eq!(arm.find_bone("c"), None);
}

#[test]
fn test_loop_indices() {
    let mut mesh = MeshData::default();
    mesh.push_polygon(&[0, 1, 2, 3], 0);
    mesh.push_polygon(&[3, 2, 4], 1);
    assert_eq!(mesh.polygons[1].loop_indices(), 4..7);
    assert_eq!(mesh.loop_count(), 7);
}
