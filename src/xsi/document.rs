use super::{AnimationKey, Mesh, Srt};
use crate::config::DuplicateNames;
use crate::errors::{ErrorKind, Result};
use crate::util::UniqueNamer;
use cgmath::Vector3;
use std::collections::HashMap;

/// Index of a frame in its `Document`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub usize);

/// Skin weights binding mesh vertices to one bone.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    /// A frame with `is_bone` set.
    pub bone: FrameId,
    /// (vertex index, weight in percent).
    pub vertices: Vec<(u32, f64)>,
}

impl Envelope {
    pub fn new(bone: FrameId) -> Envelope {
        Envelope { bone, vertices: vec![] }
    }

    pub fn add_weight(&mut self, vertex_index: u32, weight: f64) {
        self.vertices.push((vertex_index, weight));
    }
}

/// A node of the scene tree: an object or a bone.
#[derive(Clone, Debug)]
pub struct Frame {
    name: String,
    parent: Option<FrameId>,
    children: Vec<FrameId>,

    pub is_bone: bool,
    pub mesh: Option<Mesh>,
    pub animation_keys: Vec<AnimationKey>,
    /// Only non-bone frames holding a skinned mesh have envelopes. Bones are
    /// referenced by them instead.
    pub envelopes: Vec<Envelope>,
    pub basepose: Option<Srt>,
    pub srt: Option<Srt>,
}

impl Frame {
    fn new(name: String, parent: Option<FrameId>) -> Frame {
        Frame {
            name,
            parent,
            children: vec![],
            is_bone: false,
            mesh: None,
            animation_keys: vec![],
            envelopes: vec![],
            basepose: None,
            srt: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<FrameId> {
        self.parent
    }

    pub fn children(&self) -> &[FrameId] {
        &self.children
    }
}

#[derive(Clone, Debug)]
pub struct PointLight {
    pub name: String,
    pub rgb: [f64; 3],
    pub position: Vector3<f64>,
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub name: String,
    pub position: Vector3<f64>,
    pub target: Vector3<f64>,
    pub roll: f64,
    pub near_plane: f64,
    pub far_plane: f64,
}

/// Contents of the header blocks.
#[derive(Clone, Debug)]
pub struct FileInfo {
    /// Source file name, already stripped of directories and extension.
    pub source_name: String,
    pub user: String,
    pub date: String,
    pub application: String,
    pub scene_name: String,
    pub frame_start: f64,
    pub frame_end: f64,
    pub fps: f64,
}

impl Default for FileInfo {
    fn default() -> FileInfo {
        FileInfo {
            source_name: "scene".to_string(),
            user: "unknown".to_string(),
            date: String::new(),
            application: "dotxsi".to_string(),
            scene_name: "Scene".to_string(),
            frame_start: 1.0,
            frame_end: 1.0,
            fps: 24.0,
        }
    }
}

/// An XSI scene.
pub struct Document {
    pub info: FileInfo,
    pub lights: Vec<PointLight>,
    pub cameras: Vec<Camera>,

    frames: Vec<Frame>,
    roots: Vec<FrameId>,
    frame_table: HashMap<String, FrameId>,
    duplicate_names: DuplicateNames,
    namer: UniqueNamer,
}

impl Document {
    pub fn new(info: FileInfo, duplicate_names: DuplicateNames) -> Document {
        Document {
            info,
            lights: vec![],
            cameras: vec![],
            frames: vec![],
            roots: vec![],
            frame_table: HashMap::new(),
            duplicate_names,
            namer: UniqueNamer::new(),
        }
    }

    /// Create a new frame as the last child of `parent` (or as the last
    /// root). Frame names are unique in the whole document; what happens
    /// when `name` is already taken depends on the duplicate-name policy.
    pub fn add_frame(&mut self, parent: Option<FrameId>, name: &str) -> Result<FrameId> {
        let name = match self.duplicate_names {
            DuplicateNames::Reject => {
                if self.frame_table.contains_key(name) {
                    bail!(ErrorKind::DuplicateFrame(name.to_string()));
                }
                name.to_string()
            }
            DuplicateNames::KeepFirst => name.to_string(),
            DuplicateNames::Rename => {
                let fresh = self.namer.get_fresh_name(name);
                if fresh != name {
                    warn!("duplicate frame {:?} renamed to {:?}", name, fresh);
                }
                fresh
            }
        };

        let id = FrameId(self.frames.len());
        self.frames.push(Frame::new(name.clone(), parent));
        match parent {
            Some(p) => self.frames[p.0].children.push(id),
            None => self.roots.push(id),
        }
        self.frame_table.entry(name).or_insert(id);
        Ok(id)
    }

    pub fn frame(&self, id: FrameId) -> &Frame {
        &self.frames[id.0]
    }

    pub fn frame_mut(&mut self, id: FrameId) -> &mut Frame {
        &mut self.frames[id.0]
    }

    pub fn roots(&self) -> &[FrameId] {
        &self.roots
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// The frame registered under `name` in the name table.
    pub fn lookup(&self, name: &str) -> Option<FrameId> {
        self.frame_table.get(name).cloned()
    }

    /// First frame named `name` in depth-first order.
    pub fn find_frame(&self, name: &str) -> Option<FrameId> {
        self.all_frames().find(|&id| self.frame(id).name == name)
    }

    /// Depth-first pre-order walk over every frame, starting afresh at each
    /// call.
    pub fn all_frames(&self) -> AllFrames {
        AllFrames {
            doc: self,
            stack: self.roots.iter().rev().cloned().collect(),
        }
    }

    pub fn animated_frames<'a>(&'a self) -> impl Iterator<Item = FrameId> + 'a {
        self.all_frames().filter(move |&id| !self.frame(id).animation_keys.is_empty())
    }

    pub fn skinned_frames<'a>(&'a self) -> impl Iterator<Item = FrameId> + 'a {
        self.all_frames().filter(move |&id| !self.frame(id).envelopes.is_empty())
    }

    pub fn bone_frames<'a>(&'a self) -> impl Iterator<Item = FrameId> + 'a {
        self.all_frames().filter(move |&id| self.frame(id).is_bone)
    }

    pub fn meshes<'a>(&'a self) -> impl Iterator<Item = &'a Mesh> + 'a {
        self.all_frames().filter_map(move |id| self.frame(id).mesh.as_ref())
    }

    /// Number of envelopes over all skinned frames.
    pub fn envelope_count(&self) -> usize {
        self.skinned_frames()
            .map(|id| self.frame(id).envelopes.len())
            .sum()
    }

    pub fn is_skinned(&self) -> bool {
        self.skinned_frames().next().is_some()
    }

    pub fn is_animated(&self) -> bool {
        self.animated_frames().next().is_some()
    }

    /// Names from the root down to `id`, joined by `delimiter`.
    pub fn chained_name(&self, id: FrameId, delimiter: &str) -> String {
        let mut chain = vec![];
        let mut cur = Some(id);
        while let Some(f) = cur {
            chain.push(self.frame(f).name.as_str());
            cur = self.frame(f).parent;
        }
        chain.reverse();
        chain.join(delimiter)
    }

    /// First and last frame number over all the animation keys of `id`.
    pub fn animation_frame_range(&self, id: FrameId) -> Option<(i32, i32)> {
        self.frame(id).animation_keys.iter()
            .filter_map(|key| key.frame_range())
            .fold(None, |acc, (s, e)| match acc {
                None => Some((s, e)),
                Some((s0, e0)) => Some((s0.min(s), e0.max(e))),
            })
    }

    /// Number of ancestors of `id`.
    pub fn depth(&self, id: FrameId) -> usize {
        let mut depth = 0;
        let mut cur = self.frame(id).parent;
        while let Some(f) = cur {
            depth += 1;
            cur = self.frame(f).parent;
        }
        depth
    }
}

pub struct AllFrames<'a> {
    doc: &'a Document,
    stack: Vec<FrameId>,
}

impl<'a> Iterator for AllFrames<'a> {
    type Item = FrameId;

    fn next(&mut self) -> Option<FrameId> {
        let id = self.stack.pop()?;
        let children = &self.doc.frames[id.0].children;
        self.stack.extend(children.iter().rev().cloned());
        Some(id)
    }
}

#[cfg(test)]
fn tree() -> Document {
    //     a       e
    //    / \
    //   b   d
    //   |
    //   c
    let mut doc = Document::new(FileInfo::default(), DuplicateNames::Reject);
    let a = doc.add_frame(None, "a").unwrap();
    let b = doc.add_frame(Some(a), "b").unwrap();
    doc.add_frame(Some(b), "c").unwrap();
    doc.add_frame(Some(a), "d").unwrap();
    doc.add_frame(None, "e").unwrap();
    doc
}

#[test]
fn test_preorder() {
    let doc = tree();
    let names: Vec<&str> = doc.all_frames().map(|id| doc.frame(id).name()).collect();
    assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    // Restartable
    assert_eq!(doc.all_frames().count(), 5);

    for name in &["a", "b", "c", "d", "e"] {
        let id = doc.find_frame(name).unwrap();
        assert_eq!(doc.frame(id).name(), *name);
        assert_eq!(doc.lookup(name), Some(id));
        assert_eq!(doc.all_frames().filter(|&f| doc.frame(f).name() == *name).count(), 1);
    }
    assert_eq!(doc.find_frame("z"), None);
    assert_eq!(doc.chained_name(doc.find_frame("c").unwrap(), " -> "), "a -> b -> c");
    assert_eq!(doc.depth(doc.find_frame("c").unwrap()), 2);
}

#[test]
fn test_walk_sees_later_additions() {
    let mut doc = tree();
    assert_eq!(doc.all_frames().count(), 5);
    let c = doc.find_frame("c").unwrap();
    doc.add_frame(Some(c), "f").unwrap();
    let names: Vec<&str> = doc.all_frames().map(|id| doc.frame(id).name()).collect();
    assert_eq!(names, vec!["a", "b", "c", "f", "d", "e"]);
}

#[test]
fn test_duplicate_names() {
    let mut doc = tree();
    let b = doc.find_frame("b").unwrap();
    match *doc.add_frame(Some(b), "d").unwrap_err().kind() {
        ErrorKind::DuplicateFrame(ref name) => assert_eq!(name, "d"),
        ref k => panic!("unexpected error {:?}", k),
    }
    assert_eq!(doc.frame_count(), 5);

    let mut doc = Document::new(FileInfo::default(), DuplicateNames::KeepFirst);
    let first = doc.add_frame(None, "x").unwrap();
    let second = doc.add_frame(Some(first), "x").unwrap();
    assert_eq!(doc.lookup("x"), Some(first));
    assert_eq!(doc.frame(first).children(), &[second]);
    assert_eq!(doc.frame(second).parent(), Some(first));

    let mut doc = Document::new(FileInfo::default(), DuplicateNames::Rename);
    let first = doc.add_frame(None, "x").unwrap();
    let second = doc.add_frame(Some(first), "x").unwrap();
    assert_eq!(doc.frame(second).name(), "x1");
    assert_eq!(doc.lookup("x1"), Some(second));
}

#[test]
fn test_envelope_count() {
    let mut doc = tree();
    let a = doc.find_frame("a").unwrap();
    let c = doc.find_frame("c").unwrap();
    let d = doc.find_frame("d").unwrap();
    doc.frame_mut(c).is_bone = true;
    doc.frame_mut(d).is_bone = true;
    assert_eq!(doc.envelope_count(), 0);
    assert!(!doc.is_skinned());

    let mut env = Envelope::new(c);
    env.add_weight(0, 50.0);
    env.add_weight(1, 100.0);
    doc.frame_mut(a).envelopes.push(env);
    let mut env = Envelope::new(d);
    env.add_weight(2, 75.0);
    doc.frame_mut(a).envelopes.push(env);

    let e = doc.find_frame("e").unwrap();
    doc.frame_mut(e).envelopes.push(Envelope::new(c));

    assert_eq!(doc.envelope_count(), 3);
    assert_eq!(doc.skinned_frames().collect::<Vec<_>>(), vec![a, e]);
    assert_eq!(doc.bone_frames().collect::<Vec<_>>(), vec![c, d]);
}

#[test]
fn test_animation_frame_range() {
    use super::KeyType;

    let mut doc = tree();
    let b = doc.find_frame("b").unwrap();
    assert_eq!(doc.animation_frame_range(b), None);
    let mut loc = AnimationKey::new(KeyType::Translation);
    loc.add_key(4, &[0.0, 0.0, 0.0]).unwrap();
    loc.add_key(9, &[0.0, 0.0, 0.0]).unwrap();
    let mut scale = AnimationKey::new(KeyType::Scale);
    scale.add_key(2, &[1.0, 1.0, 1.0]).unwrap();
    doc.frame_mut(b).animation_keys = vec![loc, scale];
    assert_eq!(doc.animation_frame_range(b), Some((2, 9)));
    assert_eq!(doc.animated_frames().collect::<Vec<_>>(), vec![b]);
    assert!(doc.is_animated());
}
