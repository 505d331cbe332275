//! Builds a `Document` from a host scene.
//!
//! One depth-first pass over the exported objects. Each object, and each
//! bone of each armature, becomes a frame; meshes and animation keys are
//! attached as frames are created. Skin envelopes need every bone frame to
//! exist first, so they're bound in a second pass at the end.

mod anim;
mod mesh;
mod placeholder;

pub use self::anim::{parse_data_path, AnimTarget, Channel};
pub use self::mesh::{convert_material, convert_mesh};
pub use self::placeholder::{bone_mesh, pointer_mesh};

use self::anim::Channels;
use crate::basis::{bone_axis_roll, inverted_safe, to_scale, to_srt, to_target_basis};
use crate::config::{ExportMode, ExportOptions, FACE_BONE_SCALE};
use crate::errors::Result;
use crate::host::{Armature, BoneId, HostScene, Object, ObjectId, ObjectKind, PinnedClock};
use crate::util::name::source_file_stem;
use crate::xsi::{AnimationKey, Document, Envelope, FileInfo, FrameId, Srt};
use cgmath::{InnerSpace, Matrix4, vec3};
use std::collections::HashSet;
use std::mem;

/// Objects with these names are placement helpers; they always get an
/// identity SRT.
static IDENTITY_NAMES: &[&str] = &["mesh_root", "skeleton_root"];

/// Name of the bone whose children the face-bone scale fix applies to.
static FACE_BONE_NAME: &str = "face";

/// Walk `scene` and build the document to export.
///
/// The scene's clock is moved while sampling animation and skin weights,
/// and is back where it started when this returns, error or not.
pub fn build_document<S: HostScene + ?Sized>(scene: &mut S, opts: &ExportOptions) -> Result<Document> {
    let info = file_info(&*scene)?;
    let mut b = Builder {
        scene: PinnedClock::pin(scene),
        opts,
        doc: Document::new(info, opts.duplicate_names),
        referenced: HashSet::new(),
        channels: Channels::default(),
        skinned: vec![],
        bone_frames: vec![],
    };

    let roots = b.select_roots();
    let referenced = referenced_objects(&*b.scene, &roots);
    if opts.export_animations {
        b.channels = Channels::collect(&*b.scene, &referenced);
    }
    b.referenced = referenced.into_iter().collect();

    for &root in &roots {
        if b.scene.object(root).kind.is_exportable() {
            b.object_to_frame(None, root, true)?;
        }
    }

    if opts.export_envelopes {
        b.bind_skins();
    }

    info!("built {} frames ({} roots)", b.doc.frame_count(), b.doc.roots().len());
    Ok(b.doc)
}

fn file_info<S: HostScene + ?Sized>(scene: &S) -> Result<FileInfo> {
    let info = scene.info();
    let date = time::strftime("%a %b %d %H:%M:%S %Y", &time::now())?;
    Ok(FileInfo {
        source_name: source_file_stem(&info.file_name),
        user: info.user.clone(),
        date,
        application: info.application.clone(),
        scene_name: info.scene_name.clone(),
        frame_start: info.frame_start as f64,
        frame_end: info.frame_end as f64,
        fps: info.fps,
    })
}

/// The roots and every exportable object below them.
fn referenced_objects<S: HostScene + ?Sized>(scene: &S, roots: &[ObjectId]) -> Vec<ObjectId> {
    fn walk<S: HostScene + ?Sized>(scene: &S, id: ObjectId, out: &mut Vec<ObjectId>) {
        for &child in &scene.object(id).children {
            if scene.object(child).kind.is_exportable() {
                out.push(child);
            }
            walk(scene, child, out);
        }
    }

    let mut out = roots.to_vec();
    for &root in roots {
        walk(scene, root, &mut out);
    }
    out
}

/// The matrix written for a frame: `local` relative to `parent`, rolled to
/// X-front when `axis_roll` is set, in the target basis.
fn frame_matrix(
    parent: Option<&Matrix4<f64>>,
    local: &Matrix4<f64>,
    axis_roll: bool,
    face_fix: bool,
) -> Matrix4<f64> {
    let roll = |m: &Matrix4<f64>| if axis_roll { bone_axis_roll(m) } else { *m };

    let mut m = roll(local);
    if let Some(parent) = parent {
        m = inverted_safe(&roll(parent)) * m;
    }
    if face_fix {
        m = m * Matrix4::from_scale(FACE_BONE_SCALE);
    }
    to_target_basis(&m)
}

struct Builder<'a, S: HostScene + ?Sized> {
    scene: PinnedClock<'a, S>,
    opts: &'a ExportOptions,
    doc: Document,
    /// Objects being exported; armature modifiers pointing elsewhere don't
    /// make a mesh skinned.
    referenced: HashSet<ObjectId>,
    channels: Channels,
    /// Frames with a skinned mesh, the object they came from and the
    /// armature deforming it.
    skinned: Vec<(FrameId, ObjectId, ObjectId)>,
    /// Bone frames by armature and bone name, in the order they were
    /// created.
    bone_frames: Vec<(ObjectId, String, FrameId)>,
}

impl<'a, S: HostScene + ?Sized> Builder<'a, S> {
    fn select_roots(&self) -> Vec<ObjectId> {
        let scene = &*self.scene;

        let roots: Vec<ObjectId> = match self.opts.export_mode {
            ExportMode::ActiveCollection => {
                scene.active_collection().into_iter()
                    .filter(|&id| {
                        let obj = scene.object(id);
                        obj.parent.is_none() && !obj.hidden
                    })
                    .collect()
            }
            ExportMode::SelectedObjects => {
                // Selecting a parent and its child shouldn't export the child
                // twice.
                let selected = scene.selected();
                let selected_set: HashSet<ObjectId> = selected.iter().cloned().collect();
                let has_selected_ancestor = |id: ObjectId| {
                    let mut cur = scene.object(id).parent;
                    while let Some(p) = cur {
                        if selected_set.contains(&p) {
                            return true;
                        }
                        cur = scene.object(p).parent;
                    }
                    false
                };
                selected.iter().cloned()
                    .filter(|&id| !has_selected_ancestor(id))
                    .collect()
            }
        };

        if roots.len() >= 2 {
            let names: Vec<&str> = roots.iter().map(|&id| scene.object(id).name.as_str()).collect();
            warn!("only one root-level object is supported well, found {}: {}",
                roots.len(), names.join(", "));
        }
        if roots.is_empty() {
            warn!("nothing to export");
        }

        roots
    }

    fn armature_of(&self, obj: &Object) -> Option<ObjectId> {
        if obj.armature_modifiers.len() > 1 {
            warn!("multiple armature modifiers on {:?} may cause unexpected results", obj.name);
        }
        obj.armature_modifiers.first().cloned()
    }

    fn object_to_frame(&mut self, parent: Option<FrameId>, id: ObjectId, is_root: bool) -> Result<FrameId> {
        let obj = self.scene.object(id).clone();
        let opts = self.opts;

        let frame = self.doc.add_frame(parent, &obj.name)?;
        debug!("object {}", self.doc.chained_name(frame, " -> "));

        let skin = if opts.export_envelopes {
            self.armature_of(&obj).filter(|arm| self.referenced.contains(arm))
        } else {
            None
        };

        let srt = if is_root && opts.zero_root_transforms {
            Srt::identity()
        } else if IDENTITY_NAMES.contains(&obj.name.as_str()) {
            Srt::identity()
        } else {
            let parent_matrix = obj.parent.map(|p| self.scene.object(p).matrix_local);
            to_srt(&frame_matrix(parent_matrix.as_ref(), &obj.matrix_local, opts.axis_roll, false))
        };
        self.doc.frame_mut(frame).srt = Some(srt);

        if skin.is_some() {
            self.doc.frame_mut(frame).basepose = Some(to_srt(&to_target_basis(&obj.matrix_local)));
        }

        let scale = to_scale(&self.scene.matrix_local(id));
        if (scale - vec3(1.0, 1.0, 1.0)).magnitude() > 1e-6 {
            warn!("scale ({}, {}, {}) of object {:?} is not supported by the target engine",
                scale.x, scale.y, scale.z, obj.name);
        }

        let has_vertices = self.scene.mesh(id).map_or(false, |m| !m.vertices.is_empty());
        if obj.kind == ObjectKind::Mesh && has_vertices {
            self.attach_mesh(frame, id, skin);
        } else if obj.kind == ObjectKind::Armature {
            match self.scene.armature(id).cloned() {
                Some(arm) => {
                    for bone in arm.root_bones() {
                        self.bone_to_frame(frame, id, &arm, bone)?;
                    }
                }
                None => warn!("armature object {:?} has no armature data", obj.name),
            }
        } else if opts.generate_empty_mesh {
            // Empties, and anything else without geometry.
            let name = self.doc.frame(frame).name().to_string();
            self.doc.frame_mut(frame).mesh = Some(placeholder::pointer_mesh(&name));
        }

        if opts.export_animations {
            let parent_id = obj.parent;
            let axis_roll = opts.axis_roll;
            let mut keys = self.sample_animation(&AnimTarget::Object(id), |s| {
                let parent = parent_id.map(|p| s.matrix_local(p));
                frame_matrix(parent.as_ref(), &s.matrix_local(id), axis_roll, false)
            })?;

            if is_root && !opts.allow_root_animation {
                keys.clear();
            }
            if is_root && !keys.is_empty() {
                warn!("animation on root-level object {:?} may not behave as expected", obj.name);
            }
            self.doc.frame_mut(frame).animation_keys.extend(keys);
        }

        for &child in &obj.children {
            if self.scene.object(child).kind.is_exportable() {
                self.object_to_frame(Some(frame), child, false)?;
            }
        }

        Ok(frame)
    }

    fn attach_mesh(&mut self, frame: FrameId, id: ObjectId, skin: Option<ObjectId>) {
        let opts = self.opts;
        let data = match self.scene.mesh(id) {
            Some(data) => data,
            None => return,
        };

        if data.polygons.is_empty() && !opts.allow_mesh_with_no_faces {
            warn!("mesh for object {:?} has no faces, ignoring mesh data", self.scene.object(id).name);
            return;
        }
        if !opts.export_mesh {
            return;
        }

        let name = if opts.frame_name_as_mesh_name {
            self.doc.frame(frame).name().to_string()
        } else {
            data.name.clone()
        };
        let mesh = mesh::convert_mesh(data, name, opts);
        debug!("mesh {:?}: {} vertices, {} faces", mesh.name, mesh.vertices.len(), mesh.faces.len());
        self.doc.frame_mut(frame).mesh = Some(mesh);

        if let Some(armature) = skin {
            self.skinned.push((frame, id, armature));
        }
    }

    fn bone_to_frame(&mut self, parent: FrameId, armature: ObjectId, arm: &Armature, id: BoneId) -> Result<FrameId> {
        let opts = self.opts;
        let bone = arm.bone(id);

        let frame = self.doc.add_frame(Some(parent), &bone.name)?;
        self.doc.frame_mut(frame).is_bone = true;
        match self.bone_frames.iter_mut().find(|entry| entry.0 == armature && entry.1 == bone.name) {
            Some(entry) => entry.2 = frame,
            None => self.bone_frames.push((armature, bone.name.clone(), frame)),
        }
        trace!("bone {}", self.doc.chained_name(frame, " -> "));

        // Root bones are relative to the armature, the rest to their parent
        // bone.
        let parent_bone = bone.parent.map(|p| arm.bone(p));
        let face_fix = opts.face_bone_scale_fix &&
            parent_bone.map_or(false, |p| p.name == FACE_BONE_NAME);

        let m = frame_matrix(parent_bone.map(|p| &p.matrix_local), &bone.matrix_local, opts.axis_roll, face_fix);
        self.doc.frame_mut(frame).srt = Some(to_srt(&m));

        let rest = if opts.axis_roll { bone_axis_roll(&bone.matrix_local) } else { bone.matrix_local };
        self.doc.frame_mut(frame).basepose = Some(to_srt(&to_target_basis(&rest)));

        for &child in &bone.children {
            self.bone_to_frame(frame, armature, arm, child)?;
        }

        if opts.generate_bone_mesh {
            self.doc.frame_mut(frame).mesh = Some(placeholder::bone_mesh(&bone.name, bone));
        }

        if opts.export_animations {
            let parent_id = bone.parent;
            let axis_roll = opts.axis_roll;
            let target = AnimTarget::Bone(armature, bone.name.clone());
            let keys = self.sample_animation(&target, |s| {
                let parent = parent_id.map(|p| s.pose_matrix(armature, p));
                frame_matrix(parent.as_ref(), &s.pose_matrix(armature, id), axis_roll, face_fix)
            })?;
            self.doc.frame_mut(frame).animation_keys.extend(keys);
        }

        Ok(frame)
    }

    /// Sample the keyed channels of `target` at every frame of the scene,
    /// `matrix_at` giving the frame matrix for the current time.
    fn sample_animation<F>(&mut self, target: &AnimTarget, matrix_at: F) -> Result<Vec<AnimationKey>>
    where F: Fn(&S) -> Matrix4<f64> {
        let key_types = self.channels.key_types(target, self.opts.export_euler);
        if key_types.is_empty() {
            return Ok(vec![]);
        }

        let (start, end) = {
            let info = self.scene.info();
            (info.frame_start, info.frame_end)
        };
        let scene = &mut self.scene;
        anim::sample_keys(&key_types, start..=end, |t| scene.with_time(t, &matrix_at))
    }

    /// Give every skinned mesh an envelope for each bone of its armature it
    /// has a vertex group for. Weights are read at the first frame of the scene, which is
    /// taken to be the bind pose.
    fn bind_skins(&mut self) {
        let start = self.scene.info().frame_start;
        let skinned = mem::replace(&mut self.skinned, vec![]);

        for (frame, id, armature) in skinned {
            let groups = self.scene.with_time(start, |s| s.vertex_groups(id).to_vec());

            let bones = self.bone_frames.iter().filter(|entry| entry.0 == armature);
            for &(_, ref bone_name, bone_frame) in bones {
                let group = match groups.iter().find(|g| &g.name == bone_name) {
                    Some(g) => g,
                    None => {
                        warn!("vertex group not found for bone {:?} in {:?}",
                            bone_name, self.doc.frame(frame).name());
                        continue;
                    }
                };
                let mut envelope = Envelope::new(bone_frame);
                for &(vertex, weight) in &group.weights {
                    envelope.add_weight(vertex, weight * 100.0);
                }
                self.doc.frame_mut(frame).envelopes.push(envelope);
            }
        }
    }
}
