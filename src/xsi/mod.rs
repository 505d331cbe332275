//! In-memory model of an XSI scene.
//!
//! A `Document` is an arena of `Frame`s. Each frame is an object or a bone
//! and owns its mesh, animation keys and envelopes. Parent links and the
//! bone an envelope points at are `FrameId`s into the arena, so there is no
//! shared ownership anywhere in the tree.

mod animation;
mod document;
mod material;
mod mesh;

pub use self::animation::{AnimationKey, KeyType, KeyVector};
pub use self::document::{AllFrames, Camera, Document, Envelope, FileInfo, Frame, FrameId, PointLight};
pub use self::material::{Material, MaterialLibrary, ShadingType, DEFAULT_DIFFUSE};
pub use self::mesh::{Face, Mesh};

use cgmath::{vec3, Vector3};

/// Scale/rotation/translation triple. Rotation is Euler angles in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Srt {
    pub scale: Vector3<f64>,
    pub rotation: Vector3<f64>,
    pub translation: Vector3<f64>,
}

impl Srt {
    pub fn identity() -> Srt {
        Srt {
            scale: vec3(1.0, 1.0, 1.0),
            rotation: vec3(0.0, 0.0, 0.0),
            translation: vec3(0.0, 0.0, 0.0),
        }
    }
}
