//! Export options.

use std::str::FromStr;

/// Which objects become root frames.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExportMode {
    /// Unparented, visible objects of the active collection.
    ActiveCollection,
    /// Selected objects (and, through them, their children).
    SelectedObjects,
}

/// What to do when a frame name is already in use.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DuplicateNames {
    /// Fail the export.
    Reject,
    /// Link the new frame, but leave the name table pointing at the first.
    KeepFirst,
    /// Give the new frame a fresh name by appending a number.
    Rename,
}

impl FromStr for ExportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<ExportMode, String> {
        match s {
            "active-collection" | "collection" => Ok(ExportMode::ActiveCollection),
            "selected-objects" | "selected" => Ok(ExportMode::SelectedObjects),
            _ => Err(format!("unknown export mode {:?}", s)),
        }
    }
}

impl FromStr for DuplicateNames {
    type Err = String;

    fn from_str(s: &str) -> Result<DuplicateNames, String> {
        match s {
            "reject" => Ok(DuplicateNames::Reject),
            "keep-first" => Ok(DuplicateNames::KeepFirst),
            "rename" => Ok(DuplicateNames::Rename),
            _ => Err(format!("unknown duplicate name policy {:?}", s)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ExportOptions {
    pub export_mode: ExportMode,
    pub export_mesh: bool,
    pub export_mesh_uvmap: bool,
    pub export_mesh_materials: bool,
    pub export_mesh_vertcolor: bool,
    pub export_envelopes: bool,
    pub export_animations: bool,
    /// Rotation keys as Euler angles instead of quaternions.
    pub export_euler: bool,
    /// Root frames get an identity SRT.
    pub zero_root_transforms: bool,
    /// Pointer meshes for empties.
    pub generate_empty_mesh: bool,
    /// Visualization meshes for bones.
    pub generate_bone_mesh: bool,

    pub duplicate_names: DuplicateNames,
    /// Roll object and bone matrices from Y-front to X-front.
    pub axis_roll: bool,
    /// Swap vertex Y/Z (new y = old z, new z = -old y).
    pub swap_mesh_axes: bool,
    /// Scale bones parented to a bone named "face" by `FACE_BONE_SCALE`.
    pub face_bone_scale_fix: bool,
    pub allow_mesh_with_no_faces: bool,
    pub allow_mesh_with_no_material: bool,
    pub allow_root_animation: bool,
    /// Name meshes after their frame instead of the host mesh.
    pub frame_name_as_mesh_name: bool,
    /// Texture paths in custom property sets are cut to the part after this
    /// directory.
    pub texture_root: Option<String>,
}

pub static FACE_BONE_SCALE: f64 = 1.087;

impl Default for ExportOptions {
    fn default() -> ExportOptions {
        ExportOptions {
            export_mode: ExportMode::ActiveCollection,
            export_mesh: true,
            export_mesh_uvmap: true,
            export_mesh_materials: true,
            export_mesh_vertcolor: true,
            export_envelopes: true,
            export_animations: true,
            export_euler: true,
            zero_root_transforms: true,
            generate_empty_mesh: false,
            generate_bone_mesh: false,

            duplicate_names: DuplicateNames::Reject,
            axis_roll: true,
            swap_mesh_axes: true,
            face_bone_scale_fix: false,
            allow_mesh_with_no_faces: false,
            allow_mesh_with_no_material: false,
            allow_root_animation: true,
            frame_name_as_mesh_name: true,
            texture_root: None,
        }
    }
}

#[test]
fn test_parse_policies() {
    assert_eq!("selected".parse::<ExportMode>(), Ok(ExportMode::SelectedObjects));
    assert_eq!("active-collection".parse::<ExportMode>(), Ok(ExportMode::ActiveCollection));
    assert!("everything".parse::<ExportMode>().is_err());
    assert_eq!("keep-first".parse::<DuplicateNames>(), Ok(DuplicateNames::KeepFirst));
    assert_eq!("rename".parse::<DuplicateNames>(), Ok(DuplicateNames::Rename));
    assert!("ignore".parse::<DuplicateNames>().is_err());
}
