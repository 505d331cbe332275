//! Command line definition, and turning the matches into export options.

use clap::{App, ArgMatches};
use dotxsi::config::{DuplicateNames, ExportMode, ExportOptions};
use dotxsi::errors::Result;
use log::Level;

pub fn app() -> App<'static, 'static> {
    clap_app!(dotxsi =>
        (@setting SubcommandRequiredElseHelp)
        (@setting VersionlessSubcommands)
        (version: crate_version!())
        (about: "Export a 3D scene dump to XSI 0300txt")
        (@arg verbose: -v --verbose +multiple +global "More logging (-vv for even more)")
        (@arg quiet: -q --quiet +global "Only log errors")
        (@subcommand convert =>
            (about: "Convert a scene to an .xsi file")
            (alias: "c")
            (@arg INPUT: +required "Scene dump (JSON)")
            (@arg OUTPUT: -o --output +takes_value +required "Output .xsi file")
            (@arg mode: --mode +takes_value
                "Which objects become roots: active-collection or selected-objects")
            (@arg duplicate_names: --("duplicate-names") +takes_value
                "What to do with a repeated frame name: reject, keep-first or rename")
            (@arg no_mesh: --("no-mesh") "Don't export meshes")
            (@arg no_uv: --("no-uv") "Don't export UV maps")
            (@arg no_materials: --("no-materials") "Don't export materials")
            (@arg no_vertex_colors: --("no-vertex-colors") "Don't export vertex colors")
            (@arg no_envelopes: --("no-envelopes") "Don't export skin weights")
            (@arg no_animations: --("no-animations") "Don't export animation")
            (@arg quaternions: --quaternions "Write rotation keys as quaternions instead of Euler angles")
            (@arg keep_root_transforms: --("keep-root-transforms") "Don't zero the transform of root objects")
            (@arg empty_meshes: --("empty-meshes") "Give empties a small pointer mesh")
            (@arg bone_meshes: --("bone-meshes") "Give bones a visualization mesh")
            (@arg no_axis_roll: --("no-axis-roll") "Don't roll objects and bones to X-front")
            (@arg no_axis_swap: --("no-axis-swap") "Don't swap mesh Y and Z")
            (@arg face_bone_fix: --("face-bone-fix") "Scale children of the \"face\" bone")
            (@arg allow_faceless: --("allow-faceless-meshes") "Keep meshes that have no faces")
            (@arg allow_no_material: --("allow-no-material") "Don't add a default material to meshes without one")
            (@arg no_root_animation: --("no-root-animation") "Drop animation on root objects")
            (@arg data_mesh_names: --("data-mesh-names") "Name meshes after the mesh data, not the object")
            (@arg texture_root: --("texture-root") +takes_value
                "Write texture paths relative to this directory marker")
        )
        (@subcommand info =>
            (about: "Print the frame tree a scene would export to")
            (alias: "i")
            (@arg INPUT: +required "Scene dump (JSON)")
            (@arg mode: --mode +takes_value
                "Which objects become roots: active-collection or selected-objects")
            (@arg duplicate_names: --("duplicate-names") +takes_value
                "What to do with a repeated frame name: reject, keep-first or rename")
        )
        (@subcommand version =>
            (about: "Print version and build information")
        )
    )
}

pub fn log_level(matches: &ArgMatches) -> Level {
    // Globals given after the subcommand may only show up in its matches.
    let sub = matches.subcommand().1;
    let quiet = matches.is_present("quiet") || sub.map_or(false, |m| m.is_present("quiet"));
    let verbose = matches.occurrences_of("verbose")
        .max(sub.map_or(0, |m| m.occurrences_of("verbose")));
    if quiet {
        return Level::Error;
    }
    match verbose {
        0 => Level::Info,
        1 => Level::Debug,
        _ => Level::Trace,
    }
}

/// Export options for a subcommand's matches. Flags that a subcommand
/// doesn't define read as absent, so they keep their defaults.
pub fn export_options(matches: &ArgMatches) -> Result<ExportOptions> {
    let flag = |name: &str| matches.is_present(name);
    let mut opts = ExportOptions::default();

    if let Some(mode) = matches.value_of("mode") {
        opts.export_mode = mode.parse::<ExportMode>()?;
    }
    if let Some(policy) = matches.value_of("duplicate_names") {
        opts.duplicate_names = policy.parse::<DuplicateNames>()?;
    }

    opts.export_mesh = !flag("no_mesh");
    opts.export_mesh_uvmap = !flag("no_uv");
    opts.export_mesh_materials = !flag("no_materials");
    opts.export_mesh_vertcolor = !flag("no_vertex_colors");
    opts.export_envelopes = !flag("no_envelopes");
    opts.export_animations = !flag("no_animations");
    opts.export_euler = !flag("quaternions");
    opts.zero_root_transforms = !flag("keep_root_transforms");
    opts.generate_empty_mesh = flag("empty_meshes");
    opts.generate_bone_mesh = flag("bone_meshes");
    opts.axis_roll = !flag("no_axis_roll");
    opts.swap_mesh_axes = !flag("no_axis_swap");
    opts.face_bone_scale_fix = flag("face_bone_fix");
    opts.allow_mesh_with_no_faces = flag("allow_faceless");
    opts.allow_mesh_with_no_material = flag("allow_no_material");
    opts.allow_root_animation = !flag("no_root_animation");
    opts.frame_name_as_mesh_name = !flag("data_mesh_names");
    opts.texture_root = matches.value_of("texture_root").map(|s| s.to_string());

    Ok(opts)
}

#[test]
fn test_export_options() {
    let matches = app().get_matches_from(vec![
        "dotxsi", "convert", "scene.json", "-o", "out.xsi",
        "--mode", "selected", "--no-uv", "--quaternions", "--texture-root", "base\\",
    ]);
    let m = matches.subcommand_matches("convert").unwrap();
    let opts = export_options(m).unwrap();
    assert_eq!(opts.export_mode, ExportMode::SelectedObjects);
    assert!(!opts.export_mesh_uvmap);
    assert!(!opts.export_euler);
    assert!(opts.export_mesh_materials);
    assert!(opts.axis_roll);
    assert_eq!(opts.texture_root.as_ref().map(|s| &s[..]), Some("base\\"));
    assert_eq!(opts.duplicate_names, DuplicateNames::Reject);
}

#[test]
fn test_log_level() {
    let matches = app().get_matches_from(vec!["dotxsi", "info", "scene.json", "-vv"]);
    assert_eq!(log_level(&matches), Level::Trace);
    let matches = app().get_matches_from(vec!["dotxsi", "-q", "info", "scene.json"]);
    assert_eq!(log_level(&matches), Level::Error);
}
