use crate::cli;
use clap::ArgMatches;
use dotxsi::builder::build_document;
use dotxsi::errors::Result;
use dotxsi::host::snapshot::SceneSnapshot;
use dotxsi::xsi::{Document, FrameId};
use std::fs;
use std::path::PathBuf;

pub fn main(matches: &ArgMatches) -> Result<()> {
    let opts = cli::export_options(matches)?;
    let input = PathBuf::from(matches.value_of_os("INPUT").unwrap_or_default());

    let text = fs::read_to_string(&input)?;
    let mut scene = SceneSnapshot::from_json(&text)?;
    let doc = build_document(&mut scene, &opts)?;

    let info = &doc.info;
    println!("Scene {:?} (from {:?})", info.scene_name, info.source_name);
    println!("  Frames {} to {} at {} fps", info.frame_start, info.frame_end, info.fps);
    println!("  {} frames, {} roots", doc.frame_count(), doc.roots().len());
    println!("  Animated: {}", if doc.is_animated() { "yes" } else { "no" });
    println!("  Skinned: {} ({} envelopes)",
        if doc.is_skinned() { "yes" } else { "no" },
        doc.envelope_count(),
    );
    println!();

    for id in doc.all_frames() {
        frame_info(&doc, id);
    }

    Ok(())
}

fn frame_info(doc: &Document, id: FrameId) {
    let frame = doc.frame(id);
    println!("{}{}", "  ".repeat(doc.depth(id)), doc.chained_name(id, " -> "));

    let indent = "  ".repeat(doc.depth(id) + 1);
    if frame.is_bone {
        println!("{}bone", indent);
    }
    if let Some(ref mesh) = frame.mesh {
        print!("{}mesh: {} vertices, {} faces", indent, mesh.vertices.len(), mesh.faces.len());
        let (_, materials) = mesh.material_indices();
        if !materials.is_empty() {
            print!(", {} materials", materials.len());
        }
        println!();
    }
    if !frame.envelopes.is_empty() {
        let bones: Vec<&str> = frame.envelopes.iter()
            .map(|e| doc.frame(e.bone).name())
            .collect();
        println!("{}envelopes: {}", indent, bones.join(", "));
    }
    if let Some((start, end)) = doc.animation_frame_range(id) {
        println!("{}animation: {} keys, frames {} to {}", indent, frame.animation_keys.len(), start, end);
    }
}
