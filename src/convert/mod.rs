use crate::cli;
use clap::ArgMatches;
use dotxsi::errors::Result;
use dotxsi::host::snapshot::SceneSnapshot;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

pub fn main(matches: &ArgMatches) -> Result<()> {
    let opts = cli::export_options(matches)?;

    // INPUT and OUTPUT are required; clap has already checked.
    let input = PathBuf::from(matches.value_of_os("INPUT").unwrap_or_default());
    let output = PathBuf::from(matches.value_of_os("OUTPUT").unwrap_or_default());

    let text = fs::read_to_string(&input)?;
    let mut scene = SceneSnapshot::from_json(&text)?;
    info!("read scene {:?} from {}", scene.info.scene_name, input.display());

    let f = BufWriter::new(File::create(&output)?);
    let mut f = dotxsi::export(&mut scene, &opts, f)?;
    std::io::Write::flush(&mut f)?;

    info!("wrote {}", output.display());
    Ok(())
}
