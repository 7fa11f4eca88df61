// std
use std::path::{Path, PathBuf};
use std::process;
// others
use anyhow::Result;
use structopt::StructOpt;
// lumiray
use lumiray::core::api::render_scene_file;

/// Offline physically based Monte Carlo path tracer.
#[derive(StructOpt)]
#[structopt(name = "lumiray")]
struct Opt {
    /// JSON scene description; the image is written next to it as
    /// <scene-stem>.exr
    #[structopt(parse(from_os_str))]
    scene: PathBuf,
}

fn run(scene_path: &Path) -> Result<()> {
    let img = render_scene_file(scene_path)?;
    let out = scene_path.with_extension("exr");
    img.write_exr(&out)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opt = Opt::from_args();
    if let Err(err) = run(&opt.scene) {
        eprintln!("error: {:#}", err);
        process::exit(1);
    }
}
