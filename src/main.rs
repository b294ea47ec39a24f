use std::path::{Path, PathBuf};

use matchviz::engine::MatchViewer;
use matchviz::error::MatchVizError;
use matchviz::options::Options;
use matchviz::renderer::RecordingRenderer;
use matchviz::source::{DataSource, DirectorySource};

struct Args {
    data_dir: PathBuf,
    frame_id: Option<u32>,
    options: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = std::env::args().skip(1);
    let data_dir = args
        .next()
        .map(PathBuf::from)
        .ok_or("missing data directory")?;
    let frame_id = match args.next() {
        Some(s) => Some(s.parse().map_err(|_| format!("bad frame id {s:?}"))?),
        None => None,
    };
    Ok(Args {
        data_dir,
        frame_id,
        options: args.next().map(PathBuf::from),
    })
}

fn run(args: &Args) -> Result<(), MatchVizError> {
    let options = match &args.options {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };
    let source = DirectorySource::new(&args.data_dir);
    let frames = source.available_frames()?;
    log::info!(
        "{} frames available in {}",
        frames.len(),
        args.data_dir.display()
    );
    let Some(frame_id) = args.frame_id.or_else(|| frames.first().copied())
    else {
        log::error!("no frames in {}", args.data_dir.display());
        return Ok(());
    };

    let export = options.display.export_id_lists;
    let mut viewer =
        MatchViewer::with_options(source, RecordingRenderer::default(), options);
    let report = viewer.load_frame(frame_id)?;
    if let Some(delta) = report.transform_delta {
        log::info!(
            "T_opt vs T_init: |dt| = {:.6}, dq = {:?}",
            delta.translation_norm(),
            delta.rotation
        );
    }
    if let Some((before, after)) = report.cost {
        log::info!("optimizer cost {before:.5} -> {after:.5}");
    }
    if let Some(dense) = &report.dense {
        log::info!(
            "map dense cloud: {} matched, {} unmatched, {} matched to plane",
            dense.matched.len(),
            dense.unmatched.len(),
            dense.matched_to_plane.len()
        );
    }
    for name in viewer.registry().renderer().names() {
        log::info!("  {name}");
    }

    if export {
        let dir = frame_dir(&args.data_dir, frame_id);
        if let Some(files) = viewer.export_id_lists(&dir)? {
            log::info!(
                "wrote {} and {}",
                files.matched.display(),
                files.unmatched.display()
            );
        }
    }
    viewer.registry_mut().mark_rendered();
    Ok(())
}

fn frame_dir(root: &Path, frame_id: u32) -> PathBuf {
    root.join(frame_id.to_string())
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            log::error!("{e}");
            log::error!("Usage: matchviz <data_dir> [frame_id] [options.toml]");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(&args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
