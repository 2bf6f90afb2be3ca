//! Render a saved scene document to an image file.
//!
//! Usage: `scene_editor <document.json> <output.(jpg|png)> [quality]`

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use scene_editor::{EditorConfig, EditorError, ExportFormat, Session};

fn usage() -> ExitCode {
    eprintln!("usage: scene_editor <document.json> <output.(jpg|png)> [quality 0..1]");
    ExitCode::from(2)
}

fn export(document: &Path, output: &Path, quality: f32) -> Result<(), EditorError> {
    let format = output
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ExportFormat::from_extension)
        .unwrap_or_default();

    let mut session = Session::headless(EditorConfig::default())?;
    futures::executor::block_on(session.open_document(document))?;
    let bytes = session.export_raster(format, quality)?;
    std::fs::write(output, &bytes).map_err(scene_editor::PersistenceError::from)?;
    log::info!("Wrote {} ({} bytes)", output.display(), bytes.len());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (document, output) = match args.as_slice() {
        [document, output] | [document, output, _] => (PathBuf::from(document), PathBuf::from(output)),
        _ => return usage(),
    };
    let quality = match args.get(2).map(|raw| raw.parse::<f32>()) {
        None => 1.0,
        Some(Ok(quality)) => quality,
        Some(Err(_)) => return usage(),
    };

    match export(&document, &output, quality) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("Export failed: {}", err);
            ExitCode::FAILURE
        }
    }
}
