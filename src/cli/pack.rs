//! Pack command implementation

use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::PackConfig;
use crate::output::load_indexed_png;
use crate::sheet::ShpSheet;

use super::{find_png_files, is_png_file, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Expand directories into their PNG files, keeping argument order.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, String> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let found = find_png_files(input);
            if found.is_empty() {
                return Err(format!("No PNG files found in '{}'", input.display()));
            }
            files.extend(found);
        } else if is_png_file(input) {
            files.push(input.clone());
        } else {
            return Err(format!("'{}' is not a PNG file or directory", input.display()));
        }
    }
    Ok(files)
}

/// Execute the pack command
pub fn run_pack(inputs: &[PathBuf], config: &PackConfig) -> ExitCode {
    let Some(output) = config.out.as_deref() else {
        eprintln!("Error: No output file given (use -o or set [pack] out in shp.toml)");
        return ExitCode::from(EXIT_INVALID_ARGS);
    };

    let files = match collect_inputs(inputs) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let mut size = None;
    let mut frames = Vec::with_capacity(files.len());
    for path in &files {
        let (frame_size, data) = match load_indexed_png(path) {
            Ok(loaded) => loaded,
            Err(e) => {
                eprintln!("Error: Cannot read '{}': {}", path.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        };

        match size {
            None => size = Some(frame_size),
            Some(expected) if expected != frame_size => {
                eprintln!(
                    "Error: '{}' is {}x{}, expected {}x{} like the first frame",
                    path.display(),
                    frame_size.0,
                    frame_size.1,
                    expected.0,
                    expected.1
                );
                return ExitCode::from(EXIT_ERROR);
            }
            Some(_) => {}
        }
        frames.push(data);
    }

    let Some(size) = size else {
        eprintln!("Error: No input frames");
        return ExitCode::from(EXIT_INVALID_ARGS);
    };

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: Cannot create '{}': {}", parent.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = ShpSheet::save(output, size, &frames) {
        eprintln!("Error: Failed to write '{}': {}", output.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    if config.verify {
        match ShpSheet::load(output) {
            Ok(sheet) if sheet.frames().iter().map(|f| f.data()).eq(frames.iter().map(Vec::as_slice)) => {}
            Ok(_) => {
                eprintln!("Error: '{}' does not decode to the packed frames", output.display());
                return ExitCode::from(EXIT_ERROR);
            }
            Err(e) => {
                eprintln!("Error: '{}' failed to reload: {}", output.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    println!("Packed {} frames ({}x{}) into {}", frames.len(), size.0, size.1, output.display());
    ExitCode::from(EXIT_SUCCESS)
}
