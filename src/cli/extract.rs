//! Extract command implementation

use image::GrayImage;
use rayon::prelude::*;
use std::path::Path;
use std::process::ExitCode;

use crate::config::ExtractConfig;
use crate::output::{
    frame_output_path, frame_to_image, render_sheet, save_png, scale_image, sheet_output_path,
    OutputError,
};
use crate::sheet::ShpSheet;

use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Execute the extract command
pub fn run_extract(input: &Path, config: &ExtractConfig) -> ExitCode {
    let sheet = match ShpSheet::load(input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}: {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if sheet.is_empty() {
        eprintln!("Error: {} contains no frames", input.display());
        return ExitCode::from(EXIT_ERROR);
    }

    let images: Result<Vec<GrayImage>, OutputError> = sheet.frames().iter().map(frame_to_image).collect();
    let images = match images {
        Ok(images) => images,
        Err(e) => {
            eprintln!("Error: {}: {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let out_dir = config.out.as_deref();
    let result = if config.sheet {
        let path = sheet_output_path(input, out_dir);
        let image = scale_image(render_sheet(&images, config.columns), config.scale);
        save_png(&image, &path).map(|()| {
            println!("Saved: {}", path.display());
        })
    } else {
        write_frames(input, images, out_dir, config.scale)
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("Error: Failed to write output: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Write one PNG per frame, in parallel.
fn write_frames(
    input: &Path,
    images: Vec<GrayImage>,
    out_dir: Option<&Path>,
    scale: u8,
) -> Result<(), OutputError> {
    let count = images.len();
    images.into_par_iter().enumerate().try_for_each(|(index, image)| {
        let path = frame_output_path(input, index, out_dir);
        save_png(&scale_image(image, scale), &path)
    })?;

    println!("Saved {} frames from {}", count, input.display());
    Ok(())
}
