//! PNG export/import of frames and output path generation
//!
//! Frames hold palette indices, not colors. They are written as 8-bit
//! grayscale PNGs where each pixel's luma is its palette index, which keeps
//! the index data lossless and lets `pack` read the same files back.

use image::imageops::FilterType;
use image::{GrayImage, Luma};
use std::io;
use std::path::{Path, PathBuf};

use crate::sheet::ShpFrame;

/// Index used for padding cells in a spritesheet
const PADDING_INDEX: Luma<u8> = Luma([0]);

/// Error type for output operations
#[derive(Debug)]
pub enum OutputError {
    /// IO error during file operations
    Io(io::Error),
    /// Image encoding or decoding error
    Image(image::ImageError),
    /// Frame has no pixels and cannot be written as an image
    EmptyFrame,
    /// Image dimensions do not fit the 16-bit canvas size of a container
    TooLarge { width: u32, height: u32 },
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "IO error: {}", e),
            OutputError::Image(e) => write!(f, "Image error: {}", e),
            OutputError::EmptyFrame => write!(f, "frame has an empty canvas"),
            OutputError::TooLarge { width, height } => {
                write!(f, "image size {}x{} exceeds the 65535x65535 canvas limit", width, height)
            }
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io(e) => Some(e),
            OutputError::Image(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for OutputError {
    fn from(e: io::Error) -> Self {
        OutputError::Io(e)
    }
}

impl From<image::ImageError> for OutputError {
    fn from(e: image::ImageError) -> Self {
        OutputError::Image(e)
    }
}

/// Convert a decoded frame into a grayscale image of its palette indices.
pub fn frame_to_image(frame: &ShpFrame) -> Result<GrayImage, OutputError> {
    let (width, height) = frame.size();
    if width == 0 || height == 0 {
        return Err(OutputError::EmptyFrame);
    }
    GrayImage::from_raw(width as u32, height as u32, frame.data().to_vec())
        .ok_or(OutputError::EmptyFrame)
}

/// Save a grayscale image to a PNG file.
///
/// Parent directories are created if they don't exist.
pub fn save_png(image: &GrayImage, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    image.save(path)?;
    Ok(())
}

/// Read a PNG as raw palette indices.
///
/// Returns the canvas size and `width * height` index bytes. Color images
/// are reduced to luma.
pub fn load_indexed_png(path: &Path) -> Result<((u16, u16), Vec<u8>), OutputError> {
    let image = image::open(path)?.to_luma8();
    let (width, height) = image.dimensions();
    let size = match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(OutputError::TooLarge { width, height }),
    };
    Ok((size, image.into_raw()))
}

/// Scale image by integer factor using nearest-neighbor interpolation.
///
/// Factors of 0 and 1 return the image unchanged.
pub fn scale_image(image: GrayImage, factor: u8) -> GrayImage {
    if factor <= 1 {
        return image;
    }
    let (w, h) = image.dimensions();
    image::imageops::resize(&image, w * factor as u32, h * factor as u32, FilterType::Nearest)
}

/// Arrange frames in a grid.
///
/// With `cols` unset all frames go in one row. Frames are placed in cells of
/// the largest frame's size; unused space is filled with index 0.
pub fn render_sheet(frames: &[GrayImage], cols: Option<u32>) -> GrayImage {
    if frames.is_empty() {
        return GrayImage::from_pixel(1, 1, PADDING_INDEX);
    }

    let cell_w = frames.iter().map(|f| f.width()).max().unwrap_or(1);
    let cell_h = frames.iter().map(|f| f.height()).max().unwrap_or(1);

    let count = frames.len() as u32;
    let columns = cols.unwrap_or(count).clamp(1, count);
    let rows = count.div_ceil(columns);

    let mut sheet = GrayImage::from_pixel(columns * cell_w, rows * cell_h, PADDING_INDEX);
    for (i, frame) in frames.iter().enumerate() {
        let x = (i as u32 % columns) * cell_w;
        let y = (i as u32 / columns) * cell_h;
        image::imageops::replace(&mut sheet, frame, x as i64, y as i64);
    }

    sheet
}

/// Path for one extracted frame: `{dir}/{stem}_{index:04}.png`.
///
/// Without an output directory the frame is placed next to the input.
pub fn frame_output_path(input: &Path, index: usize, output_dir: Option<&Path>) -> PathBuf {
    output_dir_for(input, output_dir).join(format!("{}_{:04}.png", input_stem(input), index))
}

/// Path for a spritesheet of all frames: `{dir}/{stem}_sheet.png`.
pub fn sheet_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    output_dir_for(input, output_dir).join(format!("{}_sheet.png", input_stem(input)))
}

fn input_stem(input: &Path) -> &str {
    input.file_stem().and_then(|s| s.to_str()).unwrap_or("output")
}

fn output_dir_for(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().unwrap_or(Path::new("")).to_path_buf(),
    }
}
