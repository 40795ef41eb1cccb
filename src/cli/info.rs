//! Inspection commands (info, verify)

use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::container::{parse_container, ImageHeader, ParsedContainer};
use crate::sheet::ShpSheet;

use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Machine-readable summary of a container's header table
#[derive(Debug, Serialize)]
struct InfoReport<'a> {
    file: String,
    width: u16,
    height: u16,
    frame_count: usize,
    payload_start: usize,
    payload_bytes: usize,
    frames: Vec<FrameInfo<'a>>,
}

#[derive(Debug, Serialize)]
struct FrameInfo<'a> {
    index: usize,
    #[serde(flatten)]
    header: &'a ImageHeader,
}

impl<'a> InfoReport<'a> {
    fn new(input: &Path, container: &'a ParsedContainer) -> Self {
        Self {
            file: input.display().to_string(),
            width: container.width,
            height: container.height,
            frame_count: container.frame_count(),
            payload_start: container.payload_start,
            payload_bytes: container.payload.len(),
            frames: container
                .headers
                .iter()
                .enumerate()
                .map(|(index, header)| FrameInfo { index, header })
                .collect(),
        }
    }
}

/// Execute the info command
pub fn run_info(input: &Path, json: bool) -> ExitCode {
    let file = match File::open(input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: Cannot open input file '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let container = match parse_container(&mut BufReader::new(file)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}: {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let report = InfoReport::new(input, &container);
    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: Failed to serialize report: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
        return ExitCode::from(EXIT_SUCCESS);
    }

    println!("File:    {}", report.file);
    println!("Canvas:  {}x{}", report.width, report.height);
    println!("Frames:  {}", report.frame_count);
    println!("Payload: {} bytes at offset {}", report.payload_bytes, report.payload_start);
    if !report.frames.is_empty() {
        println!();
        println!("{:>5}  {:>8}  {:<8}  {:>6}  {:>6}  base", "index", "offset", "format", "ref", "reffmt");
        for frame in &report.frames {
            let h = frame.header;
            let base = h.dependency.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());
            println!(
                "{:>5}  {:>8}  {:<8}  {:>6}  {:>6}  {}",
                frame.index,
                h.file_offset,
                h.format.to_string(),
                h.ref_offset,
                format!("0x{:02X}", h.ref_format),
                base
            );
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the verify command
pub fn run_verify(files: &[PathBuf]) -> ExitCode {
    let mut failed = 0usize;

    for path in files {
        match ShpSheet::load(path) {
            Ok(sheet) => {
                let (w, h) = sheet.size();
                println!("OK    {} ({} frames, {}x{})", path.display(), sheet.len(), w, h);
            }
            Err(e) => {
                failed += 1;
                println!("FAIL  {}: {}", path.display(), e);
            }
        }
    }

    if failed > 0 {
        eprintln!("Error: {} of {} files failed to decode", failed, files.len());
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}
