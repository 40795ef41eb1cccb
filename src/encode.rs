//! Container writing
//!
//! Frames are always written as standalone LCW images. The header table is
//! followed by an end-of-data record holding the final data offset and an
//! all-zero record, then the compressed frames in order.

use log::debug;
use std::io::Write;

use crate::codec::FrameCodec;
use crate::error::ShpError;
use crate::format::{table_size, ContainerHeader, FrameFormat, RawImageHeader, MAX_FILE_OFFSET};

/// Write a container holding `frames` to `writer`.
///
/// Every frame must be exactly `width * height` bytes.
pub fn write_container<W, C, F>(
    writer: &mut W,
    width: u16,
    height: u16,
    frames: &[F],
    codec: &C,
) -> Result<(), ShpError>
where
    W: Write,
    C: FrameCodec + ?Sized,
    F: AsRef<[u8]>,
{
    let frame_count =
        u16::try_from(frames.len()).map_err(|_| ShpError::TooManyFrames { count: frames.len() })?;
    let expected = width as usize * height as usize;

    let mut compressed = Vec::with_capacity(frames.len());
    for (index, frame) in frames.iter().enumerate() {
        let frame = frame.as_ref();
        if frame.len() != expected {
            return Err(ShpError::FrameSizeMismatch { index, expected, actual: frame.len() });
        }
        compressed.push(codec.encode(frame));
    }

    ContainerHeader { frame_count, width, height }.write_to(writer)?;

    let mut data_offset = table_size(frames.len());
    for data in &compressed {
        RawImageHeader {
            file_offset: file_offset(data_offset)?,
            tag: FrameFormat::Lcw.tag(),
            ref_offset: 0,
            ref_format: 0,
        }
        .write_to(writer)?;
        data_offset += data.len();
    }

    // End-of-data record, then the all-zero record
    RawImageHeader { file_offset: file_offset(data_offset)?, ..Default::default() }.write_to(writer)?;
    RawImageHeader::default().write_to(writer)?;

    for data in &compressed {
        writer.write_all(data)?;
    }

    debug!("wrote SHP container: {} frames, {}x{}, {} bytes", frame_count, width, height, data_offset);
    Ok(())
}

/// Encode a container into a byte vector.
pub fn encode_container<C, F>(width: u16, height: u16, frames: &[F], codec: &C) -> Result<Vec<u8>, ShpError>
where
    C: FrameCodec + ?Sized,
    F: AsRef<[u8]>,
{
    let mut out = Vec::new();
    write_container(&mut out, width, height, frames, codec)?;
    Ok(out)
}

fn file_offset(offset: usize) -> Result<u32, ShpError> {
    u32::try_from(offset)
        .ok()
        .filter(|&o| o <= MAX_FILE_OFFSET)
        .ok_or(ShpError::OffsetOverflow { offset })
}
