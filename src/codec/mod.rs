//! Frame codecs used by SHP containers
//!
//! A container never compresses pixels itself. Full frames and delta frames
//! are handed to a [`FrameCodec`], which decodes a compressed stream starting
//! at a byte offset into a fixed-size destination buffer.
//!
//! [`WestwoodCodec`] is the codec SHP files are written with in practice:
//! LCW for full frames and XOR deltas for frames stored against another frame.

pub mod lcw;
pub mod xor_delta;

use thiserror::Error;

/// Error raised when a compressed stream cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The stream ended before the command at `offset` was complete
    #[error("compressed stream ends unexpectedly at byte {offset}")]
    UnexpectedEnd { offset: usize },
    /// A copy command reads from a position that has not been written yet
    #[error("copy source {src} is not before write position {dest}")]
    InvalidBackReference { src: usize, dest: usize },
    /// A command writes past the end of the destination buffer
    #[error("command at destination byte {offset} writes {len} bytes past the end of the image")]
    Overflow { offset: usize, len: usize },
}

/// Compression collaborator for SHP frame data.
///
/// Implementations must be pure functions of their inputs so a single codec
/// can be shared across any number of containers.
pub trait FrameCodec {
    /// Decode a full image from `src`, starting at byte `start`, into `dest`.
    ///
    /// Returns the number of destination bytes produced.
    fn decode_into(&self, src: &[u8], dest: &mut [u8], start: usize) -> Result<usize, CodecError>;

    /// Apply a delta stream from `src`, starting at byte `start`, on top of
    /// the image already held in `dest`.
    ///
    /// Bytes the delta does not address keep their previous value.
    fn patch_into(&self, src: &[u8], dest: &mut [u8], start: usize) -> Result<usize, CodecError>;

    /// Compress a raw image into a stream `decode_into` accepts at `start = 0`.
    fn encode(&self, raw: &[u8]) -> Vec<u8>;
}

/// LCW full frames plus XOR delta frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WestwoodCodec;

impl FrameCodec for WestwoodCodec {
    fn decode_into(&self, src: &[u8], dest: &mut [u8], start: usize) -> Result<usize, CodecError> {
        lcw::decode_into(src, dest, start)
    }

    fn patch_into(&self, src: &[u8], dest: &mut [u8], start: usize) -> Result<usize, CodecError> {
        xor_delta::decode_into(src, dest, start)
    }

    fn encode(&self, raw: &[u8]) -> Vec<u8> {
        lcw::encode(raw)
    }
}

/// Sequential little-endian reader over a compressed stream.
///
/// Every read is bounds checked and reports the offset it failed at.
pub(crate) struct StreamReader<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> StreamReader<'a> {
    pub(crate) fn new(src: &'a [u8], start: usize) -> Self {
        Self { src, pos: start }
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, CodecError> {
        let byte = *self.src.get(self.pos).ok_or(CodecError::UnexpectedEnd { offset: self.pos })?;
        self.pos += 1;
        Ok(byte)
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16, CodecError> {
        let lo = self.read_u8()? as u16;
        let hi = self.read_u8()? as u16;
        Ok(lo | (hi << 8))
    }

    pub(crate) fn read_slice(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        let end = self.pos.checked_add(len).filter(|&end| end <= self.src.len());
        match end {
            Some(end) => {
                let slice = &self.src[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            None => Err(CodecError::UnexpectedEnd { offset: self.src.len() }),
        }
    }
}

/// Check that `len` bytes starting at `offset` fit in a buffer of `capacity`.
pub(crate) fn check_span(offset: usize, len: usize, capacity: usize) -> Result<(), CodecError> {
    if offset.checked_add(len).is_some_and(|end| end <= capacity) {
        Ok(())
    } else {
        Err(CodecError::Overflow { offset, len })
    }
}
