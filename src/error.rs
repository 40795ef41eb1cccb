//! Error types for loading and writing SHP containers

use crate::codec::CodecError;
use thiserror::Error;

/// Fatal error while loading or writing a container.
///
/// No partially decoded container is ever returned alongside one of these.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ShpError {
    /// I/O failure on the underlying stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The stream ended inside a fixed-size field
    #[error("container truncated while reading {what}")]
    Truncated { what: &'static str },
    /// An image header carries a format tag that is not 0x20, 0x40 or 0x80
    #[error("frame {index} has unknown format tag 0x{tag:02X}")]
    UnknownFormat { index: usize, tag: u8 },
    /// A previous-frame delta at the start of the table
    #[error("frame {index} is a previous-frame delta with no previous frame")]
    InvalidAdjacentReference { index: usize },
    /// A base-frame delta whose reference matches no frame's file offset
    #[error("reference doesn't point to image data {file_offset}->{ref_offset}")]
    DanglingReference { file_offset: u32, ref_offset: u16 },
    /// A delta frame reached the decoder without a resolved base frame
    #[error("frame {index} is a delta frame with no resolved base frame")]
    Unresolved { index: usize },
    /// The dependency chain is longer than the frame count, so it loops
    #[error("delta references loop (chain exceeds {frame_count} frames)")]
    ReferenceLoop { frame_count: usize },
    /// A frame's data offset lies inside the header table
    #[error("frame {index} data offset {file_offset} precedes the payload start {payload_start}")]
    OffsetOutOfRange { index: usize, file_offset: u32, payload_start: usize },
    /// The frame codec rejected a frame's compressed stream
    #[error("frame {index} is corrupt: {source}")]
    Codec {
        index: usize,
        #[source]
        source: CodecError,
    },
    /// More frames than the 16-bit frame count can describe
    #[error("cannot write {count} frames (max 65535)")]
    TooManyFrames { count: usize },
    /// A raw frame does not match the canvas size
    #[error("frame {index} has {actual} bytes, expected {expected} for the canvas size")]
    FrameSizeMismatch { index: usize, expected: usize, actual: usize },
    /// Frame data would start beyond what a 24-bit file offset can address
    #[error("frame data offset {offset} does not fit in 24 bits")]
    OffsetOverflow { offset: usize },
}

impl ShpError {
    /// Map an I/O error from a fixed-size read, reporting EOF as truncation.
    pub(crate) fn from_read(err: std::io::Error, what: &'static str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            ShpError::Truncated { what }
        } else {
            ShpError::Io(err)
        }
    }
}
