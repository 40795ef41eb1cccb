//! SHP wire format: fixed header and 8-byte image header records

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;
use std::io::{self, Read, Write};

/// Size of the fixed container header in bytes
pub const CONTAINER_HEADER_SIZE: usize = 14;

/// Size of one image header record in bytes
pub const IMAGE_HEADER_SIZE: usize = 8;

/// Number of sentinel records after the image header table
pub const SENTINEL_COUNT: usize = 2;

/// Largest value a 24-bit file offset can hold
pub const MAX_FILE_OFFSET: u32 = 0x00FF_FFFF;

/// How a frame's pixels are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameFormat {
    /// XOR delta against the frame immediately before it
    XorPrev,
    /// XOR delta against the frame whose file offset is `ref_offset`
    XorBase,
    /// Standalone LCW-compressed image
    Lcw,
}

impl FrameFormat {
    /// Decode a format tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x20 => Some(Self::XorPrev),
            0x40 => Some(Self::XorBase),
            0x80 => Some(Self::Lcw),
            _ => None,
        }
    }

    /// The tag byte stored in the high 8 bits of a header's first word.
    pub fn tag(self) -> u8 {
        match self {
            Self::XorPrev => 0x20,
            Self::XorBase => 0x40,
            Self::Lcw => 0x80,
        }
    }

    /// Whether frames of this format are stored against another frame.
    pub fn is_delta(self) -> bool {
        !matches!(self, Self::Lcw)
    }
}

impl std::fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::XorPrev => write!(f, "xor-prev"),
            Self::XorBase => write!(f, "xor-base"),
            Self::Lcw => write!(f, "lcw"),
        }
    }
}

/// The 14-byte header at the start of every container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub frame_count: u16,
    pub width: u16,
    pub height: u16,
}

impl ContainerHeader {
    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let frame_count = reader.read_u16::<LittleEndian>()?;
        reader.read_u32::<LittleEndian>()?; // reserved
        let width = reader.read_u16::<LittleEndian>()?;
        let height = reader.read_u16::<LittleEndian>()?;
        reader.read_u32::<LittleEndian>()?; // reserved

        Ok(Self { frame_count, width, height })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u16::<LittleEndian>(self.frame_count)?;
        writer.write_u32::<LittleEndian>(0)?;
        writer.write_u16::<LittleEndian>(self.width)?;
        writer.write_u16::<LittleEndian>(self.height)?;
        writer.write_u32::<LittleEndian>(0)?;
        Ok(())
    }

    /// Byte offset of the first payload byte, relative to the container start.
    pub fn payload_start(&self) -> usize {
        table_size(self.frame_count as usize)
    }
}

/// Size of the container header plus the image header table and sentinels.
pub fn table_size(frame_count: usize) -> usize {
    CONTAINER_HEADER_SIZE + (frame_count + SENTINEL_COUNT) * IMAGE_HEADER_SIZE
}

/// One 8-byte image header record as stored on disk.
///
/// The format tag is kept as a raw byte so unknown tags can be reported with
/// the frame they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawImageHeader {
    pub file_offset: u32,
    pub tag: u8,
    pub ref_offset: u16,
    pub ref_format: u16,
}

impl RawImageHeader {
    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let data = reader.read_u32::<LittleEndian>()?;
        let ref_offset = reader.read_u16::<LittleEndian>()?;
        let ref_format = reader.read_u16::<LittleEndian>()?;

        Ok(Self {
            file_offset: data & MAX_FILE_OFFSET,
            tag: (data >> 24) as u8,
            ref_offset,
            ref_format,
        })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let data = (self.file_offset & MAX_FILE_OFFSET) | ((self.tag as u32) << 24);
        writer.write_u32::<LittleEndian>(data)?;
        writer.write_u16::<LittleEndian>(self.ref_offset)?;
        writer.write_u16::<LittleEndian>(self.ref_format)?;
        Ok(())
    }
}
