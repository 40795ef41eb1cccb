//! Container parsing: fixed header, image header table and payload
//!
//! [`parse_container`] reads everything a decode pass needs and resolves the
//! delta reference graph before any pixel is touched, so decoding can only
//! fail on loops and corrupt frame data.

use log::{debug, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::io::{Read, Seek};

use crate::error::ShpError;
use crate::format::{ContainerHeader, FrameFormat, RawImageHeader, IMAGE_HEADER_SIZE, SENTINEL_COUNT};
use crate::resolve::resolve_references;

/// A frame's header after parsing and reference resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageHeader {
    /// Absolute offset of the frame data from the start of the container
    pub file_offset: u32,
    pub format: FrameFormat,
    /// File offset of the base frame for [`FrameFormat::XorBase`]
    pub ref_offset: u16,
    /// Informational, never needed for decoding
    pub ref_format: u16,
    /// Index of the frame this one is decoded against
    pub dependency: Option<usize>,
}

/// Everything read from a container before decoding.
#[derive(Debug, Clone)]
pub struct ParsedContainer {
    pub width: u16,
    pub height: u16,
    pub headers: Vec<ImageHeader>,
    /// File offset to header index, last header wins on duplicates
    pub offsets: HashMap<u32, usize>,
    /// Offset of the first payload byte, relative to the container start
    pub payload_start: usize,
    pub payload: Vec<u8>,
}

impl ParsedContainer {
    pub fn frame_count(&self) -> usize {
        self.headers.len()
    }

    /// Size in bytes of one decoded frame.
    pub fn canvas_len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether the canvas has no pixels, making every frame empty.
    pub fn is_empty_canvas(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Position of a frame's compressed data inside `payload`.
    pub fn data_start(&self, index: usize) -> Result<usize, ShpError> {
        let file_offset = self.headers[index].file_offset;
        (file_offset as usize)
            .checked_sub(self.payload_start)
            .ok_or(ShpError::OffsetOutOfRange { index, file_offset, payload_start: self.payload_start })
    }
}

/// Parse a container from a stream positioned at its first byte.
///
/// Reads the header table, skips the two sentinel records, loads the rest of
/// the stream as payload and resolves every delta frame's dependency.
pub fn parse_container<R: Read + Seek>(reader: &mut R) -> Result<ParsedContainer, ShpError> {
    let container_start = reader.stream_position()?;

    let header =
        ContainerHeader::read_from(reader).map_err(|e| ShpError::from_read(e, "container header"))?;
    let frame_count = header.frame_count as usize;

    let mut headers = Vec::with_capacity(frame_count);
    for index in 0..frame_count {
        let raw =
            RawImageHeader::read_from(reader).map_err(|e| ShpError::from_read(e, "image header"))?;
        let format =
            FrameFormat::from_tag(raw.tag).ok_or(ShpError::UnknownFormat { index, tag: raw.tag })?;

        headers.push(ImageHeader {
            file_offset: raw.file_offset,
            format,
            ref_offset: raw.ref_offset,
            ref_format: raw.ref_format,
            dependency: None,
        });
    }

    // End-of-data and all-zero records
    let mut sentinels = [0u8; SENTINEL_COUNT * IMAGE_HEADER_SIZE];
    reader.read_exact(&mut sentinels).map_err(|e| ShpError::from_read(e, "sentinel headers"))?;

    let mut offsets = HashMap::with_capacity(frame_count);
    for (index, h) in headers.iter().enumerate() {
        if let Some(previous) = offsets.insert(h.file_offset, index) {
            warn!("frames {} and {} share file offset {}", previous, index, h.file_offset);
        }
    }

    resolve_references(&mut headers, &offsets)?;

    let payload_start = (reader.stream_position()? - container_start) as usize;
    let mut payload = Vec::new();
    reader.read_to_end(&mut payload)?;

    debug!(
        "SHP container: {} frames, {}x{} canvas, {} payload bytes at offset {}",
        frame_count,
        header.width,
        header.height,
        payload.len(),
        payload_start
    );

    Ok(ParsedContainer {
        width: header.width,
        height: header.height,
        headers,
        offsets,
        payload_start,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::table_size;
    use std::io::Cursor;

    fn container_bytes(width: u16, height: u16, records: &[RawImageHeader], payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        ContainerHeader { frame_count: records.len() as u16, width, height }
            .write_to(&mut out)
            .unwrap();
        for r in records {
            r.write_to(&mut out).unwrap();
        }
        out.extend_from_slice(&[0u8; 16]);
        out.extend_from_slice(payload);
        out
    }

    fn lcw(file_offset: u32) -> RawImageHeader {
        RawImageHeader { file_offset, tag: 0x80, ..Default::default() }
    }

    #[test]
    fn test_parse_geometry_and_payload() {
        let start = table_size(1) as u32;
        let bytes = container_bytes(2, 3, &[lcw(start)], &[0x80]);
        let parsed = parse_container(&mut Cursor::new(bytes)).unwrap();

        assert_eq!((parsed.width, parsed.height), (2, 3));
        assert_eq!(parsed.frame_count(), 1);
        assert_eq!(parsed.canvas_len(), 6);
        assert_eq!(parsed.payload_start, 38);
        assert_eq!(parsed.payload, vec![0x80]);
        assert_eq!(parsed.data_start(0).unwrap(), 0);
        assert_eq!(parsed.offsets.get(&start), Some(&0));
    }

    #[test]
    fn test_parse_from_nonzero_stream_position() {
        let start = table_size(1) as u32;
        let mut bytes = vec![0xEE; 5];
        bytes.extend(container_bytes(1, 1, &[lcw(start)], &[0x81, 7, 0x80]));

        let mut cursor = Cursor::new(bytes);
        cursor.set_position(5);
        let parsed = parse_container(&mut cursor).unwrap();
        assert_eq!(parsed.payload_start, 38);
        assert_eq!(parsed.payload, vec![0x81, 7, 0x80]);
    }

    #[test]
    fn test_unknown_format_tag() {
        let bad = RawImageHeader { file_offset: 38, tag: 0x10, ..Default::default() };
        let bytes = container_bytes(1, 1, &[bad], &[]);
        let err = parse_container(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, ShpError::UnknownFormat { index: 0, tag: 0x10 }));
    }

    #[test]
    fn test_truncated_table() {
        let mut bytes = container_bytes(1, 1, &[lcw(38)], &[]);
        bytes.truncate(20);
        let err = parse_container(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, ShpError::Truncated { what: "image header" }));
    }

    #[test]
    fn test_missing_sentinels() {
        let mut bytes = container_bytes(1, 1, &[lcw(38)], &[]);
        bytes.truncate(26);
        let err = parse_container(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, ShpError::Truncated { what: "sentinel headers" }));
    }

    #[test]
    fn test_truncated_container_header() {
        let err = parse_container(&mut Cursor::new(vec![1u8, 0, 0, 0])).unwrap_err();
        assert!(matches!(err, ShpError::Truncated { what: "container header" }));
    }

    #[test]
    fn test_duplicate_offsets_last_wins() {
        let bytes = container_bytes(1, 1, &[lcw(46), lcw(46)], &[0x81, 1, 0x80]);
        let parsed = parse_container(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(parsed.offsets.len(), 1);
        assert_eq!(parsed.offsets.get(&46), Some(&1));
    }

    #[test]
    fn test_data_start_inside_table() {
        let bytes = container_bytes(1, 1, &[lcw(4)], &[]);
        let parsed = parse_container(&mut Cursor::new(bytes)).unwrap();
        assert!(matches!(
            parsed.data_start(0),
            Err(ShpError::OffsetOutOfRange { index: 0, file_offset: 4, payload_start: 38 })
        ));
    }

    #[test]
    fn test_empty_container() {
        let bytes = container_bytes(4, 4, &[], &[]);
        let parsed = parse_container(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(parsed.frame_count(), 0);
        assert_eq!(parsed.payload_start, 30);
        assert!(parsed.payload.is_empty());
    }
}
