//! Loaded sprite sheets and their frames
//!
//! A [`ShpSheet`] is fully decoded when it is constructed. Consumers only see
//! the canvas size and one read-only [`ShpFrame`] per stored frame.

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

use crate::codec::{FrameCodec, WestwoodCodec};
use crate::container::parse_container;
use crate::decode::decode_frames;
use crate::encode::{encode_container, write_container};
use crate::error::ShpError;

/// A decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShpFrame {
    size: (u16, u16),
    data: Vec<u8>,
}

impl ShpFrame {
    /// Palette indices, `width * height` bytes in row-major order.
    ///
    /// Empty when the sheet's canvas has no pixels.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Visible size of the frame, always the canvas size.
    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    /// Size of the frame's pixel buffer, always the canvas size.
    pub fn frame_size(&self) -> (u16, u16) {
        self.size
    }

    /// Draw offset of the frame relative to its anchor.
    pub fn offset(&self) -> (i32, i32) {
        (0, 0)
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// A fully decoded SHP container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShpSheet {
    size: (u16, u16),
    frames: Vec<ShpFrame>,
}

impl ShpSheet {
    /// Load and decode a container file.
    pub fn load(path: &Path) -> Result<Self, ShpError> {
        Self::load_with(path, &WestwoodCodec)
    }

    /// Load and decode a container file using a custom frame codec.
    pub fn load_with<C: FrameCodec + ?Sized>(path: &Path, codec: &C) -> Result<Self, ShpError> {
        let file = File::open(path)?;
        Self::from_reader_with(&mut BufReader::new(file), codec)
    }

    /// Load and decode a container from a stream positioned at its start.
    pub fn from_reader<R: Read + Seek>(reader: &mut R) -> Result<Self, ShpError> {
        Self::from_reader_with(reader, &WestwoodCodec)
    }

    /// Load and decode a container held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ShpError> {
        Self::from_bytes_with(bytes, &WestwoodCodec)
    }

    pub fn from_bytes_with<C: FrameCodec + ?Sized>(bytes: &[u8], codec: &C) -> Result<Self, ShpError> {
        Self::from_reader_with(&mut Cursor::new(bytes), codec)
    }

    /// Load and decode a container using a custom frame codec.
    pub fn from_reader_with<R, C>(reader: &mut R, codec: &C) -> Result<Self, ShpError>
    where
        R: Read + Seek,
        C: FrameCodec + ?Sized,
    {
        let container = parse_container(reader)?;
        let size = (container.width, container.height);
        let frames = decode_frames(&container, codec)?
            .into_iter()
            .map(|data| ShpFrame { size, data })
            .collect();

        Ok(Self { size, frames })
    }

    /// Canvas size shared by every frame.
    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    pub fn frames(&self) -> &[ShpFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Write raw frames as a new container file.
    pub fn save<F: AsRef<[u8]>>(path: &Path, size: (u16, u16), frames: &[F]) -> Result<(), ShpError> {
        Self::save_with(path, size, frames, &WestwoodCodec)
    }

    /// Write raw frames as a new container file using a custom frame codec.
    pub fn save_with<F, C>(path: &Path, size: (u16, u16), frames: &[F], codec: &C) -> Result<(), ShpError>
    where
        F: AsRef<[u8]>,
        C: FrameCodec + ?Sized,
    {
        let mut writer = BufWriter::new(File::create(path)?);
        write_shp_with(&mut writer, size, frames, codec)?;
        writer.flush()?;
        Ok(())
    }

    /// Re-encode this sheet's frames as a standalone container.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ShpError> {
        let frames: Vec<&[u8]> = self.frames.iter().map(ShpFrame::data).collect();
        encode_shp(self.size, &frames)
    }
}

/// Write raw frames as a container with the default codec.
pub fn write_shp<W: Write, F: AsRef<[u8]>>(
    writer: &mut W,
    size: (u16, u16),
    frames: &[F],
) -> Result<(), ShpError> {
    write_shp_with(writer, size, frames, &WestwoodCodec)
}

pub fn write_shp_with<W, F, C>(writer: &mut W, size: (u16, u16), frames: &[F], codec: &C) -> Result<(), ShpError>
where
    W: Write,
    F: AsRef<[u8]>,
    C: FrameCodec + ?Sized,
{
    write_container(writer, size.0, size.1, frames, codec)
}

/// Encode raw frames into container bytes with the default codec.
pub fn encode_shp<F: AsRef<[u8]>>(size: (u16, u16), frames: &[F]) -> Result<Vec<u8>, ShpError> {
    encode_shp_with(size, frames, &WestwoodCodec)
}

pub fn encode_shp_with<F, C>(size: (u16, u16), frames: &[F], codec: &C) -> Result<Vec<u8>, ShpError>
where
    F: AsRef<[u8]>,
    C: FrameCodec + ?Sized,
{
    encode_container(size.0, size.1, frames, codec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecError;
    use tempfile::TempDir;

    #[test]
    fn test_roundtrip_in_memory() {
        let frames = vec![vec![0u8, 1, 2, 3, 4, 5], vec![9u8; 6]];
        let bytes = encode_shp((3, 2), &frames).unwrap();
        let sheet = ShpSheet::from_bytes(&bytes).unwrap();

        assert_eq!(sheet.size(), (3, 2));
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.frames()[0].data(), &frames[0][..]);
        assert_eq!(sheet.frames()[1].data(), &frames[1][..]);
    }

    #[test]
    fn test_frame_handle_metadata() {
        let bytes = encode_shp((2, 1), &[vec![5u8, 6]]).unwrap();
        let sheet = ShpSheet::from_bytes(&bytes).unwrap();
        let frame = &sheet.frames()[0];
        assert_eq!(frame.size(), (2, 1));
        assert_eq!(frame.frame_size(), (2, 1));
        assert_eq!(frame.offset(), (0, 0));
    }

    #[test]
    fn test_save_and_load_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = temp.path().join("unit.shp");
        let frames = vec![vec![1u8; 64], (0..64).collect::<Vec<u8>>()];

        ShpSheet::save(&path, (8, 8), &frames).expect("should save container");
        let sheet = ShpSheet::load(&path).expect("should load container");

        let loaded: Vec<Vec<u8>> = sheet.frames().iter().map(|f| f.data().to_vec()).collect();
        assert_eq!(loaded, frames);
    }

    #[test]
    fn test_to_bytes_reencodes() {
        let frames = vec![vec![3u8; 4]];
        let sheet = ShpSheet::from_bytes(&encode_shp((2, 2), &frames).unwrap()).unwrap();
        let again = ShpSheet::from_bytes(&sheet.to_bytes().unwrap()).unwrap();
        assert_eq!(again, sheet);
    }

    /// Stores frames uncompressed.
    struct StoredCodec;

    impl FrameCodec for StoredCodec {
        fn decode_into(&self, src: &[u8], dest: &mut [u8], start: usize) -> Result<usize, CodecError> {
            let end = start + dest.len();
            let data = src.get(start..end).ok_or(CodecError::UnexpectedEnd { offset: src.len() })?;
            dest.copy_from_slice(data);
            Ok(dest.len())
        }

        fn patch_into(&self, src: &[u8], dest: &mut [u8], start: usize) -> Result<usize, CodecError> {
            let end = start + dest.len();
            let data = src.get(start..end).ok_or(CodecError::UnexpectedEnd { offset: src.len() })?;
            dest.iter_mut().zip(data).for_each(|(d, x)| *d ^= x);
            Ok(dest.len())
        }

        fn encode(&self, raw: &[u8]) -> Vec<u8> {
            raw.to_vec()
        }
    }

    #[test]
    fn test_custom_codec_roundtrip() {
        let frames = vec![vec![7u8, 8, 9, 10]];
        let bytes = encode_shp_with((2, 2), &frames, &StoredCodec).unwrap();
        assert_eq!(&bytes[bytes.len() - 4..], &[7, 8, 9, 10]);

        let sheet = ShpSheet::from_bytes_with(&bytes, &StoredCodec).unwrap();
        assert_eq!(sheet.frames()[0].data(), &[7, 8, 9, 10]);

        let temp = TempDir::new().expect("should create temp dir");
        let path = temp.path().join("stored.shp");
        ShpSheet::save_with(&path, (2, 2), &frames, &StoredCodec).unwrap();
        assert_eq!(ShpSheet::load_with(&path, &StoredCodec).unwrap(), sheet);
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let err = ShpSheet::load(&temp.path().join("missing.shp")).unwrap_err();
        assert!(matches!(err, ShpError::Io(_)));
    }
}
