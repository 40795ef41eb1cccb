//! Frame decompression in dependency order
//!
//! Every frame is decoded exactly once. Delta frames first make sure their
//! base frame is decoded, copy it, and patch the copy. The base chain is
//! walked with an explicit stack whose depth is bounded by the frame count,
//! so looping references fail instead of recursing forever.

use log::trace;

use crate::codec::FrameCodec;
use crate::container::ParsedContainer;
use crate::error::ShpError;
use crate::format::FrameFormat;

/// Decode every frame of a parsed container, in table order.
pub fn decode_frames<C: FrameCodec + ?Sized>(
    container: &ParsedContainer,
    codec: &C,
) -> Result<Vec<Vec<u8>>, ShpError> {
    let mut decoder = FrameDecoder::new(container, codec);
    for index in 0..container.frame_count() {
        decoder.decode(index)?;
    }
    Ok(decoder.finish())
}

/// Memoizing decoder state for one decode pass.
struct FrameDecoder<'a, C: ?Sized> {
    container: &'a ParsedContainer,
    codec: &'a C,
    decoded: Vec<Option<Vec<u8>>>,
}

impl<'a, C: FrameCodec + ?Sized> FrameDecoder<'a, C> {
    fn new(container: &'a ParsedContainer, codec: &'a C) -> Self {
        Self { container, codec, decoded: vec![None; container.frame_count()] }
    }

    fn decode(&mut self, index: usize) -> Result<(), ShpError> {
        if self.decoded[index].is_some() {
            return Ok(());
        }

        // No codec work for frames without pixels
        if self.container.is_empty_canvas() {
            self.decoded[index] = Some(Vec::new());
            return Ok(());
        }

        let frame_count = self.container.frame_count();
        let mut chain = vec![index];
        while let Some(base) = chain.last().and_then(|&top| self.pending_base(top)) {
            if chain.len() > frame_count {
                return Err(ShpError::ReferenceLoop { frame_count });
            }
            chain.push(base);
        }

        while let Some(next) = chain.pop() {
            self.decode_single(next)?;
        }
        Ok(())
    }

    /// The base frame of `index`, if it still has to be decoded.
    fn pending_base(&self, index: usize) -> Option<usize> {
        self.container.headers[index].dependency.filter(|&base| self.decoded[base].is_none())
    }

    /// Decode one frame whose base, if any, is already decoded.
    fn decode_single(&mut self, index: usize) -> Result<(), ShpError> {
        if self.decoded[index].is_some() {
            return Ok(());
        }

        let header = &self.container.headers[index];
        let start = self.container.data_start(index)?;
        let payload = &self.container.payload;

        let image = match header.format {
            FrameFormat::Lcw => {
                let mut image = vec![0u8; self.container.canvas_len()];
                self.codec
                    .decode_into(payload, &mut image, start)
                    .map_err(|source| ShpError::Codec { index, source })?;
                image
            }
            FrameFormat::XorPrev | FrameFormat::XorBase => {
                let base = header
                    .dependency
                    .and_then(|base| self.decoded[base].as_ref())
                    .ok_or(ShpError::Unresolved { index })?;

                let mut image = base.clone();
                self.codec
                    .patch_into(payload, &mut image, start)
                    .map_err(|source| ShpError::Codec { index, source })?;
                image
            }
        };

        trace!("decoded frame {} ({}) from payload byte {}", index, header.format, start);
        self.decoded[index] = Some(image);
        Ok(())
    }

    fn finish(self) -> Vec<Vec<u8>> {
        self.decoded.into_iter().map(Option::unwrap_or_default).collect()
    }
}
