//! Delta reference resolution
//!
//! Delta frames name their base either implicitly (the previous frame) or by
//! file offset. Both are turned into plain indices into the header table.

use log::debug;
use std::collections::HashMap;

use crate::container::ImageHeader;
use crate::error::ShpError;
use crate::format::FrameFormat;

/// Set `dependency` on every delta header.
///
/// Fails on a previous-frame delta at index 0 or a base-frame delta whose
/// `ref_offset` is not any frame's file offset.
pub fn resolve_references(
    headers: &mut [ImageHeader],
    offsets: &HashMap<u32, usize>,
) -> Result<(), ShpError> {
    for index in 0..headers.len() {
        let h = &headers[index];
        let dependency = match h.format {
            FrameFormat::Lcw => None,
            FrameFormat::XorPrev => {
                if index == 0 {
                    return Err(ShpError::InvalidAdjacentReference { index });
                }
                Some(index - 1)
            }
            FrameFormat::XorBase => {
                let base = offsets.get(&(h.ref_offset as u32)).copied().ok_or(
                    ShpError::DanglingReference { file_offset: h.file_offset, ref_offset: h.ref_offset },
                )?;
                Some(base)
            }
        };

        if let Some(base) = dependency {
            debug!("frame {} ({}) depends on frame {}", index, h.format, base);
        }
        headers[index].dependency = dependency;
    }

    Ok(())
}
