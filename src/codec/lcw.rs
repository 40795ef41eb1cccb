//! LCW ("Format80") full-image compression
//!
//! Command bytes:
//!
//! | Pattern | Meaning |
//! |---------|---------|
//! | `0cccpppp pppppppp` | copy `c + 3` bytes from `p` bytes back |
//! | `10cccccc` | copy `c` literal bytes, `c == 0` ends the stream |
//! | `11cccccc pppp` | copy `c + 3` bytes from absolute position `p` |
//! | `0xFE cccc v` | fill `c` bytes with `v` |
//! | `0xFF cccc pppp` | copy `c` bytes from absolute position `p` |

use super::{check_span, CodecError, StreamReader};

/// Longest literal span a single command can carry
const MAX_LITERAL: usize = 0x3F;

/// Shortest run worth a fill command (a fill costs four bytes)
const MIN_FILL: usize = 4;

/// Longest run a single fill command can carry
const MAX_FILL: usize = 0xFFFF;

const END_OF_STREAM: u8 = 0x80;
const CMD_FILL: u8 = 0xFE;
const CMD_LONG_COPY: u8 = 0xFF;

/// Decode an LCW stream from `src[start..]` into `dest`.
///
/// Returns the number of bytes written. A relative copy that would run past
/// the end of `dest` stops decoding early, matching how existing files were
/// produced; every other overrun is an error.
pub fn decode_into(src: &[u8], dest: &mut [u8], start: usize) -> Result<usize, CodecError> {
    let mut reader = StreamReader::new(src, start);
    let mut dest_index = 0usize;

    loop {
        let cmd = reader.read_u8()?;

        if cmd & 0x80 == 0 {
            let low = reader.read_u8()? as usize;
            let count = ((cmd & 0x70) >> 4) as usize + 3;
            let distance = (((cmd & 0x0F) as usize) << 8) | low;

            if dest_index + count > dest.len() {
                return Ok(dest_index);
            }
            if distance == 0 || distance > dest_index {
                return Err(CodecError::InvalidBackReference {
                    src: dest_index.saturating_sub(distance),
                    dest: dest_index,
                });
            }

            copy_within_forward(dest, dest_index - distance, dest_index, count);
            dest_index += count;
        } else if cmd & 0x40 == 0 {
            let count = (cmd & 0x3F) as usize;
            if count == 0 {
                return Ok(dest_index);
            }

            check_span(dest_index, count, dest.len())?;
            let literal = reader.read_slice(count)?;
            dest[dest_index..dest_index + count].copy_from_slice(literal);
            dest_index += count;
        } else if cmd == CMD_FILL {
            let count = reader.read_u16()? as usize;
            let value = reader.read_u8()?;

            check_span(dest_index, count, dest.len())?;
            dest[dest_index..dest_index + count].fill(value);
            dest_index += count;
        } else {
            let count = if cmd == CMD_LONG_COPY {
                reader.read_u16()? as usize
            } else {
                (cmd & 0x3F) as usize + 3
            };
            let src_index = reader.read_u16()? as usize;

            if src_index >= dest_index {
                return Err(CodecError::InvalidBackReference { src: src_index, dest: dest_index });
            }

            check_span(dest_index, count, dest.len())?;
            copy_within_forward(dest, src_index, dest_index, count);
            dest_index += count;
        }
    }
}

/// Byte-by-byte forward copy; overlapping ranges repeat the earlier bytes.
fn copy_within_forward(dest: &mut [u8], src_index: usize, dest_index: usize, count: usize) {
    for i in 0..count {
        dest[dest_index + i] = dest[src_index + i];
    }
}

/// Compress `src` into an LCW stream.
///
/// Only literal spans and fills are emitted, so the output never depends on
/// previously decoded bytes beyond its own image.
pub fn encode(src: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len() / 2 + 8);
    let mut offset = 0;
    let mut block_start = 0;

    while offset < src.len() {
        let run = count_same(src, offset, MAX_FILL);
        if run >= MIN_FILL {
            flush_literals(&mut out, &src[block_start..offset]);

            out.push(CMD_FILL);
            out.extend_from_slice(&(run as u16).to_le_bytes());
            out.push(src[offset]);

            offset += run;
            block_start = offset;
        } else {
            offset += 1;
        }
    }

    flush_literals(&mut out, &src[block_start..offset]);
    out.push(END_OF_STREAM);
    out
}

/// Length of the run of bytes equal to `src[offset]`, capped at `max`.
fn count_same(src: &[u8], offset: usize, max: usize) -> usize {
    let value = src[offset];
    src[offset..].iter().take(max).take_while(|&&b| b == value).count()
}

fn flush_literals(out: &mut Vec<u8>, mut literals: &[u8]) {
    while !literals.is_empty() {
        let len = literals.len().min(MAX_LITERAL);
        out.push(0x80 | len as u8);
        out.extend_from_slice(&literals[..len]);
        literals = &literals[len..];
    }
}
