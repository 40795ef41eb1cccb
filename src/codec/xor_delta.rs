//! XOR delta ("Format40") frame patches
//!
//! A delta stream is applied on top of an already decoded image. Each command
//! either skips destination bytes or XORs them with literal or repeated
//! values, so bytes outside the touched spans keep the base image's value.

use super::{check_span, CodecError, StreamReader};

const END_OF_STREAM: [u8; 3] = [0x80, 0x00, 0x00];

/// Longest span the one-byte command forms can carry
const MAX_SHORT: usize = 0x7F;

/// Longest span the word command forms can carry
const MAX_LONG: usize = 0x3FFF;

/// Longest skip the word command form can carry
const MAX_LONG_SKIP: usize = 0x7FFF;

/// Shortest repeated XOR value worth a fill command
const MIN_FILL: usize = 3;

/// Apply the delta stream at `src[start..]` to `dest` in place.
///
/// Returns the destination position reached when the stream ended.
pub fn decode_into(src: &[u8], dest: &mut [u8], start: usize) -> Result<usize, CodecError> {
    let mut reader = StreamReader::new(src, start);
    let mut dest_index = 0usize;

    loop {
        let cmd = reader.read_u8()?;
        let count = (cmd & 0x7F) as usize;

        if cmd & 0x80 == 0 {
            if count == 0 {
                let count = reader.read_u8()? as usize;
                let value = reader.read_u8()?;
                xor_fill(dest, dest_index, count, value)?;
                dest_index += count;
            } else {
                check_span(dest_index, count, dest.len())?;
                xor_slice(dest, dest_index, reader.read_slice(count)?);
                dest_index += count;
            }
        } else if count == 0 {
            let word = reader.read_u16()? as usize;
            if word == 0 {
                return Ok(dest_index);
            }

            if word & 0x8000 == 0 {
                let skip = word & 0x7FFF;
                check_span(dest_index, skip, dest.len())?;
                dest_index += skip;
            } else if word & 0x4000 == 0 {
                let count = word & 0x3FFF;
                check_span(dest_index, count, dest.len())?;
                xor_slice(dest, dest_index, reader.read_slice(count)?);
                dest_index += count;
            } else {
                let count = word & 0x3FFF;
                let value = reader.read_u8()?;
                xor_fill(dest, dest_index, count, value)?;
                dest_index += count;
            }
        } else {
            check_span(dest_index, count, dest.len())?;
            dest_index += count;
        }
    }
}

fn xor_fill(dest: &mut [u8], offset: usize, count: usize, value: u8) -> Result<(), CodecError> {
    check_span(offset, count, dest.len())?;
    for b in &mut dest[offset..offset + count] {
        *b ^= value;
    }
    Ok(())
}

fn xor_slice(dest: &mut [u8], offset: usize, values: &[u8]) {
    for (b, v) in dest[offset..offset + values.len()].iter_mut().zip(values) {
        *b ^= v;
    }
}

/// Build a delta stream that turns `base` into `target`.
///
/// Both images must have the same length; extra bytes in the longer one are
/// ignored.
pub fn encode(base: &[u8], target: &[u8]) -> Vec<u8> {
    let len = base.len().min(target.len());
    let mut out = Vec::new();
    let mut i = 0;

    while i < len {
        let same = (i..len).take_while(|&j| base[j] == target[j]).count();
        if same > 0 {
            push_skip(&mut out, same);
            i += same;
            continue;
        }

        let end = (i..len).find(|&j| base[j] == target[j]).unwrap_or(len);
        let xor: Vec<u8> = (i..end).map(|j| base[j] ^ target[j]).collect();
        push_xor_span(&mut out, &xor);
        i = end;
    }

    out.extend_from_slice(&END_OF_STREAM);
    out
}

fn push_skip(out: &mut Vec<u8>, mut count: usize) {
    while count > 0 {
        if count <= MAX_SHORT {
            out.push(0x80 | count as u8);
            return;
        }
        let chunk = count.min(MAX_LONG_SKIP);
        out.push(0x80);
        out.extend_from_slice(&(chunk as u16).to_le_bytes());
        count -= chunk;
    }
}

fn push_xor_span(out: &mut Vec<u8>, xor: &[u8]) {
    let mut pos = 0;
    let mut literal_start = 0;

    while pos < xor.len() {
        let value = xor[pos];
        let run = xor[pos..].iter().take(MAX_LONG).take_while(|&&b| b == value).count();
        if run >= MIN_FILL {
            push_literal(out, &xor[literal_start..pos]);
            push_fill(out, run, value);
            pos += run;
            literal_start = pos;
        } else {
            pos += 1;
        }
    }

    push_literal(out, &xor[literal_start..pos]);
}

fn push_literal(out: &mut Vec<u8>, mut values: &[u8]) {
    while !values.is_empty() {
        let chunk = if values.len() <= MAX_SHORT {
            out.push(values.len() as u8);
            values.len()
        } else {
            let chunk = values.len().min(MAX_LONG);
            out.push(0x80);
            out.extend_from_slice(&((0x8000 | chunk) as u16).to_le_bytes());
            chunk
        };
        out.extend_from_slice(&values[..chunk]);
        values = &values[chunk..];
    }
}

fn push_fill(out: &mut Vec<u8>, count: usize, value: u8) {
    if count <= 0xFF {
        out.extend_from_slice(&[0x00, count as u8, value]);
    } else {
        out.push(0x80);
        out.extend_from_slice(&((0xC000 | count) as u16).to_le_bytes());
        out.push(value);
    }
}
