//! SQLite variable-length integers.
//!
//! A varint is 1 to 9 bytes, big-endian. The first eight bytes carry seven
//! data bits each and use the high bit as a continuation flag; a ninth byte,
//! when present, contributes all eight bits.

use crate::types::MAX_VARINT_SIZE;

/// Decode the varint starting at `pos`, returning `(value, bytes_consumed)`.
///
/// Decoding is lenient at the end of the buffer: when the input runs out
/// before the varint terminates, the value accumulated so far is returned
/// together with the number of bytes actually read (zero when `pos` is
/// already past the end). Callers that need a complete varint compare the
/// consumed count against what they expected; nothing here reads out of
/// bounds.
pub fn decode_varint(buffer: &[u8], pos: usize) -> (i64, usize) {
    let mut value: u64 = 0;
    let mut consumed = 0;

    while consumed < MAX_VARINT_SIZE {
        let Some(&byte) = buffer.get(pos.saturating_add(consumed)) else {
            break;
        };
        consumed += 1;

        if consumed == MAX_VARINT_SIZE {
            value = (value << 8) | byte as u64;
            break;
        }

        value = (value << 7) | (byte & 0x7f) as u64;
        if byte & 0x80 == 0 {
            break;
        }
    }

    (value as i64, consumed)
}

/// True when the varint at `pos` terminates inside the buffer.
pub fn is_complete_varint(buffer: &[u8], pos: usize) -> bool {
    for i in 0..MAX_VARINT_SIZE {
        match buffer.get(pos.saturating_add(i)) {
            None => return false,
            Some(_) if i == MAX_VARINT_SIZE - 1 => return true,
            Some(byte) if byte & 0x80 == 0 => return true,
            Some(_) => {}
        }
    }
    true
}

/// Number of bytes `encode_varint` produces for `value`.
pub fn varint_len(value: u64) -> usize {
    if value > 0x00ff_ffff_ffff_ffff {
        return MAX_VARINT_SIZE;
    }
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

/// Encode `value` in SQLite's varint format.
pub fn encode_varint(value: u64) -> Vec<u8> {
    let len = varint_len(value);
    let mut out = vec![0u8; len];

    if len == MAX_VARINT_SIZE {
        out[8] = value as u8;
        let mut rest = value >> 8;
        for i in (0..8).rev() {
            out[i] = (rest & 0x7f) as u8 | 0x80;
            rest >>= 7;
        }
        return out;
    }

    let mut rest = value;
    for i in (0..len).rev() {
        out[i] = (rest & 0x7f) as u8;
        if i != len - 1 {
            out[i] |= 0x80;
        }
        rest >>= 7;
    }
    out
}
