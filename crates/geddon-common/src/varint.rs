//! Base-128 variable-length and zig-zag integer codecs.
//!
//! Each group carries 7 payload bits, least significant group first; the high
//! bit of a byte marks that another group follows.

/// Maximum number of groups accepted for a 32-bit varint.
pub const MAX_GROUPS_32: u32 = 5;

/// Maximum number of groups accepted for a 64-bit varint.
pub const MAX_GROUPS_64: u32 = 10;

const CONTINUATION: u8 = 0x80;
const PAYLOAD: u8 = 0x7F;

/// Append the varint encoding of `value` to `out`.
pub fn encode_u64(mut value: u64, out: &mut Vec<u8>) {
    while value >= u64::from(CONTINUATION) {
        out.push((value as u8) | CONTINUATION);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Append the varint encoding of `value` to `out`.
#[inline]
pub fn encode_u32(value: u32, out: &mut Vec<u8>) {
    encode_u64(u64::from(value), out);
}

/// Fold one group into an accumulator.
///
/// Returns `true` when another group follows. Bits shifted past the width of
/// the accumulator are discarded.
#[inline]
pub fn push_group(acc: &mut u64, group_index: u32, byte: u8) -> bool {
    *acc |= u64::from(byte & PAYLOAD).wrapping_shl(group_index * 7);
    byte & CONTINUATION != 0
}

/// Map an unsigned zig-zag value back to its signed form.
#[inline]
pub const fn zigzag_decode_32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

/// Map a signed value to its unsigned zig-zag form.
#[inline]
pub const fn zigzag_encode_32(v: i32) -> u32 {
    ((v << 1) ^ (v >> 31)) as u32
}

/// Map an unsigned zig-zag value back to its signed form.
#[inline]
pub const fn zigzag_decode_64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

/// Map a signed value to its unsigned zig-zag form.
#[inline]
pub const fn zigzag_encode_64(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}
