//! Fixed-width codec descriptors.

use byteorder::ByteOrder;

/// Widest value a [`Scalar`] may encode to.
pub const MAX_SCALAR_WIDTH: usize = 16;

/// A fixed-width value that can be decoded from and encoded to raw bytes.
///
/// The byte order is chosen per call through the `E` parameter, so one
/// implementation serves both little- and big-endian accessors.
pub trait Scalar: Copy + PartialEq + std::fmt::Debug {
    /// Encoded size in bytes.
    const WIDTH: usize;

    /// Decode from exactly [`Self::WIDTH`] bytes.
    fn decode<E: ByteOrder>(bytes: &[u8]) -> Self;

    /// Encode into exactly [`Self::WIDTH`] bytes.
    fn encode<E: ByteOrder>(self, out: &mut [u8]);
}

impl Scalar for u8 {
    const WIDTH: usize = 1;

    #[inline]
    fn decode<E: ByteOrder>(bytes: &[u8]) -> Self {
        bytes[0]
    }

    #[inline]
    fn encode<E: ByteOrder>(self, out: &mut [u8]) {
        out[0] = self;
    }
}

impl Scalar for i8 {
    const WIDTH: usize = 1;

    #[inline]
    fn decode<E: ByteOrder>(bytes: &[u8]) -> Self {
        bytes[0] as i8
    }

    #[inline]
    fn encode<E: ByteOrder>(self, out: &mut [u8]) {
        out[0] = self as u8;
    }
}

impl Scalar for bool {
    const WIDTH: usize = 1;

    #[inline]
    fn decode<E: ByteOrder>(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    #[inline]
    fn encode<E: ByteOrder>(self, out: &mut [u8]) {
        out[0] = u8::from(self);
    }
}

macro_rules! impl_scalar {
    ($($ty:ty => $width:literal, $read:ident, $write:ident;)*) => {
        $(
            impl Scalar for $ty {
                const WIDTH: usize = $width;

                #[inline]
                fn decode<E: ByteOrder>(bytes: &[u8]) -> Self {
                    E::$read(bytes)
                }

                #[inline]
                fn encode<E: ByteOrder>(self, out: &mut [u8]) {
                    E::$write(out, self)
                }
            }
        )*
    };
}

impl_scalar! {
    u16 => 2, read_u16, write_u16;
    i16 => 2, read_i16, write_i16;
    u32 => 4, read_u32, write_u32;
    i32 => 4, read_i32, write_i32;
    u64 => 8, read_u64, write_u64;
    i64 => 8, read_i64, write_i64;
    u128 => 16, read_u128, write_u128;
    i128 => 16, read_i128, write_i128;
    f32 => 4, read_f32, write_f32;
    f64 => 8, read_f64, write_f64;
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{BigEndian, LittleEndian};

    #[test]
    fn test_byte_order_per_call() {
        let bytes = [0x12, 0x34];
        assert_eq!(u16::decode::<LittleEndian>(&bytes), 0x3412);
        assert_eq!(u16::decode::<BigEndian>(&bytes), 0x1234);
    }

    #[test]
    fn test_encode_matches_std() {
        let mut out = [0u8; 8];
        (-2.5f64).encode::<LittleEndian>(&mut out);
        assert_eq!(out, (-2.5f64).to_le_bytes());

        let mut out = [0u8; 4];
        0xDEAD_BEEFu32.encode::<BigEndian>(&mut out);
        assert_eq!(out, [0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn test_widths() {
        assert_eq!(<u8 as Scalar>::WIDTH, 1);
        assert_eq!(<i16 as Scalar>::WIDTH, 2);
        assert_eq!(<f32 as Scalar>::WIDTH, 4);
        assert_eq!(<u128 as Scalar>::WIDTH, MAX_SCALAR_WIDTH);
    }
}
