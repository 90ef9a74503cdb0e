//! Pixel block header structures.

use zerocopy::byteorder::little_endian::{I32, U16};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Offset the signature scan starts from.
pub const SCAN_START: u64 = 0x70;

/// Marker found at the start of the compressed pixel stream.
///
/// Stored little-endian this is `78 DA`, a zlib header.
pub const PIXEL_BLOCK_SIGNATURE: u16 = 55928;

/// Bytes per decoded pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Header directly preceding the compressed pixel stream.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct TextureBlockHeader {
    /// Tag, normally 5.
    pub tag_a: U16,
    /// Tag, normally 0.
    pub tag_b: U16,
    /// Image width in pixels.
    pub width: U16,
    /// Image height in pixels.
    pub height: U16,
    /// Length of the compressed stream, zlib header included.
    pub compressed_size: I32,
}

impl TextureBlockHeader {
    /// Header size in bytes.
    pub const SIZE: u64 = 12;

    /// Usual value of [`Self::tag_a`].
    pub const EXPECTED_TAG_A: u16 = 5;

    /// Usual value of [`Self::tag_b`].
    pub const EXPECTED_TAG_B: u16 = 0;

    /// Check the tag fields against their usual values.
    ///
    /// Containers with other values still decode; this is informational.
    pub fn has_expected_tags(&self) -> bool {
        self.tag_a.get() == Self::EXPECTED_TAG_A && self.tag_b.get() == Self::EXPECTED_TAG_B
    }
}

/// A located pixel block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureBlock {
    /// Offset of the [`TextureBlockHeader`].
    pub header_offset: u64,
    /// Offset of the compressed stream (where the signature was found).
    pub data_offset: u64,
    pub tag_a: u16,
    pub tag_b: u16,
    pub width: u16,
    pub height: u16,
    pub compressed_size: i32,
}

impl TextureBlock {
    /// Build from a raw header read at `header_offset`.
    pub fn from_header(header_offset: u64, header: &TextureBlockHeader) -> Self {
        Self {
            header_offset,
            data_offset: header_offset + TextureBlockHeader::SIZE,
            tag_a: header.tag_a.get(),
            tag_b: header.tag_b.get(),
            width: header.width.get(),
            height: header.height.get(),
            compressed_size: header.compressed_size.get(),
        }
    }

    /// Size of the decoded pixel buffer in bytes.
    pub fn pixel_len(&self) -> usize {
        pixel_len(self.width, self.height)
    }
}

/// Size in bytes of a `width` x `height` 32-bit image.
pub fn pixel_len(width: u16, height: u16) -> usize {
    usize::from(width) * usize::from(height) * BYTES_PER_PIXEL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_size() {
        assert_eq!(
            std::mem::size_of::<TextureBlockHeader>() as u64,
            TextureBlockHeader::SIZE
        );
    }

    #[test]
    fn test_signature_is_zlib_header() {
        assert_eq!(PIXEL_BLOCK_SIGNATURE.to_le_bytes(), [0x78, 0xDA]);
    }

    #[test]
    fn test_parse_header() {
        let bytes = [5, 0, 0, 0, 0x00, 0x01, 0x80, 0x00, 0x10, 0x00, 0x00, 0x00];
        let header = TextureBlockHeader::read_from_bytes(&bytes).unwrap();
        let block = TextureBlock::from_header(0x100, &header);

        assert!(header.has_expected_tags());
        assert_eq!(block.width, 256);
        assert_eq!(block.height, 128);
        assert_eq!(block.compressed_size, 16);
        assert_eq!(block.data_offset, 0x10C);
        assert_eq!(block.pixel_len(), 256 * 128 * 4);
    }
}
