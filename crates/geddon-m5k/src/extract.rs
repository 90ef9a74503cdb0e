//! Locating and decoding the pixel block inside an M5K container.

use std::io::{Read, Seek};

use geddon_common::{ByteCursor, LittleEndian};
use tracing::{trace, warn};

use crate::header::{TextureBlock, TextureBlockHeader, PIXEL_BLOCK_SIGNATURE, SCAN_START};
use crate::inflate::inflate;
use crate::pixels::DecodedImage;
use crate::{Error, Result};

/// Find the pixel block header.
///
/// Scans from [`SCAN_START`] for [`PIXEL_BLOCK_SIGNATURE`]. The header sits
/// [`TextureBlockHeader::SIZE`] bytes before it. Returns `None` when no
/// signature is present; on success the cursor is left at the start of the
/// compressed stream.
pub fn locate<S: Read + Seek>(cursor: &mut ByteCursor<S>) -> Result<Option<TextureBlock>> {
    cursor.seek(SCAN_START)?;
    let Some(signature) = cursor.find_next::<u16, LittleEndian>(PIXEL_BLOCK_SIGNATURE)? else {
        trace!("no pixel block signature past {:#x}", SCAN_START);
        return Ok(None);
    };

    let header_offset = signature - TextureBlockHeader::SIZE;
    cursor.seek(header_offset)?;
    let header: TextureBlockHeader = cursor.read_struct()?;
    let block = TextureBlock::from_header(header_offset, &header);

    if !header.has_expected_tags() {
        warn!(
            "unexpected pixel block tags {}/{} at {:#x}",
            block.tag_a, block.tag_b, header_offset
        );
    }
    trace!(
        "pixel block {}x{} ({} bytes) at {:#x}",
        block.width,
        block.height,
        block.compressed_size,
        block.data_offset
    );

    Ok(Some(block))
}

/// Decode the texture held by an M5K container.
///
/// Returns `None` when the container has no pixel block. Degenerate blocks
/// (compressed size of 6 bytes or less) decode to an empty image.
pub fn extract<S: Read + Seek>(cursor: &mut ByteCursor<S>) -> Result<Option<DecodedImage>> {
    let Some(block) = locate(cursor)? else {
        return Ok(None);
    };

    let size = usize::try_from(block.compressed_size)
        .map_err(|_| Error::InvalidBlockSize(block.compressed_size))?;
    cursor.seek(block.data_offset)?;
    let compressed = cursor.read_bytes(size)?;

    let bgra = inflate(&compressed, block.pixel_len())?;
    DecodedImage::from_bgra(block.width, block.height, &bgra).map(Some)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pixels::Argb;
    use flate2::write::DeflateEncoder;
    use flate2::Compression;
    use geddon_common::MemoryCursor;
    use std::io::Write;

    /// zlib-framed stream as the container stores it. The trailing checksum
    /// is never checked, so it is left zeroed.
    pub(crate) fn zlib_stream(bgra: &[u8]) -> Vec<u8> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(bgra).unwrap();
        let mut stream = PIXEL_BLOCK_SIGNATURE.to_le_bytes().to_vec();
        stream.extend(encoder.finish().unwrap());
        stream.extend([0, 0, 0, 0]);
        stream
    }

    pub(crate) fn container(tags: (u16, u16), width: u16, height: u16, stream: &[u8]) -> Vec<u8> {
        let mut cursor = MemoryCursor::from_bytes(vec![0u8; SCAN_START as usize]);
        cursor.seek(SCAN_START).unwrap();
        cursor.write_u16(tags.0).unwrap();
        cursor.write_u16(tags.1).unwrap();
        cursor.write_u16(width).unwrap();
        cursor.write_u16(height).unwrap();
        cursor.write_i32(stream.len() as i32).unwrap();
        cursor.write_bytes(stream).unwrap();
        cursor.into_bytes()
    }

    pub(crate) fn texture(width: u16, height: u16, bgra: &[u8]) -> Vec<u8> {
        container((5, 0), width, height, &zlib_stream(bgra))
    }

    #[test]
    fn test_locate() {
        let mut cursor = MemoryCursor::from_bytes(texture(3, 2, &[0; 24]));
        let block = locate(&mut cursor).unwrap().unwrap();

        assert_eq!(block.header_offset, SCAN_START);
        assert_eq!(block.data_offset, SCAN_START + 12);
        assert_eq!((block.tag_a, block.tag_b), (5, 0));
        assert_eq!((block.width, block.height), (3, 2));
        assert_eq!(cursor.tell(), block.data_offset);
    }

    #[test]
    fn test_extract_pixels() {
        let mut cursor = MemoryCursor::from_bytes(texture(2, 1, &[1, 2, 3, 4, 5, 6, 7, 8]));
        let image = extract(&mut cursor).unwrap().unwrap();

        assert_eq!((image.width(), image.height()), (2, 1));
        assert_eq!(image.pixels(), &[Argb::new(4, 3, 2, 1), Argb::new(8, 7, 6, 5)]);
    }

    #[test]
    fn test_no_signature() {
        let mut cursor = MemoryCursor::from_bytes(vec![0u8; 0x200]);
        assert!(extract(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn test_short_file() {
        let mut cursor = MemoryCursor::from_bytes(vec![0x78, 0xDA, 0, 0]);
        assert!(locate(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn test_signature_before_scan_start_ignored() {
        let mut data = vec![0u8; 0x100];
        data[0x20] = 0x78;
        data[0x21] = 0xDA;
        let mut cursor = MemoryCursor::from_bytes(data);
        assert!(locate(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn test_degenerate_block() {
        let stream = [0x78, 0xDA, 0, 0];
        let mut cursor = MemoryCursor::from_bytes(container((5, 0), 16, 16, &stream));
        let image = extract(&mut cursor).unwrap().unwrap();

        assert!(image.is_empty());
        assert_eq!(image.width(), 16);
    }

    #[test]
    fn test_tags_are_advisory() {
        let stream = zlib_stream(&[9, 8, 7, 6]);
        let mut cursor = MemoryCursor::from_bytes(container((7, 3), 1, 1, &stream));
        let image = extract(&mut cursor).unwrap().unwrap();
        assert_eq!(image.pixels(), &[Argb::new(6, 7, 8, 9)]);
    }

    #[test]
    fn test_truncated_block() {
        let mut data = texture(4, 4, &[0x11; 64]);
        data.truncate(data.len() - 6);
        let mut cursor = MemoryCursor::from_bytes(data);

        assert!(matches!(
            extract(&mut cursor),
            Err(Error::Common(geddon_common::Error::TruncatedRead { .. }))
        ));
    }

    #[test]
    fn test_short_pixel_data() {
        let mut cursor = MemoryCursor::from_bytes(texture(4, 4, &[0x22; 8]));
        assert!(matches!(
            extract(&mut cursor),
            Err(Error::Common(geddon_common::Error::TruncatedRead {
                needed: 64,
                available: 8,
                ..
            }))
        ));
    }

    #[test]
    fn test_negative_size() {
        let mut data = texture(1, 1, &[0; 4]);
        let size_at = SCAN_START as usize + 8;
        data[size_at..size_at + 4].copy_from_slice(&(-1i32).to_le_bytes());
        let mut cursor = MemoryCursor::from_bytes(data);

        assert!(matches!(extract(&mut cursor), Err(Error::InvalidBlockSize(-1))));
    }
}
