//! Deflate decompression of pixel blocks.

use std::io::Read;

use flate2::read::DeflateDecoder;

use crate::{Error, Result};

/// Length of the zlib header in front of the raw deflate stream.
pub const ZLIB_HEADER_LEN: usize = 2;

/// Streams of this many bytes or fewer carry no pixel data.
pub const MIN_STREAM_LEN: usize = 6;

/// Cap on up-front allocation driven by header fields.
const MAX_PREALLOCATION: usize = 64 << 20;

/// Decompress a zlib-framed pixel block.
///
/// The two-byte zlib header is skipped and the remainder inflated as raw
/// deflate; the trailing checksum is not verified. Blocks of at most
/// [`MIN_STREAM_LEN`] bytes yield an empty buffer.
pub fn inflate(data: &[u8], size_hint: usize) -> Result<Vec<u8>> {
    if data.len() <= MIN_STREAM_LEN {
        return Ok(Vec::new());
    }

    let mut output = Vec::with_capacity(size_hint.min(MAX_PREALLOCATION));
    let mut decoder = DeflateDecoder::new(&data[ZLIB_HEADER_LEN..]);
    decoder
        .read_to_end(&mut output)
        .map_err(|e| Error::Decompression(e.to_string()))?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::DeflateEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_inflate_roundtrip() {
        let plain = b"BGRABGRABGRABGRA pixel rows compress well";

        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(plain).unwrap();
        let mut stream = vec![0x78, 0xDA];
        stream.extend(encoder.finish().unwrap());
        stream.extend([0, 0, 0, 0]);

        assert_eq!(inflate(&stream, plain.len()).unwrap(), plain);
    }

    #[test]
    fn test_short_stream_is_empty() {
        assert!(inflate(&[], 16).unwrap().is_empty());
        assert!(inflate(&[0x78, 0xDA, 1, 2, 3, 4], 16).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_stream() {
        let stream = [0x78, 0xDA, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        assert!(matches!(inflate(&stream, 0), Err(Error::Decompression(_))));
    }
}
