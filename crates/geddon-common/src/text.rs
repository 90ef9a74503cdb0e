//! String framing and text decoding.

/// How the length of a length-prefixed string is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthPrefix {
    /// One unsigned byte.
    U8,
    /// Four bytes, little-endian.
    U32Le,
    /// Four bytes, big-endian.
    U32Be,
    /// Base-128 variable-length integer.
    VarInt,
}

impl LengthPrefix {
    /// Largest payload length the prefix can describe.
    pub const fn max_len(self) -> u64 {
        match self {
            Self::U8 => u8::MAX as u64,
            Self::U32Le | Self::U32Be | Self::VarInt => u32::MAX as u64,
        }
    }
}

/// Text encoding used when turning raw bytes into strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8; invalid sequences are replaced with U+FFFD.
    #[default]
    Utf8,
    /// ISO-8859-1, one byte per code point.
    Latin1,
}

impl TextEncoding {
    /// Decode bytes to a string, dropping embedded NUL characters.
    pub fn decode(self, bytes: &[u8]) -> String {
        let mut text = match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        };
        text.retain(|c| c != '\0');
        text
    }

    /// Encode a string to bytes.
    ///
    /// Characters outside Latin-1 are written as `?` in [`TextEncoding::Latin1`].
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_strips_nul() {
        assert_eq!(TextEncoding::Utf8.decode(b"ab\0c\0\0"), "abc");
    }

    #[test]
    fn test_latin1_roundtrip() {
        let bytes = [0x63, 0x61, 0x66, 0xE9];
        let text = TextEncoding::Latin1.decode(&bytes);
        assert_eq!(text, "caf\u{e9}");
        assert_eq!(TextEncoding::Latin1.encode(&text), bytes);
        assert_eq!(TextEncoding::Latin1.encode("\u{4e2d}"), b"?");
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        assert_eq!(TextEncoding::Utf8.decode(&[b'a', 0xFF]), "a\u{fffd}");
    }
}
