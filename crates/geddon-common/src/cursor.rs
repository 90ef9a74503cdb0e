//! Seekable byte cursor over in-memory or on-disk data.
//!
//! This module provides [`ByteCursor`], a random-access view with an explicit
//! position. Reads are bounds-checked against the source length before any
//! byte is consumed, so a failed read never moves the cursor.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use memchr::memmem;
use memmap2::Mmap;
use zerocopy::FromBytes;

use crate::scalar::{Scalar, MAX_SCALAR_WIDTH};
use crate::text::{LengthPrefix, TextEncoding};
use crate::varint::{self, MAX_GROUPS_32, MAX_GROUPS_64};
use crate::{Error, Result};

/// Bytes pulled from the source per step of a signature scan.
const SCAN_CHUNK: usize = 64 * 1024;

/// Cursor over a growable in-memory buffer.
pub type MemoryCursor = ByteCursor<io::Cursor<Vec<u8>>>;

/// Read-only cursor over a memory-mapped file.
pub type MappedCursor = ByteCursor<io::Cursor<Mmap>>;

/// Read/write cursor over an open file.
pub type FileCursor = ByteCursor<File>;

/// A seekable, endianness-aware cursor.
///
/// Byte order is chosen per call, either through the generic accessors
/// (`read::<u32, BigEndian>()`) or the named shorthands (`read_u32`,
/// `read_u32_be`).
///
/// # Example
///
/// ```
/// use geddon_common::{BigEndian, ByteCursor};
///
/// let mut cursor = ByteCursor::from_bytes(vec![0x01, 0x02, 0x03, 0x04, 0x00, 0x2A]);
///
/// assert_eq!(cursor.read_u32().unwrap(), 0x04030201);
/// assert_eq!(cursor.read::<u16, BigEndian>().unwrap(), 42);
/// assert!(cursor.is_eof());
/// ```
#[derive(Debug)]
pub struct ByteCursor<S> {
    stream: S,
    position: u64,
    len: u64,
    encoding: TextEncoding,
}

macro_rules! typed_reads {
    ($($le:ident, $be:ident => $ty:ty;)*) => {
        $(
            #[doc = concat!("Read a little-endian `", stringify!($ty), "`.")]
            #[inline]
            pub fn $le(&mut self) -> Result<$ty> {
                self.read::<$ty, LittleEndian>()
            }

            #[doc = concat!("Read a big-endian `", stringify!($ty), "`.")]
            #[inline]
            pub fn $be(&mut self) -> Result<$ty> {
                self.read::<$ty, BigEndian>()
            }
        )*
    };
}

macro_rules! typed_writes {
    ($($le:ident, $be:ident => $ty:ty;)*) => {
        $(
            #[doc = concat!("Write a little-endian `", stringify!($ty), "`.")]
            #[inline]
            pub fn $le(&mut self, value: $ty) -> Result<()> {
                self.write::<$ty, LittleEndian>(value)
            }

            #[doc = concat!("Write a big-endian `", stringify!($ty), "`.")]
            #[inline]
            pub fn $be(&mut self, value: $ty) -> Result<()> {
                self.write::<$ty, BigEndian>(value)
            }
        )*
    };
}

impl MemoryCursor {
    /// Create a cursor over an owned buffer. Writes past the end grow it.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        let len = data.len() as u64;
        Self {
            stream: io::Cursor::new(data),
            position: 0,
            len,
            encoding: TextEncoding::default(),
        }
    }

    /// Borrow the underlying buffer.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.stream.get_ref()
    }

    /// Consume the cursor and return the buffer.
    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.stream.into_inner()
    }
}

impl MappedCursor {
    /// Open a file read-only through a memory map.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        Self::new(io::Cursor::new(mmap))
    }
}

impl FileCursor {
    /// Open an existing file for reading and writing.
    pub fn open_rw<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Self::new(file)
    }

    /// Create (or truncate) a file for reading and writing.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Self::new(file)
    }
}

impl<S: Seek> ByteCursor<S> {
    /// Wrap a seekable stream. The cursor starts at offset 0.
    pub fn new(mut stream: S) -> Result<Self> {
        let len = stream.seek(SeekFrom::End(0))?;
        stream.seek(SeekFrom::Start(0))?;
        Ok(Self {
            stream,
            position: 0,
            len,
            encoding: TextEncoding::default(),
        })
    }

    /// Use a different text encoding for string accessors.
    #[must_use]
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set the text encoding for string accessors.
    #[inline]
    pub fn set_encoding(&mut self, encoding: TextEncoding) {
        self.encoding = encoding;
    }

    /// Text encoding used by string accessors.
    #[inline]
    pub const fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Borrow the underlying stream.
    #[inline]
    pub const fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Consume the cursor and return the underlying stream.
    #[inline]
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Current absolute position.
    #[inline]
    pub const fn tell(&self) -> u64 {
        self.position
    }

    /// Total length of the source.
    #[inline]
    pub const fn len(&self) -> u64 {
        self.len
    }

    /// Check if the source holds no bytes.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of bytes between the position and the end of the source.
    #[inline]
    pub const fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_eof(&self) -> bool {
        self.position >= self.len
    }

    /// Seek to an absolute position. Seeking past the end is allowed;
    /// subsequent reads fail and subsequent writes extend the source.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        self.stream.seek(SeekFrom::Start(offset))?;
        self.position = offset;
        Ok(())
    }

    /// Advance the position by `count` bytes.
    #[inline]
    pub fn skip(&mut self, count: u64) -> Result<()> {
        self.seek(self.position.saturating_add(count))
    }

    /// Move the position back by `count` bytes, stopping at 0.
    #[inline]
    pub fn rewind(&mut self, count: u64) -> Result<()> {
        self.seek(self.position.saturating_sub(count))
    }

    /// Seek to `count` bytes before the end of the source.
    #[inline]
    pub fn seek_from_end(&mut self, count: u64) -> Result<()> {
        self.seek(self.len.saturating_sub(count))
    }

    /// Run `f` with the cursor temporarily moved to `offset`.
    ///
    /// The previous position is restored on every exit path, including when
    /// `f` fails.
    pub fn with_position<T, F>(&mut self, offset: u64, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let saved = self.position;
        let result = self.seek(offset).and_then(|()| f(self));
        let restored = self.seek(saved);
        let value = result?;
        restored?;
        Ok(value)
    }

    fn ensure(&self, needed: u64) -> Result<()> {
        let available = self.remaining();
        if available < needed {
            return Err(Error::TruncatedRead {
                offset: self.position,
                needed,
                available,
            });
        }
        Ok(())
    }
}

impl<S: Read + Seek> ByteCursor<S> {
    /// Fill `buf` from the current position and advance past it.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.ensure(buf.len() as u64)?;
        if let Err(err) = self.stream.read_exact(buf) {
            // Keep the stream in step with the cached position.
            self.stream.seek(SeekFrom::Start(self.position))?;
            return Err(match err.kind() {
                io::ErrorKind::UnexpectedEof => Error::TruncatedRead {
                    offset: self.position,
                    needed: buf.len() as u64,
                    available: 0,
                },
                _ => Error::Io(err),
            });
        }
        self.position += buf.len() as u64;
        Ok(())
    }

    /// Read `count` bytes and advance the position.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        self.ensure(count as u64)?;
        let mut bytes = vec![0u8; count];
        self.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    /// Read a fixed-width value in byte order `E`.
    #[inline]
    pub fn read<T: Scalar, E: ByteOrder>(&mut self) -> Result<T> {
        let mut buf = [0u8; MAX_SCALAR_WIDTH];
        let bytes = &mut buf[..T::WIDTH];
        self.read_exact(bytes)?;
        Ok(T::decode::<E>(bytes))
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read::<u8, LittleEndian>()
    }

    /// Read a signed byte.
    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        self.read::<i8, LittleEndian>()
    }

    /// Read a boolean (non-zero = true).
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool> {
        self.read::<bool, LittleEndian>()
    }

    typed_reads! {
        read_u16, read_u16_be => u16;
        read_i16, read_i16_be => i16;
        read_u32, read_u32_be => u32;
        read_i32, read_i32_be => i32;
        read_u64, read_u64_be => u64;
        read_i64, read_i64_be => i64;
        read_f32, read_f32_be => f32;
        read_f64, read_f64_be => f64;
    }

    /// Read an unsigned integer of `nbytes` (1 to 8) bytes, e.g. 24- or 48-bit fields.
    pub fn read_uint<E: ByteOrder>(&mut self, nbytes: usize) -> Result<u64> {
        assert!((1..=8).contains(&nbytes), "uint width must be 1..=8 bytes");
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf[..nbytes])?;
        Ok(E::read_uint(&buf[..nbytes], nbytes))
    }

    /// Read a struct using zerocopy.
    ///
    /// The struct must implement `FromBytes` from the zerocopy crate.
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let offset = self.position;
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(&bytes).map_err(|_| Error::TruncatedRead {
            offset,
            needed: size as u64,
            available: bytes.len() as u64,
        })
    }

    /// Read a value without advancing.
    pub fn peek<T: Scalar, E: ByteOrder>(&mut self) -> Result<T> {
        let offset = self.position;
        self.with_position(offset, |cursor| cursor.read::<T, E>())
    }

    /// Read a value at `offset` without disturbing the position.
    pub fn get_at<T: Scalar, E: ByteOrder>(&mut self, offset: u64) -> Result<T> {
        self.with_position(offset, |cursor| cursor.read::<T, E>())
    }

    /// Read `count` bytes at `offset` without disturbing the position.
    pub fn bytes_at(&mut self, offset: u64, count: usize) -> Result<Vec<u8>> {
        self.with_position(offset, |cursor| cursor.read_bytes(count))
    }

    /// Check that the next bytes equal `expected`, consuming them.
    pub fn expect_bytes(&mut self, expected: &[u8]) -> Result<()> {
        let offset = self.position;
        let actual = self.read_bytes(expected.len())?;
        if actual != expected {
            return Err(Error::SignatureMismatch {
                offset,
                expected: expected.to_vec(),
                actual,
            });
        }
        Ok(())
    }

    /// Check that the next value equals `expected`, consuming it.
    pub fn expect<T: Scalar, E: ByteOrder>(&mut self, expected: T) -> Result<()> {
        let mut buf = [0u8; MAX_SCALAR_WIDTH];
        expected.encode::<E>(&mut buf[..T::WIDTH]);
        self.expect_bytes(&buf[..T::WIDTH])
    }

    /// Read a string of exactly `count` bytes.
    pub fn read_string(&mut self, count: usize) -> Result<String> {
        let bytes = self.read_bytes(count)?;
        Ok(self.encoding.decode(&bytes))
    }

    /// Read `count` bytes and decode them in reverse order.
    pub fn read_reversed_string(&mut self, count: usize) -> Result<String> {
        let mut bytes = self.read_bytes(count)?;
        bytes.reverse();
        Ok(self.encoding.decode(&bytes))
    }

    /// Read a null-terminated string. The terminator is consumed.
    pub fn read_cstring(&mut self) -> Result<String> {
        let start = self.position;
        let mut bytes = Vec::new();
        loop {
            match self.read_u8() {
                Ok(0) => break,
                Ok(b) => bytes.push(b),
                Err(err) => {
                    self.seek(start)?;
                    return Err(err);
                }
            }
        }
        Ok(self.encoding.decode(&bytes))
    }

    /// Read a string preceded by its byte length.
    pub fn read_prefixed_string(&mut self, prefix: LengthPrefix) -> Result<String> {
        let start = self.position;
        let length = match prefix {
            LengthPrefix::U8 => u32::from(self.read_u8()?),
            LengthPrefix::U32Le => self.read_u32()?,
            LengthPrefix::U32Be => self.read_u32_be()?,
            LengthPrefix::VarInt => self.read_var_u32()?,
        };
        match self.read_string(length as usize) {
            Ok(text) => Ok(text),
            Err(err) => {
                self.seek(start)?;
                Err(err)
            }
        }
    }

    fn read_varint(&mut self, max_groups: u32) -> Result<u64> {
        let start = self.position;
        let mut value = 0u64;
        let mut groups = 0;
        loop {
            if groups == max_groups {
                return Err(Error::EncodingTooLarge {
                    offset: start,
                    max_groups,
                });
            }
            let byte = self.read_u8()?;
            let more = varint::push_group(&mut value, groups, byte);
            groups += 1;
            if !more {
                return Ok(value);
            }
        }
    }

    /// Read an unsigned base-128 varint of at most five groups.
    #[inline]
    pub fn read_var_u32(&mut self) -> Result<u32> {
        self.read_varint(MAX_GROUPS_32).map(|v| v as u32)
    }

    /// Read an unsigned base-128 varint of at most ten groups.
    #[inline]
    pub fn read_var_u64(&mut self) -> Result<u64> {
        self.read_varint(MAX_GROUPS_64)
    }

    /// Read a zig-zag encoded 32-bit integer.
    #[inline]
    pub fn read_zigzag32(&mut self) -> Result<i32> {
        self.read_var_u32().map(varint::zigzag_decode_32)
    }

    /// Read a zig-zag encoded 64-bit integer.
    #[inline]
    pub fn read_zigzag64(&mut self) -> Result<i64> {
        self.read_var_u64().map(varint::zigzag_decode_64)
    }

    /// Find the next occurrence of `value` at or after the current position.
    ///
    /// Every byte offset is tried, regardless of the alignment of `T`. The
    /// position is left unchanged.
    pub fn find_next<T: Scalar, E: ByteOrder>(&mut self, value: T) -> Result<Option<u64>> {
        let mut buf = [0u8; MAX_SCALAR_WIDTH];
        value.encode::<E>(&mut buf[..T::WIDTH]);
        self.find_bytes(&buf[..T::WIDTH])
    }

    /// Find the next occurrence of `needle` at or after the current position.
    pub fn find_bytes(&mut self, needle: &[u8]) -> Result<Option<u64>> {
        let start = self.position;
        if needle.is_empty() {
            return Ok((start <= self.len).then_some(start));
        }

        let finder = memmem::Finder::new(needle);
        let overlap = needle.len() - 1;

        self.with_position(start, |cursor| {
            let mut window: Vec<u8> = Vec::with_capacity(SCAN_CHUNK + overlap);
            let mut window_start = start;

            while !cursor.is_eof() {
                let take = cursor.remaining().min(SCAN_CHUNK as u64) as usize;
                let filled = window.len();
                window.resize(filled + take, 0);
                cursor.read_exact(&mut window[filled..])?;

                if let Some(found) = finder.find(&window) {
                    return Ok(Some(window_start + found as u64));
                }

                // Carry the tail so a match straddling two chunks is still seen.
                let drop = window.len().saturating_sub(overlap);
                window.drain(..drop);
                window_start += drop as u64;
            }

            Ok(None)
        })
    }
}

impl<S: Write + Seek> ByteCursor<S> {
    /// Write raw bytes at the current position, extending the source if needed.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if let Err(err) = self.stream.write_all(bytes) {
            self.stream.seek(SeekFrom::Start(self.position))?;
            return Err(Error::Io(err));
        }
        self.position += bytes.len() as u64;
        self.len = self.len.max(self.position);
        Ok(())
    }

    /// Write a fixed-width value in byte order `E`.
    #[inline]
    pub fn write<T: Scalar, E: ByteOrder>(&mut self, value: T) -> Result<()> {
        let mut buf = [0u8; MAX_SCALAR_WIDTH];
        value.encode::<E>(&mut buf[..T::WIDTH]);
        self.write_bytes(&buf[..T::WIDTH])
    }

    /// Write a single byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write::<u8, LittleEndian>(value)
    }

    /// Write a signed byte.
    #[inline]
    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.write::<i8, LittleEndian>(value)
    }

    /// Write a boolean as one byte.
    #[inline]
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write::<bool, LittleEndian>(value)
    }

    typed_writes! {
        write_u16, write_u16_be => u16;
        write_i16, write_i16_be => i16;
        write_u32, write_u32_be => u32;
        write_i32, write_i32_be => i32;
        write_u64, write_u64_be => u64;
        write_i64, write_i64_be => i64;
        write_f32, write_f32_be => f32;
        write_f64, write_f64_be => f64;
    }

    /// Write a value at `offset` without disturbing the position.
    pub fn set_at<T: Scalar, E: ByteOrder>(&mut self, offset: u64, value: T) -> Result<()> {
        self.with_position(offset, |cursor| cursor.write::<T, E>(value))
    }

    /// Write bytes at `offset` without disturbing the position.
    pub fn set_bytes_at(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        self.with_position(offset, |cursor| cursor.write_bytes(bytes))
    }

    /// Write a string without any framing.
    pub fn write_string(&mut self, text: &str) -> Result<()> {
        let bytes = self.encoding.encode(text);
        self.write_bytes(&bytes)
    }

    /// Write a string followed by a NUL terminator.
    pub fn write_cstring(&mut self, text: &str) -> Result<()> {
        self.write_string(text)?;
        self.write_u8(0)
    }

    /// Write a string preceded by its byte length.
    pub fn write_prefixed_string(&mut self, text: &str, prefix: LengthPrefix) -> Result<()> {
        let bytes = self.encoding.encode(text);
        if bytes.len() as u64 > prefix.max_len() {
            return Err(Error::StringTooLong {
                length: bytes.len(),
                max: prefix.max_len(),
            });
        }
        let length = bytes.len() as u32;
        match prefix {
            LengthPrefix::U8 => self.write_u8(length as u8)?,
            LengthPrefix::U32Le => self.write_u32(length)?,
            LengthPrefix::U32Be => self.write_u32_be(length)?,
            LengthPrefix::VarInt => self.write_var_u32(length)?,
        }
        self.write_bytes(&bytes)
    }

    /// Write an unsigned base-128 varint.
    pub fn write_var_u32(&mut self, value: u32) -> Result<()> {
        let mut encoded = Vec::with_capacity(MAX_GROUPS_32 as usize);
        varint::encode_u32(value, &mut encoded);
        self.write_bytes(&encoded)
    }

    /// Write an unsigned base-128 varint.
    pub fn write_var_u64(&mut self, value: u64) -> Result<()> {
        let mut encoded = Vec::with_capacity(MAX_GROUPS_64 as usize);
        varint::encode_u64(value, &mut encoded);
        self.write_bytes(&encoded)
    }

    /// Write a zig-zag encoded 32-bit integer.
    #[inline]
    pub fn write_zigzag32(&mut self, value: i32) -> Result<()> {
        self.write_var_u32(varint::zigzag_encode_32(value))
    }

    /// Write a zig-zag encoded 64-bit integer.
    #[inline]
    pub fn write_zigzag64(&mut self, value: i64) -> Result<()> {
        self.write_var_u64(varint::zigzag_encode_64(value))
    }

    /// Flush buffered writes to the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        self.stream.flush()?;
        Ok(())
    }
}

impl<S: Read + Write + Seek> ByteCursor<S> {
    /// XOR `length` bytes at `offset` in place with a repeating `pattern`.
    ///
    /// The position is left unchanged. An empty pattern is a no-op.
    pub fn xor_range(&mut self, pattern: &[u8], offset: u64, length: usize) -> Result<()> {
        if pattern.is_empty() || length == 0 {
            return Ok(());
        }
        self.with_position(offset, |cursor| {
            let mut bytes = cursor.read_bytes(length)?;
            for (byte, key) in bytes.iter_mut().zip(pattern.iter().cycle()) {
                *byte ^= key;
            }
            cursor.seek(offset)?;
            cursor.write_bytes(&bytes)
        })
    }

    /// XOR `length` bytes at `offset` in place with a single byte.
    #[inline]
    pub fn xor_byte(&mut self, value: u8, offset: u64, length: usize) -> Result<()> {
        self.xor_range(&[value], offset, length)
    }
}
