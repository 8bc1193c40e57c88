//! Shared varint encoding and decoding utilities.
//!
//! Every `int`, `long`, length prefix, block count, enum index and union
//! index is a zig-zag mapped integer written 7 bits per byte, least
//! significant group first, with the high bit set on all but the last byte.
//! Zig-zag interleaves signs (0, -1, 1, -2, 2 map to 0, 1, 2, 3, 4) so
//! small magnitudes of either sign stay short.

use std::io::{self, Write};

use crate::error::DecodeError;
use crate::source::ByteSource;

/// Longest varint for a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

// ============================================================================
// Decoding Functions
// ============================================================================

/// Decode an unsigned variable-length integer.
///
/// # Errors
/// - `DecodeError::UnexpectedEof` if the input is truncated
/// - `DecodeError::InvalidVarint` if the varint runs past 10 bytes
#[inline]
pub fn decode_varint<S: ByteSource + ?Sized>(src: &mut S) -> Result<u64, DecodeError> {
    let mut result: u64 = 0;
    for shift in (0..64).step_by(7) {
        let byte = src.read_byte()?;
        result |= u64::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
    }
    Err(DecodeError::InvalidVarint)
}

/// Decode a signed variable-length integer (zigzag encoded).
///
/// # Errors
/// - `DecodeError::UnexpectedEof` if the input is truncated
/// - `DecodeError::InvalidVarint` if the varint runs past 10 bytes
#[inline]
pub fn decode_zigzag<S: ByteSource + ?Sized>(src: &mut S) -> Result<i64, DecodeError> {
    decode_varint(src).map(zigzag_decode)
}

#[inline]
pub fn zigzag_decode(n: u64) -> i64 {
    ((n >> 1) as i64) ^ (-((n & 1) as i64))
}

// ============================================================================
// Encoding Functions
// ============================================================================

#[inline]
pub fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

/// Encode an unsigned integer into `buf`, returning the number of bytes used.
#[inline]
pub fn encode_varint_into(mut value: u64, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    let mut len = 0;
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80; // Set continuation bit
        }
        buf[len] = byte;
        len += 1;
        if value == 0 {
            return len;
        }
    }
}

/// Write an unsigned integer as a varint.
#[inline]
pub fn write_varint<W: Write + ?Sized>(sink: &mut W, value: u64) -> io::Result<()> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let len = encode_varint_into(value, &mut buf);
    sink.write_all(&buf[..len])
}

/// Write a signed integer as a zigzag varint.
#[inline]
pub fn write_zigzag<W: Write + ?Sized>(sink: &mut W, value: i64) -> io::Result<()> {
    write_varint(sink, zigzag_encode(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zigzag_bytes(value: i64) -> Vec<u8> {
        let mut out = Vec::new();
        write_zigzag(&mut out, value).unwrap();
        out
    }

    // ========================================================================
    // decode_varint tests
    // ========================================================================

    #[test]
    fn test_decode_varint_single_byte() {
        let data: &[u8] = &[0x00];
        let mut cursor = data;
        assert_eq!(decode_varint(&mut cursor).unwrap(), 0);
        assert!(cursor.is_empty());

        let data: &[u8] = &[0x7F];
        let mut cursor = data;
        assert_eq!(decode_varint(&mut cursor).unwrap(), 127);
    }

    #[test]
    fn test_decode_varint_multi_byte() {
        // 300 -> 0xAC 0x02
        let data: &[u8] = &[0xAC, 0x02, 0xFF];
        let mut cursor = data;
        assert_eq!(decode_varint(&mut cursor).unwrap(), 300);
        assert_eq!(cursor, &[0xFF]);

        // 16384 -> 0x80 0x80 0x01
        let data: &[u8] = &[0x80, 0x80, 0x01];
        let mut cursor = data;
        assert_eq!(decode_varint(&mut cursor).unwrap(), 16384);
    }

    #[test]
    fn test_decode_varint_max() {
        let data: &[u8] = &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];
        let mut cursor = data;
        assert_eq!(decode_varint(&mut cursor).unwrap(), u64::MAX);
    }

    #[test]
    fn test_decode_varint_eof() {
        let data: &[u8] = &[];
        let mut cursor = data;
        assert!(matches!(
            decode_varint(&mut cursor),
            Err(DecodeError::UnexpectedEof)
        ));

        // Continuation bit set but no more bytes
        let data: &[u8] = &[0x80];
        let mut cursor = data;
        assert!(matches!(
            decode_varint(&mut cursor),
            Err(DecodeError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_decode_varint_too_long() {
        let data: &[u8] = &[0xFF; 11];
        let mut cursor = data;
        assert!(matches!(
            decode_varint(&mut cursor),
            Err(DecodeError::InvalidVarint)
        ));
    }

    // ========================================================================
    // zigzag tests
    // ========================================================================

    #[test]
    fn test_decode_zigzag() {
        for (bytes, expected) in [
            (&[0x00][..], 0i64),
            (&[0x01][..], -1),
            (&[0x02][..], 1),
            (&[0x03][..], -2),
            (&[0x7F][..], -64),
            (&[0x80, 0x01][..], 64),
        ] {
            let mut cursor = bytes;
            assert_eq!(decode_zigzag(&mut cursor).unwrap(), expected);
        }
    }

    #[test]
    fn test_write_zigzag() {
        assert_eq!(zigzag_bytes(0), vec![0x00]);
        assert_eq!(zigzag_bytes(-1), vec![0x01]);
        assert_eq!(zigzag_bytes(1), vec![0x02]);
        assert_eq!(zigzag_bytes(64), vec![0x80, 0x01]);
        assert_eq!(zigzag_bytes(i64::MIN).len(), MAX_VARINT_LEN);
    }

    #[test]
    fn test_zigzag_extremes() {
        for value in [i64::MIN, i64::MIN + 1, -1, 0, 1, i64::MAX - 1, i64::MAX] {
            let bytes = zigzag_bytes(value);
            let mut cursor = &bytes[..];
            assert_eq!(decode_zigzag(&mut cursor).unwrap(), value);
            assert!(cursor.is_empty());
        }
    }
}
