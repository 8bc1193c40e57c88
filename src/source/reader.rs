//! `io::Read` adapter
//!
//! Wraps any reader (file, socket, decompressor) as a [`ByteSource`] and
//! counts the bytes consumed, for error reporting and framing by callers.

use std::io::{self, Read};

use super::traits::ByteSource;
use crate::error::DecodeError;

/// A byte source over any `io::Read`.
///
/// No buffering is added; wrap unbuffered readers such as `File` in a
/// `BufReader` first.
///
/// # Example
/// ```
/// use glider::source::{ByteSource, ReadSource};
///
/// let mut source = ReadSource::new(&[0x02u8, 0x61, 0x62][..]);
/// assert_eq!(source.read_byte().unwrap(), 0x02);
/// assert_eq!(source.offset(), 1);
/// ```
#[derive(Debug)]
pub struct ReadSource<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> ReadSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

fn map_io(e: io::Error) -> DecodeError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        DecodeError::UnexpectedEof
    } else {
        DecodeError::Io(e)
    }
}

impl<R: Read> ByteSource for ReadSource<R> {
    fn read_byte(&mut self) -> Result<u8, DecodeError> {
        let mut buf = [0u8; 1];
        self.read_exact_into(&mut buf)?;
        Ok(buf[0])
    }

    fn read_exact_into(&mut self, buf: &mut [u8]) -> Result<(), DecodeError> {
        self.inner.read_exact(buf).map_err(map_io)?;
        self.offset += buf.len() as u64;
        Ok(())
    }

    fn read_vec(&mut self, len: usize) -> Result<Vec<u8>, DecodeError> {
        // Grow with the data actually read rather than trusting `len`
        let mut buf = Vec::new();
        let read = self
            .inner
            .by_ref()
            .take(len as u64)
            .read_to_end(&mut buf)
            .map_err(map_io)?;
        self.offset += read as u64;
        if read < len {
            return Err(DecodeError::UnexpectedEof);
        }
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_offset_tracking() {
        let mut source = ReadSource::new(Cursor::new(vec![1u8, 2, 3, 4, 5, 6, 7, 8, 9]));

        source.read_byte().unwrap();
        source.read_vec(3).unwrap();
        source.read_array::<4>().unwrap();
        assert_eq!(source.offset(), 8);
    }

    #[test]
    fn test_truncated_reader() {
        let mut source = ReadSource::new(Cursor::new(vec![1u8, 2]));
        assert!(matches!(
            source.read_vec(5),
            Err(DecodeError::UnexpectedEof)
        ));

        let mut source = ReadSource::new(Cursor::new(Vec::<u8>::new()));
        assert!(matches!(source.read_byte(), Err(DecodeError::UnexpectedEof)));
    }

    #[test]
    fn test_reader_error_is_io() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "broken pipe"))
            }
        }

        let mut source = ReadSource::new(Broken);
        assert!(matches!(source.read_byte(), Err(DecodeError::Io(_))));
    }
}
