//! ByteSource trait definition
//!
//! Provides a single sequential interface for the decoder to pull bytes
//! from, whether they sit in memory or arrive through an `io::Read`.

use crate::error::DecodeError;

/// A sequential cursor over encoded bytes.
///
/// The decoder only ever moves forward. Each operation either consumes
/// exactly the requested bytes or fails; a failure leaves the cursor in an
/// unspecified position.
pub trait ByteSource {
    /// Read a single byte.
    ///
    /// # Errors
    /// - `DecodeError::UnexpectedEof` if the source is exhausted
    fn read_byte(&mut self) -> Result<u8, DecodeError>;

    /// Fill `buf` completely.
    ///
    /// # Errors
    /// - `DecodeError::UnexpectedEof` if fewer than `buf.len()` bytes remain
    /// - `DecodeError::Io` if the underlying reader fails
    fn read_exact_into(&mut self, buf: &mut [u8]) -> Result<(), DecodeError>;

    /// Read exactly `len` bytes into a new buffer.
    ///
    /// # Errors
    /// - `DecodeError::UnexpectedEof` if fewer than `len` bytes remain
    fn read_vec(&mut self, len: usize) -> Result<Vec<u8>, DecodeError> {
        let mut buf = vec![0u8; len];
        self.read_exact_into(&mut buf)?;
        Ok(buf)
    }

    /// Read a fixed-width array, as used for IEEE754 floats.
    #[inline]
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError>
    where
        Self: Sized,
    {
        let mut buf = [0u8; N];
        self.read_exact_into(&mut buf)?;
        Ok(buf)
    }
}

/// In-memory cursor: the slice is advanced past every byte consumed.
impl ByteSource for &[u8] {
    #[inline]
    fn read_byte(&mut self) -> Result<u8, DecodeError> {
        let (&byte, rest) = self.split_first().ok_or(DecodeError::UnexpectedEof)?;
        *self = rest;
        Ok(byte)
    }

    #[inline]
    fn read_exact_into(&mut self, buf: &mut [u8]) -> Result<(), DecodeError> {
        if self.len() < buf.len() {
            return Err(DecodeError::UnexpectedEof);
        }
        let (head, rest) = self.split_at(buf.len());
        buf.copy_from_slice(head);
        *self = rest;
        Ok(())
    }

    fn read_vec(&mut self, len: usize) -> Result<Vec<u8>, DecodeError> {
        // Check before allocating so a corrupt length cannot reserve memory
        if self.len() < len {
            return Err(DecodeError::UnexpectedEof);
        }
        let (head, rest) = self.split_at(len);
        *self = rest;
        Ok(head.to_vec())
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    #[inline]
    fn read_byte(&mut self) -> Result<u8, DecodeError> {
        (**self).read_byte()
    }

    #[inline]
    fn read_exact_into(&mut self, buf: &mut [u8]) -> Result<(), DecodeError> {
        (**self).read_exact_into(buf)
    }

    fn read_vec(&mut self, len: usize) -> Result<Vec<u8>, DecodeError> {
        (**self).read_vec(len)
    }
}
