use std::convert::TryFrom;

use super::Error;
use crate::packet::Protocol;

/// Non-owning window over captured bytes
///
/// The only place where a header view turns a byte slice into a fixed size header.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct View<'a> {
    buf: &'a [u8],
}

impl<'a> View<'a> {
    #[inline]
    pub fn new(buf: &'a [u8]) -> Self {
        View { buf }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.buf
    }

    /// Whether `size` bytes starting at `offset` were captured
    #[inline]
    pub fn fits(&self, offset: usize, size: usize) -> bool {
        match offset.checked_add(size) {
            Some(end) => end <= self.buf.len(),
            None => false,
        }
    }

    /// Captured bytes from `offset` to the end
    #[inline]
    pub fn remaining(&self, offset: usize) -> usize {
        self.buf.len().saturating_sub(offset)
    }

    /// View starting at `offset`, empty when `offset` is past the end
    #[inline]
    pub fn tail(&self, offset: usize) -> View<'a> {
        View {
            buf: self.buf.get(offset..).unwrap_or(&[]),
        }
    }

    /// `size` bytes starting at `offset`
    pub fn region(&self, offset: usize, size: usize, protocol: Protocol) -> Result<&'a [u8], Error> {
        if !self.fits(offset, size) {
            return Err(Error::TooShort {
                protocol,
                required: size,
                available: self.remaining(offset),
            });
        }
        Ok(&self.buf[offset..offset + size])
    }

    /// The first `N` bytes as a fixed size header
    pub fn header<const N: usize>(&self, protocol: Protocol) -> Result<&'a [u8; N], Error> {
        let region = self.region(0, N, protocol)?;
        <&[u8; N]>::try_from(region).map_err(|_| Error::TooShort {
            protocol,
            required: N,
            available: self.buf.len(),
        })
    }
}

#[inline]
pub(crate) fn be_u16<const N: usize>(hdr: &[u8; N], at: usize) -> u16 {
    u16::from_be_bytes([hdr[at], hdr[at + 1]])
}

#[inline]
pub(crate) fn be_u32<const N: usize>(hdr: &[u8; N], at: usize) -> u32 {
    u32::from_be_bytes([hdr[at], hdr[at + 1], hdr[at + 2], hdr[at + 3]])
}

#[inline]
pub(crate) fn mac<const N: usize>(hdr: &[u8; N], at: usize) -> [u8; 6] {
    let mut addr = [0u8; 6];
    addr.copy_from_slice(&hdr[at..at + 6]);
    addr
}
