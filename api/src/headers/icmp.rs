use super::view::{be_u16, be_u32, View};
use super::{Error, HeaderView};
use crate::packet::Protocol;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Icmp<'a> {
    hdr: &'a [u8; 8],
}

impl<'a> HeaderView<'a> for Icmp<'a> {
    const PROTOCOL: Protocol = Protocol::ICMP;
    const MIN_LEN: usize = 8;

    #[inline]
    fn new(buf: &'a [u8]) -> Result<Self, Error> {
        let hdr = View::new(buf).header::<8>(Self::PROTOCOL)?;
        Ok(Icmp { hdr })
    }
}

impl<'a> Icmp<'a> {
    pub const ECHO_REPLY: u8 = 0;
    pub const DEST_UNREACHABLE: u8 = 3;
    pub const ECHO_REQUEST: u8 = 8;
    pub const TIME_EXCEEDED: u8 = 11;

    #[inline]
    pub fn icmp_type(&self) -> u8 {
        self.hdr[0]
    }

    #[inline]
    pub fn code(&self) -> u8 {
        self.hdr[1]
    }

    #[inline]
    pub fn checksum(&self) -> u16 {
        be_u16(self.hdr, 2)
    }

    /// Type specific second word, e.g. identifier and sequence number of an echo
    #[inline]
    pub fn rest(&self) -> u32 {
        be_u32(self.hdr, 4)
    }
}
