use super::view::{be_u16, View};
use super::{Error, HeaderView};
use crate::packet::Protocol;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Udp<'a> {
    hdr: &'a [u8; 8],
}

impl<'a> HeaderView<'a> for Udp<'a> {
    const PROTOCOL: Protocol = Protocol::UDP;
    const MIN_LEN: usize = 8;

    #[inline]
    fn new(buf: &'a [u8]) -> Result<Self, Error> {
        let hdr = View::new(buf).header::<8>(Self::PROTOCOL)?;
        Ok(Udp { hdr })
    }
}

impl<'a> Udp<'a> {
    #[inline]
    pub fn src_port(&self) -> u16 {
        be_u16(self.hdr, 0)
    }

    #[inline]
    pub fn dst_port(&self) -> u16 {
        be_u16(self.hdr, 2)
    }

    /// Length of header and payload as declared by the sender
    #[inline]
    pub fn length(&self) -> u16 {
        be_u16(self.hdr, 4)
    }

    #[inline]
    pub fn checksum(&self) -> u16 {
        be_u16(self.hdr, 6)
    }
}
