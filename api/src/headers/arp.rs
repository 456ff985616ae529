use super::view::{be_u16, View};
use super::{Error, HeaderView};
use crate::packet::Protocol;

/// ARP fixed header, followed by the variable length address fields
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arp<'a> {
    hdr: &'a [u8; 8],
    buf: &'a [u8],
}

impl<'a> HeaderView<'a> for Arp<'a> {
    const PROTOCOL: Protocol = Protocol::ARP;
    const MIN_LEN: usize = 8;

    #[inline]
    fn new(buf: &'a [u8]) -> Result<Self, Error> {
        let hdr = View::new(buf).header::<8>(Self::PROTOCOL)?;
        Ok(Arp { hdr, buf })
    }
}

impl<'a> Arp<'a> {
    pub const REQUEST: u16 = 1;
    pub const REPLY: u16 = 2;

    #[inline]
    pub fn hardware_type(&self) -> u16 {
        be_u16(self.hdr, 0)
    }

    #[inline]
    pub fn protocol_type(&self) -> u16 {
        be_u16(self.hdr, 2)
    }

    #[inline]
    pub fn hardware_len(&self) -> u8 {
        self.hdr[4]
    }

    #[inline]
    pub fn protocol_len(&self) -> u8 {
        self.hdr[5]
    }

    #[inline]
    pub fn operation(&self) -> u16 {
        be_u16(self.hdr, 6)
    }

    /// Sender hardware address, `None` if it was not captured
    pub fn sender_hardware_addr(&self) -> Option<&'a [u8]> {
        self.field(0)
    }

    pub fn sender_protocol_addr(&self) -> Option<&'a [u8]> {
        self.field(1)
    }

    pub fn target_hardware_addr(&self) -> Option<&'a [u8]> {
        self.field(2)
    }

    pub fn target_protocol_addr(&self) -> Option<&'a [u8]> {
        self.field(3)
    }

    /// Address fields alternate hardware/protocol, sender first
    fn field(&self, index: usize) -> Option<&'a [u8]> {
        let hlen = self.hardware_len() as usize;
        let plen = self.protocol_len() as usize;
        let start = Self::MIN_LEN + (index / 2) * (hlen + plen) + (index % 2) * hlen;
        let len = if index % 2 == 0 { hlen } else { plen };
        View::new(self.buf).region(start, len, Self::PROTOCOL).ok()
    }
}
