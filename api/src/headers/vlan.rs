use mac_address::MacAddress;

use super::view::{be_u16, mac, View};
use super::{mac_string, Error, HeaderView};
use crate::packet::Protocol;

/// 802.1Q tagged header
///
/// This follows the layout used throughout this crate, which repeats the MAC addresses before
/// the tag: destination MAC, source MAC, TPID, tag control word, inner ether type.
/// It is not the canonical IEEE 802.1Q placement, where the 4-byte tag follows the outer
/// Ethernet header directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Vlan<'a> {
    hdr: &'a [u8; 18],
}

impl<'a> HeaderView<'a> for Vlan<'a> {
    const PROTOCOL: Protocol = Protocol::VLAN;
    const MIN_LEN: usize = 18;

    #[inline]
    fn new(buf: &'a [u8]) -> Result<Self, Error> {
        let hdr = View::new(buf).header::<18>(Self::PROTOCOL)?;
        Ok(Vlan { hdr })
    }
}

impl<'a> Vlan<'a> {
    #[inline]
    pub fn dst(&self) -> MacAddress {
        MacAddress::new(mac(self.hdr, 0))
    }

    #[inline]
    pub fn src(&self) -> MacAddress {
        MacAddress::new(mac(self.hdr, 6))
    }

    pub fn dst_mac(&self) -> String {
        mac_string(&mac(self.hdr, 0))
    }

    pub fn src_mac(&self) -> String {
        mac_string(&mac(self.hdr, 6))
    }

    #[inline]
    pub fn tpid(&self) -> u16 {
        be_u16(self.hdr, 12)
    }

    /// Tag control information: priority(3) | DEI(1) | VLAN id(12)
    #[inline]
    pub fn tci(&self) -> u16 {
        be_u16(self.hdr, 14)
    }

    #[inline]
    pub fn vlan_id(&self) -> u16 {
        self.tci() & 0x0FFF
    }

    #[inline]
    pub fn priority(&self) -> u8 {
        (self.tci() >> 13) as u8
    }

    #[inline]
    pub fn dei(&self) -> bool {
        self.tci() & 0x1000 != 0
    }

    #[inline]
    pub fn ethertype(&self) -> u16 {
        be_u16(self.hdr, 16)
    }
}
