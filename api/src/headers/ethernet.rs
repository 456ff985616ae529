use mac_address::MacAddress;

use super::view::{be_u16, mac, View};
use super::{mac_string, Error, HeaderView};
use crate::packet::Protocol;

/// Ethernet II header: destination MAC, source MAC, ether type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ethernet<'a> {
    hdr: &'a [u8; 14],
}

impl<'a> HeaderView<'a> for Ethernet<'a> {
    const PROTOCOL: Protocol = Protocol::ETHERNET;
    const MIN_LEN: usize = 14;

    #[inline]
    fn new(buf: &'a [u8]) -> Result<Self, Error> {
        let hdr = View::new(buf).header::<14>(Self::PROTOCOL)?;
        Ok(Ethernet { hdr })
    }
}

impl<'a> Ethernet<'a> {
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
    pub fn ethertype(&self) -> u16 {
        be_u16(self.hdr, 12)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok() {
        let buf = [
            0x01, 0x80, 0xc2, 0x00, 0x00, 0x00, 0xcc, 0x04, 0x0d, 0x5c, 0xf0, 0x00, 0x08, 0x00,
        ];
        let eth = Ethernet::new(&buf).unwrap();
        assert_eq!(eth.dst_mac(), "01:80:c2:00:00:00");
        assert_eq!(eth.src_mac(), "cc:04:0d:5c:f0:00");
        assert_eq!(eth.dst(), MacAddress::new([0x01, 0x80, 0xc2, 0x00, 0x00, 0x00]));
        assert_eq!(eth.ethertype(), 0x0800);
        assert_eq!(eth.header_len(), 14);
    }

    #[test]
    fn test_err_pkt_too_short() {
        let buf = [
            0x01, 0x80, 0xc2, 0x00, 0x00, 0x00, 0xcc, 0x04, 0x0d, 0x5c, 0xf0, 0x00,
        ];
        let result = Ethernet::new(&buf);
        assert!(matches!(
            result,
            Err(Error::TooShort {
                protocol: Protocol::ETHERNET,
                required: 14,
                available: 12
            })
        ));
    }
}
