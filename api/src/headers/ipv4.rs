use std::net::Ipv4Addr;

use super::view::{be_u16, View};
use super::{Error, HeaderView};
use crate::packet::Protocol;

/// IPv4 header, 20 bytes plus up to 40 bytes of options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ipv4<'a> {
    hdr: &'a [u8; 20],
    buf: &'a [u8],
}

impl<'a> HeaderView<'a> for Ipv4<'a> {
    const PROTOCOL: Protocol = Protocol::IPV4;
    const MIN_LEN: usize = 20;

    #[inline]
    fn new(buf: &'a [u8]) -> Result<Self, Error> {
        let hdr = View::new(buf).header::<20>(Self::PROTOCOL)?;
        Ok(Ipv4 { hdr, buf })
    }

    /// Header length in bytes, straight from the IHL field, may be less than 20
    #[inline]
    fn header_len(&self) -> usize {
        self.ihl() as usize * 4
    }
}

impl<'a> Ipv4<'a> {
    #[inline]
    pub fn version(&self) -> u8 {
        self.hdr[0] >> 4
    }

    /// Header length in 32-bit words
    #[inline]
    pub fn ihl(&self) -> u8 {
        self.hdr[0] & 0x0f
    }

    #[inline]
    pub fn tos(&self) -> u8 {
        self.hdr[1]
    }

    #[inline]
    pub fn total_len(&self) -> u16 {
        be_u16(self.hdr, 2)
    }

    #[inline]
    pub fn id(&self) -> u16 {
        be_u16(self.hdr, 4)
    }

    #[inline]
    pub fn dont_fragment(&self) -> bool {
        self.hdr[6] & 0x40 != 0
    }

    #[inline]
    pub fn more_fragments(&self) -> bool {
        self.hdr[6] & 0x20 != 0
    }

    /// Fragment offset in 8-byte units
    #[inline]
    pub fn fragment_offset(&self) -> u16 {
        be_u16(self.hdr, 6) & 0x1fff
    }

    #[inline]
    pub fn ttl(&self) -> u8 {
        self.hdr[8]
    }

    #[inline]
    pub fn protocol(&self) -> u8 {
        self.hdr[9]
    }

    #[inline]
    pub fn checksum(&self) -> u16 {
        be_u16(self.hdr, 10)
    }

    #[inline]
    pub fn src(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.hdr[12], self.hdr[13], self.hdr[14], self.hdr[15])
    }

    #[inline]
    pub fn dst(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.hdr[16], self.hdr[17], self.hdr[18], self.hdr[19])
    }

    /// Dotted decimal source address
    pub fn src_addr(&self) -> String {
        self.src().to_string()
    }

    /// Dotted decimal destination address
    pub fn dst_addr(&self) -> String {
        self.dst().to_string()
    }

    /// Bytes between the fixed header and the declared header end
    ///
    /// Empty when the header carries no options or the options were not fully captured.
    pub fn options(&self) -> &'a [u8] {
        let hlen = self.header_len();
        if hlen <= Self::MIN_LEN {
            return &[];
        }
        View::new(self.buf)
            .region(Self::MIN_LEN, hlen - Self::MIN_LEN, Self::PROTOCOL)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok() {
        let buf = [
            0x45, 0x00, 0x02, 0x2d, 0x00, 0x00, 0x40, 0x00, 0x40, 0x06, 0x79, 0x1d, 0xc0, 0xa8,
            0x02, 0xde, 0xda, 0x62, 0x21, 0xc5, // ipv4
            0xe2, 0xb2, 0x01, 0xbb, 0x2b, 0xd5, 0x16, 0xf7, 0x66, 0x96, 0xcf, 0xb8, 0x50, 0x18,
            0x10, 0x00, 0x8a, 0xcf, 0x00, 0x00, // tcp
        ];
        let ip = Ipv4::new(&buf).unwrap();
        assert_eq!(ip.version(), 4);
        assert_eq!(ip.ihl(), 5);
        assert_eq!(ip.header_len(), 20);
        assert_eq!(ip.total_len(), 557);
        assert!(ip.dont_fragment());
        assert!(!ip.more_fragments());
        assert_eq!(ip.fragment_offset(), 0);
        assert_eq!(ip.ttl(), 64);
        assert_eq!(ip.protocol(), 6);
        assert_eq!(ip.checksum(), 0x791d);
        assert_eq!(ip.src_addr(), "192.168.2.222");
        assert_eq!(ip.dst_addr(), "218.98.33.197");
        assert!(ip.options().is_empty());
    }

    #[test]
    fn test_options() {
        let buf = [
            0x46, 0x00, 0x00, 0x20, 0x00, 0x01, 0x00, 0x00, 0x01, 0x02, 0x00, 0x00, 0x0a, 0x00,
            0x00, 0x01, 0xe0, 0x00, 0x00, 0x16, // ipv4, ihl 6
            0x94, 0x04, 0x00, 0x00, // router alert
        ];
        let ip = Ipv4::new(&buf).unwrap();
        assert_eq!(ip.header_len(), 24);
        assert_eq!(ip.options(), &[0x94, 0x04, 0x00, 0x00]);

        // options not fully captured
        let ip = Ipv4::new(&buf[..22]).unwrap();
        assert!(ip.options().is_empty());
    }

    #[test]
    fn test_pathological_ihl() {
        let mut buf = [0u8; 40];
        buf[0] = 0x40;
        let ip = Ipv4::new(&buf).unwrap();
        assert_eq!(ip.header_len(), 0);
        assert!(ip.options().is_empty());

        buf[0] = 0x43;
        let ip = Ipv4::new(&buf).unwrap();
        assert_eq!(ip.header_len(), 12);
        assert!(ip.options().is_empty());
    }

    #[test]
    fn test_err_pkt_too_short() {
        let buf = [0x45u8; 16];
        let result = Ipv4::new(&buf);
        assert!(matches!(
            result,
            Err(Error::TooShort {
                protocol: Protocol::IPV4,
                required: 20,
                available: 16
            })
        ));
    }
}
