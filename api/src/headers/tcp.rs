use bitflags::bitflags;

use super::view::{be_u16, be_u32, View};
use super::{Error, HeaderView};
use crate::packet::Protocol;

bitflags! {
    /// Flags byte of a TCP header
    pub struct TcpFlags: u8 {
        const FIN = 0x01;
        const SYN = 0x02;
        const RST = 0x04;
        const PSH = 0x08;
        const ACK = 0x10;
        const URG = 0x20;
        const ECE = 0x40;
        const CWR = 0x80;
    }
}

/// TCP header, 20 bytes plus up to 40 bytes of options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tcp<'a> {
    hdr: &'a [u8; 20],
    buf: &'a [u8],
}

impl<'a> HeaderView<'a> for Tcp<'a> {
    const PROTOCOL: Protocol = Protocol::TCP;
    const MIN_LEN: usize = 20;

    #[inline]
    fn new(buf: &'a [u8]) -> Result<Self, Error> {
        let hdr = View::new(buf).header::<20>(Self::PROTOCOL)?;
        Ok(Tcp { hdr, buf })
    }

    /// Header length in bytes, straight from the data offset field
    #[inline]
    fn header_len(&self) -> usize {
        self.data_offset() as usize * 4
    }
}

impl<'a> Tcp<'a> {
    #[inline]
    pub fn src_port(&self) -> u16 {
        be_u16(self.hdr, 0)
    }

    #[inline]
    pub fn dst_port(&self) -> u16 {
        be_u16(self.hdr, 2)
    }

    #[inline]
    pub fn seq(&self) -> u32 {
        be_u32(self.hdr, 4)
    }

    #[inline]
    pub fn ack_seq(&self) -> u32 {
        be_u32(self.hdr, 8)
    }

    /// Header length in 32-bit words
    #[inline]
    pub fn data_offset(&self) -> u8 {
        self.hdr[12] >> 4
    }

    #[inline]
    pub fn flags(&self) -> TcpFlags {
        TcpFlags::from_bits_truncate(self.hdr[13])
    }

    #[inline]
    pub fn syn(&self) -> bool {
        self.flags().contains(TcpFlags::SYN)
    }

    #[inline]
    pub fn ack(&self) -> bool {
        self.flags().contains(TcpFlags::ACK)
    }

    #[inline]
    pub fn fin(&self) -> bool {
        self.flags().contains(TcpFlags::FIN)
    }

    #[inline]
    pub fn rst(&self) -> bool {
        self.flags().contains(TcpFlags::RST)
    }

    #[inline]
    pub fn psh(&self) -> bool {
        self.flags().contains(TcpFlags::PSH)
    }

    #[inline]
    pub fn urg(&self) -> bool {
        self.flags().contains(TcpFlags::URG)
    }

    #[inline]
    pub fn window(&self) -> u16 {
        be_u16(self.hdr, 14)
    }

    #[inline]
    pub fn checksum(&self) -> u16 {
        be_u16(self.hdr, 16)
    }

    #[inline]
    pub fn urgent_ptr(&self) -> u16 {
        be_u16(self.hdr, 18)
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

    const SYN: [u8; 44] = [
        0x04, 0x3f, 0x08, 0x22, 0x04, 0x61, 0x1b, 0xea, 0x00, 0x00, 0x00, 0x00, 0xb0, 0x02,
        0xff, 0xff, 0x7c, 0x77, 0x00, 0x00, 0x02, 0x04, 0x05, 0x34, 0x01, 0x03, 0x03, 0x03,
        0x01, 0x01, 0x08, 0x0a, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01,
        0x04, 0x02,
    ];

    #[test]
    fn test_ok() {
        let tcp = Tcp::new(&SYN).unwrap();
        assert_eq!(tcp.src_port(), 1087);
        assert_eq!(tcp.dst_port(), 2082);
        assert_eq!(tcp.seq(), 0x04611bea);
        assert_eq!(tcp.ack_seq(), 0);
        assert_eq!(tcp.data_offset(), 11);
        assert_eq!(tcp.header_len(), 44);
        assert!(tcp.syn());
        assert!(!tcp.ack());
        assert!(!tcp.fin());
        assert!(!tcp.rst());
        assert_eq!(tcp.flags(), TcpFlags::SYN);
        assert_eq!(tcp.window(), 0xffff);
        assert_eq!(tcp.checksum(), 0x7c77);
        assert_eq!(tcp.urgent_ptr(), 0);
        assert_eq!(tcp.options().len(), 24);
        assert_eq!(&tcp.options()[..4], &[0x02, 0x04, 0x05, 0x34]);
    }

    #[test]
    fn test_flags() {
        let mut buf = SYN;
        buf[13] = 0x11;
        let tcp = Tcp::new(&buf).unwrap();
        assert!(tcp.fin());
        assert!(tcp.ack());
        assert!(!tcp.syn());

        buf[13] = 0x14;
        let tcp = Tcp::new(&buf).unwrap();
        assert!(tcp.rst());
        assert_eq!(tcp.flags(), TcpFlags::RST | TcpFlags::ACK);
    }

    #[test]
    fn test_options_not_captured() {
        let tcp = Tcp::new(&SYN[..30]).unwrap();
        assert_eq!(tcp.header_len(), 44);
        assert!(tcp.options().is_empty());

        let mut buf = SYN;
        buf[12] = 0x50;
        let tcp = Tcp::new(&buf).unwrap();
        assert!(tcp.options().is_empty());
    }

    #[test]
    fn test_err_packet_too_short() {
        let buf = [0x04];
        assert!(matches!(
            Tcp::new(&buf),
            Err(Error::TooShort {
                protocol: Protocol::TCP,
                required: 20,
                available: 1
            })
        ));
    }
}
