//! Read-only header views over captured bytes.
//!
//! Every view validates that the bytes it needs were captured before any field is read.
//! Multi-byte fields are kept in network byte order and converted when accessed.

use thiserror::Error;

use crate::packet::Protocol;

mod arp;
mod ethernet;
mod icmp;
mod ipv4;
mod tcp;
mod udp;
mod view;
mod vlan;

pub use arp::Arp;
pub use ethernet::Ethernet;
pub use icmp::Icmp;
pub use ipv4::Ipv4;
pub use tcp::{Tcp, TcpFlags};
pub use udp::Udp;
pub use view::View;
pub use vlan::Vlan;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("{protocol} header too short: {required} bytes required, {available} bytes captured")]
    TooShort {
        protocol: Protocol,
        required: usize,
        available: usize,
    },
    #[error("No header view for protocol {0}")]
    UnsupportedProtocol(Protocol),
}

/// A typed, read-only view onto one protocol header
pub trait HeaderView<'a>: Sized {
    const PROTOCOL: Protocol;
    /// Length of the fixed part of the header
    const MIN_LEN: usize;

    /// Create a view over `buf`, which starts at the header and runs to the end of the capture
    fn new(buf: &'a [u8]) -> Result<Self, Error>;

    /// Header length in bytes, as declared by the header for variable length headers
    #[inline]
    fn header_len(&self) -> usize {
        Self::MIN_LEN
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Header<'a> {
    Ethernet(Ethernet<'a>),
    Vlan(Vlan<'a>),
    Arp(Arp<'a>),
    Ipv4(Ipv4<'a>),
    Icmp(Icmp<'a>),
    Udp(Udp<'a>),
    Tcp(Tcp<'a>),
}

impl<'a> Header<'a> {
    /// Build the view matching `protocol`
    pub fn new(protocol: Protocol, buf: &'a [u8]) -> Result<Self, Error> {
        match protocol {
            Protocol::ETHERNET => Ethernet::new(buf).map(Header::Ethernet),
            Protocol::VLAN => Vlan::new(buf).map(Header::Vlan),
            Protocol::ARP => Arp::new(buf).map(Header::Arp),
            Protocol::IPV4 => Ipv4::new(buf).map(Header::Ipv4),
            Protocol::ICMP => Icmp::new(buf).map(Header::Icmp),
            Protocol::UDP => Udp::new(buf).map(Header::Udp),
            Protocol::TCP => Tcp::new(buf).map(Header::Tcp),
            Protocol::UNKNOWN => Err(Error::UnsupportedProtocol(protocol)),
        }
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            Header::Ethernet(_) => Protocol::ETHERNET,
            Header::Vlan(_) => Protocol::VLAN,
            Header::Arp(_) => Protocol::ARP,
            Header::Ipv4(_) => Protocol::IPV4,
            Header::Icmp(_) => Protocol::ICMP,
            Header::Udp(_) => Protocol::UDP,
            Header::Tcp(_) => Protocol::TCP,
        }
    }

    pub fn header_len(&self) -> usize {
        match self {
            Header::Ethernet(h) => h.header_len(),
            Header::Vlan(h) => h.header_len(),
            Header::Arp(h) => h.header_len(),
            Header::Ipv4(h) => h.header_len(),
            Header::Icmp(h) => h.header_len(),
            Header::Udp(h) => h.header_len(),
            Header::Tcp(h) => h.header_len(),
        }
    }
}

/// Lower case, colon separated, two hex digits per byte
pub(crate) fn mac_string(addr: &[u8; 6]) -> String {
    addr.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_protocol() {
        let buf = [0u8; 64];
        assert!(matches!(
            Header::new(Protocol::UNKNOWN, &buf),
            Err(Error::UnsupportedProtocol(Protocol::UNKNOWN))
        ));
    }

    #[test]
    fn test_dispatch() {
        let buf = [0x45u8; 64];
        let hdr = Header::new(Protocol::IPV4, &buf).unwrap();
        assert_eq!(hdr.protocol(), Protocol::IPV4);
        assert_eq!(hdr.header_len(), 20);

        let hdr = Header::new(Protocol::UDP, &buf).unwrap();
        assert_eq!(hdr.protocol(), Protocol::UDP);
        assert_eq!(hdr.header_len(), 8);
    }

    #[test]
    fn test_too_short_for_every_protocol() {
        let buf = [0u8; 7];
        for protocol in [
            Protocol::ETHERNET,
            Protocol::VLAN,
            Protocol::ARP,
            Protocol::IPV4,
            Protocol::ICMP,
            Protocol::UDP,
            Protocol::TCP,
        ]
        .iter()
        {
            let result = Header::new(*protocol, &buf);
            assert!(
                matches!(result, Err(Error::TooShort { protocol: p, available: 7, .. }) if p == *protocol)
            );
        }
    }

    #[test]
    fn test_views_are_value_equal() {
        let buf = [0x45u8; 40];
        assert_eq!(
            Header::new(Protocol::IPV4, &buf[4..]).unwrap(),
            Header::new(Protocol::IPV4, &buf[4..]).unwrap()
        );
    }

    #[test]
    fn test_mac_string() {
        let addr = [0x00, 0x1b, 0x0a, 0xff, 0x10, 0x01];
        assert_eq!(mac_string(&addr), "00:1b:0a:ff:10:01");
    }

    #[test]
    fn test_error_display() {
        let err = Error::TooShort {
            protocol: Protocol::IPV4,
            required: 20,
            available: 16,
        };
        assert_eq!(
            err.to_string(),
            "IPv4 header too short: 20 bytes required, 16 bytes captured"
        );
    }
}
