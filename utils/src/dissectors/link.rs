use npl_api::packet::Protocol;

/// Link layer header types
///
/// https://www.tcpdump.org/linktypes.html
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Primitive)]
pub enum LinkType {
    ETHERNET = 1,
    /// Raw IP, the version is in the first nibble; only IPv4 is dissected
    RAW = 101,
    IPV4 = 228,
}

impl LinkType {
    /// Protocol of the first header in a frame of this link type
    pub fn first_protocol(&self) -> Protocol {
        match self {
            LinkType::ETHERNET => Protocol::ETHERNET,
            LinkType::RAW | LinkType::IPV4 => Protocol::IPV4,
        }
    }
}
