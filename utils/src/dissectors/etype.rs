use npl_api::packet::Protocol;

/// ETHER TYPES
///
/// From Wireshark's etypes.h
/// https://github.com/wireshark/wireshark/blob/master/epan/etypes.h
#[repr(u16)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Primitive)]
pub enum EtherType {
    IPV4 = 0x0800,
    ARP = 0x0806,
    VLAN = 0x8100,
}

impl From<EtherType> for Protocol {
    fn from(etype: EtherType) -> Self {
        match etype {
            EtherType::IPV4 => Protocol::IPV4,
            EtherType::ARP => Protocol::ARP,
            EtherType::VLAN => Protocol::VLAN,
        }
    }
}
