use npl_api::packet::Protocol;

/// IP protocol numbers
///
/// https://www.iana.org/assignments/protocol-numbers/protocol-numbers.xhtml
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Primitive)]
pub enum IpProto {
    ICMP = 1,
    TCP = 6,
    UDP = 17,
}

impl From<IpProto> for Protocol {
    fn from(proto: IpProto) -> Self {
        match proto {
            IpProto::ICMP => Protocol::ICMP,
            IpProto::TCP => Protocol::TCP,
            IpProto::UDP => Protocol::UDP,
        }
    }
}
