use num_traits::FromPrimitive;
use tracing::{debug, trace};

use npl_api as api;
use api::headers::{Header, HeaderView, Ipv4, View};
use api::packet::{Frame, Layer, Layers, Packet, Protocol};

mod etype;
mod ip_proto;
pub mod link;

pub use etype::EtherType;
pub use ip_proto::IpProto;
pub use link::LinkType;

/// Walks the protocol headers of a frame, outermost first
///
/// Each step validates that the current header was fully captured, records where it starts
/// and decides the next protocol from the header's own fields. The walk ends when no further
/// protocol can be determined or the capture runs out; a truncated frame is not an error,
/// the layers found so far are kept.
#[derive(Clone, Copy, Debug)]
pub struct ProtocolDissector {
    /// SnapLen, Snap Length, or snapshot length is the amount of data for each frame
    /// that is actually captured by the network capturing tool and stored into the CaptureFile.
    /// https://wiki.wireshark.org/SnapLen
    snap_len: u16,
    first: Protocol,
}

impl Default for ProtocolDissector {
    fn default() -> Self {
        Self::new(Protocol::ETHERNET)
    }
}

impl ProtocolDissector {
    /// create a new protocol dissector starting at `first`
    pub fn new(first: Protocol) -> Self {
        Self {
            snap_len: u16::MAX,
            first,
        }
    }

    pub fn from_link_type(link_type: LinkType) -> Self {
        Self::new(link_type.first_protocol())
    }

    /// Ignore everything past `snap_len` bytes of a frame
    pub fn with_snap_len(mut self, snap_len: u16) -> Self {
        self.snap_len = snap_len;
        self
    }

    pub fn first_protocol(&self) -> Protocol {
        self.first
    }

    pub fn snap_len(&self) -> u16 {
        self.snap_len
    }

    /// Find the protocol layers of a single frame
    pub fn dissect(&self, buf: &[u8]) -> Layers {
        let data = &buf[..std::cmp::min(buf.len(), self.snap_len as usize)];
        let mut layers = Layers::default();
        let mut offset = 0usize;
        let mut protocol = self.first;

        while protocol != Protocol::UNKNOWN {
            let remain = View::new(data).tail(offset).as_bytes();
            let header = match Header::new(protocol, remain) {
                Ok(header) => header,
                Err(e) => {
                    debug!("stop at offset {}: {}", offset, e);
                    break;
                }
            };

            let hdr_len = header.header_len();
            if hdr_len > remain.len() {
                debug!(
                    "stop at offset {}: {} header claims {} bytes, {} bytes captured",
                    offset,
                    protocol,
                    hdr_len,
                    remain.len()
                );
                break;
            }

            // data is never longer than u16::MAX bytes and offset < data.len()
            layers.push(Layer {
                protocol,
                offset: offset as u16,
            });
            trace!("{} at offset {}, {} bytes", protocol, offset, hdr_len);

            offset += hdr_len;
            protocol = next_protocol(&header);
        }

        layers
    }

    /// Dissect `buf` and keep the result together with the buffer it indexes into
    pub fn frame<'a>(&self, buf: &'a [u8]) -> Frame<'a> {
        Frame::with_layers(buf, self.dissect(buf))
    }

    /// Dissect `buf` and hand the frame to `f`; the frame does not outlive the call
    pub fn with_frame<F, R>(&self, buf: &[u8], f: F) -> R
    where
        F: FnOnce(&Frame<'_>) -> R,
    {
        let frame = self.frame(buf);
        f(&frame)
    }

    /// parse a single packet, replacing its layers
    #[inline]
    pub fn parse_pkt(&self, pkt: &mut dyn Packet) {
        let layers = self.dissect(pkt.data());
        *pkt.layers_mut() = layers;
    }
}

/// Protocol encapsulated by `header`, `UNKNOWN` when there is none or it is not supported
fn next_protocol(header: &Header<'_>) -> Protocol {
    match header {
        Header::Ethernet(eth) => EtherType::from_u16(eth.ethertype())
            .map(Protocol::from)
            .unwrap_or(Protocol::UNKNOWN),
        Header::Vlan(vlan) => match EtherType::from_u16(vlan.ethertype()) {
            // stacked tags are not supported
            Some(EtherType::VLAN) | None => Protocol::UNKNOWN,
            Some(etype) => etype.into(),
        },
        Header::Ipv4(ip) => {
            if ip.header_len() < Ipv4::MIN_LEN {
                // payload position is undefined
                return Protocol::UNKNOWN;
            }
            IpProto::from_u8(ip.protocol())
                .map(Protocol::from)
                .unwrap_or(Protocol::UNKNOWN)
        }
        Header::Arp(_) | Header::Icmp(_) | Header::Udp(_) | Header::Tcp(_) => Protocol::UNKNOWN,
    }
}
