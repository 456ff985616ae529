//! We do not perform serious protocol parsing in this module.
//! All we keep here is which protocols a frame carries and where each header starts;
//! field access is done lazily by the header views in [`crate::headers`].

use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};
use strum::EnumString;
use tinyvec::TinyVec;

use crate::headers::{Error, Header, HeaderView, View};

#[repr(u8)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
/// Protocol collection, 1 byte
pub enum Protocol {
    // Data link layer protocols
    #[strum(serialize = "ether", serialize = "ethernet")]
    ETHERNET,
    #[strum(serialize = "vlan", serialize = "802.1q")]
    VLAN,
    #[strum(serialize = "arp")]
    ARP,

    // Network layer protocols
    #[strum(serialize = "ipv4", serialize = "ip")]
    IPV4,
    #[strum(serialize = "icmp")]
    ICMP,

    // Transport layer protocols
    #[strum(serialize = "udp")]
    UDP,
    #[strum(serialize = "tcp")]
    TCP,

    // Unknown protocol
    #[strum(disabled)]
    UNKNOWN,
}

impl Protocol {
    /// Human readable protocol name
    pub fn name(&self) -> &'static str {
        match self {
            Protocol::ETHERNET => "Ether",
            Protocol::VLAN => "802.1q",
            Protocol::ARP => "ARP",
            Protocol::IPV4 => "IPv4",
            Protocol::ICMP => "ICMP",
            Protocol::UDP => "UDP",
            Protocol::TCP => "TCP",
            Protocol::UNKNOWN => "Unknown",
        }
    }
}

impl Default for Protocol {
    #[inline]
    fn default() -> Self {
        Protocol::UNKNOWN
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Protocol {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize)]
/// Packet protocol layer
pub struct Layer {
    pub protocol: Protocol,
    /// protocol start offset
    pub offset: u16,
}

/// Protocol layers of a single frame, outermost first
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct Layers(TinyVec<[Layer; 8]>);

impl Layers {
    #[inline]
    pub fn push(&mut self, layer: Layer) {
        self.0.push(layer)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Layer> {
        self.0.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Layer] {
        self.0.as_slice()
    }

    /// How many times `protocol` occurs in this frame
    pub fn count(&self, protocol: Protocol) -> usize {
        self.0.iter().filter(|l| l.protocol == protocol).count()
    }

    /// Re-create header views of `protocol` over `data`, the buffer these layers were built from
    pub fn header<'a>(&self, protocol: Protocol, data: &'a [u8]) -> Vec<Result<Header<'a>, Error>> {
        self.0
            .iter()
            .filter(|l| l.protocol == protocol)
            .map(|l| Header::new(protocol, View::new(data).tail(l.offset as usize).as_bytes()))
            .collect()
    }

    /// Typed flavour of [`Layers::header`]
    pub fn headers<'a, H: HeaderView<'a>>(&self, data: &'a [u8]) -> Vec<Result<H, Error>> {
        self.0
            .iter()
            .filter(|l| l.protocol == H::PROTOCOL)
            .map(|l| H::new(View::new(data).tail(l.offset as usize).as_bytes()))
            .collect()
    }
}

impl AsRef<[Layer]> for Layers {
    fn as_ref(&self) -> &[Layer] {
        self.0.as_slice()
    }
}

impl<'a> IntoIterator for &'a Layers {
    type Item = &'a Layer;
    type IntoIter = std::slice::Iter<'a, Layer>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Display for Layers {
    /// `Ether--IPv4--TCP`, nothing at all for an empty chain
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, layer) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("--")?;
            }
            f.write_str(layer.protocol.name())?;
        }
        Ok(())
    }
}

impl Serialize for Layers {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.0.iter())
    }
}

pub trait Packet: Send {
    /// Get raw packet data
    fn raw(&self) -> &[u8];

    /// Get packet capture length
    fn caplen(&self) -> u32;

    fn layers(&self) -> &Layers;
    fn layers_mut(&mut self) -> &mut Layers;

    /// Bytes actually captured, `raw()` bounded by `caplen()`
    #[inline]
    fn data(&self) -> &[u8] {
        let raw = self.raw();
        let caplen = std::cmp::min(self.caplen() as usize, raw.len());
        &raw[..caplen]
    }

    /// Number of `protocol` headers this packet carries
    #[inline]
    fn has(&self, protocol: Protocol) -> usize {
        self.layers().count(protocol)
    }

    /// Header views of every `protocol` layer, outermost first
    fn header(&self, protocol: Protocol) -> Vec<Result<Header<'_>, Error>> {
        self.layers().header(protocol, self.data())
    }

    /// Typed header views of every `H` layer, outermost first
    fn headers<'a, H: HeaderView<'a>>(&'a self) -> Vec<Result<H, Error>>
    where
        Self: Sized,
    {
        self.layers().headers(self.data())
    }

    /// All recorded layers
    #[inline]
    fn dump(&self) -> &[Layer] {
        self.layers().as_slice()
    }

    /// `Ether--IPv4--TCP` style summary, empty when no layer was recognized
    fn summary(&self) -> String {
        self.layers().to_string()
    }
}

impl std::fmt::Debug for dyn Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packet")
            .field("caplen", &self.caplen())
            .field("layers", &self.dump())
            .finish()
    }
}

/// A captured frame borrowed from its owner, with its protocol layers
///
/// Neither the frame nor any header view created from it can outlive the borrowed buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame<'a> {
    raw: &'a [u8],
    layers: Layers,
}

impl<'a> Frame<'a> {
    pub fn new(raw: &'a [u8]) -> Self {
        Frame {
            raw,
            layers: Layers::default(),
        }
    }

    pub fn with_layers(raw: &'a [u8], layers: Layers) -> Self {
        Frame { raw, layers }
    }

    /// Typed header views tied to the underlying buffer rather than to the frame
    pub fn views<H: HeaderView<'a>>(&self) -> Vec<Result<H, Error>> {
        self.layers.headers(self.raw)
    }
}

impl Packet for Frame<'_> {
    #[inline]
    fn raw(&self) -> &[u8] {
        self.raw
    }

    #[inline]
    fn caplen(&self) -> u32 {
        self.raw.len() as u32
    }

    #[inline]
    fn layers(&self) -> &Layers {
        &self.layers
    }

    #[inline]
    fn layers_mut(&mut self) -> &mut Layers {
        &mut self.layers
    }
}

#[cfg(test)]
pub mod test {
    use std::str::FromStr;

    use super::*;
    use crate::headers::{Arp, Udp};

    fn layers(layers: &[(Protocol, u16)]) -> Layers {
        let mut result = Layers::default();
        for (protocol, offset) in layers {
            result.push(Layer {
                protocol: *protocol,
                offset: *offset,
            });
        }
        result
    }

    #[test]
    fn test_protocol_from_str() {
        assert_eq!(Protocol::from_str("tcp").unwrap(), Protocol::TCP);
        assert_eq!(Protocol::from_str("TCP").unwrap(), Protocol::TCP);
        assert_eq!(Protocol::from_str("ethernet").unwrap(), Protocol::ETHERNET);
        assert_eq!(Protocol::from_str("Ether").unwrap(), Protocol::ETHERNET);
        assert_eq!(Protocol::from_str("802.1Q").unwrap(), Protocol::VLAN);
        assert!(Protocol::from_str("unknown").is_err());
        assert!(Protocol::from_str("sctp").is_err());
    }

    #[test]
    fn test_summary() {
        let l = layers(&[
            (Protocol::ETHERNET, 0),
            (Protocol::VLAN, 14),
            (Protocol::IPV4, 32),
            (Protocol::UDP, 52),
        ]);
        assert_eq!(l.to_string(), "Ether--802.1q--IPv4--UDP");

        let l = layers(&[(Protocol::ETHERNET, 0)]);
        assert_eq!(l.to_string(), "Ether");
    }

    #[test]
    fn test_summary_empty_chain() {
        let frame = Frame::new(&[]);
        assert_eq!(frame.summary(), "");
        assert!(frame.dump().is_empty());
    }

    #[test]
    fn test_has() {
        let l = layers(&[(Protocol::ETHERNET, 0), (Protocol::ARP, 14)]);
        let buf = [0u8; 22];
        let frame = Frame::with_layers(&buf, l);
        assert_eq!(frame.has(Protocol::ETHERNET), 1);
        assert_eq!(frame.has(Protocol::ARP), 1);
        assert_eq!(frame.has(Protocol::TCP), 0);
    }

    #[test]
    fn test_header_by_tag() {
        let mut buf = [0u8; 22];
        buf[12] = 0x08;
        buf[13] = 0x06;
        buf[20] = 0x00;
        buf[21] = 0x02;
        let l = layers(&[(Protocol::ETHERNET, 0), (Protocol::ARP, 14)]);
        let frame = Frame::with_layers(&buf, l);

        let headers = frame.header(Protocol::ARP);
        assert_eq!(headers.len(), 1);
        assert!(matches!(&headers[0], Ok(Header::Arp(arp)) if arp.operation() == 2));
        assert!(frame.header(Protocol::TCP).is_empty());

        let arps = frame.headers::<Arp>();
        assert_eq!(arps.len(), 1);
        assert_eq!(arps[0].as_ref().unwrap().operation(), 2);
    }

    #[test]
    fn test_header_revalidates_bounds() {
        // a chain that claims more than the buffer holds
        let l = layers(&[(Protocol::UDP, 4)]);
        let buf = [0u8; 8];
        let frame = Frame::with_layers(&buf, l);
        let udps = frame.views::<Udp>();
        assert_eq!(udps.len(), 1);
        assert!(matches!(
            udps[0],
            Err(Error::TooShort {
                protocol: Protocol::UDP,
                required: 8,
                available: 4
            })
        ));

        let l = layers(&[(Protocol::UDP, 40)]);
        let frame = Frame::with_layers(&buf, l);
        assert!(matches!(
            frame.header(Protocol::UDP)[0],
            Err(Error::TooShort { available: 0, .. })
        ));
    }

    #[test]
    fn test_serialize() {
        let l = layers(&[(Protocol::ETHERNET, 0), (Protocol::IPV4, 14)]);
        assert_eq!(
            serde_json::to_string(&l).unwrap(),
            r#"[{"protocol":"Ether","offset":0},{"protocol":"IPv4","offset":14}]"#
        );
    }
}
