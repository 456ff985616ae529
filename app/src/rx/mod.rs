use chrono::{DateTime, TimeZone, Utc};

use npl_api as api;
use npl_utils as utils;
use api::packet::{Layers, Packet as PacketTrait};
use utils::dissectors::LinkType;

pub mod files;
pub mod pcap;

/// Capture time of a record
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timestamp {
    pub sec: u32,
    pub nsec: u32,
}

impl Timestamp {
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.sec as i64, self.nsec).single()
    }
}

/// A captured frame read from a capture file, owning its bytes
#[derive(Clone, Debug)]
pub struct Packet {
    raw: Vec<u8>,
    ts: Timestamp,
    orig_len: u32,
    link_type: LinkType,
    layers: Layers,
}

impl Packet {
    pub fn new(raw: Vec<u8>, ts: Timestamp, orig_len: u32, link_type: LinkType) -> Self {
        Packet {
            raw,
            ts,
            orig_len,
            link_type,
            layers: Layers::default(),
        }
    }

    #[inline]
    pub fn ts(&self) -> Timestamp {
        self.ts
    }

    /// Length of the frame on the wire
    #[inline]
    pub fn orig_len(&self) -> u32 {
        self.orig_len
    }

    #[inline]
    pub fn link_type(&self) -> LinkType {
        self.link_type
    }
}

impl PacketTrait for Packet {
    #[inline]
    fn raw(&self) -> &[u8] {
        self.raw.as_slice()
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
