//! Capture file reader for libpcap and pcapng files
//!
//! Blocks are streamed through a fixed size buffer, a capture is never loaded whole.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use num_traits::FromPrimitive;
use pcap_parser::pcapng::Block;
use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{LegacyPcapReader, PcapBlockOwned, PcapError as ParseError, PcapNGReader};
use thiserror::Error;
use tracing::{debug, warn};

use npl_utils as utils;
use utils::dissectors::LinkType;

use super::{Packet, Timestamp};

/// Largest block the reader can hold at once
const BUFFER_SIZE: usize = 262144;

pub const MAGIC_USEC: u32 = 0xa1b2_c3d4;
pub const MAGIC_NSEC: u32 = 0xa1b2_3c4d;
pub const MAGIC_PCAPNG: u32 = 0x0a0d_0d0a;

#[derive(Debug, Error)]
pub enum PcapError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Not a capture file, bad magic number {0:#010x}")]
    BadMagic(u32),
    #[error("Capture file header too short: {0} bytes")]
    HeaderTooShort(usize),
    #[error("Unsupported link type {0}")]
    UnsupportedLinkType(i32),
    #[error("Malformed capture file: {0}")]
    Malformed(String),
}

/// Container format, told by the magic number
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// Classic libpcap, `nsec` when timestamp fractions are nanoseconds
    Legacy { nsec: bool },
    PcapNg,
}

impl Format {
    fn detect(magic: u32) -> Result<Self, PcapError> {
        match magic {
            MAGIC_USEC => Ok(Format::Legacy { nsec: false }),
            MAGIC_NSEC => Ok(Format::Legacy { nsec: true }),
            m if m == MAGIC_USEC.swap_bytes() => Ok(Format::Legacy { nsec: false }),
            m if m == MAGIC_NSEC.swap_bytes() => Ok(Format::Legacy { nsec: true }),
            MAGIC_PCAPNG => Ok(Format::PcapNg),
            m => Err(PcapError::BadMagic(m)),
        }
    }
}

/// A capture interface, the single one of a libpcap file or an IDB of a pcapng section
#[derive(Clone, Copy, Debug)]
struct Interface {
    link_type: Option<LinkType>,
    raw_link_type: i32,
    /// pcapng `if_tsresol`, 6 for microseconds
    tsresol: u8,
    tsoffset: i64,
}

impl Interface {
    fn new(raw_link_type: i32, forced: Option<LinkType>, tsresol: u8, tsoffset: i64) -> Self {
        Interface {
            link_type: forced.or_else(|| LinkType::from_i32(raw_link_type)),
            raw_link_type,
            tsresol,
            tsoffset,
        }
    }

    /// Convert a 64 bit pcapng timestamp counted in `if_tsresol` units
    fn timestamp(&self, ts_high: u32, ts_low: u32) -> Timestamp {
        let ts = (u64::from(ts_high) << 32) | u64::from(ts_low);
        let unit = if self.tsresol & 0x80 == 0 {
            10u64.saturating_pow(u32::from(self.tsresol))
        } else {
            2u64.saturating_pow(u32::from(self.tsresol & 0x7f))
        };
        let sec = (ts / unit) as i64;
        let nsec = (u128::from(ts % unit) * 1_000_000_000 / u128::from(unit)) as u32;
        Timestamp {
            sec: sec.saturating_add(self.tsoffset).clamp(0, u32::MAX as i64) as u32,
            nsec,
        }
    }
}

enum Reader<R: Read> {
    Legacy(LegacyPcapReader<BufReader<R>>),
    Ng(PcapNGReader<BufReader<R>>),
}

enum Record {
    Interface,
    Packet(Packet),
}

/// An opened capture file, yielding its records as owned packets
pub struct PcapFile<R: Read> {
    reader: Reader<R>,
    format: Format,
    /// Overrides the link type declared by the file
    forced: Option<LinkType>,
    interfaces: Vec<Interface>,
    truncated: bool,
    done: bool,
}

impl PcapFile<File> {
    /// Open `path`; `link_type` overrides the link type declared by the file
    pub fn open<P: AsRef<Path>>(path: P, link_type: Option<LinkType>) -> Result<Self, PcapError> {
        Self::new(File::open(path)?, link_type)
    }
}

impl<R: Read> PcapFile<R> {
    pub fn new(reader: R, link_type: Option<LinkType>) -> Result<Self, PcapError> {
        let mut reader = BufReader::with_capacity(BUFFER_SIZE, reader);
        let magic = {
            let buf = reader.fill_buf()?;
            match buf.get(..4) {
                Some(m) => u32::from_le_bytes([m[0], m[1], m[2], m[3]]),
                None => return Err(PcapError::HeaderTooShort(buf.len())),
            }
        };
        let format = Format::detect(magic)?;

        let reader = match format {
            Format::Legacy { .. } => {
                Reader::Legacy(LegacyPcapReader::new(BUFFER_SIZE, reader).map_err(header_error)?)
            }
            Format::PcapNg => Reader::Ng(PcapNGReader::new(BUFFER_SIZE, reader).map_err(header_error)?),
        };

        let mut file = PcapFile {
            reader,
            format,
            forced: link_type,
            interfaces: vec![],
            truncated: false,
            done: false,
        };

        // the link type of the first interface decides whether the file can be read at all
        while let Some(record) = file.next_record()? {
            if let Record::Interface = record {
                break;
            }
        }
        if let Some(first) = file.interfaces.first() {
            if first.link_type.is_none() {
                return Err(PcapError::UnsupportedLinkType(first.raw_link_type));
            }
        }

        Ok(file)
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Link type of the first capture interface
    pub fn link_type(&self) -> Option<LinkType> {
        self.interfaces.first().and_then(|i| i.link_type)
    }

    /// Whether reading stopped at an incomplete trailing record
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Next captured frame, `None` at the end of the file
    pub fn next_packet(&mut self) -> Result<Option<Packet>, PcapError> {
        while let Some(record) = self.next_record()? {
            if let Record::Packet(pkt) = record {
                return Ok(Some(pkt));
            }
        }
        Ok(None)
    }

    fn next_record(&mut self) -> Result<Option<Record>, PcapError> {
        if self.done {
            return Ok(None);
        }

        let reader: &mut dyn PcapReaderIterator = match &mut self.reader {
            Reader::Legacy(r) => r,
            Reader::Ng(r) => r,
        };

        loop {
            match reader.next() {
                Ok((offset, block)) => {
                    let record = match block {
                        PcapBlockOwned::LegacyHeader(header) => {
                            let tsresol = match self.format {
                                Format::Legacy { nsec: true } => 9,
                                _ => 6,
                            };
                            self.interfaces
                                .push(Interface::new(header.network.0, self.forced, tsresol, 0));
                            Some(Record::Interface)
                        }
                        PcapBlockOwned::Legacy(b) => {
                            let ts = Timestamp {
                                sec: b.ts_sec,
                                nsec: match self.format {
                                    Format::Legacy { nsec: true } => b.ts_usec,
                                    _ => b.ts_usec.saturating_mul(1000),
                                },
                            };
                            packet(&self.interfaces, 0, ts, b.origlen, b.data)
                        }
                        PcapBlockOwned::NG(Block::SectionHeader(_)) => {
                            self.interfaces.clear();
                            None
                        }
                        PcapBlockOwned::NG(Block::InterfaceDescription(idb)) => {
                            self.interfaces.push(Interface::new(
                                idb.linktype.0,
                                self.forced,
                                idb.if_tsresol,
                                idb.if_tsoffset as i64,
                            ));
                            Some(Record::Interface)
                        }
                        PcapBlockOwned::NG(Block::EnhancedPacket(epb)) => {
                            let data = epb.data.get(..epb.caplen as usize).unwrap_or(epb.data);
                            match self.interfaces.get(epb.if_id as usize) {
                                Some(interface) => {
                                    let ts = interface.timestamp(epb.ts_high, epb.ts_low);
                                    packet(&self.interfaces, epb.if_id, ts, epb.origlen, data)
                                }
                                None => {
                                    debug!("Skip packet of undeclared interface {}", epb.if_id);
                                    None
                                }
                            }
                        }
                        PcapBlockOwned::NG(Block::SimplePacket(spb)) => {
                            let data = spb.data.get(..spb.origlen as usize).unwrap_or(spb.data);
                            packet(&self.interfaces, 0, Timestamp::default(), spb.origlen, data)
                        }
                        _ => None,
                    };
                    reader.consume(offset);
                    if record.is_some() {
                        return Ok(record);
                    }
                }
                Err(ParseError::Eof) => {
                    self.done = true;
                    return Ok(None);
                }
                Err(ParseError::UnexpectedEof) => {
                    warn!("Capture file ends with a truncated record");
                    self.truncated = true;
                    self.done = true;
                    return Ok(None);
                }
                Err(ParseError::Incomplete(_)) => {
                    reader
                        .refill()
                        .map_err(|e| PcapError::Malformed(e.to_string()))?;
                }
                Err(e) => {
                    self.done = true;
                    return Err(PcapError::Malformed(e.to_string()));
                }
            }
        }
    }
}

/// Owned packet of interface `if_id`, `None` when its link type cannot be dissected
fn packet(interfaces: &[Interface], if_id: u32, ts: Timestamp, orig_len: u32, data: &[u8]) -> Option<Record> {
    let interface = interfaces.get(if_id as usize)?;
    match interface.link_type {
        Some(link_type) => Some(Record::Packet(Packet::new(data.to_vec(), ts, orig_len, link_type))),
        None => {
            debug!(
                "Skip packet of interface {} with link type {}",
                if_id, interface.raw_link_type
            );
            None
        }
    }
}

fn header_error<I>(e: ParseError<I>) -> PcapError
where
    ParseError<I>: std::fmt::Display,
{
    match e {
        ParseError::Incomplete(_) | ParseError::UnexpectedEof => {
            PcapError::Malformed("truncated file header".to_string())
        }
        e => PcapError::Malformed(e.to_string()),
    }
}
