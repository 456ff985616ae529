use std::io::{BufWriter, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use crossbeam_channel::Receiver;
use tracing::info;

use npl_api as api;
use npl_utils as utils;
use api::packet::{Packet as PacketTrait, Protocol};
use utils::dissectors::ProtocolDissector;

use crate::output::{self, Format};
use crate::rx::Packet;
use crate::stats::PktStat;

/// Dissects every received packet and writes the ones passing the protocol filter
pub struct PktThread {
    exit: Arc<AtomicBool>,
    receiver: Receiver<Box<Packet>>,
    snap_len: u16,
    format: Format,
    filter: Vec<Protocol>,
}

impl PktThread {
    pub fn new(
        exit: Arc<AtomicBool>,
        receiver: Receiver<Box<Packet>>,
        snap_len: u16,
        format: Format,
        filter: Vec<Protocol>,
    ) -> Self {
        Self {
            exit,
            receiver,
            snap_len,
            format,
            filter,
        }
    }

    pub fn name(&self) -> String {
        String::from("npl-pkt")
    }

    /// Whether `pkt` carries every protocol of the filter
    #[inline]
    fn matches(&self, pkt: &Packet) -> bool {
        self.filter.iter().all(|protocol| pkt.has(*protocol) > 0)
    }

    pub fn spawn<W: Write>(&self, out: W) -> Result<PktStat> {
        let mut out = BufWriter::new(out);
        let mut stat = PktStat::default();

        info!("{} started", self.name());

        while !self.exit.load(Ordering::Relaxed) {
            let mut pkt = match self.receiver.recv() {
                Ok(pkt) => pkt,
                // all senders are gone, nothing left to read
                Err(_) => break,
            };

            let dissector =
                ProtocolDissector::from_link_type(pkt.link_type()).with_snap_len(self.snap_len);
            dissector.parse_pkt(pkt.as_mut());
            stat.dissected += 1;
            if pkt.layers().is_empty() {
                stat.unknown += 1;
            }

            if !self.matches(&pkt) {
                continue;
            }

            output::write_pkt(&mut out, self.format, stat.dissected, &pkt)?;
            stat.printed += 1;
        }

        out.flush()?;
        info!("{} exit", self.name());

        Ok(stat)
    }
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::bounded;

    use super::*;
    use crate::rx::Timestamp;
    use utils::dissectors::LinkType;

    const ETH_ARP: [u8; 22] = [
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xcc, 0x04, 0x0d, 0x5c, 0xf0, 0x00, 0x08, 0x06, 0x00,
        0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x02,
    ];

    fn run(filter: Vec<Protocol>, frames: &[&[u8]]) -> (PktStat, String) {
        let (sender, receiver) = bounded(frames.len() + 1);
        for (i, frame) in frames.iter().enumerate() {
            let ts = Timestamp {
                sec: i as u32,
                nsec: 0,
            };
            let pkt = Packet::new(frame.to_vec(), ts, frame.len() as u32, LinkType::ETHERNET);
            sender.send(Box::new(pkt)).unwrap();
        }
        drop(sender);

        let thread = PktThread::new(
            Arc::new(AtomicBool::new(false)),
            receiver,
            u16::MAX,
            Format::Summary,
            filter,
        );
        let mut out = vec![];
        let stat = thread.spawn(&mut out).unwrap();
        (stat, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_all_printed() {
        let (stat, out) = run(vec![], &[&ETH_ARP[..], &ETH_ARP[..4]]);
        assert_eq!(stat.dissected, 2);
        assert_eq!(stat.unknown, 1);
        assert_eq!(stat.printed, 2);
        let lines: Vec<_> = out.lines().collect();
        assert!(lines[0].starts_with("#1 "));
        assert!(lines[0].ends_with(" 22/22 Ether--ARP"));
        assert!(lines[1].starts_with("#2 "));
    }

    #[test]
    fn test_filter() {
        let (stat, out) = run(vec![Protocol::ARP], &[&ETH_ARP[..14], &ETH_ARP[..]]);
        assert_eq!(stat.dissected, 2);
        assert_eq!(stat.printed, 1);
        assert!(out.starts_with("#2 "));

        let (stat, out) = run(vec![Protocol::ARP, Protocol::TCP], &[&ETH_ARP[..]]);
        assert_eq!(stat.printed, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_exit_flag() {
        let (sender, receiver) = bounded(1);
        let thread = PktThread::new(
            Arc::new(AtomicBool::new(true)),
            receiver,
            u16::MAX,
            Format::Json,
            vec![],
        );
        let stat = thread.spawn(std::io::sink()).unwrap();
        assert_eq!(stat.dissected, 0);
        drop(sender);
    }
}
