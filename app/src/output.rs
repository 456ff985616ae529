use std::io::Write;
use std::net::Ipv4Addr;

use anyhow::Result;
use serde::Serialize;
use strum::EnumString;

use npl_api as api;
use api::headers::{Arp, Header, HeaderView, Icmp, View};
use api::packet::{Layers, Packet as PacketTrait};

use crate::rx::{Packet, Timestamp};

/// How frames are printed
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Format {
    /// One line per frame
    Summary,
    /// Summary line plus one line per protocol layer
    Detail,
    /// One JSON object per line
    Json,
}

#[derive(Serialize)]
struct JsonFrame<'a> {
    index: u64,
    timestamp: String,
    caplen: u32,
    len: u32,
    layers: &'a Layers,
}

pub fn write_pkt<W: Write>(out: &mut W, format: Format, index: u64, pkt: &Packet) -> Result<()> {
    match format {
        Format::Summary => writeln!(out, "{}", summary_line(index, pkt))?,
        Format::Detail => {
            writeln!(out, "{}", summary_line(index, pkt))?;
            for line in detail_lines(pkt) {
                writeln!(out, "    {}", line)?;
            }
        }
        Format::Json => {
            let frame = JsonFrame {
                index,
                timestamp: timestamp(pkt.ts()),
                caplen: pkt.caplen(),
                len: pkt.orig_len(),
                layers: pkt.layers(),
            };
            serde_json::to_writer(&mut *out, &frame)?;
            writeln!(out)?;
        }
    };
    Ok(())
}

fn timestamp(ts: Timestamp) -> String {
    match ts.to_datetime() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
        None => format!("{}.{:09}", ts.sec, ts.nsec),
    }
}

fn summary_line(index: u64, pkt: &Packet) -> String {
    format!(
        "#{} {} {}/{} {}",
        index,
        timestamp(pkt.ts()),
        pkt.caplen(),
        pkt.orig_len(),
        pkt.summary()
    )
}

fn detail_lines(pkt: &Packet) -> Vec<String> {
    let data = pkt.data();
    pkt.dump()
        .iter()
        .map(|layer| {
            let buf = View::new(data).tail(layer.offset as usize);
            match Header::new(layer.protocol, buf.as_bytes()) {
                Ok(header) => format!("{:>4} {}", layer.offset, describe(&header)),
                Err(e) => format!("{:>4} {}", layer.offset, e),
            }
        })
        .collect()
}

fn describe(header: &Header<'_>) -> String {
    match header {
        Header::Ethernet(eth) => format!(
            "Ether {} > {} type {:#06x}",
            eth.src_mac(),
            eth.dst_mac(),
            eth.ethertype()
        ),
        Header::Vlan(vlan) => format!(
            "802.1q {} > {} vlan {} prio {} dei {} type {:#06x}",
            vlan.src_mac(),
            vlan.dst_mac(),
            vlan.vlan_id(),
            vlan.priority(),
            vlan.dei() as u8,
            vlan.ethertype()
        ),
        Header::Arp(arp) => describe_arp(arp),
        Header::Ipv4(ip) => format!(
            "IPv4 {} > {} proto {} ttl {} hlen {} len {} options {}",
            ip.src_addr(),
            ip.dst_addr(),
            ip.protocol(),
            ip.ttl(),
            ip.header_len(),
            ip.total_len(),
            ip.options().len()
        ),
        Header::Icmp(icmp) => describe_icmp(icmp),
        Header::Udp(udp) => format!(
            "UDP {} > {} len {}",
            udp.src_port(),
            udp.dst_port(),
            udp.length()
        ),
        Header::Tcp(tcp) => format!(
            "TCP {} > {} flags [{:?}] seq {} ack {} hlen {} options {}",
            tcp.src_port(),
            tcp.dst_port(),
            tcp.flags(),
            tcp.seq(),
            tcp.ack_seq(),
            tcp.header_len(),
            tcp.options().len()
        ),
    }
}

fn describe_icmp(icmp: &Icmp<'_>) -> String {
    let name = match icmp.icmp_type() {
        Icmp::ECHO_REPLY => "echo reply",
        Icmp::DEST_UNREACHABLE => "destination unreachable",
        Icmp::ECHO_REQUEST => "echo request",
        Icmp::TIME_EXCEEDED => "time exceeded",
        t => return format!("ICMP type {} code {}", t, icmp.code()),
    };
    format!("ICMP {} code {}", name, icmp.code())
}

fn describe_arp(arp: &Arp<'_>) -> String {
    let op = match arp.operation() {
        Arp::REQUEST => "request".to_string(),
        Arp::REPLY => "reply".to_string(),
        op => op.to_string(),
    };
    match (arp.sender_protocol_addr(), arp.target_protocol_addr()) {
        (Some(spa), Some(tpa)) if spa.len() == 4 && tpa.len() == 4 => format!(
            "ARP {} {} > {}",
            op,
            Ipv4Addr::new(spa[0], spa[1], spa[2], spa[3]),
            Ipv4Addr::new(tpa[0], tpa[1], tpa[2], tpa[3])
        ),
        _ => format!(
            "ARP {} hw {} proto {:#06x}",
            op,
            arp.hardware_type(),
            arp.protocol_type()
        ),
    }
}
