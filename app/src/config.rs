use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use yaml_rust::YamlLoader;

use npl_api as api;
use npl_utils as utils;
use api::config::Config;
use api::packet::Protocol;
use utils::dissectors::LinkType;

use super::commands::CliArg;

const DEFAULT_LINK_TYPE: &str = "auto";
const DEFAULT_SNAP_LEN: i64 = u16::MAX as i64;
const DEFAULT_OUTPUT_FORMAT: &str = "summary";
const DEFAULT_PKT_CHANNEL_SIZE: i64 = 10000;

/// Parse command line arguments and set configuration
pub fn parse_args(matches: &clap::ArgMatches) -> Result<Config> {
    let mut config = Config {
        link_type: DEFAULT_LINK_TYPE.to_string(),
        snap_len: DEFAULT_SNAP_LEN as u16,
        output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
        pkt_channel_size: DEFAULT_PKT_CHANNEL_SIZE as u32,
        ..Default::default()
    };

    if let Some(config_file) = matches.value_of(CliArg::Config.as_str()) {
        config.fpath = config_file.to_string();
        parse_config_file(config_file, &mut config)?;
    }

    set_config_by_cli_args(&mut config, matches);

    if config.pcap_file.is_empty() && config.pcap_dir.is_empty() {
        return Err(anyhow!("No capture file given, use -r FILE or -R DIR"));
    }

    Ok(config)
}

fn parse_config_file(config_file: &str, config: &mut Config) -> Result<()> {
    let cfg_path = Path::new(config_file);
    if !cfg_path.exists() {
        return Err(anyhow!("Config file \"{}\" does not exist", config_file));
    }

    let mut s = String::new();
    File::open(cfg_path)?.read_to_string(&mut s)?;
    load_config_str(&s, config)
}

fn load_config_str(s: &str, config: &mut Config) -> Result<()> {
    let docs = YamlLoader::load_from_str(s)?;
    let doc = docs
        .get(0)
        .ok_or_else(|| anyhow!("Config file \"{}\" is empty", config.fpath))?;
    config.doc = api::config::Yaml(doc.clone());

    config.link_type = config.get_str("link.type", DEFAULT_LINK_TYPE);
    config.snap_len = config.get_integer("snap.length", DEFAULT_SNAP_LEN, 64, u16::MAX as i64) as u16;
    config.output_format = config.get_str("output.format", DEFAULT_OUTPUT_FORMAT);
    config.filter = config.get_str_arr("filter.protocols");
    config.pkt_channel_size =
        config.get_integer("channel.pkt.size", DEFAULT_PKT_CHANNEL_SIZE, 1, 1000000) as u32;
    config.recursive = config.get_boolean("pcap.recursive", false);
    config.quiet = config.get_boolean("log.quiet", false);
    config.verbose_mode = config.get_boolean("log.verbose", false);

    Ok(())
}

/// Use command arguments overrides config file settings
fn set_config_by_cli_args(config: &mut Config, matches: &clap::ArgMatches) {
    if matches.is_present(CliArg::Quiet.as_str()) {
        config.quiet = true;
        config.verbose_mode = false;
    }
    if matches.is_present(CliArg::Recursive.as_str()) {
        config.recursive = true;
    }
    if matches.is_present(CliArg::Verbose.as_str()) {
        config.verbose_mode = true;
        config.quiet = false;
    }

    if let Some(pcap_file) = matches.value_of(CliArg::PcapFile.as_str()) {
        config.pcap_file = String::from(pcap_file);
    }

    if let Some(pcap_dir) = matches.value_of(CliArg::PcapDir.as_str()) {
        config.pcap_dir = String::from(pcap_dir);
    }

    if let Some(format) = matches.value_of(CliArg::Format.as_str()) {
        config.output_format = String::from(format);
    }

    if let Some(link_type) = matches.value_of(CliArg::LinkType.as_str()) {
        config.link_type = String::from(link_type);
    }

    if let Some(filter) = matches.values_of(CliArg::Filter.as_str()) {
        config.filter = filter.map(String::from).collect();
    }
}

/// Default log level, `quiet` wins over `verbose_mode` when a config file sets both
pub fn log_level(cfg: &Config) -> &'static str {
    if cfg.quiet {
        "warn"
    } else if cfg.verbose_mode {
        "debug"
    } else {
        "info"
    }
}

/// Link type forced by configuration, `None` to use the one of each capture file
pub fn link_type(cfg: &Config) -> Result<Option<LinkType>> {
    match cfg.link_type.to_ascii_lowercase().as_str() {
        "auto" => Ok(None),
        "ethernet" => Ok(Some(LinkType::ETHERNET)),
        "raw" => Ok(Some(LinkType::RAW)),
        "ipv4" => Ok(Some(LinkType::IPV4)),
        other => Err(anyhow!("Unknown link type {}", other)),
    }
}

/// Protocols every printed frame must carry
pub fn filter(cfg: &Config) -> Result<Vec<Protocol>> {
    let mut protocols = vec![];
    for name in &cfg.filter {
        match Protocol::from_str(name) {
            Ok(protocol) => protocols.push(protocol),
            Err(_) => return Err(anyhow!("Unknown protocol {} in filter", name)),
        }
    }
    Ok(protocols)
}
