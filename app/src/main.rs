#[macro_use]
extern crate clap;

use std::str::FromStr;
use std::sync::atomic::Ordering;

use anyhow::{anyhow, Result};
use crossbeam_channel::bounded;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use npl_api as api;

mod commands;
mod config;
mod output;
mod rx;
mod stats;
mod threadings;

use stats::{PktStat, RxStat};

/// Log to stderr, `RUST_LOG` overrides the level picked from the configuration
fn init_logging(cfg: &api::config::Config) {
    let level = config::log_level(cfg);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let root_cmd = commands::new_root_command();
    let matches = root_cmd.get_matches();
    let cfg = config::parse_args(&matches)?;
    init_logging(&cfg);
    debug!("{} {}, api {}", crate_name!(), crate_version!(), api::API_VERSION);

    signal_hook::flag::register(signal_hook::consts::SIGTERM, cfg.exit.clone())?;
    signal_hook::flag::register(signal_hook::consts::SIGINT, cfg.exit.clone())?;

    let link_type = config::link_type(&cfg)?;
    let filter = config::filter(&cfg)?;
    let format = output::Format::from_str(&cfg.output_format)
        .map_err(|_| anyhow!("Unknown output format {}", cfg.output_format))?;

    let files = rx::files::get_pcap_files(&cfg)?;
    if files.is_empty() {
        warn!("No pcap file found");
        return Ok(());
    }

    let (sender, receiver) = bounded(cfg.pkt_channel_size as usize);
    let rx_thread = rx::files::RxThread::new(cfg.exit.clone(), sender, files, link_type);
    let pkt_thread =
        threadings::PktThread::new(cfg.exit.clone(), receiver, cfg.snap_len, format, filter);

    let builder = std::thread::Builder::new().name(pkt_thread.name());
    let pkt_handle = builder.spawn(move || pkt_thread.spawn(std::io::stdout()))?;
    let builder = std::thread::Builder::new().name(rx_thread.name());
    let rx_handle = builder.spawn(move || rx_thread.spawn())?;

    let rx_stat = match rx_handle.join() {
        Ok(Ok(stat)) => stat,
        Ok(Err(e)) => {
            cfg.exit.store(true, Ordering::SeqCst);
            error!("{}", e);
            RxStat::default()
        }
        Err(e) => {
            cfg.exit.store(true, Ordering::SeqCst);
            error!("{:?}", e);
            RxStat::default()
        }
    };

    let pkt_stat = match pkt_handle.join() {
        Ok(Ok(stat)) => stat,
        Ok(Err(e)) => {
            error!("{}", e);
            PktStat::default()
        }
        Err(e) => {
            error!("{:?}", e);
            PktStat::default()
        }
    };

    info!(
        "{} files read, {} frames read, {} frames printed",
        rx_stat.files, rx_stat.received, pkt_stat.printed
    );
    if pkt_stat.unknown > 0 {
        info!("{} frames without any recognized layer", pkt_stat.unknown);
    }
    if rx_stat.truncated > 0 {
        warn!("{} files end with a truncated record", rx_stat.truncated);
    }
    if rx_stat.malformed > 0 {
        warn!("{} files abandoned at a corrupt block", rx_stat.malformed);
    }

    if rx_stat.files == 0 && rx_stat.failed > 0 {
        return Err(anyhow!("No capture file could be read"));
    }

    Ok(())
}
