use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use crossbeam_channel::Sender;
use path_absolutize::Absolutize;
use tracing::{debug, error, info};

use npl_api as api;
use npl_utils as utils;
use api::config::Config;
use utils::dissectors::LinkType;

use super::pcap::PcapFile;
use super::Packet;
use crate::stats::RxStat;

/// get pcap files according to command line arguments/configuration file
pub fn get_pcap_files(cfg: &Config) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !cfg.pcap_file.is_empty() {
        files.push(PathBuf::from(&cfg.pcap_file));
    } else if !cfg.pcap_dir.is_empty() {
        let path_buf = PathBuf::from(&cfg.pcap_dir);
        let pcap_dir = path_buf.absolutize()?;
        collect_pcap_files(&pcap_dir, cfg.recursive, &mut files)?;
        files.sort();
    }

    Ok(files)
}

fn collect_pcap_files(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in dir.read_dir()? {
        let path = entry?.path();
        if path.is_dir() {
            if recursive {
                collect_pcap_files(&path, recursive, files)?;
            }
            continue;
        }

        match path.extension() {
            Some(ext) if ext == "pcap" || ext == "pcapng" => files.push(path),
            _ => {} // if file is not pcap/pcapng, skip
        };
    }
    Ok(())
}

/// Reads capture files one after another and hands every record to the dissector thread
pub struct RxThread {
    exit: Arc<AtomicBool>,
    sender: Sender<Box<Packet>>,
    files: Vec<PathBuf>,
    /// Overrides the link type of each capture file when set
    link_type: Option<LinkType>,
}

impl RxThread {
    pub fn new(
        exit: Arc<AtomicBool>,
        sender: Sender<Box<Packet>>,
        files: Vec<PathBuf>,
        link_type: Option<LinkType>,
    ) -> Self {
        RxThread {
            exit,
            sender,
            files,
            link_type,
        }
    }

    pub fn spawn(&self) -> Result<RxStat> {
        let mut stat = RxStat::default();

        info!("{} started", self.name());

        'files: for file in &self.files {
            if self.exit.load(Ordering::Relaxed) {
                break;
            }

            let mut cap = match PcapFile::open(file, self.link_type) {
                Ok(cap) => cap,
                Err(e) => {
                    error!("Failed to read {}: {}", file.display(), e);
                    stat.failed += 1;
                    continue;
                }
            };
            debug!(
                "Reading {}, format {:?}, link type {:?}",
                file.display(),
                cap.format(),
                cap.link_type()
            );
            stat.files += 1;

            while !self.exit.load(Ordering::Relaxed) {
                let pkt = match cap.next_packet() {
                    Ok(Some(pkt)) => pkt,
                    Ok(None) => break,
                    Err(e) => {
                        error!("Stop reading {}: {}", file.display(), e);
                        stat.malformed += 1;
                        break;
                    }
                };
                stat.received += 1;

                if self.sender.send(Box::new(pkt)).is_err() {
                    info!("{} channel is closed, exit", self.name());
                    break 'files;
                }
            }

            if cap.truncated() {
                stat.truncated += 1;
            }
        }

        info!("{} exit", self.name());

        Ok(stat)
    }

    pub fn name(&self) -> String {
        String::from("npl-replay")
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crossbeam_channel::bounded;

    use super::*;
    use crate::rx::pcap::test::{pcap_file, pcapng_file};
    use crate::rx::pcap::MAGIC_USEC;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("npl-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_get_pcap_files() {
        let dir = temp_dir("files");
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("b.pcap"), b"").unwrap();
        fs::write(dir.join("a.pcap"), b"").unwrap();
        fs::write(dir.join("e.pcapng"), b"").unwrap();
        fs::write(dir.join("c.txt"), b"").unwrap();
        fs::write(dir.join("sub").join("d.pcap"), b"").unwrap();

        let mut cfg = Config::default();
        cfg.pcap_dir = dir.to_string_lossy().to_string();
        let files = get_pcap_files(&cfg).unwrap();
        assert_eq!(
            files,
            vec![dir.join("a.pcap"), dir.join("b.pcap"), dir.join("e.pcapng")]
        );

        cfg.recursive = true;
        let files = get_pcap_files(&cfg).unwrap();
        assert_eq!(
            files,
            vec![
                dir.join("a.pcap"),
                dir.join("b.pcap"),
                dir.join("e.pcapng"),
                dir.join("sub").join("d.pcap")
            ]
        );

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_single_file() {
        let mut cfg = Config::default();
        cfg.pcap_file = "x.pcap".to_string();
        assert_eq!(get_pcap_files(&cfg).unwrap(), vec![PathBuf::from("x.pcap")]);
    }

    #[test]
    fn test_rx_thread() {
        let dir = temp_dir("rx");
        let frame = [0u8; 14];
        fs::write(
            dir.join("a.pcap"),
            pcap_file(MAGIC_USEC, false, 1, &[(1, 0, &frame[..]), (2, 0, &frame[..])]),
        )
        .unwrap();
        fs::write(dir.join("b.pcapng"), pcapng_file(1, None, &[(0, &frame[..])])).unwrap();
        fs::write(dir.join("bad.pcap"), b"not a capture file").unwrap();

        let (sender, receiver) = bounded(8);
        let files = vec![
            dir.join("a.pcap"),
            dir.join("b.pcapng"),
            dir.join("bad.pcap"),
            dir.join("missing.pcap"),
        ];
        let thread = RxThread::new(Arc::new(AtomicBool::new(false)), sender, files, None);
        let stat = thread.spawn().unwrap();
        drop(thread);

        assert_eq!(stat.files, 2);
        assert_eq!(stat.failed, 2);
        assert_eq!(stat.received, 3);
        assert_eq!(stat.malformed, 0);
        assert_eq!(receiver.iter().count(), 3);

        fs::remove_dir_all(&dir).unwrap();
    }
}
