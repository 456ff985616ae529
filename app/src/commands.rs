use clap::{App, Arg};
use strum::IntoStaticStr;

/// Avaliable command line arguments
#[derive(Clone, Copy, Debug, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum CliArg {
    Config,
    Filter,
    Format,
    LinkType,
    PcapDir,
    PcapFile,
    Quiet,
    Recursive,
    Verbose,
}

impl CliArg {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Construct a new clap root command
pub fn new_root_command<'a>() -> clap::App<'a, 'static> {
    App::new(crate_name!())
        .version(crate_version!())
        .about("Print the protocol layers of every frame in offline capture files")
        .args(&[
            Arg::with_name(CliArg::Config.as_str())
                .short("c")
                .value_name("FILE")
                .help("Use a specific config file")
                .takes_value(true),
            Arg::with_name(CliArg::Filter.as_str())
                .short("f")
                .long("filter")
                .value_name("PROTOCOL")
                .help("Only print frames carrying every listed protocol, e.g. -f ipv4 tcp")
                .takes_value(true)
                .multiple(true),
            Arg::with_name(CliArg::Format.as_str())
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .takes_value(true)
                .possible_values(&["summary", "detail", "json"]),
            Arg::with_name(CliArg::LinkType.as_str())
                .long("link-type")
                .value_name("TYPE")
                .help("Link type of the frames, auto takes it from the capture file header")
                .takes_value(true)
                .possible_values(&["auto", "ethernet", "raw", "ipv4"]),
            Arg::with_name(CliArg::PcapDir.as_str())
                .short("R")
                .value_name("PCAP-DIR")
                .help("Offline pcap directory, all *.pcap and *.pcapng files will be processed")
                .takes_value(true)
                .conflicts_with(CliArg::PcapFile.as_str()),
            Arg::with_name(CliArg::PcapFile.as_str())
                .short("r")
                .value_name("PCAP-FILE")
                .help("Offline pcap file")
                .takes_value(true)
                .conflicts_with(CliArg::PcapDir.as_str()),
            Arg::with_name(CliArg::Quiet.as_str())
                .short("q")
                .long("quiet")
                .help("Turn off info level logging"),
            Arg::with_name(CliArg::Recursive.as_str())
                .long("recursive")
                .help("In offline pcap directory mode, recurse sub directories"),
            Arg::with_name(CliArg::Verbose.as_str())
                .short("v")
                .long("verbose")
                .help("Turn on all debugging"),
        ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_names() {
        assert_eq!(CliArg::PcapFile.as_str(), "pcap-file");
        assert_eq!(CliArg::LinkType.as_str(), "link-type");
        assert_eq!(CliArg::Quiet.as_str(), "quiet");
    }

    #[test]
    fn test_parse() {
        let matches = new_root_command()
            .get_matches_from_safe(vec!["npl", "-r", "a.pcap", "-f", "ipv4", "tcp", "--format", "json"])
            .unwrap();
        assert_eq!(matches.value_of(CliArg::PcapFile.as_str()), Some("a.pcap"));
        let filter: Vec<_> = matches.values_of(CliArg::Filter.as_str()).unwrap().collect();
        assert_eq!(filter, vec!["ipv4", "tcp"]);
        assert_eq!(matches.value_of(CliArg::Format.as_str()), Some("json"));
    }

    #[test]
    fn test_err_file_and_dir() {
        let result = new_root_command().get_matches_from_safe(vec!["npl", "-r", "a.pcap", "-R", "."]);
        assert!(result.is_err());
    }
}
