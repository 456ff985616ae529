/// Capture file reading statistic information
#[derive(Clone, Copy, Debug, Default)]
pub struct RxStat {
    /// Capture files read
    pub files: u64,
    /// Capture files that could not be opened
    pub failed: u64,
    /// Capture files ending with an incomplete record
    pub truncated: u64,
    /// Capture files abandoned at a corrupt block
    pub malformed: u64,
    /// Total received packets
    pub received: u64,
}

/// Dissection statistic information
#[derive(Clone, Copy, Debug, Default)]
pub struct PktStat {
    /// Total dissected packets
    pub dissected: u64,
    /// Packets with no recognized protocol layer
    pub unknown: u64,
    /// Packets passing the protocol filter and written out
    pub printed: u64,
}
