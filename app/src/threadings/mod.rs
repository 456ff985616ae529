mod pkt;

pub use pkt::PktThread;
