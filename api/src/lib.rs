extern crate serde;

pub static API_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod headers;
pub mod packet;
