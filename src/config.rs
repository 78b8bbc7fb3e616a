use crate::error::KvsError;
use clap::Args;
use std::fmt::Display;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Cloud,
    Server,
}

impl Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Backend::Cloud => "cloud",
            Backend::Server => "server",
        })
    }
}

impl FromStr for Backend {
    type Err = KvsError;

    fn from_str(s: &str) -> std::result::Result<Backend, KvsError> {
        match s.to_lowercase().as_str() {
            "cloud" => Ok(Self::Cloud),
            "server" => Ok(Self::Server),
            _ => Err(KvsError::Parse(s.to_string())),
        }
    }
}

/// Process-wide settings, resolved once from flags and environment.
#[derive(Args, Debug, Clone)]
pub struct Config {
    #[clap(
        long,
        global = true,
        env = "CLOUDKV_BACKEND",
        default_value_t = Backend::Cloud,
        value_name = "BACKEND",
    )]
    pub backend: Backend,
    #[clap(
        action,
        long,
        global = true,
        env = "CLOUDKV_ADDR",
        default_value_t = SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), 4000),
        value_parser,
        value_name = "IP-PORT",
    )]
    pub addr: SocketAddrV4,
}

impl Config {
    pub fn new(backend: Backend, addr: SocketAddrV4) -> Self {
        Self { backend, addr }
    }
}
