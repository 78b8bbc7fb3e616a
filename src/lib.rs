mod cli;
mod client;
mod cmd;
mod config;
mod error;
mod memory;

pub use cli::{render_table, Cli, Commands, KvCommand, KvGroup};
pub use client::{KeyValueRecord, KvClient, Reply, TcpClient};
pub use cmd::{Request, Response};
pub use config::{Backend, Config};
pub use error::{KvsError, Result};
pub use memory::MemoryClient;

#[macro_use]
extern crate log;
