use crate::client::{KeyValueRecord, KvClient, Reply, TcpClient};
use crate::config::{Backend, Config};
use crate::error::KvsError;
use crate::Result;
use anyhow::Context;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use colored::Colorize;
use itertools::Itertools;
use serde_json::Value;
use std::fs::File;
use std::ffi::OsString;
use std::io::{self, BufReader, Write};
use std::iter;
use std::path::{Path, PathBuf};

const NAME_HEADER: &str = "NAME";
const VALUE_HEADER: &str = "VALUE";

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(flatten)]
    config: Config,
    #[clap(subcommand)]
    command: Commands,
}

impl Cli {
    /// Applies the `kv` backend check to arguments clap rejected, so an
    /// unsupported backend is reported ahead of subcommand argument errors.
    pub fn check_backend<I, T>(args: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = match Cli::command().ignore_errors(true).try_get_matches_from(args) {
            Ok(matches) => matches,
            Err(_) => return Ok(()),
        };
        if matches.subcommand_name() != Some("kv") {
            return Ok(());
        }
        match Config::from_arg_matches(&matches) {
            Ok(config) => KvGroup::new(&config).map(|_| ()),
            Err(_) => Ok(()),
        }
    }

    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Kv { command } => {
                let group = KvGroup::new(&self.config)?;
                let mut client = TcpClient::new(self.config.addr);
                let stdout = io::stdout();
                let mut out = stdout.lock();
                group.run(command, &mut client, &mut out)
            }
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage key value pairs stored in the cloud backend
    Kv {
        #[clap(subcommand)]
        command: KvCommand,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum KvCommand {
    /// Set a key value pair, overriding existing values if key exists
    Set { key: String, value: String },
    /// Get the value associated with a key
    Get { key: String },
    /// Delete a key value pair
    Delete { key: String },
    /// List key value pairs
    List,
    /// Set key value pairs from a json file
    ImportJson { path: PathBuf },
}

/// Dispatches `kv` subcommands to a client, one call per command.
#[derive(Debug)]
pub struct KvGroup {
    backend: Backend,
}

impl KvGroup {
    /// Fails with a usage error when the backend has no key value store.
    pub fn new(config: &Config) -> Result<Self> {
        if config.backend == Backend::Server {
            return Err(KvsError::UnsupportedBackend.into());
        }
        Ok(Self {
            backend: config.backend,
        })
    }

    pub fn run<C: KvClient, W: Write>(
        &self,
        command: KvCommand,
        client: &mut C,
        out: &mut W,
    ) -> Result<()> {
        debug!("backend: {}, command: {:?}", self.backend, command);
        match command {
            KvCommand::Set { key, value } => self.set(client, out, key, value),
            KvCommand::Get { key } => self.get(client, out, &key),
            KvCommand::Delete { key } => self.delete(client, out, &key),
            KvCommand::List => self.list(client, out),
            KvCommand::ImportJson { path } => self.import_json(client, out, &path),
        }
    }

    pub fn set<C: KvClient, W: Write>(
        &self,
        client: &mut C,
        out: &mut W,
        key: String,
        value: String,
    ) -> Result<()> {
        match client.set_key_value_pairs(vec![key], vec![value])? {
            Reply::Found(()) => writeln!(out, "{}", "Key set successfully".green())?,
            other => {
                log_soft_failure(&other);
                writeln!(
                    out,
                    "{}",
                    "An error occurred setting the key value pair".red()
                )?
            }
        }
        Ok(())
    }

    pub fn get<C: KvClient, W: Write>(&self, client: &mut C, out: &mut W, key: &str) -> Result<()> {
        match client.get_key_value(key)? {
            Reply::Found(value) => writeln!(
                out,
                "{}",
                format!("Key {} has value {}", key, value).green()
            )?,
            other => {
                log_soft_failure(&other);
                writeln!(out, "{}", "An error occurred getting the key".red())?
            }
        }
        Ok(())
    }

    pub fn delete<C: KvClient, W: Write>(
        &self,
        client: &mut C,
        out: &mut W,
        key: &str,
    ) -> Result<()> {
        match client.delete_key_value(key)? {
            Reply::Found(()) => {
                writeln!(out, "{}", format!("Key {} has been deleted", key).green())?
            }
            other => {
                log_soft_failure(&other);
                writeln!(out, "{}", "An error occurred deleting the key".red())?
            }
        }
        Ok(())
    }

    pub fn list<C: KvClient, W: Write>(&self, client: &mut C, out: &mut W) -> Result<()> {
        let records = client.list_key_values()?;
        writeln!(out, "{}", render_table(&records))?;
        Ok(())
    }

    pub fn import_json<C: KvClient, W: Write>(
        &self,
        client: &mut C,
        out: &mut W,
        path: &Path,
    ) -> Result<()> {
        let file =
            File::open(path).with_context(|| format!("could not open {}", path.display()))?;
        let document: Value = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("could not parse {}", path.display()))?;
        let mapping = match document {
            Value::Object(mapping) => mapping,
            _ => return Err(KvsError::NotAMapping.into()),
        };

        let summary = client.set_key_value_pairs_from_nested_dict(mapping)?;
        writeln!(out, "{}", summary)?;
        Ok(())
    }
}

fn log_soft_failure<T>(reply: &Reply<T>) {
    match reply {
        Reply::Failed(detail) => warn!("service reported: {}", detail),
        Reply::NotFound => debug!("key not found"),
        Reply::Found(_) => {}
    }
}

/// Renders records as a plain left-aligned two column table with headers.
///
/// Multi-line cells continue on following lines within their own column.
pub fn render_table(records: &[KeyValueRecord]) -> String {
    let rows: Vec<(&str, &str)> = iter::once((NAME_HEADER, VALUE_HEADER))
        .chain(records.iter().map(|r| (r.name.as_str(), r.value.as_str())))
        .collect();
    let width = rows
        .iter()
        .flat_map(|(name, _)| cell_lines(name))
        .map(|line| line.chars().count())
        .max()
        .unwrap_or_default();

    rows.iter()
        .flat_map(|(name, value)| cell_lines(name).zip_longest(cell_lines(value)))
        .map(|pair| {
            let (name, value) = pair.or("", "");
            format!("{:<width$}  {}", name, value, width = width)
                .trim_end()
                .to_string()
        })
        .join("\n")
}

fn cell_lines(cell: &str) -> impl Iterator<Item = &str> {
    cell.split('\n').map(|line| line.trim_end_matches('\r'))
}
