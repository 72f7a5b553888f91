// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Command-line argument handling for the `iplpm` binary.

pub use clap::Parser;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A single `CIDR=PAYLOAD` association given on the command line.
///
/// The CIDR itself is validated at insertion time, together with the file
/// entries, so that a malformed prefix is reported and skipped instead of
/// failing argument parsing.
#[derive(Debug, Clone)]
pub struct EntryArg {
    pub cidr: String,
    pub payload: String,
}

impl FromStr for EntryArg {
    type Err = String;
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.split_once('=') {
            Some((cidr, payload)) if !cidr.is_empty() && !payload.is_empty() => Ok(EntryArg {
                cidr: cidr.to_string(),
                payload: payload.to_string(),
            }),
            _ => Err(format!("expected CIDR=PAYLOAD, got '{input}'")),
        }
    }
}

#[derive(Parser)]
#[command(name = "iplpm")]
#[command(version = "0.1.0")]
#[command(about = "Longest-prefix-match lookups over IP prefixes", long_about = None)]
pub struct CmdArgs {
    /// YAML file with prefix entries to load.
    #[arg(long, value_name = "FILE")]
    entry_file: Option<PathBuf>,

    #[arg(
        long,
        value_name = "CIDR=PAYLOAD",
        value_parser = EntryArg::from_str,
        value_delimiter = ',',
        help = "Prefix association in the format CIDR=PAYLOAD. Note that multiple associations can be specified, comma-separated.
E.g. --entry 10.0.0.0/8=rfc1918 --entry 2001:db8::/32=doc,198.51.100.0/24=doc"
    )]
    entry: Vec<EntryArg>,

    /// Print the loaded tries before answering lookups.
    #[arg(long, default_value_t = false)]
    dump: bool,

    /// Addresses to look up.
    #[arg(value_name = "ADDRESS")]
    address: Vec<IpAddr>,
}

impl CmdArgs {
    pub fn entry_file(&self) -> Option<&Path> {
        self.entry_file.as_deref()
    }

    pub fn entries(&self) -> impl Iterator<Item = &EntryArg> {
        self.entry.iter()
    }

    pub fn dump(&self) -> bool {
        self.dump
    }

    pub fn addresses(&self) -> impl Iterator<Item = &IpAddr> {
        self.address.iter()
    }
}
