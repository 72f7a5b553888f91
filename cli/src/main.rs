// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Command-line front end for the LPM trie: loads `(payload, CIDR)` pairs
//! from a file and/or the command line, then answers address lookups.

#![deny(clippy::all, clippy::pedantic)]

mod args;
mod config;

use crate::args::{CmdArgs, Parser};
use crate::config::load_entry_file;
use std::process::ExitCode;
use tracing::{error, info, warn};
use trie::trie::PrefixMap;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_level(true)
        .init();
}

fn main() -> ExitCode {
    let cmdargs = CmdArgs::parse();
    init_logging();

    // gather (payload, CIDR) pairs: file entries first, then --entry flags
    let mut pairs: Vec<(String, String)> = Vec::new();
    if let Some(path) = cmdargs.entry_file() {
        match load_entry_file(path) {
            Ok(file) => pairs.extend(file.entries.into_iter().map(|e| (e.payload, e.prefix))),
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        }
    }
    pairs.extend(
        cmdargs
            .entries()
            .map(|e| (e.payload.clone(), e.cidr.clone())),
    );

    let mut map: PrefixMap<String> = PrefixMap::new();
    match map.load(pairs.iter().map(|(payload, cidr)| (payload.clone(), cidr.as_str()))) {
        Ok(count) => info!("loaded {count} prefixes"),
        // each rejected entry was already reported by the loader
        Err(batch) => warn!("{batch}, loaded {} prefixes", batch.inserted),
    }

    if cmdargs.dump() {
        println!("{map}");
    }

    for addr in cmdargs.addresses() {
        match map.lookup(addr) {
            Some(payload) => println!("{addr} -> {payload}"),
            None => println!("{addr} -> no match"),
        }
    }
    ExitCode::SUCCESS
}
