// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! An address-family segregating wrapper around [`PrefixTrie`], with batch
//! loading from CIDR strings.

use crate::prefix::{Prefix, PrefixError};
use crate::trie::PrefixTrie;
use std::fmt::Display;
use std::net::IpAddr;
use thiserror::Error;
use tracing::warn;

/// Error type for [`PrefixMap`] operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrieError {
    #[error("invalid prefix '{cidr}': {source}")]
    InvalidPrefix { cidr: String, source: PrefixError },
}

/// The outcome of a batch insertion where at least one entry was rejected.
/// The well-formed entries have been inserted regardless.
#[derive(Debug, Error)]
#[error("rejected {} of {} entries", .errors.len(), .errors.len() + .inserted)]
pub struct BatchError {
    /// Number of entries that were inserted.
    pub inserted: usize,
    /// One error per rejected entry, in input order.
    pub errors: Vec<TrieError>,
}

/// A map from IP prefixes to payloads of type `T`, answering
/// longest-prefix-match queries for addresses of either family.
///
/// Internally it relies on two tries, one for IPv4 and one for IPv6, so a
/// query can never wander into prefixes of the other family.
#[derive(Debug, Clone)]
pub struct PrefixMap<T> {
    trie_ipv4: PrefixTrie<T>,
    trie_ipv6: PrefixTrie<T>,
}

impl<T> Default for PrefixMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PrefixMap<T> {
    /// Creates a new, empty [`PrefixMap`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            trie_ipv4: PrefixTrie::new(),
            trie_ipv6: PrefixTrie::new(),
        }
    }

    /// Tell whether neither family holds any payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trie_ipv4.is_empty() && self.trie_ipv6.is_empty()
    }

    /// Looks up the payload of the most specific prefix covering `addr` in
    /// the trie of the address's family.
    #[must_use]
    pub fn lookup(&self, addr: &IpAddr) -> Option<&T> {
        match addr {
            IpAddr::V4(_) => self.trie_ipv4.lookup(addr),
            IpAddr::V6(_) => self.trie_ipv6.lookup(addr),
        }
    }
}

impl<T: Clone + PartialEq> PrefixMap<T> {
    /// Inserts a prefix and its associated payload into the trie of the
    /// prefix's family.
    pub fn insert(&mut self, prefix: &Prefix, payload: T) {
        match prefix {
            Prefix::IPV4(_) => self.trie_ipv4.insert(prefix, payload),
            Prefix::IPV6(_) => self.trie_ipv6.insert(prefix, payload),
        }
    }

    /// Inserts a batch of `(payload, CIDR-string)` pairs.
    ///
    /// A malformed CIDR is skipped: the remaining entries are still
    /// inserted, and every rejection is logged and collected.
    ///
    /// # Errors
    ///
    /// Returns a [`BatchError`] carrying one [`TrieError`] per rejected
    /// entry, along with the number of entries that were inserted anyway.
    pub fn load<'a, I>(&mut self, entries: I) -> Result<usize, BatchError>
    where
        I: IntoIterator<Item = (T, &'a str)>,
    {
        let mut inserted = 0;
        let mut errors = Vec::new();
        for (payload, cidr) in entries {
            match cidr.parse::<Prefix>() {
                Ok(prefix) => {
                    self.insert(&prefix, payload);
                    inserted += 1;
                }
                Err(source) => {
                    warn!("skipping prefix '{cidr}': {source}");
                    errors.push(TrieError::InvalidPrefix {
                        cidr: cidr.to_string(),
                        source,
                    });
                }
            }
        }
        if errors.is_empty() {
            Ok(inserted)
        } else {
            Err(BatchError { inserted, errors })
        }
    }

    /// Associates one payload with every prefix in `cidrs`.
    ///
    /// # Errors
    ///
    /// Same contract as [`PrefixMap::load`]: malformed CIDRs are skipped and
    /// reported, well-formed ones are inserted.
    pub fn insert_cidrs<'a>(
        &mut self,
        payload: T,
        cidrs: impl IntoIterator<Item = &'a str>,
    ) -> Result<usize, BatchError> {
        self.load(cidrs.into_iter().map(|cidr| (payload.clone(), cidr)))
    }
}

impl<T: Display> Display for PrefixMap<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ipv4:")?;
        write!(f, "{}", self.trie_ipv4)?;
        writeln!(f, "ipv6:")?;
        write!(f, "{}", self.trie_ipv6)
    }
}
