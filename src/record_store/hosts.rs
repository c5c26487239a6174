//! A hosts-file backed implementation of the [`RecordLookup`][super::RecordLookup] trait.
//!
//! Each line pairs an address with one or more names:
//!
//! ```text
//! 127.0.0.1 host1
//! 10.0.0.2  printer printer.lan
//! ```
//!
//! Names resolve to every address they were listed with. An address resolves back to the first
//! name it was listed with.
use crate::error::Error;
use crate::record_store::{LineError, PtrTarget, RData, Record, RecordLookup};
use crate::wire::CLASS_IN;
use std::collections::HashMap;
use std::net::IpAddr;
use std::path::Path;
use tracing::warn;

/// TTL served for hosts-file records, which carry none of their own.
pub const HOSTS_TTL: u32 = 300;

#[derive(Default, Debug, Clone)]
pub struct HostsTable {
    by_name: HashMap<String, Vec<IpAddr>>,
    by_address: HashMap<String, String>,
    pairs: usize,
}

impl HostsTable {
    /// Load a [`HostsTable`] from the file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreIO`] if the file can't be read. Malformed lines are only logged.
    pub async fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let p = p.as_ref();
        let contents = tokio::fs::read_to_string(p)
            .await
            .map_err(|source| Error::StoreIO {
                path: p.to_path_buf(),
                source,
            })?;
        Ok(Self::parse(&contents, &p.display().to_string()))
    }

    /// Build a table from hosts-file text. `source` only labels log messages.
    pub fn parse(contents: &str, source: &str) -> Self {
        let mut table = HostsTable::default();
        for (idx, line) in contents.lines().enumerate() {
            match parse_line(line) {
                Ok(Some((address, ip, names))) => table.insert(address, ip, &names),
                Ok(None) => {}
                Err(err) => warn!(source, line_no = idx + 1, %err, "skipping hosts line {line:?}"),
            }
        }
        table
    }

    fn insert(&mut self, address: &str, ip: IpAddr, names: &[&str]) {
        for name in names {
            self.by_name.entry((*name).to_string()).or_default().push(ip);
            self.by_address
                .entry(address.to_string())
                .or_insert_with(|| (*name).to_string());
            self.pairs += 1;
        }
    }

    /// Number of address/name pairs loaded.
    pub fn len(&self) -> usize {
        self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs == 0
    }
}

type HostsLine<'a> = (&'a str, IpAddr, Vec<&'a str>);

fn parse_line(line: &str) -> Result<Option<HostsLine<'_>>, LineError> {
    let line = line.split_once('#').map_or(line, |(content, _)| content).trim();
    if line.is_empty() {
        return Ok(None);
    }

    let mut fields = line.split_whitespace();
    let address = fields.next().ok_or(LineError::MissingSeparator)?;
    let names: Vec<&str> = fields.collect();
    if names.is_empty() {
        return Err(LineError::MissingSeparator);
    }
    let ip = address
        .parse::<IpAddr>()
        .map_err(|_| LineError::InvalidAddress(address.to_string()))?;
    Ok(Some((address, ip, names)))
}

impl RecordLookup for HostsTable {
    fn lookup_forward(&self, name: &str) -> Vec<Record> {
        self.by_name.get(name).map_or(Vec::default(), |ips| {
            ips.iter()
                .map(|ip| Record {
                    name: name.to_string(),
                    ttl: HOSTS_TTL,
                    class: CLASS_IN,
                    rdata: match ip {
                        IpAddr::V4(v4) => RData::A(*v4),
                        IpAddr::V6(v6) => RData::AAAA(*v6),
                    },
                })
                .collect()
        })
    }

    fn lookup_reverse(&self, address: &str) -> Option<PtrTarget> {
        self.by_address.get(address).map(|name| PtrTarget {
            name: name.clone(),
            ttl: HOSTS_TTL,
        })
    }
}
