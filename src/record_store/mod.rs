//! Static record storage.
//!
//! The store is loaded once at startup and never changes afterwards. Two backends are supported
//! behind the one [`RecordLookup`] interface, picked by what the configured path points at:
//!
//! * a regular file is read as a hosts table ([`hosts::HostsTable`]): `<address> <name>` per line,
//!   matched by exact string equality in either direction.
//! * a directory is read as a set of zones ([`zones::ZoneSet`]), one file per zone. Each file is
//!   either a master file ([`master_file`]) or a JSON zone document ([`zone_document`]).
//!
//! Malformed lines are logged and skipped ([`LineError`]); a source that can't be read at all, or
//! that produces no records, fails the load.

use crate::error::Error;
use crate::wire::name::encode_name;
use crate::wire::{RecordType, WireError};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::Path;
use std::sync::Arc;

pub mod hosts;
pub mod master_file;
pub mod zone_document;
pub mod zones;

pub use hosts::HostsTable;
pub use zones::{Zone, ZoneSet};

/// `SharedStore` is the read-only handle every request path holds on the loaded store.
#[allow(clippy::module_name_repetitions)]
pub type SharedStore = Arc<RecordStore>;

/// A single malformed line (or entry) in a record source. Never fatal on its own.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error("expected an address and a name separated by whitespace")]
    MissingSeparator,
    #[error("\"{0}\" is not an IP address")]
    InvalidAddress(String),
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("invalid TTL \"{0}\"")]
    InvalidTtl(String),
    #[error("unknown class \"{0}\"")]
    UnknownClass(String),
    #[error("unsupported record type \"{0}\"")]
    UnsupportedType(String),
    #[error("{rtype} record expects {expected} rdata fields, found {found}")]
    RdataArity {
        rtype: RecordType,
        expected: usize,
        found: usize,
    },
    #[error("invalid {rtype} rdata \"{value}\"")]
    InvalidRdata { rtype: RecordType, value: String },
    #[error("declared rdlength {declared} does not match the {actual} byte rdata")]
    RdLengthMismatch { declared: u16, actual: usize },
    #[error("invalid name: {0}")]
    InvalidName(#[from] WireError),
    #[error("\"@\" used before any $ORIGIN")]
    NoOrigin,
    #[error("malformed directive")]
    MalformedDirective,
    #[error("unsupported directive ${0}")]
    UnsupportedDirective(String),
    #[error("zone already has an SOA record")]
    DuplicateSoa,
    #[error("unterminated parenthesis block")]
    UnterminatedBlock,
}

/// Start of authority parameters for a zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Soa {
    pub mname: String,
    pub rname: String,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

/// Typed record data. Sources are parsed into these at load time so that nothing has to be
/// re-validated while answering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    NS(String),
    CNAME(String),
    PTR(String),
    MX { preference: u16, exchange: String },
    TXT(Vec<String>),
    SOA(Soa),
}

impl RData {
    pub fn record_type(&self) -> RecordType {
        match self {
            RData::A(_) => RecordType::A,
            RData::AAAA(_) => RecordType::AAAA,
            RData::NS(_) => RecordType::NS,
            RData::CNAME(_) => RecordType::CNAME,
            RData::PTR(_) => RecordType::PTR,
            RData::MX { .. } => RecordType::MX,
            RData::TXT(_) => RecordType::TXT,
            RData::SOA(_) => RecordType::SOA,
        }
    }

    /// The rdata as it goes on the wire. Names are written uncompressed.
    ///
    /// # Errors
    ///
    /// Returns a [`WireError`] if an embedded name can't be encoded.
    pub fn to_wire(&self) -> Result<Vec<u8>, WireError> {
        let mut out = Vec::new();
        match self {
            RData::A(ip) => out.extend_from_slice(&ip.octets()),
            RData::AAAA(ip) => out.extend_from_slice(&ip.octets()),
            RData::NS(name) | RData::CNAME(name) | RData::PTR(name) => {
                encode_name(name, &mut out)?;
            }
            RData::MX {
                preference,
                exchange,
            } => {
                out.extend_from_slice(&preference.to_be_bytes());
                encode_name(exchange, &mut out)?;
            }
            RData::TXT(strings) => {
                for s in strings {
                    encode_character_strings(s.as_bytes(), &mut out);
                }
                if strings.is_empty() {
                    out.push(0);
                }
            }
            RData::SOA(soa) => {
                encode_name(&soa.mname, &mut out)?;
                encode_name(&soa.rname, &mut out)?;
                for n in [soa.serial, soa.refresh, soa.retry, soa.expire, soa.minimum] {
                    out.extend_from_slice(&n.to_be_bytes());
                }
            }
        }
        Ok(out)
    }
}

// Character strings carry a one byte length, so longer text is split.
fn encode_character_strings(bytes: &[u8], out: &mut Vec<u8>) {
    if bytes.is_empty() {
        out.push(0);
        return;
    }
    for chunk in bytes.chunks(255) {
        #[allow(clippy::cast_possible_truncation)]
        out.push(chunk.len() as u8);
        out.extend_from_slice(chunk);
    }
}

/// A stored resource record. Names are absolute, without a trailing dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub ttl: u32,
    pub class: u16,
    pub rdata: RData,
}

impl Record {
    pub fn record_type(&self) -> RecordType {
        self.rdata.record_type()
    }
}

/// The answer to a reverse lookup: the name an address maps to and the TTL to serve it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtrTarget {
    pub name: String,
    pub ttl: u32,
}

/// Lookups every store backend supports. All matching is exact.
pub trait RecordLookup {
    /// Every record owned by `name`.
    fn lookup_forward(&self, name: &str) -> Vec<Record>;

    /// The name an address (dotted decimal for IPv4) maps to, if any.
    fn lookup_reverse(&self, address: &str) -> Option<PtrTarget>;

    /// Records owned by `name` with the given type. [`RecordType::ANY`] matches every type.
    fn lookup_by_type(&self, name: &str, rtype: RecordType) -> Vec<Record> {
        let mut records = self.lookup_forward(name);
        if rtype != RecordType::ANY {
            records.retain(|r| r.record_type() == rtype);
        }
        records
    }
}

/// The loaded store, tagged by the backend its source format selected.
#[derive(Debug, Clone)]
pub enum RecordStore {
    Hosts(HostsTable),
    Zones(ZoneSet),
}

impl RecordStore {
    /// Load the store from `path`: a directory is read as zones, anything else as a hosts file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreIO`] if the source can't be read, a zone document error if a JSON zone
    /// fails validation, [`Error::DuplicateZone`] if two files declare the same origin, and
    /// [`Error::EmptyStore`] if nothing usable was loaded.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|source| Error::StoreIO {
                path: path.to_path_buf(),
                source,
            })?;

        let store = if metadata.is_dir() {
            RecordStore::Zones(ZoneSet::try_from_dir(path).await?)
        } else {
            RecordStore::Hosts(HostsTable::try_from_file(path).await?)
        };

        if store.is_empty() {
            return Err(Error::EmptyStore(path.to_path_buf()));
        }
        Ok(store)
    }

    /// Number of stored entries: host pairs, or zone records.
    pub fn len(&self) -> usize {
        match self {
            RecordStore::Hosts(hosts) => hosts.len(),
            RecordStore::Zones(zones) => zones.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordLookup for RecordStore {
    fn lookup_forward(&self, name: &str) -> Vec<Record> {
        match self {
            RecordStore::Hosts(hosts) => hosts.lookup_forward(name),
            RecordStore::Zones(zones) => zones.lookup_forward(name),
        }
    }

    fn lookup_reverse(&self, address: &str) -> Option<PtrTarget> {
        match self {
            RecordStore::Hosts(hosts) => hosts.lookup_reverse(address),
            RecordStore::Zones(zones) => zones.lookup_reverse(address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_rdata() {
        assert_eq!(
            RData::A(Ipv4Addr::new(93, 184, 216, 34)).to_wire().unwrap(),
            [93, 184, 216, 34]
        );
        assert_eq!(RData::AAAA(Ipv6Addr::LOCALHOST).to_wire().unwrap().len(), 16);
    }

    #[test]
    fn name_rdata() {
        assert_eq!(
            RData::PTR("host1".into()).to_wire().unwrap(),
            b"\x05host1\x00"
        );
        assert_eq!(
            RData::MX {
                preference: 10,
                exchange: "mail.example.com".into()
            }
            .to_wire()
            .unwrap(),
            b"\x00\x0a\x04mail\x07example\x03com\x00"
        );
    }

    #[test]
    fn txt_rdata_splits_long_strings() {
        let long = "x".repeat(300);
        let wire = RData::TXT(vec!["hi".into(), long]).to_wire().unwrap();
        assert_eq!(&wire[..3], b"\x02hi");
        assert_eq!(wire[3], 255);
        assert_eq!(wire[3 + 256], 45);
        assert_eq!(wire.len(), 3 + 256 + 46);
        assert_eq!(RData::TXT(vec![]).to_wire().unwrap(), [0]);
    }

    #[test]
    fn soa_rdata() {
        let soa = Soa {
            mname: "ns1.example.com".into(),
            rname: "admin.example.com".into(),
            serial: 2_023_031_201,
            refresh: 7200,
            retry: 3600,
            expire: 1_209_600,
            minimum: 3600,
        };
        let wire = RData::SOA(soa).to_wire().unwrap();
        assert_eq!(wire.len(), 17 + 19 + 20);
        assert_eq!(&wire[36..40], &2_023_031_201u32.to_be_bytes());
    }
}
