//! A directory of zone files, keyed by origin.
use crate::error::Error;
use crate::record_store::{
    master_file, zone_document, LineError, PtrTarget, RData, Record, RecordLookup, Soa,
};
use crate::wire::REVERSE_DOMAIN;
use std::collections::BTreeMap;
use std::io;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Strip a single trailing dot.
pub(crate) fn canonical(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// Turn a name as written in a zone source into an absolute name without a trailing dot. `@` is
/// the origin, a trailing dot marks a name as absolute, and other names are relative to the
/// origin when there is one.
pub(crate) fn qualify(name: &str, origin: Option<&str>) -> Result<String, LineError> {
    if name == "@" {
        return origin.map(str::to_string).ok_or(LineError::NoOrigin);
    }
    if let Some(absolute) = name.strip_suffix('.') {
        return Ok(absolute.to_string());
    }
    match origin {
        Some("") | None => Ok(name.to_string()),
        Some(origin) => Ok(format!("{name}.{origin}")),
    }
}

/// The records of one zone.
#[derive(Debug, Clone, Default)]
pub struct Zone {
    origin: String,
    soa: Option<Soa>,
    records: BTreeMap<String, Vec<Record>>,
    len: usize,
}

impl Zone {
    pub fn new(origin: &str) -> Self {
        Zone {
            origin: canonical(origin).to_string(),
            ..Zone::default()
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn soa(&self) -> Option<&Soa> {
        self.soa.as_ref()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Add a record. A zone holds at most one SOA record.
    ///
    /// # Errors
    ///
    /// Returns [`LineError::DuplicateSoa`] for a second SOA record.
    pub fn insert(&mut self, record: Record) -> Result<(), LineError> {
        if let RData::SOA(soa) = &record.rdata {
            if self.soa.is_some() {
                return Err(LineError::DuplicateSoa);
            }
            self.soa = Some(soa.clone());
        }
        self.records
            .entry(record.name.clone())
            .or_default()
            .push(record);
        self.len += 1;
        Ok(())
    }

    fn get(&self, name: &str) -> &[Record] {
        self.records.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values().flatten()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ZoneSet {
    zones: BTreeMap<String, Zone>,
}

impl ZoneSet {
    /// Load every zone file in a directory. Subdirectories and dot-files are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreIO`] if the directory or a file in it can't be read, a zone document
    /// error for an invalid JSON zone, and [`Error::DuplicateZone`] when two files share an origin.
    pub async fn try_from_dir(dir: impl AsRef<Path>) -> Result<Self, Error> {
        let dir = dir.as_ref();
        let mut entries = tokio::fs::read_dir(dir).await.map_err(store_io(dir))?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(store_io(dir))? {
            let path = entry.path();
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if !hidden && entry.file_type().await.map_err(store_io(&path))?.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut zone_set = ZoneSet::default();
        for path in paths {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(store_io(&path))?;
            let zone = Self::parse_zone_file(&path, &contents)?;
            debug!(
                path = %path.display(),
                origin = zone.origin(),
                records = zone.len(),
                "loaded zone"
            );
            zone_set.insert_zone(zone, &path)?;
        }
        Ok(zone_set)
    }

    fn parse_zone_file(path: &Path, contents: &str) -> Result<Zone, Error> {
        if is_zone_document(path, contents) {
            let document =
                zone_document::parse(contents).map_err(|source| Error::ZoneDocument {
                    path: path.to_path_buf(),
                    source,
                })?;
            return document
                .into_zone()
                .map_err(|source| Error::ZoneDocumentRecord {
                    path: path.to_path_buf(),
                    source,
                });
        }
        let fallback_origin = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(master_file::parse(
            contents,
            &path.display().to_string(),
            &fallback_origin,
        ))
    }

    /// Add a zone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateZone`] if a zone with the same origin is already present.
    pub fn insert_zone(&mut self, zone: Zone, path: &Path) -> Result<(), Error> {
        if zone.is_empty() {
            warn!(path = %path.display(), origin = zone.origin(), "zone has no records");
        }
        if self.zones.contains_key(zone.origin()) {
            return Err(Error::DuplicateZone {
                origin: zone.origin().to_string(),
                path: PathBuf::from(path),
            });
        }
        self.zones.insert(zone.origin().to_string(), zone);
        Ok(())
    }

    pub fn zone(&self, origin: &str) -> Option<&Zone> {
        self.zones.get(canonical(origin))
    }

    /// Total number of records across all zones.
    pub fn len(&self) -> usize {
        self.zones.values().map(Zone::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn records(&self) -> impl Iterator<Item = &Record> {
        self.zones.values().flat_map(Zone::records)
    }
}

fn store_io(path: &Path) -> impl FnOnce(io::Error) -> Error {
    let path = path.to_path_buf();
    move |source| Error::StoreIO { path, source }
}

fn is_zone_document(path: &Path, contents: &str) -> bool {
    path.extension().is_some_and(|ext| ext == "json") || contents.trim_start().starts_with('{')
}

/// `127.0.0.1` → `1.0.0.127.in-addr.arpa`
fn reverse_name(address: &str) -> String {
    let mut labels: Vec<&str> = address.split('.').rev().collect();
    labels.push(REVERSE_DOMAIN);
    labels.join(".")
}

impl RecordLookup for ZoneSet {
    fn lookup_forward(&self, name: &str) -> Vec<Record> {
        let name = canonical(name);
        self.zones
            .values()
            .flat_map(|zone| zone.get(name))
            .cloned()
            .collect()
    }

    /// A PTR record under `in-addr.arpa` wins; otherwise the owner of the first address record
    /// holding `address`.
    fn lookup_reverse(&self, address: &str) -> Option<PtrTarget> {
        let ptr_owner = reverse_name(address);
        let ptr = self
            .zones
            .values()
            .flat_map(|zone| zone.get(&ptr_owner))
            .find_map(|record| match &record.rdata {
                RData::PTR(target) => Some(PtrTarget {
                    name: target.clone(),
                    ttl: record.ttl,
                }),
                _ => None,
            });
        if ptr.is_some() {
            return ptr;
        }

        let ip: IpAddr = address.parse().ok()?;
        self.records().find_map(|record| {
            let matches = match &record.rdata {
                RData::A(v4) => IpAddr::V4(*v4) == ip,
                RData::AAAA(v6) => IpAddr::V6(*v6) == ip,
                _ => false,
            };
            matches.then(|| PtrTarget {
                name: record.name.clone(),
                ttl: record.ttl,
            })
        })
    }
}
