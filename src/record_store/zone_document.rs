//! Structured JSON zone documents.
//!
//! ```json
//! {
//!   "origin": "example.com.",
//!   "soa": {
//!     "ttl": 3600, "mname": "ns1", "rname": "admin",
//!     "serial": 2023031201, "refresh": 7200, "retry": 3600, "expire": 1209600, "minimum": 3600
//!   },
//!   "a": [
//!     { "ttl": 3600, "value": "93.184.216.34" },
//!     { "name": "www", "ttl": "300", "value": "93.184.216.35" }
//!   ],
//!   "aaaa": [ { "ttl": 3600, "value": "2606:2800:220:1:248:1893:25c8:1946" } ],
//!   "mx": [ { "ttl": 3600, "value": { "preference": 10, "exchange": "mail" } } ],
//!   "txt": [ { "ttl": 60, "value": ["v=spf1", "-all"] } ]
//! }
//! ```
//!
//! Entries are owned by `name` (default `@`), qualified against `origin` the same way master-file
//! names are. The document is validated as a whole when it is deserialized: unknown keys,
//! malformed addresses and missing fields reject it.
use crate::record_store::zones::{qualify, Zone};
use crate::record_store::{LineError, RData, Record, Soa};
use crate::wire::name::encoded_len;
use crate::wire::CLASS_IN;
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use std::net::{Ipv4Addr, Ipv6Addr};

fn apex() -> String {
    "@".to_string()
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ZoneDocument {
    pub origin: String,
    #[serde(default)]
    pub soa: Option<SoaEntry>,
    #[serde(default)]
    pub a: Vec<Entry<Ipv4Addr>>,
    #[serde(default)]
    pub aaaa: Vec<Entry<Ipv6Addr>>,
    #[serde(default)]
    pub ns: Vec<Entry<String>>,
    #[serde(default)]
    pub cname: Vec<Entry<String>>,
    #[serde(default)]
    pub ptr: Vec<Entry<String>>,
    #[serde(default)]
    pub mx: Vec<Entry<MxValue>>,
    #[serde(default)]
    pub txt: Vec<Entry<TxtValue>>,
}

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Entry<V> {
    #[serde(default = "apex")]
    pub name: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub ttl: u32,
    pub value: V,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct MxValue {
    pub preference: u16,
    pub exchange: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum TxtValue {
    One(String),
    Many(Vec<String>),
}

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct SoaEntry {
    #[serde(default = "apex")]
    pub name: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub ttl: u32,
    pub mname: String,
    pub rname: String,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

/// Deserialize a zone document.
///
/// # Errors
///
/// Returns the [`serde_json::Error`] describing the first schema violation.
pub fn parse(contents: &str) -> Result<ZoneDocument, serde_json::Error> {
    serde_json::from_str(contents)
}

impl ZoneDocument {
    /// Build the zone the document describes.
    ///
    /// # Errors
    ///
    /// Returns a [`LineError`] for the first name that can't be encoded on the wire.
    pub fn into_zone(self) -> Result<Zone, LineError> {
        let origin_name = qualify(&self.origin, None)?;
        encoded_len(&origin_name)?;
        let origin = Some(origin_name.as_str());
        let name = |n: &str| -> Result<String, LineError> {
            let qualified = qualify(n, origin)?;
            encoded_len(&qualified)?;
            Ok(qualified)
        };

        let mut records = Vec::new();
        if let Some(soa) = self.soa {
            records.push((
                name(&soa.name)?,
                soa.ttl,
                RData::SOA(Soa {
                    mname: name(&soa.mname)?,
                    rname: name(&soa.rname)?,
                    serial: soa.serial,
                    refresh: soa.refresh,
                    retry: soa.retry,
                    expire: soa.expire,
                    minimum: soa.minimum,
                }),
            ));
        }
        for e in self.a {
            records.push((name(&e.name)?, e.ttl, RData::A(e.value)));
        }
        for e in self.aaaa {
            records.push((name(&e.name)?, e.ttl, RData::AAAA(e.value)));
        }
        for e in self.ns {
            records.push((name(&e.name)?, e.ttl, RData::NS(name(&e.value)?)));
        }
        for e in self.cname {
            records.push((name(&e.name)?, e.ttl, RData::CNAME(name(&e.value)?)));
        }
        for e in self.ptr {
            records.push((name(&e.name)?, e.ttl, RData::PTR(name(&e.value)?)));
        }
        for e in self.mx {
            let exchange = name(&e.value.exchange)?;
            records.push((
                name(&e.name)?,
                e.ttl,
                RData::MX {
                    preference: e.value.preference,
                    exchange,
                },
            ));
        }
        for e in self.txt {
            let strings = match e.value {
                TxtValue::One(s) => vec![s],
                TxtValue::Many(v) => v,
            };
            records.push((name(&e.name)?, e.ttl, RData::TXT(strings)));
        }

        let mut zone = Zone::new(&origin_name);
        for (name, ttl, rdata) in records {
            zone.insert(Record {
                name,
                ttl,
                class: CLASS_IN,
                rdata,
            })?;
        }
        Ok(zone)
    }
}
