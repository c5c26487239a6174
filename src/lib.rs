//! minidns
//!
//! A minimal authoritative DNS responder. Answers [RFC-1035][RFC-1035] queries over UDP from a
//! static record store: either a hosts file, or a directory of zone files in master-file or JSON
//! form.
//!
//! [RFC-1035]: https://www.rfc-editor.org/rfc/rfc1035
//!
#![warn(clippy::pedantic)]

pub mod config;
pub mod dns;
pub mod error;
pub mod record_store;
pub mod wire;

pub use config::{Config, SharedConfig};
pub use dns::engine::ResolutionEngine;
pub use dns::new as new_dns;
pub use dns::server::Server;
pub use record_store::{RecordLookup, RecordStore, SharedStore};
