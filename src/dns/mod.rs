//! Authoritative UDP DNS server.
//!
//! Every datagram is answered from the [record store][crate::record_store] loaded at startup.
//! Nothing is forwarded or cached and recursion is never offered (`ra` is always clear). Answers
//! are authoritative (`aa` is always set).
//!
//! # Forward lookups
//!
//! A query is answered with every stored record owned by exactly the query name whose type
//! matches the query type (`ANY` matches every type). With the hosts file:
//!
//! ```text
//! 93.184.216.34 example.com
//! ```
//!
//! an `A` query for `example.com` returns:
//!
//! ```bash
//! ❯ dig @127.0.0.1 -p 9000 example.com +short A
//! 93.184.216.34
//! ```
//!
//! Hosts entries are served with a TTL of 300 seconds; zone records carry their own TTL.
//!
//! # Reverse lookups
//!
//! Names under `in-addr.arpa` are reverse lookups whatever the query type. The address is
//! recovered from the name, looked up, and answered with one `PTR` record:
//!
//! ```bash
//! ❯ dig @127.0.0.1 -p 9000 -x 93.184.216.34 +short
//! example.com.
//! ```
//!
//! # Errors
//!
//! Names with no matching records get `NXDOMAIN` (rcode 3) with an empty answer section.
//! Datagrams that can't be decoded get a header-only `FORMERR` (rcode 1) response. Answers that
//! don't fit in 512 bytes are dropped from the end and the response is marked truncated.

pub mod engine;
pub mod server;

pub use server::new;
