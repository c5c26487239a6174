use crate::record_store::{RecordLookup, SharedStore};
use crate::wire::name::encode_name;
use crate::wire::{
    decode_query, encode_response, Header, Query, RecordType, ResourceRecord, Response,
    ResponseCode, CLASS_IN, REVERSE_DOMAIN,
};
use tracing::{debug, error, warn};

/// Turns one request datagram into one response datagram. Holds no state between calls, so a
/// single engine can be shared by any number of tasks.
#[derive(Debug, Clone)]
pub struct ResolutionEngine {
    store: SharedStore,
}

impl ResolutionEngine {
    pub fn new(store: SharedStore) -> Self {
        ResolutionEngine { store }
    }

    /// Answer a raw query. Never fails: input that can't be decoded gets a header-only
    /// `FormatError` response.
    pub fn resolve(&self, packet: &[u8]) -> Vec<u8> {
        let response = match decode_query(packet) {
            Ok(query) => self.dispatch_query(&query),
            Err(err) => {
                debug!(%err, len = packet.len(), "malformed query");
                return format_error(packet);
            }
        };
        match encode_response(&response) {
            Ok(bytes) => bytes,
            Err(err) => {
                error!(%err, id = response.header.id, "failed to encode response");
                format_error(packet)
            }
        }
    }

    fn dispatch_query(&self, query: &Query) -> Response {
        let question = &query.question;
        let qname = question.name();
        let answers = match qname.as_deref() {
            Some(name) => match reverse_lookup_address(name) {
                Some(address) => self.reverse_answers(name, &address),
                None => self.forward_answers(name, question.qtype),
            },
            None => Vec::new(),
        };
        let code = if answers.is_empty() {
            ResponseCode::NameError
        } else {
            ResponseCode::Success
        };
        debug!(
            id = query.header.id,
            ?qname,
            qtype = %question.qtype,
            answers = answers.len(),
            ?code,
            "resolved query"
        );
        auth_response(query, code, answers)
    }

    fn reverse_answers(&self, qname: &str, address: &str) -> Vec<ResourceRecord> {
        let Some(target) = self.store.lookup_reverse(address) else {
            return Vec::new();
        };
        let mut rdata = Vec::new();
        if let Err(err) = encode_name(&target.name, &mut rdata) {
            warn!(address, name = %target.name, %err, "skipping unencodable PTR target");
            return Vec::new();
        }
        vec![ResourceRecord {
            name: qname.to_string(),
            rtype: RecordType::PTR,
            class: CLASS_IN,
            ttl: target.ttl,
            rdata,
        }]
    }

    fn forward_answers(&self, qname: &str, qtype: RecordType) -> Vec<ResourceRecord> {
        self.store
            .lookup_by_type(qname, qtype)
            .into_iter()
            .filter_map(|record| match record.rdata.to_wire() {
                Ok(rdata) => Some(ResourceRecord {
                    rtype: record.record_type(),
                    class: record.class,
                    ttl: record.ttl,
                    rdata,
                    name: record.name,
                }),
                Err(err) => {
                    warn!(name = %record.name, %err, "skipping unencodable record");
                    None
                }
            })
            .collect()
    }
}

fn auth_response(query: &Query, code: ResponseCode, answers: Vec<ResourceRecord>) -> Response {
    let mut header = Header::response_to(&query.header);
    header.aa = true;
    header.set_response_code(code);
    Response {
        header,
        question: Some(query.question.clone()),
        answers,
    }
}

/// A header-only `FormatError` response echoing what arrived of the request header.
fn format_error(packet: &[u8]) -> Vec<u8> {
    let mut header = Header::response_to_partial(packet);
    header.aa = true;
    header.set_response_code(ResponseCode::FormatError);
    let mut out = Vec::new();
    header.encode(&mut out);
    out
}

/// The address a reverse lookup name asks about: `1.0.0.127.in-addr.arpa.` → `127.0.0.1`.
///
/// The suffix is matched ASCII case-insensitively and a trailing dot is optional. Returns `None`
/// for names outside `in-addr.arpa`.
pub fn reverse_lookup_address(qname: &str) -> Option<String> {
    let name = qname.strip_suffix('.').unwrap_or(qname);
    let split = name.len().checked_sub(REVERSE_DOMAIN.len() + 1)?;
    let suffix = name.get(split..)?.strip_prefix('.')?;
    if !suffix.eq_ignore_ascii_case(REVERSE_DOMAIN) {
        return None;
    }
    let octets: Vec<&str> = name[..split].split('.').rev().collect();
    Some(octets.join("."))
}
