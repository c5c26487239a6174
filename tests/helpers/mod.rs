#![allow(dead_code)]

use minidns::record_store::HostsTable;
use minidns::{RecordStore, ResolutionEngine};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use trust_dns_proto::op::{Message, MessageType, OpCode, Query};
use trust_dns_proto::rr::{Name, RecordType};

pub const EXAMPLE_COM_ZONE: &str = r#"$ORIGIN example.com.
$TTL 7200
@   IN SOA ns1.example.com. admin.example.com. (
        2023031201 ; serial
        7200       ; refresh
        3600       ; retry
        1209600    ; expire
        3600 )     ; minimum
@        3600 IN A     93.184.216.34
@        3600 IN AAAA  2606:2800:220:1:248:1893:25c8:1946
@             IN NS    ns1
@             IN MX    10 mail
@             IN TXT   "v=spf1 -all"
www           IN CNAME @
mail     3600 IN A     10.0.0.25
"#;

pub const REVERSE_ZONE: &str = r#"$ORIGIN 0.0.10.in-addr.arpa.
$TTL 600
25 IN PTR smtp.example.com.
"#;

pub const EXAMPLE_NET_DOCUMENT: &str = r#"{
    "origin": "example.net.",
    "a": [ { "ttl": 120, "value": "192.0.2.10" } ],
    "txt": [ { "name": "info", "ttl": 60, "value": ["hello", "world"] } ]
}"#;

pub fn hosts_engine(contents: &str) -> ResolutionEngine {
    let hosts = HostsTable::parse(contents, "test");
    ResolutionEngine::new(Arc::new(RecordStore::Hosts(hosts)))
}

/// A zones directory with a master file, a reverse zone and a JSON document.
pub fn zones_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("example.com.zone"), EXAMPLE_COM_ZONE).unwrap();
    fs::write(dir.path().join("10.0.0.rev"), REVERSE_ZONE).unwrap();
    fs::write(dir.path().join("example.net.json"), EXAMPLE_NET_DOCUMENT).unwrap();
    dir
}

pub async fn zones_engine() -> (TempDir, ResolutionEngine) {
    let dir = zones_dir();
    let store = RecordStore::load(dir.path()).await.unwrap();
    (dir, ResolutionEngine::new(Arc::new(store)))
}

/// Encode a query with an independent DNS implementation.
pub fn query(id: u16, name: &str, rtype: RecordType) -> Vec<u8> {
    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true);
    message.add_query(Query::query(Name::from_ascii(name).unwrap(), rtype));
    message.to_vec().unwrap()
}

/// Decode a response with an independent DNS implementation.
pub fn decode(bytes: &[u8]) -> Message {
    Message::from_vec(bytes).unwrap()
}
