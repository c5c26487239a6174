mod helpers;

use helpers::{zones_dir, EXAMPLE_NET_DOCUMENT};
use minidns::error::Error;
use minidns::record_store::hosts::HOSTS_TTL;
use minidns::record_store::RData;
use minidns::wire::RecordType;
use minidns::{RecordLookup, RecordStore};
use std::fs;
use std::io::Write;
use std::net::Ipv4Addr;

#[tokio::test]
async fn test_load_hosts_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "127.0.0.1 localhost host1").unwrap();
    writeln!(file, "not-an-ip broken").unwrap();
    writeln!(file, "lonely").unwrap();
    writeln!(file, "::1 localhost6").unwrap();

    let store = RecordStore::load(file.path()).await.unwrap();
    assert!(matches!(store, RecordStore::Hosts(_)));
    assert_eq!(store.len(), 3);

    let records = store.lookup_forward("host1");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].rdata, RData::A(Ipv4Addr::LOCALHOST));
    assert_eq!(records[0].ttl, HOSTS_TTL);
    assert_eq!(store.lookup_by_type("localhost6", RecordType::AAAA).len(), 1);
    assert_eq!(store.lookup_reverse("127.0.0.1").unwrap().name, "localhost");
    assert!(store.lookup_forward("broken").is_empty());
}

#[tokio::test]
async fn test_load_zone_directory() {
    let dir = zones_dir();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join(".hidden.zone"), "this is not a zone").unwrap();

    let store = RecordStore::load(dir.path()).await.unwrap();
    let RecordStore::Zones(zones) = &store else {
        panic!("expected a zone set");
    };
    assert_eq!(zones.zone("example.com").unwrap().len(), 8);
    assert_eq!(zones.zone("0.0.10.in-addr.arpa").unwrap().len(), 1);
    assert_eq!(zones.zone("example.net").unwrap().len(), 2);
    assert_eq!(store.len(), 11);
}

#[tokio::test]
async fn test_zone_origin_falls_back_to_file_stem() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("example.org.zone"),
        "example.org. 60 IN A 198.51.100.7\n",
    )
    .unwrap();
    let store = RecordStore::load(dir.path()).await.unwrap();
    let RecordStore::Zones(zones) = &store else {
        panic!("expected a zone set");
    };
    assert!(zones.zone("example.org").is_some());
    assert_eq!(store.lookup_forward("example.org")[0].ttl, 60);
}

#[tokio::test]
async fn test_duplicate_origins_are_fatal() {
    let dir = zones_dir();
    fs::write(dir.path().join("zz-copy.json"), EXAMPLE_NET_DOCUMENT).unwrap();
    let err = RecordStore::load(dir.path()).await.unwrap_err();
    assert!(matches!(err, Error::DuplicateZone { origin, .. } if origin == "example.net"));
}

#[tokio::test]
async fn test_invalid_zone_document_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("bad.json"),
        r#"{ "origin": "bad.example.", "a": [ { "ttl": 60, "value": "nope" } ] }"#,
    )
    .unwrap();
    let err = RecordStore::load(dir.path()).await.unwrap_err();
    assert!(matches!(err, Error::ZoneDocument { .. }));
}

#[tokio::test]
async fn test_empty_sources_are_fatal() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let err = RecordStore::load(file.path()).await.unwrap_err();
    assert!(matches!(err, Error::EmptyStore(_)));

    let dir = tempfile::tempdir().unwrap();
    let err = RecordStore::load(dir.path()).await.unwrap_err();
    assert!(matches!(err, Error::EmptyStore(_)));
}

#[tokio::test]
async fn test_missing_source_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = RecordStore::load(dir.path().join("absent.txt"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::StoreIO { .. }));
}
